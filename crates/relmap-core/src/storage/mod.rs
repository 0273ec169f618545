//! Storage facade.
//!
//! `Storage` couples a binding registry with the rows stored per mapped
//! table and the functions registered on it, and evaluates function calls
//! over those rows the way the engine would: scalar functions once per row,
//! aggregates stepped once per row and finalized once.

mod call;

pub use call::{func, ColumnRef, FunctionCall, Operand};

use std::collections::HashMap;
use std::fmt;

use parking_lot::{Mutex, RwLock};
use relmap_common::{RelmapError, RelmapResult, StorageConfig, TypeKey};

use crate::args::{to_values, ValueEncoder};
use crate::function::{AggregateFunction, FunctionKind, FunctionRegistry, ScalarFunction};
use crate::registry::{BindingChain, Pick, StorageRegistry};
use crate::schema::Table;
use crate::tuple::ForEach;
use crate::value::{FromValue, Value};

type Rows = Vec<Vec<Value>>;

/// In-memory storage over the binding chain `C`.
pub struct Storage<C> {
    config: StorageConfig,
    registry: StorageRegistry<C>,
    rows: RwLock<HashMap<TypeKey, Rows>>,
    functions: Mutex<FunctionRegistry>,
}

impl<C: BindingChain> Storage<C> {
    /// Creates a storage over `chain`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for an invalid configuration, or
    /// `DuplicateBinding` when the chain binds a key twice under
    /// `strict_bindings`.
    pub fn new(chain: C, config: StorageConfig) -> RelmapResult<Self> {
        config.validate()?;
        let registry = StorageRegistry::new(chain, &config)?;
        let functions = FunctionRegistry::new(&config);
        tracing::debug!(filename = %config.filename, tables = C::LEN, "opened storage");
        Ok(Self {
            config,
            registry,
            rows: RwLock::new(HashMap::new()),
            functions: Mutex::new(functions),
        })
    }

    /// Configuration the storage was opened with.
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Binding registry.
    pub fn registry(&self) -> &StorageRegistry<C> {
        &self.registry
    }

    /// Inserts `record`, replacing any stored row with the same primary key.
    pub fn replace<O, Idx>(&self, record: &O)
    where
        O: 'static,
        C: Pick<O, Idx, Binding = Table<O>>,
    {
        let table = self.registry.pick::<O, Idx>();
        let row = table.encode_row(record);
        let primary_key = table.primary_key_indices();

        let mut rows = self.rows.write();
        let stored = rows.entry(TypeKey::of::<O>()).or_default();
        let existing = if primary_key.is_empty() {
            None
        } else {
            stored
                .iter()
                .position(|r| primary_key.iter().all(|&i| r.get(i) == row.get(i)))
        };
        match existing {
            Some(position) => stored[position] = row,
            None => stored.push(row),
        }
    }

    /// Every stored record of type `O`, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns the first row decode error.
    pub fn get_all<O, Idx>(&self) -> RelmapResult<Vec<O>>
    where
        O: Default + 'static,
        C: Pick<O, Idx, Binding = Table<O>>,
    {
        let table = self.registry.pick::<O, Idx>();
        let rows = self.rows.read();
        rows.get(&TypeKey::of::<O>())
            .map(|stored| stored.iter().map(|row| table.decode_row(row)).collect())
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    /// Number of stored records of type `O`.
    pub fn count<O, Idx>(&self) -> usize
    where
        O: 'static,
        C: Pick<O, Idx, Binding = Table<O>>,
    {
        self.rows.read().get(&TypeKey::of::<O>()).map_or(0, Vec::len)
    }

    /// Removes every stored record of type `O`.
    pub fn remove_all<O, Idx>(&self)
    where
        O: 'static,
        C: Pick<O, Idx, Binding = Table<O>>,
    {
        self.rows.write().remove(&TypeKey::of::<O>());
    }

    /// Column operand for `name` in the table mapping `O`.
    ///
    /// # Errors
    ///
    /// Returns `ColumnNotFound` if the table has no such column.
    pub fn column<O, Idx>(&self, name: &str) -> RelmapResult<ColumnRef>
    where
        O: 'static,
        C: Pick<O, Idx, Binding = Table<O>>,
    {
        let table = self.registry.pick::<O, Idx>();
        let index = table
            .column_index(name)
            .ok_or_else(|| RelmapError::ColumnNotFound {
                column: name.to_string(),
                table: table.name().to_string(),
            })?;
        Ok(ColumnRef {
            table: TypeKey::of::<O>(),
            table_name: table.name().to_string(),
            column: name.to_string(),
            index,
        })
    }

    /// Registers a scalar function instance.
    ///
    /// # Errors
    ///
    /// See `FunctionRegistry::create_scalar_function`.
    pub fn create_scalar_function<F: ScalarFunction>(&self, function: F) -> RelmapResult<()> {
        self.functions.lock().create_scalar_function(function)
    }

    /// Registers an aggregate function with its accumulator constructor.
    ///
    /// # Errors
    ///
    /// See `FunctionRegistry::create_aggregate_function`.
    pub fn create_aggregate_function<F, M>(&self, make: M) -> RelmapResult<()>
    where
        F: AggregateFunction,
        M: Fn() -> F + Send + 'static,
    {
        self.functions.lock().create_aggregate_function(make)
    }

    /// Removes the scalar function `F`.
    ///
    /// # Errors
    ///
    /// See `FunctionRegistry::delete_scalar_function`.
    pub fn delete_scalar_function<F: ScalarFunction>(&self) -> RelmapResult<()> {
        self.functions.lock().delete_scalar_function::<F>()
    }

    /// Removes the aggregate function `F`.
    ///
    /// # Errors
    ///
    /// See `FunctionRegistry::delete_aggregate_function`.
    pub fn delete_aggregate_function<F: AggregateFunction>(&self) -> RelmapResult<()> {
        self.functions.lock().delete_aggregate_function::<F>()
    }

    /// Returns true if a function called `name` is registered.
    pub fn has_function(&self, name: &str) -> bool {
        self.functions.lock().contains(name)
    }

    fn source_rows(&self, call: &FunctionCall) -> RelmapResult<Rows> {
        match call.source()? {
            // No table: a single row with no columns.
            None => Ok(vec![Vec::new()]),
            Some(key) => {
                self.registry.require_key(key)?;
                Ok(self.rows.read().get(&key).cloned().unwrap_or_default())
            }
        }
    }

    /// Evaluates `call` and returns one value per result row.
    ///
    /// # Errors
    ///
    /// Returns `NoSuchFunction` for unregistered names, `NotSupported` when
    /// operands span several tables, `TableNotMapped` for an unmapped source,
    /// and any argument decoding or function error. A failure aborts the
    /// whole evaluation.
    pub fn select(&self, call: &FunctionCall) -> RelmapResult<Vec<Value>> {
        let mut functions = self.functions.lock();
        let kind = functions
            .info(call.name())
            .map(|info| info.kind())
            .ok_or_else(|| RelmapError::NoSuchFunction {
                name: call.name().to_string(),
            })?;
        let rows = self.source_rows(call)?;

        match kind {
            FunctionKind::Scalar => rows
                .iter()
                .map(|row| functions.invoke(call.name(), &call.bind(row)?))
                .collect(),
            FunctionKind::Aggregate => {
                let mut aggregation = functions.begin(call.name())?;
                for row in &rows {
                    aggregation.step(&call.bind(row)?)?;
                }
                Ok(vec![aggregation.finalize()])
            }
        }
    }

    /// Evaluates `call` and decodes every result as `T`.
    ///
    /// # Errors
    ///
    /// See `select`; additionally returns the result decode error.
    pub fn select_as<T: FromValue>(&self, call: &FunctionCall) -> RelmapResult<Vec<T>> {
        self.select(call)?.iter().map(T::from_value).collect()
    }

    /// Calls the scalar function `F` once with the encoded tuple `args`.
    ///
    /// # Errors
    ///
    /// See `FunctionRegistry::invoke`.
    pub fn call_scalar<F, A>(&self, args: &A) -> RelmapResult<Value>
    where
        F: ScalarFunction,
        A: ForEach<ValueEncoder>,
    {
        self.functions.lock().invoke(F::NAME, &to_values(args))
    }

    /// Runs one aggregation of `F`, stepping once per tuple in `rows`.
    ///
    /// # Errors
    ///
    /// See `FunctionRegistry::begin` and `AggregateContext::step`.
    pub fn call_aggregate<F, A>(&self, rows: &[A]) -> RelmapResult<Value>
    where
        F: AggregateFunction,
        A: ForEach<ValueEncoder>,
    {
        let mut aggregation = self.functions.lock().begin(F::NAME)?;
        for row in rows {
            aggregation.step(&to_values(row))?;
        }
        Ok(aggregation.finalize())
    }
}

impl<C> fmt::Debug for Storage<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Storage")
            .field("filename", &self.config.filename)
            .field("tables", &self.rows.read().len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain;
    use crate::registry::Link;
    use crate::schema::{Column, EmptyBinding};

    #[derive(Debug, Default, Clone, PartialEq)]
    struct User {
        id: i64,
        name: String,
    }

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Tag {
        label: String,
    }

    type UserChain = Link<Table<User>, EmptyBinding>;

    fn open() -> Storage<UserChain> {
        let chain = chain![Table::<User>::new("users")
            .column(Column::new("id", |u: &User| u.id, |u: &mut User, v| u.id = v).primary_key())
            .column(Column::new("name", |u: &User| u.name.clone(), |u: &mut User, v| u.name = v))];
        Storage::new(chain, StorageConfig::default()).unwrap()
    }

    #[test]
    fn test_replace_upserts_by_primary_key() {
        let storage = open();
        storage.replace(&User {
            id: 1,
            name: "one".to_string(),
        });
        storage.replace(&User {
            id: 2,
            name: "two".to_string(),
        });
        storage.replace(&User {
            id: 1,
            name: "uno".to_string(),
        });
        assert_eq!(storage.count::<User, _>(), 2);

        let users = storage.get_all::<User, _>().unwrap();
        assert_eq!(users[0].name, "uno");
        assert_eq!(users[1].name, "two");

        storage.remove_all::<User, _>();
        assert_eq!(storage.count::<User, _>(), 0);
        assert!(storage.get_all::<User, _>().unwrap().is_empty());
    }

    #[test]
    fn test_replace_without_primary_key_appends() {
        let chain = chain![Table::<Tag>::new("tags").column(Column::new(
            "label",
            |t: &Tag| t.label.clone(),
            |t: &mut Tag, v| t.label = v
        ))];
        let storage = Storage::new(chain, StorageConfig::default()).unwrap();
        let tag = Tag {
            label: "x".to_string(),
        };
        storage.replace(&tag);
        storage.replace(&tag);
        assert_eq!(storage.count::<Tag, _>(), 2);
    }

    #[test]
    fn test_column_operand() {
        let storage = open();
        let name = storage.column::<User, _>("name").unwrap();
        assert_eq!(name.index(), 1);
        assert_eq!(name.table_name(), "users");
        assert_eq!(name.table(), TypeKey::of::<User>());

        let err = storage.column::<User, _>("email").unwrap_err();
        assert!(matches!(err, RelmapError::ColumnNotFound { .. }));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = StorageConfig::builder().max_function_args(0).build();
        assert!(Storage::new(EmptyBinding, config).is_err());
    }

    #[test]
    fn test_select_unmapped_source() {
        struct Echo;
        impl ScalarFunction for Echo {
            const NAME: &'static str = "ECHO";
            type Args<'a> = ();
            type Output = i64;

            fn call(&mut self, (): ()) -> RelmapResult<i64> {
                Ok(1)
            }
        }

        let storage = open();
        storage.create_scalar_function(Echo).unwrap();
        let err = storage.select(&func("ECHO").from::<Tag>()).unwrap_err();
        assert!(matches!(err, RelmapError::TableNotMapped { .. }));
    }
}

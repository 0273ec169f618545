//! Storage registry: binding lookup by record type or table-type descriptor.
//!
//! `StorageRegistry` owns an immutable binding chain and answers two kinds
//! of lookup:
//!
//! - `pick` / `pick_mut`: statically checked. The lookup type must be bound
//!   in the chain, otherwise the call does not compile.
//! - `find` / `find_mut`: runtime walk. Unmapped types yield the empty
//!   sentinel, which callers test with `StorageBinding::is_empty`.
//!
//! Both agree on every mapped key. When a key is bound more than once,
//! `find` returns the first binding in declaration order and `pick` is
//! rejected as ambiguous; registries built with `strict_bindings` refuse
//! such chains outright.

mod chain;

pub use chain::{BindingChain, ByObject, ByTableType, Here, Link, Pick, There};

use relmap_common::{RelmapError, RelmapResult, StorageConfig, TypeKey};

use crate::alias::{self, Classify, RecordsetOf};
use crate::schema::{EmptyBinding, StorageBinding, Table};
use crate::tuple::Order;

/// Immutable registry of the bindings of one storage.
#[derive(Debug)]
pub struct StorageRegistry<C> {
    chain: C,
    sentinel: EmptyBinding,
}

impl<C: BindingChain> StorageRegistry<C> {
    /// Builds a registry over `chain`.
    ///
    /// # Errors
    ///
    /// With `strict_bindings` set, returns `DuplicateBinding` if two bindings
    /// share a table-type descriptor or a record type.
    pub fn new(chain: C, config: &StorageConfig) -> RelmapResult<Self> {
        let registry = Self {
            chain,
            sentinel: EmptyBinding,
        };

        if let Some(err) = registry.first_duplicate() {
            if config.strict_bindings {
                return Err(err);
            }
            tracing::warn!(error = %err, "duplicate binding, first match wins");
        }

        tracing::debug!(
            bindings = C::LEN,
            tables = ?registry.table_names(),
            "storage registry assembled"
        );
        Ok(registry)
    }

    fn first_duplicate(&self) -> Option<RelmapError> {
        let bindings = self.bindings();
        for (second, later) in bindings.iter().enumerate() {
            for (first, earlier) in bindings[..second].iter().enumerate() {
                let clash = match (earlier.object_type(), later.object_type()) {
                    (Some(a), Some(b)) if a == b => Some(a),
                    _ if earlier.table_type() == later.table_type() => Some(later.table_type()),
                    _ => None,
                };
                if let Some(key) = clash {
                    return Some(RelmapError::DuplicateBinding {
                        type_name: key.short_name().to_string(),
                        first,
                        second,
                    });
                }
            }
        }
        None
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        C::LEN
    }

    /// Returns true if nothing is bound.
    pub fn is_empty(&self) -> bool {
        C::LEN == 0
    }

    /// The underlying chain.
    pub fn chain(&self) -> &C {
        &self.chain
    }

    /// Binding governing `K`, resolved at compile time.
    ///
    /// `K` is a record type or a table-type descriptor; `Idx` is inferred:
    ///
    /// ```rust
    /// use relmap_core::chain;
    /// use relmap_core::registry::StorageRegistry;
    /// use relmap_core::schema::Table;
    /// use relmap_common::StorageConfig;
    ///
    /// struct User;
    /// let registry = StorageRegistry::new(chain![Table::<User>::new("users")], &StorageConfig::default())?;
    /// assert_eq!(registry.pick::<User, _>().name(), "users");
    /// # Ok::<(), relmap_common::RelmapError>(())
    /// ```
    ///
    /// A type the chain does not bind cannot be picked:
    ///
    /// ```compile_fail
    /// use relmap_core::chain;
    /// use relmap_core::registry::StorageRegistry;
    /// use relmap_core::schema::Table;
    /// use relmap_common::StorageConfig;
    ///
    /// struct User;
    /// struct Post;
    /// let registry = StorageRegistry::new(chain![Table::<User>::new("users")], &StorageConfig::default())?;
    /// let _ = registry.pick::<Post, _>();
    /// # Ok::<(), relmap_common::RelmapError>(())
    /// ```
    ///
    /// Neither can a type the chain binds twice:
    ///
    /// ```compile_fail
    /// use relmap_core::chain;
    /// use relmap_core::registry::StorageRegistry;
    /// use relmap_core::schema::Table;
    /// use relmap_common::StorageConfig;
    ///
    /// struct User;
    /// let chain = chain![Table::<User>::new("users"), Table::<User>::new("members")];
    /// let registry = StorageRegistry::new(chain, &StorageConfig::builder().strict_bindings(false).build())?;
    /// let _ = registry.pick::<User, _>();
    /// # Ok::<(), relmap_common::RelmapError>(())
    /// ```
    pub fn pick<K, Idx>(&self) -> &<C as Pick<K, Idx>>::Binding
    where
        C: Pick<K, Idx>,
    {
        self.chain.pick()
    }

    /// Mutable variant of `pick`.
    pub fn pick_mut<K, Idx>(&mut self) -> &mut <C as Pick<K, Idx>>::Binding
    where
        C: Pick<K, Idx>,
    {
        self.chain.pick_mut()
    }

    /// Binding governing the record set `A` stands for, resolved at compile
    /// time. Resolves through `RecordsetOf<A>`, the type whose key
    /// `find_recordset` walks for, so both always agree.
    pub fn pick_recordset<A, Idx>(&self) -> &<C as Pick<RecordsetOf<A>, Idx>>::Binding
    where
        A: Classify,
        C: Pick<RecordsetOf<A>, Idx>,
    {
        self.chain.pick()
    }

    /// Binding governing `K`, or the empty sentinel.
    pub fn find<K: 'static>(&self) -> &dyn StorageBinding {
        self.find_key(TypeKey::of::<K>())
    }

    /// Mutable variant of `find`.
    pub fn find_mut<K: 'static>(&mut self) -> &mut dyn StorageBinding {
        let key = TypeKey::of::<K>();
        match self.chain.find_by_mut(key) {
            Some(binding) => binding,
            None => &mut self.sentinel,
        }
    }

    /// Binding governing `key`, or the empty sentinel.
    pub fn find_key(&self, key: TypeKey) -> &dyn StorageBinding {
        match self.chain.find_by(key) {
            Some(binding) => binding,
            None => &self.sentinel,
        }
    }

    /// Binding governing the record type `A` stands for, or the empty
    /// sentinel. Table references decay and recordset aliases resolve to
    /// their referenced type before the walk.
    pub fn find_recordset<A: Classify>(&self) -> &dyn StorageBinding {
        self.find_key(alias::lookup_key::<A>())
    }

    /// Returns true if `K` is bound.
    pub fn is_mapped<K: 'static>(&self) -> bool {
        !self.find::<K>().is_empty()
    }

    /// Table binding of the record type `O`, if bound.
    pub fn find_table<O: 'static>(&self) -> Option<&Table<O>> {
        self.find::<O>().as_any().downcast_ref::<Table<O>>()
    }

    /// Table binding of the record type behind `key`.
    ///
    /// # Errors
    ///
    /// Returns `TableNotMapped` if no table governs `key`.
    pub fn require_key(&self, key: TypeKey) -> RelmapResult<&dyn StorageBinding> {
        let binding = self.find_key(key);
        if binding.is_empty() {
            return Err(RelmapError::TableNotMapped {
                type_name: key.short_name().to_string(),
            });
        }
        Ok(binding)
    }

    /// Bindings in declaration order.
    pub fn bindings(&self) -> Vec<&dyn StorageBinding> {
        self.collect(Order::Forward)
    }

    /// Bindings in reverse declaration order.
    pub fn bindings_reversed(&self) -> Vec<&dyn StorageBinding> {
        self.collect(Order::Reverse)
    }

    fn collect(&self, order: Order) -> Vec<&dyn StorageBinding> {
        let mut out = Vec::with_capacity(C::LEN);
        self.chain.walk(order, &mut |binding| out.push(binding));
        out
    }

    /// Names of every binding, in declaration order.
    pub fn table_names(&self) -> Vec<&str> {
        self.bindings().into_iter().map(|b| b.name()).collect()
    }
}

//! Function-call expressions evaluated by `Storage::select`.

use relmap_common::{RelmapError, RelmapResult, TypeKey};

use crate::value::{ToValue, Value};

/// A column of a mapped table, resolved to its position.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnRef {
    pub(crate) table: TypeKey,
    pub(crate) table_name: String,
    pub(crate) column: String,
    pub(crate) index: usize,
}

impl ColumnRef {
    /// Record type of the owning table.
    pub fn table(&self) -> TypeKey {
        self.table
    }

    /// Name of the owning table.
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Column name.
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Position of the column within a row.
    pub fn index(&self) -> usize {
        self.index
    }
}

/// One argument of a function call.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// A constant.
    Literal(Value),
    /// The value of a column in the current row.
    Column(ColumnRef),
}

impl Operand {
    fn bind(&self, row: &[Value]) -> RelmapResult<Value> {
        match self {
            Operand::Literal(value) => Ok(value.clone()),
            Operand::Column(c) => row.get(c.index).cloned().ok_or_else(|| {
                RelmapError::internal(format!(
                    "row of '{}' has no column {} ({})",
                    c.table_name, c.index, c.column
                ))
            }),
        }
    }
}

impl From<ColumnRef> for Operand {
    fn from(column: ColumnRef) -> Self {
        Operand::Column(column)
    }
}

/// A call of a registered function, with its operands.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    name: String,
    operands: Vec<Operand>,
    from: Option<TypeKey>,
}

/// Starts a call of the function called `name`.
///
/// ```rust
/// use relmap_core::storage::func;
///
/// let call = func("HAS_PREFIX").arg("one").arg("o");
/// assert_eq!(call.operands().len(), 2);
/// ```
pub fn func(name: impl Into<String>) -> FunctionCall {
    FunctionCall::new(name)
}

impl FunctionCall {
    /// Starts a call with no operands.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            operands: Vec::new(),
            from: None,
        }
    }

    /// Appends a constant operand.
    #[must_use]
    pub fn arg<T: ToValue>(mut self, value: T) -> Self {
        self.operands.push(Operand::Literal(value.to_value()));
        self
    }

    /// Appends a column operand.
    #[must_use]
    pub fn column(mut self, column: ColumnRef) -> Self {
        self.operands.push(Operand::Column(column));
        self
    }

    /// Evaluates the call once per row of the table mapping `O`, even when
    /// no operand reads a column.
    #[must_use]
    pub fn from<O: 'static>(mut self) -> Self {
        self.from = Some(TypeKey::of::<O>());
        self
    }

    /// Function name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Operands in call order.
    pub fn operands(&self) -> &[Operand] {
        &self.operands
    }

    /// The single table the call reads rows from, if any.
    ///
    /// # Errors
    ///
    /// Returns `NotSupported` when operands span more than one table.
    pub fn source(&self) -> RelmapResult<Option<TypeKey>> {
        let columns = self.operands.iter().filter_map(|op| match op {
            Operand::Column(c) => Some(c.table),
            Operand::Literal(_) => None,
        });

        let mut source = self.from;
        for table in columns {
            match source {
                Some(existing) if existing != table => {
                    return Err(RelmapError::NotSupported {
                        operation: format!("{}() over more than one table", self.name),
                    });
                }
                _ => source = Some(table),
            }
        }
        Ok(source)
    }

    /// Raw arguments of the call for one row.
    pub(crate) fn bind(&self, row: &[Value]) -> RelmapResult<Vec<Value>> {
        self.operands.iter().map(|op| op.bind(row)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct User;
    struct Post;

    fn column_of<T: 'static>(name: &str, index: usize) -> ColumnRef {
        ColumnRef {
            table: TypeKey::of::<T>(),
            table_name: "t".to_string(),
            column: name.to_string(),
            index,
        }
    }

    #[test]
    fn test_literal_call() {
        let call = func("FIRST").arg("Vanotek").arg("Tinashe");
        assert_eq!(call.name(), "FIRST");
        assert_eq!(call.source().unwrap(), None);
        assert_eq!(
            call.bind(&[]).unwrap(),
            vec![Value::text("Vanotek"), Value::text("Tinashe")]
        );
    }

    #[test]
    fn test_column_binding() {
        let call = func("MULTI_SUM").column(column_of::<User>("id", 1)).arg(5i64);
        assert_eq!(call.source().unwrap(), Some(TypeKey::of::<User>()));
        let row = [Value::text("a"), Value::integer(3)];
        assert_eq!(
            call.bind(&row).unwrap(),
            vec![Value::integer(3), Value::integer(5)]
        );
        assert!(call.bind(&[]).is_err());
    }

    #[test]
    fn test_explicit_source() {
        let call = func("COUNTER").from::<Post>();
        assert_eq!(call.source().unwrap(), Some(TypeKey::of::<Post>()));
    }

    #[test]
    fn test_multiple_tables_not_supported() {
        let call = func("F")
            .column(column_of::<User>("id", 0))
            .column(column_of::<Post>("id", 0));
        let err = call.source().unwrap_err();
        assert!(matches!(err, RelmapError::NotSupported { .. }));

        let call = func("F").from::<Post>().column(column_of::<User>("id", 0));
        assert!(call.source().is_err());
    }
}

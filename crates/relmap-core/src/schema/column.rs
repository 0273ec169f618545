//! Column descriptors.

use std::fmt;

use relmap_common::RelmapResult;

use crate::value::{FromValue, ToValue, Value, ValueType};

type Getter<O> = Box<dyn Fn(&O) -> Value + Send + Sync>;
type Setter<O> = Box<dyn Fn(&mut O, &Value) -> RelmapResult<()> + Send + Sync>;

/// A column of the table mapping `O`, with the codecs that move one field
/// between a record and a raw value.
pub struct Column<O> {
    name: String,
    value_type: ValueType,
    primary_key: bool,
    getter: Getter<O>,
    setter: Setter<O>,
}

impl<O: 'static> Column<O> {
    /// Creates a column from a field getter and setter.
    ///
    /// The storage class is the declared type of `F`; untyped fields are
    /// declared as `BLOB`.
    ///
    /// ```rust
    /// use relmap_core::schema::Column;
    ///
    /// #[derive(Default)]
    /// struct User {
    ///     name: String,
    /// }
    ///
    /// let column = Column::new("name", |u: &User| u.name.clone(), |u: &mut User, v| u.name = v);
    /// assert_eq!(column.name(), "name");
    /// ```
    pub fn new<F, G, S>(name: impl Into<String>, getter: G, setter: S) -> Self
    where
        F: FromValue + ToValue + 'static,
        G: Fn(&O) -> F + Send + Sync + 'static,
        S: Fn(&mut O, F) + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            value_type: F::DECLARED_TYPE.unwrap_or(ValueType::Blob),
            primary_key: false,
            getter: Box::new(move |record| getter(record).to_value()),
            setter: Box::new(move |record, value| {
                setter(record, F::from_value(value)?);
                Ok(())
            }),
        }
    }

    /// Marks the column as (part of) the primary key.
    #[must_use]
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }
}

impl<O> Column<O> {
    /// Column name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared storage class.
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// Returns true if the column belongs to the primary key.
    pub fn is_primary_key(&self) -> bool {
        self.primary_key
    }

    /// Reads the field from `record`.
    pub fn encode(&self, record: &O) -> Value {
        (self.getter)(record)
    }

    /// Writes `value` into the field of `record`.
    ///
    /// # Errors
    ///
    /// Returns the codec's decode error.
    pub fn decode_into(&self, record: &mut O, value: &Value) -> RelmapResult<()> {
        (self.setter)(record, value)
    }
}

impl<O> fmt::Debug for Column<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("name", &self.name)
            .field("value_type", &self.value_type)
            .field("primary_key", &self.primary_key)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq)]
    struct Item {
        id: i64,
        label: Option<String>,
    }

    #[test]
    fn test_column_codecs() {
        let id = Column::new("id", |i: &Item| i.id, |i: &mut Item, v| i.id = v).primary_key();
        let label = Column::new("label", |i: &Item| i.label.clone(), |i: &mut Item, v| i.label = v);

        assert!(id.is_primary_key());
        assert!(!label.is_primary_key());
        assert_eq!(id.value_type(), ValueType::Integer);
        assert_eq!(label.value_type(), ValueType::Text);

        let item = Item { id: 9, label: None };
        assert_eq!(id.encode(&item), Value::integer(9));
        assert_eq!(label.encode(&item), Value::Null);

        let mut decoded = Item::default();
        id.decode_into(&mut decoded, &Value::integer(4)).unwrap();
        label.decode_into(&mut decoded, &Value::text("four")).unwrap();
        assert_eq!(
            decoded,
            Item {
                id: 4,
                label: Some("four".to_string())
            }
        );
    }

    #[test]
    fn test_column_decode_error() {
        let id = Column::new("id", |i: &Item| i.id, |i: &mut Item, v| i.id = v);
        let mut item = Item::default();
        let err = id.decode_into(&mut item, &Value::text("x")).unwrap_err();
        assert!(err.is_decode_error());
        assert_eq!(item.id, 0);
    }
}

//! Schema elements a storage registry binds.
//!
//! A binding is either a `Table<O>` governing the record type `O`, or an
//! `Index<I>` which governs no record type at all. Both expose their
//! table-type descriptor so that lookups can match on it directly.

mod column;
mod index;
mod table;

pub use column::Column;
pub use index::Index;
pub use table::Table;

use std::any::Any;
use std::fmt;

use relmap_common::TypeKey;

/// Kind of schema element behind a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingKind {
    /// A data table.
    Table,
    /// An index over a table.
    Index,
    /// The terminal sentinel.
    Empty,
}

impl fmt::Display for BindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindingKind::Table => write!(f, "table"),
            BindingKind::Index => write!(f, "index"),
            BindingKind::Empty => write!(f, "empty"),
        }
    }
}

/// A schema element bound in a storage registry.
pub trait StorageBinding: Any + Send + Sync {
    /// Kind of element.
    fn kind(&self) -> BindingKind;

    /// SQL name of the element.
    fn name(&self) -> &str;

    /// Identity of the table-type descriptor (the binding's own type).
    fn table_type(&self) -> TypeKey;

    /// Identity of the governed record type; `None` for indices and the
    /// sentinel.
    fn object_type(&self) -> Option<TypeKey>;

    /// Upcast for downcasting to the concrete binding.
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for downcasting to the concrete binding.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Returns true for the terminal sentinel.
    fn is_empty(&self) -> bool {
        self.kind() == BindingKind::Empty
    }

    /// Returns true if this binding is responsible for `key`, either as its
    /// table-type descriptor or as its record type.
    fn matches(&self, key: TypeKey) -> bool {
        self.table_type() == key || self.object_type() == Some(key)
    }
}

impl fmt::Debug for dyn StorageBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageBinding")
            .field("kind", &self.kind())
            .field("name", &self.name())
            .field("object_type", &self.object_type())
            .finish()
    }
}

/// Terminal sentinel of every binding chain.
///
/// `find` returns it for unmapped keys; it matches nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmptyBinding;

impl StorageBinding for EmptyBinding {
    fn kind(&self) -> BindingKind {
        BindingKind::Empty
    }

    fn name(&self) -> &str {
        ""
    }

    fn table_type(&self) -> TypeKey {
        TypeKey::of::<EmptyBinding>()
    }

    fn object_type(&self) -> Option<TypeKey> {
        None
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn matches(&self, _key: TypeKey) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_binding() {
        let empty = EmptyBinding;
        assert!(empty.is_empty());
        assert_eq!(empty.name(), "");
        assert_eq!(empty.object_type(), None);
        assert!(!empty.matches(TypeKey::of::<EmptyBinding>()));
        assert!(!empty.matches(TypeKey::of::<u8>()));
    }

    #[test]
    fn test_binding_debug() {
        let empty: &dyn StorageBinding = &EmptyBinding;
        let debug = format!("{:?}", empty);
        assert!(debug.contains("Empty"));
    }
}

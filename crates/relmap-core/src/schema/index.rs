//! Index bindings.

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;

use relmap_common::TypeKey;

use super::{BindingKind, StorageBinding};

/// Binding of an index, identified by the marker type `I`.
///
/// Indices govern no record type: they are found only through their own
/// table-type descriptor, `Index<I>`.
pub struct Index<I> {
    name: String,
    table: String,
    columns: Vec<String>,
    unique: bool,
    _marker: PhantomData<fn() -> I>,
}

impl<I> Index<I> {
    /// Creates an index named `name` on `table`.
    pub fn new(name: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
            columns: Vec::new(),
            unique: false,
            _marker: PhantomData,
        }
    }

    /// Appends an indexed column.
    #[must_use]
    pub fn column(mut self, name: impl Into<String>) -> Self {
        self.columns.push(name.into());
        self
    }

    /// Marks the index as unique.
    #[must_use]
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Indexed table.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Indexed columns.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns true for unique indices.
    pub fn is_unique(&self) -> bool {
        self.unique
    }
}

impl<I: 'static> StorageBinding for Index<I> {
    fn kind(&self) -> BindingKind {
        BindingKind::Index
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn table_type(&self) -> TypeKey {
        TypeKey::of::<Index<I>>()
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
}

impl<I> fmt::Debug for Index<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Index")
            .field("name", &self.name)
            .field("table", &self.table)
            .field("columns", &self.columns)
            .field("unique", &self.unique)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ByEmail;

    #[test]
    fn test_index_binding() {
        let index: Index<ByEmail> = Index::new("idx_users_email", "users").column("email").unique();
        assert_eq!(index.name(), "idx_users_email");
        assert_eq!(index.table(), "users");
        assert_eq!(index.columns(), ["email".to_string()]);
        assert!(index.is_unique());
        assert_eq!(index.kind(), BindingKind::Index);
        assert_eq!(index.object_type(), None);
        assert!(index.matches(TypeKey::of::<Index<ByEmail>>()));
        assert!(!index.matches(TypeKey::of::<ByEmail>()));
    }
}

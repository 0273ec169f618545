//! Table bindings.

use std::any::Any;

use relmap_common::{RelmapError, RelmapResult, TypeKey};

use super::{BindingKind, Column, StorageBinding};
use crate::value::Value;

/// Binding of the record type `O` to a named table.
#[derive(Debug)]
pub struct Table<O> {
    name: String,
    columns: Vec<Column<O>>,
}

impl<O: 'static> Table<O> {
    /// Creates a table with no columns.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    /// Appends a column.
    #[must_use]
    pub fn column(mut self, column: Column<O>) -> Self {
        self.columns.push(column);
        self
    }
}

impl<O> Table<O> {
    /// Table name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Columns in declaration order.
    pub fn columns(&self) -> &[Column<O>] {
        &self.columns
    }

    /// Position of the column called `name`.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name() == name)
    }

    /// Looks up a column by name.
    ///
    /// # Errors
    ///
    /// Returns `ColumnNotFound` if the table has no such column.
    pub fn find_column(&self, name: &str) -> RelmapResult<&Column<O>> {
        self.columns
            .iter()
            .find(|c| c.name() == name)
            .ok_or_else(|| RelmapError::ColumnNotFound {
                column: name.to_string(),
                table: self.name.clone(),
            })
    }

    /// Positions of the primary-key columns.
    pub fn primary_key_indices(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_primary_key())
            .map(|(i, _)| i)
            .collect()
    }

    /// Encodes `record` into one raw value per column.
    pub fn encode_row(&self, record: &O) -> Vec<Value> {
        self.columns.iter().map(|c| c.encode(record)).collect()
    }

    /// Decodes a raw row into a record.
    ///
    /// # Errors
    ///
    /// Returns `MissingArgument` if the row is shorter than the column list,
    /// or the first column decode error, tagged with the column position.
    pub fn decode_row(&self, row: &[Value]) -> RelmapResult<O>
    where
        O: Default,
    {
        let mut record = O::default();
        for (index, column) in self.columns.iter().enumerate() {
            let value = row.get(index).ok_or(RelmapError::MissingArgument {
                position: index,
                available: row.len(),
            })?;
            column
                .decode_into(&mut record, value)
                .map_err(|e| e.at_position(index))?;
        }
        Ok(record)
    }
}

impl<O: 'static> StorageBinding for Table<O> {
    fn kind(&self) -> BindingKind {
        BindingKind::Table
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn table_type(&self) -> TypeKey {
        TypeKey::of::<Table<O>>()
    }

    fn object_type(&self) -> Option<TypeKey> {
        Some(TypeKey::of::<O>())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

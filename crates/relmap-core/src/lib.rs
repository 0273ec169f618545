//! # relmap-core
//!
//! Typed mapping core: record bindings, alias classification and the
//! marshaling of raw engine values into typed callback arguments.
//!
//! This crate implements:
//! - Alias classification of record, alias and table-reference types
//! - The storage registry and its binding chain (`pick` / `find`)
//! - Argument tuple building, fixed and variadic
//! - Forward, reverse and type-only tuple traversal
//! - The value codec between engine values and Rust types
//! - User-defined scalar and aggregate functions
//! - An in-memory storage facade that drives them over stored rows
//!
//! ## Example
//!
//! ```rust
//! use relmap_common::{RelmapResult, StorageConfig};
//! use relmap_core::chain;
//! use relmap_core::function::AggregateFunction;
//! use relmap_core::schema::{Column, Table};
//! use relmap_core::storage::{func, Storage};
//! use relmap_core::value::Value;
//!
//! #[derive(Default)]
//! struct User {
//!     id: i64,
//! }
//!
//! #[derive(Default)]
//! struct Mean {
//!     total: f64,
//!     count: usize,
//! }
//!
//! impl AggregateFunction for Mean {
//!     const NAME: &'static str = "MEAN";
//!     type Args<'a> = (f64,);
//!     type Output = f64;
//!
//!     fn step(&mut self, (value,): (f64,)) -> RelmapResult<()> {
//!         self.total += value;
//!         self.count += 1;
//!         Ok(())
//!     }
//!
//!     fn finalize(self) -> f64 {
//!         self.total / self.count as f64
//!     }
//! }
//!
//! let users = Table::<User>::new("users")
//!     .column(Column::new("id", |u: &User| u.id, |u: &mut User, v| u.id = v).primary_key());
//! let storage = Storage::new(chain![users], StorageConfig::default())?;
//!
//! for id in 1..=3 {
//!     storage.replace(&User { id });
//! }
//! storage.create_aggregate_function(Mean::default)?;
//!
//! let mean = func("MEAN").column(storage.column::<User, _>("id")?);
//! assert_eq!(storage.select(&mean)?, vec![Value::real(2.0)]);
//! # Ok::<(), relmap_common::RelmapError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Alias classification
pub mod alias;

/// Argument tuple building
pub mod args;

/// User-defined functions
pub mod function;

/// Storage registry and binding chain
pub mod registry;

/// Tables, columns and indices
pub mod schema;

/// In-memory storage facade
pub mod storage;

/// Heterogeneous tuple traversal
pub mod tuple;

/// Engine values and their codec
pub mod value;

// Re-export commonly used items at the crate root
pub use alias::{classify, Alias, Classify, RecordsetOf, Role, TableAlias, TableRef, TypeClass};
pub use args::{ArgTuple, ArgValue, ArgValues, ParamShape};
pub use function::{AggregateFunction, FunctionRegistry, ScalarFunction};
pub use registry::{BindingChain, Link, Pick, StorageRegistry};
pub use schema::{Column, EmptyBinding, Index, StorageBinding, Table};
pub use storage::{func, FunctionCall, Storage};
pub use value::{FromValue, ToValue, Value, ValueType};

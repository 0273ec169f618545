//! User-defined scalar and aggregate functions.
//!
//! The two capabilities have different lifecycles and get different traits:
//!
//! - A `ScalarFunction` is one long-lived instance called once per row.
//! - An `AggregateFunction` instance is created per aggregation, receives
//!   zero or more `step` calls and is consumed by exactly one `finalize`.
//!
//! Each trait declares its parameters as an `ArgTuple`: a tuple of decodable
//! types for a fixed arity, or `ArgValues` for a variadic catch-all list.
//! The shape is read once, when the function is registered.
//!
//! ```rust
//! use relmap_common::RelmapResult;
//! use relmap_core::function::ScalarFunction;
//!
//! struct HasPrefix;
//!
//! impl ScalarFunction for HasPrefix {
//!     const NAME: &'static str = "HAS_PREFIX";
//!     type Args<'a> = (String, String);
//!     type Output = bool;
//!
//!     fn call(&mut self, (text, prefix): (String, String)) -> RelmapResult<bool> {
//!         Ok(text.starts_with(&prefix))
//!     }
//! }
//! ```

mod adapter;
mod registry;

pub use registry::{AggregateContext, FunctionInfo, FunctionRegistry};

use std::fmt;

use relmap_common::RelmapResult;

use crate::args::ArgTuple;
use crate::value::ToValue;

/// A scalar function.
pub trait ScalarFunction: Send + 'static {
    /// SQL name. Lookups are case-insensitive.
    const NAME: &'static str;

    /// Whether equal arguments always produce equal results.
    const DETERMINISTIC: bool = true;

    /// Declared parameters.
    type Args<'a>: ArgTuple<'a>;

    /// Result type.
    type Output: ToValue;

    /// Computes the result for one set of arguments.
    ///
    /// # Errors
    ///
    /// Any error aborts the statement that invoked the function.
    fn call(&mut self, args: Self::Args<'_>) -> RelmapResult<Self::Output>;
}

/// An aggregate function.
pub trait AggregateFunction: Send + 'static {
    /// SQL name. Lookups are case-insensitive.
    const NAME: &'static str;

    /// Declared parameters of `step`.
    type Args<'a>: ArgTuple<'a>;

    /// Result type.
    type Output: ToValue;

    /// Folds one row into the accumulator.
    ///
    /// # Errors
    ///
    /// Any error aborts the aggregation.
    fn step(&mut self, args: Self::Args<'_>) -> RelmapResult<()>;

    /// Produces the result, consuming the accumulator.
    fn finalize(self) -> Self::Output;
}

/// Capability a registered function provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionKind {
    /// Called once per row.
    Scalar,
    /// Stepped once per row, finalized once.
    Aggregate,
}

impl fmt::Display for FunctionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FunctionKind::Scalar => write!(f, "scalar"),
            FunctionKind::Aggregate => write!(f, "aggregate"),
        }
    }
}

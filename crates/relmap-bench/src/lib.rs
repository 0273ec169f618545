//! relmap Performance Benchmarks
//!
//! This crate contains benchmarks for the relmap mapping core:
//! - Binding lookup (`find` and `pick`)
//! - Argument tuple building, fixed and variadic
//! - Function evaluation over stored rows
//!
//! Run benchmarks with:
//! ```bash
//! cargo bench -p relmap-bench
//! ```

pub mod utils;

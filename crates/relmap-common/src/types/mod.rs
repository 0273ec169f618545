//! Core identity types for relmap.

mod key;

pub use key::TypeKey;

//! # relmap-common
//!
//! Common types, errors, and configuration for relmap.
//!
//! This crate provides the foundational pieces shared by every relmap
//! component:
//!
//! - **Types**: record-type identity (`TypeKey`)
//! - **Errors**: unified error handling with `RelmapError`
//! - **Config**: storage configuration (`StorageConfig`)
//!
//! ## Example
//!
//! ```rust
//! use relmap_common::types::TypeKey;
//! use relmap_common::error::RelmapResult;
//!
//! struct User;
//!
//! fn example() -> RelmapResult<()> {
//!     let key = TypeKey::of::<User>();
//!     assert_eq!(key.short_name(), "User");
//!     Ok(())
//! }
//! # example().unwrap();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used items at the crate root
pub use config::StorageConfig;
pub use error::{ErrorCode, RelmapError, RelmapResult};
pub use types::TypeKey;

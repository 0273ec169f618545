//! Configuration for relmap.
//!
//! This module provides the configuration consumed when a storage registry
//! and its function table are assembled.

mod storage;

pub use storage::{StorageConfig, StorageConfigBuilder, DEFAULT_MAX_FUNCTION_ARGS};

//! Error handling for relmap.
//!
//! This module provides a unified error type and result alias used
//! across all relmap components.

mod relmap;

pub use relmap::{ErrorCode, RelmapError};

/// Result type alias for relmap operations.
pub type RelmapResult<T> = std::result::Result<T, RelmapError>;

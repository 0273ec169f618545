//! Mapping, decoding and function-call error types.

use std::fmt;
use thiserror::Error;

/// Error codes for categorizing errors.
///
/// These codes can be used for programmatic error handling and
/// are stable across versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ErrorCode {
    // General errors (0x0000 - 0x00FF)
    /// Internal error (bug).
    Internal = 0x0001,
    /// Operation not supported.
    NotSupported = 0x0002,
    /// Invalid argument provided.
    InvalidArgument = 0x0003,

    // Configuration errors (0x0100 - 0x01FF)
    /// General I/O error while reading or writing configuration.
    Io = 0x0100,
    /// Configuration is malformed or out of range.
    InvalidConfig = 0x0101,

    // Mapping errors (0x0200 - 0x02FF)
    /// Type is not bound to any table or index.
    TableNotMapped = 0x0200,
    /// Same record type or descriptor bound twice.
    DuplicateBinding = 0x0201,
    /// Column not found in a mapped table.
    ColumnNotFound = 0x0202,

    // Decode errors (0x0300 - 0x03FF)
    /// Raw value cannot be converted to the declared type.
    TypeMismatch = 0x0300,
    /// NULL where a non-null value was declared.
    UnexpectedNull = 0x0301,
    /// Fewer raw values than declared slots.
    MissingArgument = 0x0302,

    // Function errors (0x0400 - 0x04FF)
    /// Function is not registered.
    NoSuchFunction = 0x0400,
    /// Call arity does not match the declared shape.
    WrongArgumentCount = 0x0401,
    /// Declared arity exceeds the configured limit.
    TooManyArguments = 0x0402,
    /// Function registered with a different kind.
    WrongFunctionKind = 0x0403,
}

impl ErrorCode {
    /// Returns the numeric code.
    #[inline]
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Returns the error category name.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match (*self as u16) >> 8 {
            0x00 => "General",
            0x01 => "Config",
            0x02 => "Mapping",
            0x03 => "Decode",
            0x04 => "Function",
            _ => "Unknown",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// The main error type for relmap.
///
/// Mapping errors are mostly caught at compile time (an unmapped type cannot
/// be picked); the variants here cover the runtime remainder: lookups made
/// by identity, value decoding, and dynamic function registration.
///
/// # Example
///
/// ```rust
/// use relmap_common::error::{ErrorCode, RelmapError};
///
/// let err = RelmapError::NoSuchFunction { name: "SQRT_CUSTOM".into() };
/// assert_eq!(err.code(), ErrorCode::NoSuchFunction);
/// assert!(err.to_string().contains("no such function"));
/// ```
#[derive(Debug, Error)]
pub enum RelmapError {
    // ==========================================================================
    // General Errors
    // ==========================================================================
    /// Internal error - this indicates a bug.
    #[error("internal error: {message}")]
    Internal {
        /// Error message.
        message: String,
    },

    /// Operation not supported.
    #[error("operation not supported: {operation}")]
    NotSupported {
        /// The unsupported operation.
        operation: String,
    },

    /// Invalid argument provided.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Error message.
        message: String,
    },

    // ==========================================================================
    // Configuration Errors
    // ==========================================================================
    /// I/O error from the underlying system.
    #[error("I/O error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Configuration file could not be parsed.
    #[error("failed to parse configuration: {source}")]
    ConfigParse {
        /// The underlying TOML error.
        #[from]
        source: toml::de::Error,
    },

    /// Configuration could not be serialized.
    #[error("failed to serialize configuration: {source}")]
    ConfigSerialize {
        /// The underlying TOML error.
        #[from]
        source: toml::ser::Error,
    },

    /// Invalid configuration.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Error message.
        message: String,
    },

    // ==========================================================================
    // Mapping Errors
    // ==========================================================================
    /// Type is not mapped to any binding.
    #[error("type '{type_name}' is not mapped to a table")]
    TableNotMapped {
        /// The unmapped type.
        type_name: String,
    },

    /// Same lookup key bound more than once.
    #[error("'{type_name}' is bound more than once (positions {first} and {second})")]
    DuplicateBinding {
        /// The duplicated type.
        type_name: String,
        /// Position of the first binding.
        first: usize,
        /// Position of the duplicate.
        second: usize,
    },

    /// Column not found.
    #[error("column '{column}' not found in table '{table}'")]
    ColumnNotFound {
        /// The missing column.
        column: String,
        /// The table name.
        table: String,
    },

    // ==========================================================================
    // Decode Errors
    // ==========================================================================
    /// Raw value cannot be decoded as the declared type.
    #[error("type mismatch{}: expected {expected}, got {actual}", position_suffix(.position))]
    TypeMismatch {
        /// Argument position, when decoding a call argument.
        position: Option<usize>,
        /// Expected type.
        expected: String,
        /// Actual storage class (and value excerpt).
        actual: String,
    },

    /// NULL where a non-null value was declared.
    #[error("unexpected NULL{}: expected {expected}", position_suffix(.position))]
    UnexpectedNull {
        /// Argument position, when decoding a call argument.
        position: Option<usize>,
        /// Expected type.
        expected: String,
    },

    /// Fewer raw values than declared slots.
    #[error("missing argument at position {position}: {available} value(s) supplied")]
    MissingArgument {
        /// First missing position.
        position: usize,
        /// Number of raw values actually supplied.
        available: usize,
    },

    // ==========================================================================
    // Function Errors
    // ==========================================================================
    /// Function was never registered (or was deleted).
    #[error("no such function: {name}")]
    NoSuchFunction {
        /// Function name as called.
        name: String,
    },

    /// Argument count does not match the declared shape.
    #[error("wrong number of arguments to function {name}(): expected {expected}, got {actual}")]
    WrongArgumentCount {
        /// Function name.
        name: String,
        /// Declared arity.
        expected: usize,
        /// Supplied arity.
        actual: usize,
    },

    /// Declared arity exceeds the configured limit.
    #[error("function {name}() declares {count} arguments, limit is {max}")]
    TooManyArguments {
        /// Function name.
        name: String,
        /// Declared arity.
        count: usize,
        /// Configured maximum.
        max: usize,
    },

    /// Scalar function used as an aggregate.
    #[error("{name}() is not an aggregate function")]
    NotAggregate {
        /// Function name.
        name: String,
    },

    /// Aggregate function used as a scalar.
    #[error("misuse of aggregate function {name}()")]
    NotScalar {
        /// Function name.
        name: String,
    },
}

fn position_suffix(position: &Option<usize>) -> String {
    match position {
        Some(pos) => format!(" at argument {}", pos),
        None => String::new(),
    }
}

impl RelmapError {
    /// Returns the error code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Internal { .. } => ErrorCode::Internal,
            Self::NotSupported { .. } => ErrorCode::NotSupported,
            Self::InvalidArgument { .. } => ErrorCode::InvalidArgument,
            Self::Io { .. } => ErrorCode::Io,
            Self::ConfigParse { .. }
            | Self::ConfigSerialize { .. }
            | Self::InvalidConfig { .. } => ErrorCode::InvalidConfig,
            Self::TableNotMapped { .. } => ErrorCode::TableNotMapped,
            Self::DuplicateBinding { .. } => ErrorCode::DuplicateBinding,
            Self::ColumnNotFound { .. } => ErrorCode::ColumnNotFound,
            Self::TypeMismatch { .. } => ErrorCode::TypeMismatch,
            Self::UnexpectedNull { .. } => ErrorCode::UnexpectedNull,
            Self::MissingArgument { .. } => ErrorCode::MissingArgument,
            Self::NoSuchFunction { .. } => ErrorCode::NoSuchFunction,
            Self::WrongArgumentCount { .. } => ErrorCode::WrongArgumentCount,
            Self::TooManyArguments { .. } => ErrorCode::TooManyArguments,
            Self::NotAggregate { .. } | Self::NotScalar { .. } => ErrorCode::WrongFunctionKind,
        }
    }

    /// Returns true if this error was raised while decoding a raw value.
    #[must_use]
    pub const fn is_decode_error(&self) -> bool {
        matches!(
            self,
            Self::TypeMismatch { .. } | Self::UnexpectedNull { .. } | Self::MissingArgument { .. }
        )
    }

    /// Returns true if this error concerns type-to-binding resolution.
    #[must_use]
    pub const fn is_mapping_error(&self) -> bool {
        matches!(
            self,
            Self::TableNotMapped { .. } | Self::DuplicateBinding { .. } | Self::ColumnNotFound { .. }
        )
    }

    /// Attaches an argument position to a decode error.
    ///
    /// Errors that already carry a position, and non-decode errors, are
    /// returned unchanged.
    #[must_use]
    pub fn at_position(self, index: usize) -> Self {
        match self {
            Self::TypeMismatch {
                position: None,
                expected,
                actual,
            } => Self::TypeMismatch {
                position: Some(index),
                expected,
                actual,
            },
            Self::UnexpectedNull {
                position: None,
                expected,
            } => Self::UnexpectedNull {
                position: Some(index),
                expected,
            },
            other => other,
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Creates an invalid argument error.
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates a type mismatch error without a position.
    #[must_use]
    pub fn type_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::TypeMismatch {
            position: None,
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        let err = RelmapError::TableNotMapped {
            type_name: "User".into(),
        };
        assert_eq!(err.code(), ErrorCode::TableNotMapped);
        assert_eq!(err.code().category(), "Mapping");
        assert_eq!(ErrorCode::TypeMismatch.category(), "Decode");
        assert_eq!(ErrorCode::NoSuchFunction.as_u16(), 0x0400);
    }

    #[test]
    fn test_error_display() {
        let err = RelmapError::NoSuchFunction {
            name: "SQRT_CUSTOM".into(),
        };
        assert_eq!(err.to_string(), "no such function: SQRT_CUSTOM");

        let err = RelmapError::type_mismatch("INTEGER", "TEXT 'abc'");
        assert_eq!(err.to_string(), "type mismatch: expected INTEGER, got TEXT 'abc'");
    }

    #[test]
    fn test_at_position() {
        let err = RelmapError::type_mismatch("REAL", "TEXT").at_position(2);
        assert_eq!(err.to_string(), "type mismatch at argument 2: expected REAL, got TEXT");

        // An existing position is kept.
        let err = err.at_position(5);
        assert!(matches!(err, RelmapError::TypeMismatch { position: Some(2), .. }));

        let err = RelmapError::UnexpectedNull {
            position: None,
            expected: "TEXT".into(),
        }
        .at_position(0);
        assert_eq!(err.to_string(), "unexpected NULL at argument 0: expected TEXT");

        let err = RelmapError::internal("boom").at_position(1);
        assert!(matches!(err, RelmapError::Internal { .. }));
    }

    #[test]
    fn test_error_predicates() {
        assert!(RelmapError::type_mismatch("INTEGER", "TEXT").is_decode_error());
        assert!(RelmapError::MissingArgument {
            position: 1,
            available: 1
        }
        .is_decode_error());
        assert!(!RelmapError::NoSuchFunction { name: "F".into() }.is_decode_error());
        assert!(RelmapError::ColumnNotFound {
            column: "id".into(),
            table: "users".into()
        }
        .is_mapping_error());
    }

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: RelmapError = io_err.into();
        assert_eq!(err.code(), ErrorCode::Io);
    }
}

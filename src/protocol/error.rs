//! Codec error types

use thiserror::Error;

/// Motor bus codec errors
#[derive(Error, Debug)]
pub enum Error {
    /// Buffer too small to hold the fixed-length payload
    #[error("buffer too small: need {needed} bytes, got {got}")]
    BufferTooSmall {
        /// Needed size
        needed: usize,
        /// Actual size
        got: usize,
    },

    /// Field value does not fit its declared bit width
    #[error("{message}.{field} out of range: {value} (max {max})")]
    FieldOverflow {
        /// Layout name of the owning message
        message: &'static str,
        /// Field name
        field: &'static str,
        /// Offending value
        value: u32,
        /// Largest encodable value
        max: u32,
    },

    /// Frame identifier not owned by any registered message
    #[error("unknown message id: {id:#010x}")]
    UnknownMessageId {
        /// Bus identifier
        id: u32,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

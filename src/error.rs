//! Error taxonomy.
//!
//! Every failure is reported before the list is touched, so an `Err` always
//! means "nothing changed".

use thiserror::Error;

/// All failures raised by list operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// A mutating operation was attempted on a frozen list.
    #[error("cannot {operation}: list is frozen")]
    Frozen { operation: &'static str },

    /// A hash or digest was requested while the list is still mutable.
    #[error("unhashable: list must be frozen before it can be hashed")]
    Unhashable,

    /// A frozen shared list reaches itself again while being hashed.
    #[error("unhashable: list contains itself")]
    Cycle,

    /// `remove` / `index_of` did not find the value.
    #[error("value not found in list")]
    NotFound,

    /// Positional access beyond the current bounds.
    /// `pop` on an empty list reports `index: 0, len: 0`.
    #[error("index {index} out of range for list of length {len}")]
    OutOfRange { index: usize, len: usize },

    /// The canonical JSON encoding could not be produced.
    #[error("canonical encoding failed: {0}")]
    Encode(String),

    /// A JSON value has no `Value` counterpart.
    #[error("invalid value: {0}")]
    InvalidValue(String),
}

pub type Result<T> = std::result::Result<T, Error>;

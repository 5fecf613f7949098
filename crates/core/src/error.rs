//! Status codes and the unified error type for sortkv.
//!
//! `Status` carries the stable ordinal values callers across a language
//! boundary would switch on; `Error` is the richer internal type engines
//! return, and every `Error` maps onto exactly one `Status`. Internal code
//! is free to use `?` and `thiserror`-derived errors; nothing here is ever
//! allowed to escape a public call as an unhandled panic or raw `io::Error`.

use std::io;
use thiserror::Error as ThisError;

/// Result alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, Error>;

/// Stable ordinal status codes, in the order fixed by the public contract.
///
/// These values are part of the ABI: append new variants at the end only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Status {
    /// The operation completed successfully.
    Ok = 0,
    /// Catch-all for unexpected conditions; a diagnostic is always set.
    UnknownError = 1,
    /// The requested key does not exist.
    NotFound = 2,
    /// The engine does not implement the requested operation.
    NotSupported = 3,
    /// A caller-supplied argument was invalid (oversize key, bad config type, ...).
    InvalidArgument = 4,
    /// Configuration parsing failed before the pool was touched.
    ConfigParsingError = 5,
    /// A configuration value was read back as the wrong type.
    ConfigTypeError = 6,
    /// A range callback returned non-zero and iteration was halted early.
    StoppedByCallback = 7,
    /// The pool or allocator could not satisfy an allocation.
    OutOfMemory = 8,
    /// `open` was called with a name not present in the dispatch registry.
    WrongEngineName = 9,
    /// The underlying pool transaction could not be opened or committed.
    TransactionScopeError = 10,
    /// The supplied comparator's name does not match the persisted name.
    ComparatorMismatch = 11,
    /// Generic failure with no more specific status.
    Failed = 12,
}

/// The unified error type returned by every sortkv crate.
#[derive(Debug, ThisError)]
pub enum Error {
    /// Requested key does not exist.
    #[error("key not found")]
    NotFound,

    /// Operation not implemented by the active engine.
    #[error("operation not supported by this engine")]
    NotSupported,

    /// Caller-supplied argument was invalid.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Configuration bag was malformed or missing a required option.
    #[error("configuration error: {0}")]
    ConfigParsingError(String),

    /// A configuration value existed under the wrong type.
    #[error("configuration type error: option {name:?} is not a {expected}")]
    ConfigTypeError {
        /// Name of the offending option.
        name: String,
        /// Type the caller expected to read.
        expected: &'static str,
    },

    /// A range callback asked iteration to stop.
    #[error("iteration stopped by callback")]
    StoppedByCallback,

    /// Allocation failed inside the pool.
    #[error("out of memory: {0}")]
    OutOfMemory(String),

    /// `open` named an engine that dispatch does not recognise.
    #[error("unknown engine name: {0:?}")]
    WrongEngineName(String),

    /// The pool transaction scope rejected or aborted a transaction.
    #[error("transaction scope error: {0}")]
    TransactionScopeError(String),

    /// Persisted comparator name does not match the one supplied at open.
    #[error("comparator mismatch: pool was created with {expected:?}, got {actual:?}")]
    ComparatorMismatch {
        /// Comparator name stored in the pool header.
        expected: String,
        /// Comparator name supplied to this open call.
        actual: String,
    },

    /// I/O failure opening, growing, or flushing the pool file.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Catch-all for conditions with no more specific status.
    #[error("failed: {0}")]
    Failed(String),

    /// Unexpected internal condition; always carries a diagnostic.
    #[error("unknown error: {0}")]
    UnknownError(String),
}

impl Error {
    /// Map this error onto its stable status code.
    pub fn status(&self) -> Status {
        match self {
            Error::NotFound => Status::NotFound,
            Error::NotSupported => Status::NotSupported,
            Error::InvalidArgument(_) => Status::InvalidArgument,
            Error::ConfigParsingError(_) => Status::ConfigParsingError,
            Error::ConfigTypeError { .. } => Status::ConfigTypeError,
            Error::StoppedByCallback => Status::StoppedByCallback,
            Error::OutOfMemory(_) => Status::OutOfMemory,
            Error::WrongEngineName(_) => Status::WrongEngineName,
            Error::TransactionScopeError(_) => Status::TransactionScopeError,
            Error::ComparatorMismatch { .. } => Status::ComparatorMismatch,
            Error::Io(_) => Status::Failed,
            Error::Failed(_) => Status::Failed,
            Error::UnknownError(_) => Status::UnknownError,
        }
    }
}

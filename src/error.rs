//! Error types.
//!
//! Every fallible engine operation reports one of the variants of [`Error`].
//! Failures coming out of the native-call layer are described by
//! [`NativeError`] and wrapped with the operation that triggered them.

use std::fmt;

/// Failure reported by a [`NativeCaller`](crate::native::NativeCaller).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeError {
    /// The library could not be opened or the entry point was not exported.
    Resolution { library: String, entry: String, reason: String },
    /// Arguments or the return value could not be marshalled.
    Invocation(String),
}

impl fmt::Display for NativeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NativeError::Resolution { library, entry, reason } => {
                write!(f, "failed to resolve {} in {}: {}", entry, library, reason)
            }
            NativeError::Invocation(msg) => write!(f, "invocation failed: {}", msg),
        }
    }
}

impl std::error::Error for NativeError {}

/// Errors raised by the binding engine.
#[derive(Debug)]
pub enum Error {
    /// Configuration rejected: changed after finalization, or unresolvable.
    Config(String),
    /// Operation not valid in the engine's current state.
    State(String),
    /// No dispatch entry for the requested operation.
    Lookup(String),
    /// Identifier could not be tokenized.
    Naming(String),
    /// The native call for `operation` failed.
    Native { operation: String, source: NativeError },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(msg) => write!(f, "configuration error: {}", msg),
            Error::State(msg) => write!(f, "state error: {}", msg),
            Error::Lookup(name) => write!(f, "no native binding registered for {}", name),
            Error::Naming(msg) => write!(f, "naming error: {}", msg),
            Error::Native { operation, source } => {
                write!(f, "native call {} failed: {}", operation, source)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Native { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

//! Unified startup/infrastructure error type.

use std::fmt;

use crate::storage::StorageError;

/// The error type returned by the service's fallible bootstrap operations.
///
/// Request-level failures (400, 404, etc.) are expressed as HTTP
/// [`Response`](crate::Response) values, not as `Error`s. This type surfaces
/// the failures that stop the process: unreadable configuration, storage
/// that cannot be opened, a port that cannot be bound.
#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    Config(String),
    Storage(StorageError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io: {err}"),
            Self::Config(message) => write!(f, "config: {message}"),
            Self::Storage(err) => write!(f, "storage: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Config(_) => None,
            Self::Storage(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

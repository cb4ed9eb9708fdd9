//! Student storage contract and its implementations.
//!
//! # Responsibility
//! - Define the capability every handler depends on ([`StudentStore`]).
//! - Keep SQL details inside the SQLite adapter.
//!
//! # Invariants
//! - All SQL is parameterized; values never reach a query string.
//! - `update_student` and `delete_student` report [`StorageError::NotFound`]
//!   for unknown ids and mutate nothing in that case.
//! - Ids are issued in strictly increasing order and never reused.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

use crate::model::{Student, StudentId};

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

pub type StorageResult<T> = Result<T, StorageError>;

/// Shared handle passed to every handler.
pub type SharedStore = Arc<dyn StudentStore>;

/// Storage failure for student persistence operations.
#[derive(Debug)]
pub enum StorageError {
    NotFound(StudentId),
    Sqlite(rusqlite::Error),
    Unavailable(String),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "no student found with id {id}"),
            Self::Sqlite(err) => write!(f, "query error: {err}"),
            Self::Unavailable(message) => write!(f, "storage unavailable: {message}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::NotFound(_) | Self::Unavailable(_) => None,
        }
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Persistence capability for student records.
///
/// Calls are synchronous; async callers run them on the blocking pool.
pub trait StudentStore: Send + Sync {
    fn create_student(&self, name: &str, email: &str, age: i64) -> StorageResult<StudentId>;
    fn get_student_by_id(&self, id: StudentId) -> StorageResult<Student>;
    fn get_students(&self) -> StorageResult<Vec<Student>>;
    fn update_student(
        &self,
        id: StudentId,
        name: &str,
        email: &str,
        age: i64,
    ) -> StorageResult<Student>;
    fn delete_student(&self, id: StudentId) -> StorageResult<()>;

    /// Cheap reachability check used by the readiness check.
    fn ping(&self) -> StorageResult<()> {
        Ok(())
    }
}

//! SQLite-backed student store.
//!
//! One `rusqlite::Connection` behind a mutex. Every statement is a single
//! parameterized call; the table is created on open when absent.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{error, info};

use super::{StorageError, StorageResult, StudentStore};
use crate::model::{Student, StudentId};

const CREATE_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS students (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT NOT NULL,
    age INTEGER NOT NULL
);";

const STUDENT_SELECT_SQL: &str = "SELECT id, name, email, age FROM students";

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Student store persisted in a single SQLite table.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens (or creates) the database file at `path` and ensures the table.
    ///
    /// Missing parent directories are created.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref();
        let started_at = Instant::now();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|err| {
                StorageError::Unavailable(format!(
                    "failed to create storage directory `{}`: {err}",
                    parent.display()
                ))
            })?;
        }

        let store = Connection::open(path)
            .map_err(StorageError::from)
            .and_then(Self::bootstrap);

        match &store {
            Ok(_) => info!(
                path = %path.display(),
                duration_ms = started_at.elapsed().as_millis() as u64,
                "storage opened"
            ),
            Err(err) => error!(path = %path.display(), "failed to open storage: {err}"),
        }
        store
    }

    /// Opens a private in-memory database. Contents vanish on drop.
    pub fn open_in_memory() -> StorageResult<Self> {
        Connection::open_in_memory()
            .map_err(StorageError::from)
            .and_then(Self::bootstrap)
    }

    fn bootstrap(conn: Connection) -> StorageResult<Self> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch(CREATE_TABLE_SQL)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    fn conn(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StorageError::Unavailable("connection lock poisoned".to_string()))
    }
}

impl StudentStore for SqliteStore {
    fn create_student(&self, name: &str, email: &str, age: i64) -> StorageResult<StudentId> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO students (name, email, age) VALUES (?1, ?2, ?3);",
            params![name, email, age],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn get_student_by_id(&self, id: StudentId) -> StorageResult<Student> {
        let conn = self.conn()?;
        select_by_id(&conn, id)?.ok_or(StorageError::NotFound(id))
    }

    fn get_students(&self) -> StorageResult<Vec<Student>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("{STUDENT_SELECT_SQL} ORDER BY id ASC;"))?;
        let students = stmt
            .query_map([], parse_student_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(students)
    }

    fn update_student(
        &self,
        id: StudentId,
        name: &str,
        email: &str,
        age: i64,
    ) -> StorageResult<Student> {
        let conn = self.conn()?;
        if select_by_id(&conn, id)?.is_none() {
            return Err(StorageError::NotFound(id));
        }

        conn.execute(
            "UPDATE students SET name = ?1, email = ?2, age = ?3 WHERE id = ?4;",
            params![name, email, age, id],
        )?;

        select_by_id(&conn, id)?.ok_or(StorageError::NotFound(id))
    }

    fn delete_student(&self, id: StudentId) -> StorageResult<()> {
        let conn = self.conn()?;
        let changed = conn.execute("DELETE FROM students WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(StorageError::NotFound(id));
        }
        Ok(())
    }

    fn ping(&self) -> StorageResult<()> {
        let conn = self.conn()?;
        conn.query_row("SELECT 1;", [], |row| row.get::<_, i64>(0))?;
        Ok(())
    }
}

fn select_by_id(conn: &Connection, id: StudentId) -> StorageResult<Option<Student>> {
    let student = conn
        .query_row(
            &format!("{STUDENT_SELECT_SQL} WHERE id = ?1 LIMIT 1;"),
            [id],
            parse_student_row,
        )
        .optional()?;
    Ok(student)
}

fn parse_student_row(row: &Row<'_>) -> rusqlite::Result<Student> {
    Ok(Student {
        id: row.get("id")?,
        name: row.get("name")?,
        email: row.get("email")?,
        age: row.get("age")?,
    })
}

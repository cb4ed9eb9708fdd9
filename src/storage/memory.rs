//! In-memory student store for tests and demos.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use super::{StorageError, StorageResult, StudentStore};
use crate::model::{Student, StudentId};

#[derive(Default)]
struct Inner {
    rows: BTreeMap<StudentId, Student>,
    last_id: StudentId,
}

/// Student store kept entirely in process memory.
///
/// Mirrors the SQLite adapter's contract: ids start at 1, increase strictly
/// and are never reused, listing is ordered by id.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn inner(&self) -> StorageResult<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| StorageError::Unavailable("memory store lock poisoned".to_string()))
    }
}

impl StudentStore for MemoryStore {
    fn create_student(&self, name: &str, email: &str, age: i64) -> StorageResult<StudentId> {
        let mut inner = self.inner()?;
        inner.last_id += 1;
        let id = inner.last_id;
        inner.rows.insert(
            id,
            Student { id, name: name.to_owned(), email: email.to_owned(), age },
        );
        Ok(id)
    }

    fn get_student_by_id(&self, id: StudentId) -> StorageResult<Student> {
        self.inner()?
            .rows
            .get(&id)
            .cloned()
            .ok_or(StorageError::NotFound(id))
    }

    fn get_students(&self) -> StorageResult<Vec<Student>> {
        Ok(self.inner()?.rows.values().cloned().collect())
    }

    fn update_student(
        &self,
        id: StudentId,
        name: &str,
        email: &str,
        age: i64,
    ) -> StorageResult<Student> {
        let mut inner = self.inner()?;
        let student = inner.rows.get_mut(&id).ok_or(StorageError::NotFound(id))?;
        student.name = name.to_owned();
        student.email = email.to_owned();
        student.age = age;
        Ok(student.clone())
    }

    fn delete_student(&self, id: StudentId) -> StorageResult<()> {
        self.inner()?
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or(StorageError::NotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryStore;
    use crate::storage::{StorageError, StudentStore};

    #[test]
    fn ids_start_at_one_and_are_not_reused() {
        let store = MemoryStore::new();
        let first = store.create_student("Ann", "ann@x.com", 21).unwrap();
        store.delete_student(first).unwrap();
        let second = store.create_student("Bob", "bob@x.com", 22).unwrap();

        assert_eq!(first, 1);
        assert_eq!(second, 2);
    }

    #[test]
    fn delete_missing_id_is_not_found() {
        let store = MemoryStore::new();
        assert!(matches!(store.delete_student(3), Err(StorageError::NotFound(3))));
    }
}

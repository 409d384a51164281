use std::collections::HashMap;

use async_trait::async_trait;
use edemy_progress::CourseProgressRecord;
use tokio::sync::RwLock;

use super::{ProgressStore, StoreError};

type RecordKey = (String, String);

/// Process-local store used when no database is configured.
#[derive(Debug, Default)]
pub struct MemoryProgressStore {
    records: RwLock<HashMap<RecordKey, CourseProgressRecord>>,
}

impl MemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    fn key(user_id: &str, course_id: &str) -> RecordKey {
        (user_id.to_string(), course_id.to_string())
    }
}

#[async_trait]
impl ProgressStore for MemoryProgressStore {
    async fn find(
        &self,
        user_id: &str,
        course_id: &str,
    ) -> Result<Option<CourseProgressRecord>, StoreError> {
        let records = self.records.read().await;
        Ok(records.get(&Self::key(user_id, course_id)).cloned())
    }

    async fn create_if_absent(
        &self,
        user_id: &str,
        course_id: &str,
    ) -> Result<CourseProgressRecord, StoreError> {
        let mut records = self.records.write().await;
        let record = records
            .entry(Self::key(user_id, course_id))
            .or_insert_with(|| CourseProgressRecord::new(user_id, course_id));
        Ok(record.clone())
    }

    async fn save(
        &self,
        record: &CourseProgressRecord,
    ) -> Result<CourseProgressRecord, StoreError> {
        let mut records = self.records.write().await;
        let key = Self::key(&record.user_id, &record.course_id);
        let current_revision = records.get(&key).map(|r| r.revision).unwrap_or(0);

        if current_revision != record.revision {
            return Err(StoreError::Conflict {
                user_id: record.user_id.clone(),
                course_id: record.course_id.clone(),
            });
        }

        let mut saved = record.clone();
        saved.revision = current_revision + 1;
        records.insert(key, saved.clone());
        Ok(saved)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_if_absent_is_idempotent() {
        let store = MemoryProgressStore::new();
        assert!(store.find("u1", "c1").await.unwrap().is_none());

        let mut created = store.create_if_absent("u1", "c1").await.unwrap();
        assert!(created.lecture_completed.is_empty());
        assert!(created.lecture_progress.is_empty());
        assert!(!created.completed);

        created.mark_lecture_completed("l1");
        store.save(&created).await.unwrap();

        let again = store.create_if_absent("u1", "c1").await.unwrap();
        assert!(again.is_lecture_completed("l1"));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_stale_save_conflicts_and_keeps_state() {
        let store = MemoryProgressStore::new();
        let mut first = store.create_if_absent("u1", "c1").await.unwrap();
        let mut second = first.clone();

        first.mark_lecture_completed("l1");
        let saved = store.save(&first).await.unwrap();
        assert_eq!(saved.revision, first.revision + 1);

        second.mark_lecture_completed("l2");
        let err = store.save(&second).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }));

        let stored = store.find("u1", "c1").await.unwrap().unwrap();
        assert!(stored.is_lecture_completed("l1"));
        assert!(!stored.is_lecture_completed("l2"));
    }

    #[tokio::test]
    async fn test_first_save_inserts_once() {
        let store = MemoryProgressStore::new();
        let mut mine = CourseProgressRecord::new("u1", "c1");
        let mut theirs = mine.clone();

        mine.mark_lecture_completed("l1");
        let saved = store.save(&mine).await.unwrap();
        assert_eq!(saved.revision, 1);

        theirs.mark_lecture_completed("l2");
        let err = store.save(&theirs).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }));
        assert_eq!(store.find("u1", "c1").await.unwrap(), Some(saved));
    }

    #[tokio::test]
    async fn test_records_are_keyed_per_user_and_course() {
        let store = MemoryProgressStore::new();
        store.create_if_absent("u1", "c1").await.unwrap();
        store.create_if_absent("u1", "c2").await.unwrap();
        store.create_if_absent("u2", "c1").await.unwrap();

        assert_eq!(store.len().await, 3);
        assert!(store.find("u2", "c2").await.unwrap().is_none());
    }
}

//! Durable access to course progress records by (user, course).
//!
//! Writes are full-document and guarded by the record's `revision`: a save
//! against a stale revision fails with [`StoreError::Conflict`] and leaves
//! the stored document untouched, so callers reload and reapply.

mod memory;
mod postgres;

pub use memory::MemoryProgressStore;
pub use postgres::PgProgressStore;

use async_trait::async_trait;
use edemy_progress::CourseProgressRecord;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Transient; the operation may be retried
    #[error("progress store unavailable: {0}")]
    Unavailable(String),
    #[error("concurrent update of progress for user {user_id} course {course_id}")]
    Conflict { user_id: String, course_id: String },
    #[error("stored progress could not be decoded: {0}")]
    Corrupt(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                StoreError::Corrupt(err.to_string())
            }
            other => StoreError::Unavailable(other.to_string()),
        }
    }
}

#[async_trait]
pub trait ProgressStore: Send + Sync {
    async fn find(
        &self,
        user_id: &str,
        course_id: &str,
    ) -> Result<Option<CourseProgressRecord>, StoreError>;

    /// Returns the existing record, or persists and returns an empty one.
    async fn create_if_absent(
        &self,
        user_id: &str,
        course_id: &str,
    ) -> Result<CourseProgressRecord, StoreError>;

    /// Persists the full record if nobody saved since it was loaded.
    ///
    /// A record at revision 0 has never been saved: it is inserted, and
    /// conflicts if the pair was saved meanwhile. Returns the record carrying
    /// its new revision.
    async fn save(&self, record: &CourseProgressRecord)
        -> Result<CourseProgressRecord, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}

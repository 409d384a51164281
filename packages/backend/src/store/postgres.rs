use async_trait::async_trait;
use edemy_progress::CourseProgressRecord;

use super::{ProgressStore, StoreError};
use crate::db::operations::progress;
use crate::db::DatabaseProxy;

/// `course_progress` table in Postgres.
#[derive(Clone)]
pub struct PgProgressStore {
    proxy: DatabaseProxy,
}

impl PgProgressStore {
    pub fn new(proxy: DatabaseProxy) -> Self {
        Self { proxy }
    }
}

#[async_trait]
impl ProgressStore for PgProgressStore {
    async fn find(
        &self,
        user_id: &str,
        course_id: &str,
    ) -> Result<Option<CourseProgressRecord>, StoreError> {
        let row = progress::find_course_progress(self.proxy.pool(), user_id, course_id).await?;

        row.map(|r| {
            r.into_record()
                .map_err(|err| StoreError::Corrupt(err.to_string()))
        })
        .transpose()
    }

    async fn create_if_absent(
        &self,
        user_id: &str,
        course_id: &str,
    ) -> Result<CourseProgressRecord, StoreError> {
        if progress::insert_course_progress_if_absent(self.proxy.pool(), user_id, course_id).await? {
            tracing::debug!(%user_id, %course_id, "created course progress record");
        }

        self.find(user_id, course_id)
            .await?
            .ok_or_else(|| StoreError::Unavailable("record vanished after insert".to_string()))
    }

    async fn save(
        &self,
        record: &CourseProgressRecord,
    ) -> Result<CourseProgressRecord, StoreError> {
        let row = progress::CourseProgressRow::from_record(record)
            .map_err(|err| StoreError::Corrupt(err.to_string()))?;

        let revision = if row.revision == 0 {
            progress::insert_course_progress(self.proxy.pool(), &row).await?
        } else {
            progress::update_course_progress(self.proxy.pool(), &row).await?
        };

        match revision {
            Some(revision) => {
                let mut saved = record.clone();
                saved.revision = revision;
                Ok(saved)
            }
            None => Err(StoreError::Conflict {
                user_id: record.user_id.clone(),
                course_id: record.course_id.clone(),
            }),
        }
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.proxy
            .ping()
            .await
            .map(|_| ())
            .map_err(|err| StoreError::Unavailable(err.to_string()))
    }
}

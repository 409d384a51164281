//! Watch-progress reconciliation.
//!
//! Every write is a read-modify-write of the whole (user, course) record.
//! Lost races are detected by the store's revision check and resolved by
//! reloading and reapplying the same change, which is safe because both the
//! sample fold and manual completion are idempotent.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use edemy_progress::{summarize, CourseProgressRecord, CourseProgressSummary, SampleError, WatchSample};
use thiserror::Error;

use crate::catalog::CourseCatalog;
use crate::store::{ProgressStore, StoreError};

#[derive(Debug, Error)]
pub enum ProgressError {
    #[error("{0}")]
    Validation(String),
    #[error("course {0} not found")]
    CourseNotFound(String),
    #[error("gave up after {attempts} conflicting writes")]
    Contended { attempts: u32 },
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<SampleError> for ProgressError {
    fn from(err: SampleError) -> Self {
        ProgressError::Validation(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkOutcome {
    pub already_completed: bool,
}

#[derive(Clone)]
pub struct ProgressService {
    store: Arc<dyn ProgressStore>,
    max_attempts: u32,
    store_timeout: Duration,
}

impl ProgressService {
    pub fn new(store: Arc<dyn ProgressStore>, max_attempts: u32, store_timeout: Duration) -> Self {
        Self {
            store,
            max_attempts: max_attempts.max(1),
            store_timeout,
        }
    }

    pub async fn report_watch_sample(
        &self,
        user_id: &str,
        course_id: &str,
        lecture_id: &str,
        watch_time: f64,
        total_duration: Option<f64>,
    ) -> Result<CourseProgressRecord, ProgressError> {
        let user_id = require_id("userId", user_id)?;
        let course_id = require_id("courseId", course_id)?;
        let sample = WatchSample::new(require_id("lectureId", lecture_id)?, watch_time, total_duration)?;

        let (record, outcome) = self
            .update(user_id, course_id, |record| {
                let outcome = record.apply_watch_sample(&sample);
                (outcome, true)
            })
            .await?;

        if outcome.newly_completed {
            tracing::info!(
                %user_id,
                %course_id,
                lecture_id = sample.lecture_id(),
                "lecture auto-completed by watch time"
            );
        }

        Ok(record)
    }

    pub async fn mark_lecture_completed(
        &self,
        user_id: &str,
        course_id: &str,
        lecture_id: &str,
    ) -> Result<MarkOutcome, ProgressError> {
        let user_id = require_id("userId", user_id)?;
        let course_id = require_id("courseId", course_id)?;
        let lecture_id = require_id("lectureId", lecture_id)?;

        let (_, already_completed) = self
            .update(user_id, course_id, |record| {
                let already = record.mark_lecture_completed(lecture_id);
                (already, !already)
            })
            .await?;

        Ok(MarkOutcome { already_completed })
    }

    pub async fn get_progress(
        &self,
        user_id: &str,
        course_id: &str,
    ) -> Result<Option<CourseProgressRecord>, ProgressError> {
        let user_id = require_id("userId", user_id)?;
        let course_id = require_id("courseId", course_id)?;

        Ok(self
            .bounded("find", self.store.find(user_id, course_id))
            .await?)
    }

    /// Derived per-course numbers; never cached.
    pub async fn course_summary(
        &self,
        user_id: &str,
        course_id: &str,
        catalog: &dyn CourseCatalog,
    ) -> Result<CourseProgressSummary, ProgressError> {
        let record = self.get_progress(user_id, course_id).await?;
        let content = self
            .bounded("course_content", catalog.course_content(course_id))
            .await?
            .ok_or_else(|| ProgressError::CourseNotFound(course_id.to_string()))?;

        Ok(summarize(record.as_ref(), &content))
    }

    /// Load, apply, save; retried on revision conflicts.
    ///
    /// A missing record starts empty in memory and only exists once its
    /// first save succeeds. `apply` returns its result plus whether the
    /// record needs saving.
    async fn update<R, F>(
        &self,
        user_id: &str,
        course_id: &str,
        mut apply: F,
    ) -> Result<(CourseProgressRecord, R), ProgressError>
    where
        F: FnMut(&mut CourseProgressRecord) -> (R, bool),
    {
        for attempt in 1..=self.max_attempts {
            let mut record = self
                .bounded("find", self.store.find(user_id, course_id))
                .await?
                .unwrap_or_else(|| CourseProgressRecord::new(user_id, course_id));

            let (result, dirty) = apply(&mut record);
            if !dirty {
                return Ok((record, result));
            }

            match self.bounded("save", self.store.save(&record)).await {
                Ok(saved) => return Ok((saved, result)),
                Err(StoreError::Conflict { .. }) => {
                    tracing::debug!(%user_id, %course_id, attempt, "progress save conflict, retrying");
                }
                Err(err) => return Err(err.into()),
            }
        }

        tracing::warn!(
            %user_id,
            %course_id,
            attempts = self.max_attempts,
            "progress save kept conflicting"
        );
        Err(ProgressError::Contended {
            attempts: self.max_attempts,
        })
    }

    async fn bounded<T, F>(&self, op: &'static str, fut: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        match tokio::time::timeout(self.store_timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(op, timeout_ms = self.store_timeout.as_millis() as u64, "store call timed out");
                Err(StoreError::Unavailable(format!("{op} timed out")))
            }
        }
    }
}

fn require_id<'a>(name: &str, value: &'a str) -> Result<&'a str, ProgressError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ProgressError::Validation(format!("{name} is required")));
    }
    Ok(trimmed)
}

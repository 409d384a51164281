//! Progress records, watch samples and shared constants.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ==================== Constants ====================

/// Watched fraction at which a lecture is auto-completed
pub const COMPLETION_THRESHOLD: f64 = 0.9;

/// Authored lecture durations are stored in minutes
pub const SECONDS_PER_MINUTE: f64 = 60.0;

// ==================== Lecture progress ====================

/// Watch state of a single lecture, embedded in a [`CourseProgressRecord`]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LectureProgress {
    pub lecture_id: String,
    /// Furthest reported playback position, seconds
    #[serde(default)]
    pub watch_time: f64,
    /// Media length as last reported by a player, seconds
    #[serde(default)]
    pub total_duration: f64,
    #[serde(default)]
    pub completed: bool,
}

impl LectureProgress {
    pub fn new(lecture_id: impl Into<String>, total_duration: f64) -> Self {
        Self {
            lecture_id: lecture_id.into(),
            watch_time: 0.0,
            total_duration,
            completed: false,
        }
    }

    /// Position playback should resume from, if any.
    ///
    /// Only lectures that were started but not watched to the end resume;
    /// a finished lecture restarts from the beginning.
    pub fn resume_position(&self) -> Option<f64> {
        if self.watch_time > 0.0 && self.watch_time < self.total_duration {
            Some(self.watch_time)
        } else {
            None
        }
    }

    /// Watched share for display, clamped to `[0, 100]`.
    pub fn percent_watched(&self) -> f64 {
        if self.total_duration <= 0.0 {
            return 0.0;
        }
        (self.watch_time / self.total_duration * 100.0).clamp(0.0, 100.0)
    }

    pub(crate) fn reaches_threshold(&self) -> bool {
        self.total_duration > 0.0 && self.watch_time / self.total_duration >= COMPLETION_THRESHOLD
    }

    /// Join with another view of the same lecture: furthest watch time,
    /// sticky completion, `other`'s duration when it knows one.
    pub fn merge(&mut self, other: &LectureProgress) {
        self.watch_time = self.watch_time.max(other.watch_time);
        if other.total_duration > 0.0 {
            self.total_duration = other.total_duration;
        }
        self.completed |= other.completed;
    }
}

// ==================== Course progress ====================

/// Progress of one user through one course
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseProgressRecord {
    pub user_id: String,
    pub course_id: String,
    /// Whole-course flag; carried but not derived from lecture state
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub lecture_completed: BTreeSet<String>,
    #[serde(default, with = "lecture_map")]
    pub lecture_progress: BTreeMap<String, LectureProgress>,
    /// Store-managed write counter used for optimistic concurrency
    #[serde(skip)]
    pub revision: i64,
}

impl CourseProgressRecord {
    pub fn new(user_id: impl Into<String>, course_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            course_id: course_id.into(),
            completed: false,
            lecture_completed: BTreeSet::new(),
            lecture_progress: BTreeMap::new(),
            revision: 0,
        }
    }

    pub fn lecture(&self, lecture_id: &str) -> Option<&LectureProgress> {
        self.lecture_progress.get(lecture_id)
    }

    pub fn is_lecture_completed(&self, lecture_id: &str) -> bool {
        self.lecture_completed.contains(lecture_id)
    }

    /// Resume position for a lecture, see [`LectureProgress::resume_position`].
    pub fn resume_position(&self, lecture_id: &str) -> Option<f64> {
        self.lecture(lecture_id)
            .and_then(LectureProgress::resume_position)
    }
}

/// `lectureProgress` travels as an array of entries; duplicate ids coming
/// from older documents are merged monotonically.
mod lecture_map {
    use std::collections::BTreeMap;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::LectureProgress;

    pub fn serialize<S>(
        map: &BTreeMap<String, LectureProgress>,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let entries: Vec<&LectureProgress> = map.values().collect();
        entries.serialize(serializer)
    }

    pub fn deserialize<'de, D>(
        deserializer: D,
    ) -> Result<BTreeMap<String, LectureProgress>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let entries = Vec::<LectureProgress>::deserialize(deserializer)?;
        let mut map: BTreeMap<String, LectureProgress> = BTreeMap::new();
        for entry in entries {
            match map.get_mut(&entry.lecture_id) {
                Some(existing) => existing.merge(&entry),
                None => {
                    map.insert(entry.lecture_id.clone(), entry);
                }
            }
        }
        Ok(map)
    }
}

// ==================== Watch samples ====================

/// Validation failures for an incoming playback sample
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SampleError {
    #[error("lectureId is required")]
    MissingLectureId,
    #[error("watchTime must be a non-negative number, got {0}")]
    InvalidWatchTime(f64),
    #[error("totalDuration must be a non-negative number, got {0}")]
    InvalidTotalDuration(f64),
}

/// One validated (position, duration) reading for a lecture
#[derive(Clone, Debug, PartialEq)]
pub struct WatchSample {
    lecture_id: String,
    watch_time: f64,
    total_duration: Option<f64>,
}

impl WatchSample {
    pub fn new(
        lecture_id: impl Into<String>,
        watch_time: f64,
        total_duration: Option<f64>,
    ) -> Result<Self, SampleError> {
        let lecture_id = lecture_id.into();
        if lecture_id.trim().is_empty() {
            return Err(SampleError::MissingLectureId);
        }
        if !watch_time.is_finite() || watch_time < 0.0 {
            return Err(SampleError::InvalidWatchTime(watch_time));
        }
        if let Some(total) = total_duration {
            if !total.is_finite() || total < 0.0 {
                return Err(SampleError::InvalidTotalDuration(total));
            }
        }

        Ok(Self {
            lecture_id,
            watch_time,
            total_duration,
        })
    }

    pub fn lecture_id(&self) -> &str {
        &self.lecture_id
    }

    pub fn watch_time(&self) -> f64 {
        self.watch_time
    }

    pub fn total_duration(&self) -> Option<f64> {
        self.total_duration
    }
}

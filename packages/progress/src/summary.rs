//! Authored course structure and the derived completion aggregate.
//!
//! The aggregate is a pure function of a progress record and the authored
//! content; it is recomputed on every read.

use serde::{Deserialize, Serialize};

use crate::types::{CourseProgressRecord, SECONDS_PER_MINUTE};

/// A lecture as authored by the educator
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lecture {
    pub lecture_id: String,
    #[serde(default)]
    pub lecture_title: String,
    /// Authored length in minutes
    #[serde(default)]
    pub lecture_duration: f64,
    #[serde(default)]
    pub lecture_url: String,
    #[serde(default)]
    pub is_preview_free: bool,
}

impl Lecture {
    pub fn authored_seconds(&self) -> f64 {
        (self.lecture_duration * SECONDS_PER_MINUTE).max(0.0)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    #[serde(default)]
    pub chapter_id: String,
    #[serde(default)]
    pub chapter_title: String,
    #[serde(default)]
    pub chapter_content: Vec<Lecture>,
}

/// Chapter/lecture structure of a course
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseContent {
    pub course_id: String,
    #[serde(default)]
    pub course_content: Vec<Chapter>,
}

impl CourseContent {
    pub fn lectures(&self) -> impl Iterator<Item = &Lecture> {
        self.course_content
            .iter()
            .flat_map(|chapter| chapter.chapter_content.iter())
    }

    pub fn lecture_count(&self) -> usize {
        self.lectures().count()
    }
}

/// Per-course numbers shown next to an enrollment
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseProgressSummary {
    pub course_id: String,
    pub total_lectures: usize,
    pub lectures_completed: usize,
    /// Watched share of the whole course, `[0, 100]`
    pub progress_percent: f64,
}

/// Watched share of a course across all authored lectures, clamped to `[0, 100]`.
///
/// A tracked lecture contributes its stored watch time and its reported
/// duration (the authored one when no player has reported it yet); an
/// untracked lecture contributes only its authored duration.
pub fn completion_percentage(
    record: Option<&CourseProgressRecord>,
    content: &CourseContent,
) -> f64 {
    let mut total_watch = 0.0;
    let mut total_duration = 0.0;

    for lecture in content.lectures() {
        match record.and_then(|r| r.lecture(&lecture.lecture_id)) {
            Some(progress) => {
                total_watch += progress.watch_time;
                total_duration += if progress.total_duration > 0.0 {
                    progress.total_duration
                } else {
                    lecture.authored_seconds()
                };
            }
            None => total_duration += lecture.authored_seconds(),
        }
    }

    if total_duration <= 0.0 {
        return 0.0;
    }
    (total_watch / total_duration * 100.0).clamp(0.0, 100.0)
}

pub fn summarize(
    record: Option<&CourseProgressRecord>,
    content: &CourseContent,
) -> CourseProgressSummary {
    CourseProgressSummary {
        course_id: content.course_id.clone(),
        total_lectures: content.lecture_count(),
        lectures_completed: record.map(|r| r.lecture_completed.len()).unwrap_or(0),
        progress_percent: completion_percentage(record, content),
    }
}

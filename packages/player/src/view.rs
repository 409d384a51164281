use std::collections::{HashMap, HashSet};

use edemy_progress::{summarize, CourseContent, CourseProgressRecord, CourseProgressSummary};
use parking_lot::RwLock;

/// Latest known progress per course, as seen by this client.
///
/// Server responses can arrive out of order, so every update is merged
/// rather than replacing what is already held.
#[derive(Debug, Default)]
pub struct ProgressView {
    records: RwLock<HashMap<String, CourseProgressRecord>>,
    loaded: RwLock<HashSet<String>>,
}

impl ProgressView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&self, record: CourseProgressRecord) {
        let mut records = self.records.write();
        match records.get_mut(&record.course_id) {
            Some(existing) => existing.merge(&record),
            None => {
                records.insert(record.course_id.clone(), record);
            }
        }
    }

    /// Result of a full fetch; `None` means the server has no record yet.
    pub fn apply_loaded(&self, course_id: &str, record: Option<CourseProgressRecord>) {
        if let Some(record) = record {
            self.apply(record);
        }
        self.loaded.write().insert(course_id.to_string());
    }

    pub fn is_loaded(&self, course_id: &str) -> bool {
        self.loaded.read().contains(course_id)
    }

    pub fn record(&self, course_id: &str) -> Option<CourseProgressRecord> {
        self.records.read().get(course_id).cloned()
    }

    pub fn resume_position(&self, course_id: &str, lecture_id: &str) -> Option<f64> {
        self.records
            .read()
            .get(course_id)
            .and_then(|record| record.resume_position(lecture_id))
    }

    pub fn is_lecture_completed(&self, course_id: &str, lecture_id: &str) -> bool {
        self.records
            .read()
            .get(course_id)
            .is_some_and(|record| record.is_lecture_completed(lecture_id))
    }

    pub fn summary(&self, content: &CourseContent) -> CourseProgressSummary {
        let records = self.records.read();
        summarize(records.get(&content.course_id), content)
    }
}

//! Folding playback samples and manual completions into a record.
//!
//! The sample fold is commutative and idempotent in `watch_time` (a `max`),
//! so duplicated or reordered deliveries converge to the same state.

use crate::types::{CourseProgressRecord, LectureProgress, WatchSample};

/// What a single sample changed
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SampleOutcome {
    /// The lecture entry did not exist before this sample
    pub created_lecture: bool,
    /// The stored watch time moved forward
    pub advanced: bool,
    /// This sample crossed the completion threshold
    pub newly_completed: bool,
}

impl CourseProgressRecord {
    /// Merge one playback sample into the record.
    pub fn apply_watch_sample(&mut self, sample: &WatchSample) -> SampleOutcome {
        let mut outcome = SampleOutcome::default();
        let lecture_id = sample.lecture_id();

        let entry = self
            .lecture_progress
            .entry(lecture_id.to_string())
            .or_insert_with(|| {
                outcome.created_lecture = true;
                LectureProgress::new(lecture_id, sample.total_duration().unwrap_or(0.0))
            });

        if sample.watch_time() > entry.watch_time {
            entry.watch_time = sample.watch_time();
            outcome.advanced = true;
        }

        if let Some(total) = sample.total_duration().filter(|total| *total > 0.0) {
            entry.total_duration = total;
        }

        if entry.reaches_threshold() {
            outcome.newly_completed = !entry.completed;
            entry.completed = true;
            if self.lecture_completed.insert(lecture_id.to_string()) {
                outcome.newly_completed = true;
            }
        }

        outcome
    }

    /// Manually mark a lecture complete. Returns `true` when it already was.
    ///
    /// Watch time and duration are left untouched.
    pub fn mark_lecture_completed(&mut self, lecture_id: &str) -> bool {
        if self.lecture_completed.contains(lecture_id) {
            return true;
        }

        self.lecture_completed.insert(lecture_id.to_string());
        if let Some(entry) = self.lecture_progress.get_mut(lecture_id) {
            entry.completed = true;
        }
        false
    }

    /// Fold another snapshot of the same (user, course) record into this one.
    ///
    /// Never loses progress held by either side, so snapshots may be applied
    /// in any order.
    pub fn merge(&mut self, other: &CourseProgressRecord) {
        for (lecture_id, theirs) in &other.lecture_progress {
            match self.lecture_progress.get_mut(lecture_id) {
                Some(ours) => ours.merge(theirs),
                None => {
                    self.lecture_progress
                        .insert(lecture_id.clone(), theirs.clone());
                }
            }
        }

        self.lecture_completed
            .extend(other.lecture_completed.iter().cloned());
        self.completed |= other.completed;
        self.revision = self.revision.max(other.revision);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(lecture: &str, watch: f64, total: Option<f64>) -> WatchSample {
        WatchSample::new(lecture, watch, total).unwrap()
    }

    #[test]
    fn test_first_sample_creates_lecture() {
        let mut record = CourseProgressRecord::new("u1", "c1");
        let outcome = record.apply_watch_sample(&sample("l1", 30.0, Some(300.0)));

        assert!(outcome.created_lecture);
        assert!(outcome.advanced);
        assert!(!outcome.newly_completed);
        assert_eq!(record.lecture_progress.len(), 1);

        let lp = record.lecture("l1").unwrap();
        assert_eq!(lp.watch_time, 30.0);
        assert_eq!(lp.total_duration, 300.0);
        assert!(!lp.completed);
    }

    #[test]
    fn test_watch_time_never_regresses() {
        let mut record = CourseProgressRecord::new("u1", "c1");
        record.apply_watch_sample(&sample("l1", 100.0, Some(300.0)));
        let outcome = record.apply_watch_sample(&sample("l1", 40.0, Some(300.0)));

        assert!(!outcome.advanced);
        assert_eq!(record.lecture("l1").unwrap().watch_time, 100.0);
    }

    #[test]
    fn test_threshold_completion() {
        let mut record = CourseProgressRecord::new("u1", "c1");
        record.apply_watch_sample(&sample("l1", 89.0, Some(100.0)));
        assert!(!record.lecture("l1").unwrap().completed);
        assert!(!record.is_lecture_completed("l1"));

        let outcome = record.apply_watch_sample(&sample("l1", 90.0, Some(100.0)));
        assert!(outcome.newly_completed);
        assert!(record.lecture("l1").unwrap().completed);
        assert!(record.is_lecture_completed("l1"));

        let again = record.apply_watch_sample(&sample("l1", 95.0, Some(100.0)));
        assert!(!again.newly_completed);
        assert_eq!(record.lecture_completed.len(), 1);
    }

    #[test]
    fn test_missing_or_zero_duration_keeps_stored_value() {
        let mut record = CourseProgressRecord::new("u1", "c1");
        record.apply_watch_sample(&sample("l1", 10.0, Some(200.0)));
        record.apply_watch_sample(&sample("l1", 20.0, None));
        record.apply_watch_sample(&sample("l1", 30.0, Some(0.0)));

        assert_eq!(record.lecture("l1").unwrap().total_duration, 200.0);
    }

    #[test]
    fn test_later_duration_wins() {
        let mut record = CourseProgressRecord::new("u1", "c1");
        record.apply_watch_sample(&sample("l1", 50.0, Some(1000.0)));
        let outcome = record.apply_watch_sample(&sample("l1", 50.0, Some(55.0)));

        assert_eq!(record.lecture("l1").unwrap().total_duration, 55.0);
        assert!(outcome.newly_completed);
    }

    #[test]
    fn test_unknown_duration_never_completes() {
        let mut record = CourseProgressRecord::new("u1", "c1");
        record.apply_watch_sample(&sample("l1", 5000.0, None));

        assert!(!record.lecture("l1").unwrap().completed);
        assert!(record.lecture_completed.is_empty());
    }

    #[test]
    fn test_manual_completion_is_idempotent() {
        let mut record = CourseProgressRecord::new("u1", "c1");
        record.apply_watch_sample(&sample("l1", 50.0, Some(300.0)));

        assert!(!record.mark_lecture_completed("l1"));
        let once = record.clone();
        assert!(record.mark_lecture_completed("l1"));

        assert_eq!(record, once);
        let lp = record.lecture("l1").unwrap();
        assert!(lp.completed);
        assert_eq!(lp.watch_time, 50.0);
        assert_eq!(lp.total_duration, 300.0);
    }

    #[test]
    fn test_manual_completion_without_sample() {
        let mut record = CourseProgressRecord::new("u1", "c1");
        assert!(!record.mark_lecture_completed("l9"));

        assert!(record.is_lecture_completed("l9"));
        assert!(record.lecture_progress.is_empty());
    }

    #[test]
    fn test_sample_after_manual_completion_keeps_flag() {
        let mut record = CourseProgressRecord::new("u1", "c1");
        record.mark_lecture_completed("l1");
        record.apply_watch_sample(&sample("l1", 10.0, Some(300.0)));

        assert!(record.is_lecture_completed("l1"));
        assert!(!record.lecture("l1").unwrap().completed);
    }

    #[test]
    fn test_merge_keeps_furthest_progress_from_either_side() {
        let mut newer = CourseProgressRecord::new("u1", "c1");
        newer.apply_watch_sample(&sample("l1", 120.0, Some(300.0)));
        newer.mark_lecture_completed("l2");

        let mut older = CourseProgressRecord::new("u1", "c1");
        older.apply_watch_sample(&sample("l1", 60.0, Some(300.0)));
        older.apply_watch_sample(&sample("l3", 5.0, Some(100.0)));

        let mut merged = newer.clone();
        merged.merge(&older);

        assert_eq!(merged.lecture("l1").unwrap().watch_time, 120.0);
        assert_eq!(merged.lecture("l3").unwrap().watch_time, 5.0);
        assert!(merged.is_lecture_completed("l2"));

        let mut other_way = older;
        other_way.merge(&newer);
        assert_eq!(other_way, merged);
    }
}

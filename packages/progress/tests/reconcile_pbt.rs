//! Property-Based Tests for progress reconciliation
//!
//! Tests the following invariants:
//! - Monotonicity: final watch time is the max of all samples, in any order
//! - Order independence: permuted sample streams reach the same record
//! - Completion stickiness: once completed, a lecture stays completed
//! - Manual completion idempotence
//! - Percentage bounds: the course aggregate stays within [0, 100]

use proptest::prelude::*;

use edemy_progress::{
    completion_percentage, Chapter, CourseContent, CourseProgressRecord, Lecture, WatchSample,
};

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_seconds() -> impl Strategy<Value = f64> {
    (0u32..=7200u32).prop_map(|v| v as f64 / 2.0)
}

fn arb_sample(lecture_id: &'static str) -> impl Strategy<Value = WatchSample> {
    (arb_seconds(), proptest::option::of(arb_seconds())).prop_map(move |(watch, total)| {
        WatchSample::new(lecture_id, watch, total).expect("generated sample is valid")
    })
}

fn arb_samples() -> impl Strategy<Value = Vec<WatchSample>> {
    prop::collection::vec(
        prop_oneof![arb_sample("l1"), arb_sample("l2"), arb_sample("l3")],
        1..40,
    )
}

fn arb_content() -> impl Strategy<Value = CourseContent> {
    prop::collection::vec(0u32..=120u32, 0..6).prop_map(|minutes| CourseContent {
        course_id: "c1".to_string(),
        course_content: vec![Chapter {
            chapter_id: "ch1".to_string(),
            chapter_title: "Chapter".to_string(),
            chapter_content: minutes
                .into_iter()
                .enumerate()
                .map(|(i, m)| Lecture {
                    lecture_id: format!("l{}", i + 1),
                    lecture_title: String::new(),
                    lecture_duration: m as f64,
                    lecture_url: String::new(),
                    is_preview_free: false,
                })
                .collect(),
        }],
    })
}

fn fold(samples: &[WatchSample]) -> CourseProgressRecord {
    let mut record = CourseProgressRecord::new("u1", "c1");
    for sample in samples {
        record.apply_watch_sample(sample);
    }
    record
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// PBT-1: stored watch time equals the maximum reported watch time
    #[test]
    fn watch_time_is_max_of_samples(samples in arb_samples()) {
        let record = fold(&samples);

        for (lecture_id, progress) in &record.lecture_progress {
            let expected = samples
                .iter()
                .filter(|s| s.lecture_id() == lecture_id)
                .map(WatchSample::watch_time)
                .fold(0.0_f64, f64::max);
            prop_assert_eq!(progress.watch_time, expected);
        }
    }

    /// PBT-2: reversing delivery order does not change watch times
    #[test]
    fn watch_time_is_order_independent(samples in arb_samples()) {
        let forward = fold(&samples);
        let mut reversed_samples = samples.clone();
        reversed_samples.reverse();
        let reversed = fold(&reversed_samples);

        prop_assert_eq!(forward.lecture_progress.len(), reversed.lecture_progress.len());
        for (lecture_id, progress) in &forward.lecture_progress {
            let other = reversed.lecture(lecture_id).expect("same lectures tracked");
            prop_assert_eq!(progress.watch_time, other.watch_time);
        }
    }

    /// PBT-3: delivering every sample twice is the same as delivering it once
    #[test]
    fn duplicate_delivery_is_harmless(samples in arb_samples()) {
        let once = fold(&samples);
        let doubled: Vec<WatchSample> = samples
            .iter()
            .flat_map(|s| [s.clone(), s.clone()])
            .collect();
        let twice = fold(&doubled);

        prop_assert_eq!(once, twice);
    }

    /// PBT-4: a completed lecture never reverts, and completion implies membership
    #[test]
    fn completion_is_sticky(samples in arb_samples()) {
        let mut record = CourseProgressRecord::new("u1", "c1");
        let mut seen_completed: Vec<String> = Vec::new();

        for sample in &samples {
            record.apply_watch_sample(sample);
            for id in &seen_completed {
                prop_assert!(record.lecture(id).map(|lp| lp.completed).unwrap_or(false));
                prop_assert!(record.is_lecture_completed(id));
            }
            for (id, lp) in &record.lecture_progress {
                if lp.completed && !seen_completed.contains(id) {
                    seen_completed.push(id.clone());
                }
            }
        }
    }

    /// PBT-5: marking complete twice equals marking complete once
    #[test]
    fn manual_completion_is_idempotent(samples in arb_samples()) {
        let mut once = fold(&samples);
        once.mark_lecture_completed("l2");

        let mut twice = once.clone();
        let already = twice.mark_lecture_completed("l2");

        prop_assert!(already);
        prop_assert_eq!(once, twice);
    }

    /// PBT-6: course percentage stays within [0, 100]
    #[test]
    fn percentage_is_bounded(samples in arb_samples(), content in arb_content()) {
        let record = fold(&samples);
        let percent = completion_percentage(Some(&record), &content);

        prop_assert!((0.0..=100.0).contains(&percent));
    }
}

//! # edemy-progress - lecture watch-progress model
//!
//! Pure Rust model shared by the Edemy backend and player:
//!
//! - **Records** - per-(user, course) progress with per-lecture watch detail
//! - **Reconciliation** - folding a playback sample into a record (monotonic
//!   watch time, 90% auto-completion) and the manual "mark complete" path
//! - **Resume rule** - where playback should restart for a lecture
//! - **Course aggregate** - completion percentage derived from authored content
//!
//! ## Module layout
//!
//! - [`types`] - records, samples and constants
//! - [`reconcile`] - sample fold and manual completion
//! - [`summary`] - authored course content and the derived aggregate
//!
//! ## Example
//!
//! ```rust
//! use edemy_progress::{CourseProgressRecord, WatchSample};
//!
//! let mut record = CourseProgressRecord::new("user_1", "course_1");
//! let sample = WatchSample::new("lecture_1", 95.0, Some(100.0)).unwrap();
//! let outcome = record.apply_watch_sample(&sample);
//!
//! assert!(outcome.newly_completed);
//! assert!(record.is_lecture_completed("lecture_1"));
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod reconcile;
pub mod summary;
pub mod types;

// ============================================================================
// Re-exports
// ============================================================================

pub use reconcile::SampleOutcome;
pub use summary::{
    completion_percentage, summarize, Chapter, CourseContent, CourseProgressSummary, Lecture,
};
pub use types::*;

pub mod courses;
pub mod progress;

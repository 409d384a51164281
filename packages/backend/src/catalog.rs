//! Read-only view of authored course structure, owned by the course service.

use std::collections::HashMap;

use async_trait::async_trait;
use edemy_progress::{Chapter, CourseContent};
use parking_lot::RwLock;

use crate::db::operations::courses;
use crate::db::DatabaseProxy;
use crate::store::StoreError;

#[async_trait]
pub trait CourseCatalog: Send + Sync {
    async fn course_content(&self, course_id: &str) -> Result<Option<CourseContent>, StoreError>;
}

#[derive(Clone)]
pub struct PgCourseCatalog {
    proxy: DatabaseProxy,
}

impl PgCourseCatalog {
    pub fn new(proxy: DatabaseProxy) -> Self {
        Self { proxy }
    }
}

#[async_trait]
impl CourseCatalog for PgCourseCatalog {
    async fn course_content(&self, course_id: &str) -> Result<Option<CourseContent>, StoreError> {
        let Some(raw) = courses::get_course_content(self.proxy.pool(), course_id).await? else {
            return Ok(None);
        };

        let chapters: Vec<Chapter> =
            serde_json::from_value(raw).map_err(|err| StoreError::Corrupt(err.to_string()))?;

        Ok(Some(CourseContent {
            course_id: course_id.to_string(),
            course_content: chapters,
        }))
    }
}

/// Catalog kept in memory; filled by whoever embeds the service.
#[derive(Debug, Default)]
pub struct MemoryCourseCatalog {
    courses: RwLock<HashMap<String, CourseContent>>,
}

impl MemoryCourseCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, content: CourseContent) {
        self.courses
            .write()
            .insert(content.course_id.clone(), content);
    }
}

#[async_trait]
impl CourseCatalog for MemoryCourseCatalog {
    async fn course_content(&self, course_id: &str) -> Result<Option<CourseContent>, StoreError> {
        Ok(self.courses.read().get(course_id).cloned())
    }
}

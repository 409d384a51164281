use serde_json::Value;
use sqlx::{PgPool, Row};

/// Authored chapter/lecture JSON of a published course.
pub async fn get_course_content(
    pool: &PgPool,
    course_id: &str,
) -> Result<Option<Value>, sqlx::Error> {
    let row = sqlx::query(
        r#"SELECT "courseContent" FROM "courses" WHERE "id" = $1 AND "isPublished" = TRUE LIMIT 1"#,
    )
    .bind(course_id)
    .fetch_optional(pool)
    .await?;

    row.map(|r| r.try_get::<Value, _>("courseContent"))
        .transpose()
}

use chrono::Utc;
use edemy_progress::CourseProgressRecord;
use serde_json::{json, Value};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

/// Raw `course_progress` row; JSONB columns are decoded by [`Self::into_record`].
#[derive(Debug, Clone)]
pub struct CourseProgressRow {
    pub user_id: String,
    pub course_id: String,
    pub completed: bool,
    pub lecture_completed: Value,
    pub lecture_progress: Value,
    pub revision: i64,
}

impl CourseProgressRow {
    /// Encodes the record's lecture detail into its JSONB column values.
    pub fn from_record(record: &CourseProgressRecord) -> Result<Self, serde_json::Error> {
        Ok(Self {
            user_id: record.user_id.clone(),
            course_id: record.course_id.clone(),
            completed: record.completed,
            lecture_completed: serde_json::to_value(&record.lecture_completed)?,
            lecture_progress: serde_json::to_value(
                record.lecture_progress.values().collect::<Vec<_>>(),
            )?,
            revision: record.revision,
        })
    }

    pub fn into_record(self) -> Result<CourseProgressRecord, serde_json::Error> {
        let mut record: CourseProgressRecord = serde_json::from_value(json!({
            "userId": self.user_id,
            "courseId": self.course_id,
            "completed": self.completed,
            "lectureCompleted": self.lecture_completed,
            "lectureProgress": self.lecture_progress,
        }))?;
        record.revision = self.revision;
        Ok(record)
    }
}

pub async fn find_course_progress(
    pool: &PgPool,
    user_id: &str,
    course_id: &str,
) -> Result<Option<CourseProgressRow>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT "userId", "courseId", "completed", "lectureCompleted", "lectureProgress", "revision"
        FROM "course_progress"
        WHERE "userId" = $1 AND "courseId" = $2
        LIMIT 1
        "#,
    )
    .bind(user_id)
    .bind(course_id)
    .fetch_optional(pool)
    .await?;

    row.map(|r| map_course_progress_row(&r)).transpose()
}

/// Inserts an empty record unless one already exists for the pair.
pub async fn insert_course_progress_if_absent(
    pool: &PgPool,
    user_id: &str,
    course_id: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO "course_progress" ("id", "userId", "courseId")
        VALUES ($1, $2, $3)
        ON CONFLICT ("userId", "courseId") DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(course_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// First write of a record: inserts the row, or takes over an existing row
/// that was created empty and never saved. Returns `None` when someone else
/// already saved the pair.
pub async fn insert_course_progress(
    pool: &PgPool,
    row: &CourseProgressRow,
) -> Result<Option<i64>, sqlx::Error> {
    let saved = sqlx::query(
        r#"
        INSERT INTO "course_progress"
            ("id", "userId", "courseId", "completed", "lectureCompleted", "lectureProgress", "revision", "updatedAt")
        VALUES ($1, $2, $3, $4, $5, $6, 1, $7)
        ON CONFLICT ("userId", "courseId") DO UPDATE
        SET "completed" = EXCLUDED."completed",
            "lectureCompleted" = EXCLUDED."lectureCompleted",
            "lectureProgress" = EXCLUDED."lectureProgress",
            "revision" = "course_progress"."revision" + 1,
            "updatedAt" = EXCLUDED."updatedAt"
        WHERE "course_progress"."revision" = 0
        RETURNING "revision"
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&row.user_id)
    .bind(&row.course_id)
    .bind(row.completed)
    .bind(&row.lecture_completed)
    .bind(&row.lecture_progress)
    .bind(Utc::now())
    .fetch_optional(pool)
    .await?;

    saved.map(|r| r.try_get::<i64, _>("revision")).transpose()
}

/// Writes the full document if the stored revision still equals
/// `row.revision`. Returns the new revision, or `None` on a lost race.
pub async fn update_course_progress(
    pool: &PgPool,
    row: &CourseProgressRow,
) -> Result<Option<i64>, sqlx::Error> {
    let saved = sqlx::query(
        r#"
        UPDATE "course_progress"
        SET "completed" = $3,
            "lectureCompleted" = $4,
            "lectureProgress" = $5,
            "revision" = "revision" + 1,
            "updatedAt" = $6
        WHERE "userId" = $1 AND "courseId" = $2 AND "revision" = $7
        RETURNING "revision"
        "#,
    )
    .bind(&row.user_id)
    .bind(&row.course_id)
    .bind(row.completed)
    .bind(&row.lecture_completed)
    .bind(&row.lecture_progress)
    .bind(Utc::now())
    .bind(row.revision)
    .fetch_optional(pool)
    .await?;

    saved.map(|r| r.try_get::<i64, _>("revision")).transpose()
}

fn map_course_progress_row(row: &PgRow) -> Result<CourseProgressRow, sqlx::Error> {
    Ok(CourseProgressRow {
        user_id: row.try_get("userId")?,
        course_id: row.try_get("courseId")?,
        completed: row.try_get("completed")?,
        lecture_completed: row.try_get("lectureCompleted")?,
        lecture_progress: row.try_get("lectureProgress")?,
        revision: row.try_get("revision")?,
    })
}

use axum::body::Bytes;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Extension, Json, Router};
use edemy_progress::{CourseProgressRecord, CourseProgressSummary};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::auth::AuthUser;
use crate::response::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/update-watch-progress", post(update_watch_progress))
        .route("/update-course-progress", post(update_course_progress))
        .route("/get-course-progress", post(get_course_progress))
        .route("/get-course-summary", post(get_course_summary))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WatchProgressBody {
    #[serde(default)]
    course_id: String,
    #[serde(default)]
    lecture_id: String,
    watch_time: Option<f64>,
    total_duration: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LectureBody {
    #[serde(default)]
    course_id: String,
    #[serde(default)]
    lecture_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CourseBody {
    #[serde(default)]
    course_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProgressDataResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
    progress_data: Option<CourseProgressRecord>,
}

#[derive(Debug, Serialize)]
struct MessageResponse {
    success: bool,
    message: &'static str,
}

#[derive(Debug, Serialize)]
struct SummaryResponse {
    success: bool,
    summary: CourseProgressSummary,
}

fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, AppError> {
    serde_json::from_slice(body)
        .map_err(|err| AppError::validation(format!("Invalid request body: {err}")))
}

async fn update_watch_progress(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    body: Bytes,
) -> Result<Response, AppError> {
    let body: WatchProgressBody = parse_body(&body)?;
    let watch_time = body
        .watch_time
        .ok_or_else(|| AppError::validation("watchTime is required"))?;

    let record = state
        .progress_service()
        .report_watch_sample(
            &user.id,
            &body.course_id,
            &body.lecture_id,
            watch_time,
            body.total_duration,
        )
        .await?;

    Ok(Json(ProgressDataResponse {
        success: true,
        message: Some("Watch progress updated"),
        progress_data: Some(record),
    })
    .into_response())
}

async fn update_course_progress(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    body: Bytes,
) -> Result<Response, AppError> {
    let body: LectureBody = parse_body(&body)?;

    let outcome = state
        .progress_service()
        .mark_lecture_completed(&user.id, &body.course_id, &body.lecture_id)
        .await?;

    let message = if outcome.already_completed {
        "Lecture Already Completed"
    } else {
        "Progress Updated"
    };

    Ok(Json(MessageResponse {
        success: true,
        message,
    })
    .into_response())
}

async fn get_course_progress(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    body: Bytes,
) -> Result<Response, AppError> {
    let body: CourseBody = parse_body(&body)?;

    let record = state
        .progress_service()
        .get_progress(&user.id, &body.course_id)
        .await?;

    Ok(Json(ProgressDataResponse {
        success: true,
        message: None,
        progress_data: record,
    })
    .into_response())
}

async fn get_course_summary(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    body: Bytes,
) -> Result<Response, AppError> {
    let body: CourseBody = parse_body(&body)?;

    let catalog = state.catalog();
    let summary = state
        .progress_service()
        .course_summary(&user.id, &body.course_id, catalog.as_ref())
        .await?;

    Ok(Json(SummaryResponse {
        success: true,
        summary,
    })
    .into_response())
}

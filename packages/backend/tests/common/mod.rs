#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use edemy_backend::catalog::MemoryCourseCatalog;
use edemy_backend::config::{AuthMode, Config};
use edemy_backend::state::AppState;
use edemy_progress::{Chapter, CourseContent, Lecture};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

pub const JWT_SECRET: &str = "integration-secret";

pub async fn create_test_app() -> Router {
    create_app_with(AuthMode::TrustedHeader)
}

pub fn create_app_with(auth_mode: AuthMode) -> Router {
    let config = Config {
        auth_mode,
        jwt_secret: Some(JWT_SECRET.to_string()),
        ..Config::default()
    };

    let catalog = Arc::new(MemoryCourseCatalog::new());
    catalog.insert(sample_course());

    edemy_backend::build_router(AppState::in_memory(config, catalog))
}

/// `course-1`: lectures of 10, 20 and 30 authored minutes.
pub fn sample_course() -> CourseContent {
    let lecture = |id: &str, minutes: f64| Lecture {
        lecture_id: id.to_string(),
        lecture_title: format!("Lecture {id}"),
        lecture_duration: minutes,
        lecture_url: format!("https://youtu.be/{id}"),
        is_preview_free: false,
    };

    CourseContent {
        course_id: "course-1".to_string(),
        course_content: vec![
            Chapter {
                chapter_id: "ch-1".to_string(),
                chapter_title: "Basics".to_string(),
                chapter_content: vec![lecture("lec-1", 10.0), lecture("lec-2", 20.0)],
            },
            Chapter {
                chapter_id: "ch-2".to_string(),
                chapter_title: "Advanced".to_string(),
                chapter_content: vec![lecture("lec-3", 30.0)],
            },
        ],
    }
}

pub async fn post_as(app: &Router, user_id: &str, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header("x-user-id", user_id)
        .body(Body::from(body.to_string()))
        .unwrap();

    send(app, request).await
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

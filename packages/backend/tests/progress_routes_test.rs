use axum::http::StatusCode;
use serde_json::{json, Value};

mod common;

const WATCH: &str = "/api/user/update-watch-progress";
const MARK: &str = "/api/user/update-course-progress";
const GET: &str = "/api/user/get-course-progress";
const SUMMARY: &str = "/api/user/get-course-summary";

fn lecture<'a>(progress_data: &'a Value, lecture_id: &str) -> Option<&'a Value> {
    progress_data["lectureProgress"]
        .as_array()?
        .iter()
        .find(|entry| entry["lectureId"] == lecture_id)
}

#[tokio::test]
async fn test_first_sample_creates_record() {
    let app = common::create_test_app().await;

    let (status, body) = common::post_as(&app, "user-1", GET, json!({ "courseId": "course-1" })).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["progressData"].is_null());

    let (status, body) = common::post_as(
        &app,
        "user-1",
        WATCH,
        json!({ "courseId": "course-1", "lectureId": "lec-1", "watchTime": 42, "totalDuration": 600 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let data = &body["progressData"];
    assert_eq!(data["userId"], "user-1");
    assert_eq!(data["courseId"], "course-1");
    assert_eq!(data["lectureProgress"].as_array().unwrap().len(), 1);
    assert_eq!(lecture(data, "lec-1").unwrap()["watchTime"], 42.0);
    assert_eq!(data["lectureCompleted"], json!([]));
}

#[tokio::test]
async fn test_watch_time_never_regresses() {
    let app = common::create_test_app().await;

    for watch_time in [120, 300, 60] {
        common::post_as(
            &app,
            "user-1",
            WATCH,
            json!({ "courseId": "course-1", "lectureId": "lec-2", "watchTime": watch_time, "totalDuration": 1200 }),
        )
        .await;
    }

    let (_, body) = common::post_as(&app, "user-1", GET, json!({ "courseId": "course-1" })).await;
    assert_eq!(lecture(&body["progressData"], "lec-2").unwrap()["watchTime"], 300.0);
}

#[tokio::test]
async fn test_ninety_percent_completes_lecture() {
    let app = common::create_test_app().await;

    let (_, body) = common::post_as(
        &app,
        "user-1",
        WATCH,
        json!({ "courseId": "course-1", "lectureId": "lec-1", "watchTime": 540, "totalDuration": 600 }),
    )
    .await;

    let data = &body["progressData"];
    assert_eq!(lecture(data, "lec-1").unwrap()["completed"], true);
    assert_eq!(data["lectureCompleted"], json!(["lec-1"]));

    // A later, smaller sample does not undo completion.
    let (_, body) = common::post_as(
        &app,
        "user-1",
        WATCH,
        json!({ "courseId": "course-1", "lectureId": "lec-1", "watchTime": 10, "totalDuration": 600 }),
    )
    .await;
    assert_eq!(body["progressData"]["lectureCompleted"], json!(["lec-1"]));
}

#[tokio::test]
async fn test_mark_complete_messages() {
    let app = common::create_test_app().await;
    let body = json!({ "courseId": "course-1", "lectureId": "lec-3" });

    let (status, first) = common::post_as(&app, "user-1", MARK, body.clone()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["message"], "Progress Updated");

    let (status, second) = common::post_as(&app, "user-1", MARK, body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["message"], "Lecture Already Completed");

    let (_, progress) = common::post_as(&app, "user-1", GET, json!({ "courseId": "course-1" })).await;
    assert_eq!(progress["progressData"]["lectureCompleted"], json!(["lec-3"]));
}

#[tokio::test]
async fn test_records_are_isolated_per_user() {
    let app = common::create_test_app().await;

    common::post_as(
        &app,
        "user-1",
        WATCH,
        json!({ "courseId": "course-1", "lectureId": "lec-1", "watchTime": 30 }),
    )
    .await;

    let (_, body) = common::post_as(&app, "user-2", GET, json!({ "courseId": "course-1" })).await;
    assert!(body["progressData"].is_null());
}

#[tokio::test]
async fn test_validation_errors() {
    let app = common::create_test_app().await;

    let cases = [
        json!({ "lectureId": "lec-1", "watchTime": 5 }),
        json!({ "courseId": "course-1", "watchTime": 5 }),
        json!({ "courseId": "course-1", "lectureId": "lec-1" }),
        json!({ "courseId": "course-1", "lectureId": "lec-1", "watchTime": -1 }),
        json!({ "courseId": "course-1", "lectureId": "lec-1", "watchTime": "ten" }),
    ];

    for case in cases {
        let (status, body) = common::post_as(&app, "user-1", WATCH, case.clone()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "case {case}");
        assert_eq!(body["success"], false);
    }

    let (_, body) = common::post_as(&app, "user-1", GET, json!({ "courseId": "course-1" })).await;
    assert!(body["progressData"].is_null());
}

#[tokio::test]
async fn test_course_summary() {
    let app = common::create_test_app().await;

    common::post_as(
        &app,
        "user-1",
        WATCH,
        json!({ "courseId": "course-1", "lectureId": "lec-1", "watchTime": 600, "totalDuration": 600 }),
    )
    .await;

    let (status, body) =
        common::post_as(&app, "user-1", SUMMARY, json!({ "courseId": "course-1" })).await;
    assert_eq!(status, StatusCode::OK);

    let summary = &body["summary"];
    assert_eq!(summary["totalLectures"], 3);
    assert_eq!(summary["lecturesCompleted"], 1);
    let percent = summary["progressPercent"].as_f64().unwrap();
    assert!((percent - 16.6667).abs() < 0.001);
}

#[tokio::test]
async fn test_summary_without_progress_is_zero() {
    let app = common::create_test_app().await;

    let (status, body) =
        common::post_as(&app, "user-9", SUMMARY, json!({ "courseId": "course-1" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["summary"]["lecturesCompleted"], 0);
    assert_eq!(body["summary"]["progressPercent"], 0.0);
}

#[tokio::test]
async fn test_summary_unknown_course() {
    let app = common::create_test_app().await;

    let (status, body) =
        common::post_as(&app, "user-1", SUMMARY, json!({ "courseId": "missing" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

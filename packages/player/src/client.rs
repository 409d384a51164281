//! Talking to the progress API.

use std::time::Duration;

use async_trait::async_trait;
use edemy_progress::{CourseProgressRecord, CourseProgressSummary};
use parking_lot::RwLock;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid base url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("network error: {0}")]
    Network(String),
    #[error("request timed out")]
    Timeout,
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },
    #[error("request rejected: {0}")]
    Rejected(String),
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Network(err.to_string())
        }
    }
}

/// Whether a manual completion changed anything
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkResult {
    Updated,
    AlreadyCompleted,
}

#[async_trait]
pub trait ProgressClient: Send + Sync {
    async fn report_watch_progress(
        &self,
        course_id: &str,
        lecture_id: &str,
        watch_time: f64,
        total_duration: f64,
    ) -> Result<CourseProgressRecord, ClientError>;

    async fn mark_lecture_completed(
        &self,
        course_id: &str,
        lecture_id: &str,
    ) -> Result<MarkResult, ClientError>;

    async fn course_progress(
        &self,
        course_id: &str,
    ) -> Result<Option<CourseProgressRecord>, ClientError>;

    async fn course_summary(&self, course_id: &str) -> Result<CourseProgressSummary, ClientError>;
}

#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

pub struct HttpProgressClient {
    base_url: Url,
    client: reqwest::Client,
    token: RwLock<Option<String>>,
}

impl HttpProgressClient {
    pub fn new(config: HttpClientConfig) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            base_url: normalize_base(&config.base_url)?,
            client,
            token: RwLock::new(None),
        })
    }

    /// Bearer token sent with every request; `None` clears it.
    pub fn set_token(&self, token: Option<String>) {
        *self.token.write() = token;
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self.base_url.join(path)?)
    }

    async fn post(&self, path: &str, body: Value) -> Result<Envelope, ClientError> {
        let url = self.endpoint(path)?;
        let token = self.token.read().clone();
        let mut request = self.client.post(url).json(&body);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await?;

        decode_envelope(status, &bytes)
    }
}

#[async_trait]
impl ProgressClient for HttpProgressClient {
    async fn report_watch_progress(
        &self,
        course_id: &str,
        lecture_id: &str,
        watch_time: f64,
        total_duration: f64,
    ) -> Result<CourseProgressRecord, ClientError> {
        let envelope = self
            .post(
                "api/user/update-watch-progress",
                json!({
                    "courseId": course_id,
                    "lectureId": lecture_id,
                    "watchTime": watch_time,
                    "totalDuration": total_duration,
                }),
            )
            .await?;

        envelope
            .progress_data
            .ok_or_else(|| ClientError::Decode("missing progressData".to_string()))
    }

    async fn mark_lecture_completed(
        &self,
        course_id: &str,
        lecture_id: &str,
    ) -> Result<MarkResult, ClientError> {
        let envelope = self
            .post(
                "api/user/update-course-progress",
                json!({ "courseId": course_id, "lectureId": lecture_id }),
            )
            .await?;

        Ok(match envelope.message.as_deref() {
            Some("Lecture Already Completed") => MarkResult::AlreadyCompleted,
            _ => MarkResult::Updated,
        })
    }

    async fn course_progress(
        &self,
        course_id: &str,
    ) -> Result<Option<CourseProgressRecord>, ClientError> {
        let envelope = self
            .post("api/user/get-course-progress", json!({ "courseId": course_id }))
            .await?;

        Ok(envelope.progress_data)
    }

    async fn course_summary(&self, course_id: &str) -> Result<CourseProgressSummary, ClientError> {
        let envelope = self
            .post("api/user/get-course-summary", json!({ "courseId": course_id }))
            .await?;

        envelope
            .summary
            .ok_or_else(|| ClientError::Decode("missing summary".to_string()))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope {
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    progress_data: Option<CourseProgressRecord>,
    #[serde(default)]
    summary: Option<CourseProgressSummary>,
}

fn decode_envelope(status: u16, bytes: &[u8]) -> Result<Envelope, ClientError> {
    let parsed: Result<Envelope, _> = serde_json::from_slice(bytes);

    if !(200..300).contains(&status) {
        let message = parsed
            .ok()
            .and_then(|envelope| envelope.message)
            .unwrap_or_else(|| String::from_utf8_lossy(bytes).into_owned());
        return Err(ClientError::Status { status, message });
    }

    let envelope = parsed.map_err(|err| ClientError::Decode(err.to_string()))?;
    if !envelope.success {
        return Err(ClientError::Rejected(envelope.message.unwrap_or_default()));
    }
    Ok(envelope)
}

fn normalize_base(raw: &str) -> Result<Url, ClientError> {
    let trimmed = raw.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };
    Ok(Url::parse(&with_slash)?)
}

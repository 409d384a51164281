use async_trait::async_trait;

use crate::surface::{PlaybackEvent, PlaybackSurface, SurfaceBackend, SurfaceError};

/// `stateChange` code reported by the embedded player when a video ends.
pub const STATE_ENDED: i32 = 0;

/// Bridge to an embedded third-party player instance.
#[async_trait]
pub trait EmbeddedPlayerHandle: Send + Sync {
    async fn get_current_time(&self) -> Result<f64, SurfaceError>;
    async fn get_duration(&self) -> Result<f64, SurfaceError>;
    async fn seek_to(&self, seconds: f64, allow_seek_ahead: bool) -> Result<(), SurfaceError>;
}

/// Native events raised by the embedded player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddedEvent {
    Ready,
    StateChange(i32),
}

pub struct EmbeddedPlayer<H> {
    handle: H,
    video_id: String,
}

impl<H: EmbeddedPlayerHandle> EmbeddedPlayer<H> {
    pub fn new(handle: H, video_id: impl Into<String>) -> Self {
        Self {
            handle,
            video_id: video_id.into(),
        }
    }

    pub fn video_id(&self) -> &str {
        &self.video_id
    }

    pub fn handle(&self) -> &H {
        &self.handle
    }

    pub fn translate(event: EmbeddedEvent) -> Option<PlaybackEvent> {
        match event {
            EmbeddedEvent::Ready => Some(PlaybackEvent::Ready),
            EmbeddedEvent::StateChange(STATE_ENDED) => Some(PlaybackEvent::Ended),
            EmbeddedEvent::StateChange(_) => None,
        }
    }
}

#[async_trait]
impl<H: EmbeddedPlayerHandle> PlaybackSurface for EmbeddedPlayer<H> {
    async fn current_time(&self) -> Result<f64, SurfaceError> {
        finite(self.handle.get_current_time().await?)
    }

    async fn duration(&self) -> Result<f64, SurfaceError> {
        finite(self.handle.get_duration().await?)
    }

    async fn seek_to(&self, seconds: f64) -> Result<(), SurfaceError> {
        self.handle.seek_to(seconds, true).await
    }

    fn backend(&self) -> SurfaceBackend {
        SurfaceBackend::Embedded
    }
}

fn finite(value: f64) -> Result<f64, SurfaceError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SurfaceError::NotReady)
    }
}

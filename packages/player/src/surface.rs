//! What the reporter needs from a playback backend.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SurfaceError {
    /// Metadata not loaded yet; position or duration unknown
    #[error("playback surface is not ready")]
    NotReady,
    #[error("playback backend error: {0}")]
    Backend(String),
}

/// Which kind of player sits behind a surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceBackend {
    Embedded,
    MediaElement,
}

/// Lifecycle events the reporter reacts to. Adapters translate their
/// backend's native events into these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEvent {
    Ready,
    Ended,
}

/// Position and duration are in seconds.
#[async_trait]
pub trait PlaybackSurface: Send + Sync {
    async fn current_time(&self) -> Result<f64, SurfaceError>;
    async fn duration(&self) -> Result<f64, SurfaceError>;
    async fn seek_to(&self, seconds: f64) -> Result<(), SurfaceError>;
    fn backend(&self) -> SurfaceBackend;
}

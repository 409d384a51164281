//! # edemy-player - playback progress reporting
//!
//! Bridges a lecture's playback surface to the progress API:
//!
//! - [`surface`] - the capability a player backend must expose
//! - [`adapters`] - embedded third-party player and direct media element
//! - [`source`] - deciding which backend plays a lecture URL
//! - [`client`] - progress API client
//! - [`view`] - locally held progress used for badges and resume
//! - [`reporter`] - resume seek, periodic sampling and end-of-lecture handling
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use edemy_player::client::{HttpClientConfig, HttpProgressClient};
//! use edemy_player::reporter::{ProgressReporter, ReporterConfig};
//! use edemy_player::view::ProgressView;
//!
//! # fn main() -> Result<(), edemy_player::client::ClientError> {
//! let client = HttpProgressClient::new(HttpClientConfig::default())?;
//! client.set_token(Some("token".to_string()));
//!
//! let reporter = ProgressReporter::new(
//!     Arc::new(client),
//!     Arc::new(ProgressView::new()),
//!     ReporterConfig::default(),
//! );
//! # let _ = reporter;
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod client;
pub mod reporter;
pub mod source;
pub mod surface;
pub mod view;

pub use client::{ClientError, HttpClientConfig, HttpProgressClient, MarkResult, ProgressClient};
pub use reporter::{ProgressReporter, ReporterConfig, REPORT_TIMEOUT, SAMPLE_INTERVAL};
pub use source::{LectureSource, SourceError};
pub use surface::{PlaybackEvent, PlaybackSurface, SurfaceBackend, SurfaceError};
pub use view::ProgressView;

//! Backend-specific [`PlaybackSurface`](crate::surface::PlaybackSurface)
//! implementations.

pub mod embedded;
pub mod media_element;

pub use embedded::{EmbeddedEvent, EmbeddedPlayer, EmbeddedPlayerHandle};
pub use media_element::{MediaElement, MediaElementHandle, MediaEvent};

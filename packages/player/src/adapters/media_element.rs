use async_trait::async_trait;

use crate::surface::{PlaybackEvent, PlaybackSurface, SurfaceBackend, SurfaceError};

/// `readyState` at which the element has data for the current position.
pub const HAVE_CURRENT_DATA: u8 = 2;

/// Property access on a media element; `duration` is NaN until metadata loads.
pub trait MediaElementHandle: Send + Sync {
    fn current_time(&self) -> f64;
    fn duration(&self) -> f64;
    fn ready_state(&self) -> u8;
    fn set_current_time(&self, seconds: f64);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaEvent {
    LoadedMetadata,
    TimeUpdate,
    Ended,
}

pub struct MediaElement<H> {
    handle: H,
}

impl<H: MediaElementHandle> MediaElement<H> {
    pub fn new(handle: H) -> Self {
        Self { handle }
    }

    pub fn handle(&self) -> &H {
        &self.handle
    }

    /// `timeupdate` is ignored; sampling runs on its own timer.
    pub fn translate(event: MediaEvent) -> Option<PlaybackEvent> {
        match event {
            MediaEvent::LoadedMetadata => Some(PlaybackEvent::Ready),
            MediaEvent::Ended => Some(PlaybackEvent::Ended),
            MediaEvent::TimeUpdate => None,
        }
    }
}

#[async_trait]
impl<H: MediaElementHandle> PlaybackSurface for MediaElement<H> {
    async fn current_time(&self) -> Result<f64, SurfaceError> {
        if self.handle.ready_state() < HAVE_CURRENT_DATA {
            return Err(SurfaceError::NotReady);
        }
        Ok(self.handle.current_time())
    }

    async fn duration(&self) -> Result<f64, SurfaceError> {
        let duration = self.handle.duration();
        if duration.is_finite() {
            Ok(duration)
        } else {
            Err(SurfaceError::NotReady)
        }
    }

    async fn seek_to(&self, seconds: f64) -> Result<(), SurfaceError> {
        self.handle.set_current_time(seconds);
        Ok(())
    }

    fn backend(&self) -> SurfaceBackend {
        SurfaceBackend::MediaElement
    }
}

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;

    use super::*;

    struct FakeElement {
        time: Mutex<f64>,
        duration: f64,
        ready_state: u8,
    }

    impl MediaElementHandle for FakeElement {
        fn current_time(&self) -> f64 {
            *self.time.lock()
        }

        fn duration(&self) -> f64 {
            self.duration
        }

        fn ready_state(&self) -> u8 {
            self.ready_state
        }

        fn set_current_time(&self, seconds: f64) {
            *self.time.lock() = seconds;
        }
    }

    fn element(ready_state: u8, duration: f64) -> MediaElement<FakeElement> {
        MediaElement::new(FakeElement {
            time: Mutex::new(0.0),
            duration,
            ready_state,
        })
    }

    #[test]
    fn test_translate_events() {
        type Element = MediaElement<FakeElement>;
        assert_eq!(Element::translate(MediaEvent::LoadedMetadata), Some(PlaybackEvent::Ready));
        assert_eq!(Element::translate(MediaEvent::Ended), Some(PlaybackEvent::Ended));
        assert_eq!(Element::translate(MediaEvent::TimeUpdate), None);
    }

    #[tokio::test]
    async fn test_not_ready_before_data() {
        let el = element(1, f64::NAN);
        assert_eq!(el.current_time().await.unwrap_err(), SurfaceError::NotReady);
        assert_eq!(el.duration().await.unwrap_err(), SurfaceError::NotReady);
    }

    #[tokio::test]
    async fn test_seek_sets_current_time() {
        let el = element(4, 300.0);
        el.seek_to(42.0).await.unwrap();
        assert_eq!(el.current_time().await.unwrap(), 42.0);
        assert_eq!(el.duration().await.unwrap(), 300.0);
        assert_eq!(el.backend(), SurfaceBackend::MediaElement);
    }
}

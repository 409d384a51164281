//! Periodic playback sampling and progress reporting.
//!
//! A reporter owns one sampling slot per player instance. Activating a
//! lecture cancels whatever was sampled before; sampling itself starts only
//! once the surface reports [`PlaybackEvent::Ready`], after the resume seek.
//! Every tick spawns its report independently so a slow request never delays
//! the next sample.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use edemy_progress::CourseProgressRecord;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::client::{ClientError, MarkResult, ProgressClient};
use crate::surface::{PlaybackEvent, PlaybackSurface, SurfaceError};
use crate::view::ProgressView;

pub const SAMPLE_INTERVAL: Duration = Duration::from_secs(5);
pub const REPORT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy)]
pub struct ReporterConfig {
    pub sample_interval: Duration,
    pub report_timeout: Duration,
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            sample_interval: SAMPLE_INTERVAL,
            report_timeout: REPORT_TIMEOUT,
        }
    }
}

struct Shared {
    client: Arc<dyn ProgressClient>,
    view: Arc<ProgressView>,
    config: ReporterConfig,
}

struct ActiveLecture {
    generation: u64,
    course_id: String,
    lecture_id: String,
    surface: Arc<dyn PlaybackSurface>,
    sampler: Option<JoinHandle<()>>,
}

#[derive(Default)]
struct Slot {
    generation: u64,
    active: Option<ActiveLecture>,
}

#[derive(Clone)]
struct Target {
    generation: u64,
    course_id: String,
    lecture_id: String,
    surface: Arc<dyn PlaybackSurface>,
}

pub struct ProgressReporter {
    shared: Arc<Shared>,
    slot: Mutex<Slot>,
}

impl ProgressReporter {
    pub fn new(
        client: Arc<dyn ProgressClient>,
        view: Arc<ProgressView>,
        config: ReporterConfig,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                client,
                view,
                config,
            }),
            slot: Mutex::new(Slot::default()),
        }
    }

    pub fn view(&self) -> Arc<ProgressView> {
        Arc::clone(&self.shared.view)
    }

    /// Make `lecture_id` the lecture this player reports for.
    pub fn activate(
        &self,
        course_id: impl Into<String>,
        lecture_id: impl Into<String>,
        surface: Arc<dyn PlaybackSurface>,
    ) {
        let mut slot = self.slot.lock();
        if let Some(previous) = slot.active.take() {
            stop_sampler(previous);
        }

        slot.generation += 1;
        let active = ActiveLecture {
            generation: slot.generation,
            course_id: course_id.into(),
            lecture_id: lecture_id.into(),
            surface,
            sampler: None,
        };
        tracing::debug!(
            course_id = %active.course_id,
            lecture_id = %active.lecture_id,
            "lecture activated"
        );
        slot.active = Some(active);
    }

    /// Stop sampling. Nothing is reported on the way out.
    pub fn deactivate(&self) {
        if let Some(previous) = self.slot.lock().active.take() {
            stop_sampler(previous);
        }
    }

    pub fn is_sampling(&self) -> bool {
        self.slot
            .lock()
            .active
            .as_ref()
            .and_then(|active| active.sampler.as_ref())
            .is_some_and(|sampler| !sampler.is_finished())
    }

    pub async fn handle_event(&self, event: PlaybackEvent) {
        let Some(target) = self.target() else {
            tracing::debug!(?event, "playback event without an active lecture");
            return;
        };

        match event {
            PlaybackEvent::Ready => self.on_ready(target).await,
            PlaybackEvent::Ended => self.on_ended(target).await,
        }
    }

    /// Manual "mark complete" for the active lecture.
    pub async fn mark_active_completed(&self) -> Result<MarkResult, ClientError> {
        let Some(target) = self.target() else {
            return Err(ClientError::Rejected("no active lecture".to_string()));
        };

        let result = self
            .bounded(
                self.shared
                    .client
                    .mark_lecture_completed(&target.course_id, &target.lecture_id),
            )
            .await?;
        self.refresh(&target.course_id).await?;
        Ok(result)
    }

    /// Fetch the course's record from the server into the view.
    pub async fn refresh(&self, course_id: &str) -> Result<Option<CourseProgressRecord>, ClientError> {
        let record = self
            .bounded(self.shared.client.course_progress(course_id))
            .await?;
        self.shared.view.apply_loaded(course_id, record.clone());
        Ok(record)
    }

    async fn on_ready(&self, target: Target) {
        if !self.shared.view.is_loaded(&target.course_id) {
            if let Err(err) = self.refresh(&target.course_id).await {
                tracing::warn!(course_id = %target.course_id, error = %err, "failed to load course progress");
            }
        }

        if let Some(position) = self
            .shared
            .view
            .resume_position(&target.course_id, &target.lecture_id)
        {
            match target.surface.seek_to(position).await {
                Ok(()) => tracing::debug!(lecture_id = %target.lecture_id, position, "resumed playback"),
                Err(err) => tracing::warn!(lecture_id = %target.lecture_id, error = %err, "resume seek failed"),
            }
        }

        let mut slot = self.slot.lock();
        let Some(active) = slot
            .active
            .as_mut()
            .filter(|active| active.generation == target.generation)
        else {
            // switched lectures while loading
            return;
        };

        if let Some(previous) = active.sampler.take() {
            previous.abort();
        }
        active.sampler = Some(tokio::spawn(run_sampler(Arc::clone(&self.shared), target)));
    }

    async fn on_ended(&self, target: Target) {
        self.stop_sampling(target.generation);

        match read_sample(target.surface.as_ref()).await {
            Ok((watch_time, total_duration)) => {
                report(&self.shared, &target, watch_time, total_duration).await;
            }
            Err(err) => {
                tracing::warn!(lecture_id = %target.lecture_id, error = %err, "could not read final position");
            }
        }

        let marked = self
            .bounded(
                self.shared
                    .client
                    .mark_lecture_completed(&target.course_id, &target.lecture_id),
            )
            .await;
        if let Err(err) = marked {
            tracing::warn!(lecture_id = %target.lecture_id, error = %err, "failed to mark lecture completed");
        }

        if let Err(err) = self.refresh(&target.course_id).await {
            tracing::warn!(course_id = %target.course_id, error = %err, "failed to refresh course progress");
        }
    }

    /// Stops the sampler but keeps the lecture active, so a later `Ready`
    /// (replay) starts sampling again.
    fn stop_sampling(&self, generation: u64) {
        let mut slot = self.slot.lock();
        let sampler = slot
            .active
            .as_mut()
            .filter(|active| active.generation == generation)
            .and_then(|active| active.sampler.take());
        if let Some(sampler) = sampler {
            sampler.abort();
        }
    }

    fn target(&self) -> Option<Target> {
        self.slot.lock().active.as_ref().map(|active| Target {
            generation: active.generation,
            course_id: active.course_id.clone(),
            lecture_id: active.lecture_id.clone(),
            surface: Arc::clone(&active.surface),
        })
    }

    async fn bounded<T, F>(&self, fut: F) -> Result<T, ClientError>
    where
        F: Future<Output = Result<T, ClientError>>,
    {
        bounded(self.shared.config.report_timeout, fut).await
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        if let Some(previous) = self.slot.get_mut().active.take() {
            stop_sampler(previous);
        }
    }
}

fn stop_sampler(active: ActiveLecture) {
    if let Some(sampler) = active.sampler {
        sampler.abort();
        tracing::debug!(lecture_id = %active.lecture_id, "sampler stopped");
    }
}

async fn run_sampler(shared: Arc<Shared>, target: Target) {
    let interval = shared.config.sample_interval;
    let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        match read_sample(target.surface.as_ref()).await {
            Ok((watch_time, total_duration)) if watch_time > 0.0 && total_duration > 0.0 => {
                let shared = Arc::clone(&shared);
                let target = target.clone();
                tokio::spawn(async move {
                    report(&shared, &target, watch_time, total_duration).await;
                });
            }
            Ok(_) => {}
            Err(err) => {
                tracing::debug!(lecture_id = %target.lecture_id, error = %err, "sample skipped");
            }
        }
    }
}

/// Position and duration floored to whole seconds.
async fn read_sample(surface: &dyn PlaybackSurface) -> Result<(f64, f64), SurfaceError> {
    let current = surface.current_time().await?;
    let duration = surface.duration().await?;
    Ok((current.max(0.0).floor(), duration.max(0.0).floor()))
}

async fn report(shared: &Shared, target: &Target, watch_time: f64, total_duration: f64) {
    let result = bounded(
        shared.config.report_timeout,
        shared.client.report_watch_progress(
            &target.course_id,
            &target.lecture_id,
            watch_time,
            total_duration,
        ),
    )
    .await;

    match result {
        Ok(record) => shared.view.apply(record),
        Err(err) => tracing::warn!(
            course_id = %target.course_id,
            lecture_id = %target.lecture_id,
            watch_time,
            error = %err,
            "failed to report watch progress"
        ),
    }
}

async fn bounded<T, F>(timeout: Duration, fut: F) -> Result<T, ClientError>
where
    F: Future<Output = Result<T, ClientError>>,
{
    tokio::time::timeout(timeout, fut)
        .await
        .unwrap_or(Err(ClientError::Timeout))
}

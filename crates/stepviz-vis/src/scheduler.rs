//! Paced replay of event logs.
//!
//! A [`Scheduler`] owns one backend, its mirror and the surface they draw on.
//! It replays one log at a time: each record is applied under the stage lock,
//! then the scheduler sleeps for the family's step delay with the lock
//! released. After the last record it resyncs the mirror from a fresh
//! snapshot and re-renders, so the surface ends up showing the backend's
//! authoritative state.
//!
//! Requests arriving while a log is playing are rejected, not queued.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use stepviz_algo::{ActionRecord, EventLog, SnapshotSource};
use stepviz_layout::DEFAULT_VIEWPORT_WIDTH;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info};

use crate::families::{Effect, Visualizer};
use crate::surface::Surface;

/// Status line shown once a log has been fully replayed.
pub const COMPLETE_STATUS: &str = "Operation complete";

const NOTICE_CAPACITY: usize = 64;

/// Whether a log is being replayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    Idle,
    Playing,
}

/// Published after each replayed record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepNotice {
    pub index: usize,
    pub total: usize,
    pub status: String,
}

/// Change notifications for observers of a scheduler's surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notice {
    /// A record was applied.
    Step(StepNotice),
    /// Playback finished and the surface shows the resynced state.
    Idle { status: String },
    /// The surface was redrawn outside playback.
    Redrawn,
}

/// Counts gathered while replaying one log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackReport {
    /// Records applied.
    pub steps: usize,
    /// Effects whose handle was not on the surface.
    pub skipped_effects: usize,
}

/// Result of a playback request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    /// Another log was playing; nothing was done.
    Busy,
    Completed(PlaybackReport),
}

/// Exclusive right to replay on one scheduler. Released on drop.
#[derive(Debug)]
pub struct PlaybackGuard {
    flag: Arc<AtomicBool>,
}

impl PlaybackGuard {
    fn claims(&self, playing: &Arc<AtomicBool>) -> bool {
        Arc::ptr_eq(&self.flag, playing)
    }
}

impl Drop for PlaybackGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Everything a step touches.
pub struct Stage<V: Visualizer, S> {
    pub backend: V::Backend,
    pub mirror: V,
    pub surface: S,
}

impl<V: Visualizer, S: Surface> Stage<V, S> {
    fn redraw(&mut self, viewport_width: f64) {
        self.mirror.render(viewport_width).paint(&mut self.surface);
    }

    fn resync(&mut self, viewport_width: f64) {
        let snapshot = self.backend.snapshot();
        self.mirror.resync(snapshot);
        self.redraw(viewport_width);
    }

    /// Apply one record; returns the status it set, if any.
    fn apply(
        &mut self,
        record: &ActionRecord<V::Action>,
        viewport_width: f64,
        report: &mut PlaybackReport,
    ) -> Option<String> {
        let step = self.mirror.step(record);
        if step.redraw {
            self.redraw(viewport_width);
        }

        for effect in &step.effects {
            let applied = match effect {
                Effect::Highlight(handle, tone) => self.surface.set_highlight(*handle, *tone),
                Effect::Badge(handle, text) => self.surface.show_badge(*handle, text),
                Effect::Clear(tone) => {
                    self.surface.clear_tone(*tone);
                    true
                }
            };
            if !applied {
                report.skipped_effects += 1;
                debug!(family = %V::FAMILY, ?effect, "handle not drawn, effect skipped");
            }
        }

        if let Some(status) = &step.status {
            self.surface.set_status(status);
        }
        step.status
    }
}

/// Replays event logs for one structure instance.
pub struct Scheduler<V: Visualizer, S: Surface> {
    stage: Mutex<Stage<V, S>>,
    playing: Arc<AtomicBool>,
    delay: Duration,
    viewport_width: f64,
    notices: broadcast::Sender<Notice>,
}

impl<V: Visualizer, S: Surface> Scheduler<V, S> {
    /// Take ownership of a backend and draw its current state.
    pub fn new(backend: V::Backend, mirror: V, surface: S, delay: Duration) -> Self {
        let mut stage = Stage {
            backend,
            mirror,
            surface,
        };
        stage.resync(DEFAULT_VIEWPORT_WIDTH);
        let (notices, _) = broadcast::channel(NOTICE_CAPACITY);

        Self {
            stage: Mutex::new(stage),
            playing: Arc::new(AtomicBool::new(false)),
            delay,
            viewport_width: DEFAULT_VIEWPORT_WIDTH,
            notices,
        }
    }

    /// Lay out trees in a viewport of `width`.
    pub fn with_viewport(mut self, width: f64) -> Self {
        self.viewport_width = width;
        self.stage.get_mut().redraw(width);
        self
    }

    /// Pause between two records.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn state(&self) -> PlaybackState {
        if self.is_playing() {
            PlaybackState::Playing
        } else {
            PlaybackState::Idle
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::Acquire)
    }

    /// Receive a [`Notice`] for every change to the surface.
    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.notices.subscribe()
    }

    fn notify(&self, notice: Notice) {
        // No subscribers is fine.
        let _ = self.notices.send(notice);
    }

    /// Claim the scheduler. `None` while another log is playing.
    pub fn try_begin(&self) -> Option<PlaybackGuard> {
        self.playing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| PlaybackGuard {
                flag: self.playing.clone(),
            })
    }

    /// Run `op` against the backend and replay the log it returns.
    ///
    /// `guard` must come from this scheduler's [`try_begin`](Self::try_begin);
    /// a guard claimed on another scheduler yields [`PlayOutcome::Busy`] and
    /// `op` is not called.
    pub async fn run<F>(&self, guard: PlaybackGuard, op: F) -> PlayOutcome
    where
        F: FnOnce(&mut V::Backend) -> EventLog<V::Action> + Send,
    {
        if !guard.claims(&self.playing) {
            debug!(family = %V::FAMILY, "guard from another scheduler, request ignored");
            return PlayOutcome::Busy;
        }

        let log = {
            let mut stage = self.stage.lock().await;
            let log = op(&mut stage.backend);
            stage.mirror.begin(&log);
            // Marks dropped by `begin` must leave the surface too.
            stage.redraw(self.viewport_width);
            log
        };
        let total = log.len();
        info!(family = %V::FAMILY, steps = total, "playback started");

        let mut report = PlaybackReport::default();
        for (index, record) in log.iter().enumerate() {
            let status = {
                let mut stage = self.stage.lock().await;
                stage.apply(record, self.viewport_width, &mut report)
            };
            report.steps += 1;
            debug!(family = %V::FAMILY, index, total, action = ?record.action, "step applied");
            self.notify(Notice::Step(StepNotice {
                index,
                total,
                status: status.unwrap_or_else(|| record.info.clone()),
            }));
            tokio::time::sleep(self.delay).await;
        }

        {
            let mut stage = self.stage.lock().await;
            stage.resync(self.viewport_width);
            stage.surface.set_status(COMPLETE_STATUS);
        }
        drop(guard);

        info!(
            family = %V::FAMILY,
            steps = report.steps,
            skipped = report.skipped_effects,
            "playback complete"
        );
        self.notify(Notice::Idle {
            status: COMPLETE_STATUS.to_string(),
        });
        PlayOutcome::Completed(report)
    }

    /// Claim the scheduler and replay the log `op` produces. `op` is not
    /// called when busy.
    pub async fn perform<F>(&self, op: F) -> PlayOutcome
    where
        F: FnOnce(&mut V::Backend) -> EventLog<V::Action> + Send,
    {
        match self.try_begin() {
            Some(guard) => self.run(guard, op).await,
            None => {
                debug!(family = %V::FAMILY, "busy, request ignored");
                PlayOutcome::Busy
            }
        }
    }

    /// Replay an already produced log.
    pub async fn play(&self, log: EventLog<V::Action>) -> PlayOutcome {
        self.perform(move |_| log).await
    }

    /// Mutate backend and mirror without animation, then resync and redraw.
    /// `None` (and `f` not called) while a log is playing.
    pub async fn update<R, F>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&mut V::Backend, &mut V) -> R + Send,
    {
        let Some(_guard) = self.try_begin() else {
            debug!(family = %V::FAMILY, "busy, update ignored");
            return None;
        };
        let result = {
            let mut guard = self.stage.lock().await;
            let stage = &mut *guard;
            let result = f(&mut stage.backend, &mut stage.mirror);
            stage.resync(self.viewport_width);
            result
        };
        self.notify(Notice::Redrawn);
        Some(result)
    }

    /// Change view-only mirror state (positions) and redraw. Allowed during
    /// playback; never touches the backend.
    pub async fn view<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut V) -> R + Send,
    {
        let result = {
            let mut stage = self.stage.lock().await;
            let result = f(&mut stage.mirror);
            stage.redraw(self.viewport_width);
            result
        };
        self.notify(Notice::Redrawn);
        result
    }

    /// Read the stage.
    pub async fn inspect<R>(&self, f: impl FnOnce(&Stage<V, S>) -> R) -> R {
        let stage = self.stage.lock().await;
        f(&*stage)
    }
}

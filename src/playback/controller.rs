use crate::core::Snapshot;
use crate::playback::{
    PlaybackConfig, PlaybackEngine, PlaybackError, PlaybackState, PlaybackUpdate, Tick,
    TickOutcome,
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// State guarded as one critical section: commands and ticks both go through it
struct Shared {
    engine: PlaybackEngine,
    /// The single outstanding tick task, if any
    pending: Option<JoinHandle<()>>,
    updates: watch::Sender<PlaybackUpdate>,
}

impl Shared {
    fn publish(&self) {
        self.updates.send_replace(self.engine.update());
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

/// Drives a [`PlaybackEngine`] on a fixed cadence
///
/// Commands are synchronous and must be issued from within a tokio runtime.
/// Updates are delivered through a `watch` channel, so a slow subscriber
/// only ever misses intermediate states and never holds up playback.
pub struct PlaybackController {
    shared: Arc<Mutex<Shared>>,
    config: PlaybackConfig,
}

impl PlaybackController {
    pub fn new(config: PlaybackConfig) -> Self {
        let engine = PlaybackEngine::new();
        let (updates, _) = watch::channel(engine.update());
        Self {
            shared: Arc::new(Mutex::new(Shared {
                engine,
                pending: None,
                updates,
            })),
            config,
        }
    }

    /// Receive the latest published state
    pub fn subscribe(&self) -> watch::Receiver<PlaybackUpdate> {
        lock(&self.shared).updates.subscribe()
    }

    pub fn state(&self) -> PlaybackState {
        lock(&self.shared).engine.state()
    }

    /// Current state, cursor and position
    pub fn current(&self) -> PlaybackUpdate {
        lock(&self.shared).engine.update()
    }

    /// Start a traversal of `waypoints` from the first entry
    pub fn start(&self, waypoints: Snapshot) -> Result<(), PlaybackError> {
        let mut shared = lock(&self.shared);
        match shared.engine.start(waypoints)? {
            Some(tick) => {
                info!(
                    "Playback started over {} waypoints",
                    shared.engine.total_waypoints()
                );
                self.schedule(&mut shared, tick);
                shared.publish();
            }
            None => debug!("Start ignored, playback already running"),
        }
        Ok(())
    }

    /// Pause a running traversal
    pub fn pause(&self) {
        let mut shared = lock(&self.shared);
        if shared.engine.pause() {
            shared.cancel_pending();
            info!("Playback paused at {:?}", shared.engine.cursor());
            shared.publish();
        } else {
            debug!("Pause ignored in state {}", shared.engine.state());
        }
    }

    /// Resume a paused traversal from its cursor
    pub fn resume(&self, waypoints: Snapshot) {
        let mut shared = lock(&self.shared);
        match shared.engine.resume(waypoints) {
            Some(tick) => {
                info!("Playback resumed at {:?}", shared.engine.cursor());
                self.schedule(&mut shared, tick);
                shared.publish();
            }
            None => debug!("Resume ignored in state {}", shared.engine.state()),
        }
    }

    /// Return to idle, dropping any scheduled tick
    pub fn reset(&self) {
        let mut shared = lock(&self.shared);
        shared.cancel_pending();
        shared.engine.reset();
        info!("Playback reset");
        shared.publish();
    }

    /// Replace the outstanding tick task in the same critical section
    fn schedule(&self, shared: &mut Shared, tick: Tick) {
        shared.cancel_pending();
        let task = run_ticks(Arc::clone(&self.shared), tick, self.config.tick_interval);
        shared.pending = Some(tokio::spawn(task));
    }
}

impl Drop for PlaybackController {
    fn drop(&mut self) {
        lock(&self.shared).cancel_pending();
    }
}

async fn run_ticks(shared: Arc<Mutex<Shared>>, mut tick: Tick, interval: Duration) {
    loop {
        tokio::time::sleep(interval).await;
        match apply_tick(&shared, tick) {
            Some(next) => tick = next,
            None => break,
        }
    }
}

/// Apply one tick, returning the follow-up tick while the traversal continues
fn apply_tick(shared: &Mutex<Shared>, tick: Tick) -> Option<Tick> {
    let mut shared = lock(shared);
    match shared.engine.apply_tick(tick) {
        TickOutcome::Advanced(next) => {
            debug!(
                "Advanced to waypoint {:?} of {}",
                shared.engine.cursor(),
                shared.engine.total_waypoints()
            );
            shared.publish();
            Some(next)
        }
        TickOutcome::Finished => {
            info!("Playback finished");
            shared.pending = None;
            shared.publish();
            None
        }
        TickOutcome::Stale => {
            debug!("Dropped stale tick");
            None
        }
    }
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

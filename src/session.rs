use crate::core::{ImportSummary, InvalidCoordinate, Snapshot, WaypointStore};
use crate::input::ImportError;
use crate::playback::{PlaybackConfig, PlaybackController, PlaybackError, PlaybackUpdate};
use std::path::Path;
use tokio::sync::watch;

/// The command surface: one waypoint store and the controller replaying it
pub struct Simulation {
    store: WaypointStore,
    playback: PlaybackController,
}

impl Simulation {
    pub fn new(config: PlaybackConfig) -> Self {
        Self {
            store: WaypointStore::new(),
            playback: PlaybackController::new(config),
        }
    }

    pub fn add_waypoint(&mut self, lon: f64, lat: f64) -> Result<(), InvalidCoordinate> {
        self.store.add_waypoint(lon, lat)
    }

    pub fn import_waypoints(&mut self, raw_text: &str) -> Result<ImportSummary, ImportError> {
        self.store.import_waypoints(raw_text)
    }

    pub fn import_file<P: AsRef<Path>>(&mut self, path: P) -> Result<ImportSummary, ImportError> {
        self.store.import_file(path)
    }

    /// Clear the waypoints and return playback to idle
    pub fn reset(&mut self) {
        self.playback.reset();
        self.store.reset();
    }

    pub fn start(&self) -> Result<(), PlaybackError> {
        self.playback.start(self.store.snapshot())
    }

    pub fn pause(&self) {
        self.playback.pause();
    }

    pub fn resume(&self) {
        self.playback.resume(self.store.snapshot());
    }

    pub fn waypoints(&self) -> Snapshot {
        self.store.snapshot()
    }

    pub fn status(&self) -> PlaybackUpdate {
        self.playback.current()
    }

    pub fn subscribe_path(&self) -> watch::Receiver<Snapshot> {
        self.store.subscribe()
    }

    pub fn subscribe_playback(&self) -> watch::Receiver<PlaybackUpdate> {
        self.playback.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Waypoint;
    use crate::playback::PlaybackState;
    use std::time::Duration;
    use tokio::time::sleep;

    fn simulation() -> Simulation {
        Simulation::new(PlaybackConfig::with_tick_interval(Duration::from_secs(1)))
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_without_waypoints() {
        let sim = simulation();
        assert_eq!(sim.start(), Err(PlaybackError::EmptySequence));
        assert_eq!(sim.status().state, PlaybackState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_import_then_play() {
        let mut sim = simulation();
        let summary = sim.import_waypoints("1,1\n2,2\nnope\n3,3\n").unwrap();
        assert_eq!(summary, ImportSummary { added: 3, rejected: 1 });

        sim.start().unwrap();
        sleep(Duration::from_millis(2500)).await;
        assert_eq!(sim.status().position, Some(Waypoint::new(3.0, 3.0).unwrap()));

        sleep(Duration::from_secs(1)).await;
        assert_eq!(sim.status().state, PlaybackState::Finished);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_clears_everything() {
        let mut sim = simulation();
        sim.add_waypoint(1.0, 1.0).unwrap();
        sim.add_waypoint(2.0, 2.0).unwrap();
        sim.start().unwrap();
        sim.pause();

        let mut updates = sim.subscribe_playback();
        sim.reset();

        let status = sim.status();
        assert_eq!(status.state, PlaybackState::Idle);
        assert_eq!(status.cursor_index(), -1);
        assert!(sim.waypoints().is_empty());
        assert_eq!(updates.borrow_and_update().state, PlaybackState::Idle);

        sleep(Duration::from_secs(5)).await;
        assert!(!updates.has_changed().unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_resume_extends_with_new_waypoints() {
        let mut sim = simulation();
        sim.add_waypoint(1.0, 1.0).unwrap();
        sim.start().unwrap();
        sim.pause();

        sim.add_waypoint(2.0, 2.0).unwrap();
        sim.resume();
        sleep(Duration::from_millis(1500)).await;

        let status = sim.status();
        assert_eq!(status.cursor, Some(1));
        assert_eq!(status.position, Some(Waypoint::new(2.0, 2.0).unwrap()));
    }
}

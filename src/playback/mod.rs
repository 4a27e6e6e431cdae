pub mod controller;
pub mod engine;

pub use controller::PlaybackController;
pub use engine::{PlaybackEngine, Tick, TickOutcome};

use crate::core::Waypoint;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Default interval between two advances
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Playback phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlaybackState {
    Idle,
    Running,
    Paused,
    Finished,
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlaybackState::Idle => "idle",
            PlaybackState::Running => "running",
            PlaybackState::Paused => "paused",
            PlaybackState::Finished => "finished",
        };
        f.write_str(name)
    }
}

/// Playback configuration
#[derive(Debug, Clone)]
pub struct PlaybackConfig {
    pub tick_interval: Duration,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
        }
    }
}

impl PlaybackConfig {
    pub fn with_tick_interval(tick_interval: Duration) -> Self {
        // A zero interval would spin the tick task
        Self {
            tick_interval: tick_interval.max(Duration::from_millis(1)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PlaybackError {
    #[error("no waypoints to play back")]
    EmptySequence,
}

/// State published to subscribers after every transition and advance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaybackUpdate {
    pub state: PlaybackState,
    /// Index of the occupied waypoint, `None` before a traversal starts
    pub cursor: Option<usize>,
    pub position: Option<Waypoint>,
    pub at: DateTime<Utc>,
}

impl PlaybackUpdate {
    /// Cursor as a signed index, -1 when no traversal has started
    pub fn cursor_index(&self) -> isize {
        self.cursor.map(|c| c as isize).unwrap_or(-1)
    }
}

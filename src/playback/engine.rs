use crate::core::{Snapshot, Waypoint};
use crate::playback::{PlaybackError, PlaybackState, PlaybackUpdate};
use chrono::Utc;
use std::sync::Arc;

/// Ticket for one scheduled advance
///
/// A tick only applies if the engine is still in the scheduling epoch it
/// was issued in and still sits at the cursor it expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    epoch: u64,
    cursor: usize,
}

/// Result of applying a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Moved to the next waypoint; the returned tick is the follow-up
    Advanced(Tick),
    /// Already at the last waypoint
    Finished,
    /// Issued before a pause, reset or restart; nothing changed
    Stale,
}

/// Waypoint traversal state machine
///
/// Pure and synchronous: scheduling is left to the caller, which hands back
/// the [`Tick`] it was given once the interval elapses.
pub struct PlaybackEngine {
    waypoints: Snapshot,
    state: PlaybackState,
    cursor: Option<usize>,
    epoch: u64,
}

impl Default for PlaybackEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackEngine {
    pub fn new() -> Self {
        Self {
            waypoints: Arc::from(Vec::new()),
            state: PlaybackState::Idle,
            cursor: None,
            epoch: 0,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Waypoint at the cursor
    pub fn position(&self) -> Option<Waypoint> {
        self.cursor.and_then(|c| self.waypoints.get(c).copied())
    }

    /// Number of waypoints in the traversal
    pub fn total_waypoints(&self) -> usize {
        self.waypoints.len()
    }

    pub fn update(&self) -> PlaybackUpdate {
        PlaybackUpdate {
            state: self.state,
            cursor: self.cursor,
            position: self.position(),
            at: Utc::now(),
        }
    }

    /// Begin a traversal from the first waypoint
    ///
    /// Returns the tick to schedule, or `None` if already running.
    pub fn start(&mut self, waypoints: Snapshot) -> Result<Option<Tick>, PlaybackError> {
        if self.state == PlaybackState::Running {
            return Ok(None);
        }
        if waypoints.is_empty() {
            return Err(PlaybackError::EmptySequence);
        }

        self.waypoints = waypoints;
        self.state = PlaybackState::Running;
        self.cursor = Some(0);
        Ok(Some(self.next_tick(0)))
    }

    /// Halt a running traversal, keeping the cursor
    ///
    /// Returns whether the state changed.
    pub fn pause(&mut self) -> bool {
        if self.state != PlaybackState::Running {
            return false;
        }

        self.state = PlaybackState::Paused;
        self.epoch += 1;
        true
    }

    /// Continue a paused traversal from the retained cursor
    ///
    /// `waypoints` replaces the traversal when it extends the current one,
    /// picking up waypoints appended while paused.
    pub fn resume(&mut self, waypoints: Snapshot) -> Option<Tick> {
        if self.state != PlaybackState::Paused {
            return None;
        }
        let cursor = self.cursor?;

        if waypoints.len() > self.waypoints.len()
            && waypoints[..self.waypoints.len()] == self.waypoints[..]
        {
            self.waypoints = waypoints;
        }

        self.state = PlaybackState::Running;
        Some(self.next_tick(cursor))
    }

    /// Return to idle from any state, invalidating every outstanding tick
    pub fn reset(&mut self) {
        self.waypoints = Arc::from(Vec::new());
        self.state = PlaybackState::Idle;
        self.cursor = None;
        self.epoch += 1;
    }

    /// Apply a scheduled advance
    pub fn apply_tick(&mut self, tick: Tick) -> TickOutcome {
        if tick.epoch != self.epoch
            || self.state != PlaybackState::Running
            || self.cursor != Some(tick.cursor)
        {
            return TickOutcome::Stale;
        }

        let next = tick.cursor + 1;
        if next < self.waypoints.len() {
            self.cursor = Some(next);
            TickOutcome::Advanced(Tick {
                epoch: self.epoch,
                cursor: next,
            })
        } else {
            self.state = PlaybackState::Finished;
            self.epoch += 1;
            TickOutcome::Finished
        }
    }

    fn next_tick(&mut self, cursor: usize) -> Tick {
        self.epoch += 1;
        Tick {
            epoch: self.epoch,
            cursor,
        }
    }
}

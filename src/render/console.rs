use crate::core::Waypoint;
use crate::playback::PlaybackUpdate;
use crate::render::{RenderSink, Viewport};
use anyhow::Result;
use tracing::info;

/// Render collaborator that reports the path and marker through the log
pub struct ConsoleSink {
    padding: f64,
    viewport: Option<Viewport>,
}

impl ConsoleSink {
    pub fn new(padding: f64) -> Self {
        Self {
            padding,
            viewport: None,
        }
    }

    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }
}

impl RenderSink for ConsoleSink {
    fn path_changed(&mut self, path: &[Waypoint]) -> Result<()> {
        self.viewport = Viewport::fit(path, self.padding);
        match &self.viewport {
            Some(view) => info!(
                "Path: {} waypoints, view [{:.4}, {:.4}] - [{:.4}, {:.4}]",
                path.len(),
                view.min_lon,
                view.min_lat,
                view.max_lon,
                view.max_lat
            ),
            None => info!("Path: empty"),
        }
        Ok(())
    }

    fn playback_changed(&mut self, update: &PlaybackUpdate) -> Result<()> {
        let Some(position) = update.position else {
            info!("Marker: none ({})", update.state);
            return Ok(());
        };

        if let Some(view) = self.viewport {
            if !view.contains(&position) {
                self.viewport = Some(view.pan_to(&position));
            }
        }
        info!(
            "Marker: {} at #{} ({})",
            position,
            update.cursor_index(),
            update.state
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::PlaybackState;
    use chrono::Utc;

    fn wp(lon: f64, lat: f64) -> Waypoint {
        Waypoint::new(lon, lat).unwrap()
    }

    fn update_at(position: Option<Waypoint>) -> PlaybackUpdate {
        PlaybackUpdate {
            state: PlaybackState::Running,
            cursor: position.map(|_| 0),
            position,
            at: Utc::now(),
        }
    }

    #[test]
    fn test_tolerates_empty_path_and_no_position() {
        let mut sink = ConsoleSink::new(0.1);
        sink.path_changed(&[]).unwrap();
        sink.playback_changed(&update_at(None)).unwrap();
        assert_eq!(sink.viewport(), None);
    }

    #[test]
    fn test_pans_to_marker_outside_view() {
        let mut sink = ConsoleSink::new(0.0);
        sink.path_changed(&[wp(0.0, 0.0), wp(1.0, 1.0)]).unwrap();

        sink.playback_changed(&update_at(Some(wp(0.5, 0.5)))).unwrap();
        assert_eq!(sink.viewport().unwrap().center(), (0.5, 0.5));

        sink.playback_changed(&update_at(Some(wp(30.0, 30.0)))).unwrap();
        assert!(sink.viewport().unwrap().contains(&wp(30.0, 30.0)));
    }
}

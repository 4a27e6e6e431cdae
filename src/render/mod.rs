pub mod console;
pub mod geojson;
pub mod viewport;

pub use console::ConsoleSink;
pub use geojson::GeoJsonSink;
pub use viewport::Viewport;

use crate::core::{Snapshot, Waypoint};
use crate::playback::PlaybackUpdate;
use anyhow::Result;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Consumer of the waypoint path and playback updates
///
/// Implementations must cope with an empty path and with updates that carry
/// no position.
pub trait RenderSink: Send {
    /// The full path changed (drawn as a line)
    fn path_changed(&mut self, path: &[Waypoint]) -> Result<()>;

    /// Playback moved or changed phase (drawn as a marker)
    fn playback_changed(&mut self, update: &PlaybackUpdate) -> Result<()>;
}

/// Forward path and playback changes to `sink` until both channels close
///
/// Only the latest value of each channel is rendered, so a slow sink skips
/// intermediate states instead of stalling the publishers.
pub fn spawn_render_loop<S>(
    mut sink: S,
    mut path_rx: watch::Receiver<Snapshot>,
    mut updates_rx: watch::Receiver<PlaybackUpdate>,
) -> JoinHandle<()>
where
    S: RenderSink + 'static,
{
    tokio::spawn(async move {
        let path = path_rx.borrow_and_update().clone();
        report(sink.path_changed(&path));
        let update = updates_rx.borrow_and_update().clone();
        report(sink.playback_changed(&update));

        let mut path_open = true;
        let mut updates_open = true;
        while path_open || updates_open {
            tokio::select! {
                changed = path_rx.changed(), if path_open => match changed {
                    Ok(()) => {
                        let path = path_rx.borrow_and_update().clone();
                        report(sink.path_changed(&path));
                    }
                    Err(_) => path_open = false,
                },
                changed = updates_rx.changed(), if updates_open => match changed {
                    Ok(()) => {
                        let update = updates_rx.borrow_and_update().clone();
                        report(sink.playback_changed(&update));
                    }
                    Err(_) => updates_open = false,
                },
            }
        }
        debug!("Render loop finished");
    })
}

fn report(result: Result<()>) {
    if let Err(e) = result {
        warn!("Render sink error: {:#}", e);
    }
}

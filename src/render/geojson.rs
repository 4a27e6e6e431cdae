use crate::core::Waypoint;
use crate::playback::PlaybackUpdate;
use crate::render::RenderSink;
use anyhow::{Context, Result};
use serde_json::{json, Value};
use std::path::PathBuf;

/// Render collaborator that keeps a GeoJSON file of the path and marker
///
/// The file is rewritten on every change, for map tools that poll it.
pub struct GeoJsonSink {
    output: PathBuf,
    path: Vec<Waypoint>,
    last_update: Option<PlaybackUpdate>,
}

impl GeoJsonSink {
    pub fn new(output: PathBuf) -> Self {
        Self {
            output,
            path: Vec::new(),
            last_update: None,
        }
    }

    /// Path as a `LineString` plus the marker as a `Point`, when there is one
    pub fn feature_collection(&self) -> Value {
        let mut features = vec![path_feature(&self.path)];
        if let Some(update) = &self.last_update {
            if let Some(marker) = marker_feature(update) {
                features.push(marker);
            }
        }
        json!({
            "type": "FeatureCollection",
            "features": features,
        })
    }

    /// Rewrite the output file
    ///
    /// Called from the render task, so the blocking file I/O is moved off the
    /// async worker with `block_in_place`. That requires the multi-threaded
    /// runtime when called inside tokio.
    fn write(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.feature_collection())?;
        let output = self.output.as_path();
        let write_file = || -> Result<()> {
            if let Some(parent) = output.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)
                        .with_context(|| format!("Failed to create {:?}", parent))?;
                }
            }
            std::fs::write(output, json)
                .with_context(|| format!("Failed to write GeoJSON to {:?}", output))
        };

        match tokio::runtime::Handle::try_current() {
            Ok(_) => tokio::task::block_in_place(write_file),
            Err(_) => write_file(),
        }
    }
}

impl RenderSink for GeoJsonSink {
    fn path_changed(&mut self, path: &[Waypoint]) -> Result<()> {
        self.path = path.to_vec();
        self.write()
    }

    fn playback_changed(&mut self, update: &PlaybackUpdate) -> Result<()> {
        self.last_update = Some(update.clone());
        self.write()
    }
}

fn path_feature(path: &[Waypoint]) -> Value {
    let coordinates: Vec<[f64; 2]> = path.iter().map(Waypoint::position).collect();
    json!({
        "type": "Feature",
        "geometry": {
            "type": "LineString",
            "coordinates": coordinates,
        },
        "properties": { "role": "path" },
    })
}

fn marker_feature(update: &PlaybackUpdate) -> Option<Value> {
    let position = update.position?;
    Some(json!({
        "type": "Feature",
        "geometry": {
            "type": "Point",
            "coordinates": position.position(),
        },
        "properties": {
            "role": "marker",
            "state": update.state,
            "cursor": update.cursor,
            "at": update.at,
        },
    }))
}

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Environment variable overriding the tick interval in milliseconds
pub const TICK_ENV: &str = "WAYPOINT_SIM_TICK_MS";

/// Persistent simulator settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Interval between two playback advances
    pub tick_interval_ms: u64,
    /// Viewport padding as a fraction of the path span
    pub viewport_padding: f64,
    /// Where to keep a GeoJSON rendering of the path, if anywhere
    pub geojson_output: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            viewport_padding: 0.1,
            geojson_output: None,
        }
    }
}

impl Settings {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("waypoint-sim").join("settings.json"))
    }

    /// Load from the user config directory, without environment overrides
    pub fn load() -> Self {
        Self::load_or_default(Self::config_path().as_deref())
    }

    /// Copy with environment overrides applied; never saved
    pub fn with_env_overrides(&self) -> Self {
        let mut settings = self.clone();
        settings.apply_env(std::env::var(TICK_ENV).ok().as_deref());
        settings
    }

    /// Settings from `path`, or the defaults when it is missing or invalid
    fn load_or_default(path: Option<&Path>) -> Self {
        match path {
            Some(path) if path.exists() => Self::load_from(path).unwrap_or_else(|e| {
                warn!("Ignoring settings file: {:#}", e);
                Self::default()
            }),
            _ => Self::default(),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {:?}", path))?;
        let settings = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse settings file: {:?}", path))?;
        debug!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path().context("No config directory on this platform")?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {:?}", parent))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).with_context(|| format!("Failed to write settings: {:?}", path))
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    fn apply_env(&mut self, tick_ms: Option<&str>) {
        let Some(raw) = tick_ms else { return };
        match raw.trim().parse::<u64>() {
            Ok(ms) => self.tick_interval_ms = ms,
            Err(_) => warn!("Ignoring {}={:?}: not a whole number of milliseconds", TICK_ENV, raw),
        }
    }
}

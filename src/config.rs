// SPDX-License-Identifier: GPL-3.0-only

//! Persisted booth settings

use crate::constants::{GridResolution, export, timing};
use crate::errors::{BoothError, BoothResult};
use crate::session::CaptureMode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{error, warn};

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Countdown start value for single-photo cycles
    pub single_countdown_start: u32,
    /// Countdown start value for each shot of a grid cycle
    pub grid_countdown_start: u32,
    /// Canvas preset for composed grid photos
    pub grid_resolution: GridResolution,
    /// Filename prefix for exported photos
    pub filename_prefix: String,
    /// Export directory; `None` falls back to the platform picture directory
    pub export_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            single_countdown_start: timing::DEFAULT_COUNTDOWN_START,
            grid_countdown_start: timing::DEFAULT_COUNTDOWN_START,
            grid_resolution: GridResolution::default(), // Default to SD (640x480)
            filename_prefix: export::DEFAULT_FILENAME_PREFIX.to_string(),
            export_dir: None, // Resolved to Pictures/photobooth on use
        }
    }
}

impl Config {
    /// Countdown start value for a mode, clamped so a cycle always ticks at
    /// least once
    pub fn countdown_start(&self, mode: CaptureMode) -> u32 {
        let configured = match mode {
            CaptureMode::Single => self.single_countdown_start,
            CaptureMode::Grid => self.grid_countdown_start,
        };
        configured.max(1)
    }

    /// Export directory with the platform default applied
    pub fn export_directory(&self) -> PathBuf {
        self.export_dir.clone().unwrap_or_else(default_export_dir)
    }

    /// Platform config file location
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("photobooth")
            .join("config.json")
    }

    /// Load the persisted config, falling back to defaults
    ///
    /// A missing file is normal (first run); an unreadable or malformed file
    /// is logged and ignored. Loading never fails.
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Self {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Self::default(),
            Err(e) => {
                warn!(error = %e, path = %path.display(), "Could not read config, using defaults");
                return Self::default();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(config) => config,
            Err(e) => {
                error!(error = %e, path = %path.display(), "Malformed config, using defaults");
                Self::default()
            }
        }
    }

    /// Persist the config as pretty JSON, creating parent directories
    pub fn save(&self) -> BoothResult<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> BoothResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| BoothError::Config(format!("{}: {}", parent.display(), e)))?;
        }

        let raw = serde_json::to_string_pretty(self)
            .map_err(|e| BoothError::Config(e.to_string()))?;
        std::fs::write(path, raw)
            .map_err(|e| BoothError::Config(format!("{}: {}", path.display(), e)))?;
        Ok(())
    }
}

/// Default export directory (`Pictures/photobooth`)
fn default_export_dir() -> PathBuf {
    dirs::picture_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("photobooth")
}

// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use crate::compositor::GridLayout;
use serde::{Deserialize, Serialize};

/// Grid canvas resolution presets
///
/// These presets define the total canvas size of a composed 2x2 grid photo.
/// Cell dimensions are always half of the canvas in each direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GridResolution {
    /// 640x480 canvas with 320x240 cells (default)
    #[default]
    Sd,
    /// 1280x720 canvas with 640x360 cells
    Hd,
}

impl GridResolution {
    /// Get all preset variants for UI iteration
    pub const ALL: [GridResolution; 2] = [GridResolution::Sd, GridResolution::Hd];

    /// Get display name for the preset
    pub fn display_name(&self) -> &'static str {
        match self {
            GridResolution::Sd => "SD",
            GridResolution::Hd => "HD",
        }
    }

    /// Get total canvas dimensions for the preset
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            GridResolution::Sd => (640, 480),
            GridResolution::Hd => (1280, 720),
        }
    }

    /// Get the grid layout for the preset
    pub fn layout(&self) -> GridLayout {
        let (width, height) = self.dimensions();
        GridLayout::new(width, height)
    }

    /// Parse a preset from its CLI name ("sd" or "hd")
    pub fn from_name(name: &str) -> Option<GridResolution> {
        match name.to_lowercase().as_str() {
            "sd" => Some(GridResolution::Sd),
            "hd" => Some(GridResolution::Hd),
            _ => None,
        }
    }
}

/// Timing constants
pub mod timing {
    use std::time::Duration;

    /// Interval between countdown ticks
    pub const COUNTDOWN_INTERVAL: Duration = Duration::from_secs(1);

    /// How long the shutter flash stays raised after each shot
    pub const FLASH_DURATION: Duration = Duration::from_millis(300);

    /// Default countdown start value per cycle
    pub const DEFAULT_COUNTDOWN_START: u32 = 3;
}

/// Grid geometry constants
pub mod grid {
    /// Cells per row of the composed grid
    pub const COLUMNS: u32 = 2;

    /// Rows of the composed grid
    pub const ROWS: u32 = 2;

    /// Shots buffered before a grid cycle composes
    pub const SHOTS_PER_GRID: u32 = COLUMNS * ROWS;
}

/// Export constants
pub mod export {
    /// File extension of exported photos (lossless)
    pub const PHOTO_EXTENSION: &str = "png";

    /// chrono format string for export filenames
    ///
    /// ISO-8601-like but filesystem-safe: colons and the fractional dot are
    /// replaced by dashes, millisecond precision keeps rapid shots distinct.
    pub const FILENAME_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H-%M-%S-%3f";

    /// Default filename prefix for exported photos
    pub const DEFAULT_FILENAME_PREFIX: &str = "booth";
}

/// Frame buffer constants
pub mod frame {
    /// Bytes per RGBA pixel
    pub const BYTES_PER_PIXEL: u32 = 4;
}

/// Application information utilities
pub mod app_info {
    /// Get the application version from build-time environment
    pub fn version() -> &'static str {
        env!("GIT_VERSION")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_dimensions() {
        assert_eq!(GridResolution::Sd.dimensions(), (640, 480));
        assert_eq!(GridResolution::Hd.dimensions(), (1280, 720));
    }

    #[test]
    fn test_preset_names() {
        assert_eq!(GridResolution::from_name("sd"), Some(GridResolution::Sd));
        assert_eq!(GridResolution::from_name("HD"), Some(GridResolution::Hd));
        assert_eq!(GridResolution::from_name("4k"), None);
    }
}

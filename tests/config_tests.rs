// SPDX-License-Identifier: MPL-2.0

//! Integration tests for configuration module

use photobooth::{CaptureMode, Config, GridResolution};

#[test]
fn test_config_default() {
    let config = Config::default();

    // Check sensible defaults
    assert_eq!(config.single_countdown_start, 3);
    assert_eq!(config.grid_countdown_start, 3);
    assert_eq!(config.grid_resolution, GridResolution::Sd);
    assert_eq!(config.filename_prefix, "booth");
}

#[test]
fn test_countdown_start_is_clamped() {
    // A zero countdown would fire the shutter with no warning
    let mut config = Config::default();
    config.single_countdown_start = 0;
    assert_eq!(config.countdown_start(CaptureMode::Single), 1);
    assert_eq!(config.countdown_start(CaptureMode::Grid), 3);
}

#[test]
fn test_config_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");

    let mut config = Config::default();
    config.grid_resolution = GridResolution::Hd;
    config.filename_prefix = "party".to_string();
    config.save_to(&path).unwrap();

    let loaded = Config::load_from(&path);
    assert_eq!(loaded, config);
}

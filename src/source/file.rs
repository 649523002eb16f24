// SPDX-License-Identifier: GPL-3.0-only

//! Still-image file frame source
//!
//! Decodes one image file at construction time and serves it as every frame.
//! This is the webcam stand-in for a headless binary: point it at a portrait
//! and every shutter grabs that portrait.

use crate::errors::{FrameGrabError, SourceError};
use crate::source::{FrameSource, StillImage};
use std::path::Path;
use tracing::info;

/// Frame source backed by a single decoded image file
#[derive(Debug)]
pub struct FileFrameSource {
    label: String,
    still: StillImage,
}

impl FileFrameSource {
    /// Open and decode an image file
    ///
    /// Filesystem permission errors map to `SourceError::PermissionDenied`;
    /// missing or undecodable files map to `SourceError::DeviceUnavailable`.
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let bytes = std::fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::PermissionDenied => SourceError::PermissionDenied,
            _ => SourceError::DeviceUnavailable(format!("{}: {}", path.display(), e)),
        })?;

        let decoded = image::load_from_memory(&bytes)
            .map_err(|e| SourceError::DeviceUnavailable(format!("{}: {}", path.display(), e)))?;
        let still = StillImage::from_image(decoded.to_rgba8());

        info!(
            path = %path.display(),
            width = still.width,
            height = still.height,
            "Opened file frame source"
        );

        Ok(Self {
            label: format!("file:{}", path.display()),
            still,
        })
    }
}

impl FrameSource for FileFrameSource {
    fn name(&self) -> &str {
        &self.label
    }

    fn frame_available(&self) -> bool {
        true
    }

    fn grab_frame(&mut self) -> Result<StillImage, FrameGrabError> {
        Ok(self.still.clone())
    }
}

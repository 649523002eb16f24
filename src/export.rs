// SPDX-License-Identifier: MPL-2.0

//! Photo export sink
//!
//! Encodes photos as lossless PNG and saves them under deterministic
//! timestamped filenames. Encoding is CPU-bound and writes are I/O-bound, so
//! both run on blocking workers.

use crate::config::Config;
use crate::constants::export::{FILENAME_TIMESTAMP_FORMAT, PHOTO_EXTENSION};
use crate::errors::ExportError;
use crate::gallery::Photo;
use crate::source::StillImage;
use std::path::{Path, PathBuf};
use tracing::info;

/// Photo exporter with a fixed output directory and filename prefix
#[derive(Debug, Clone)]
pub struct PhotoExporter {
    output_dir: PathBuf,
    prefix: String,
}

impl PhotoExporter {
    pub fn new(output_dir: PathBuf, prefix: impl Into<String>) -> Self {
        Self {
            output_dir,
            prefix: prefix.into(),
        }
    }

    /// Build an exporter from the configured prefix and export directory
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.export_directory(), config.filename_prefix.clone())
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Filename for a photo, derived only from its capture timestamp
    ///
    /// The same photo always maps to the same filename; millisecond
    /// precision keeps rapid consecutive shots distinct.
    pub fn filename_for(&self, photo: &Photo) -> String {
        let stamp = photo.captured_at.format(FILENAME_TIMESTAMP_FORMAT);
        format!("{}_{}.{}", self.prefix, stamp, PHOTO_EXTENSION)
    }

    /// Encode and save one photo
    ///
    /// # Arguments
    /// * `photo` - Photo to export
    ///
    /// # Returns
    /// * `Ok(PathBuf)` - Path to the saved file
    /// * `Err(ExportError)` - Encoding or save failure
    pub async fn export(&self, photo: &Photo) -> Result<PathBuf, ExportError> {
        let filepath = self.output_dir.join(self.filename_for(photo));

        info!(path = %filepath.display(), id = %photo.id, "Exporting photo");

        // Encode in a background task (CPU-bound)
        let image = photo.image.clone();
        let data = tokio::task::spawn_blocking(move || encode_png(&image))
            .await
            .map_err(|e| ExportError::EncodingFailed(format!("Encoding task error: {}", e)))??;

        // Write to disk in a background task (I/O-bound)
        let output_dir = self.output_dir.clone();
        let write_path = filepath.clone();
        tokio::task::spawn_blocking(move || {
            std::fs::create_dir_all(&output_dir)?;
            std::fs::write(&write_path, &data)?;
            Ok::<_, ExportError>(())
        })
        .await
        .map_err(|e| ExportError::SaveFailed(format!("Save task error: {}", e)))??;

        info!(path = %filepath.display(), "Photo exported");
        Ok(filepath)
    }

    /// Export photos one by one in stored order
    pub async fn export_all(&self, photos: &[Photo]) -> Result<Vec<PathBuf>, ExportError> {
        info!(
            count = photos.len(),
            dir = %self.output_dir.display(),
            "Exporting all photos"
        );

        let mut paths = Vec::with_capacity(photos.len());
        for photo in photos {
            paths.push(self.export(photo).await?);
        }
        Ok(paths)
    }
}

/// Encode a still image as PNG
fn encode_png(image: &StillImage) -> Result<Vec<u8>, ExportError> {
    let buffer_image = image
        .to_rgba_image()
        .ok_or_else(|| ExportError::EncodingFailed(format!("invalid image data: {:?}", image)))?;

    let mut buffer = Vec::new();
    buffer_image
        .write_to(
            &mut std::io::Cursor::new(&mut buffer),
            image::ImageFormat::Png,
        )
        .map_err(|e| ExportError::EncodingFailed(format!("PNG encoding failed: {}", e)))?;

    Ok(buffer)
}

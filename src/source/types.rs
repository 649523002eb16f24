// SPDX-License-Identifier: GPL-3.0-only

//! Shared still-image type

use crate::constants::frame::BYTES_PER_PIXEL;
use image::{Rgba, RgbaImage};
use std::sync::Arc;

/// A still image in RGBA8 layout
///
/// The universal raster handle of the crate: frame grabs produce it, grid
/// cycles buffer it, the compositor consumes and produces it, the exporter
/// encodes it. Pixel data is reference counted so buffering and cloning a
/// shot never copies the pixels.
#[derive(Clone)]
pub struct StillImage {
    pub width: u32,
    pub height: u32,
    /// Tightly packed RGBA8 pixel rows, no stride padding
    pub data: Arc<[u8]>,
}

impl StillImage {
    /// Create a still image from raw RGBA bytes
    ///
    /// Returns `None` if either dimension is zero or the buffer length does
    /// not match `width * height * 4`.
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        let image = Self {
            width,
            height,
            data: Arc::from(data),
        };
        if image.is_valid() { Some(image) } else { None }
    }

    /// Create a still image from a decoded RGBA image buffer
    pub fn from_image(image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            data: Arc::from(image.into_raw()),
        }
    }

    /// Create an opaque black image, used as the placeholder when a grid
    /// shot could not be grabbed
    pub fn blank(width: u32, height: u32) -> Self {
        Self::from_image(RgbaImage::from_pixel(
            width.max(1),
            height.max(1),
            Rgba([0, 0, 0, 255]),
        ))
    }

    /// Expected pixel buffer length for the stored dimensions
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * BYTES_PER_PIXEL as usize
    }

    /// Whether dimensions and buffer length are consistent
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0 && self.data.len() == self.expected_len()
    }

    /// View the image as an `image` crate buffer (copies the pixel data)
    ///
    /// Returns `None` for an invalid image.
    pub fn to_rgba_image(&self) -> Option<RgbaImage> {
        if !self.is_valid() {
            return None;
        }
        RgbaImage::from_raw(self.width, self.height, self.data.to_vec())
    }
}

impl std::fmt::Debug for StillImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "StillImage({}x{}, {} bytes)",
            self.width,
            self.height,
            self.data.len()
        )
    }
}

// SPDX-License-Identifier: GPL-3.0-only

//! 2x2 grid composition
//!
//! Pure raster assembly: four buffered shots go in, one canvas-sized image
//! comes out. Cells are filled in row-major order (0 = top-left, 1 =
//! top-right, 2 = bottom-left, 3 = bottom-right) and each shot is scaled to
//! exactly fill its cell, stretching if the source aspect differs. Output is
//! deterministic: the same shots and layout always produce byte-identical
//! pixel data.

use crate::constants::grid;
use crate::errors::CompositionError;
use crate::source::StillImage;
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use tracing::debug;

/// Canvas geometry of a composed grid photo
///
/// Cell dimensions are always half of the canvas in each direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    pub width: u32,
    pub height: u32,
}

impl GridLayout {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn cell_width(&self) -> u32 {
        self.width / grid::COLUMNS
    }

    pub fn cell_height(&self) -> u32 {
        self.height / grid::ROWS
    }

    /// Top-left corner of a cell, row-major indexing
    pub fn cell_origin(&self, index: usize) -> (u32, u32) {
        let index = index as u32;
        (
            (index % grid::COLUMNS) * self.cell_width(),
            (index / grid::COLUMNS) * self.cell_height(),
        )
    }
}

/// Compose exactly four shots into one 2x2 grid image
///
/// Fails without producing an image if the shot count is wrong or any shot
/// has inconsistent dimensions and pixel data; the caller keeps its buffer
/// and decides whether to retry or discard.
pub fn compose_grid(
    shots: &[StillImage],
    layout: GridLayout,
) -> Result<StillImage, CompositionError> {
    let expected = grid::SHOTS_PER_GRID as usize;
    if shots.len() != expected {
        return Err(CompositionError::ShotCount {
            expected,
            actual: shots.len(),
        });
    }

    let cell_width = layout.cell_width();
    let cell_height = layout.cell_height();
    if cell_width == 0 || cell_height == 0 {
        return Err(CompositionError::Failed(format!(
            "layout {}x{} has empty cells",
            layout.width, layout.height
        )));
    }

    let mut canvas = RgbaImage::from_pixel(layout.width, layout.height, Rgba([0, 0, 0, 255]));

    for (index, shot) in shots.iter().enumerate() {
        let source = shot
            .to_rgba_image()
            .ok_or(CompositionError::InvalidShot { index })?;

        let scaled = if source.dimensions() == (cell_width, cell_height) {
            source
        } else {
            imageops::resize(&source, cell_width, cell_height, FilterType::Triangle)
        };

        let (x, y) = layout.cell_origin(index);
        imageops::replace(&mut canvas, &scaled, i64::from(x), i64::from(y));
    }

    debug!(
        width = layout.width,
        height = layout.height,
        "Composed 2x2 grid"
    );

    Ok(StillImage::from_image(canvas))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn solid(width: u32, height: u32, rgba: [u8; 4]) -> StillImage {
        StillImage::from_image(RgbaImage::from_pixel(width, height, Rgba(rgba)))
    }

    const RED: [u8; 4] = [255, 0, 0, 255];
    const GREEN: [u8; 4] = [0, 255, 0, 255];
    const BLUE: [u8; 4] = [0, 0, 255, 255];
    const YELLOW: [u8; 4] = [255, 255, 0, 255];

    #[test]
    fn test_cells_fill_row_major() {
        let layout = GridLayout::new(640, 480);
        let shots = vec![
            solid(320, 240, RED),
            solid(320, 240, GREEN),
            solid(320, 240, BLUE),
            solid(320, 240, YELLOW),
        ];

        let composed = compose_grid(&shots, layout).unwrap();
        assert_eq!((composed.width, composed.height), (640, 480));

        let canvas = composed.to_rgba_image().unwrap();
        assert_eq!(canvas.get_pixel(160, 120).0, RED); // top-left
        assert_eq!(canvas.get_pixel(480, 120).0, GREEN); // top-right
        assert_eq!(canvas.get_pixel(160, 360).0, BLUE); // bottom-left
        assert_eq!(canvas.get_pixel(480, 360).0, YELLOW); // bottom-right
    }

    #[test]
    fn test_shots_stretch_to_fill_cells() {
        // Square sources into 4:3 cells: the whole cell is covered anyway
        let layout = GridLayout::new(640, 480);
        let shots = vec![
            solid(100, 100, RED),
            solid(100, 100, GREEN),
            solid(100, 100, BLUE),
            solid(100, 100, YELLOW),
        ];

        let canvas = compose_grid(&shots, layout)
            .unwrap()
            .to_rgba_image()
            .unwrap();
        assert_eq!(canvas.get_pixel(0, 0).0, RED);
        assert_eq!(canvas.get_pixel(319, 239).0, RED);
        assert_eq!(canvas.get_pixel(320, 240).0, YELLOW);
        assert_eq!(canvas.get_pixel(639, 479).0, YELLOW);
    }

    #[test]
    fn test_wrong_shot_count_is_rejected() {
        let layout = GridLayout::new(640, 480);
        let three: Vec<StillImage> = (0..3).map(|_| solid(320, 240, RED)).collect();
        let five: Vec<StillImage> = (0..5).map(|_| solid(320, 240, RED)).collect();

        assert!(matches!(
            compose_grid(&three, layout),
            Err(CompositionError::ShotCount {
                expected: 4,
                actual: 3
            })
        ));
        assert!(matches!(
            compose_grid(&five, layout),
            Err(CompositionError::ShotCount {
                expected: 4,
                actual: 5
            })
        ));
    }

    #[test]
    fn test_invalid_shot_is_rejected_with_index() {
        let layout = GridLayout::new(640, 480);
        let mut shots = vec![
            solid(320, 240, RED),
            solid(320, 240, GREEN),
            solid(320, 240, BLUE),
            solid(320, 240, YELLOW),
        ];
        shots[2] = StillImage {
            width: 320,
            height: 240,
            data: Arc::from(vec![0u8; 11]),
        };

        assert!(matches!(
            compose_grid(&shots, layout),
            Err(CompositionError::InvalidShot { index: 2 })
        ));
    }

    #[test]
    fn test_composition_is_deterministic() {
        let layout = GridLayout::new(640, 480);
        let mut source = crate::source::TestPatternSource::new(200, 150);
        let shots: Vec<StillImage> = (0..4)
            .map(|_| {
                crate::source::FrameSource::grab_frame(&mut source).unwrap()
            })
            .collect();

        let first = compose_grid(&shots, layout).unwrap();
        let second = compose_grid(&shots, layout).unwrap();
        assert_eq!(first.data, second.data);
    }

    #[test]
    fn test_hd_layout_geometry() {
        let layout = GridLayout::new(1280, 720);
        assert_eq!(layout.cell_width(), 640);
        assert_eq!(layout.cell_height(), 360);
        assert_eq!(layout.cell_origin(0), (0, 0));
        assert_eq!(layout.cell_origin(1), (640, 0));
        assert_eq!(layout.cell_origin(2), (0, 360));
        assert_eq!(layout.cell_origin(3), (640, 360));
    }
}

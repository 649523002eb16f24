// SPDX-License-Identifier: GPL-3.0-only

//! Synthetic test pattern frame source

use crate::errors::FrameGrabError;
use crate::source::{FrameSource, StillImage};
use image::{Rgba, RgbaImage};

/// Frame source producing a deterministic moving gradient
///
/// Each grabbed frame advances an internal counter, shifting a diagonal
/// highlight band across the gradient so consecutive grid shots are visibly
/// distinct. Never fails and never runs out of frames.
#[derive(Debug)]
pub struct TestPatternSource {
    width: u32,
    height: u32,
    frame_index: u64,
}

impl TestPatternSource {
    /// Create a pattern source with the given frame dimensions
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            frame_index: 0,
        }
    }
}

impl Default for TestPatternSource {
    fn default() -> Self {
        Self::new(640, 480)
    }
}

impl FrameSource for TestPatternSource {
    fn name(&self) -> &str {
        "test-pattern"
    }

    fn frame_available(&self) -> bool {
        true
    }

    fn grab_frame(&mut self) -> Result<StillImage, FrameGrabError> {
        let (width, height) = (self.width, self.height);
        let phase = (self.frame_index as u32).wrapping_mul(8);
        self.frame_index += 1;

        let image = RgbaImage::from_fn(width, height, move |x, y| {
            let diagonal = x.wrapping_add(y).wrapping_add(phase);
            if diagonal % 96 < 8 {
                Rgba([255, 255, 255, 255])
            } else {
                let r = (x * 255 / width) as u8;
                let g = (y * 255 / height) as u8;
                let b = (diagonal % 256) as u8;
                Rgba([r, g, b, 255])
            }
        });

        Ok(StillImage::from_image(image))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frames_are_valid() {
        let mut source = TestPatternSource::new(64, 48);
        let frame = source.grab_frame().unwrap();
        assert!(frame.is_valid());
        assert_eq!((frame.width, frame.height), (64, 48));
    }

    #[test]
    fn test_consecutive_frames_differ() {
        let mut source = TestPatternSource::new(64, 48);
        let first = source.grab_frame().unwrap();
        let second = source.grab_frame().unwrap();
        assert_ne!(first.data, second.data);
    }

    #[test]
    fn test_zero_dimensions_are_clamped() {
        let mut source = TestPatternSource::new(0, 0);
        let frame = source.grab_frame().unwrap();
        assert!(frame.is_valid());
    }
}

// SPDX-License-Identifier: MPL-2.0

//! Frame source abstraction
//!
//! The capture session does not talk to camera hardware. It consumes a
//! [`FrameSource`]: something that can say whether a frame is available and
//! hand out the current frame as a [`StillImage`]. Two implementations ship
//! with the crate:
//! - [`FileFrameSource`]: decodes a still image file once and serves it as
//!   every frame
//! - [`TestPatternSource`]: synthetic moving gradient, useful without any
//!   input file and for tests
//!
//! Acquisition failures (`PermissionDenied`, `DeviceUnavailable`) surface at
//! construction time; a session can start without a source and attach one
//! later.

pub mod file;
pub mod pattern;
pub mod types;

pub use file::FileFrameSource;
pub use pattern::TestPatternSource;
pub use types::StillImage;

use crate::errors::FrameGrabError;

/// A live source of still frames
pub trait FrameSource: std::fmt::Debug + Send {
    /// Label for diagnostics (e.g. "file:selfie.png", "test-pattern")
    fn name(&self) -> &str;

    /// Whether a frame could be grabbed right now
    fn frame_available(&self) -> bool;

    /// Grab the current frame as a still image
    fn grab_frame(&mut self) -> Result<StillImage, FrameGrabError>;
}

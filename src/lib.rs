// SPDX-License-Identifier: MPL-2.0

//! Photo Booth - A countdown photo booth engine
//!
//! This library provides the core functionality of a photo booth: timed
//! capture cycles with a visible countdown, a shutter flash pulse, single
//! shots and four-shot 2x2 grid photos composed into one image.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`session`]: Capture cycle state machine and its tokio runner
//! - [`source`]: Frame source abstraction and built-in sources
//! - [`compositor`]: 2x2 grid composition
//! - [`gallery`]: Append-only session gallery
//! - [`export`]: PNG export with timestamped filenames
//! - [`config`]: User configuration handling
//!
//! # Example
//!
//! ```ignore
//! let session = CaptureSession::with_source(Config::default(), source);
//! let (runner, handle, events) = SessionRunner::new(session);
//! tokio::spawn(runner.run());
//! handle.start_cycle(CaptureMode::Grid);
//! ```

pub mod compositor;
pub mod config;
pub mod constants;
pub mod errors;
pub mod export;
pub mod gallery;
pub mod session;
pub mod source;

// Re-export commonly used types
pub use compositor::{GridLayout, compose_grid};
pub use config::Config;
pub use constants::GridResolution;
pub use errors::{BoothError, BoothResult};
pub use export::PhotoExporter;
pub use gallery::{Gallery, Photo, PhotoId};
pub use session::{
    CaptureMode, CaptureSession, Command, Message, SessionEvent, SessionHandle, SessionRunner,
    event_stream,
};
pub use source::{FileFrameSource, FrameSource, StillImage, TestPatternSource};

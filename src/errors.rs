// SPDX-License-Identifier: MPL-2.0

//! Error types for the photo booth engine

use std::fmt;

/// Result type alias using BoothError
pub type BoothResult<T> = Result<T, BoothError>;

/// Main booth error type
#[derive(Debug, Clone)]
pub enum BoothError {
    /// Frame source acquisition errors
    Source(SourceError),
    /// Per-shot frame grab errors
    FrameGrab(FrameGrabError),
    /// Grid composition errors
    Composition(CompositionError),
    /// Photo export errors
    Export(ExportError),
    /// Configuration errors
    Config(String),
    /// Generic error with message
    Other(String),
}

/// Frame source acquisition errors
#[derive(Debug, Clone)]
pub enum SourceError {
    /// Access to the frame source was denied
    PermissionDenied,
    /// No usable frame source (missing, unreadable or undecodable)
    DeviceUnavailable(String),
}

/// Per-shot frame grab errors
#[derive(Debug, Clone)]
pub enum FrameGrabError {
    /// No frame available for capture
    NoFrameAvailable,
    /// Grab failed
    Failed(String),
}

/// Grid composition errors
#[derive(Debug, Clone)]
pub enum CompositionError {
    /// Wrong number of buffered shots
    ShotCount { expected: usize, actual: usize },
    /// A buffered shot has inconsistent dimensions or pixel data
    InvalidShot { index: usize },
    /// Composition could not run to completion
    Failed(String),
}

/// Photo export errors
#[derive(Debug, Clone)]
pub enum ExportError {
    /// Encoding failed
    EncodingFailed(String),
    /// Save failed
    SaveFailed(String),
}

impl fmt::Display for BoothError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoothError::Source(e) => write!(f, "Frame source error: {}", e),
            BoothError::FrameGrab(e) => write!(f, "Frame grab error: {}", e),
            BoothError::Composition(e) => write!(f, "Composition error: {}", e),
            BoothError::Export(e) => write!(f, "Export error: {}", e),
            BoothError::Config(msg) => write!(f, "Configuration error: {}", msg),
            BoothError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::PermissionDenied => write!(f, "Permission denied"),
            SourceError::DeviceUnavailable(msg) => write!(f, "Device unavailable: {}", msg),
        }
    }
}

impl fmt::Display for FrameGrabError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameGrabError::NoFrameAvailable => write!(f, "No frame available for capture"),
            FrameGrabError::Failed(msg) => write!(f, "Grab failed: {}", msg),
        }
    }
}

impl fmt::Display for CompositionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompositionError::ShotCount { expected, actual } => {
                write!(f, "Expected {} shots, got {}", expected, actual)
            }
            CompositionError::InvalidShot { index } => {
                write!(f, "Shot {} is not a valid image", index)
            }
            CompositionError::Failed(msg) => write!(f, "Composition failed: {}", msg),
        }
    }
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::EncodingFailed(msg) => write!(f, "Encoding failed: {}", msg),
            ExportError::SaveFailed(msg) => write!(f, "Save failed: {}", msg),
        }
    }
}

impl std::error::Error for BoothError {}
impl std::error::Error for SourceError {}
impl std::error::Error for FrameGrabError {}
impl std::error::Error for CompositionError {}
impl std::error::Error for ExportError {}

// Conversions from sub-errors to BoothError
impl From<SourceError> for BoothError {
    fn from(err: SourceError) -> Self {
        BoothError::Source(err)
    }
}

impl From<FrameGrabError> for BoothError {
    fn from(err: FrameGrabError) -> Self {
        BoothError::FrameGrab(err)
    }
}

impl From<CompositionError> for BoothError {
    fn from(err: CompositionError) -> Self {
        BoothError::Composition(err)
    }
}

impl From<ExportError> for BoothError {
    fn from(err: ExportError) -> Self {
        BoothError::Export(err)
    }
}

impl From<String> for BoothError {
    fn from(msg: String) -> Self {
        BoothError::Other(msg)
    }
}

impl From<&str> for BoothError {
    fn from(msg: &str) -> Self {
        BoothError::Other(msg.to_string())
    }
}

// Conversions for I/O errors
impl From<std::io::Error> for BoothError {
    fn from(err: std::io::Error) -> Self {
        BoothError::Other(err.to_string())
    }
}

impl From<std::io::Error> for ExportError {
    fn from(err: std::io::Error) -> Self {
        ExportError::SaveFailed(err.to_string())
    }
}

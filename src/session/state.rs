// SPDX-License-Identifier: GPL-3.0-only

//! Session state and message types

use crate::compositor::GridLayout;
use crate::constants::grid;
use crate::errors::CompositionError;
use crate::gallery::Photo;
use crate::source::{FrameSource, StillImage};

/// Capture modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptureMode {
    /// One countdown, one photo
    #[default]
    Single,
    /// Four countdown+shutter sub-steps composed into one 2x2 photo
    Grid,
}

impl CaptureMode {
    /// Shots a full cycle captures in this mode
    pub fn shots_per_cycle(&self) -> u32 {
        match self {
            CaptureMode::Single => 1,
            CaptureMode::Grid => grid::SHOTS_PER_GRID,
        }
    }
}

impl std::fmt::Display for CaptureMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaptureMode::Single => write!(f, "single"),
            CaptureMode::Grid => write!(f, "grid"),
        }
    }
}

/// Capture cycle state machine
///
/// A cycle is either idle, counting toward the next shutter, or waiting for
/// an outstanding grid composition.
#[derive(Debug, Default)]
pub enum CycleState {
    /// No cycle active
    #[default]
    Idle,
    /// Countdown running toward the next shutter
    CountingDown {
        /// Seconds left until the shutter fires
        remaining: u32,
    },
    /// Four shots buffered, grid composition outstanding
    Composing,
}

impl CycleState {
    /// Check if no cycle is active
    pub fn is_idle(&self) -> bool {
        matches!(self, CycleState::Idle)
    }

    /// Check if a cycle is in progress (counting down or composing)
    pub fn is_active(&self) -> bool {
        !self.is_idle()
    }

    /// Check if a grid composition is outstanding
    pub fn is_composing(&self) -> bool {
        matches!(self, CycleState::Composing)
    }

    /// Get the countdown value if one is running
    pub fn countdown(&self) -> Option<u32> {
        match self {
            CycleState::CountingDown { remaining } => Some(*remaining),
            _ => None,
        }
    }

    /// Reset to idle (returns the previous state)
    pub fn reset(&mut self) -> Self {
        std::mem::replace(self, CycleState::Idle)
    }
}

/// Messages consumed by the capture session.
///
/// Messages are organized into logical groups:
/// - **Cycle Control**: user-facing start/cancel actions
/// - **Timer Completions**: scheduled countdown and flash deliveries
/// - **Composition**: asynchronous grid assembly results
/// - **Session**: source attachment and shutdown
#[derive(Debug)]
pub enum Message {
    // ===== Cycle Control =====
    /// Start a capture cycle, restarting any cycle already in progress
    StartCycle(CaptureMode),
    /// Cancel the active cycle without emitting a photo
    CancelCycle,

    // ===== Timer Completions =====
    /// Countdown interval elapsed for the stamped cycle
    CountdownTick { generation: u64 },
    /// Flash duration elapsed for the stamped shutter
    FlashDecay { pulse: u64 },

    // ===== Composition =====
    /// Grid composition resolved for the stamped cycle
    CompositionFinished {
        generation: u64,
        result: Result<StillImage, CompositionError>,
    },

    // ===== Session =====
    /// Install or replace the frame source
    AttachSource(Box<dyn FrameSource>),
    /// Cancel any active cycle and stop the runner
    Shutdown,
}

/// Follow-up work returned by the session for the runner to execute
#[derive(Debug)]
pub enum Command {
    /// Schedule a countdown tick after the countdown interval
    ScheduleTick { generation: u64 },
    /// Abort the pending countdown tick, if any
    CancelTick,
    /// Schedule a flash decay after the flash duration
    ScheduleFlashDecay { pulse: u64 },
    /// Compose the buffered shots on a blocking worker
    Compose {
        generation: u64,
        shots: Vec<StillImage>,
        layout: GridLayout,
    },
    /// Forward a session event to observers
    Notify(SessionEvent),
}

/// Observable session events
///
/// Everything a UI surface needs to render a booth: countdown values, the
/// flash pulse, grid progress and appended photos.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// A capture cycle started counting down
    CountdownStarted { mode: CaptureMode, value: u32 },
    /// The countdown moved to a new value
    CountdownChanged { value: u32 },
    /// Shutter fired; flash overlay raised
    ShutterFired,
    /// Flash overlay dropped
    FlashEnded,
    /// A grid shot was buffered
    ShotBuffered {
        image: StillImage,
        count: usize,
        required: usize,
    },
    /// Grid composition started; new cycles are rejected until it resolves
    CompositionStarted,
    /// A photo was appended to the gallery
    PhotoAppended { photo: Photo },
    /// Grid composition failed; buffered shots are retained
    CompositionFailed { error: CompositionError },
    /// The active cycle was cancelled without emitting a photo
    CycleCancelled,
    /// The cycle finished and the session is idle again
    CycleCompleted,
    /// A frame source was attached
    SourceAttached { name: String },
}

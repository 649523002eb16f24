// SPDX-License-Identifier: MPL-2.0

//! Capture session controller
//!
//! [`CaptureSession`] owns all booth state and drives the countdown, shutter
//! and composition sequence. It is a synchronous state machine: callers feed
//! it [`Message`] values and execute the returned [`Command`] values (see
//! [`runner::SessionRunner`] for the tokio shell that does so). This keeps
//! every transition deterministic and testable without a runtime.
//!
//! Two independent timers can be in flight at once, the 1-second countdown
//! tick and the 300ms flash decay. Both deliveries carry a token stamped at
//! schedule time (`generation` for ticks and composition results, `pulse`
//! for flash decays); a delivery whose token no longer matches the session
//! is ignored, so restarting or cancelling a cycle makes the old cycle's
//! timers inert even if they were already in flight.

pub mod runner;
pub mod state;

pub use runner::{SessionHandle, SessionRunner, event_stream};
pub use state::{CaptureMode, Command, CycleState, Message, SessionEvent};

use crate::config::Config;
use crate::constants::grid;
use crate::gallery::{Gallery, Photo};
use crate::source::{FrameSource, StillImage};
use tracing::{debug, error, info, warn};

/// The capture session controller
///
/// Owns the mode, cycle state, grid shot buffer, gallery and frame source.
/// All mutation happens inside [`CaptureSession::update`].
#[derive(Debug)]
pub struct CaptureSession {
    /// Booth settings (countdown starts, grid resolution)
    config: Config,
    /// Frame source; `None` when acquisition failed and was not retried
    source: Option<Box<dyn FrameSource>>,
    /// Current capture mode
    mode: CaptureMode,
    /// Cycle state machine
    cycle: CycleState,
    /// Buffered grid shots, at most one batch
    pending_shots: Vec<StillImage>,
    /// Append-only session output
    gallery: Gallery,
    /// Whether the flash overlay is raised
    flash_active: bool,
    /// Stamp for countdown ticks and composition results
    cycle_generation: u64,
    /// Stamp for flash decay timers
    flash_pulse: u64,
}

impl CaptureSession {
    /// Create a session without a frame source
    ///
    /// Shutters will produce placeholder or missing shots until a source is
    /// attached with [`Message::AttachSource`].
    pub fn new(config: Config) -> Self {
        Self {
            config,
            source: None,
            mode: CaptureMode::default(),
            cycle: CycleState::default(),
            pending_shots: Vec::new(),
            gallery: Gallery::new(),
            flash_active: false,
            cycle_generation: 0,
            flash_pulse: 0,
        }
    }

    /// Create a session with a frame source already attached
    pub fn with_source(config: Config, source: Box<dyn FrameSource>) -> Self {
        let mut session = Self::new(config);
        session.source = Some(source);
        session
    }

    /// Current capture mode
    pub fn mode(&self) -> CaptureMode {
        self.mode
    }

    /// Countdown value if one is running
    pub fn countdown(&self) -> Option<u32> {
        self.cycle.countdown()
    }

    /// Check if a cycle is in progress
    pub fn is_cycle_active(&self) -> bool {
        self.cycle.is_active()
    }

    /// Check if a grid composition is outstanding
    pub fn is_composing(&self) -> bool {
        self.cycle.is_composing()
    }

    /// Check if the flash overlay is raised
    pub fn flash_active(&self) -> bool {
        self.flash_active
    }

    /// Buffered grid shots of the current batch
    pub fn pending_shots(&self) -> &[StillImage] {
        &self.pending_shots
    }

    /// Session photo gallery
    pub fn gallery(&self) -> &Gallery {
        &self.gallery
    }

    /// Process one message and return the follow-up commands
    pub fn update(&mut self, message: Message) -> Vec<Command> {
        match message {
            // ===== Cycle Control =====
            Message::StartCycle(mode) => self.handle_start_cycle(mode),
            Message::CancelCycle => self.handle_cancel_cycle(),

            // ===== Timer Completions =====
            Message::CountdownTick { generation } => self.handle_countdown_tick(generation),
            Message::FlashDecay { pulse } => self.handle_flash_decay(pulse),

            // ===== Composition =====
            Message::CompositionFinished { generation, result } => {
                self.handle_composition_finished(generation, result)
            }

            // ===== Session =====
            Message::AttachSource(source) => self.handle_attach_source(source),
            Message::Shutdown => self.handle_shutdown(),
        }
    }

    /// Start a cycle, restarting any countdown already in progress
    ///
    /// Rejected while a composition is outstanding: the late composed photo
    /// would otherwise race the new cycle's state.
    fn handle_start_cycle(&mut self, mode: CaptureMode) -> Vec<Command> {
        if self.cycle.is_composing() {
            warn!(%mode, "Cannot start capture cycle: composition outstanding");
            return Vec::new();
        }

        let mut commands = Vec::new();
        if self.cycle.is_active() {
            info!(old_mode = %self.mode, new_mode = %mode, "Restarting capture cycle");
            commands.push(Command::CancelTick);
            commands.push(Command::Notify(SessionEvent::CycleCancelled));
        }

        self.cycle_generation += 1;
        self.mode = mode;
        self.pending_shots.clear();

        let start = self.config.countdown_start(mode);
        self.cycle = CycleState::CountingDown { remaining: start };

        info!(%mode, countdown = start, "Capture cycle started");
        commands.push(Command::ScheduleTick {
            generation: self.cycle_generation,
        });
        commands.push(Command::Notify(SessionEvent::CountdownStarted {
            mode,
            value: start,
        }));
        commands
    }

    /// Cancel the active cycle, discarding any buffered shots
    fn handle_cancel_cycle(&mut self) -> Vec<Command> {
        if self.cycle.is_idle() && self.pending_shots.is_empty() {
            debug!("Cancel requested while idle");
            return Vec::new();
        }

        self.cycle_generation += 1;
        self.cycle.reset();
        self.pending_shots.clear();

        info!("Capture cycle cancelled");
        vec![
            Command::CancelTick,
            Command::Notify(SessionEvent::CycleCancelled),
        ]
    }

    /// Decrement the countdown, firing the shutter when it reaches zero
    fn handle_countdown_tick(&mut self, generation: u64) -> Vec<Command> {
        if generation != self.cycle_generation {
            debug!(
                generation,
                current = self.cycle_generation,
                "Ignoring stale countdown tick"
            );
            return Vec::new();
        }

        let CycleState::CountingDown { remaining } = &mut self.cycle else {
            warn!("Countdown tick outside an active countdown");
            return Vec::new();
        };

        *remaining -= 1;
        if *remaining > 0 {
            let value = *remaining;
            debug!(value, "Countdown ticked");
            return vec![
                Command::ScheduleTick { generation },
                Command::Notify(SessionEvent::CountdownChanged { value }),
            ];
        }

        self.fire_shutter()
    }

    /// Shutter event: raise the flash, grab a shot, advance the cycle
    fn fire_shutter(&mut self) -> Vec<Command> {
        self.flash_pulse += 1;
        self.flash_active = true;

        let mut commands = vec![
            Command::Notify(SessionEvent::ShutterFired),
            Command::ScheduleFlashDecay {
                pulse: self.flash_pulse,
            },
        ];

        let shot = self.grab_shot();
        match self.mode {
            CaptureMode::Single => {
                if let Some(image) = shot {
                    let photo = Photo::new(image);
                    info!(id = %photo.id, "Photo captured");
                    self.gallery.append(photo.clone());
                    commands.push(Command::Notify(SessionEvent::PhotoAppended { photo }));
                }
                self.cycle.reset();
                commands.push(Command::Notify(SessionEvent::CycleCompleted));
            }
            CaptureMode::Grid => {
                let layout = self.config.grid_resolution.layout();
                let image = shot.unwrap_or_else(|| {
                    // Best-effort batch: a lost shot becomes a blank cell
                    warn!("Buffering blank placeholder shot");
                    StillImage::blank(layout.cell_width(), layout.cell_height())
                });

                self.pending_shots.push(image.clone());
                let count = self.pending_shots.len();
                let required = grid::SHOTS_PER_GRID as usize;
                info!(count, required, "Grid shot buffered");
                commands.push(Command::Notify(SessionEvent::ShotBuffered {
                    image,
                    count,
                    required,
                }));

                if count < required {
                    let start = self.config.countdown_start(CaptureMode::Grid);
                    self.cycle = CycleState::CountingDown { remaining: start };
                    commands.push(Command::ScheduleTick {
                        generation: self.cycle_generation,
                    });
                    commands.push(Command::Notify(SessionEvent::CountdownChanged {
                        value: start,
                    }));
                } else {
                    self.cycle = CycleState::Composing;
                    info!("Grid batch complete, composing");
                    commands.push(Command::Notify(SessionEvent::CompositionStarted));
                    commands.push(Command::Compose {
                        generation: self.cycle_generation,
                        shots: self.pending_shots.clone(),
                        layout,
                    });
                }
            }
        }

        commands
    }

    /// Grab the current frame, absorbing per-shot failures
    fn grab_shot(&mut self) -> Option<StillImage> {
        let Some(source) = self.source.as_mut() else {
            warn!("No frame source attached");
            return None;
        };

        if !source.frame_available() {
            warn!(source = source.name(), "No frame available");
            return None;
        }

        match source.grab_frame() {
            Ok(image) => Some(image),
            Err(e) => {
                warn!(source = source.name(), error = %e, "Frame grab failed");
                None
            }
        }
    }

    /// Resolve an outstanding grid composition
    fn handle_composition_finished(
        &mut self,
        generation: u64,
        result: Result<StillImage, crate::errors::CompositionError>,
    ) -> Vec<Command> {
        if generation != self.cycle_generation {
            debug!(
                generation,
                current = self.cycle_generation,
                "Discarding late composition result"
            );
            return Vec::new();
        }

        if !self.cycle.is_composing() {
            warn!("Composition result outside composing state");
            return Vec::new();
        }

        self.cycle.reset();

        match result {
            Ok(image) => {
                let photo = Photo::new(image);
                info!(id = %photo.id, "Grid photo composed");
                self.gallery.append(photo.clone());
                // Buffer cleared only once the composed photo is in
                self.pending_shots.clear();
                vec![
                    Command::Notify(SessionEvent::PhotoAppended { photo }),
                    Command::Notify(SessionEvent::CycleCompleted),
                ]
            }
            Err(error) => {
                error!(error = %error, "Grid composition failed, keeping buffered shots");
                vec![
                    Command::Notify(SessionEvent::CompositionFailed { error }),
                    Command::Notify(SessionEvent::CycleCompleted),
                ]
            }
        }
    }

    /// Drop the flash overlay unless a newer shutter re-raised it
    fn handle_flash_decay(&mut self, pulse: u64) -> Vec<Command> {
        if pulse != self.flash_pulse {
            debug!(
                pulse,
                current = self.flash_pulse,
                "Ignoring stale flash decay"
            );
            return Vec::new();
        }
        if !self.flash_active {
            return Vec::new();
        }

        self.flash_active = false;
        vec![Command::Notify(SessionEvent::FlashEnded)]
    }

    /// Install or replace the frame source
    fn handle_attach_source(&mut self, source: Box<dyn FrameSource>) -> Vec<Command> {
        let name = source.name().to_string();
        info!(source = %name, "Frame source attached");
        self.source = Some(source);
        vec![Command::Notify(SessionEvent::SourceAttached { name })]
    }

    /// Cancel any active cycle; the runner stops after this message
    fn handle_shutdown(&mut self) -> Vec<Command> {
        let mut commands = Vec::new();
        if self.cycle.is_active() {
            commands.extend(self.handle_cancel_cycle());
        }
        info!(photos = self.gallery.len(), "Session shut down");
        commands
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{CompositionError, FrameGrabError};

    /// Frame source double with controllable failure
    #[derive(Debug)]
    struct StubSource {
        fail: bool,
        grabs: u8,
    }

    impl StubSource {
        fn working() -> Self {
            Self {
                fail: false,
                grabs: 0,
            }
        }

        fn broken() -> Self {
            Self {
                fail: true,
                grabs: 0,
            }
        }
    }

    impl FrameSource for StubSource {
        fn name(&self) -> &str {
            "stub"
        }

        fn frame_available(&self) -> bool {
            !self.fail
        }

        fn grab_frame(&mut self) -> Result<StillImage, FrameGrabError> {
            if self.fail {
                return Err(FrameGrabError::NoFrameAvailable);
            }
            self.grabs += 1;
            // Each grab gets a distinct shade so order is observable
            StillImage::from_rgba(2, 2, vec![self.grabs; 16])
                .ok_or_else(|| FrameGrabError::Failed("stub buffer".into()))
        }
    }

    fn session() -> CaptureSession {
        CaptureSession::with_source(Config::default(), Box::new(StubSource::working()))
    }

    fn start(session: &mut CaptureSession, mode: CaptureMode) -> (u64, Vec<Command>) {
        let commands = session.update(Message::StartCycle(mode));
        (tick_generation(&commands), commands)
    }

    fn tick_generation(commands: &[Command]) -> u64 {
        commands
            .iter()
            .find_map(|command| match command {
                Command::ScheduleTick { generation } => Some(*generation),
                _ => None,
            })
            .expect("tick scheduled")
    }

    fn flash_pulse(commands: &[Command]) -> u64 {
        commands
            .iter()
            .find_map(|command| match command {
                Command::ScheduleFlashDecay { pulse } => Some(*pulse),
                _ => None,
            })
            .expect("flash decay scheduled")
    }

    fn tick(session: &mut CaptureSession, generation: u64) -> Vec<Command> {
        session.update(Message::CountdownTick { generation })
    }

    /// Run the default three-tick countdown; returns the shutter commands
    fn complete_countdown(session: &mut CaptureSession, generation: u64) -> Vec<Command> {
        tick(session, generation);
        tick(session, generation);
        tick(session, generation)
    }

    fn drive_grid_to_composing(session: &mut CaptureSession) -> u64 {
        let (generation, _) = start(session, CaptureMode::Grid);
        for _ in 0..4 {
            complete_countdown(session, generation);
        }
        assert!(session.is_composing());
        generation
    }

    fn has_event(commands: &[Command], matcher: impl Fn(&SessionEvent) -> bool) -> bool {
        commands.iter().any(|command| match command {
            Command::Notify(event) => matcher(event),
            _ => false,
        })
    }

    #[test]
    fn test_single_cycle_appends_one_photo() {
        let mut session = session();
        let (generation, commands) = start(&mut session, CaptureMode::Single);

        assert!(has_event(&commands, |e| matches!(
            e,
            SessionEvent::CountdownStarted {
                mode: CaptureMode::Single,
                value: 3
            }
        )));
        assert_eq!(session.countdown(), Some(3));

        tick(&mut session, generation);
        assert_eq!(session.countdown(), Some(2));
        tick(&mut session, generation);
        assert_eq!(session.countdown(), Some(1));

        let commands = tick(&mut session, generation);
        assert!(has_event(&commands, |e| matches!(
            e,
            SessionEvent::ShutterFired
        )));
        assert!(has_event(&commands, |e| matches!(
            e,
            SessionEvent::PhotoAppended { .. }
        )));
        assert!(has_event(&commands, |e| matches!(
            e,
            SessionEvent::CycleCompleted
        )));
        assert!(
            !commands
                .iter()
                .any(|c| matches!(c, Command::ScheduleTick { .. }))
        );

        assert!(session.flash_active());
        assert!(!session.is_cycle_active());
        assert_eq!(session.gallery().len(), 1);
        assert_eq!(session.gallery().last().unwrap().image.width, 2);
    }

    #[test]
    fn test_grid_cycle_composes_after_four_shots() {
        let mut session = session();
        let (generation, _) = start(&mut session, CaptureMode::Grid);

        for shot in 1..=4usize {
            let commands = complete_countdown(&mut session, generation);
            assert!(has_event(&commands, |e| matches!(
                e,
                SessionEvent::ShotBuffered { count, required: 4, .. } if *count == shot
            )));

            if shot < 4 {
                assert_eq!(session.pending_shots().len(), shot);
                assert_eq!(session.countdown(), Some(3));
            } else {
                assert!(session.is_composing());
                let compose = commands
                    .iter()
                    .find_map(|c| match c {
                        Command::Compose { shots, layout, .. } => Some((shots, layout)),
                        _ => None,
                    })
                    .expect("compose command");
                assert_eq!(compose.0.len(), 4);
                assert_eq!((compose.1.width, compose.1.height), (640, 480));
            }
        }

        // Nothing appended until the composition resolves
        assert!(session.gallery().is_empty());

        let commands = session.update(Message::CompositionFinished {
            generation,
            result: Ok(StillImage::blank(640, 480)),
        });
        assert!(has_event(&commands, |e| matches!(
            e,
            SessionEvent::PhotoAppended { .. }
        )));
        assert_eq!(session.gallery().len(), 1);
        assert_eq!(session.gallery().last().unwrap().image.width, 640);
        assert!(session.pending_shots().is_empty());
        assert!(!session.is_cycle_active());
    }

    #[test]
    fn test_grid_shots_buffer_in_capture_order() {
        let mut session = session();
        let (generation, _) = start(&mut session, CaptureMode::Grid);
        for _ in 0..4 {
            complete_countdown(&mut session, generation);
        }

        let shades: Vec<u8> = session
            .pending_shots()
            .iter()
            .map(|shot| shot.data[0])
            .collect();
        assert_eq!(shades, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_stale_tick_is_ignored() {
        let mut session = session();
        let (old_generation, _) = start(&mut session, CaptureMode::Grid);
        tick(&mut session, old_generation);
        assert_eq!(session.countdown(), Some(2));

        let (new_generation, _) = start(&mut session, CaptureMode::Single);
        assert_ne!(old_generation, new_generation);
        assert_eq!(session.countdown(), Some(3));

        // The old cycle's tick arrives late and must not touch the new cycle
        let commands = tick(&mut session, old_generation);
        assert!(commands.is_empty());
        assert_eq!(session.countdown(), Some(3));
    }

    #[test]
    fn test_mode_switch_discards_buffered_shots() {
        let mut session = session();
        let (generation, _) = start(&mut session, CaptureMode::Grid);
        complete_countdown(&mut session, generation);
        assert_eq!(session.pending_shots().len(), 1);

        // Second sub-cycle down to one remaining tick
        tick(&mut session, generation);
        tick(&mut session, generation);
        assert_eq!(session.countdown(), Some(1));

        let commands = session.update(Message::StartCycle(CaptureMode::Single));
        assert!(commands.iter().any(|c| matches!(c, Command::CancelTick)));
        assert!(has_event(&commands, |e| matches!(
            e,
            SessionEvent::CycleCancelled
        )));

        assert_eq!(session.mode(), CaptureMode::Single);
        assert!(session.pending_shots().is_empty());
        assert_eq!(session.countdown(), Some(3));
        // The abandoned cycle produced nothing
        assert!(session.gallery().is_empty());
    }

    #[test]
    fn test_cancel_clears_cycle_state() {
        let mut session = session();
        let (generation, _) = start(&mut session, CaptureMode::Single);
        tick(&mut session, generation);

        let commands = session.update(Message::CancelCycle);
        assert!(commands.iter().any(|c| matches!(c, Command::CancelTick)));
        assert!(has_event(&commands, |e| matches!(
            e,
            SessionEvent::CycleCancelled
        )));
        assert_eq!(session.countdown(), None);
        assert!(session.gallery().is_empty());

        // Cancelling while idle is a quiet no-op
        assert!(session.update(Message::CancelCycle).is_empty());
    }

    #[test]
    fn test_grab_failure_single_appends_nothing() {
        let mut session =
            CaptureSession::with_source(Config::default(), Box::new(StubSource::broken()));
        let (generation, _) = start(&mut session, CaptureMode::Single);

        let commands = complete_countdown(&mut session, generation);
        assert!(has_event(&commands, |e| matches!(
            e,
            SessionEvent::ShutterFired
        )));
        assert!(!has_event(&commands, |e| matches!(
            e,
            SessionEvent::PhotoAppended { .. }
        )));
        assert!(has_event(&commands, |e| matches!(
            e,
            SessionEvent::CycleCompleted
        )));

        assert!(session.gallery().is_empty());
        assert!(!session.is_cycle_active());
    }

    #[test]
    fn test_grab_failure_grid_buffers_placeholder() {
        let mut session =
            CaptureSession::with_source(Config::default(), Box::new(StubSource::broken()));
        let (generation, _) = start(&mut session, CaptureMode::Grid);

        complete_countdown(&mut session, generation);
        assert_eq!(session.pending_shots().len(), 1);

        // Placeholder matches the SD cell geometry
        let placeholder = &session.pending_shots()[0];
        assert_eq!((placeholder.width, placeholder.height), (320, 240));
        assert_eq!(&placeholder.data[..4], [0, 0, 0, 255]);

        // The batch keeps advancing
        assert_eq!(session.countdown(), Some(3));
    }

    #[test]
    fn test_composition_failure_keeps_pending_shots() {
        let mut session = session();
        let generation = drive_grid_to_composing(&mut session);

        let commands = session.update(Message::CompositionFinished {
            generation,
            result: Err(CompositionError::Failed("worker died".into())),
        });
        assert!(has_event(&commands, |e| matches!(
            e,
            SessionEvent::CompositionFailed { .. }
        )));

        assert_eq!(session.pending_shots().len(), 4);
        assert!(session.gallery().is_empty());
        assert!(!session.is_cycle_active());

        // The next cycle start discards the stale buffer
        start(&mut session, CaptureMode::Grid);
        assert!(session.pending_shots().is_empty());
    }

    #[test]
    fn test_start_rejected_while_composing() {
        let mut session = session();
        drive_grid_to_composing(&mut session);

        let commands = session.update(Message::StartCycle(CaptureMode::Single));
        assert!(commands.is_empty());
        assert!(session.is_composing());
        assert_eq!(session.mode(), CaptureMode::Grid);
    }

    #[test]
    fn test_cancel_during_composition_discards_late_result() {
        let mut session = session();
        let generation = drive_grid_to_composing(&mut session);

        session.update(Message::CancelCycle);
        assert!(session.pending_shots().is_empty());
        assert!(!session.is_cycle_active());

        let commands = session.update(Message::CompositionFinished {
            generation,
            result: Ok(StillImage::blank(640, 480)),
        });
        assert!(commands.is_empty());
        assert!(session.gallery().is_empty());
    }

    #[test]
    fn test_flash_decay_is_pulse_guarded() {
        let mut session = session();
        let (generation, _) = start(&mut session, CaptureMode::Single);
        let commands = complete_countdown(&mut session, generation);
        let first_pulse = flash_pulse(&commands);
        assert!(session.flash_active());

        // A second shutter before the first decay keeps the flash raised
        let (generation, _) = start(&mut session, CaptureMode::Single);
        let commands = complete_countdown(&mut session, generation);
        let second_pulse = flash_pulse(&commands);
        assert_ne!(first_pulse, second_pulse);

        assert!(
            session
                .update(Message::FlashDecay { pulse: first_pulse })
                .is_empty()
        );
        assert!(session.flash_active());

        let commands = session.update(Message::FlashDecay { pulse: second_pulse });
        assert!(has_event(&commands, |e| matches!(e, SessionEvent::FlashEnded)));
        assert!(!session.flash_active());
    }

    #[test]
    fn test_sourceless_session_allows_attach_retry() {
        let mut session = CaptureSession::new(Config::default());
        let (generation, _) = start(&mut session, CaptureMode::Single);
        complete_countdown(&mut session, generation);
        assert!(session.gallery().is_empty());

        let commands = session.update(Message::AttachSource(Box::new(StubSource::working())));
        assert!(has_event(&commands, |e| matches!(
            e,
            SessionEvent::SourceAttached { .. }
        )));

        let (generation, _) = start(&mut session, CaptureMode::Single);
        complete_countdown(&mut session, generation);
        assert_eq!(session.gallery().len(), 1);
    }

    #[test]
    fn test_shutdown_cancels_active_cycle() {
        let mut session = session();
        let (generation, _) = start(&mut session, CaptureMode::Single);
        tick(&mut session, generation);

        let commands = session.update(Message::Shutdown);
        assert!(commands.iter().any(|c| matches!(c, Command::CancelTick)));
        assert_eq!(session.countdown(), None);
        assert!(!session.is_cycle_active());
    }
}

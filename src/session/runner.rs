// SPDX-License-Identifier: GPL-3.0-only

//! Tokio shell around [`CaptureSession`]
//!
//! [`SessionRunner`] owns the session and its message channel. It executes
//! the commands the session returns: timer sleeps, blocking composition
//! work and event fan-out. Timer completions loop back into the same
//! channel, so ordering stays serial and the session itself never blocks.

use super::CaptureSession;
use super::state::{CaptureMode, Command, Message, SessionEvent};
use crate::compositor;
use crate::constants::timing;
use crate::errors::CompositionError;
use async_stream::stream;
use futures::Stream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Drives a [`CaptureSession`] on the tokio runtime
#[derive(Debug)]
pub struct SessionRunner {
    session: CaptureSession,
    messages: mpsc::UnboundedReceiver<Message>,
    loopback: mpsc::UnboundedSender<Message>,
    events: mpsc::UnboundedSender<SessionEvent>,
    /// At most one countdown tick is armed at a time
    pending_tick: Option<JoinHandle<()>>,
}

/// Cloneable sender for feeding a running session
#[derive(Debug, Clone)]
pub struct SessionHandle {
    tx: mpsc::UnboundedSender<Message>,
}

impl SessionHandle {
    /// Send a raw message; dropped silently once the runner has stopped
    pub fn send(&self, message: Message) {
        let _ = self.tx.send(message);
    }

    /// Start a capture cycle in the given mode
    pub fn start_cycle(&self, mode: CaptureMode) {
        self.send(Message::StartCycle(mode));
    }

    /// Cancel the active cycle
    pub fn cancel_cycle(&self) {
        self.send(Message::CancelCycle);
    }

    /// Stop the runner after the session winds down
    pub fn shutdown(&self) {
        self.send(Message::Shutdown);
    }
}

impl SessionRunner {
    /// Wrap a session, returning the runner, a handle and the event feed
    pub fn new(
        session: CaptureSession,
    ) -> (Self, SessionHandle, mpsc::UnboundedReceiver<SessionEvent>) {
        let (tx, messages) = mpsc::unbounded_channel();
        let (events, event_rx) = mpsc::unbounded_channel();
        let runner = Self {
            session,
            messages,
            loopback: tx.clone(),
            events,
            pending_tick: None,
        };
        (runner, SessionHandle { tx }, event_rx)
    }

    /// Run until shutdown, returning the session for final inspection
    pub async fn run(mut self) -> CaptureSession {
        debug!("Session runner started");
        while let Some(message) = self.messages.recv().await {
            let shutting_down = matches!(message, Message::Shutdown);
            for command in self.session.update(message) {
                self.execute(command);
            }
            if shutting_down {
                break;
            }
        }
        if let Some(tick) = self.pending_tick.take() {
            tick.abort();
        }
        debug!("Session runner stopped");
        self.session
    }

    fn execute(&mut self, command: Command) {
        match command {
            Command::ScheduleTick { generation } => {
                // Rescheduling replaces the armed tick
                if let Some(tick) = self.pending_tick.take() {
                    tick.abort();
                }
                let loopback = self.loopback.clone();
                self.pending_tick = Some(tokio::spawn(async move {
                    tokio::time::sleep(timing::COUNTDOWN_INTERVAL).await;
                    let _ = loopback.send(Message::CountdownTick { generation });
                }));
            }
            Command::CancelTick => {
                if let Some(tick) = self.pending_tick.take() {
                    tick.abort();
                }
            }
            Command::ScheduleFlashDecay { pulse } => {
                let loopback = self.loopback.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(timing::FLASH_DURATION).await;
                    let _ = loopback.send(Message::FlashDecay { pulse });
                });
            }
            Command::Compose {
                generation,
                shots,
                layout,
            } => {
                let loopback = self.loopback.clone();
                tokio::spawn(async move {
                    let result =
                        tokio::task::spawn_blocking(move || compositor::compose_grid(&shots, layout))
                            .await
                            .unwrap_or_else(|e| {
                                Err(CompositionError::Failed(format!("compose task error: {}", e)))
                            });
                    let _ = loopback.send(Message::CompositionFinished { generation, result });
                });
            }
            Command::Notify(event) => {
                let _ = self.events.send(event);
            }
        }
    }
}

/// Adapt the event receiver into a [`Stream`] for `StreamExt` consumers
pub fn event_stream(
    mut events: mpsc::UnboundedReceiver<SessionEvent>,
) -> impl Stream<Item = SessionEvent> {
    stream! {
        while let Some(event) = events.recv().await {
            yield event;
        }
    }
}

// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands for booth operations
//!
//! This module provides command-line functionality for:
//! - Taking a single countdown photo
//! - Capturing a four-shot 2x2 grid photo
//! - Running an interactive booth session on stdin

use futures::{StreamExt, pin_mut};
use photobooth::{
    CaptureMode, CaptureSession, Config, FileFrameSource, FrameSource, GridResolution, Message,
    Photo, PhotoExporter, SessionEvent, SessionRunner, TestPatternSource, event_stream,
};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader};

/// Take a single countdown photo
pub fn take_single(
    source: Option<PathBuf>,
    output: Option<PathBuf>,
    countdown: Option<u32>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load();
    if let Some(value) = countdown {
        config.single_countdown_start = value;
    }
    if let Some(dir) = output {
        config.export_dir = Some(dir);
    }

    capture_one(config, source.as_deref(), CaptureMode::Single)
}

/// Capture a four-shot grid photo
pub fn take_grid(
    source: Option<PathBuf>,
    output: Option<PathBuf>,
    countdown: Option<u32>,
    resolution: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load();
    if let Some(value) = countdown {
        config.grid_countdown_start = value;
    }
    if let Some(dir) = output {
        config.export_dir = Some(dir);
    }
    if let Some(name) = resolution {
        config.grid_resolution = GridResolution::from_name(&name)
            .ok_or_else(|| format!("Unknown grid resolution '{}' (expected sd or hd)", name))?;
    }

    capture_one(config, source.as_deref(), CaptureMode::Grid)
}

/// Run the interactive booth loop
pub fn run_booth(
    source: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load();
    if let Some(dir) = output {
        config.export_dir = Some(dir);
    }

    let exporter = PhotoExporter::from_config(&config);
    let session = CaptureSession::with_source(config, open_source(source.as_deref()));

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let (runner, handle, events) = SessionRunner::new(session);
        let runner = tokio::spawn(runner.run());

        // Ctrl+C cancels the cycle and winds the session down
        let ctrlc_handle = handle.clone();
        ctrlc::set_handler(move || {
            ctrlc_handle.cancel_cycle();
            ctrlc_handle.shutdown();
        })?;

        println!("Photo booth ready.");
        print_help();

        let mut photos: Vec<Photo> = Vec::new();
        let stream = event_stream(events);
        pin_mut!(stream);
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            tokio::select! {
                event = stream.next() => {
                    let Some(event) = event else { break };
                    print_event(&event);
                    if let SessionEvent::PhotoAppended { photo } = event {
                        photos.push(photo);
                    }
                }
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        handle.shutdown();
                        break;
                    };
                    match line.trim() {
                        "s" => handle.start_cycle(CaptureMode::Single),
                        "g" => handle.start_cycle(CaptureMode::Grid),
                        "c" => handle.cancel_cycle(),
                        "a" => {
                            if photos.is_empty() {
                                println!("Nothing to export yet.");
                            } else {
                                let paths = exporter.export_all(&photos).await?;
                                for path in &paths {
                                    println!("Photo saved: {}", path.display());
                                }
                            }
                        }
                        "q" => {
                            handle.shutdown();
                            break;
                        }
                        "h" | "?" => print_help(),
                        "" => {}
                        other => match other.strip_prefix("o ") {
                            Some(path) => match FileFrameSource::open(Path::new(path.trim())) {
                                Ok(new_source) => {
                                    handle.send(Message::AttachSource(Box::new(new_source)));
                                }
                                Err(e) => println!("Could not open source: {}", e),
                            },
                            None => println!("Unknown command '{}' (h for help)", other),
                        },
                    }
                }
            }
        }

        runner.await?;
        Ok(())
    })
}

/// Run one capture cycle to completion and export the result
fn capture_one(
    config: Config,
    source: Option<&Path>,
    mode: CaptureMode,
) -> Result<(), Box<dyn std::error::Error>> {
    let exporter = PhotoExporter::from_config(&config);
    let session = CaptureSession::with_source(config, open_source(source));

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let (runner, handle, events) = SessionRunner::new(session);
        let runner = tokio::spawn(runner.run());

        // Ctrl+C abandons the cycle instead of leaving a timer running
        let ctrlc_handle = handle.clone();
        ctrlc::set_handler(move || {
            ctrlc_handle.cancel_cycle();
            ctrlc_handle.shutdown();
        })?;

        handle.start_cycle(mode);

        let mut captured: Option<Photo> = None;
        let stream = event_stream(events);
        pin_mut!(stream);
        while let Some(event) = stream.next().await {
            print_event(&event);
            match event {
                SessionEvent::PhotoAppended { photo } => captured = Some(photo),
                SessionEvent::CycleCompleted | SessionEvent::CycleCancelled => {
                    handle.shutdown();
                    break;
                }
                _ => {}
            }
        }

        runner.await?;

        match captured {
            Some(photo) => {
                let path = exporter.export(&photo).await?;
                println!("Photo saved: {}", path.display());
            }
            None => println!("No photo captured."),
        }

        Ok(())
    })
}

/// Open the requested frame source, falling back to the test pattern
fn open_source(path: Option<&Path>) -> Box<dyn FrameSource> {
    match path {
        Some(path) => match FileFrameSource::open(path) {
            Ok(source) => Box::new(source),
            Err(e) => {
                eprintln!("Frame source unavailable ({}), using test pattern", e);
                Box::new(TestPatternSource::default())
            }
        },
        None => Box::new(TestPatternSource::default()),
    }
}

/// Render a session event for the terminal
fn print_event(event: &SessionEvent) {
    match event {
        SessionEvent::CountdownStarted { mode, value } => {
            println!("[{}] Get ready... {}", mode, value);
        }
        SessionEvent::CountdownChanged { value } => println!("  {}...", value),
        SessionEvent::ShutterFired => println!("  *click*"),
        SessionEvent::FlashEnded => {}
        SessionEvent::ShotBuffered {
            count, required, ..
        } => println!("  Shot {}/{}", count, required),
        SessionEvent::CompositionStarted => println!("  Composing grid..."),
        SessionEvent::PhotoAppended { photo } => println!(
            "  Photo captured ({}x{})",
            photo.image.width, photo.image.height
        ),
        SessionEvent::CompositionFailed { error } => println!("  Composition failed: {}", error),
        SessionEvent::CycleCancelled => println!("  Cancelled."),
        SessionEvent::CycleCompleted => {}
        SessionEvent::SourceAttached { name } => println!("  Source attached: {}", name),
    }
}

fn print_help() {
    println!(
        "Commands: s=single photo, g=grid photo, c=cancel, a=export all, o <file>=attach source, q=quit"
    );
}

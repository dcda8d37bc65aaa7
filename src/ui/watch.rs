use anyhow::{Context, Result};
use crossbeam_channel::Receiver;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use crate::capture::{Camera, Frame};
use crate::history::ColorHistory;
use crate::renderer::cell::CellData;
use crate::renderer::{DisplayManager, FrameProcessor, PreviewScaler};
use crate::sampler::{sample_region, SampleError, UpdateGate};
use crate::shared::constants;
use crate::utils::{clipboard, logger};

const KEY_HINTS: &str = "[Space] save+copy  [c] camera  [h] history  [q] quit";

pub struct WatchConfig {
    pub device: i32,
    pub region_size: u32,
    pub min_interval: Duration,
    pub distance_threshold: f64,
}

pub enum WatchOutcome {
    Quit,
    OpenHistory,
}

/// A running capture thread plus the channel it feeds.
struct CaptureHandle {
    receiver: Receiver<Frame>,
    running: Arc<AtomicBool>,
    handle: thread::JoinHandle<Result<()>>,
    device: i32,
}

impl CaptureHandle {
    fn start(device: i32) -> Result<Self> {
        let camera = Camera::open(device)?;
        let (sender, receiver) = crossbeam_channel::bounded(constants::FRAME_CHANNEL_CAPACITY);
        let running = Arc::new(AtomicBool::new(true));
        let handle = camera.spawn_capture_thread(sender, running.clone());

        Ok(Self {
            receiver,
            running,
            handle,
            device,
        })
    }

    /// Drain the channel, keeping only the newest frame.
    fn latest_frame(&self) -> Option<Frame> {
        let mut latest = None;
        while let Ok(frame) = self.receiver.try_recv() {
            latest = Some(frame);
        }
        latest
    }

    fn stop(self) {
        self.running.store(false, Ordering::SeqCst);
        drop(self.receiver);
        let _ = self.handle.join();
    }
}

/// Stop the current capture, open the next available device, wrapping the
/// index. Falls back to reopening the current device when it is the only one.
fn switch_camera(capture: CaptureHandle) -> Result<CaptureHandle> {
    let current = capture.device;
    capture.stop();

    for offset in 1..=constants::MAX_CAMERA_DEVICE {
        let candidate = (current + offset) % (constants::MAX_CAMERA_DEVICE + 1);
        if candidate == current {
            continue;
        }
        match CaptureHandle::start(candidate) {
            Ok(next) => {
                logger::info(&format!("Switched to camera {}", candidate));
                return Ok(next);
            }
            Err(e) => {
                logger::debug(&format!("Camera {} unavailable: {}", candidate, e));
            }
        }
    }

    CaptureHandle::start(current).context("no camera available after switching")
}

/// Preview pipeline sized to the current terminal.
struct PreviewGrid {
    scaler: PreviewScaler,
    processor: FrameProcessor,
    cells: Vec<CellData>,
}

impl PreviewGrid {
    fn new(cols: u16, view_rows: u16) -> Self {
        let pixel_w = cols.max(2) as u32;
        let pixel_h = view_rows.max(1) as u32 * 2;

        let processor = FrameProcessor::new(pixel_w as usize, pixel_h as usize);
        let cells = vec![CellData::default(); processor.cell_count()];

        Self {
            scaler: PreviewScaler::new(pixel_w, pixel_h),
            processor,
            cells,
        }
    }
}

fn lock_history(history: &Mutex<ColorHistory>) -> std::sync::MutexGuard<'_, ColorHistory> {
    match history.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Live camera view: preview with crosshair, hex readout, save/copy keys.
///
/// Returns after restoring the terminal, so the history screen can take over.
pub fn run(
    config: &WatchConfig,
    history: &Arc<Mutex<ColorHistory>>,
    quit: &Arc<AtomicBool>,
) -> Result<WatchOutcome> {
    // Open the camera before touching the terminal so open errors print
    // on a normal screen.
    let mut capture = CaptureHandle::start(config.device)
        .with_context(|| format!("failed to open camera device {}", config.device))?;

    let mut display = DisplayManager::new()?;
    let (cols, view_rows) = display.preview_area()?;
    let mut grid = PreviewGrid::new(cols, view_rows);

    let mut gate = UpdateGate::new(config.min_interval, config.distance_threshold);
    let mut notice: Option<(String, Instant)> = None;

    let outcome = loop {
        if quit.load(Ordering::SeqCst) {
            break WatchOutcome::Quit;
        }

        if let Some(frame) = capture.latest_frame() {
            let (cx, cy) = frame.center();
            match sample_region(&frame, cx, cy, config.region_size) {
                Ok(color) => {
                    gate.accept(color);
                }
                Err(SampleError::EmptyWindow) => {
                    // Keep the previous reading on screen
                }
            }

            let canvas = grid.scaler.scale(&frame)?;
            grid.processor.process_frame_into(&canvas, &mut grid.cells);
            grid.processor
                .overlay_crosshair(&mut grid.cells, constants::CROSSHAIR_ARM_CELLS);
            display.render_diff(&grid.cells, grid.processor.width)?;
        }

        if let Some((_, shown_at)) = &notice {
            if shown_at.elapsed() >= Duration::from_millis(constants::NOTICE_DURATION_MS) {
                notice = None;
            }
        }

        let current = gate.current();
        let mut readout = match &current {
            Some(color) => color.hex_string(),
            None => String::from("sampling..."),
        };
        if let Some((text, _)) = &notice {
            readout.push_str("  ");
            readout.push_str(text);
        }
        display.draw_status(&readout, current.map(|c| c.as_tuple()), KEY_HINTS)?;

        if event::poll(Duration::from_millis(15))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => break WatchOutcome::Quit,
                    KeyCode::Char(' ') | KeyCode::Enter => {
                        if let Some(color) = current {
                            let hex = color.hex_string();
                            lock_history(history).save(&hex);

                            match clipboard::copy(&hex) {
                                Ok(()) => {
                                    notice = Some((
                                        format!("{} copied to clipboard", hex),
                                        Instant::now(),
                                    ));
                                }
                                Err(e) => {
                                    logger::error(&format!("Clipboard copy failed: {}", e));
                                    notice = Some((
                                        format!("{} saved (clipboard unavailable)", hex),
                                        Instant::now(),
                                    ));
                                }
                            }
                        }
                    }
                    KeyCode::Char('c') => {
                        capture = switch_camera(capture)?;
                        display.invalidate();
                        notice = Some((format!("camera {}", capture.device), Instant::now()));
                    }
                    KeyCode::Char('h') => break WatchOutcome::OpenHistory,
                    _ => {}
                },
                Event::Resize(_, _) => {
                    let (cols, view_rows) = display.preview_area()?;
                    grid = PreviewGrid::new(cols, view_rows);
                    display.invalidate();
                }
                _ => {}
            }
        }
    };

    capture.stop();
    Ok(outcome)
}

mod capture;
mod history;
mod renderer;
mod sampler;
mod shared;
mod ui;
mod utils;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::capture::Camera;
use crate::history::ColorHistory;
use crate::sampler::sample_region;
use crate::shared::constants;
use crate::ui::watch::WatchConfig;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Watch the camera feed and sample the color under the crosshair
    Watch {
        #[arg(short, long, default_value_t = constants::DEFAULT_CAMERA_DEVICE)]
        device: i32,
        #[arg(short, long, default_value_t = constants::DEFAULT_REGION_SIZE, help = "Edge length in pixels of the averaged sampling window")]
        region_size: u32,
        #[arg(short, long, default_value_t = constants::DEFAULT_MIN_INTERVAL_MS, help = "Minimum milliseconds between readout updates; 0 disables throttling")]
        min_interval_ms: u64,
        #[arg(short = 't', long, default_value_t = constants::DEFAULT_DISTANCE_THRESHOLD, help = "Suppress updates closer than this normalized RGB distance; 0 disables")]
        distance_threshold: f64,
    },
    /// Sample one frame and print the hex color
    Grab {
        #[arg(short, long, default_value_t = constants::DEFAULT_CAMERA_DEVICE)]
        device: i32,
        #[arg(short, long, default_value_t = constants::DEFAULT_REGION_SIZE)]
        region_size: u32,
        /// Also store the color in the history
        #[arg(short, long)]
        save: bool,
        /// Also copy the color to the clipboard
        #[arg(short, long)]
        copy: bool,
    },
    /// Print the saved color history, most recent first
    History {
        #[arg(long)]
        json: bool,
        #[command(subcommand)]
        action: Option<HistoryAction>,
    },
}

#[derive(Subcommand)]
enum HistoryAction {
    /// Delete every saved color
    Clear,
}

fn main() -> Result<()> {
    crate::utils::logger::init();

    // Reset terminal state in case a previous run crashed in raw mode.
    // Errors are ignored because the terminal is usually not in raw mode.
    let _ = crossterm::terminal::disable_raw_mode();
    let _ = crossterm::execute!(std::io::stdout(), crossterm::terminal::LeaveAlternateScreen);

    let cli = Cli::parse();

    match cli.command {
        Commands::Watch {
            device,
            region_size,
            min_interval_ms,
            distance_threshold,
        } => {
            let config = WatchConfig {
                device,
                region_size,
                min_interval: Duration::from_millis(min_interval_ms),
                distance_threshold,
            };
            let history = Arc::new(Mutex::new(ColorHistory::load_default()));
            ui::run_app(config, history)?;
        }
        Commands::Grab {
            device,
            region_size,
            save,
            copy,
        } => {
            run_grab(device, region_size, save, copy)?;
        }
        Commands::History { json, action } => match action {
            Some(HistoryAction::Clear) => {
                let mut history = ColorHistory::load_default();
                history.clear();
                println!("Color history cleared.");
            }
            None => {
                let history = ColorHistory::load_default();
                if json {
                    println!("{}", serde_json::to_string_pretty(history.list())?);
                } else if history.is_empty() {
                    println!("No colors saved yet.");
                } else {
                    for hex in history.list() {
                        println!("{}", hex);
                    }
                }
            }
        },
    }

    Ok(())
}

/// One-shot pipeline: open the camera, take the first usable frame, average
/// the center window and print the hex string.
fn run_grab(device: i32, region_size: u32, save: bool, copy: bool) -> Result<()> {
    let mut camera = Camera::open(device)?;

    // Some backends deliver a few empty frames while the sensor warms up
    let mut frame = None;
    for _ in 0..30 {
        if let Some(f) = camera.read_frame()? {
            frame = Some(f);
            break;
        }
        std::thread::sleep(Duration::from_millis(50));
    }
    let Some(frame) = frame else {
        anyhow::bail!("camera {} produced no frames", device);
    };

    let (cx, cy) = frame.center();
    let color = sample_region(&frame, cx, cy, region_size)?;
    let hex = color.hex_string();

    println!("{}", hex);

    if save {
        let mut history = ColorHistory::load_default();
        history.save(&hex);
    }
    if copy {
        if let Err(e) = crate::utils::clipboard::copy(&hex) {
            crate::utils::logger::error(&format!("Clipboard copy failed: {}", e));
            eprintln!("warning: could not copy to clipboard: {}", e);
        }
    }

    Ok(())
}

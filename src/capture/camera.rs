use anyhow::{anyhow, Result};
use crossbeam_channel::{Sender, TrySendError};
use opencv::{imgproc, prelude::*, videoio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use super::frame::Frame;

/// A live camera device.
///
/// Frames are read through OpenCV's videoio, which picks the native backend
/// (AVFoundation on macOS, Media Foundation on Windows, V4L2/GStreamer on
/// Linux). Output frames are converted to RGB24 before leaving this module.
pub struct Camera {
    capture: videoio::VideoCapture,
    device: i32,
    opened_at: Instant,
}

impl Camera {
    pub fn open(device: i32) -> Result<Self> {
        let capture = videoio::VideoCapture::new(device, videoio::CAP_ANY)?;

        if !capture.is_opened()? {
            return Err(anyhow!("failed to open camera device {}", device));
        }

        let fps = capture.get(videoio::CAP_PROP_FPS)?;
        let width = capture.get(videoio::CAP_PROP_FRAME_WIDTH)? as u32;
        let height = capture.get(videoio::CAP_PROP_FRAME_HEIGHT)? as u32;

        crate::utils::logger::info(&format!(
            "Camera {} opened: {}x{} @ {:.1} fps",
            device, width, height, fps
        ));

        Ok(Self {
            capture,
            device,
            opened_at: Instant::now(),
        })
    }

    /// Read and convert one frame. `None` means the device produced nothing
    /// this round (some backends briefly return empty frames after opening).
    pub fn read_frame(&mut self) -> Result<Option<Frame>> {
        let mut raw = Mat::default();

        if !self.capture.read(&mut raw)? {
            return Ok(None);
        }
        if raw.empty() {
            return Ok(None);
        }

        let mut rgb = Mat::default();
        #[cfg(target_os = "macos")]
        imgproc::cvt_color(
            &raw,
            &mut rgb,
            imgproc::COLOR_BGR2RGB,
            0,
            opencv::core::AlgorithmHint::ALGO_HINT_DEFAULT,
        )?;

        #[cfg(not(target_os = "macos"))]
        imgproc::cvt_color(&raw, &mut rgb, imgproc::COLOR_BGR2RGB, 0)?;

        if !rgb.is_continuous() {
            return Err(anyhow!("camera frame is not continuous"));
        }

        // The device may deliver a size other than the one it reported.
        let width = rgb.cols() as u32;
        let height = rgb.rows() as u32;
        let bytes = rgb.data_bytes()?;

        Ok(Some(Frame::new(
            bytes.to_vec(),
            width,
            height,
            self.opened_at.elapsed(),
        )))
    }

    /// Read frames until `running` clears or the receiver drops.
    ///
    /// Sends with `try_send`: when the consumer lags, the frame in hand is
    /// dropped rather than queued, so the preview always shows recent input.
    pub fn spawn_capture_thread(
        mut self,
        sender: Sender<Frame>,
        running: Arc<AtomicBool>,
    ) -> thread::JoinHandle<Result<()>> {
        thread::spawn(move || {
            crate::utils::logger::debug(&format!(
                "Capture thread started (device {})",
                self.device
            ));
            let mut frames_dropped = 0u64;

            while running.load(Ordering::SeqCst) {
                match self.read_frame() {
                    Ok(Some(frame)) => match sender.try_send(frame) {
                        Ok(()) => {}
                        Err(TrySendError::Full(_)) => {
                            frames_dropped += 1;
                        }
                        Err(TrySendError::Disconnected(_)) => {
                            crate::utils::logger::debug("Capture sender error (receiver dropped)");
                            break;
                        }
                    },
                    Ok(None) => {
                        // Empty read, give the backend a moment
                        thread::sleep(Duration::from_millis(5));
                    }
                    Err(e) => {
                        crate::utils::logger::error(&format!("Capture error: {}", e));
                        break;
                    }
                }
            }

            crate::utils::logger::debug(&format!(
                "Capture thread exiting (device {}, {} frames dropped)",
                self.device, frames_dropped
            ));
            Ok(())
        })
    }
}

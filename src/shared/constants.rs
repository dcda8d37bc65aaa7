pub const APP_NAME: &str = "hexcam";

pub const HISTORY_FILE: &str = "history.json";
pub const HISTORY_KEY: &str = "colorHistory";

pub const ERROR_LOG_FILE: &str = "hexcam-error.log";
pub const DEBUG_LOG_FILE: &str = "hexcam-debug.log";

/// Edge length in source pixels of the square window averaged per sample.
pub const DEFAULT_REGION_SIZE: u32 = 10;
/// Minimum time between accepted samples. Zero disables throttling.
pub const DEFAULT_MIN_INTERVAL_MS: u64 = 1000;
/// Normalized RGB distance below which an update is suppressed.
pub const DEFAULT_DISTANCE_THRESHOLD: f64 = 0.1;

pub const DEFAULT_CAMERA_DEVICE: i32 = 0;
/// Highest device index tried when cycling cameras before wrapping to 0.
pub const MAX_CAMERA_DEVICE: i32 = 7;

/// Frames buffered between the capture thread and the watch loop.
pub const FRAME_CHANNEL_CAPACITY: usize = 8;

/// Character cells the crosshair extends from the center, per arm.
pub const CROSSHAIR_ARM_CELLS: usize = 3;

/// How long save/copy confirmations stay in the status line.
pub const NOTICE_DURATION_MS: u64 = 1500;

//! Shared crate-wide constants.

/// Maximum number of addresses kept in the focus history.
pub const FOCUS_HISTORY_CAPACITY: usize = 50;

/// Delay between gesture start and the overlay becoming visible. A tap that
/// releases the modifier inside this window commits without ever painting.
pub const DEFAULT_SHOW_DELAY_MS: u64 = 100;

/// Sampling interval of the modifier-state poller.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 30;

/// Time the surface gets to finish its fade-out before visibility state is
/// torn down.
pub const DEFAULT_HIDE_FADE_MS: u64 = 150;

/// Fraction of the display width the tile rows may occupy.
pub const DEFAULT_MAX_WIDTH_FRACTION: f64 = 0.8;

/// Display width used when the window manager cannot report a monitor.
pub const DEFAULT_DISPLAY_WIDTH: u32 = 1920;

pub const DEFAULT_TILE_SPACING: u32 = 8;
pub const DEFAULT_TILE_PADDING: u32 = 12;
pub const DEFAULT_ICON_SIZE: u32 = 64;

/// Preview thumbnails hold this height and scale their width to the
/// screenshot's aspect ratio.
pub const PREVIEW_TARGET_HEIGHT: u32 = 180;
pub const PREVIEW_MIN_WIDTH: u32 = 30;
pub const PREVIEW_MAX_WIDTH: u32 = 320;

/// Directory name used under `/dev/shm` (or the temp dir) by the capture
/// daemon for window screenshots.
pub const PREVIEW_DIR_NAME: &str = "hypr-window-captures";

pub const DEFAULT_HYPRCTL_TIMEOUT_MS: u64 = 1000;

pub const DEFAULT_PERFORMANCE_FLAG: &str = "/tmp/hypr-performance-mode";

/// Title truncation heuristics for preview headers, in pixels.
pub const AVG_CHAR_WIDTH: u32 = 6;
pub const ELLIPSIS_WIDTH: u32 = 12;

/// Width reserved inside a preview header for the icon and its padding.
pub const PREVIEW_HEADER_RESERVED: u32 = 52;

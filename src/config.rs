use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use indoc::indoc;
use serde::Deserialize;
use tracing::{debug, info};

use crate::constants::{
    DEFAULT_DISPLAY_WIDTH, DEFAULT_HIDE_FADE_MS, DEFAULT_HYPRCTL_TIMEOUT_MS, DEFAULT_ICON_SIZE,
    DEFAULT_MAX_WIDTH_FRACTION, DEFAULT_PERFORMANCE_FLAG, DEFAULT_POLL_INTERVAL_MS,
    DEFAULT_SHOW_DELAY_MS, DEFAULT_TILE_PADDING, DEFAULT_TILE_SPACING, PREVIEW_MAX_WIDTH,
    PREVIEW_MIN_WIDTH, PREVIEW_TARGET_HEIGHT,
};
use crate::error::Result;
use crate::frame::FrameGeometry;
use crate::preview::{PreviewBounds, default_preview_dir};
use crate::recency::SortMode;
use crate::state::DisplayMode;
use crate::switcher::SwitcherSettings;
use crate::watchdog::Modifier;

pub const DEFAULT_CONFIG_TEMPLATE: &str = indoc! {r#"
    # hypr-switcher configuration
    # Every key is optional; the values below are the defaults.

    # "previews" shows window screenshots, "icons" application icons.
    display_mode = "previews"
    # "recency" orders by last focus, "alphabetical" by class and title.
    sort_mode = "recency"

    # Milliseconds before the overlay appears. A quicker tap never shows it.
    show_delay_ms = 100
    # Milliseconds between samples of the modifier key state.
    poll_interval_ms = 30
    # Milliseconds the overlay gets to fade out.
    hide_fade_ms = 150
    # Releasing this key commits the selection: alt, super, ctrl or shift.
    modifier = "alt"

    max_width_fraction = 0.8
    fallback_display_width = 1920
    tile_spacing = 8
    tile_padding = 12
    icon_size = 64

    # Forces icon mode at startup while this file exists.
    performance_flag = "/tmp/hypr-performance-mode"
    # socket_path = "/run/user/1000/hypr-switcher.sock"

    [preview]
    target_height = 180
    min_width = 30
    max_width = 320
    # dir = "/dev/shm/hypr-window-captures"

    [hyprctl]
    command = "hyprctl"
    timeout_ms = 1000
"#};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PreviewConfig {
    pub target_height: u32,
    pub min_width: u32,
    pub max_width: u32,
    pub dir: Option<PathBuf>,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            target_height: PREVIEW_TARGET_HEIGHT,
            min_width: PREVIEW_MIN_WIDTH,
            max_width: PREVIEW_MAX_WIDTH,
            dir: None,
        }
    }
}

impl PreviewConfig {
    pub fn bounds(&self) -> PreviewBounds {
        PreviewBounds {
            target_height: self.target_height,
            min_width: self.min_width,
            max_width: self.max_width,
        }
    }

    pub fn dir(&self) -> PathBuf {
        self.dir.clone().unwrap_or_else(default_preview_dir)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HyprctlConfig {
    pub command: String,
    pub timeout_ms: u64,
}

impl Default for HyprctlConfig {
    fn default() -> Self {
        Self {
            command: "hyprctl".to_string(),
            timeout_ms: DEFAULT_HYPRCTL_TIMEOUT_MS,
        }
    }
}

impl HyprctlConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub display_mode: DisplayMode,
    pub sort_mode: SortMode,
    pub show_delay_ms: u64,
    pub poll_interval_ms: u64,
    pub hide_fade_ms: u64,
    pub modifier: Modifier,
    pub max_width_fraction: f64,
    pub fallback_display_width: u32,
    pub tile_spacing: u32,
    pub tile_padding: u32,
    pub icon_size: u32,
    pub performance_flag: PathBuf,
    pub socket_path: Option<PathBuf>,
    pub preview: PreviewConfig,
    pub hyprctl: HyprctlConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            display_mode: DisplayMode::default(),
            sort_mode: SortMode::default(),
            show_delay_ms: DEFAULT_SHOW_DELAY_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            hide_fade_ms: DEFAULT_HIDE_FADE_MS,
            modifier: Modifier::default(),
            max_width_fraction: DEFAULT_MAX_WIDTH_FRACTION,
            fallback_display_width: DEFAULT_DISPLAY_WIDTH,
            tile_spacing: DEFAULT_TILE_SPACING,
            tile_padding: DEFAULT_TILE_PADDING,
            icon_size: DEFAULT_ICON_SIZE,
            performance_flag: PathBuf::from(DEFAULT_PERFORMANCE_FLAG),
            socket_path: None,
            preview: PreviewConfig::default(),
            hyprctl: HyprctlConfig::default(),
        }
    }
}

impl Config {
    /// `$XDG_CONFIG_HOME/hypr-switcher/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("hypr-switcher").join("config.toml"))
    }

    pub fn parse(input: &str) -> Result<Self> {
        Ok(toml::from_str(input)?)
    }

    /// Loads `path`, or the default location when `None`. A missing file
    /// means defaults; a malformed one is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path.map(Path::to_path_buf).or_else(Self::default_path) else {
            return Ok(Self::default());
        };
        match fs::read_to_string(&path) {
            Ok(input) => {
                debug!("loading config from {}", path.display());
                Self::parse(&input)
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!("no config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Display mode to start in; the performance flag forces icons.
    pub fn initial_display_mode(&self) -> DisplayMode {
        if self.performance_flag.exists() {
            info!(
                "performance flag {} present, using icon mode",
                self.performance_flag.display()
            );
            DisplayMode::Icons
        } else {
            self.display_mode
        }
    }

    pub fn switcher_settings(&self) -> SwitcherSettings {
        SwitcherSettings {
            show_delay: Duration::from_millis(self.show_delay_ms),
            poll_interval: Duration::from_millis(self.poll_interval_ms.max(1)),
            hide_fade: Duration::from_millis(self.hide_fade_ms),
            geometry: FrameGeometry {
                icon_size: self.icon_size,
                tile_padding: self.tile_padding,
                tile_spacing: self.tile_spacing,
                max_width_fraction: self.max_width_fraction,
            },
            display_mode: self.initial_display_mode(),
            sort_mode: self.sort_mode,
            modifier: self.modifier,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_parses_to_defaults() {
        let parsed = Config::parse(DEFAULT_CONFIG_TEMPLATE).unwrap();
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn partial_config_keeps_other_defaults() {
        let parsed = Config::parse(indoc! {r#"
            display_mode = "icons"
            modifier = "super"

            [preview]
            max_width = 400
        "#})
        .unwrap();
        assert_eq!(parsed.display_mode, DisplayMode::Icons);
        assert_eq!(parsed.modifier, Modifier::Super);
        assert_eq!(parsed.preview.max_width, 400);
        assert_eq!(parsed.preview.min_width, PREVIEW_MIN_WIDTH);
        assert_eq!(parsed.hyprctl, HyprctlConfig::default());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(Config::parse("display_mod = \"icons\"").is_err());
        assert!(Config::parse("display_mode = \"grid\"").is_err());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn performance_flag_forces_icons() {
        let dir = tempfile::tempdir().unwrap();
        let flag = dir.path().join("perf");
        let cfg = Config {
            performance_flag: flag.clone(),
            ..Config::default()
        };
        assert_eq!(cfg.initial_display_mode(), DisplayMode::Previews);
        fs::write(&flag, b"").unwrap();
        assert_eq!(cfg.initial_display_mode(), DisplayMode::Icons);
        assert_eq!(cfg.switcher_settings().display_mode, DisplayMode::Icons);
    }
}

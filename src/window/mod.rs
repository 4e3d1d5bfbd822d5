pub mod collector;
pub mod hyprctl;

pub use collector::Collector;
pub use hyprctl::Hyprctl;

use crate::error::Result;

/// Pixel size reported by the window manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

/// Top-left position reported by the window manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

/// One open window as seen at collection time.
///
/// Records are snapshots: a refresh replaces the whole sequence rather than
/// patching individual entries. Identity is the `address`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowRecord {
    pub address: String,
    pub class: String,
    pub title: String,
    pub workspace: String,
    pub size: Option<Size>,
    pub position: Option<Position>,
}

impl WindowRecord {
    pub fn new(
        address: impl Into<String>,
        class: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            address: address.into(),
            class: class.into(),
            title: title.into(),
            workspace: String::new(),
            size: None,
            position: None,
        }
    }

    /// Deterministic ordering key shared by both sort modes.
    pub fn sort_key(&self) -> (&str, &str, &str) {
        (&self.class, &self.title, &self.address)
    }
}

/// Seam to the external window-manager query tool.
///
/// Implementations return the tool's raw JSON text; parsing and the
/// degrade-to-empty policy live in [`Collector`] so that every backend gets
/// the same treatment of malformed output.
pub trait WmQuery {
    fn clients_json(&mut self) -> Result<String>;
    fn active_window_json(&mut self) -> Result<String>;
    fn monitors_json(&mut self) -> Result<String>;
    /// Fire-and-forget focus request. Errors are reported but callers must
    /// not wait on the window manager acting on it.
    fn focus_window(&mut self, address: &str) -> Result<()>;
}

impl<T: WmQuery + ?Sized> WmQuery for &mut T {
    fn clients_json(&mut self) -> Result<String> {
        (**self).clients_json()
    }

    fn active_window_json(&mut self) -> Result<String> {
        (**self).active_window_json()
    }

    fn monitors_json(&mut self) -> Result<String> {
        (**self).monitors_json()
    }

    fn focus_window(&mut self, address: &str) -> Result<()> {
        (**self).focus_window(address)
    }
}

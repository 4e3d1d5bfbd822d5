use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::recency::SortMode;
use crate::window::WindowRecord;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Active,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Idle => "IDLE",
            Phase::Active => "ACTIVE",
        })
    }
}

/// How tiles are rendered.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    Icons,
    #[default]
    Previews,
}

impl DisplayMode {
    pub fn toggled(self) -> Self {
        match self {
            DisplayMode::Icons => DisplayMode::Previews,
            DisplayMode::Previews => DisplayMode::Icons,
        }
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DisplayMode::Icons => "ICONS",
            DisplayMode::Previews => "PREVIEWS",
        })
    }
}

impl FromStr for DisplayMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "icons" => Ok(DisplayMode::Icons),
            "previews" => Ok(DisplayMode::Previews),
            _ => Err(()),
        }
    }
}

/// Overlay visibility, tracked separately from the phase because showing
/// is delayed and hiding fades out.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    #[default]
    Hidden,
    /// Gesture started, waiting out the show delay.
    Pending,
    Visible,
    FadingOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    fn step(self) -> isize {
        match self {
            Direction::Forward => 1,
            Direction::Backward => -1,
        }
    }
}

/// Where a gesture starts: on the active window, or at the edge the
/// direction would wrap from when the active window is unknown.
pub fn initial_index(
    windows: &[WindowRecord],
    active: Option<&str>,
    direction: Option<Direction>,
) -> usize {
    let found = active.and_then(|address| windows.iter().position(|w| w.address == address));
    match (found, direction) {
        (Some(idx), _) => idx,
        (None, Some(Direction::Backward)) => windows.len().saturating_sub(1),
        (None, _) => 0,
    }
}

/// Selection state for one switcher instance.
///
/// `windows` is the snapshot taken when the gesture started. While it is
/// non-empty `current_index` is a valid index into it, and an empty snapshot
/// always means `Phase::Idle`.
#[derive(Debug, Default, Clone)]
pub struct SwitcherState {
    phase: Phase,
    windows: Vec<WindowRecord>,
    current_index: usize,
    display_mode: DisplayMode,
    sort_mode: SortMode,
    visibility: Visibility,
    render_dirty: bool,
}

impl SwitcherState {
    pub fn new(display_mode: DisplayMode, sort_mode: SortMode) -> Self {
        Self {
            display_mode,
            sort_mode,
            ..Self::default()
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == Phase::Active
    }

    pub fn windows(&self) -> &[WindowRecord] {
        &self.windows
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn selected(&self) -> Option<&WindowRecord> {
        if self.is_active() {
            self.windows.get(self.current_index)
        } else {
            None
        }
    }

    /// Starts (or restarts) a gesture over `windows` at `index`.
    ///
    /// Returns `false` and stays idle when there is nothing to select.
    pub fn begin(&mut self, windows: Vec<WindowRecord>, index: usize) -> bool {
        if windows.is_empty() {
            self.finish();
            return false;
        }
        self.current_index = index.min(windows.len() - 1);
        self.windows = windows;
        self.phase = Phase::Active;
        self.render_dirty = true;
        true
    }

    /// Moves the selection one step, wrapping at both ends.
    pub fn advance(&mut self, direction: Direction) {
        if self.windows.is_empty() {
            return;
        }
        let len = self.windows.len() as isize;
        self.current_index = (self.current_index as isize + direction.step()).rem_euclid(len) as usize;
        self.render_dirty = true;
    }

    /// Selects `index` directly. Out-of-range indices are ignored.
    pub fn select(&mut self, index: usize) -> bool {
        if index >= self.windows.len() {
            return false;
        }
        if self.current_index != index {
            self.current_index = index;
            self.render_dirty = true;
        }
        true
    }

    /// Ends the gesture and hands back the window that was selected.
    pub fn finish(&mut self) -> Option<WindowRecord> {
        let selected = if self.is_active() {
            self.windows.get(self.current_index).cloned()
        } else {
            None
        };
        self.phase = Phase::Idle;
        self.windows.clear();
        self.current_index = 0;
        self.render_dirty = false;
        selected
    }

    pub fn display_mode(&self) -> DisplayMode {
        self.display_mode
    }

    pub fn set_display_mode(&mut self, mode: DisplayMode) {
        if self.display_mode == mode {
            return;
        }
        self.display_mode = mode;
        self.mark_dirty();
    }

    pub fn toggle_display_mode(&mut self) -> DisplayMode {
        let mode = self.display_mode.toggled();
        self.set_display_mode(mode);
        mode
    }

    pub fn sort_mode(&self) -> SortMode {
        self.sort_mode
    }

    pub fn set_sort_mode(&mut self, mode: SortMode) {
        self.sort_mode = mode;
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn set_visibility(&mut self, visibility: Visibility) {
        self.visibility = visibility;
    }

    /// Whether the overlay should be reported as visible to clients.
    pub fn is_visible(&self) -> bool {
        matches!(self.visibility, Visibility::Pending | Visibility::Visible)
    }

    fn mark_dirty(&mut self) {
        self.render_dirty = self.is_active();
    }

    /// Consumes the pending re-render request, if any.
    pub fn take_render_request(&mut self) -> bool {
        std::mem::take(&mut self.render_dirty)
    }
}

//! The Alt-Tab engine: gesture lifecycle on top of [`SwitcherState`].
//!
//! Every entry point takes the current `Instant` so timer behaviour is
//! driven by the caller (the event loop in production, tests otherwise).

use std::time::{Duration, Instant};

use crossterm::event::KeyEvent;
use tracing::{debug, info};

use crate::constants::{
    DEFAULT_HIDE_FADE_MS, DEFAULT_ICON_SIZE, DEFAULT_MAX_WIDTH_FRACTION, DEFAULT_POLL_INTERVAL_MS,
    DEFAULT_SHOW_DELAY_MS, DEFAULT_TILE_PADDING, DEFAULT_TILE_SPACING,
};
use crate::error::{Result, SwitcherError};
use crate::frame::{FrameGeometry, FrameInput, SwitcherFrame, build_frame};
use crate::icons::IconResolver;
use crate::preview::PreviewResolver;
use crate::recency::{FocusHistory, SortMode, sort_windows};
use crate::state::{Direction, DisplayMode, Phase, SwitcherState, Visibility, initial_index};
use crate::surface::OverlaySurface;
use crate::timers::{TimerKind, Timers};
use crate::watchdog::{KeyReleaseWatchdog, Modifier};
use crate::window::{Collector, WindowRecord, WmQuery};

/// Process-lifetime state shared across gestures.
pub struct SwitcherContext {
    pub history: FocusHistory,
    pub icons: IconResolver,
    pub previews: PreviewResolver,
}

impl SwitcherContext {
    pub fn new(icons: IconResolver, previews: PreviewResolver) -> Self {
        Self {
            history: FocusHistory::new(),
            icons,
            previews,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwitcherSettings {
    pub show_delay: Duration,
    pub poll_interval: Duration,
    pub hide_fade: Duration,
    pub geometry: FrameGeometry,
    pub display_mode: DisplayMode,
    pub sort_mode: SortMode,
    pub modifier: Modifier,
}

impl Default for SwitcherSettings {
    fn default() -> Self {
        Self {
            show_delay: Duration::from_millis(DEFAULT_SHOW_DELAY_MS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            hide_fade: Duration::from_millis(DEFAULT_HIDE_FADE_MS),
            geometry: FrameGeometry {
                icon_size: DEFAULT_ICON_SIZE,
                tile_padding: DEFAULT_TILE_PADDING,
                tile_spacing: DEFAULT_TILE_SPACING,
                max_width_fraction: DEFAULT_MAX_WIDTH_FRACTION,
            },
            display_mode: DisplayMode::default(),
            sort_mode: SortMode::default(),
            modifier: Modifier::default(),
        }
    }
}

pub struct Switcher<W, S> {
    collector: Collector<W>,
    surface: S,
    context: SwitcherContext,
    state: SwitcherState,
    timers: Timers,
    watchdog: KeyReleaseWatchdog,
    settings: SwitcherSettings,
    display_width: u32,
}

impl<W: WmQuery, S: OverlaySurface> Switcher<W, S> {
    pub fn new(
        collector: Collector<W>,
        surface: S,
        context: SwitcherContext,
        settings: SwitcherSettings,
    ) -> Self {
        Self {
            collector,
            surface,
            context,
            state: SwitcherState::new(settings.display_mode, settings.sort_mode),
            timers: Timers::new(),
            watchdog: KeyReleaseWatchdog::new(settings.modifier),
            settings,
            display_width: 0,
        }
    }

    pub fn state(&self) -> &SwitcherState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn history(&self) -> &FocusHistory {
        &self.context.history
    }

    pub fn timers(&self) -> &Timers {
        &self.timers
    }

    pub fn watchdog(&self) -> &KeyReleaseWatchdog {
        &self.watchdog
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Earliest pending timer, for sizing the event loop's wait.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    /// Live window list in the current sort order.
    pub fn sorted_windows(&mut self) -> Vec<WindowRecord> {
        let windows = self.collector.collect();
        sort_windows(windows, self.state.sort_mode(), &self.context.history)
    }

    /// Opens the switcher on the active window without advancing.
    pub fn show(&mut self, now: Instant) -> bool {
        let windows = self.sorted_windows();
        if windows.len() <= 1 {
            debug!("show ignored: {} window(s)", windows.len());
            return false;
        }
        let active = self.collector.active_window_address();
        let index = initial_index(&windows, active.as_deref(), None);
        self.enter_active(windows, index, now);
        true
    }

    pub fn next(&mut self, now: Instant) -> bool {
        self.cycle(Direction::Forward, now)
    }

    pub fn prev(&mut self, now: Instant) -> bool {
        self.cycle(Direction::Backward, now)
    }

    fn cycle(&mut self, direction: Direction, now: Instant) -> bool {
        if self.state.is_active() {
            if self.state.windows().len() <= 1 {
                return false;
            }
            // The snapshot taken at gesture start stays frozen.
            self.state.advance(direction);
            if self.state.visibility() == Visibility::Pending {
                self.timers
                    .schedule(TimerKind::ShowDelay, now, self.settings.show_delay);
            }
            self.refresh();
            return true;
        }
        let windows = self.sorted_windows();
        if windows.len() <= 1 {
            debug!("cycle ignored: {} window(s)", windows.len());
            return false;
        }
        let active = self.collector.active_window_address();
        let index = initial_index(&windows, active.as_deref(), Some(direction));
        let len = windows.len() as isize;
        let step = match direction {
            Direction::Forward => 1,
            Direction::Backward => -1,
        };
        let index = (index as isize + step).rem_euclid(len) as usize;
        self.enter_active(windows, index, now);
        true
    }

    fn enter_active(&mut self, windows: Vec<WindowRecord>, index: usize, now: Instant) {
        let restarting = self.state.is_active();
        let count = windows.len();
        if !self.state.begin(windows, index) {
            return;
        }
        info!(
            "{} -> ACTIVE ({count} windows, index {})",
            if restarting { "ACTIVE" } else { "IDLE" },
            self.state.current_index()
        );
        self.display_width = self.collector.display_width();
        self.watchdog.arm();
        self.timers
            .schedule(TimerKind::WatchdogPoll, now, self.settings.poll_interval);
        match self.state.visibility() {
            Visibility::Visible => self.refresh(),
            Visibility::Pending => {
                // A new gesture start supersedes the old delay.
                self.timers
                    .schedule(TimerKind::ShowDelay, now, self.settings.show_delay);
            }
            Visibility::Hidden | Visibility::FadingOut => {
                self.timers.cancel(TimerKind::HideFade);
                self.state.set_visibility(Visibility::Pending);
                self.timers
                    .schedule(TimerKind::ShowDelay, now, self.settings.show_delay);
            }
        }
    }

    /// Focuses the selected window and ends the gesture. No-op when idle.
    pub fn commit(&mut self, now: Instant) -> bool {
        if !self.state.is_active() {
            return false;
        }
        let Some(target) = self.state.finish() else {
            self.leave_active(now);
            return false;
        };
        info!("committing {} ({})", target.address, target.class);
        self.collector.focus(&target.address);
        self.context.history.record_focus(&target.address);
        self.leave_active(now);
        true
    }

    /// Commits tile `index` directly, as a click on it would.
    pub fn commit_index(&mut self, index: usize, now: Instant) -> Result<bool> {
        if !self.state.is_active() {
            return Ok(false);
        }
        if !self.state.select(index) {
            return Err(SwitcherError::InvalidCommand(format!(
                "index {index} out of range (0..{})",
                self.state.windows().len()
            )));
        }
        Ok(self.commit(now))
    }

    /// Ends the gesture without focusing anything. No-op when idle.
    pub fn hide(&mut self, now: Instant) -> bool {
        if !self.state.is_active() {
            return false;
        }
        self.state.finish();
        self.leave_active(now);
        true
    }

    fn leave_active(&mut self, now: Instant) {
        info!("ACTIVE -> IDLE");
        self.watchdog.disarm();
        self.timers.cancel_all();
        match self.state.visibility() {
            Visibility::Visible => {
                self.surface.begin_hide();
                self.state.set_visibility(Visibility::FadingOut);
                self.timers
                    .schedule(TimerKind::HideFade, now, self.settings.hide_fade);
            }
            // Never painted, nothing to fade.
            Visibility::Pending => self.state.set_visibility(Visibility::Hidden),
            Visibility::Hidden | Visibility::FadingOut => {}
        }
    }

    /// Services due timers.
    pub fn tick(&mut self, now: Instant) {
        for kind in self.timers.take_due(now) {
            match kind {
                TimerKind::ShowDelay => self.reveal(),
                TimerKind::WatchdogPoll => self.sample_modifier(now),
                TimerKind::HideFade => {
                    if self.state.visibility() == Visibility::FadingOut {
                        self.surface.teardown();
                        self.state.set_visibility(Visibility::Hidden);
                    }
                }
            }
        }
    }

    fn reveal(&mut self) {
        if !self.state.is_active() || self.state.visibility() != Visibility::Pending {
            return;
        }
        let frame = self.frame();
        self.state.take_render_request();
        self.surface.present(&frame);
        self.state.set_visibility(Visibility::Visible);
    }

    fn sample_modifier(&mut self, now: Instant) {
        if !self.state.is_active() {
            return;
        }
        let held = self.surface.modifier_held();
        if self.watchdog.poll(held) {
            debug!("modifier released (poll)");
            self.commit(now);
        } else {
            self.timers
                .schedule(TimerKind::WatchdogPoll, now, self.settings.poll_interval);
        }
    }

    /// Feeds a key event to the release detector.
    pub fn handle_key(&mut self, key: &KeyEvent, now: Instant) -> bool {
        if self.watchdog.on_key_event(key) {
            debug!("modifier released (event)");
            return self.commit(now);
        }
        false
    }

    pub fn display_mode(&self) -> DisplayMode {
        self.state.display_mode()
    }

    pub fn set_display_mode(&mut self, mode: DisplayMode) {
        self.state.set_display_mode(mode);
        self.refresh();
    }

    pub fn toggle_display_mode(&mut self) -> DisplayMode {
        let mode = self.state.toggle_display_mode();
        self.refresh();
        mode
    }

    pub fn sort_mode(&self) -> SortMode {
        self.state.sort_mode()
    }

    /// Changes the ordering; an open gesture is re-sorted in place and keeps
    /// its selected window.
    pub fn set_sort_mode(&mut self, mode: SortMode) {
        self.state.set_sort_mode(mode);
        if !self.state.is_active() {
            return;
        }
        let selected = self.state.selected().map(|w| w.address.clone());
        let windows = sort_windows(
            self.state.windows().to_vec(),
            mode,
            &self.context.history,
        );
        let index = initial_index(&windows, selected.as_deref(), None);
        self.state.begin(windows, index);
        self.refresh();
    }

    /// Whether the overlay is showing or about to.
    pub fn is_visible(&self) -> bool {
        self.state.is_visible()
    }

    /// Current frame for the open gesture.
    pub fn frame(&mut self) -> SwitcherFrame {
        build_frame(
            FrameInput {
                windows: self.state.windows(),
                selected: self.state.current_index(),
                mode: self.state.display_mode(),
                display_width: self.display_width,
            },
            self.settings.geometry,
            &mut self.context.icons,
            &self.context.previews,
        )
    }

    fn refresh(&mut self) {
        if !self.state.take_render_request() {
            return;
        }
        if self.state.visibility() == Visibility::Visible {
            let frame = self.frame();
            self.surface.update(&frame);
        }
    }
}

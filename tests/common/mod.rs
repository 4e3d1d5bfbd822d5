#![allow(dead_code)]

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;
use std::time::Duration;

use hypr_switcher::error::{Result, SwitcherError};
use hypr_switcher::frame::{FrameGeometry, SwitcherFrame};
use hypr_switcher::icons::{IconRegistry, IconResolver};
use hypr_switcher::preview::{PreviewBounds, PreviewResolver};
use hypr_switcher::recency::SortMode;
use hypr_switcher::state::DisplayMode;
use hypr_switcher::surface::OverlaySurface;
use hypr_switcher::switcher::{Switcher, SwitcherContext, SwitcherSettings};
use hypr_switcher::watchdog::Modifier;
use hypr_switcher::window::{Collector, WmQuery};

pub const SHOW_DELAY: Duration = Duration::from_millis(100);
pub const POLL: Duration = Duration::from_millis(30);
pub const FADE: Duration = Duration::from_millis(150);

#[derive(Default)]
pub struct WmState {
    /// Raw `clients` output; `None` makes the query fail.
    pub clients: Option<String>,
    pub active: Option<String>,
    pub monitors: Option<String>,
    pub focused: Vec<String>,
    pub client_queries: usize,
}

/// Scriptable window manager shared with the test through a handle.
#[derive(Clone, Default)]
pub struct FakeWm(pub Rc<RefCell<WmState>>);

impl FakeWm {
    pub fn with_windows(windows: &[(&str, &str, &str)], active: Option<&str>) -> Self {
        let wm = FakeWm::default();
        wm.set_windows(windows);
        wm.0.borrow_mut().active = active.map(str::to_string);
        wm
    }

    pub fn set_windows(&self, windows: &[(&str, &str, &str)]) {
        self.0.borrow_mut().clients = Some(clients_json(windows));
    }

    pub fn set_raw_clients(&self, raw: Option<&str>) {
        self.0.borrow_mut().clients = raw.map(str::to_string);
    }

    pub fn set_active(&self, address: Option<&str>) {
        self.0.borrow_mut().active = address.map(str::to_string);
    }

    pub fn focused(&self) -> Vec<String> {
        self.0.borrow().focused.clone()
    }

    pub fn client_queries(&self) -> usize {
        self.0.borrow().client_queries
    }
}

pub fn clients_json(windows: &[(&str, &str, &str)]) -> String {
    let entries: Vec<serde_json::Value> = windows
        .iter()
        .map(|(address, class, title)| {
            serde_json::json!({
                "address": address,
                "class": class,
                "title": title,
                "workspace": {"id": 1, "name": "1"},
            })
        })
        .collect();
    serde_json::Value::Array(entries).to_string()
}

fn unreachable_wm() -> SwitcherError {
    SwitcherError::Transport("window manager unreachable".into())
}

impl WmQuery for FakeWm {
    fn clients_json(&mut self) -> Result<String> {
        let mut state = self.0.borrow_mut();
        state.client_queries += 1;
        state.clients.clone().ok_or_else(unreachable_wm)
    }

    fn active_window_json(&mut self) -> Result<String> {
        let address = self.0.borrow().active.clone().unwrap_or_default();
        Ok(serde_json::json!({ "address": address }).to_string())
    }

    fn monitors_json(&mut self) -> Result<String> {
        self.0.borrow().monitors.clone().ok_or_else(unreachable_wm)
    }

    fn focus_window(&mut self, address: &str) -> Result<()> {
        self.0.borrow_mut().focused.push(address.to_string());
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceCall {
    Present(SwitcherFrame),
    Update(SwitcherFrame),
    BeginHide,
    Teardown,
}

#[derive(Default)]
pub struct SurfaceState {
    pub calls: Vec<SurfaceCall>,
    pub modifier: Option<bool>,
}

/// Surface that records every call.
#[derive(Clone, Default)]
pub struct RecordingSurface(pub Rc<RefCell<SurfaceState>>);

impl RecordingSurface {
    pub fn calls(&self) -> Vec<SurfaceCall> {
        self.0.borrow().calls.clone()
    }

    pub fn presents(&self) -> usize {
        self.count(|c| matches!(c, SurfaceCall::Present(_)))
    }

    pub fn count(&self, pred: impl Fn(&SurfaceCall) -> bool) -> usize {
        self.0.borrow().calls.iter().filter(|c| pred(c)).count()
    }

    pub fn last_frame(&self) -> Option<SwitcherFrame> {
        self.0.borrow().calls.iter().rev().find_map(|call| match call {
            SurfaceCall::Present(frame) | SurfaceCall::Update(frame) => Some(frame.clone()),
            _ => None,
        })
    }

    pub fn set_modifier(&self, held: Option<bool>) {
        self.0.borrow_mut().modifier = held;
    }
}

impl OverlaySurface for RecordingSurface {
    fn present(&mut self, frame: &SwitcherFrame) {
        self.0.borrow_mut().calls.push(SurfaceCall::Present(frame.clone()));
    }

    fn update(&mut self, frame: &SwitcherFrame) {
        self.0.borrow_mut().calls.push(SurfaceCall::Update(frame.clone()));
    }

    fn begin_hide(&mut self) {
        self.0.borrow_mut().calls.push(SurfaceCall::BeginHide);
    }

    fn teardown(&mut self) {
        self.0.borrow_mut().calls.push(SurfaceCall::Teardown);
    }

    fn modifier_held(&mut self) -> Option<bool> {
        self.0.borrow().modifier
    }
}

/// Registry that knows no icons at all.
pub struct NoIcons;

impl IconRegistry for NoIcons {
    fn desktop_icon(&self, _desktop_id: &str) -> Option<String> {
        None
    }

    fn theme_icon(&self, _name: &str) -> bool {
        false
    }
}

pub fn settings(display_mode: DisplayMode, sort_mode: SortMode) -> SwitcherSettings {
    SwitcherSettings {
        show_delay: SHOW_DELAY,
        poll_interval: POLL,
        hide_fade: FADE,
        geometry: FrameGeometry {
            icon_size: 64,
            tile_padding: 12,
            tile_spacing: 8,
            max_width_fraction: 0.8,
        },
        display_mode,
        sort_mode,
        modifier: Modifier::Alt,
    }
}

pub type TestSwitcher = Switcher<FakeWm, RecordingSurface>;

pub fn switcher_with(
    wm: &FakeWm,
    surface: &RecordingSurface,
    preview_dir: &Path,
    settings: SwitcherSettings,
) -> TestSwitcher {
    let context = SwitcherContext::new(
        IconResolver::new(Box::new(NoIcons)),
        PreviewResolver::new(preview_dir.to_path_buf(), PreviewBounds::default()),
    );
    Switcher::new(
        Collector::new(wm.clone(), 1920),
        surface.clone(),
        context,
        settings,
    )
}

/// Icon mode, alphabetical order: the simplest deterministic setup.
pub fn switcher(wm: &FakeWm, surface: &RecordingSurface, preview_dir: &Path) -> TestSwitcher {
    switcher_with(
        wm,
        surface,
        preview_dir,
        settings(DisplayMode::Icons, SortMode::Alphabetical),
    )
}

pub const THREE: [(&str, &str, &str); 3] = [
    ("0xa", "alacritty", "term"),
    ("0xb", "brave", "web"),
    ("0xc", "code", "editor"),
];

use serde::Deserialize;
use tracing::{debug, warn};

use super::{Position, Size, WindowRecord, WmQuery};
use crate::error::Result;

#[derive(Debug, Deserialize)]
struct HyprWorkspace {
    id: i64,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct HyprClient {
    address: String,
    #[serde(default)]
    class: Option<String>,
    #[serde(default)]
    title: Option<String>,
    workspace: HyprWorkspace,
    #[serde(default)]
    at: Option<[i32; 2]>,
    #[serde(default)]
    size: Option<[i32; 2]>,
}

#[derive(Debug, Deserialize)]
struct HyprActiveWindow {
    #[serde(default)]
    address: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HyprMonitor {
    #[serde(default)]
    focused: bool,
    width: u32,
    #[serde(default = "default_scale")]
    scale: f64,
}

fn default_scale() -> f64 {
    1.0
}

impl HyprWorkspace {
    fn is_special(&self) -> bool {
        self.id < 0 || self.name.starts_with("special")
    }

    fn label(&self) -> String {
        if self.name.is_empty() {
            self.id.to_string()
        } else {
            self.name.clone()
        }
    }
}

impl From<HyprClient> for WindowRecord {
    fn from(client: HyprClient) -> Self {
        Self {
            workspace: client.workspace.label(),
            address: client.address,
            class: client.class.unwrap_or_default(),
            title: client.title.unwrap_or_default(),
            size: client.size.map(|[width, height]| Size { width, height }),
            position: client.at.map(|[x, y]| Position { x, y }),
        }
    }
}

/// Normalizes window-manager query output into [`WindowRecord`]s.
///
/// The collector never fails: a tool that cannot be reached or prints
/// something unparseable simply yields no windows. It also keeps no state,
/// so whether a gesture reuses a previous result is the caller's call.
pub struct Collector<W> {
    wm: W,
    fallback_width: u32,
}

impl<W: WmQuery> Collector<W> {
    pub fn new(wm: W, fallback_width: u32) -> Self {
        Self { wm, fallback_width }
    }

    /// All windows outside special workspaces, in tool order.
    pub fn collect(&mut self) -> Vec<WindowRecord> {
        match self.try_collect() {
            Ok(windows) => windows,
            Err(err) => {
                warn!("window query failed: {err}");
                Vec::new()
            }
        }
    }

    fn try_collect(&mut self) -> Result<Vec<WindowRecord>> {
        let raw = self.wm.clients_json()?;
        let clients: Vec<HyprClient> = serde_json::from_str(&raw)?;
        Ok(clients
            .into_iter()
            .filter(|client| !client.workspace.is_special())
            .map(WindowRecord::from)
            .collect())
    }

    pub fn active_window_address(&mut self) -> Option<String> {
        let parsed = self
            .wm
            .active_window_json()
            .and_then(|raw| Ok(serde_json::from_str::<HyprActiveWindow>(&raw)?));
        match parsed {
            Ok(active) => active.address.filter(|address| !address.is_empty()),
            Err(err) => {
                debug!("active window query failed: {err}");
                None
            }
        }
    }

    /// Logical width of the focused monitor.
    pub fn display_width(&mut self) -> u32 {
        let parsed = self
            .wm
            .monitors_json()
            .and_then(|raw| Ok(serde_json::from_str::<Vec<HyprMonitor>>(&raw)?));
        let monitors = match parsed {
            Ok(monitors) => monitors,
            Err(err) => {
                debug!("monitor query failed: {err}");
                return self.fallback_width;
            }
        };
        monitors
            .iter()
            .find(|monitor| monitor.focused)
            .or_else(|| monitors.first())
            .map(|monitor| {
                let scale = if monitor.scale > 0.0 { monitor.scale } else { 1.0 };
                (f64::from(monitor.width) / scale).round() as u32
            })
            .filter(|width| *width > 0)
            .unwrap_or(self.fallback_width)
    }

    pub fn focus(&mut self, address: &str) {
        if let Err(err) = self.wm.focus_window(address) {
            warn!("focus request for {address} failed: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SwitcherError;

    #[derive(Default)]
    struct Canned {
        clients: Option<String>,
        active: Option<String>,
        monitors: Option<String>,
    }

    fn canned(value: &Option<String>) -> Result<String> {
        value
            .clone()
            .ok_or_else(|| SwitcherError::Transport("unreachable".into()))
    }

    impl WmQuery for Canned {
        fn clients_json(&mut self) -> Result<String> {
            canned(&self.clients)
        }

        fn active_window_json(&mut self) -> Result<String> {
            canned(&self.active)
        }

        fn monitors_json(&mut self) -> Result<String> {
            canned(&self.monitors)
        }

        fn focus_window(&mut self, _address: &str) -> Result<()> {
            Ok(())
        }
    }

    const CLIENTS: &str = r#"[
        {"address": "0x1", "class": "firefox", "title": "Docs",
         "workspace": {"id": 1, "name": "1"}, "at": [10, 20], "size": [800, 600]},
        {"address": "0x2", "class": "kitty", "title": "shell",
         "workspace": {"id": -98, "name": "special:scratch"}},
        {"address": "0x3", "title": "untitled",
         "workspace": {"id": 4, "name": ""}}
    ]"#;

    #[test]
    fn collect_maps_fields_and_skips_special_workspaces() {
        let mut collector = Collector::new(
            Canned {
                clients: Some(CLIENTS.into()),
                ..Default::default()
            },
            1920,
        );
        let windows = collector.collect();
        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0].address, "0x1");
        assert_eq!(windows[0].workspace, "1");
        assert_eq!(
            windows[0].size,
            Some(Size {
                width: 800,
                height: 600
            })
        );
        assert_eq!(windows[0].position, Some(Position { x: 10, y: 20 }));
        // missing class becomes empty, empty workspace name falls back to id
        assert_eq!(windows[1].class, "");
        assert_eq!(windows[1].workspace, "4");
    }

    #[test]
    fn malformed_or_failed_queries_yield_empty() {
        let mut collector = Collector::new(
            Canned {
                clients: Some("not json".into()),
                ..Default::default()
            },
            1920,
        );
        assert!(collector.collect().is_empty());

        let mut unreachable = Collector::new(Canned::default(), 1920);
        assert!(unreachable.collect().is_empty());
        assert_eq!(unreachable.active_window_address(), None);
    }

    #[test]
    fn active_window_ignores_empty_address() {
        let mut collector = Collector::new(
            Canned {
                active: Some("{}".into()),
                ..Default::default()
            },
            1920,
        );
        assert_eq!(collector.active_window_address(), None);

        let mut collector = Collector::new(
            Canned {
                active: Some(r#"{"address": "0xabc"}"#.into()),
                ..Default::default()
            },
            1920,
        );
        assert_eq!(collector.active_window_address().as_deref(), Some("0xabc"));
    }

    #[test]
    fn display_width_prefers_focused_monitor_and_scale() {
        let mut collector = Collector::new(
            Canned {
                monitors: Some(
                    r#"[{"width": 1920, "focused": false},
                        {"width": 3840, "focused": true, "scale": 2.0}]"#
                        .into(),
                ),
                ..Default::default()
            },
            1280,
        );
        assert_eq!(collector.display_width(), 1920);

        let mut fallback = Collector::new(Canned::default(), 1280);
        assert_eq!(fallback.display_width(), 1280);
    }
}

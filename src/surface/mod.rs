//! Where frames end up. The engine only talks to this trait; painting,
//! fades and modifier sampling are the surface's business.

pub mod terminal;

pub use terminal::TerminalSurface;

use tracing::{debug, info};

use crate::frame::SwitcherFrame;

pub trait OverlaySurface {
    /// Makes the overlay visible with `frame`.
    fn present(&mut self, frame: &SwitcherFrame);
    /// Repaints an already visible overlay.
    fn update(&mut self, frame: &SwitcherFrame);
    /// Starts hiding; the fade may still be running afterwards.
    fn begin_hide(&mut self);
    /// Fade finished, release anything held for the overlay.
    fn teardown(&mut self);
    /// Live state of the gesture modifier, `None` if the surface cannot tell.
    fn modifier_held(&mut self) -> Option<bool> {
        None
    }
}

impl<T: OverlaySurface + ?Sized> OverlaySurface for &mut T {
    fn present(&mut self, frame: &SwitcherFrame) {
        (**self).present(frame)
    }

    fn update(&mut self, frame: &SwitcherFrame) {
        (**self).update(frame)
    }

    fn begin_hide(&mut self) {
        (**self).begin_hide()
    }

    fn teardown(&mut self) {
        (**self).teardown()
    }

    fn modifier_held(&mut self) -> Option<bool> {
        (**self).modifier_held()
    }
}

/// Headless surface for the daemon: frames go to the log.
#[derive(Debug, Default)]
pub struct LogSurface {
    visible: bool,
}

impl LogSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

fn describe(frame: &SwitcherFrame) -> String {
    frame
        .rows
        .iter()
        .map(|row| {
            row.items()
                .map(|tile| {
                    if tile.selected {
                        format!("[{}]", tile.class)
                    } else {
                        tile.class.clone()
                    }
                })
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

impl OverlaySurface for LogSurface {
    fn present(&mut self, frame: &SwitcherFrame) {
        self.visible = true;
        info!(
            "overlay shown ({} mode, {} rows): {}",
            frame.mode,
            frame.rows.len(),
            describe(frame)
        );
    }

    fn update(&mut self, frame: &SwitcherFrame) {
        debug!("overlay updated: {} ({})", describe(frame), frame.selected_title);
    }

    fn begin_hide(&mut self) {
        if self.visible {
            debug!("overlay hiding");
        }
        self.visible = false;
    }

    fn teardown(&mut self) {
        self.visible = false;
    }
}

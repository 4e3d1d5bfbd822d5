//! Alt-Tab window switcher engine for Hyprland.
//!
//! The [`switcher::Switcher`] owns the gesture state machine. It pulls
//! windows through a [`window::WmQuery`] backend, orders them with
//! [`recency`], packs tiles with [`layout`] and hands finished
//! [`frame::SwitcherFrame`]s to an [`surface::OverlaySurface`]. Requests
//! arrive as argv lists over [`ipc`] and are run by [`command`] on the
//! single [`event_loop`] thread.

pub mod command;
pub mod config;
pub mod constants;
pub mod drivers;
pub mod error;
pub mod event_loop;
pub mod frame;
pub mod icons;
pub mod ipc;
pub mod layout;
pub mod preview;
pub mod recency;
pub mod state;
pub mod surface;
pub mod switcher;
pub mod timers;
pub mod tracing_sub;
pub mod watchdog;
pub mod window;

pub use error::{Result, SwitcherError};

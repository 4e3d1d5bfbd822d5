//! Detects the end of a switching gesture: the release of the modifier key
//! that was held while cycling.
//!
//! Two detectors feed the same commit path. Key events observed on the
//! overlay surface fire immediately; a poller sampling the live modifier
//! state covers the cases where the release is delivered elsewhere. Either
//! may fire after the other, the state machine absorbs the duplicate.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, ModifierKeyCode};
use serde::Deserialize;

/// Modifier whose release ends the gesture.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modifier {
    #[default]
    Alt,
    Super,
    Ctrl,
    Shift,
}

impl Modifier {
    pub fn matches_code(self, code: ModifierKeyCode) -> bool {
        use ModifierKeyCode::*;
        matches!(
            (self, code),
            (Modifier::Alt, LeftAlt | RightAlt)
                | (Modifier::Super, LeftSuper | RightSuper | LeftMeta | RightMeta)
                | (Modifier::Ctrl, LeftControl | RightControl)
                | (Modifier::Shift, LeftShift | RightShift)
        )
    }

    pub fn flag(self) -> KeyModifiers {
        match self {
            Modifier::Alt => KeyModifiers::ALT,
            Modifier::Super => KeyModifiers::SUPER | KeyModifiers::META,
            Modifier::Ctrl => KeyModifiers::CONTROL,
            Modifier::Shift => KeyModifiers::SHIFT,
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct KeyReleaseWatchdog {
    modifier: Modifier,
    armed: bool,
}

impl KeyReleaseWatchdog {
    pub fn new(modifier: Modifier) -> Self {
        Self {
            modifier,
            armed: false,
        }
    }

    pub fn modifier(&self) -> Modifier {
        self.modifier
    }

    pub fn arm(&mut self) {
        self.armed = true;
    }

    pub fn disarm(&mut self) {
        self.armed = false;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Event detector. True when `key` is the release of the watched
    /// modifier while a gesture is running.
    pub fn on_key_event(&self, key: &KeyEvent) -> bool {
        if !self.armed || key.kind != KeyEventKind::Release {
            return false;
        }
        match key.code {
            KeyCode::Modifier(code) => self.modifier.matches_code(code),
            _ => false,
        }
    }

    /// Poll detector. `held` is the sampled modifier state; `None` means the
    /// surface cannot tell, which is never treated as a release.
    pub fn poll(&self, held: Option<bool>) -> bool {
        self.armed && held == Some(false)
    }
}

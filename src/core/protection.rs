//! Casual-copy deterrents for showcased media
//!
//! These only make saving or inspecting the media slightly less convenient.
//! Anyone with browser tooling gets around them; nothing here is access
//! control. Both guards detach when dropped.

use crate::core::listeners::{EventHub, Subscription};
use crate::core::media::{MediaElement, MediaEvent};

/// A document-level key press
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPress {
    pub key: String,
    pub ctrl: bool,
    pub shift: bool,
}

impl KeyPress {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ctrl: false,
            shift: false,
        }
    }

    pub fn ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn shift(mut self) -> Self {
        self.shift = true;
        self
    }
}

/// F12, Ctrl+Shift+I and Ctrl+U
pub fn is_inspector_shortcut(press: &KeyPress) -> bool {
    let key = press.key.as_str();
    key == "F12"
        || (press.ctrl && press.shift && key.eq_ignore_ascii_case("i"))
        || (press.ctrl && key.eq_ignore_ascii_case("u"))
}

fn is_save_gesture(event: &MediaEvent) -> bool {
    matches!(event, MediaEvent::ContextMenu | MediaEvent::DragStart)
}

/// Suppresses inspector shortcuts for as long as it lives
pub struct ShortcutDeterrent {
    _keydown: Subscription<KeyPress>,
}

impl ShortcutDeterrent {
    pub fn attach(keydown: &EventHub<KeyPress>) -> Self {
        Self {
            _keydown: keydown.intercept(is_inspector_shortcut),
        }
    }
}

/// Suppresses the context menu and dragging on one media element
pub struct ContentGuard {
    _element: Subscription<MediaEvent>,
}

impl ContentGuard {
    pub fn attach<M: MediaElement>(media: &M) -> Self {
        Self {
            _element: media.intercept(is_save_gesture),
        }
    }
}

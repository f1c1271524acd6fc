//! Page input events
//!
//! The host (a browser binding, a test, or the replay CLI) translates its
//! native input into [`PageEvent`]s and hands them to the engine one at a
//! time. Each event runs to completion before the next is processed.

use serde::{Deserialize, Serialize};

use crate::dom::NodeId;

/// Keyboard key identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Key {
    Escape,
    Enter,
    Tab,
    Char(char),
}

impl Key {
    /// Parse a DOM `KeyboardEvent.key` value
    pub fn from_dom(key: &str) -> Option<Self> {
        match key {
            "Escape" | "Esc" => Some(Key::Escape),
            "Enter" => Some(Key::Enter),
            "Tab" => Some(Key::Tab),
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Some(Key::Char(c)),
                    _ => None,
                }
            }
        }
    }
}

/// An input event delivered to the engine
#[derive(Clone, Debug, PartialEq)]
pub enum PageEvent {
    /// Primary button click on `target` (bubbles to the document)
    Click { target: NodeId },
    /// Key pressed while the document has focus
    KeyDown { key: Key },
    /// Pointer moved over `target`, in viewport coordinates
    PointerMove { target: NodeId, x: f64, y: f64 },
    /// Pointer entered exactly `target` (does not bubble)
    PointerEnter { target: NodeId },
    /// Pointer left exactly `target` (does not bubble)
    PointerLeave { target: NodeId },
    /// Form control lost focus
    Blur { target: NodeId },
    /// Form control value changed
    Input { target: NodeId, value: String },
    /// Form submission requested
    Submit { form: NodeId },
    /// Window scrolled to a new vertical offset
    Scroll { offset: f64 },
    /// Window resized
    Resize { width: f64, height: f64 },
}

impl PageEvent {
    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            PageEvent::Click { .. } => "click",
            PageEvent::KeyDown { .. } => "keydown",
            PageEvent::PointerMove { .. } => "pointermove",
            PageEvent::PointerEnter { .. } => "pointerenter",
            PageEvent::PointerLeave { .. } => "pointerleave",
            PageEvent::Blur { .. } => "blur",
            PageEvent::Input { .. } => "input",
            PageEvent::Submit { .. } => "submit",
            PageEvent::Scroll { .. } => "scroll",
            PageEvent::Resize { .. } => "resize",
        }
    }
}

/// What handlers did with an event
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EventOutcome {
    /// The host should skip the browser's default action
    pub default_prevented: bool,
    /// Document-level handlers were skipped
    pub propagation_stopped: bool,
}

impl EventOutcome {
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }
}

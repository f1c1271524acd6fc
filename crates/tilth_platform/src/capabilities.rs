//! Host feature detection
//!
//! Some enhancements depend on primitives a host may lack. The host reports
//! what it supports once at startup and the engine wires only what it can.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Capabilities {
    /// The host can report element visibility (an intersection observer)
    pub visibility_observer: bool,
    /// Images honour `loading="lazy"` natively
    pub native_lazy_loading: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            visibility_observer: true,
            native_lazy_loading: true,
        }
    }
}

impl Capabilities {
    /// A host with none of the optional primitives
    pub fn minimal() -> Self {
        Self {
            visibility_observer: false,
            native_lazy_loading: false,
        }
    }
}

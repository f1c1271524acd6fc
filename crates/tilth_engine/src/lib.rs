//! Tilth Interaction Engine
//!
//! Progressive enhancement for a static, bilingual page. The markup works on
//! its own; the engine layers behaviour on top of it:
//!
//! - **Viewport Triggers**: one-shot visibility watchers with thresholds and root margins
//! - **Reveal & Counters**: scroll-triggered reveal classes and eased count-up statistics
//! - **Locale**: Bengali/English switching with a persisted preference
//! - **Navigation**: header state, active section links, scroll-to-top, smooth anchors
//! - **Lightbox**: a full-screen image overlay for gallery and blog images
//! - **Forms**: required/email validation with transient notifications
//! - **Decoration**: parallax, lazy images, card hover, progress bars, typing title
//!
//! The engine never reads a clock or sleeps. The host passes the current
//! [`std::time::Instant`] into every call and drives deferred work with
//! [`Engine::tick`].
//!
//! # Example
//!
//! ```rust
//! use std::time::Instant;
//! use tilth_engine::prelude::*;
//!
//! let mut doc = Document::new();
//! let body = doc.body();
//! doc.element(body, "h2")
//!     .attr("data-lang-bn", "আমাদের প্রকল্প")
//!     .attr("data-lang-en", "Our Projects");
//!
//! let storage = MemoryStorage::new().with_item("preferredLanguage", "en");
//! let mut engine = Engine::new(doc, storage, EngineConfig::default(), Capabilities::default()).unwrap();
//! engine.start(Instant::now());
//! assert_eq!(engine.session().locale, Locale::English);
//! ```

pub mod anchors;
pub mod bindings;
pub mod config;
pub mod counter;
pub mod engine;
pub mod error;
pub mod forms;
pub mod hover;
pub mod lazy_images;
pub mod lightbox;
pub mod locale;
pub mod menu;
pub mod navigation;
pub mod notify;
pub mod parallax;
pub mod progress;
pub mod reveal;
pub mod session;
pub mod task;
pub mod typing;
pub mod viewport;


pub use bindings::PageBindings;
pub use config::EngineConfig;
pub use engine::Engine;
pub use error::{EngineError, Result};
pub use notify::NotificationKind;
pub use session::SessionState;
pub use task::{HostCommand, Task};
pub use viewport::{RootMargin, VisibilityWatcher, WatchOptions};

/// Prelude module - import everything a host needs
pub mod prelude {
    pub use crate::config::EngineConfig;
    pub use crate::engine::Engine;
    pub use crate::error::{EngineError, Result};
    pub use crate::session::SessionState;
    pub use crate::task::HostCommand;

    pub use tilth_core::{Document, EventOutcome, Key, Locale, NodeId, PageEvent, Rect};
    pub use tilth_platform::{Capabilities, JsonFileStorage, MemoryStorage, Storage};
}

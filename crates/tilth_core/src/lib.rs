//! Tilth Core
//!
//! Foundational primitives shared by every Tilth crate:
//!
//! - **Document Model**: an arena of element nodes with classes, attributes,
//!   inline styles, text and document-space layout boxes
//! - **Selectors**: a parser and matcher for the CSS selector subset used to
//!   discover page elements
//! - **Page Events**: the input events a host feeds into the interaction engine
//! - **Locale**: the two display languages and their numeral systems
//!
//! # Example
//!
//! ```rust
//! use tilth_core::dom::{Document, Rect};
//!
//! let mut doc = Document::new();
//! let body = doc.body();
//! let section = doc
//!     .element(body, "section")
//!     .with_id("about")
//!     .class("scroll-reveal")
//!     .bounds(Rect::new(0.0, 600.0, 1280.0, 400.0))
//!     .node();
//!
//! let found = doc.select("section[id].scroll-reveal").unwrap();
//! assert_eq!(found, vec![section]);
//! ```

pub mod dom;
pub mod events;
pub mod locale;
pub mod selector;

pub use dom::{css_number, Document, Node, NodeBuilder, NodeId, Rect, Viewport};
pub use events::{EventOutcome, Key, PageEvent};
pub use locale::{Locale, Numerals, BENGALI_DIGITS};
pub use selector::{SelectorError, SelectorList};

//! Image lightbox
//!
//! Clicking a gallery or blog image opens a full-screen overlay:
//!
//! ```text
//! div.lightbox
//! └── div.lightbox-content
//!     ├── button.lightbox-close
//!     └── img
//! ```
//!
//! At most one overlay is current. Escape is handled by the engine's single
//! key handler, which only acts while an overlay is current, so no listener
//! is added or removed per open.

use tilth_core::{Document, NodeId};
use tracing::debug;

use crate::bindings::{closest_bound, PageBindings};
use crate::config::LightboxConfig;
use crate::task::{Ctx, Task};

pub const LIGHTBOX_CLASS: &str = "lightbox";
pub const SHOW_CLASS: &str = "show";
pub const CLOSING_CLASS: &str = "closing";

/// Nodes of the overlay that is currently open
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OpenLightbox {
    pub overlay: NodeId,
    pub close_button: NodeId,
    pub image: NodeId,
}

pub struct LightboxController {
    triggers: Vec<NodeId>,
    current: Option<OpenLightbox>,
    config: LightboxConfig,
}

impl LightboxController {
    pub fn new(bindings: &PageBindings, config: &LightboxConfig) -> Self {
        Self {
            triggers: bindings.lightbox_triggers.clone(),
            current: None,
            config: config.clone(),
        }
    }

    /// Mark trigger images as clickable
    pub fn start(&self, doc: &mut Document) {
        for &image in &self.triggers {
            doc.set_style(image, "cursor", "pointer");
        }
    }

    pub fn current(&self) -> Option<OpenLightbox> {
        self.current
    }

    pub fn is_open(&self) -> bool {
        self.current.is_some()
    }

    /// Build and show an overlay for `src`
    ///
    /// An overlay that is already open starts closing first.
    pub fn open(&mut self, ctx: &mut Ctx<'_>, src: &str, alt: &str) -> OpenLightbox {
        if self.current.is_some() {
            self.close(ctx);
        }

        let doc = &mut *ctx.doc;
        let body = doc.body();
        let overlay = doc.create_element("div");
        doc.add_class(overlay, LIGHTBOX_CLASS);
        let content = doc.element(overlay, "div").class("lightbox-content").node();
        let close_button = doc
            .element(content, "button")
            .class("lightbox-close")
            .attr("aria-label", "Close lightbox")
            .text("\u{00d7}")
            .node();
        let image = doc
            .element(content, "img")
            .attr("src", src)
            .attr("alt", alt)
            .node();
        doc.append_child(body, overlay);

        if self.config.lock_scroll {
            doc.set_style(body, "overflow", "hidden");
        }

        ctx.after(self.config.show_delay(), Task::ShowLightbox(overlay));

        let opened = OpenLightbox {
            overlay,
            close_button,
            image,
        };
        self.current = Some(opened);
        debug!("Opened lightbox for {}", src);
        opened
    }

    /// Start closing the current overlay; does nothing if none is open
    pub fn close(&mut self, ctx: &mut Ctx<'_>) {
        let Some(open) = self.current.take() else {
            return;
        };
        ctx.doc.add_class(open.overlay, CLOSING_CLASS);
        if self.config.close_delay_ms == 0 {
            self.detach(ctx.doc, open.overlay);
        } else {
            ctx.after(self.config.close_delay(), Task::DetachLightbox(open.overlay));
        }
    }

    /// Remove a closed overlay and restore scrolling
    pub fn detach(&mut self, doc: &mut Document, overlay: NodeId) {
        doc.destroy(overlay);
        // A newer overlay may have opened while this one was closing
        if self.config.lock_scroll && self.current.is_none() {
            let body = doc.body();
            doc.remove_style(body, "overflow");
        }
        debug!("Removed lightbox {:?}", overlay);
    }

    /// Fade in an overlay unless it is already closing
    pub fn show(&self, doc: &mut Document, overlay: NodeId) {
        if doc.exists(overlay) && !doc.has_class(overlay, CLOSING_CLASS) {
            doc.add_class(overlay, SHOW_CLASS);
        }
    }

    /// Handle a click; returns `true` if it was consumed
    pub fn on_click(&mut self, ctx: &mut Ctx<'_>, target: NodeId) {
        if let Some(open) = self.current {
            let on_close = ctx.doc.contains(open.close_button, target);
            let on_backdrop = target == open.overlay;
            let on_content = ctx.doc.contains(open.overlay, target);
            if on_close || on_backdrop || (on_content && self.config.close_on_image_click) {
                self.close(ctx);
                return;
            }
            if on_content {
                return;
            }
        }

        if let Some(image) = closest_bound(ctx.doc, target, &self.triggers) {
            let src = ctx.doc.attr(image, "src").unwrap_or_default().to_string();
            let alt = ctx.doc.attr(image, "alt").unwrap_or_default().to_string();
            self.open(ctx, &src, &alt);
        }
    }

    pub fn on_escape(&mut self, ctx: &mut Ctx<'_>) {
        if self.config.close_on_escape {
            self.close(ctx);
        }
    }
}

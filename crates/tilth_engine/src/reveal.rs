//! Scroll reveal
//!
//! Elements start in a hidden state owned by the style layer and switch to
//! their final state the first time they scroll into view. The script only
//! adds a class; the style layer runs the transition.

use tilth_core::{css_number, Document, NodeId};
use tracing::debug;

use crate::bindings::PageBindings;
use crate::config::{RevealConfig, RevealMode};
use crate::error::Result;
use crate::viewport::{RootMargin, VisibilityWatcher, WatchOptions};

pub const VISIBLE_CLASS: &str = "visible";
pub const ANIMATE_IN_CLASS: &str = "animate-in";

pub struct RevealAnimator {
    targets: Vec<NodeId>,
    watcher: VisibilityWatcher,
    config: RevealConfig,
}

impl RevealAnimator {
    pub fn new(bindings: &PageBindings, config: &RevealConfig) -> Result<Self> {
        let options = WatchOptions::new()
            .thresholds(&config.thresholds)
            .root_margin(RootMargin::parse(&config.root_margin)?);
        Ok(Self {
            targets: bindings.reveal.clone(),
            watcher: VisibilityWatcher::new("reveal", options),
            config: config.clone(),
        })
    }

    /// `transition-delay` for the element at `index`
    ///
    /// Delays cycle so long lists do not wait seconds for their tail.
    pub fn stagger_delay(&self, index: usize) -> String {
        let cycle = self.config.stagger_cycle.max(1);
        let ms = (index % cycle) as u64 * self.config.stagger_step_ms;
        format!("{}s", css_number(ms as f64 / 1000.0))
    }

    /// Put every target in its initial state and start watching it
    pub fn start(&mut self, doc: &mut Document) {
        for (index, &node) in self.targets.iter().enumerate() {
            match self.config.mode {
                RevealMode::Class => {
                    let delay = self.stagger_delay(index);
                    doc.set_style(node, "transition-delay", &delay);
                }
                RevealMode::InlineStyle => {
                    doc.set_style(node, "opacity", "0");
                    doc.set_style(node, "transform", "translateY(30px)");
                    doc.set_style(node, "transition", "opacity 0.6s ease, transform 0.6s ease");
                }
            }
            self.watcher.register(node);
        }
        debug!("Reveal watching {} element(s)", self.targets.len());
    }

    /// Reveal every target that came into view; returns how many did
    pub fn update(&mut self, doc: &mut Document) -> usize {
        let revealed = self.watcher.poll(doc);
        for &node in &revealed {
            match self.config.mode {
                RevealMode::Class => {
                    doc.add_class(node, VISIBLE_CLASS);
                    if let Some(delay) = doc.attr(node, "data-delay").map(str::to_string) {
                        doc.set_style(node, "transition-delay", &delay);
                    }
                }
                RevealMode::InlineStyle => doc.add_class(node, ANIMATE_IN_CLASS),
            }
        }
        revealed.len()
    }

    pub fn pending(&self) -> usize {
        self.watcher.pending_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use tilth_core::Rect;

    fn animator(doc: &Document, config: &RevealConfig) -> RevealAnimator {
        let mut engine_config = EngineConfig::enhanced();
        engine_config.reveal = config.clone();
        let bindings = PageBindings::resolve(doc, &engine_config).unwrap();
        RevealAnimator::new(&bindings, config).unwrap()
    }

    #[test]
    fn test_stagger_cycles_every_six() {
        let doc = Document::new();
        let reveal = animator(&doc, &RevealConfig::default());
        assert_eq!(reveal.stagger_delay(0), "0s");
        assert_eq!(reveal.stagger_delay(3), "0.3s");
        assert_eq!(reveal.stagger_delay(5), "0.5s");
        assert_eq!(reveal.stagger_delay(6), "0s");
        assert_eq!(reveal.stagger_delay(13), "0.1s");
    }

    #[test]
    fn test_reveal_once_with_data_delay() {
        let mut doc = Document::new();
        let body = doc.body();
        let near = doc
            .element(body, "div")
            .class("scroll-reveal")
            .attr("data-delay", "0.45s")
            .bounds(Rect::new(0.0, 100.0, 1280.0, 200.0))
            .node();
        let far = doc
            .element(body, "div")
            .class("blog-card")
            .bounds(Rect::new(0.0, 3000.0, 1280.0, 200.0))
            .node();

        let mut reveal = animator(&doc, &RevealConfig::default());
        reveal.start(&mut doc);
        assert_eq!(doc.style(far, "transition-delay"), Some("0.1s"));

        assert_eq!(reveal.update(&mut doc), 1);
        assert!(doc.has_class(near, VISIBLE_CLASS));
        assert_eq!(doc.style(near, "transition-delay"), Some("0.45s"));
        assert!(!doc.has_class(far, VISIBLE_CLASS));

        doc.scroll_to(2600.0);
        assert_eq!(reveal.update(&mut doc), 1);
        assert!(doc.has_class(far, VISIBLE_CLASS));

        doc.scroll_to(0.0);
        doc.scroll_to(2600.0);
        assert_eq!(reveal.update(&mut doc), 0);
        assert_eq!(reveal.pending(), 0);
        assert_eq!(doc.classes(far), &["blog-card".to_string(), "visible".to_string()]);
    }

    #[test]
    fn test_inline_style_mode() {
        let mut doc = Document::new();
        let body = doc.body();
        let card = doc
            .element(body, "div")
            .class("project-card")
            .bounds(Rect::new(0.0, 0.0, 300.0, 300.0))
            .node();

        let config = EngineConfig::classic().reveal;
        let mut reveal = animator(&doc, &config);
        reveal.start(&mut doc);
        assert_eq!(doc.style(card, "opacity"), Some("0"));
        assert_eq!(doc.style(card, "transform"), Some("translateY(30px)"));
        assert_eq!(doc.style(card, "transition-delay"), None);

        reveal.update(&mut doc);
        assert!(doc.has_class(card, ANIMATE_IN_CLASS));
        assert!(!doc.has_class(card, VISIBLE_CLASS));
    }
}

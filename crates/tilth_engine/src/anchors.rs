//! Smooth scrolling for in-page anchors

use tilth_core::{EventOutcome, NodeId, SelectorList};
use tracing::debug;

use crate::bindings::{closest_bound, PageBindings};
use crate::config::AnchorConfig;
use crate::task::Ctx;

pub struct AnchorScroller {
    anchors: Vec<NodeId>,
    config: AnchorConfig,
}

impl AnchorScroller {
    pub fn new(bindings: &PageBindings, config: &AnchorConfig) -> Self {
        Self {
            anchors: bindings.anchors.clone(),
            config: config.clone(),
        }
    }

    /// Resolve an `href` fragment to an element of the page
    ///
    /// A fragment that is not a valid selector is treated as missing.
    fn resolve_target(ctx: &Ctx<'_>, href: &str) -> Option<NodeId> {
        match SelectorList::parse(href) {
            Ok(selector) => ctx.doc.query_selector(&selector),
            Err(e) => {
                debug!("Anchor target '{}' is not a selector: {}", href, e);
                None
            }
        }
    }

    /// Returns `true` if the click hit a bound anchor
    pub fn on_click(&self, ctx: &mut Ctx<'_>, target: NodeId, outcome: &mut EventOutcome) -> bool {
        let Some(anchor) = closest_bound(ctx.doc, target, &self.anchors) else {
            return false;
        };
        let href = ctx.doc.attr(anchor, "href").unwrap_or_default().to_string();

        if href == "#" {
            if self.config.always_prevent_default {
                outcome.prevent_default();
            }
            return true;
        }

        match Self::resolve_target(ctx, &href) {
            Some(section) => {
                outcome.prevent_default();
                let top = ctx.doc.bounds(section).top() - self.config.header_offset;
                debug!("Scrolling to {} at {}", href, top);
                ctx.smooth_scroll_to(top);
            }
            None if self.config.always_prevent_default => outcome.prevent_default(),
            None => {}
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::session::SessionState;
    use crate::task::HostCommand;
    use std::time::Instant;
    use tilth_animation::TimerQueue;
    use tilth_core::{Document, Rect};

    fn click(config: &EngineConfig, href: &str) -> (EventOutcome, Vec<HostCommand>) {
        let mut doc = Document::new();
        let body = doc.body();
        let link = doc.element(body, "a").attr("href", href).node();
        doc.element(body, "section")
            .with_id("projects")
            .bounds(Rect::new(0.0, 1200.0, 1280.0, 600.0));

        let bindings = PageBindings::resolve(&doc, config).unwrap();
        let scroller = AnchorScroller::new(&bindings, &config.anchors);
        let mut session = SessionState::default();
        let mut timers = TimerQueue::new();
        let mut commands = Vec::new();
        let mut outcome = EventOutcome::default();
        {
            let mut ctx = Ctx::new(&mut doc, &mut session, &mut timers, &mut commands, Instant::now());
            assert!(scroller.on_click(&mut ctx, link, &mut outcome));
        }
        (outcome, commands)
    }

    #[test]
    fn test_existing_target_scrolls_below_header() {
        let (outcome, commands) = click(&EngineConfig::enhanced(), "#projects");
        assert!(outcome.default_prevented);
        assert_eq!(
            commands,
            vec![HostCommand::ScrollTo {
                top: 1120.0,
                smooth: true
            }]
        );
    }

    #[test]
    fn test_bare_hash_and_missing_target() {
        let (outcome, commands) = click(&EngineConfig::enhanced(), "#");
        assert!(!outcome.default_prevented);
        assert!(commands.is_empty());

        let (outcome, commands) = click(&EngineConfig::enhanced(), "#missing");
        assert!(!outcome.default_prevented);
        assert!(commands.is_empty());
    }

    #[test]
    fn test_classic_always_prevents() {
        let (outcome, commands) = click(&EngineConfig::classic(), "#missing");
        assert!(outcome.default_prevented);
        assert!(commands.is_empty());

        let (outcome, _) = click(&EngineConfig::classic(), "#");
        assert!(outcome.default_prevented);
    }

    #[test]
    fn test_unparsable_fragment_is_missing() {
        let (outcome, commands) = click(&EngineConfig::enhanced(), "#!/contact");
        assert!(!outcome.default_prevented);
        assert!(commands.is_empty());
    }
}

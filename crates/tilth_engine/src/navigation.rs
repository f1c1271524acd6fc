//! Navigation state
//!
//! Three scroll-driven behaviours, each rate limited on its own:
//!
//! - the header marks itself scrolled and slides away while scrolling down
//! - the nav link for the section under the header is marked active
//! - the scroll-to-top button appears once the page has scrolled far enough

use std::time::Instant;

use tilth_animation::Throttle;
use tilth_core::{Document, NodeId};
use tracing::trace;

use crate::bindings::PageBindings;
use crate::config::{
    HeaderConfig, HeaderStyle, NavigationConfig, ScrollConfig, ScrollTopConfig, SectionRule,
};
use crate::session::SessionState;
use crate::task::Ctx;

pub const ACTIVE_CLASS: &str = "active";
pub const SCROLLED_CLASS: &str = "scrolled";
pub const VISIBLE_CLASS: &str = "visible";

const SHADOW_SCROLLED: &str = "0 4px 20px rgba(0, 0, 0, 0.15)";
const SHADOW_TOP: &str = "0 2px 10px rgba(0, 0, 0, 0.1)";

/// A page section's id and vertical extent
#[derive(Clone, Debug, PartialEq)]
pub struct SectionBox {
    pub id: String,
    pub top: f64,
    pub height: f64,
}

/// The section that counts as current at scroll offset `offset`
///
/// Every section is tested in order and the last one that matches wins, so
/// the result assumes sections are sorted and do not overlap.
pub fn active_section(sections: &[SectionBox], offset: f64, rule: SectionRule) -> Option<&str> {
    sections
        .iter()
        .filter(|section| match rule {
            SectionRule::Window { lookahead } => {
                let position = offset + lookahead;
                position >= section.top && position < section.top + section.height
            }
            SectionRule::Reached { offset: margin } => offset >= section.top - margin,
        })
        .last()
        .map(|section| section.id.as_str())
}

pub struct HeaderController {
    header: NodeId,
    throttle: Throttle,
    config: HeaderConfig,
}

impl HeaderController {
    pub fn new(
        bindings: &PageBindings,
        config: &HeaderConfig,
        scroll: &ScrollConfig,
    ) -> Option<Self> {
        Some(Self {
            header: bindings.header?,
            throttle: Throttle::new(scroll.throttle()),
            config: config.clone(),
        })
    }

    pub fn on_scroll(&mut self, doc: &mut Document, session: &mut SessionState, now: Instant) {
        if !self.throttle.try_acquire(now) {
            return;
        }
        let scroll_top = doc.scroll_y();
        let scrolled = scroll_top > self.config.scrolled_offset;

        match self.config.style {
            HeaderStyle::Class => doc.set_class(self.header, SCROLLED_CLASS, scrolled),
            HeaderStyle::Shadow => {
                let shadow = if scrolled { SHADOW_SCROLLED } else { SHADOW_TOP };
                doc.set_style(self.header, "box-shadow", shadow);
            }
        }

        if self.config.auto_hide {
            let hiding =
                scroll_top > session.last_scroll_top && scroll_top > self.config.hide_offset;
            let transform = if hiding { "translateY(-100%)" } else { "translateY(0)" };
            doc.set_style(self.header, "transform", transform);
        }

        session.last_scroll_top = scroll_top;
    }
}

pub struct ActiveLinkController {
    sections: Vec<NodeId>,
    links: Vec<NodeId>,
    throttle: Throttle,
    rule: SectionRule,
}

impl ActiveLinkController {
    /// Requires at least one section and one link
    pub fn new(
        bindings: &PageBindings,
        config: &NavigationConfig,
        scroll: &ScrollConfig,
    ) -> Option<Self> {
        if bindings.sections.is_empty() || bindings.nav_links.is_empty() {
            return None;
        }
        Some(Self {
            sections: bindings.sections.clone(),
            links: bindings.nav_links.clone(),
            throttle: Throttle::new(scroll.throttle()),
            rule: config.rule,
        })
    }

    fn section_boxes(&self, doc: &Document) -> Vec<SectionBox> {
        self.sections
            .iter()
            .filter(|&&node| doc.is_attached(node))
            .filter_map(|&node| {
                let bounds = doc.bounds(node);
                doc.attr(node, "id").map(|id| SectionBox {
                    id: id.to_string(),
                    top: bounds.top(),
                    height: bounds.height,
                })
            })
            .collect()
    }

    pub fn on_scroll(&mut self, doc: &mut Document, session: &mut SessionState, now: Instant) {
        if !self.throttle.try_acquire(now) {
            return;
        }
        let boxes = self.section_boxes(doc);
        let current = active_section(&boxes, doc.scroll_y(), self.rule).map(str::to_string);

        let wanted = current.as_ref().map(|id| format!("#{}", id));
        for &link in &self.links {
            let is_current = wanted.is_some() && doc.attr(link, "href") == wanted.as_deref();
            doc.set_class(link, ACTIVE_CLASS, is_current);
        }

        if session.active_section != current {
            trace!("Active section: {:?}", current);
            session.active_section = current;
        }
    }
}

pub struct ScrollTopButton {
    button: NodeId,
    throttle: Throttle,
    threshold: f64,
}

impl ScrollTopButton {
    pub fn new(
        bindings: &PageBindings,
        config: &ScrollTopConfig,
        scroll: &ScrollConfig,
    ) -> Option<Self> {
        Some(Self {
            button: bindings.scroll_top?,
            throttle: Throttle::new(scroll.throttle()),
            threshold: config.threshold,
        })
    }

    pub fn on_scroll(&mut self, doc: &mut Document, now: Instant) {
        if self.throttle.try_acquire(now) {
            let visible = doc.scroll_y() > self.threshold;
            doc.set_class(self.button, VISIBLE_CLASS, visible);
        }
    }

    /// Request a smooth scroll to the top when the button is clicked
    pub fn on_click(&self, ctx: &mut Ctx<'_>, target: NodeId) {
        if ctx.doc.contains(self.button, target) {
            ctx.smooth_scroll_to(0.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::task::HostCommand;
    use std::time::Duration;
    use tilth_animation::TimerQueue;
    use tilth_core::Rect;

    fn sections() -> Vec<SectionBox> {
        vec![
            SectionBox {
                id: "a".to_string(),
                top: 0.0,
                height: 500.0,
            },
            SectionBox {
                id: "b".to_string(),
                top: 500.0,
                height: 500.0,
            },
        ]
    }

    #[test]
    fn test_active_section_window() {
        let rule = SectionRule::Window { lookahead: 150.0 };
        assert_eq!(active_section(&sections(), 550.0, rule), Some("b"));
        assert_eq!(active_section(&sections(), 0.0, rule), Some("a"));
        assert_eq!(active_section(&sections(), 349.0, rule), Some("a"));
        assert_eq!(active_section(&sections(), 350.0, rule), Some("b"));
        assert_eq!(active_section(&sections(), 900.0, rule), None);
    }

    #[test]
    fn test_active_section_reached() {
        let rule = SectionRule::Reached { offset: 100.0 };
        assert_eq!(active_section(&sections(), 0.0, rule), Some("a"));
        assert_eq!(active_section(&sections(), 400.0, rule), Some("b"));
        // Past the last section it stays current
        assert_eq!(active_section(&sections(), 5000.0, rule), Some("b"));
    }

    #[test]
    fn test_last_match_wins_on_overlap() {
        let mut overlapping = sections();
        overlapping[1].top = 100.0;
        let rule = SectionRule::Window { lookahead: 150.0 };
        assert_eq!(active_section(&overlapping, 100.0, rule), Some("b"));
    }

    struct NavPage {
        doc: Document,
        header: NodeId,
        link_a: NodeId,
        link_b: NodeId,
        top_button: NodeId,
    }

    fn nav_page() -> NavPage {
        let mut doc = Document::new();
        let body = doc.body();
        let header = doc.element(body, "header").with_id("main-header").node();
        let menu = doc.element(header, "ul").class("nav-menu").node();
        let link_a = doc.element(menu, "a").attr("href", "#a").node();
        let link_b = doc.element(menu, "a").attr("href", "#b").node();
        doc.element(body, "section")
            .with_id("a")
            .bounds(Rect::new(0.0, 0.0, 1280.0, 500.0));
        doc.element(body, "section")
            .with_id("b")
            .bounds(Rect::new(0.0, 500.0, 1280.0, 500.0));
        let top_button = doc.element(body, "button").class("scroll-top").node();
        NavPage {
            doc,
            header,
            link_a,
            link_b,
            top_button,
        }
    }

    #[test]
    fn test_links_follow_scroll() {
        let mut page = nav_page();
        let config = EngineConfig::enhanced();
        let bindings = PageBindings::resolve(&page.doc, &config).unwrap();
        let mut nav = ActiveLinkController::new(&bindings, &config.navigation, &config.scroll).unwrap();
        let mut session = SessionState::default();
        let start = Instant::now();

        page.doc.scroll_to(550.0);
        nav.on_scroll(&mut page.doc, &mut session, start);
        assert!(page.doc.has_class(page.link_b, ACTIVE_CLASS));
        assert!(!page.doc.has_class(page.link_a, ACTIVE_CLASS));
        assert_eq!(session.active_section.as_deref(), Some("b"));

        // Inside the throttle window nothing changes
        page.doc.scroll_to(0.0);
        nav.on_scroll(&mut page.doc, &mut session, start + Duration::from_millis(50));
        assert!(page.doc.has_class(page.link_b, ACTIVE_CLASS));

        nav.on_scroll(&mut page.doc, &mut session, start + Duration::from_millis(100));
        assert!(page.doc.has_class(page.link_a, ACTIVE_CLASS));
        assert!(!page.doc.has_class(page.link_b, ACTIVE_CLASS));

        // Below every section no link is active
        page.doc.scroll_to(2000.0);
        nav.on_scroll(&mut page.doc, &mut session, start + Duration::from_millis(200));
        assert!(!page.doc.has_class(page.link_a, ACTIVE_CLASS));
        assert!(!page.doc.has_class(page.link_b, ACTIVE_CLASS));
        assert_eq!(session.active_section, None);
    }

    #[test]
    fn test_header_hides_on_scroll_down() {
        let mut page = nav_page();
        let config = EngineConfig::enhanced();
        let bindings = PageBindings::resolve(&page.doc, &config).unwrap();
        let mut header = HeaderController::new(&bindings, &config.header, &config.scroll).unwrap();
        let mut session = SessionState::default();
        let start = Instant::now();
        let at = |ms| start + Duration::from_millis(ms);

        page.doc.scroll_to(60.0);
        header.on_scroll(&mut page.doc, &mut session, at(0));
        assert!(page.doc.has_class(page.header, SCROLLED_CLASS));
        assert_eq!(page.doc.style(page.header, "transform"), Some("translateY(0)"));

        page.doc.scroll_to(400.0);
        header.on_scroll(&mut page.doc, &mut session, at(100));
        assert_eq!(page.doc.style(page.header, "transform"), Some("translateY(-100%)"));

        page.doc.scroll_to(300.0);
        header.on_scroll(&mut page.doc, &mut session, at(200));
        assert_eq!(page.doc.style(page.header, "transform"), Some("translateY(0)"));
        assert_eq!(session.last_scroll_top, 300.0);

        page.doc.scroll_to(10.0);
        header.on_scroll(&mut page.doc, &mut session, at(300));
        assert!(!page.doc.has_class(page.header, SCROLLED_CLASS));
    }

    #[test]
    fn test_classic_header_uses_shadow() {
        let mut page = nav_page();
        let config = EngineConfig::classic();
        let bindings = PageBindings::resolve(&page.doc, &config).unwrap();
        let mut header = HeaderController::new(&bindings, &config.header, &config.scroll).unwrap();
        let mut session = SessionState::default();
        let now = Instant::now();

        page.doc.scroll_to(400.0);
        header.on_scroll(&mut page.doc, &mut session, now);
        assert_eq!(page.doc.style(page.header, "box-shadow"), Some(SHADOW_SCROLLED));
        assert_eq!(page.doc.style(page.header, "transform"), None);

        // Unthrottled: the next event applies at the same instant
        page.doc.scroll_to(0.0);
        header.on_scroll(&mut page.doc, &mut session, now);
        assert_eq!(page.doc.style(page.header, "box-shadow"), Some(SHADOW_TOP));
        assert!(!page.doc.has_class(page.header, SCROLLED_CLASS));
    }

    #[test]
    fn test_scroll_top_button() {
        let mut page = nav_page();
        let config = EngineConfig::enhanced();
        let bindings = PageBindings::resolve(&page.doc, &config).unwrap();
        let mut button = ScrollTopButton::new(&bindings, &config.scroll_top, &config.scroll).unwrap();
        let start = Instant::now();

        page.doc.scroll_to(300.0);
        button.on_scroll(&mut page.doc, start);
        assert!(!page.doc.has_class(page.top_button, VISIBLE_CLASS));

        page.doc.scroll_to(301.0);
        button.on_scroll(&mut page.doc, start + Duration::from_millis(100));
        assert!(page.doc.has_class(page.top_button, VISIBLE_CLASS));
    }

    #[test]
    fn test_scroll_top_click_requests_scroll() {
        let mut page = nav_page();
        let config = EngineConfig::enhanced();
        let bindings = PageBindings::resolve(&page.doc, &config).unwrap();
        let button = ScrollTopButton::new(&bindings, &config.scroll_top, &config.scroll).unwrap();
        let mut session = SessionState::default();
        let mut timers = TimerQueue::new();
        let mut commands = Vec::new();
        let mut ctx = Ctx::new(
            &mut page.doc,
            &mut session,
            &mut timers,
            &mut commands,
            Instant::now(),
        );

        button.on_click(&mut ctx, page.header);
        button.on_click(&mut ctx, page.top_button);
        assert_eq!(
            commands,
            vec![HostCommand::ScrollTo {
                top: 0.0,
                smooth: true
            }]
        );
    }
}

//! Mobile navigation menu

use tilth_core::{Document, NodeId};
use tracing::debug;

use crate::bindings::{MenuBinding, PageBindings};
use crate::config::MenuConfig;

pub const OPEN_CLASS: &str = "active";

/// Inline styles of the three hamburger bars while the menu is open
const BARS_OPEN: [(&str, &str); 3] = [
    ("transform", "rotate(45deg) translate(5px, 5px)"),
    ("opacity", "0"),
    ("transform", "rotate(-45deg) translate(7px, -6px)"),
];

const BARS_CLOSED: [(&str, &str); 3] = [
    ("transform", "none"),
    ("opacity", "1"),
    ("transform", "none"),
];

pub struct MobileMenu {
    binding: MenuBinding,
    config: MenuConfig,
}

impl MobileMenu {
    pub fn new(bindings: &PageBindings, config: &MenuConfig) -> Option<Self> {
        Some(Self {
            binding: bindings.menu.clone()?,
            config: config.clone(),
        })
    }

    pub fn is_open(&self, doc: &Document) -> bool {
        doc.has_class(self.binding.menu, OPEN_CLASS)
    }

    fn set_open(&self, doc: &mut Document, open: bool) {
        doc.set_class(self.binding.menu, OPEN_CLASS, open);
        if self.config.mark_toggle {
            doc.set_class(self.binding.toggle, OPEN_CLASS, open);
        }
        if !self.config.body_class.is_empty() {
            let body = doc.body();
            doc.set_class(body, &self.config.body_class, open);
        }
        if self.config.animate_bars {
            let styles = if open { &BARS_OPEN } else { &BARS_CLOSED };
            for (&bar, &(property, value)) in self.binding.bars.iter().zip(styles.iter()) {
                doc.set_style(bar, property, value);
            }
        }
    }

    pub fn close(&self, doc: &mut Document) {
        if self.is_open(doc) {
            self.set_open(doc, false);
            debug!("Closed mobile menu");
        }
    }

    /// Toggle on the button, close on a menu link; returns `true` if handled
    pub fn on_click(&self, doc: &mut Document, target: NodeId) -> bool {
        if doc.contains(self.binding.toggle, target) {
            let open = !self.is_open(doc);
            self.set_open(doc, open);
            debug!("Mobile menu {}", if open { "opened" } else { "closed" });
            return true;
        }
        if self
            .binding
            .links
            .iter()
            .any(|&link| doc.contains(link, target))
        {
            self.close(doc);
            return true;
        }
        false
    }

    /// Document-level click: close when the click landed outside the menu
    pub fn on_document_click(&self, doc: &mut Document, target: NodeId) {
        let inside =
            doc.contains(self.binding.toggle, target) || doc.contains(self.binding.menu, target);
        if !inside {
            self.close(doc);
        }
    }

    pub fn on_escape(&self, doc: &mut Document) {
        if self.config.close_on_escape {
            self.close(doc);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;

    struct MenuPage {
        doc: Document,
        toggle: NodeId,
        menu: NodeId,
        link: NodeId,
        bars: Vec<NodeId>,
        outside: NodeId,
    }

    fn menu_page() -> MenuPage {
        let mut doc = Document::new();
        let body = doc.body();
        let toggle = doc.element(body, "button").class("mobile-menu-toggle").node();
        let bars = (0..3).map(|_| doc.element(toggle, "span").node()).collect();
        let menu = doc.element(body, "ul").class("nav-menu").node();
        let item = doc.element(menu, "li").node();
        let link = doc.element(item, "a").attr("href", "#about").text("About").node();
        let outside = doc.element(body, "main").node();
        MenuPage {
            doc,
            toggle,
            menu,
            link,
            bars,
            outside,
        }
    }

    fn menu(doc: &Document, config: &EngineConfig) -> MobileMenu {
        let bindings = PageBindings::resolve(doc, config).unwrap();
        MobileMenu::new(&bindings, &config.menu).unwrap()
    }

    #[test]
    fn test_toggle_marks_menu_toggle_and_body() {
        let mut page = menu_page();
        let menu = menu(&page.doc, &EngineConfig::enhanced());
        let body = page.doc.body();

        assert!(menu.on_click(&mut page.doc, page.bars[1]));
        assert!(page.doc.has_class(page.menu, OPEN_CLASS));
        assert!(page.doc.has_class(page.toggle, OPEN_CLASS));
        assert!(page.doc.has_class(body, "menu-open"));

        assert!(menu.on_click(&mut page.doc, page.toggle));
        assert!(!page.doc.has_class(page.menu, OPEN_CLASS));
        assert!(!page.doc.has_class(body, "menu-open"));
    }

    #[test]
    fn test_link_outside_and_escape_close() {
        let mut page = menu_page();
        let menu = menu(&page.doc, &EngineConfig::enhanced());

        menu.on_click(&mut page.doc, page.toggle);
        assert!(menu.on_click(&mut page.doc, page.link));
        assert!(!menu.is_open(&page.doc));

        menu.on_click(&mut page.doc, page.toggle);
        menu.on_document_click(&mut page.doc, page.link);
        assert!(menu.is_open(&page.doc));
        menu.on_document_click(&mut page.doc, page.outside);
        assert!(!menu.is_open(&page.doc));

        menu.on_click(&mut page.doc, page.toggle);
        menu.on_escape(&mut page.doc);
        assert!(!menu.is_open(&page.doc));
    }

    #[test]
    fn test_classic_animates_bars() {
        let mut page = menu_page();
        let menu = menu(&page.doc, &EngineConfig::classic());

        menu.on_click(&mut page.doc, page.toggle);
        assert!(!page.doc.has_class(page.toggle, OPEN_CLASS));
        assert_eq!(
            page.doc.style(page.bars[0], "transform"),
            Some("rotate(45deg) translate(5px, 5px)")
        );
        assert_eq!(page.doc.style(page.bars[1], "opacity"), Some("0"));

        // Escape is not wired in the classic preset
        menu.on_escape(&mut page.doc);
        assert!(menu.is_open(&page.doc));

        menu.on_click(&mut page.doc, page.toggle);
        assert_eq!(page.doc.style(page.bars[2], "transform"), Some("none"));
        assert_eq!(page.doc.style(page.bars[1], "opacity"), Some("1"));
    }
}

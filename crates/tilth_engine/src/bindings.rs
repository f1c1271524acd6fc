//! Page bindings
//!
//! Every element the engine works with is looked up once, when the engine is
//! built, and handed to the components that need it. Elements created later
//! (notifications, lightbox overlays) are never bound. A binding that finds
//! nothing leaves its feature inert.

use tilth_core::{Document, NodeId, SelectorList};
use tracing::debug;

use crate::config::{EngineConfig, LazyImageMode};
use crate::error::{EngineError, Result};

/// The mobile menu and its toggle
#[derive(Clone, Debug, PartialEq)]
pub struct MenuBinding {
    pub toggle: NodeId,
    pub menu: NodeId,
    /// Links inside the menu
    pub links: Vec<NodeId>,
    /// `span` bars inside the toggle, in order
    pub bars: Vec<NodeId>,
}

/// Elements of the language picker and every translatable element
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LocaleBinding {
    pub toggle: Option<NodeId>,
    pub dropdown: Option<NodeId>,
    pub options: Vec<NodeId>,
    pub current_label: Option<NodeId>,
    pub bound: Vec<NodeId>,
}

/// A form and the controls it validates
#[derive(Clone, Debug, PartialEq)]
pub struct FormBinding {
    pub form: NodeId,
    pub controls: Vec<NodeId>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PageBindings {
    pub menu: Option<MenuBinding>,
    pub locale: LocaleBinding,
    pub scroll_top: Option<NodeId>,
    pub header: Option<NodeId>,
    pub anchors: Vec<NodeId>,
    pub reveal: Vec<NodeId>,
    pub hero: Option<NodeId>,
    pub hero_background: Option<NodeId>,
    pub counters: Vec<NodeId>,
    pub sections: Vec<NodeId>,
    pub nav_links: Vec<NodeId>,
    pub lazy_images: Vec<NodeId>,
    pub cards: Vec<NodeId>,
    pub pie_slices: Vec<NodeId>,
    pub profit_cards: Vec<NodeId>,
    pub lightbox_triggers: Vec<NodeId>,
    pub forms: Vec<FormBinding>,
    pub progress_bars: Vec<NodeId>,
    pub floating: Vec<NodeId>,
    pub typing: Option<NodeId>,
}

fn compile(component: &'static str, selector: &str) -> Result<SelectorList> {
    SelectorList::parse(selector).map_err(|source| EngineError::Selector { component, source })
}

impl PageBindings {
    /// Look up every configured selector in `doc`
    ///
    /// Fails only if a selector does not parse.
    pub fn resolve(doc: &Document, config: &EngineConfig) -> Result<Self> {
        let all = |component, selector: &str| -> Result<Vec<NodeId>> {
            Ok(doc.query_selector_all(&compile(component, selector)?))
        };
        let first = |component, selector: &str| -> Result<Option<NodeId>> {
            Ok(doc.query_selector(&compile(component, selector)?))
        };

        let menu = match (
            first("menu", &config.menu.toggle)?,
            first("menu", &config.menu.menu)?,
        ) {
            (Some(toggle), Some(menu)) => {
                let anchor = compile("menu", "a")?;
                let span = compile("menu", "span")?;
                Some(MenuBinding {
                    toggle,
                    menu,
                    links: doc.query_selector_all_within(menu, &anchor),
                    bars: doc.query_selector_all_within(toggle, &span),
                })
            }
            _ => None,
        };

        let locale = LocaleBinding {
            toggle: first("locale", &config.locale.toggle)?,
            dropdown: first("locale", &config.locale.dropdown)?,
            options: all("locale", &config.locale.options)?,
            current_label: first("locale", &config.locale.current_label)?,
            bound: all("locale", &config.locale.bound)?,
        };

        let controls = compile("forms", &config.forms.controls)?;
        let forms = all("forms", &config.forms.forms)?
            .into_iter()
            .map(|form| FormBinding {
                form,
                controls: doc.query_selector_all_within(form, &controls),
            })
            .collect();

        let lazy_selector = match config.lazy_images.mode {
            LazyImageMode::Observe => &config.lazy_images.selector,
            LazyImageMode::Native => &config.lazy_images.native_selector,
        };

        let bindings = Self {
            menu,
            locale,
            scroll_top: first("scroll_top", &config.scroll_top.selector)?,
            header: first("header", &config.header.selector)?,
            anchors: all("anchors", &config.anchors.selector)?,
            reveal: all("reveal", &config.reveal.selector)?,
            hero: first("parallax", &config.parallax.hero)?,
            hero_background: first("parallax", &config.parallax.background)?,
            counters: all("counter", &config.counter.selector)?,
            sections: all("navigation", &config.navigation.sections)?,
            nav_links: all("navigation", &config.navigation.links)?,
            lazy_images: all("lazy_images", lazy_selector)?,
            cards: all("hover", &config.hover.cards)?,
            pie_slices: all("hover", &config.hover.pie_slices)?,
            profit_cards: all("hover", &config.hover.profit_cards)?,
            lightbox_triggers: all("lightbox", &config.lightbox.triggers)?,
            forms,
            progress_bars: all("progress", &config.progress.selector)?,
            floating: all("floating", &config.floating.selector)?,
            typing: first("typing", &config.typing.selector)?,
        };

        debug!(
            "Resolved page bindings: {} reveal, {} counters, {} sections, {} translatable, {} forms",
            bindings.reveal.len(),
            bindings.counters.len(),
            bindings.sections.len(),
            bindings.locale.bound.len(),
            bindings.forms.len()
        );

        Ok(bindings)
    }
}

/// The closest element in `candidates` that is `node` or one of its ancestors
///
/// This is how a bubbling event finds the bound element it belongs to.
pub fn closest_bound(doc: &Document, node: NodeId, candidates: &[NodeId]) -> Option<NodeId> {
    doc.ancestors(node).find(|a| candidates.contains(a))
}

/// First attached element carrying `class`
pub fn first_with_class(doc: &Document, class: &str) -> Option<NodeId> {
    doc.descendants(doc.root())
        .into_iter()
        .find(|&n| doc.has_class(n, class))
}

//! Pointer hover effects
//!
//! Cards either tilt toward the pointer or lift on enter. The profit-share
//! pie chart and the profit cards below it highlight each other: hovering
//! `pie-slice-<role>` lights up `profit-card-<role>` and the other way round.

use tilth_core::{css_number, Document, NodeId};

use crate::bindings::{closest_bound, first_with_class, PageBindings};
use crate::config::{CardEffect, HoverConfig};

pub const SLICE_HOVER_CLASS: &str = "slice-hover";
pub const CARD_HIGHLIGHT_CLASS: &str = "card-highlight";

/// Roles shared by pie slices and profit cards
pub const ROLES: [&str; 3] = ["investor", "manager", "caretaker"];

const TILT_REST: &str = "perspective(1000px) rotateX(0) rotateY(0) translateY(0)";
const LIFT_ON: &str = "translateY(-10px) scale(1.02)";
const LIFT_OFF: &str = "translateY(0) scale(1)";

/// The role named by a `<prefix><role>` class
///
/// Modifier classes such as `pie-slice-extended` share the prefix and are
/// skipped because they name no role.
fn role_of<'d>(doc: &'d Document, node: NodeId, prefix: &str) -> Option<&'d str> {
    doc.classes(node)
        .iter()
        .filter_map(|class| class.strip_prefix(prefix))
        .find(|role| ROLES.contains(role))
}

/// `perspective(..) rotateX(..) rotateY(..)` for a pointer at `(x, y)` inside a `width` x `height` card
pub fn tilt_transform(x: f64, y: f64, width: f64, height: f64, divisor: f64) -> String {
    let rotate_x = (y - height / 2.0) / divisor;
    let rotate_y = (width / 2.0 - x) / divisor;
    format!(
        "perspective(1000px) rotateX({}deg) rotateY({}deg) translateY(-10px)",
        css_number(rotate_x),
        css_number(rotate_y)
    )
}

pub struct CardHover {
    cards: Vec<NodeId>,
    config: HoverConfig,
}

impl CardHover {
    pub fn new(bindings: &PageBindings, config: &HoverConfig) -> Self {
        Self {
            cards: bindings.cards.clone(),
            config: config.clone(),
        }
    }

    pub fn on_pointer_move(&self, doc: &mut Document, target: NodeId, x: f64, y: f64) {
        if self.config.effect != CardEffect::Tilt {
            return;
        }
        let Some(card) = closest_bound(doc, target, &self.cards) else {
            return;
        };
        let rect = doc.bounding_client_rect(card);
        let transform = tilt_transform(
            x - rect.left(),
            y - rect.top(),
            rect.width,
            rect.height,
            self.config.tilt_divisor,
        );
        doc.set_style(card, "transform", &transform);
    }

    pub fn on_pointer_enter(&self, doc: &mut Document, target: NodeId) {
        if self.config.effect == CardEffect::Lift && self.cards.contains(&target) {
            doc.set_style(target, "transform", LIFT_ON);
        }
    }

    pub fn on_pointer_leave(&self, doc: &mut Document, target: NodeId) {
        if !self.cards.contains(&target) {
            return;
        }
        let rest = match self.config.effect {
            CardEffect::Tilt => TILT_REST,
            CardEffect::Lift => LIFT_OFF,
        };
        doc.set_style(target, "transform", rest);
    }
}

pub struct PieLinks {
    slices: Vec<NodeId>,
    cards: Vec<NodeId>,
}

impl PieLinks {
    /// Requires both a slice and a profit card
    pub fn new(bindings: &PageBindings) -> Option<Self> {
        if bindings.pie_slices.is_empty() || bindings.profit_cards.is_empty() {
            return None;
        }
        Some(Self {
            slices: bindings.pie_slices.clone(),
            cards: bindings.profit_cards.clone(),
        })
    }

    fn highlight(&self, doc: &mut Document, target: NodeId, on: bool) {
        if self.slices.contains(&target) {
            let Some(role) = role_of(doc, target, "pie-slice-").map(str::to_string) else {
                return;
            };
            doc.set_class(target, SLICE_HOVER_CLASS, on);
            if let Some(card) = first_with_class(doc, &format!("profit-card-{}", role)) {
                doc.set_class(card, CARD_HIGHLIGHT_CLASS, on);
            }
        } else if self.cards.contains(&target) {
            let Some(role) = role_of(doc, target, "profit-card-").map(str::to_string) else {
                return;
            };
            doc.set_class(target, CARD_HIGHLIGHT_CLASS, on);
            if let Some(slice) = first_with_class(doc, &format!("pie-slice-{}", role)) {
                doc.set_class(slice, SLICE_HOVER_CLASS, on);
            }
        }
    }

    pub fn on_pointer_enter(&self, doc: &mut Document, target: NodeId) {
        self.highlight(doc, target, true);
    }

    pub fn on_pointer_leave(&self, doc: &mut Document, target: NodeId) {
        self.highlight(doc, target, false);
    }
}

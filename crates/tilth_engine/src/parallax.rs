//! Hero parallax

use std::time::Instant;

use tilth_animation::Throttle;
use tilth_core::{css_number, Document, NodeId};

use crate::bindings::PageBindings;
use crate::config::{ParallaxConfig, ParallaxTarget, ScrollConfig};

pub struct HeroParallax {
    hero: NodeId,
    background: Option<NodeId>,
    throttle: Throttle,
    config: ParallaxConfig,
}

impl HeroParallax {
    /// Requires the hero section, and its background when that is what moves
    pub fn new(
        bindings: &PageBindings,
        config: &ParallaxConfig,
        scroll: &ScrollConfig,
    ) -> Option<Self> {
        let hero = bindings.hero?;
        if config.target == ParallaxTarget::BackgroundTransform
            && bindings.hero_background.is_none()
        {
            return None;
        }
        Some(Self {
            hero,
            background: bindings.hero_background,
            throttle: Throttle::new(scroll.parallax_throttle()),
            config: config.clone(),
        })
    }

    pub fn on_scroll(&mut self, doc: &mut Document, now: Instant) {
        if !self.throttle.try_acquire(now) {
            return;
        }
        let scrolled = doc.scroll_y();
        // Past the hero nothing is visible to move
        if scrolled >= doc.bounds(self.hero).height {
            return;
        }
        let shift = css_number(scrolled * self.config.speed);

        match (self.config.target, self.background) {
            (ParallaxTarget::BackgroundTransform, Some(background)) => {
                doc.set_style(background, "transform", &format!("translateY({}px)", shift));
            }
            (ParallaxTarget::HeroPosition, _) => {
                doc.set_style(self.hero, "background-position-y", &format!("{}px", shift));
            }
            (ParallaxTarget::BackgroundTransform, None) => {}
        }
    }
}

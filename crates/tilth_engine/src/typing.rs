//! Hero title typing effect

use std::time::Duration;

use tilth_core::{Document, Locale, NodeId};
use tracing::debug;

use crate::bindings::PageBindings;
use crate::config::TypingConfig;
use crate::task::{Ctx, Task};

pub struct TypingEffect {
    title: NodeId,
    chars: Vec<char>,
    typed: usize,
    config: TypingConfig,
}

impl TypingEffect {
    /// Only on viewports wider than the configured minimum
    pub fn new(bindings: &PageBindings, config: &TypingConfig, doc: &Document) -> Option<Self> {
        let title = bindings.typing?;
        if doc.viewport().width <= config.min_viewport_width {
            debug!("Typing effect skipped on narrow viewport");
            return None;
        }
        Some(Self {
            title,
            chars: Vec::new(),
            typed: 0,
            config: config.clone(),
        })
    }

    /// The title text for `locale`, falling back to what is on the page
    fn source_text(&self, doc: &Document, locale: Locale) -> String {
        doc.attr(self.title, &locale.text_attribute())
            .filter(|text| !text.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| doc.text_content(self.title))
    }

    /// Clear the title and schedule the first character
    pub fn start(&mut self, ctx: &mut Ctx<'_>) {
        let text = self.source_text(ctx.doc, ctx.session.locale);
        self.chars = text.chars().collect();
        self.typed = 0;
        ctx.doc.set_text_content(self.title, "");
        if !self.chars.is_empty() {
            ctx.after(Duration::from_millis(self.config.start_delay_ms), Task::TypeNext);
        }
    }

    /// Append the next character; returns `false` once the title is complete
    pub fn type_next(&mut self, ctx: &mut Ctx<'_>) -> bool {
        let Some(&c) = self.chars.get(self.typed) else {
            return false;
        };
        let mut buf = [0; 4];
        ctx.doc.push_text(self.title, c.encode_utf8(&mut buf));
        self.typed += 1;

        if self.typed < self.chars.len() {
            ctx.after(Duration::from_millis(self.config.char_delay_ms), Task::TypeNext);
            true
        } else {
            false
        }
    }

    pub fn is_done(&self) -> bool {
        self.typed >= self.chars.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::session::SessionState;
    use std::time::Instant;
    use tilth_animation::TimerQueue;

    fn title_page(width: f64) -> (Document, NodeId) {
        let mut doc = Document::new();
        doc.set_viewport_size(width, 800.0);
        let body = doc.body();
        let title = doc
            .element(body, "h1")
            .class("title-typing")
            .attr("data-lang-bn", "সবুজ খামার")
            .attr("data-lang-en", "Green Farm")
            .text("সবুজ খামার")
            .node();
        (doc, title)
    }

    #[test]
    fn test_types_one_character_per_step() {
        let config = EngineConfig::enhanced();
        let (mut doc, title) = title_page(1280.0);
        let bindings = PageBindings::resolve(&doc, &config).unwrap();
        let mut typing = TypingEffect::new(&bindings, &config.typing, &doc).unwrap();

        let mut session = SessionState::new(Locale::English);
        let mut timers = TimerQueue::new();
        let mut commands = Vec::new();
        let start = Instant::now();
        {
            let mut ctx = Ctx::new(&mut doc, &mut session, &mut timers, &mut commands, start);
            typing.start(&mut ctx);
        }
        assert_eq!(doc.text_content(title), "");
        assert_eq!(timers.next_deadline(), Some(start + Duration::from_millis(1000)));

        let mut steps = Vec::new();
        while let Some((due, _)) = timers.pop_due(start + Duration::from_secs(5)) {
            let mut ctx = Ctx::new(&mut doc, &mut session, &mut timers, &mut commands, due);
            typing.type_next(&mut ctx);
            steps.push((due - start).as_millis());
        }
        assert_eq!(doc.text_content(title), "Green Farm");
        assert_eq!(steps.len(), 10);
        assert_eq!(steps[1], 1050);
        assert_eq!(*steps.last().unwrap(), 1450);
        assert!(typing.is_done());
    }

    #[test]
    fn test_narrow_viewport_skips() {
        let config = EngineConfig::enhanced();
        let (doc, _) = title_page(768.0);
        let bindings = PageBindings::resolve(&doc, &config).unwrap();
        assert!(TypingEffect::new(&bindings, &config.typing, &doc).is_none());
    }
}

//! Stat counters
//!
//! Each `.stat-number` counts up from zero the first time half of it is on
//! screen. The target comes from `data-count` or, failing that, from the
//! digits in the element's own text.

use std::time::Instant;

use tilth_animation::CountUp;
use tilth_core::{Document, NodeId, Numerals};
use tracing::debug;

use crate::bindings::PageBindings;
use crate::config::CounterConfig;
use crate::viewport::{VisibilityWatcher, WatchOptions};

/// Parse the leading integer of `text` the way a browser's `parseInt` does
///
/// Leading whitespace and one sign are accepted; parsing stops at the first
/// character that is not an ASCII digit.
pub fn parse_leading_int(text: &str) -> Option<i64> {
    let trimmed = text.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }
    let magnitude: i64 = rest[..digits_len].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

/// Target value for a counter element
///
/// With `read_data_count`, a non-zero `data-count` wins; otherwise every
/// ASCII digit in the text is joined and parsed. Without it, the text's
/// leading integer is used.
pub fn counter_target(doc: &Document, node: NodeId, read_data_count: bool) -> Option<i64> {
    let text = doc.text_content(node);
    if !read_data_count {
        return parse_leading_int(&text);
    }

    let from_attr = doc.attr(node, "data-count").and_then(parse_leading_int);
    match from_attr {
        Some(value) if value != 0 => Some(value),
        _ => {
            let digits: String = text.chars().filter(char::is_ascii_digit).collect();
            parse_leading_int(&digits)
        }
    }
}

struct RunningCounter {
    node: NodeId,
    count: CountUp,
    numerals: Numerals,
}

pub struct CounterAnimator {
    watcher: VisibilityWatcher,
    running: Vec<RunningCounter>,
    config: CounterConfig,
}

impl CounterAnimator {
    pub fn new(bindings: &PageBindings, config: &CounterConfig) -> Self {
        let mut watcher =
            VisibilityWatcher::new("counter", WatchOptions::new().threshold(config.threshold));
        for &node in &bindings.counters {
            watcher.register(node);
        }
        Self {
            watcher,
            running: Vec::new(),
            config: config.clone(),
        }
    }

    /// Start counters that came into view
    pub fn update(&mut self, doc: &Document, now: Instant) {
        for node in self.watcher.poll(doc) {
            let Some(target) = counter_target(doc, node, self.config.read_data_count) else {
                debug!("Counter {:?} has no numeric target, skipping", node);
                continue;
            };
            let numerals = if self.config.localize_digits {
                Numerals::detect(&doc.text_content(node))
            } else {
                Numerals::Latin
            };

            let mut count = CountUp::new(target, self.config.duration(), now)
                .with_easing(self.config.easing);
            if let Some(steps) = self.config.steps {
                count = count.with_steps(steps);
            }

            debug!("Counter {:?} counting to {}", node, target);
            self.running.push(RunningCounter {
                node,
                count,
                numerals,
            });
        }
    }

    /// Render one frame of every running counter
    ///
    /// Returns `true` while any counter is still running.
    pub fn frame(&mut self, doc: &mut Document, now: Instant) -> bool {
        self.running.retain(|counter| {
            if !doc.exists(counter.node) {
                return false;
            }
            let frame = counter.count.sample(now);
            doc.set_text_content(counter.node, &counter.numerals.render(frame.value));
            !frame.finished
        });
        !self.running.is_empty()
    }

    pub fn is_running(&self) -> bool {
        !self.running.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use std::time::Duration;
    use tilth_core::Rect;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_parse_leading_int() {
        assert_eq!(parse_leading_int("120+"), Some(120));
        assert_eq!(parse_leading_int("  -15 km"), Some(-15));
        assert_eq!(parse_leading_int("1,200"), Some(1));
        assert_eq!(parse_leading_int("abc"), None);
        assert_eq!(parse_leading_int("১২০"), None);
        assert_eq!(parse_leading_int(""), None);
    }

    #[test]
    fn test_counter_target_sources() {
        let mut doc = Document::new();
        let body = doc.body();
        let with_attr = doc
            .element(body, "span")
            .attr("data-count", "500")
            .text("৫০০")
            .node();
        let zero_attr = doc
            .element(body, "span")
            .attr("data-count", "0")
            .text("1,250+")
            .node();
        let bengali_only = doc.element(body, "span").text("১২০+").node();
        let plain = doc.element(body, "span").text("35 years").node();

        assert_eq!(counter_target(&doc, with_attr, true), Some(500));
        assert_eq!(counter_target(&doc, zero_attr, true), Some(1250));
        assert_eq!(counter_target(&doc, bengali_only, true), None);
        assert_eq!(counter_target(&doc, plain, true), Some(35));
        assert_eq!(counter_target(&doc, zero_attr, false), Some(1));
    }

    fn counter_page() -> (Document, NodeId) {
        let mut doc = Document::new();
        let body = doc.body();
        let stat = doc
            .element(body, "span")
            .class("stat-number")
            .attr("data-count", "120")
            .text("১২০+")
            .bounds(Rect::new(0.0, 1000.0, 200.0, 40.0))
            .node();
        (doc, stat)
    }

    #[test]
    fn test_counter_starts_at_half_visibility() {
        let (mut doc, stat) = counter_page();
        let config = EngineConfig::enhanced();
        let bindings = PageBindings::resolve(&doc, &config).unwrap();
        let mut counters = CounterAnimator::new(&bindings, &config.counter);
        let start = Instant::now();

        counters.update(&doc, start);
        assert!(!counters.is_running());

        // 10 of 40px visible
        doc.scroll_to(210.0);
        counters.update(&doc, start);
        assert!(!counters.is_running());

        // 30 of 40px visible
        doc.scroll_to(230.0);
        counters.update(&doc, start);
        assert!(counters.is_running());

        assert!(counters.frame(&mut doc, start + ms(1000)));
        // floor(120 * 0.9375) = 112 in Bengali digits
        assert_eq!(doc.text_content(stat), "১১২");

        assert!(!counters.frame(&mut doc, start + ms(2000)));
        assert_eq!(doc.text_content(stat), "১২০");
    }

    #[test]
    fn test_counter_is_monotonic_and_exact() {
        let (mut doc, stat) = counter_page();
        doc.scroll_to(600.0);
        let mut config = EngineConfig::enhanced();
        config.counter.localize_digits = false;
        let bindings = PageBindings::resolve(&doc, &config).unwrap();
        let mut counters = CounterAnimator::new(&bindings, &config.counter);
        let start = Instant::now();
        counters.update(&doc, start);

        let mut last = 0;
        for step in 0..=130 {
            counters.frame(&mut doc, start + ms(step * 16));
            let shown: i64 = doc.text_content(stat).parse().unwrap();
            assert!(shown >= last);
            last = shown;
        }
        assert_eq!(last, 120);
        assert!(!counters.is_running());

        // Scrolling away and back does not restart it
        doc.scroll_to(0.0);
        counters.update(&doc, start + ms(3000));
        doc.scroll_to(600.0);
        counters.update(&doc, start + ms(3100));
        assert!(!counters.is_running());
    }

    #[test]
    fn test_non_numeric_counter_skipped() {
        let mut doc = Document::new();
        let body = doc.body();
        let stat = doc
            .element(body, "span")
            .class("stat-number")
            .text("∞")
            .bounds(Rect::new(0.0, 0.0, 100.0, 40.0))
            .node();
        let config = EngineConfig::enhanced();
        let bindings = PageBindings::resolve(&doc, &config).unwrap();
        let mut counters = CounterAnimator::new(&bindings, &config.counter);

        counters.update(&doc, Instant::now());
        assert!(!counters.is_running());
        assert_eq!(doc.text_content(stat), "∞");
    }
}

//! Viewport trigger service
//!
//! A [`VisibilityWatcher`] plays the role of an intersection observer whose
//! callbacks unobserve their target on first call. Targets are registered
//! once, fire the first time enough of them is inside the (margin-adjusted)
//! viewport, and are then released for good. A target that fired can never
//! be registered again on the same watcher.

use std::str::FromStr;

use indexmap::IndexSet;
use rustc_hash::FxHashSet;
use tilth_core::{Document, NodeId, Rect};
use tracing::trace;

use crate::error::{EngineError, Result};

/// One side of a root margin
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MarginLength {
    Px(f64),
    /// Percentage of the viewport width (left/right) or height (top/bottom)
    Percent(f64),
}

impl MarginLength {
    fn resolve(self, basis: f64) -> f64 {
        match self {
            MarginLength::Px(px) => px,
            MarginLength::Percent(pct) => basis * pct / 100.0,
        }
    }
}

impl FromStr for MarginLength {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || EngineError::RootMargin(s.to_string());
        if let Some(number) = s.strip_suffix("px") {
            number.parse().map(MarginLength::Px).map_err(|_| invalid())
        } else if let Some(number) = s.strip_suffix('%') {
            number.parse().map(MarginLength::Percent).map_err(|_| invalid())
        } else if s == "0" {
            Ok(MarginLength::Px(0.0))
        } else {
            Err(invalid())
        }
    }
}

/// Grows (positive) or shrinks (negative) the viewport before testing
/// intersection, written like the CSS `margin` shorthand
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RootMargin {
    pub top: MarginLength,
    pub right: MarginLength,
    pub bottom: MarginLength,
    pub left: MarginLength,
}

impl Default for RootMargin {
    fn default() -> Self {
        let zero = MarginLength::Px(0.0);
        Self {
            top: zero,
            right: zero,
            bottom: zero,
            left: zero,
        }
    }
}

impl RootMargin {
    pub fn parse(input: &str) -> Result<Self> {
        let values = input
            .split_whitespace()
            .map(str::parse)
            .collect::<Result<Vec<MarginLength>>>()?;

        match values[..] {
            [all] => Ok(Self {
                top: all,
                right: all,
                bottom: all,
                left: all,
            }),
            [vertical, horizontal] => Ok(Self {
                top: vertical,
                right: horizontal,
                bottom: vertical,
                left: horizontal,
            }),
            [top, horizontal, bottom] => Ok(Self {
                top,
                right: horizontal,
                bottom,
                left: horizontal,
            }),
            [top, right, bottom, left] => Ok(Self {
                top,
                right,
                bottom,
                left,
            }),
            _ => Err(EngineError::RootMargin(input.to_string())),
        }
    }

    /// Apply the margin to a viewport rect in document coordinates
    pub fn expand(&self, root: Rect) -> Rect {
        let top = self.top.resolve(root.height);
        let right = self.right.resolve(root.width);
        let bottom = self.bottom.resolve(root.height);
        let left = self.left.resolve(root.width);
        Rect::new(
            root.x - left,
            root.y - top,
            (root.width + left + right).max(0.0),
            (root.height + top + bottom).max(0.0),
        )
    }
}

/// Trigger settings shared by every target of one watcher
#[derive(Clone, Debug, PartialEq)]
pub struct WatchOptions {
    thresholds: Vec<f64>,
    root_margin: RootMargin,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            thresholds: vec![0.0],
            root_margin: RootMargin::default(),
        }
    }
}

impl WatchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn threshold(self, threshold: f64) -> Self {
        self.thresholds(&[threshold])
    }

    /// Visible fractions of interest; each is clamped to `[0, 1]`
    pub fn thresholds(mut self, thresholds: &[f64]) -> Self {
        let mut values: Vec<f64> = thresholds.iter().map(|t| t.clamp(0.0, 1.0)).collect();
        values.sort_by(f64::total_cmp);
        values.dedup();
        if values.is_empty() {
            values.push(0.0);
        }
        self.thresholds = values;
        self
    }

    pub fn root_margin(mut self, margin: RootMargin) -> Self {
        self.root_margin = margin;
        self
    }

    /// The smallest visible fraction that triggers
    pub fn min_threshold(&self) -> f64 {
        self.thresholds.first().copied().unwrap_or(0.0)
    }

    /// Whether `node` currently counts as visible
    pub fn is_triggered(&self, doc: &Document, node: NodeId) -> bool {
        if !doc.is_attached(node) {
            return false;
        }
        let root = self.root_margin.expand(doc.viewport().rect());
        match intersection_ratio(doc.bounds(node), root) {
            Some(ratio) => ratio >= self.min_threshold(),
            None => false,
        }
    }
}

/// Fraction of `target` inside `root`, or `None` when they do not touch
///
/// A zero-area target that touches the root counts as fully visible.
pub fn intersection_ratio(target: Rect, root: Rect) -> Option<f64> {
    let overlap = target.intersection(&root)?;
    let area = target.area();
    if area <= 0.0 {
        return Some(1.0);
    }
    Some((overlap.area() / area).clamp(0.0, 1.0))
}

/// One-shot visibility triggers for a set of elements
pub struct VisibilityWatcher {
    name: &'static str,
    options: WatchOptions,
    pending: IndexSet<NodeId>,
    fired: FxHashSet<NodeId>,
}

impl VisibilityWatcher {
    pub fn new(name: &'static str, options: WatchOptions) -> Self {
        Self {
            name,
            options,
            pending: IndexSet::new(),
            fired: FxHashSet::default(),
        }
    }

    pub fn options(&self) -> &WatchOptions {
        &self.options
    }

    /// Start watching `target`
    ///
    /// Returns `false` if it is already watched or has already fired.
    pub fn register(&mut self, target: NodeId) -> bool {
        if self.fired.contains(&target) {
            return false;
        }
        self.pending.insert(target)
    }

    /// Stop watching `target` without firing
    pub fn unregister(&mut self, target: NodeId) -> bool {
        self.pending.shift_remove(&target)
    }

    pub fn is_watching(&self, target: NodeId) -> bool {
        self.pending.contains(&target)
    }

    pub fn has_fired(&self, target: NodeId) -> bool {
        self.fired.contains(&target)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Release every target that is visible now, in registration order
    ///
    /// Targets whose node no longer exists are dropped silently.
    pub fn poll(&mut self, doc: &Document) -> Vec<NodeId> {
        if self.pending.is_empty() {
            return Vec::new();
        }
        self.pending.retain(|&node| doc.exists(node));

        let triggered: Vec<NodeId> = self
            .pending
            .iter()
            .copied()
            .filter(|&node| self.options.is_triggered(doc, node))
            .collect();

        for &node in &triggered {
            self.pending.shift_remove(&node);
            self.fired.insert(node);
        }
        if !triggered.is_empty() {
            trace!("{} watcher fired for {} element(s)", self.name, triggered.len());
        }
        triggered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilth_core::Rect;

    fn page_with_block(top: f64, height: f64) -> (Document, NodeId) {
        let mut doc = Document::new();
        let body = doc.body();
        let node = doc
            .element(body, "div")
            .bounds(Rect::new(0.0, top, 1280.0, height))
            .node();
        (doc, node)
    }

    #[test]
    fn test_root_margin_shorthand() {
        let margin = RootMargin::parse("0px 0px -50px 0px").unwrap();
        assert_eq!(margin.bottom, MarginLength::Px(-50.0));
        assert_eq!(margin.top, MarginLength::Px(0.0));

        let margin = RootMargin::parse("50px 0px").unwrap();
        assert_eq!(margin.top, MarginLength::Px(50.0));
        assert_eq!(margin.left, MarginLength::Px(0.0));

        let margin = RootMargin::parse("10%").unwrap();
        assert_eq!(margin.right, MarginLength::Percent(10.0));

        assert!(RootMargin::parse("").is_err());
        assert!(RootMargin::parse("5em").is_err());
        assert!(RootMargin::parse("1px 2px 3px 4px 5px").is_err());
    }

    #[test]
    fn test_root_margin_expand() {
        let root = Rect::new(0.0, 100.0, 1000.0, 800.0);
        let shrunk = RootMargin::parse("0px 0px -50px 0px").unwrap().expand(root);
        assert_eq!(shrunk.bottom(), 850.0);

        let grown = RootMargin::parse("50px 0px").unwrap().expand(root);
        assert_eq!(grown.top(), 50.0);
        assert_eq!(grown.bottom(), 950.0);
    }

    #[test]
    fn test_intersection_ratio() {
        let root = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert_eq!(intersection_ratio(Rect::new(0.0, 50.0, 100.0, 100.0), root), Some(0.5));
        assert_eq!(intersection_ratio(Rect::new(0.0, 200.0, 100.0, 100.0), root), None);
        assert_eq!(intersection_ratio(Rect::new(10.0, 10.0, 0.0, 0.0), root), Some(1.0));
    }

    #[test]
    fn test_fires_once_when_threshold_met() {
        // 400px tall block starting 100px below the fold
        let (mut doc, node) = page_with_block(900.0, 400.0);
        let mut watcher = VisibilityWatcher::new("test", WatchOptions::new().threshold(0.5));
        assert!(watcher.register(node));

        assert!(watcher.poll(&doc).is_empty());

        // 150 of 400px visible
        doc.scroll_to(250.0);
        assert!(watcher.poll(&doc).is_empty());

        // 200 of 400px visible
        doc.scroll_to(300.0);
        assert_eq!(watcher.poll(&doc), vec![node]);
        assert!(watcher.has_fired(node));

        // Leaving and re-entering does not fire again
        doc.scroll_to(0.0);
        assert!(watcher.poll(&doc).is_empty());
        doc.scroll_to(600.0);
        assert!(watcher.poll(&doc).is_empty());
    }

    #[test]
    fn test_fired_target_cannot_reregister() {
        let (doc, node) = page_with_block(0.0, 100.0);
        let mut watcher = VisibilityWatcher::new("test", WatchOptions::new());
        assert!(watcher.register(node));
        assert!(!watcher.register(node));

        assert_eq!(watcher.poll(&doc), vec![node]);
        assert!(!watcher.register(node));
        assert_eq!(watcher.pending_count(), 0);
    }

    #[test]
    fn test_never_visible_never_fires() {
        let (mut doc, node) = page_with_block(5000.0, 100.0);
        let mut watcher = VisibilityWatcher::new("test", WatchOptions::new().threshold(0.1));
        watcher.register(node);
        for offset in [0.0, 1000.0, 2000.0, 3000.0] {
            doc.scroll_to(offset);
            assert!(watcher.poll(&doc).is_empty());
        }
        assert!(watcher.is_watching(node));
    }

    #[test]
    fn test_detached_and_destroyed_targets() {
        let (mut doc, node) = page_with_block(0.0, 100.0);
        let mut watcher = VisibilityWatcher::new("test", WatchOptions::new());
        watcher.register(node);

        doc.detach(node);
        assert!(watcher.poll(&doc).is_empty());
        assert!(watcher.is_watching(node));

        doc.destroy(node);
        assert!(watcher.poll(&doc).is_empty());
        assert!(!watcher.is_watching(node));
    }

    #[test]
    fn test_negative_margin_delays_trigger() {
        // Top edge 30px above the fold
        let (doc, node) = page_with_block(770.0, 100.0);
        let options = WatchOptions::new()
            .thresholds(&[0.1, 0.25, 0.5])
            .root_margin(RootMargin::parse("0px 0px -50px 0px").unwrap());
        assert!(!options.is_triggered(&doc, node));
        assert!(WatchOptions::new().threshold(0.1).is_triggered(&doc, node));
    }

    #[test]
    fn test_thresholds_sorted_and_clamped() {
        let options = WatchOptions::new().thresholds(&[0.5, 1.7, 0.1, 0.1]);
        assert_eq!(options.min_threshold(), 0.1);
        assert_eq!(options.thresholds, vec![0.1, 0.5, 1.0]);
    }
}

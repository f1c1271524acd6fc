//! Progress bars and floating decorations
//!
//! A progress bar keeps its final width inline in the markup. When it first
//! comes into view the width drops to zero and is restored a moment later
//! with a transition, so the bar fills up in front of the reader.

use std::time::Duration;

use tilth_core::{css_number, Document, NodeId};
use tracing::debug;

use crate::bindings::PageBindings;
use crate::config::{FloatingConfig, ProgressConfig};
use crate::task::{Ctx, Task};
use crate::viewport::{VisibilityWatcher, WatchOptions};

pub struct ProgressBars {
    watcher: VisibilityWatcher,
    config: ProgressConfig,
}

impl ProgressBars {
    pub fn new(bindings: &PageBindings, config: &ProgressConfig) -> Self {
        let mut watcher =
            VisibilityWatcher::new("progress", WatchOptions::new().threshold(config.threshold));
        for &bar in &bindings.progress_bars {
            watcher.register(bar);
        }
        Self {
            watcher,
            config: config.clone(),
        }
    }

    /// Empty bars that came into view and schedule their fill
    pub fn update(&mut self, ctx: &mut Ctx<'_>) -> usize {
        let visible = self.watcher.poll(ctx.doc);
        for &bar in &visible {
            let width = ctx.doc.style(bar, "width").unwrap_or_default().to_string();
            ctx.doc.set_style(bar, "width", "0");
            ctx.after(
                Duration::from_millis(self.config.restore_delay_ms),
                Task::RestoreProgress { node: bar, width },
            );
        }
        visible.len()
    }

    pub fn restore(&self, doc: &mut Document, bar: NodeId, width: &str) {
        doc.set_style(bar, "transition", &self.config.transition);
        if width.is_empty() {
            doc.remove_style(bar, "width");
        } else {
            doc.set_style(bar, "width", width);
        }
    }

    pub fn pending(&self) -> usize {
        self.watcher.pending_count()
    }
}

/// Offset the float animation of each decoration so they drift out of phase
pub fn stagger_floating(doc: &mut Document, bindings: &PageBindings, config: &FloatingConfig) {
    for (index, &node) in bindings.floating.iter().enumerate() {
        let delay = format!("{}s", css_number(index as f64 * config.step));
        doc.set_style(node, "animation-delay", &delay);
    }
    debug!("Staggered {} floating element(s)", bindings.floating.len());
}

//! Deferred image loading

use tilth_core::{Document, NodeId};
use tilth_platform::Capabilities;
use tracing::debug;

use crate::bindings::PageBindings;
use crate::config::{LazyImageConfig, LazyImageMode};
use crate::error::Result;
use crate::viewport::{RootMargin, VisibilityWatcher, WatchOptions};

pub const LOADING_CLASS: &str = "lazy-loading";
pub const LOADED_CLASS: &str = "loaded";

/// Move `data-src` into `src`; returns `false` if there was nothing to move
fn load_source(doc: &mut Document, image: NodeId) -> bool {
    let Some(src) = doc.attr(image, "data-src").map(str::to_string) else {
        return false;
    };
    doc.set_attr(image, "src", &src);
    true
}

pub struct LazyImageLoader {
    images: Vec<NodeId>,
    watcher: VisibilityWatcher,
    mode: LazyImageMode,
}

impl LazyImageLoader {
    /// `None` when the platform lacks the primitive the configured mode needs
    pub fn new(
        bindings: &PageBindings,
        config: &LazyImageConfig,
        capabilities: &Capabilities,
    ) -> Result<Option<Self>> {
        let supported = match config.mode {
            LazyImageMode::Observe => capabilities.visibility_observer,
            LazyImageMode::Native => capabilities.native_lazy_loading,
        };
        if !supported {
            debug!("Lazy images disabled: platform lacks {:?} support", config.mode);
            return Ok(None);
        }

        let options = WatchOptions::new()
            .threshold(config.threshold)
            .root_margin(RootMargin::parse(&config.root_margin)?);
        Ok(Some(Self {
            images: bindings.lazy_images.clone(),
            watcher: VisibilityWatcher::new("lazy_images", options),
            mode: config.mode,
        }))
    }

    pub fn start(&mut self, doc: &mut Document) {
        match self.mode {
            LazyImageMode::Observe => {
                for &image in &self.images {
                    doc.add_class(image, LOADING_CLASS);
                    self.watcher.register(image);
                }
            }
            LazyImageMode::Native => {
                let loaded = self
                    .images
                    .iter()
                    .filter(|&&image| load_source(doc, image))
                    .count();
                debug!("Handed {} image(s) to native lazy loading", loaded);
            }
        }
    }

    /// Load images that came near the viewport
    pub fn update(&mut self, doc: &mut Document) -> usize {
        let visible = self.watcher.poll(doc);
        for &image in &visible {
            load_source(doc, image);
            doc.remove_attr(image, "data-src");
            doc.add_class(image, LOADED_CLASS);
        }
        visible.len()
    }

    pub fn pending(&self) -> usize {
        self.watcher.pending_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use tilth_core::Rect;

    fn gallery() -> (Document, NodeId, NodeId) {
        let mut doc = Document::new();
        let body = doc.body();
        let near = doc
            .element(body, "img")
            .attr("data-src", "/media/paddy.jpg")
            .attr("loading", "lazy")
            .bounds(Rect::new(0.0, 830.0, 400.0, 300.0))
            .node();
        let far = doc
            .element(body, "img")
            .attr("data-src", "/media/fish.jpg")
            .attr("loading", "lazy")
            .bounds(Rect::new(0.0, 2000.0, 400.0, 300.0))
            .node();
        (doc, near, far)
    }

    #[test]
    fn test_images_load_within_margin() {
        let config = EngineConfig::enhanced();
        let (mut doc, near, far) = gallery();
        let bindings = PageBindings::resolve(&doc, &config).unwrap();
        let mut loader = LazyImageLoader::new(&bindings, &config.lazy_images, &Capabilities::default())
            .unwrap()
            .unwrap();

        loader.start(&mut doc);
        assert!(doc.has_class(near, LOADING_CLASS));

        // 30px below the fold, inside the 50px margin
        assert_eq!(loader.update(&mut doc), 1);
        assert_eq!(doc.attr(near, "src"), Some("/media/paddy.jpg"));
        assert!(!doc.has_attr(near, "data-src"));
        assert!(doc.has_class(near, LOADED_CLASS));
        // Both classes stay so the fade-in rule can match
        assert!(doc.has_class(near, LOADING_CLASS));
        assert_eq!(doc.select(".lazy-loading.loaded").unwrap(), vec![near]);
        assert_eq!(doc.attr(far, "src"), None);
        assert_eq!(loader.pending(), 1);
    }

    #[test]
    fn test_missing_capability_disables() {
        let config = EngineConfig::enhanced();
        let (doc, _, _) = gallery();
        let bindings = PageBindings::resolve(&doc, &config).unwrap();
        let loader =
            LazyImageLoader::new(&bindings, &config.lazy_images, &Capabilities::minimal()).unwrap();
        assert!(loader.is_none());
    }

    #[test]
    fn test_native_mode_copies_sources() {
        let config = EngineConfig::classic();
        let (mut doc, near, far) = gallery();
        let bindings = PageBindings::resolve(&doc, &config).unwrap();
        let mut loader = LazyImageLoader::new(&bindings, &config.lazy_images, &Capabilities::default())
            .unwrap()
            .unwrap();

        loader.start(&mut doc);
        assert_eq!(doc.attr(near, "src"), Some("/media/paddy.jpg"));
        assert_eq!(doc.attr(far, "src"), Some("/media/fish.jpg"));
        assert!(!doc.has_class(far, LOADING_CLASS));
    }
}

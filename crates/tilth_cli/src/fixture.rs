//! Page fixtures
//!
//! A fixture describes the static markup the engine enhances, as JSON:
//!
//! ```json
//! {
//!   "viewport": { "width": 1280, "height": 800 },
//!   "body": [
//!     { "tag": "section", "id": "about", "bounds": [0, 800, 1280, 900],
//!       "children": [
//!         { "tag": "h2", "attrs": { "data-lang-bn": "আমাদের সম্পর্কে", "data-lang-en": "About Us" },
//!           "text": "আমাদের সম্পর্কে" }
//!       ] }
//!   ]
//! }
//! ```
//!
//! Bounds are `[x, y, width, height]` in document coordinates.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tilth_core::{Document, NodeId, Rect};

#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct ViewportSize {
    pub width: f64,
    pub height: f64,
}

impl Default for ViewportSize {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 800.0,
        }
    }
}

/// One element and its subtree
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ElementFixture {
    pub tag: String,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attrs: IndexMap<String, String>,
    pub style: IndexMap<String, String>,
    pub text: Option<String>,
    /// Initial form value, also restored by a form reset
    pub value: Option<String>,
    pub bounds: Option<[f64; 4]>,
    pub children: Vec<ElementFixture>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PageFixture {
    pub viewport: ViewportSize,
    pub body: Vec<ElementFixture>,
}

impl PageFixture {
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("Failed to parse page fixture")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read page fixture {}", path.display()))?;
        Self::from_json(&content)
    }

    /// Build the document described by this fixture
    pub fn build(&self) -> Document {
        let mut doc = Document::new();
        doc.set_viewport_size(self.viewport.width, self.viewport.height);
        let body = doc.body();
        for element in &self.body {
            build_node(&mut doc, body, element);
        }
        doc
    }
}

fn build_node(doc: &mut Document, parent: NodeId, element: &ElementFixture) -> NodeId {
    let tag = if element.tag.is_empty() { "div" } else { &element.tag };
    let node = doc.element(parent, tag).node();

    if let Some(id) = &element.id {
        doc.set_attr(node, "id", id);
    }
    for class in &element.classes {
        doc.add_class(node, class);
    }
    for (name, value) in &element.attrs {
        doc.set_attr(node, name, value);
    }
    for (property, value) in &element.style {
        doc.set_style(node, property, value);
    }
    if let Some(text) = &element.text {
        doc.set_text_content(node, text);
    }
    if let Some(value) = &element.value {
        doc.set_default_value(node, value);
    }
    if let Some([x, y, width, height]) = element.bounds {
        doc.set_bounds(node, Rect::new(x, y, width, height));
    }

    for child in &element.children {
        build_node(doc, node, child);
    }
    node
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r##"{
        "viewport": { "width": 1024, "height": 700 },
        "body": [
            { "tag": "header", "id": "main-header", "bounds": [0, 0, 1024, 80] },
            { "tag": "form", "classes": ["contact-form"], "children": [
                { "tag": "input", "attrs": { "type": "email" }, "value": "a@b.co" }
            ] }
        ]
    }"##;

    #[test]
    fn test_build_fixture() {
        let fixture = PageFixture::from_json(PAGE).unwrap();
        let doc = fixture.build();
        assert_eq!(doc.viewport().width, 1024.0);

        let header = doc.element_by_id("main-header").unwrap();
        assert_eq!(doc.bounds(header), Rect::new(0.0, 0.0, 1024.0, 80.0));

        let input = doc.select(".contact-form input[type=email]").unwrap()[0];
        assert_eq!(doc.value(input), "a@b.co");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.json");
        fs::write(&path, PAGE).unwrap();

        let fixture = PageFixture::load(&path).unwrap();
        assert_eq!(fixture.body.len(), 2);
        assert!(PageFixture::load(&dir.path().join("missing.json")).is_err());
    }

    #[test]
    fn test_invalid_fixture() {
        assert!(PageFixture::from_json("{ \"body\": 3 }").is_err());
    }
}

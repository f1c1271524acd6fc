//! Replay reports
//!
//! The final page state, either as JSON or as an indented outline.

use std::fmt::Write as _;

use indexmap::IndexMap;
use serde::Serialize;
use tilth_core::{Document, Locale, NodeId};
use tilth_engine::HostCommand;

#[derive(Debug, Serialize)]
pub struct NodeSnapshot {
    pub tag: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub attrs: IndexMap<String, String>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub style: IndexMap<String, String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub value: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSnapshot>,
}

impl NodeSnapshot {
    pub fn capture(doc: &Document, id: NodeId) -> Option<Self> {
        let node = doc.node(id)?;
        Some(Self {
            tag: node.tag().to_string(),
            classes: node.classes().to_vec(),
            attrs: node
                .attributes()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            style: node
                .styles()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            text: node.own_text().to_string(),
            value: node.value().to_string(),
            children: node
                .children()
                .iter()
                .filter_map(|&child| Self::capture(doc, child))
                .collect(),
        })
    }

    fn write_outline(&self, out: &mut String, depth: usize) {
        let _ = write!(out, "{:indent$}{}", "", self.tag, indent = depth * 2);
        for class in &self.classes {
            let _ = write!(out, ".{}", class);
        }
        for (name, value) in &self.attrs {
            let _ = write!(out, " {}=\"{}\"", name, value);
        }
        if !self.style.is_empty() {
            let style: Vec<String> = self
                .style
                .iter()
                .map(|(k, v)| format!("{}: {}", k, v))
                .collect();
            let _ = write!(out, " style=\"{}\"", style.join("; "));
        }
        if !self.value.is_empty() {
            let _ = write!(out, " value=\"{}\"", self.value);
        }
        if !self.text.is_empty() {
            let _ = write!(out, " {:?}", self.text);
        }
        out.push('\n');
        for child in &self.children {
            child.write_outline(out, depth + 1);
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReplayReport {
    pub elapsed_ms: u128,
    pub locale: Locale,
    pub scroll_y: f64,
    pub active_section: Option<String>,
    pub commands: Vec<HostCommand>,
    pub stored: IndexMap<String, String>,
    pub document: Option<NodeSnapshot>,
}

impl ReplayReport {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_outline(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "elapsed: {}ms", self.elapsed_ms);
        let _ = writeln!(out, "locale: {}", self.locale);
        let _ = writeln!(out, "scroll: {}", self.scroll_y);
        if let Some(section) = &self.active_section {
            let _ = writeln!(out, "section: #{}", section);
        }
        for (key, value) in &self.stored {
            let _ = writeln!(out, "stored: {} = {}", key, value);
        }
        for command in &self.commands {
            let _ = writeln!(out, "command: {:?}", command);
        }
        out.push('\n');
        if let Some(document) = &self.document {
            document.write_outline(&mut out, 0);
        }
        out
    }
}

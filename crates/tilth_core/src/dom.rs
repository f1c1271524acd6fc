//! Document model
//!
//! A small element tree that stands in for the page the interaction engine
//! enhances. Nodes live in a slot map arena and are addressed by [`NodeId`];
//! detached nodes stay valid until they are destroyed, the same way a script
//! can keep a reference to an element after removing it from the page.
//!
//! Every node carries a document-space layout box ([`Rect`]). The viewport
//! describes which part of the document is currently on screen, so
//! `bounding_client_rect` is the layout box shifted by the scroll offset.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, Key, SlotMap};
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::selector::{SelectorError, SelectorList};

new_key_type! {
    /// Handle to an element in a [`Document`]
    pub struct NodeId;
}

impl NodeId {
    /// Convert to a raw u64 representation
    pub fn to_raw(self) -> u64 {
        self.data().as_ffi()
    }

    /// Create from a raw u64 representation
    pub fn from_raw(raw: u64) -> Self {
        Self::from(slotmap::KeyData::from_ffi(raw))
    }
}

// ============================================================================
// Geometry
// ============================================================================

/// An axis-aligned rectangle in CSS pixels
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn top(&self) -> f64 {
        self.y
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn left(&self) -> f64 {
        self.x
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Translate by the given offsets
    pub fn offset(&self, dx: f64, dy: f64) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Intersection with another rect, edge-inclusive
    ///
    /// Two rects that merely touch produce a zero-area intersection rather
    /// than `None`.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let left = self.left().max(other.left());
        let top = self.top().max(other.top());
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if left <= right && top <= bottom {
            Some(Rect::new(left, top, right - left, bottom - top))
        } else {
            None
        }
    }
}

/// The visible window onto the document
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub scroll_x: f64,
    pub scroll_y: f64,
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            scroll_x: 0.0,
            scroll_y: 0.0,
            width: 1280.0,
            height: 800.0,
        }
    }
}

impl Viewport {
    /// The viewport in document coordinates
    pub fn rect(&self) -> Rect {
        Rect::new(self.scroll_x, self.scroll_y, self.width, self.height)
    }
}

/// Format a number the way a browser stringifies it into CSS text
///
/// Integral values drop the fractional part and negative zero prints as `0`.
pub fn css_number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    format!("{}", value)
}

// ============================================================================
// Nodes
// ============================================================================

/// A single element
#[derive(Clone, Debug, Default)]
pub struct Node {
    tag: String,
    classes: SmallVec<[String; 4]>,
    attributes: IndexMap<String, String>,
    style: IndexMap<String, String>,
    text: String,
    value: String,
    default_value: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    bounds: Rect,
}

impl Node {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            ..Default::default()
        }
    }

    /// Lowercase tag name
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn style(&self, property: &str) -> Option<&str> {
        self.style.get(property).map(String::as_str)
    }

    pub fn styles(&self) -> impl Iterator<Item = (&str, &str)> {
        self.style.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// The element's own text, not including descendants
    pub fn own_text(&self) -> &str {
        &self.text
    }

    /// Current form control value
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Layout box in document coordinates
    pub fn bounds(&self) -> Rect {
        self.bounds
    }
}

// ============================================================================
// Document
// ============================================================================

/// The element tree plus viewport state
///
/// Lookups and mutations addressed at a node that no longer exists are
/// silent no-ops; queries return `None` or empty values.
pub struct Document {
    nodes: SlotMap<NodeId, Node>,
    root: NodeId,
    head: NodeId,
    body: NodeId,
    viewport: Viewport,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document with `html`, `head` and `body` elements
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Node::new("html"));
        let head = nodes.insert(Node::new("head"));
        let body = nodes.insert(Node::new("body"));
        nodes[head].parent = Some(root);
        nodes[body].parent = Some(root);
        nodes[root].children = vec![head, body];

        Self {
            nodes,
            root,
            head,
            body,
            viewport: Viewport::default(),
        }
    }

    /// The document element (`<html>`)
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn head(&self) -> NodeId {
        self.head
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Whether the node still exists (attached or not)
    pub fn exists(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Number of live nodes, attached or detached
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // ------------------------------------------------------------------------
    // Viewport
    // ------------------------------------------------------------------------

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn set_viewport_size(&mut self, width: f64, height: f64) {
        self.viewport.width = width.max(0.0);
        self.viewport.height = height.max(0.0);
    }

    /// Current vertical scroll offset
    pub fn scroll_y(&self) -> f64 {
        self.viewport.scroll_y
    }

    /// Set the vertical scroll offset, clamped at the top edge
    pub fn scroll_to(&mut self, y: f64) {
        self.viewport.scroll_y = y.max(0.0);
    }

    // ------------------------------------------------------------------------
    // Tree structure
    // ------------------------------------------------------------------------

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.nodes.insert(Node::new(tag))
    }

    /// Create an element and append it to `parent`, returning a builder
    pub fn element(&mut self, parent: NodeId, tag: &str) -> NodeBuilder<'_> {
        let id = self.create_element(tag);
        self.append_child(parent, id);
        NodeBuilder { doc: self, id }
    }

    /// Append `child` as the last child of `parent`
    ///
    /// The child is first detached from its current parent. Appending a node
    /// into its own subtree is ignored.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if !self.exists(parent) || !self.exists(child) {
            return;
        }
        if self.contains(child, parent) {
            debug!("Ignoring append of {:?} into its own subtree", child);
            return;
        }
        self.detach(child);
        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.push(child);
    }

    /// Remove a node from its parent, keeping it alive in the arena
    ///
    /// Returns `false` if the node had no parent.
    pub fn detach(&mut self, node: NodeId) -> bool {
        let Some(parent) = self.nodes.get(node).and_then(|n| n.parent) else {
            return false;
        };
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.retain(|&c| c != node);
        }
        self.nodes[node].parent = None;
        true
    }

    /// Detach a node and free it together with its whole subtree
    pub fn destroy(&mut self, node: NodeId) {
        if !self.exists(node) || node == self.root {
            return;
        }
        self.detach(node);
        let mut freed = 0usize;
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            if let Some(n) = self.nodes.remove(id) {
                freed += 1;
                stack.extend(n.children);
            }
        }
        trace!("Destroyed {:?} ({} node(s))", node, freed);
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node).and_then(|n| n.parent)
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes.get(node).map(|n| n.children()).unwrap_or(&[])
    }

    /// Iterate from `node` up to the document element, inclusive
    pub fn ancestors(&self, node: NodeId) -> Ancestors<'_> {
        Ancestors {
            doc: self,
            next: self.exists(node).then_some(node),
        }
    }

    /// Whether `node` is `ancestor` or one of its descendants
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.ancestors(node).any(|a| a == ancestor)
    }

    /// Whether the node is connected to the document element
    pub fn is_attached(&self, node: NodeId) -> bool {
        self.contains(self.root, node)
    }

    /// All descendants of `scope` in document order, excluding `scope`
    pub fn descendants(&self, scope: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(scope).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// All attached elements matching the selector, in document order
    pub fn query_selector_all(&self, selector: &SelectorList) -> Vec<NodeId> {
        std::iter::once(self.root)
            .chain(self.descendants(self.root))
            .filter(|&id| selector.matches(self, id))
            .collect()
    }

    pub fn query_selector(&self, selector: &SelectorList) -> Option<NodeId> {
        std::iter::once(self.root)
            .chain(self.descendants(self.root))
            .find(|&id| selector.matches(self, id))
    }

    /// Descendants of `scope` matching the selector, in document order
    pub fn query_selector_all_within(&self, scope: NodeId, selector: &SelectorList) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|&id| selector.matches(self, id))
            .collect()
    }

    pub fn query_selector_within(&self, scope: NodeId, selector: &SelectorList) -> Option<NodeId> {
        self.descendants(scope)
            .into_iter()
            .find(|&id| selector.matches(self, id))
    }

    /// Parse `selector` and return all matching elements
    pub fn select(&self, selector: &str) -> Result<Vec<NodeId>, SelectorError> {
        let list = SelectorList::parse(selector)?;
        Ok(self.query_selector_all(&list))
    }

    /// First attached element whose `id` attribute equals `id`
    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        std::iter::once(self.root)
            .chain(self.descendants(self.root))
            .find(|&n| self.attr(n, "id") == Some(id))
    }

    /// First descendant with the given tag name
    pub fn first_descendant_by_tag(&self, scope: NodeId, tag: &str) -> Option<NodeId> {
        self.descendants(scope)
            .into_iter()
            .find(|&n| self.tag(n) == Some(tag))
    }

    // ------------------------------------------------------------------------
    // Element state
    // ------------------------------------------------------------------------

    pub fn tag(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(node).map(|n| n.tag())
    }

    pub fn classes(&self, node: NodeId) -> &[String] {
        self.nodes.get(node).map(|n| n.classes()).unwrap_or(&[])
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.nodes.get(node).is_some_and(|n| n.has_class(class))
    }

    /// Add a class; adding one that is already present changes nothing
    pub fn add_class(&mut self, node: NodeId, class: &str) {
        if let Some(n) = self.nodes.get_mut(node) {
            if !n.has_class(class) {
                n.classes.push(class.to_string());
            }
        }
    }

    pub fn remove_class(&mut self, node: NodeId, class: &str) {
        if let Some(n) = self.nodes.get_mut(node) {
            n.classes.retain(|c| c != class);
        }
    }

    /// Toggle a class, returning whether it is present afterwards
    pub fn toggle_class(&mut self, node: NodeId, class: &str) -> bool {
        if self.has_class(node, class) {
            self.remove_class(node, class);
            false
        } else {
            self.add_class(node, class);
            self.exists(node)
        }
    }

    /// Add or remove a class depending on `on`
    pub fn set_class(&mut self, node: NodeId, class: &str, on: bool) {
        if on {
            self.add_class(node, class);
        } else {
            self.remove_class(node, class);
        }
    }

    pub fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.nodes.get(node).and_then(|n| n.attr(name))
    }

    pub fn has_attr(&self, node: NodeId, name: &str) -> bool {
        self.attr(node, name).is_some()
    }

    /// Set an attribute; `class` is routed to the class list
    pub fn set_attr(&mut self, node: NodeId, name: &str, value: &str) {
        if name == "class" {
            if let Some(n) = self.nodes.get_mut(node) {
                n.classes = value.split_whitespace().map(str::to_string).collect();
            }
            return;
        }
        if let Some(n) = self.nodes.get_mut(node) {
            n.attributes.insert(name.to_string(), value.to_string());
        }
    }

    pub fn remove_attr(&mut self, node: NodeId, name: &str) {
        if let Some(n) = self.nodes.get_mut(node) {
            n.attributes.shift_remove(name);
        }
    }

    pub fn style(&self, node: NodeId, property: &str) -> Option<&str> {
        self.nodes.get(node).and_then(|n| n.style(property))
    }

    /// Set an inline style property; an empty value removes it
    pub fn set_style(&mut self, node: NodeId, property: &str, value: &str) {
        if value.is_empty() {
            self.remove_style(node, property);
            return;
        }
        if let Some(n) = self.nodes.get_mut(node) {
            n.style.insert(property.to_string(), value.to_string());
        }
    }

    pub fn remove_style(&mut self, node: NodeId, property: &str) {
        if let Some(n) = self.nodes.get_mut(node) {
            n.style.shift_remove(property);
        }
    }

    /// Concatenated text of the node and all its descendants
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        if let Some(n) = self.nodes.get(node) {
            out.push_str(&n.text);
        }
        for id in self.descendants(node) {
            out.push_str(&self.nodes[id].text);
        }
        out
    }

    /// Replace the node's content with plain text, destroying its children
    pub fn set_text_content(&mut self, node: NodeId, text: &str) {
        if !self.exists(node) {
            return;
        }
        let children = std::mem::take(&mut self.nodes[node].children);
        for child in children {
            self.nodes[child].parent = None;
            self.destroy(child);
        }
        self.nodes[node].text = text.to_string();
    }

    /// Append text to the node's own text
    pub fn push_text(&mut self, node: NodeId, text: &str) {
        if let Some(n) = self.nodes.get_mut(node) {
            n.text.push_str(text);
        }
    }

    pub fn value(&self, node: NodeId) -> &str {
        self.nodes.get(node).map(|n| n.value()).unwrap_or("")
    }

    pub fn set_value(&mut self, node: NodeId, value: &str) {
        if let Some(n) = self.nodes.get_mut(node) {
            n.value = value.to_string();
        }
    }

    /// Set both the current value and the value restored by a form reset
    pub fn set_default_value(&mut self, node: NodeId, value: &str) {
        if let Some(n) = self.nodes.get_mut(node) {
            n.value = value.to_string();
            n.default_value = value.to_string();
        }
    }

    /// Restore every control inside `form` to its default value
    pub fn reset_form(&mut self, form: NodeId) {
        for id in self.descendants(form) {
            let n = &mut self.nodes[id];
            n.value = n.default_value.clone();
        }
    }

    pub fn bounds(&self, node: NodeId) -> Rect {
        self.nodes.get(node).map(|n| n.bounds).unwrap_or_default()
    }

    pub fn set_bounds(&mut self, node: NodeId, bounds: Rect) {
        if let Some(n) = self.nodes.get_mut(node) {
            n.bounds = bounds;
        }
    }

    /// Layout box relative to the viewport
    pub fn bounding_client_rect(&self, node: NodeId) -> Rect {
        self.bounds(node)
            .offset(-self.viewport.scroll_x, -self.viewport.scroll_y)
    }
}

/// Iterator over a node and its ancestors
pub struct Ancestors<'a> {
    doc: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.doc.parent(current);
        Some(current)
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Fluent builder returned by [`Document::element`]
pub struct NodeBuilder<'a> {
    doc: &'a mut Document,
    id: NodeId,
}

impl NodeBuilder<'_> {
    pub fn with_id(self, id: &str) -> Self {
        self.doc.set_attr(self.id, "id", id);
        self
    }

    pub fn class(self, class: &str) -> Self {
        for c in class.split_whitespace() {
            self.doc.add_class(self.id, c);
        }
        self
    }

    pub fn attr(self, name: &str, value: &str) -> Self {
        self.doc.set_attr(self.id, name, value);
        self
    }

    pub fn style(self, property: &str, value: &str) -> Self {
        self.doc.set_style(self.id, property, value);
        self
    }

    pub fn text(self, text: &str) -> Self {
        self.doc.push_text(self.id, text);
        self
    }

    /// Initial form value, also used when the form is reset
    pub fn value(self, value: &str) -> Self {
        self.doc.set_default_value(self.id, value);
        self
    }

    pub fn bounds(self, bounds: Rect) -> Self {
        self.doc.set_bounds(self.id, bounds);
        self
    }

    pub fn node(self) -> NodeId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_document_structure() {
        let doc = Document::new();
        assert_eq!(doc.tag(doc.root()), Some("html"));
        assert_eq!(doc.children(doc.root()), &[doc.head(), doc.body()]);
        assert!(doc.is_attached(doc.body()));
    }

    #[test]
    fn test_append_and_detach() {
        let mut doc = Document::new();
        let body = doc.body();
        let div = doc.element(body, "div").node();
        assert!(doc.is_attached(div));

        assert!(doc.detach(div));
        assert!(!doc.is_attached(div));
        assert!(doc.exists(div));
        assert!(!doc.detach(div));
    }

    #[test]
    fn test_append_into_own_subtree_ignored() {
        let mut doc = Document::new();
        let body = doc.body();
        let outer = doc.element(body, "div").node();
        let inner = doc.element(outer, "div").node();

        doc.append_child(inner, outer);
        assert_eq!(doc.parent(outer), Some(body));
    }

    #[test]
    fn test_destroy_frees_subtree() {
        let mut doc = Document::new();
        let body = doc.body();
        let outer = doc.element(body, "div").node();
        let inner = doc.element(outer, "span").node();

        doc.destroy(outer);
        assert!(!doc.exists(outer));
        assert!(!doc.exists(inner));
        assert!(doc.children(body).is_empty());
    }

    #[test]
    fn test_class_operations() {
        let mut doc = Document::new();
        let body = doc.body();
        let el = doc.element(body, "div").class("card").node();

        doc.add_class(el, "visible");
        doc.add_class(el, "visible");
        assert_eq!(doc.classes(el), &["card".to_string(), "visible".to_string()]);

        assert!(!doc.toggle_class(el, "visible"));
        assert!(doc.toggle_class(el, "active"));
        assert!(doc.has_class(el, "active"));
    }

    #[test]
    fn test_text_content_concatenates_descendants() {
        let mut doc = Document::new();
        let body = doc.body();
        let button = doc.element(body, "button").text("→ ").node();
        doc.element(button, "span").text("Invest");

        assert_eq!(doc.text_content(button), "→ Invest");

        doc.set_text_content(button, "Done");
        assert_eq!(doc.text_content(button), "Done");
        assert!(doc.children(button).is_empty());
    }

    #[test]
    fn test_empty_style_value_removes_property() {
        let mut doc = Document::new();
        let body = doc.body();
        doc.set_style(body, "overflow", "hidden");
        assert_eq!(doc.style(body, "overflow"), Some("hidden"));

        doc.set_style(body, "overflow", "");
        assert_eq!(doc.style(body, "overflow"), None);
    }

    #[test]
    fn test_reset_form_restores_defaults() {
        let mut doc = Document::new();
        let body = doc.body();
        let form = doc.element(body, "form").node();
        let name = doc.element(form, "input").value("guest").node();

        doc.set_value(name, "Rahim");
        doc.reset_form(form);
        assert_eq!(doc.value(name), "guest");
    }

    #[test]
    fn test_bounding_client_rect_follows_scroll() {
        let mut doc = Document::new();
        let body = doc.body();
        let el = doc
            .element(body, "div")
            .bounds(Rect::new(0.0, 900.0, 100.0, 100.0))
            .node();

        doc.scroll_to(400.0);
        assert_eq!(doc.bounding_client_rect(el).top(), 500.0);

        doc.scroll_to(-20.0);
        assert_eq!(doc.scroll_y(), 0.0);
    }

    #[test]
    fn test_rect_intersection_edge_inclusive() {
        let a = Rect::new(0.0, 0.0, 100.0, 100.0);
        let b = Rect::new(0.0, 100.0, 100.0, 50.0);
        let touch = a.intersection(&b).unwrap();
        assert_eq!(touch.area(), 0.0);

        let c = Rect::new(0.0, 101.0, 10.0, 10.0);
        assert!(a.intersection(&c).is_none());
    }

    #[test]
    fn test_css_number() {
        assert_eq!(css_number(0.0), "0");
        assert_eq!(css_number(-0.0), "0");
        assert_eq!(css_number(2.5), "2.5");
        assert_eq!(css_number(40.0), "40");
    }

    #[test]
    fn test_element_by_id_ignores_detached() {
        let mut doc = Document::new();
        let body = doc.body();
        let el = doc.element(body, "section").with_id("farm").node();
        assert_eq!(doc.element_by_id("farm"), Some(el));

        doc.detach(el);
        assert_eq!(doc.element_by_id("farm"), None);
    }
}

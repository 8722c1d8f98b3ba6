// ============================================================================
// spark-components - DOM Nodes
// Element and text nodes in a parent-owned tree
// ============================================================================
//
// Ownership: a parent holds strong references to its children, a child holds
// a weak reference to its parent. Detaching a node clears that weak link, so
// `parent()` on a removed node is always `None`.
// ============================================================================

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use html_escape::{encode_double_quoted_attribute_to_string, encode_text_to_string};
use indexmap::IndexMap;

use super::event::{self, Event, Listener};
use super::parse;
use super::selector::Selector;
use crate::error::Result;

/// Elements that never have children or a closing tag
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

pub fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

pub(crate) enum NodeKind {
    Element {
        tag: String,
        attributes: IndexMap<String, String>,
    },
    Text(String),
}

pub(crate) struct NodeData {
    kind: NodeKind,
    parent: Weak<RefCell<NodeData>>,
    children: Vec<Node>,
    listeners: Vec<(String, Listener)>,
}

/// Shared handle to a node. Clones refer to the same node.
#[derive(Clone)]
pub struct Node(Rc<RefCell<NodeData>>);

impl Node {
    fn from_kind(kind: NodeKind) -> Self {
        Node(Rc::new(RefCell::new(NodeData {
            kind,
            parent: Weak::new(),
            children: Vec::new(),
            listeners: Vec::new(),
        })))
    }

    /// A detached element. The tag name is lowercased.
    pub fn element(tag: &str) -> Self {
        Self::from_kind(NodeKind::Element {
            tag: tag.to_ascii_lowercase(),
            attributes: IndexMap::new(),
        })
    }

    /// A detached text node
    pub fn text(content: impl Into<String>) -> Self {
        Self::from_kind(NodeKind::Text(content.into()))
    }

    pub fn ptr_eq(&self, other: &Node) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn is_element(&self) -> bool {
        matches!(self.0.borrow().kind, NodeKind::Element { .. })
    }

    pub fn is_text(&self) -> bool {
        matches!(self.0.borrow().kind, NodeKind::Text(_))
    }

    /// Lowercased tag name, `None` for text nodes
    pub fn tag_name(&self) -> Option<String> {
        match &self.0.borrow().kind {
            NodeKind::Element { tag, .. } => Some(tag.clone()),
            NodeKind::Text(_) => None,
        }
    }

    pub(crate) fn has_tag(&self, name: &str) -> bool {
        matches!(&self.0.borrow().kind, NodeKind::Element { tag, .. } if tag == name)
    }

    // =========================================================================
    // TREE
    // =========================================================================

    pub fn parent(&self) -> Option<Node> {
        self.0.borrow().parent.upgrade().map(Node)
    }

    pub fn children(&self) -> Vec<Node> {
        self.0.borrow().children.clone()
    }

    pub fn element_children(&self) -> Vec<Node> {
        self.children().into_iter().filter(Node::is_element).collect()
    }

    pub fn first_child(&self) -> Option<Node> {
        self.0.borrow().children.first().cloned()
    }

    pub fn child_count(&self) -> usize {
        self.0.borrow().children.len()
    }

    /// Whether `other` is this node or one of its descendants.
    pub fn contains(&self, other: &Node) -> bool {
        let mut cursor = Some(other.clone());
        while let Some(node) = cursor {
            if node.ptr_eq(self) {
                return true;
            }
            cursor = node.parent();
        }
        false
    }

    /// Append `child`, detaching it from its current parent first.
    ///
    /// Appending an ancestor (or the node itself) is ignored.
    pub fn append_child(&self, child: &Node) {
        if child.contains(self) {
            tracing::warn!("refusing to append a node to its own descendant");
            return;
        }
        child.remove();
        child.0.borrow_mut().parent = Rc::downgrade(&self.0);
        self.0.borrow_mut().children.push(child.clone());
    }

    /// Remove `child` from this node's children. Returns false when `child`
    /// is not a child of this node.
    pub fn remove_child(&self, child: &Node) -> bool {
        let removed = {
            let mut data = self.0.borrow_mut();
            let before = data.children.len();
            data.children.retain(|c| !c.ptr_eq(child));
            data.children.len() != before
        };
        if removed {
            child.0.borrow_mut().parent = Weak::new();
        }
        removed
    }

    /// Detach this node from its parent, if any.
    pub fn remove(&self) {
        if let Some(parent) = self.parent() {
            parent.remove_child(self);
        }
    }

    /// Detach every child.
    pub fn clear_children(&self) {
        let children = std::mem::take(&mut self.0.borrow_mut().children);
        for child in children {
            child.0.borrow_mut().parent = Weak::new();
        }
    }

    /// Every descendant in document order (not including this node).
    pub fn descendants(&self) -> Vec<Node> {
        let mut out = Vec::new();
        self.collect_descendants(&mut out);
        out
    }

    fn collect_descendants(&self, out: &mut Vec<Node>) {
        for child in self.children() {
            out.push(child.clone());
            child.collect_descendants(out);
        }
    }

    // =========================================================================
    // ATTRIBUTES
    // =========================================================================

    pub fn get_attribute(&self, name: &str) -> Option<String> {
        match &self.0.borrow().kind {
            NodeKind::Element { attributes, .. } => {
                attributes.get(&name.to_ascii_lowercase()).cloned()
            }
            NodeKind::Text(_) => None,
        }
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.get_attribute(name).is_some()
    }

    /// Set an attribute. Ignored on text nodes.
    pub fn set_attribute(&self, name: &str, value: impl Into<String>) {
        if let NodeKind::Element { attributes, .. } = &mut self.0.borrow_mut().kind {
            attributes.insert(name.to_ascii_lowercase(), value.into());
        }
    }

    pub fn remove_attribute(&self, name: &str) -> Option<String> {
        match &mut self.0.borrow_mut().kind {
            NodeKind::Element { attributes, .. } => {
                attributes.shift_remove(&name.to_ascii_lowercase())
            }
            NodeKind::Text(_) => None,
        }
    }

    /// Attributes in source order
    pub fn attributes(&self) -> Vec<(String, String)> {
        match &self.0.borrow().kind {
            NodeKind::Element { attributes, .. } => attributes
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            NodeKind::Text(_) => Vec::new(),
        }
    }

    pub fn id(&self) -> Option<String> {
        self.get_attribute("id")
    }

    pub fn class_list(&self) -> Vec<String> {
        self.get_attribute("class")
            .map(|classes| classes.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.class_list().iter().any(|c| c == class)
    }

    // =========================================================================
    // INLINE STYLE
    // =========================================================================

    fn style_map(&self) -> IndexMap<String, String> {
        let Some(style) = self.get_attribute("style") else {
            return IndexMap::new();
        };
        style
            .split(';')
            .filter_map(|decl| {
                let (prop, value) = decl.split_once(':')?;
                let prop = prop.trim();
                (!prop.is_empty()).then(|| (prop.to_ascii_lowercase(), value.trim().to_string()))
            })
            .collect()
    }

    /// Value of one inline style property
    pub fn style(&self, property: &str) -> Option<String> {
        self.style_map().shift_remove(&property.to_ascii_lowercase())
    }

    /// Set one inline style property; an empty value removes it.
    pub fn set_style(&self, property: &str, value: &str) {
        let mut styles = self.style_map();
        let property = property.to_ascii_lowercase();
        if value.is_empty() {
            styles.shift_remove(&property);
        } else {
            styles.insert(property, value.to_string());
        }

        if styles.is_empty() {
            self.remove_attribute("style");
        } else {
            let css = styles
                .iter()
                .map(|(prop, value)| format!("{prop}: {value};"))
                .collect::<Vec<_>>()
                .join(" ");
            self.set_attribute("style", css);
        }
    }

    // =========================================================================
    // CONTENT
    // =========================================================================

    /// Concatenated text of this node and its descendants
    pub fn text_content(&self) -> String {
        match &self.0.borrow().kind {
            NodeKind::Text(text) => return text.clone(),
            NodeKind::Element { .. } => {}
        }
        self.children().iter().map(Node::text_content).collect()
    }

    /// Replace the children with a single text node (or update a text node).
    pub fn set_text_content(&self, text: impl Into<String>) {
        let text = text.into();
        if let NodeKind::Text(content) = &mut self.0.borrow_mut().kind {
            *content = text;
            return;
        }
        self.clear_children();
        if !text.is_empty() {
            self.append_child(&Node::text(text));
        }
    }

    pub fn inner_html(&self) -> String {
        let mut out = String::new();
        for child in self.children() {
            child.write_html(&mut out);
        }
        out
    }

    /// Replace every child with the nodes parsed from `markup`.
    pub fn set_inner_html(&self, markup: &str) {
        self.clear_children();
        for node in parse::parse_fragment(markup) {
            self.append_child(&node);
        }
    }

    pub fn outer_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        let data = self.0.borrow();
        match &data.kind {
            NodeKind::Text(text) => {
                encode_text_to_string(text, out);
            }
            NodeKind::Element { tag, attributes } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attributes {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    encode_double_quoted_attribute_to_string(value, out);
                    out.push('"');
                }
                out.push('>');
                if is_void_element(tag) {
                    return;
                }
                for child in &data.children {
                    child.write_html(out);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// First descendant element matching `selector`.
    pub fn query_selector(&self, selector: &str) -> Result<Option<Node>> {
        let selector = Selector::parse(selector)?;
        Ok(self.descendants().into_iter().find(|n| selector.matches(n)))
    }

    /// Every descendant element matching `selector`, in document order.
    pub fn query_selector_all(&self, selector: &str) -> Result<Vec<Node>> {
        let selector = Selector::parse(selector)?;
        Ok(self
            .descendants()
            .into_iter()
            .filter(|n| selector.matches(n))
            .collect())
    }

    pub fn matches(&self, selector: &str) -> Result<bool> {
        Ok(Selector::parse(selector)?.matches(self))
    }

    // =========================================================================
    // EVENTS
    // =========================================================================

    pub fn add_event_listener<F>(&self, kind: &str, listener: F)
    where
        F: Fn(&Event) + 'static,
    {
        self.0
            .borrow_mut()
            .listeners
            .push((kind.to_ascii_lowercase(), Rc::new(listener)));
    }

    /// Remove every listener for `kind`, returning how many were removed.
    pub fn remove_event_listeners(&self, kind: &str) -> usize {
        let kind = kind.to_ascii_lowercase();
        let mut data = self.0.borrow_mut();
        let before = data.listeners.len();
        data.listeners.retain(|(k, _)| *k != kind);
        before - data.listeners.len()
    }

    pub fn listener_count(&self, kind: &str) -> usize {
        let kind = kind.to_ascii_lowercase();
        self.0
            .borrow()
            .listeners
            .iter()
            .filter(|(k, _)| *k == kind)
            .count()
    }

    pub(crate) fn listeners_for(&self, kind: &str) -> Vec<Listener> {
        self.0
            .borrow()
            .listeners
            .iter()
            .filter(|(k, _)| k == kind)
            .map(|(_, listener)| listener.clone())
            .collect()
    }

    /// Dispatch `event` with this node as target. Returns false when a
    /// listener prevented the default action.
    pub fn dispatch_event(&self, event: &Event) -> bool {
        event::dispatch(self, event)
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0.borrow().kind {
            NodeKind::Text(text) => f.debug_tuple("Text").field(text).finish(),
            NodeKind::Element { tag, attributes } => f
                .debug_struct("Element")
                .field("tag", tag)
                .field("attributes", attributes)
                .field("children", &self.0.borrow().children.len())
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_moves_nodes_between_parents() {
        let a = Node::element("div");
        let b = Node::element("div");
        let child = Node::element("span");

        a.append_child(&child);
        assert!(child.parent().is_some_and(|p| p.ptr_eq(&a)));

        b.append_child(&child);
        assert_eq!(a.child_count(), 0);
        assert_eq!(b.child_count(), 1);
        assert!(child.parent().is_some_and(|p| p.ptr_eq(&b)));
    }

    #[test]
    fn appending_an_ancestor_is_refused() {
        let outer = Node::element("div");
        let inner = Node::element("div");
        outer.append_child(&inner);

        inner.append_child(&outer);
        assert!(outer.parent().is_none());
        assert_eq!(inner.child_count(), 0);
    }

    #[test]
    fn removed_nodes_have_no_parent() {
        let parent = Node::element("ul");
        let item = Node::element("li");
        parent.append_child(&item);

        item.remove();
        assert!(item.parent().is_none());
        assert_eq!(parent.child_count(), 0);
        assert!(!parent.remove_child(&item));
    }

    #[test]
    fn attributes_keep_source_order_and_lowercase_names() {
        let el = Node::element("INPUT");
        el.set_attribute("Type", "text");
        el.set_attribute("value", "a\"b");

        assert_eq!(el.tag_name().as_deref(), Some("input"));
        assert_eq!(el.get_attribute("type").as_deref(), Some("text"));
        assert_eq!(el.outer_html(), r#"<input type="text" value="a&quot;b">"#);

        assert_eq!(el.remove_attribute("TYPE").as_deref(), Some("text"));
        assert!(!el.has_attribute("type"));
    }

    #[test]
    fn inline_styles() {
        let el = Node::element("p");
        el.set_style("color", "red");
        el.set_style("font-weight", "bold");
        assert_eq!(el.get_attribute("style").as_deref(), Some("color: red; font-weight: bold;"));
        assert_eq!(el.style("color").as_deref(), Some("red"));

        el.set_style("color", "");
        assert_eq!(el.style("color"), None);
        el.set_style("font-weight", "");
        assert!(!el.has_attribute("style"));
    }

    #[test]
    fn inner_html_round_trip() {
        let root = Node::element("div");
        root.set_inner_html(r#"<p class="a b">Hi <b>there</b></p><br><span></span>"#);

        assert_eq!(root.child_count(), 3);
        assert_eq!(
            root.inner_html(),
            r#"<p class="a b">Hi <b>there</b></p><br><span></span>"#
        );
        assert_eq!(root.text_content(), "Hi there");
        assert!(root.children()[0].has_class("b"));
    }

    #[test]
    fn set_inner_html_detaches_old_children() {
        let root = Node::element("div");
        root.set_inner_html("<p>one</p>");
        let old = root.children()[0].clone();

        root.set_inner_html("<p>two</p>");
        assert!(old.parent().is_none());
        assert_eq!(root.text_content(), "two");
    }

    #[test]
    fn text_content_setter() {
        let root = Node::element("div");
        root.set_inner_html("<b>x</b><i>y</i>");
        root.set_text_content("plain");
        assert_eq!(root.inner_html(), "plain");
    }

    #[test]
    fn queries_search_descendants_in_document_order() {
        let root = Node::element("div");
        root.set_inner_html(r#"<ul id="list"><li class="item">a</li><li class="item on">b</li></ul>"#);

        let items = root.query_selector_all("li.item").unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].text_content(), "b");

        let on = root.query_selector("#list > .on").unwrap().unwrap();
        assert_eq!(on.text_content(), "b");
        assert!(root.query_selector("table").unwrap().is_none());
        assert!(root.query_selector("[").is_err());
    }
}

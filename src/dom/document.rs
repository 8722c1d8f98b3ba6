// ============================================================================
// spark-components - Document
// The tree components render into and mount onto
// ============================================================================

use super::node::Node;
use crate::error::Result;

/// An in-memory document: `<html><body></body></html>`.
///
/// Cloning is cheap; clones share the same tree.
#[derive(Clone, Debug)]
pub struct Document {
    root: Node,
    body: Node,
}

impl Document {
    pub fn new() -> Self {
        let root = Node::element("html");
        let body = Node::element("body");
        root.append_child(&body);
        Self { root, body }
    }

    /// A document whose body starts with `markup`.
    pub fn with_body(markup: &str) -> Self {
        let document = Self::new();
        document.body.set_inner_html(markup);
        document
    }

    pub fn document_element(&self) -> &Node {
        &self.root
    }

    pub fn body(&self) -> &Node {
        &self.body
    }

    pub fn create_element(&self, tag: &str) -> Node {
        Node::element(tag)
    }

    pub fn create_text_node(&self, text: &str) -> Node {
        Node::text(text)
    }

    pub fn query_selector(&self, selector: &str) -> Result<Option<Node>> {
        self.root.query_selector(selector)
    }

    pub fn query_selector_all(&self, selector: &str) -> Result<Vec<Node>> {
        self.root.query_selector_all(selector)
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<Node> {
        self.root
            .descendants()
            .into_iter()
            .find(|node| node.id().as_deref() == Some(id))
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

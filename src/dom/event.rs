// ============================================================================
// spark-components - DOM Events
// Events dispatched through the element tree, bubbling from the target
// ============================================================================

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use serde_json::Value;

use super::node::Node;

/// Callback attached with [`Node::add_event_listener`]
pub type Listener = Rc<dyn Fn(&Event)>;

/// An event travelling from its target up through the target's ancestors.
///
/// Listeners receive `&Event`; propagation and default flags use interior
/// mutability so a listener can stop the event without owning it.
pub struct Event {
    kind: String,
    detail: Value,
    bubbles: bool,
    target: RefCell<Option<Node>>,
    current_target: RefCell<Option<Node>>,
    propagation_stopped: Cell<bool>,
    default_prevented: Cell<bool>,
}

impl Event {
    /// A bubbling event with no detail
    pub fn new(kind: impl Into<String>) -> Self {
        Self::with_detail(kind, Value::Null)
    }

    /// A bubbling event carrying `detail`
    pub fn with_detail(kind: impl Into<String>, detail: Value) -> Self {
        Self {
            kind: kind.into().to_ascii_lowercase(),
            detail,
            bubbles: true,
            target: RefCell::new(None),
            current_target: RefCell::new(None),
            propagation_stopped: Cell::new(false),
            default_prevented: Cell::new(false),
        }
    }

    /// Builder: restrict delivery to the target itself.
    pub fn non_bubbling(mut self) -> Self {
        self.bubbles = false;
        self
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn detail(&self) -> &Value {
        &self.detail
    }

    pub fn bubbles(&self) -> bool {
        self.bubbles
    }

    /// Node the event was dispatched on
    pub fn target(&self) -> Option<Node> {
        self.target.borrow().clone()
    }

    /// Node whose listeners are currently running
    pub fn current_target(&self) -> Option<Node> {
        self.current_target.borrow().clone()
    }

    /// Finish the current node's listeners, then stop.
    pub fn stop_propagation(&self) {
        self.propagation_stopped.set(true);
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped.get()
    }

    pub fn prevent_default(&self) {
        self.default_prevented.set(true);
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented.get()
    }

    pub(crate) fn set_target(&self, node: &Node) {
        *self.target.borrow_mut() = Some(node.clone());
    }

    pub(crate) fn set_current_target(&self, node: Option<&Node>) {
        *self.current_target.borrow_mut() = node.cloned();
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("kind", &self.kind)
            .field("detail", &self.detail)
            .field("bubbles", &self.bubbles)
            .field("propagation_stopped", &self.propagation_stopped.get())
            .field("default_prevented", &self.default_prevented.get())
            .finish()
    }
}

// =============================================================================
// DISPATCH
// =============================================================================

/// Deliver `event` to `target` and, when it bubbles, each ancestor in turn.
///
/// Listeners of a node are collected before any of them runs, so a listener
/// may add or remove listeners (or replace the subtree) without affecting the
/// current delivery. Returns false when a listener called
/// [`Event::prevent_default`].
pub(crate) fn dispatch(target: &Node, event: &Event) -> bool {
    event.set_target(target);

    let mut path = vec![target.clone()];
    if event.bubbles {
        let mut cursor = target.parent();
        while let Some(node) = cursor {
            cursor = node.parent();
            path.push(node);
        }
    }

    for node in &path {
        let listeners = node.listeners_for(&event.kind);
        if listeners.is_empty() {
            continue;
        }
        event.set_current_target(Some(node));
        for listener in listeners {
            listener(event);
        }
        if event.is_propagation_stopped() {
            break;
        }
    }

    event.set_current_target(None);
    !event.is_default_prevented()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tree() -> (Node, Node, Node) {
        let outer = Node::element("div");
        let inner = Node::element("section");
        let button = Node::element("button");
        outer.append_child(&inner);
        inner.append_child(&button);
        (outer, inner, button)
    }

    fn recorder(log: &Rc<RefCell<Vec<String>>>, label: &'static str) -> impl Fn(&Event) + 'static {
        let log = log.clone();
        move |event: &Event| {
            let current = event
                .current_target()
                .and_then(|n| n.tag_name())
                .unwrap_or_default();
            log.borrow_mut().push(format!("{label}@{current}"));
        }
    }

    #[test]
    fn events_bubble_from_target_to_root() {
        let (outer, inner, button) = tree();
        let log = Rc::new(RefCell::new(Vec::new()));

        outer.add_event_listener("click", recorder(&log, "outer"));
        inner.add_event_listener("click", recorder(&log, "inner"));
        button.add_event_listener("click", recorder(&log, "button"));

        assert!(button.dispatch_event(&Event::new("click")));
        assert_eq!(
            *log.borrow(),
            vec!["button@button", "inner@section", "outer@div"]
        );
    }

    #[test]
    fn stop_propagation_finishes_the_current_node() {
        let (outer, _inner, button) = tree();
        let log = Rc::new(RefCell::new(Vec::new()));

        button.add_event_listener("click", |event: &Event| event.stop_propagation());
        button.add_event_listener("click", recorder(&log, "second"));
        outer.add_event_listener("click", recorder(&log, "outer"));

        button.dispatch_event(&Event::new("click"));
        assert_eq!(*log.borrow(), vec!["second@button"]);
    }

    #[test]
    fn non_bubbling_events_stay_on_the_target() {
        let (outer, _inner, button) = tree();
        let log = Rc::new(RefCell::new(Vec::new()));
        outer.add_event_listener("focus", recorder(&log, "outer"));

        button.dispatch_event(&Event::new("focus").non_bubbling());
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn prevent_default_is_reported_and_detail_is_visible() {
        let (_outer, _inner, button) = tree();
        let seen = Rc::new(RefCell::new(Value::Null));
        let sink = seen.clone();
        button.add_event_listener("submit", move |event: &Event| {
            *sink.borrow_mut() = event.detail().clone();
            event.prevent_default();
        });

        let event = Event::with_detail("submit", json!({ "id": 7 }));
        assert!(!button.dispatch_event(&event));
        assert_eq!(*seen.borrow(), json!({ "id": 7 }));
        assert!(event.target().is_some_and(|t| t.ptr_eq(&button)));
        assert!(event.current_target().is_none());
    }

    #[test]
    fn event_kinds_are_case_insensitive() {
        let (_outer, _inner, button) = tree();
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        button.add_event_listener("Click", move |_: &Event| h.set(h.get() + 1));

        button.dispatch_event(&Event::new("CLICK"));
        assert_eq!(hits.get(), 1);
    }
}

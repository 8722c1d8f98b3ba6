// ============================================================================
// spark-components - Event Binding
// `@event="method"` / `v-on:event="method"` wired to component methods
// ============================================================================
//
// Binding is driven from the rendered tree rather than the template text, so
// a listener lands on exactly the element that declared it. Listeners belong
// to nodes that the next render throws away; they never pile up.
// ============================================================================

use std::rc::Rc;

use indexmap::IndexMap;

use crate::core::constants::{EVENT_PREFIX, EVENT_SHORTHAND};
use crate::dom::{Event, Node};
use crate::reactivity::State;

/// A component method. Receives the component state and, when called from a
/// DOM event, the event.
pub type Method = Rc<dyn Fn(&State, Option<&Event>)>;

/// Methods by name, in registration order
pub type Methods = IndexMap<String, Method>;

/// The event an attribute listens for, if it is an event binding.
pub fn event_kind(attribute: &str) -> Option<&str> {
    attribute
        .strip_prefix(EVENT_SHORTHAND)
        .or_else(|| attribute.strip_prefix(EVENT_PREFIX))
        .filter(|kind| !kind.is_empty())
}

/// Method name from an attribute value; `inc()` and `inc` both name `inc`.
pub fn method_name(value: &str) -> &str {
    let value = value.trim();
    value.strip_suffix("()").unwrap_or(value).trim_end()
}

/// Attach a listener for every event binding under `root`. Returns the number
/// of listeners attached.
pub fn bind_events(root: &Node, methods: &Methods, state: &State) -> usize {
    let mut bound = 0;

    for element in root.descendants().into_iter().filter(Node::is_element) {
        for (attribute, value) in element.attributes() {
            let Some(kind) = event_kind(&attribute) else {
                continue;
            };
            let name = method_name(&value);
            let Some(method) = methods.get(name) else {
                tracing::warn!(event = kind, method = name, "no such method; binding skipped");
                continue;
            };

            let method = method.clone();
            let state = state.clone();
            element.add_event_listener(kind, move |event| method(&state, Some(event)));
            bound += 1;
        }
    }

    tracing::trace!(bound, "events bound");
    bound
}

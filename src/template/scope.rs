// ============================================================================
// spark-components - Template Scope
// What names a template can see: the component state plus loop bindings
// ============================================================================

use serde_json::{Map, Value};

use crate::expr::{Environment, ExprError, JsValue};
use crate::reactivity::State;

/// Name under which conditions see the component state
pub const STATE_NAME: &str = "state";

/// Evaluation scope for one template pass.
///
/// Loop bindings are pushed innermost-last and shadow both outer bindings and
/// state fields. Every state read goes through [`State`], so rendering inside
/// a tracked computation subscribes it to exactly the fields the template
/// touched.
#[derive(Clone, Debug)]
pub struct Scope {
    state: State,
    bindings: Vec<(String, Value)>,
}

impl Scope {
    pub fn new(state: &State) -> Self {
        Self {
            state: state.clone(),
            bindings: Vec::new(),
        }
    }

    /// A child scope with `name` bound to `value`.
    pub fn with_binding(&self, name: &str, value: Value) -> Self {
        let mut child = self.clone();
        child.bindings.push((name.to_string(), value));
        child
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    /// Innermost loop binding named `name`
    pub fn binding(&self, name: &str) -> Option<&Value> {
        self.bindings
            .iter()
            .rev()
            .find(|(bound, _)| bound == name)
            .map(|(_, value)| value)
    }

    /// First segment of a path: a loop binding, else a state field (tracked).
    pub fn root(&self, name: &str) -> Option<Value> {
        match self.binding(name) {
            Some(value) => Some(value.clone()),
            None => self.state.get(name),
        }
    }

    /// Every state field, each read tracked.
    fn state_object(&self) -> Map<String, Value> {
        self.state
            .keys()
            .into_iter()
            .filter_map(|key| self.state.get(&key).map(|value| (key, value)))
            .collect()
    }
}

impl Environment for Scope {
    fn lookup(&self, name: &str) -> Option<JsValue> {
        if let Some(value) = self.binding(name) {
            return Some(JsValue::from(value.clone()));
        }
        (name == STATE_NAME).then(|| JsValue::Object(self.state_object()))
    }

    fn field(&self, name: &str, field: &str) -> Option<Result<JsValue, ExprError>> {
        if let Some(value) = self.binding(name) {
            return Some(JsValue::from(value.clone()).member(field));
        }
        (name == STATE_NAME).then(|| Ok(JsValue::from(self.state.get(field))))
    }
}

// ============================================================================
// spark-components - Template Values
// Dotted-path lookup and display of state values
// ============================================================================

use serde_json::Value;

use super::scope::Scope;

pub use crate::expr::display_value;

/// Whether a value counts as true in a template
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Step from `value` into `key`.
///
/// Only a truthy object or list can be stepped into: objects by key, lists by
/// index or `length`.
pub fn step(value: &Value, key: &str) -> Option<Value> {
    if !is_truthy(value) {
        return None;
    }
    match value {
        Value::Object(map) => map.get(key).cloned(),
        Value::Array(items) if key == "length" => Some(Value::from(items.len())),
        Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i).cloned()),
        _ => None,
    }
}

/// Resolve a dotted path such as `user.address.city` against `scope`.
///
/// The first segment names a loop binding or a state field; `None` means the
/// path does not resolve and the caller should leave its marker untouched.
pub fn resolve_path(scope: &Scope, path: &str) -> Option<Value> {
    let mut segments = path.split('.');
    let first = segments.next().filter(|s| !s.is_empty())?;
    let mut value = scope.root(first)?;
    for segment in segments {
        value = step(&value, segment)?;
    }
    Some(value)
}

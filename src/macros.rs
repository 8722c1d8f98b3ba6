// ============================================================================
// spark-components - Ergonomic Macros
// ============================================================================

/// Build a state map from a JSON object literal.
///
/// Anything other than an object literal yields an empty map.
///
/// ```rust
/// use spark_components::state;
///
/// let fields = state!({ "count": 0, "todos": ["a", "b"] });
/// assert_eq!(fields.len(), 2);
/// ```
#[macro_export]
macro_rules! state {
    ($($json:tt)+) => {
        match $crate::serde_json::json!($($json)+) {
            $crate::serde_json::Value::Object(map) => map,
            _ => $crate::serde_json::Map::new(),
        }
    };
}

/// Run a tracked computation with automatic variable capturing.
///
/// Wraps `run_tracked(ctx, { let a = a.clone(); move || ... })`.
///
/// ```rust
/// use spark_components::{make_reactive, state, tracked, ReactiveContext};
///
/// let ctx = ReactiveContext::shared();
/// let todo = make_reactive(&ctx, state!({ "done": false }));
///
/// let effect = tracked!(ctx; todo => {
///     let _ = todo.get("done");
/// });
/// todo.set("done", true);
/// assert_eq!(effect.run_count(), 2);
/// ```
#[macro_export]
macro_rules! tracked {
    ($ctx:expr; $($deps:ident),+ => $body:expr) => {
        $crate::run_tracked(&$ctx, {
            $( let $deps = $deps.clone(); )+
            move || $body
        })
    };
    ($ctx:expr; $body:expr) => {
        $crate::run_tracked(&$ctx, move || $body)
    };
}

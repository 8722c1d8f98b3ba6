// ============================================================================
// spark-components - Reactive State
// A field map whose reads are tracked and whose writes re-run dependents
// ============================================================================

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde_json::{Map, Value};

use crate::core::context::ReactiveContext;
use crate::core::types::{DepKey, StateId};
use crate::reactivity::tracking::{track_read, trigger};

/// The plain map a component's state is built from
pub type StateMap = Map<String, Value>;

struct StateInner {
    id: StateId,
    ctx: Rc<ReactiveContext>,
    fields: RefCell<StateMap>,
}

// =============================================================================
// STATE
// =============================================================================

/// Observable handle to one component's state.
///
/// Cloning is cheap and every clone observes the same fields. Reads through
/// [`get`](Self::get), [`with`](Self::with) and [`contains`](Self::contains)
/// are tracked; writes through [`set`](Self::set), [`update`](Self::update)
/// and [`merge`](Self::merge) re-run every computation that read the field,
/// before returning.
#[derive(Clone)]
pub struct State {
    inner: Rc<StateInner>,
}

impl State {
    pub fn id(&self) -> StateId {
        self.inner.id
    }

    pub fn context(&self) -> &Rc<ReactiveContext> {
        &self.inner.ctx
    }

    fn key(&self, field: &str) -> DepKey {
        DepKey::new(self.inner.id, field)
    }

    // =========================================================================
    // TRACKED READS
    // =========================================================================

    /// Read a field (cloning).
    pub fn get(&self, field: &str) -> Option<Value> {
        self.with(field, |value| value.cloned())
    }

    /// Read a field by reference.
    ///
    /// The closure must not write to this state.
    pub fn with<R>(&self, field: &str, f: impl FnOnce(Option<&Value>) -> R) -> R {
        track_read(&self.inner.ctx, &self.key(field));
        let fields = self.inner.fields.borrow();
        f(fields.get(field))
    }

    /// Whether the field exists. Tracked like a read, so a computation that
    /// tests for a field re-runs once it is written.
    pub fn contains(&self, field: &str) -> bool {
        self.with(field, |value| value.is_some())
    }

    // =========================================================================
    // WRITES
    // =========================================================================

    /// Store `value` in `field`, then re-run the field's dependents.
    ///
    /// Always triggers, even if the value is unchanged.
    pub fn set(&self, field: &str, value: impl Into<Value>) {
        self.inner
            .fields
            .borrow_mut()
            .insert(field.to_string(), value.into());
        trigger(&self.inner.ctx, &self.key(field));
    }

    /// Mutate a field in place (a missing field starts as `null`), then
    /// re-run its dependents.
    pub fn update(&self, field: &str, f: impl FnOnce(&mut Value)) {
        {
            let mut fields = self.inner.fields.borrow_mut();
            let slot = fields.entry(field.to_string()).or_insert(Value::Null);
            f(slot);
        }
        trigger(&self.inner.ctx, &self.key(field));
    }

    /// Shallow merge: one [`set`](Self::set) per entry, in order.
    pub fn merge(&self, partial: StateMap) {
        for (field, value) in partial {
            self.set(&field, value);
        }
    }

    // =========================================================================
    // UNTRACKED ACCESS
    // =========================================================================

    /// Read a field without registering a dependency.
    pub fn peek(&self, field: &str) -> Option<Value> {
        self.inner.fields.borrow().get(field).cloned()
    }

    /// Copy of every field, untracked.
    pub fn snapshot(&self) -> StateMap {
        self.inner.fields.borrow().clone()
    }

    /// Field names in declaration order, untracked.
    pub fn keys(&self) -> Vec<String> {
        self.inner.fields.borrow().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.fields.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.fields.borrow().is_empty()
    }

    /// Whether two handles observe the same state
    pub fn ptr_eq(&self, other: &State) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("id", &self.inner.id)
            .field("fields", &*self.inner.fields.borrow())
            .finish()
    }
}

// =============================================================================
// PUBLIC API
// =============================================================================

/// Wrap `fields` into an observable [`State`] tracked through `ctx`.
///
/// # Example
///
/// ```
/// use spark_components::{make_reactive, state, ReactiveContext};
///
/// let ctx = ReactiveContext::shared();
/// let todo = make_reactive(&ctx, state!({ "title": "write docs", "done": false }));
///
/// todo.set("done", true);
/// assert_eq!(todo.peek("done"), Some(serde_json::json!(true)));
/// ```
pub fn make_reactive(ctx: &Rc<ReactiveContext>, fields: StateMap) -> State {
    let id = ctx.next_state_id();
    tracing::trace!(state = %id, fields = fields.len(), "reactive state created");
    State {
        inner: Rc::new(StateInner {
            id,
            ctx: ctx.clone(),
            fields: RefCell::new(fields),
        }),
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactivity::effect::run_tracked;
    use serde_json::json;
    use std::cell::Cell;

    fn counter_state(ctx: &Rc<ReactiveContext>) -> State {
        let mut fields = Map::new();
        fields.insert("count".into(), json!(0));
        fields.insert("label".into(), json!("clicks"));
        make_reactive(ctx, fields)
    }

    #[test]
    fn reads_and_writes() {
        let ctx = ReactiveContext::shared();
        let state = counter_state(&ctx);

        assert_eq!(state.get("count"), Some(json!(0)));
        assert_eq!(state.get("missing"), None);

        state.set("count", 3);
        state.set("extra", "new");

        assert_eq!(state.peek("count"), Some(json!(3)));
        assert_eq!(state.keys(), vec!["count", "label", "extra"]);
    }

    #[test]
    fn reads_outside_computations_register_nothing() {
        let ctx = ReactiveContext::shared();
        let state = counter_state(&ctx);
        let _ = state.get("count");
        assert!(ctx.registry().is_empty());
    }

    #[test]
    fn peek_is_untracked() {
        let ctx = ReactiveContext::shared();
        let state = counter_state(&ctx);
        let runs = Rc::new(Cell::new(0));

        let s = state.clone();
        let r = runs.clone();
        let _effect = run_tracked(&ctx, move || {
            let _ = s.peek("count");
            let _ = s.snapshot();
            r.set(r.get() + 1);
        });

        state.set("count", 1);
        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn contains_tracks_the_field() {
        let ctx = ReactiveContext::shared();
        let state = counter_state(&ctx);
        let seen = Rc::new(Cell::new(false));

        let s = state.clone();
        let flag = seen.clone();
        let _effect = run_tracked(&ctx, move || flag.set(s.contains("late")));

        assert!(!seen.get());
        state.set("late", 1);
        assert!(seen.get());
    }

    #[test]
    fn update_mutates_in_place_and_triggers() {
        let ctx = ReactiveContext::shared();
        let mut fields = Map::new();
        fields.insert("items".into(), json!(["a"]));
        let state = make_reactive(&ctx, fields);
        let lengths = Rc::new(RefCell::new(Vec::new()));

        let s = state.clone();
        let l = lengths.clone();
        let _effect = run_tracked(&ctx, move || {
            let len = s.with("items", |v| v.and_then(Value::as_array).map_or(0, Vec::len));
            l.borrow_mut().push(len);
        });

        state.update("items", |items| {
            if let Some(list) = items.as_array_mut() {
                list.push(json!("b"));
            }
        });

        assert_eq!(*lengths.borrow(), vec![1, 2]);
    }

    #[test]
    fn merge_writes_each_key_in_order() {
        let ctx = ReactiveContext::shared();
        let state = counter_state(&ctx);
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut effects = Vec::new();

        for field in ["count", "label"] {
            let s = state.clone();
            let l = log.clone();
            effects.push(run_tracked(&ctx, move || {
                let _ = s.get(field);
                l.borrow_mut().push(field);
            }));
        }
        log.borrow_mut().clear();

        let mut partial = Map::new();
        partial.insert("label".into(), json!("taps"));
        partial.insert("count".into(), json!(9));
        state.merge(partial);

        assert_eq!(*log.borrow(), vec!["label", "count"]);
        assert_eq!(state.peek("count"), Some(json!(9)));
    }

    #[test]
    fn separate_states_do_not_share_fields() {
        let ctx = ReactiveContext::shared();
        let a = counter_state(&ctx);
        let b = counter_state(&ctx);
        let runs = Rc::new(Cell::new(0));

        let s = a.clone();
        let r = runs.clone();
        let _effect = run_tracked(&ctx, move || {
            let _ = s.get("count");
            r.set(r.get() + 1);
        });

        b.set("count", 5);
        assert_eq!(runs.get(), 1);
        a.set("count", 5);
        assert_eq!(runs.get(), 2);
        assert!(!a.ptr_eq(&b));
    }
}

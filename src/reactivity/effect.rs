// ============================================================================
// spark-components - Tracked Computations
// Functions that re-run whenever a field they last read is written
// ============================================================================
//
// An effect runs immediately when created. While it runs it is the active
// computation of its context, so every tracked read subscribes it. When the
// run finishes, subscriptions the run did not renew are pruned, so the
// registry always reflects the most recent run.
//
// Effect bodies are `Fn`, not `FnMut`: a body may legitimately re-enter itself
// (a write inside the body triggers the same effect), and the body is cloned
// out of its cell before being called so no borrow is held across the call.
// ============================================================================

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::core::constants::*;
use crate::core::context::{ReactiveContext, TrackingFrame};
use crate::core::types::{DepKey, EffectId, Reaction};

/// Body of a tracked computation
pub type EffectFn = Rc<dyn Fn()>;

// =============================================================================
// EFFECT INNER
// =============================================================================

pub struct EffectInner {
    id: EffectId,
    ctx: Rc<ReactiveContext>,
    flags: Cell<u32>,
    runs: Cell<u64>,
    func: RefCell<Option<EffectFn>>,
    self_weak: RefCell<Weak<EffectInner>>,
}

impl EffectInner {
    fn new(ctx: &Rc<ReactiveContext>, flags: u32, func: EffectFn) -> Rc<Self> {
        let effect = Rc::new(Self {
            id: ctx.next_effect_id(),
            ctx: ctx.clone(),
            flags: Cell::new(EFFECT | flags),
            runs: Cell::new(0),
            func: RefCell::new(Some(func)),
            self_weak: RefCell::new(Weak::new()),
        });
        *effect.self_weak.borrow_mut() = Rc::downgrade(&effect);
        effect
    }

    pub fn id(&self) -> EffectId {
        self.id
    }

    pub fn flags(&self) -> u32 {
        self.flags.get()
    }

    fn set_flag(&self, flag: u32) {
        self.flags.set(self.flags.get() | flag);
    }

    fn clear_flag(&self, flag: u32) {
        self.flags.set(self.flags.get() & !flag);
    }
}

impl Reaction for EffectInner {
    fn id(&self) -> EffectId {
        self.id
    }

    fn run(&self) {
        let this = self.self_weak.borrow().upgrade();
        if let Some(this) = this {
            run_effect(&this);
        }
    }

    fn is_disposed(&self) -> bool {
        self.flags.get() & DESTROYED != 0
    }
}

// =============================================================================
// RUN
// =============================================================================

/// Execute one run of `effect` with dependency tracking.
pub(crate) fn run_effect(effect: &Rc<EffectInner>) {
    if effect.is_disposed() {
        return;
    }

    let func = effect.func.borrow().clone();
    let Some(func) = func else {
        return;
    };

    let reaction: Rc<dyn Reaction> = effect.clone();
    let previous = effect
        .ctx
        .enter_frame(TrackingFrame::new(effect.id, Rc::downgrade(&reaction)));
    effect.set_flag(RUNNING);

    let _guard = RunGuard {
        effect,
        previous: Some(previous),
    };

    func();
}

/// Finishes a run: restores the previous active computation and installs the
/// dependencies this run read. Runs on unwind too.
struct RunGuard<'a> {
    effect: &'a Rc<EffectInner>,
    previous: Option<Option<TrackingFrame>>,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        let effect = self.effect;
        let previous = self.previous.take().flatten();

        if let Some(frame) = effect.ctx.exit_frame(previous) {
            if effect.is_disposed() {
                effect.ctx.registry_mut().remove_effect(effect.id);
            } else {
                effect.ctx.registry_mut().retain_only(effect.id, &frame.reads);
            }
        }

        effect.clear_flag(RUNNING);
        effect.set_flag(EFFECT_RAN);
        effect.runs.set(effect.runs.get() + 1);
    }
}

// =============================================================================
// EFFECT HANDLE
// =============================================================================

/// Owning handle to a tracked computation.
///
/// The registry only holds weak references, so dropping the last handle
/// stops the computation.
#[must_use = "dropping the last Effect handle disposes the computation"]
pub struct Effect {
    inner: Rc<EffectInner>,
}

impl Effect {
    pub fn id(&self) -> EffectId {
        self.inner.id
    }

    pub fn inner(&self) -> &Rc<EffectInner> {
        &self.inner
    }

    /// Force a run, re-deriving dependencies.
    pub fn run(&self) {
        run_effect(&self.inner);
    }

    /// Number of completed runs
    pub fn run_count(&self) -> u64 {
        self.inner.runs.get()
    }

    pub fn is_running(&self) -> bool {
        self.inner.flags() & RUNNING != 0
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.is_disposed()
    }

    /// Whether this computation renders a component
    pub fn is_render_effect(&self) -> bool {
        self.inner.flags() & RENDER_EFFECT != 0
    }

    /// Keys this computation is currently subscribed to
    pub fn dependencies(&self) -> Vec<DepKey> {
        self.inner.ctx.registry().dependencies_of(self.inner.id)
    }

    /// Stop the computation and release its subscriptions.
    pub fn dispose(&self) {
        if self.inner.is_disposed() {
            return;
        }
        self.inner.set_flag(DESTROYED);
        self.inner.ctx.registry_mut().remove_effect(self.inner.id);
        // Release whatever the body captured, unless it is mid-run.
        if self.inner.flags() & RUNNING == 0 {
            *self.inner.func.borrow_mut() = None;
        }
    }
}

impl Drop for Effect {
    fn drop(&mut self) {
        if Rc::strong_count(&self.inner) == 1 {
            self.dispose();
        }
    }
}

impl Clone for Effect {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl fmt::Debug for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Effect")
            .field("id", &self.inner.id)
            .field("runs", &self.inner.runs.get())
            .field("render", &self.is_render_effect())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

// =============================================================================
// PUBLIC API
// =============================================================================

/// Run `f` as a tracked computation.
///
/// `f` runs once immediately; afterwards it re-runs synchronously whenever a
/// field it read during its last run is written.
///
/// # Example
///
/// ```
/// use spark_components::{make_reactive, run_tracked, ReactiveContext};
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let ctx = ReactiveContext::shared();
/// let state = make_reactive(&ctx, serde_json::Map::new());
/// state.set("count", 0);
///
/// let seen = Rc::new(Cell::new(0));
/// let effect = run_tracked(&ctx, {
///     let state = state.clone();
///     let seen = seen.clone();
///     move || {
///         let _ = state.get("count");
///         seen.set(seen.get() + 1);
///     }
/// });
///
/// state.set("count", 1);
/// assert_eq!(seen.get(), 2);
/// assert_eq!(effect.run_count(), 2);
/// ```
pub fn run_tracked<F>(ctx: &Rc<ReactiveContext>, f: F) -> Effect
where
    F: Fn() + 'static,
{
    create_effect(ctx, EFFECT, Rc::new(f))
}

pub(crate) fn create_effect(ctx: &Rc<ReactiveContext>, flags: u32, func: EffectFn) -> Effect {
    let inner = EffectInner::new(ctx, flags, func);
    tracing::trace!(effect = %inner.id, "effect created");
    run_effect(&inner);
    Effect { inner }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactivity::state::{make_reactive, State};
    use serde_json::{json, Map};

    fn setup() -> (Rc<ReactiveContext>, State) {
        let ctx = ReactiveContext::shared();
        let mut data = Map::new();
        data.insert("a".into(), json!(1));
        data.insert("b".into(), json!(2));
        data.insert("flag".into(), json!(true));
        let state = make_reactive(&ctx, data);
        (ctx, state)
    }

    fn counting_effect(
        ctx: &Rc<ReactiveContext>,
        body: impl Fn() + 'static,
    ) -> (Effect, Rc<Cell<u32>>) {
        let runs = Rc::new(Cell::new(0));
        let counter = runs.clone();
        let effect = run_tracked(ctx, move || {
            body();
            counter.set(counter.get() + 1);
        });
        (effect, runs)
    }

    #[test]
    fn runs_immediately() {
        let (ctx, _) = setup();
        let (effect, runs) = counting_effect(&ctx, || {});
        assert_eq!(runs.get(), 1);
        assert_eq!(effect.run_count(), 1);
        assert!(effect.inner().flags() & EFFECT_RAN != 0);
        assert!(!effect.is_render_effect());
    }

    #[test]
    fn reruns_exactly_once_per_write() {
        let (ctx, state) = setup();
        let s = state.clone();
        let (_effect, runs) = counting_effect(&ctx, move || {
            let _ = s.get("a");
        });

        state.set("a", 10);
        assert_eq!(runs.get(), 2);
        state.set("a", 11);
        assert_eq!(runs.get(), 3);
    }

    #[test]
    fn equal_writes_still_trigger() {
        let (ctx, state) = setup();
        let s = state.clone();
        let (_effect, runs) = counting_effect(&ctx, move || {
            let _ = s.get("a");
        });

        state.set("a", 1);
        state.set("a", 1);
        assert_eq!(runs.get(), 3);
    }

    #[test]
    fn writes_to_unread_fields_do_not_trigger() {
        let (ctx, state) = setup();
        let s = state.clone();
        let (_effect, runs) = counting_effect(&ctx, move || {
            let _ = s.get("a");
        });

        state.set("b", 99);
        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn dependencies_are_rederived_per_run() {
        let (ctx, state) = setup();
        let s = state.clone();
        let (effect, runs) = counting_effect(&ctx, move || {
            if s.get("flag") == Some(json!(true)) {
                let _ = s.get("a");
            } else {
                let _ = s.get("b");
            }
        });

        assert_eq!(effect.dependencies().len(), 2);

        state.set("flag", false);
        assert_eq!(runs.get(), 2);

        // `a` was not read by the last run, so it no longer triggers.
        state.set("a", 5);
        assert_eq!(runs.get(), 2);

        state.set("b", 5);
        assert_eq!(runs.get(), 3);
    }

    #[test]
    fn dependents_run_in_subscription_order() {
        let (ctx, state) = setup();
        let order = Rc::new(RefCell::new(Vec::new()));

        let mk = |label: &'static str| {
            let s = state.clone();
            let order = order.clone();
            run_tracked(&ctx, move || {
                let _ = s.get("a");
                order.borrow_mut().push(label);
            })
        };
        let _first = mk("first");
        let _second = mk("second");
        order.borrow_mut().clear();

        state.set("a", 3);
        state.set("a", 4);

        assert_eq!(*order.borrow(), vec!["first", "second", "first", "second"]);
    }

    #[test]
    fn nested_writes_propagate_depth_first() {
        let (ctx, state) = setup();
        let log = Rc::new(RefCell::new(Vec::new()));

        let s1 = state.clone();
        let l1 = log.clone();
        let _copy_a_to_b = run_tracked(&ctx, move || {
            let a = s1.get("a").unwrap_or_default();
            l1.borrow_mut().push(format!("copy {a}"));
            s1.set("b", a);
        });

        let s2 = state.clone();
        let l2 = log.clone();
        let _watch_b = run_tracked(&ctx, move || {
            let b = s2.get("b").unwrap_or_default();
            l2.borrow_mut().push(format!("saw {b}"));
        });
        log.borrow_mut().clear();

        state.set("a", 7);

        assert_eq!(*log.borrow(), vec!["copy 7", "saw 7"]);
    }

    #[test]
    fn nested_runs_restore_the_outer_frame() {
        let (ctx, state) = setup();
        let s = state.clone();
        let inner_ctx = ctx.clone();
        let inner_holder: Rc<RefCell<Option<Effect>>> = Rc::new(RefCell::new(None));
        let holder = inner_holder.clone();

        let outer = run_tracked(&ctx, move || {
            if holder.borrow().is_none() {
                let s_inner = s.clone();
                let effect = run_tracked(&inner_ctx, move || {
                    let _ = s_inner.get("b");
                });
                *holder.borrow_mut() = Some(effect);
            }
            // Read after the nested computation: still tracked for the outer one.
            let _ = s.get("a");
        });

        let deps: Vec<String> = outer.dependencies().into_iter().map(|k| k.field).collect();
        assert_eq!(deps, vec!["a".to_string()]);
        assert!(!ctx.is_tracking());
    }

    #[test]
    fn dispose_stops_reruns_and_releases_subscriptions() {
        let (ctx, state) = setup();
        let s = state.clone();
        let (effect, runs) = counting_effect(&ctx, move || {
            let _ = s.get("a");
        });

        effect.dispose();
        assert!(effect.is_disposed());
        assert!(effect.dependencies().is_empty());

        state.set("a", 2);
        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn dropping_the_last_handle_disposes() {
        let (ctx, state) = setup();
        let runs = {
            let s = state.clone();
            let (_effect, runs) = counting_effect(&ctx, move || {
                let _ = s.get("a");
            });
            runs
        };

        state.set("a", 2);
        assert_eq!(runs.get(), 1);
        assert!(ctx.registry().is_empty());
    }

    #[test]
    #[should_panic(expected = "Maximum update depth exceeded")]
    fn self_triggering_effect_is_reported() {
        let (ctx, state) = setup();
        let s = state.clone();
        let _effect = run_tracked(&ctx, move || {
            let a = s.get("a").and_then(|v| v.as_i64()).unwrap_or(0);
            s.set("a", a + 1);
        });
    }
}

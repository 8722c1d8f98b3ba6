// ============================================================================
// spark-components - Reactive Context
// Explicit tracking context shared by the states and effects of an app
// ============================================================================

use std::cell::{Cell, Ref, RefCell, RefMut};
use std::rc::{Rc, Weak};

use indexmap::IndexSet;
use rustc_hash::FxBuildHasher;

use super::registry::DependencyRegistry;
use super::types::{DepKey, EffectId, Reaction, StateId};

// =============================================================================
// TRACKING FRAME
// =============================================================================

/// The bookkeeping for one executing computation.
pub struct TrackingFrame {
    pub effect: EffectId,
    pub reaction: Weak<dyn Reaction>,
    /// Keys read during this run, in first-read order
    pub reads: IndexSet<DepKey, FxBuildHasher>,
}

impl TrackingFrame {
    pub fn new(effect: EffectId, reaction: Weak<dyn Reaction>) -> Self {
        Self {
            effect,
            reaction,
            reads: IndexSet::default(),
        }
    }
}

// =============================================================================
// REACTIVE CONTEXT
// =============================================================================

/// Holds everything the reactivity engine needs: the dependency registry and
/// the single "active computation" slot.
///
/// The context is passed explicitly to every state and effect instead of
/// living in a global. States and effects created from the same context can
/// observe each other; separate contexts are fully isolated.
pub struct ReactiveContext {
    /// (state, field) -> subscribed computations
    registry: RefCell<DependencyRegistry>,

    /// Currently executing computation
    active: RefCell<Option<TrackingFrame>>,

    /// Nesting of write-triggered re-runs
    trigger_depth: Cell<u32>,

    /// Source for state and effect ids
    next_id: Cell<u64>,
}

impl ReactiveContext {
    pub fn new() -> Self {
        Self {
            registry: RefCell::new(DependencyRegistry::new()),
            active: RefCell::new(None),
            trigger_depth: Cell::new(0),
            next_id: Cell::new(1),
        }
    }

    /// Create a context ready to be shared between states and effects.
    pub fn shared() -> Rc<Self> {
        Rc::new(Self::new())
    }

    fn next_id(&self) -> u64 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id
    }

    pub fn next_state_id(&self) -> StateId {
        StateId(self.next_id())
    }

    pub fn next_effect_id(&self) -> EffectId {
        EffectId(self.next_id())
    }

    // =========================================================================
    // ACTIVE COMPUTATION
    // =========================================================================

    /// Make `frame` the active computation, returning the one it replaces.
    pub fn enter_frame(&self, frame: TrackingFrame) -> Option<TrackingFrame> {
        self.active.replace(Some(frame))
    }

    /// Restore `previous` as the active computation, returning the frame that
    /// was active.
    pub fn exit_frame(&self, previous: Option<TrackingFrame>) -> Option<TrackingFrame> {
        self.active.replace(previous)
    }

    /// True while a tracked computation is executing
    pub fn is_tracking(&self) -> bool {
        self.active.borrow().is_some()
    }

    pub fn active_effect(&self) -> Option<EffectId> {
        self.active.borrow().as_ref().map(|frame| frame.effect)
    }

    /// Record a read of `key` against the active computation, if any.
    ///
    /// The subscription is installed immediately (not at the end of the run),
    /// so a computation that writes a field it has already read in the same
    /// run re-triggers itself.
    pub fn record_read(&self, key: &DepKey) -> bool {
        let subscriber = {
            let mut active = self.active.borrow_mut();
            let Some(frame) = active.as_mut() else {
                return false;
            };
            frame.reads.insert(key.clone());
            (frame.effect, frame.reaction.clone())
        };

        self.registry
            .borrow_mut()
            .subscribe(key.clone(), subscriber.0, subscriber.1);
        true
    }

    // =========================================================================
    // REGISTRY
    // =========================================================================

    pub fn registry(&self) -> Ref<'_, DependencyRegistry> {
        self.registry.borrow()
    }

    pub(crate) fn registry_mut(&self) -> RefMut<'_, DependencyRegistry> {
        self.registry.borrow_mut()
    }

    // =========================================================================
    // TRIGGER DEPTH
    // =========================================================================

    /// Increment trigger nesting, returns the new depth
    pub fn enter_trigger(&self) -> u32 {
        let depth = self.trigger_depth.get() + 1;
        self.trigger_depth.set(depth);
        depth
    }

    /// Decrement trigger nesting, returns the new depth
    pub fn exit_trigger(&self) -> u32 {
        let depth = self.trigger_depth.get().saturating_sub(1);
        self.trigger_depth.set(depth);
        depth
    }

    pub fn trigger_depth(&self) -> u32 {
        self.trigger_depth.get()
    }
}

impl Default for ReactiveContext {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ReactiveContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReactiveContext")
            .field("subscriptions", &self.registry.borrow().len())
            .field("active", &self.active_effect())
            .field("trigger_depth", &self.trigger_depth.get())
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================

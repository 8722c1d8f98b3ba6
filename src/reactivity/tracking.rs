// ============================================================================
// spark-components - Dependency Tracking
// Recording reads and re-running dependents on writes
// ============================================================================
//
// Borrow discipline: the registry is never borrowed while user code runs.
// Dependents are collected into a Vec first, the borrow is released, and only
// then are they re-run ("collect-then-mutate").
// ============================================================================

use crate::core::constants::MAX_TRIGGER_DEPTH;
use crate::core::context::ReactiveContext;
use crate::core::types::DepKey;

// =============================================================================
// TRACK READ
// =============================================================================

/// Register the active computation (if any) as a dependent of `key`.
///
/// Returns true when the read was tracked.
pub fn track_read(ctx: &ReactiveContext, key: &DepKey) -> bool {
    let tracked = ctx.record_read(key);
    if tracked {
        tracing::trace!(%key, "tracked read");
    }
    tracked
}

// =============================================================================
// TRIGGER
// =============================================================================

/// Re-run every computation subscribed to `key`, in subscription order.
///
/// Runs synchronously: all dependents (and anything their writes trigger,
/// depth-first) have finished when this returns. There is no equality check
/// upstream of this call, so every write triggers.
///
/// # Panics
///
/// Panics with "Maximum update depth exceeded" when trigger nesting passes
/// [`MAX_TRIGGER_DEPTH`], which happens when a computation writes a field it
/// depends on.
pub fn trigger(ctx: &ReactiveContext, key: &DepKey) {
    let dependents = ctx.registry().dependents(key);
    if dependents.is_empty() {
        return;
    }

    let depth = ctx.enter_trigger();
    let _guard = TriggerGuard(ctx);

    if depth > MAX_TRIGGER_DEPTH {
        panic!(
            "Maximum update depth exceeded while triggering {key}. \
             A computation is probably writing a field it depends on."
        );
    }

    tracing::trace!(%key, dependents = dependents.len(), depth, "trigger");

    for reaction in dependents {
        let Some(reaction) = reaction.upgrade() else {
            continue;
        };
        if reaction.is_disposed() {
            continue;
        }
        reaction.run();
    }
}

/// Restores the trigger depth even if a dependent panics.
struct TriggerGuard<'a>(&'a ReactiveContext);

impl Drop for TriggerGuard<'_> {
    fn drop(&mut self) {
        self.0.exit_trigger();
    }
}

// ============================================================================
// spark-components - Reactivity Module
// Observable state, tracked computations and change propagation
// ============================================================================

pub mod effect;
pub mod state;
pub mod tracking;

pub use effect::{run_tracked, Effect, EffectFn, EffectInner};
pub use state::{make_reactive, State, StateMap};
pub use tracking::{track_read, trigger};

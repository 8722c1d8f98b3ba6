// ============================================================================
// spark-components - Core Module
// Identifiers, flags, the dependency registry and the tracking context
// ============================================================================

pub mod constants;
pub mod context;
pub mod registry;
pub mod types;

pub use constants::*;
pub use context::{ReactiveContext, TrackingFrame};
pub use registry::DependencyRegistry;
pub use types::{DepKey, EffectId, Reaction, StateId};

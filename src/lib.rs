// ============================================================================
// spark-components - A Minimal Reactive Component Framework for Rust
// ============================================================================
//
// String templates rendered from tracked state into an in-memory DOM. Reads
// during a render subscribe the render to exactly the fields it touched;
// writes re-render synchronously. Templates support `{{ }}` interpolation,
// `v-if` / `v-else-if` / `v-else`, `v-for`, `@event` bindings, custom
// `v-<name>` directives and child components.
// ============================================================================

pub mod binder;
pub mod component;
pub mod core;
pub mod dom;
pub mod error;
pub mod expr;
pub mod reactivity;
pub mod router;
pub mod template;

mod macros;

pub use serde_json;
pub use serde_json::{json, Map, Value};

// Re-export core items at crate root
pub use core::constants;
pub use core::context::{ReactiveContext, TrackingFrame};
pub use core::types::{DepKey, EffectId, StateId};

pub use reactivity::{make_reactive, run_tracked, Effect, State, StateMap};

pub use binder::{Directive, DirectiveContext, Method};
pub use component::{Component, ComponentOptions, LifecycleHook, MountTarget, Phase};
pub use dom::{Document, Event, Node};
pub use error::{Error, Result};
pub use expr::{ExprError, Expression};
pub use router::Router;
pub use template::{evaluate, Scope, TemplateEvaluator};

// =============================================================================
// TESTS
// =============================================================================

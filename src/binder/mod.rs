// ============================================================================
// spark-components - Binder
// Post-render pass: event listeners and custom directives
// ============================================================================

pub mod directives;
pub mod events;

pub use directives::{
    apply_directives, unbind_directives, BoundDirective, Directive, DirectiveContext,
    DirectiveHook, Directives,
};
pub use events::{bind_events, event_kind, method_name, Method, Methods};

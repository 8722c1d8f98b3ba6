// ============================================================================
// spark-components - Template Module
// String templates expanded against component state
// ============================================================================

pub mod blocks;
pub mod conditional;
pub mod evaluator;
pub mod interpolate;
pub mod looping;
pub mod placeholder;
pub mod scope;
pub mod value;

pub use evaluator::{evaluate, TemplateEvaluator};
pub use interpolate::{interpolate, interpolate_text};
pub use looping::parse_loop;
pub use placeholder::{container, Placeholders};
pub use scope::{Scope, STATE_NAME};
pub use value::{display_value, is_truthy, resolve_path};

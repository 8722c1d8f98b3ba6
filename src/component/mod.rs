// ============================================================================
// spark-components - Component Module
// ============================================================================

pub mod controller;
pub mod lifecycle;
pub mod options;

pub use controller::{Component, MountTarget};
pub use lifecycle::{Hook, LifecycleHook, Phase};
pub use options::{ComponentOptions, DataFn};

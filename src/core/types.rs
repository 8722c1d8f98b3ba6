// ============================================================================
// spark-components - Type Definitions
// Identifiers and the type-erased reaction interface
// ============================================================================

use std::fmt;

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Identity of one reactive state object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateId(pub(crate) u64);

/// Identity of one tracked computation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EffectId(pub(crate) u64);

impl StateId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl EffectId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "state#{}", self.0)
    }
}

impl fmt::Display for EffectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "effect#{}", self.0)
    }
}

/// A single trackable property: one field of one state object.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DepKey {
    pub state: StateId,
    pub field: String,
}

impl DepKey {
    pub fn new(state: StateId, field: impl Into<String>) -> Self {
        Self {
            state,
            field: field.into(),
        }
    }
}

impl fmt::Display for DepKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.state, self.field)
    }
}

// =============================================================================
// TYPE-ERASED REACTION
// =============================================================================
//
// The registry stores `Weak<dyn Reaction>` so it never keeps a computation
// alive on its own. Whoever created the computation owns it.
// =============================================================================

/// Something that can be re-run when a field it read is written.
pub trait Reaction {
    /// Stable identity used as the registry key
    fn id(&self) -> EffectId;

    /// Re-run the computation (re-deriving its dependencies)
    fn run(&self);

    /// Disposed reactions are skipped by the trigger path
    fn is_disposed(&self) -> bool;
}

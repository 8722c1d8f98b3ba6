// ============================================================================
// spark-components - Lifecycle
// Hook points and the component phase machine
// ============================================================================

use std::fmt;
use std::rc::Rc;

/// A lifecycle callback
pub type Hook = Rc<dyn Fn()>;

/// The eight points a component calls back at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleHook {
    BeforeCreate,
    Created,
    BeforeMount,
    Mounted,
    BeforeUpdate,
    Updated,
    BeforeDestroy,
    Destroyed,
}

impl LifecycleHook {
    pub const ALL: [LifecycleHook; 8] = [
        LifecycleHook::BeforeCreate,
        LifecycleHook::Created,
        LifecycleHook::BeforeMount,
        LifecycleHook::Mounted,
        LifecycleHook::BeforeUpdate,
        LifecycleHook::Updated,
        LifecycleHook::BeforeDestroy,
        LifecycleHook::Destroyed,
    ];

    /// Conventional camel-case name (`beforeMount`)
    pub fn name(self) -> &'static str {
        match self {
            LifecycleHook::BeforeCreate => "beforeCreate",
            LifecycleHook::Created => "created",
            LifecycleHook::BeforeMount => "beforeMount",
            LifecycleHook::Mounted => "mounted",
            LifecycleHook::BeforeUpdate => "beforeUpdate",
            LifecycleHook::Updated => "updated",
            LifecycleHook::BeforeDestroy => "beforeDestroy",
            LifecycleHook::Destroyed => "destroyed",
        }
    }
}

impl fmt::Display for LifecycleHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where a component is in its life.
///
/// `Constructed → Created → Mounted ⇄ Destroyed`. Renders can happen in any
/// phase; the first one runs during construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Constructed,
    Created,
    Mounted,
    Destroyed,
}

impl Phase {
    pub fn is_destroyed(self) -> bool {
        self == Phase::Destroyed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_follow_declaration_order() {
        let names: Vec<&str> = LifecycleHook::ALL.iter().map(|h| h.name()).collect();
        assert_eq!(
            names,
            [
                "beforeCreate",
                "created",
                "beforeMount",
                "mounted",
                "beforeUpdate",
                "updated",
                "beforeDestroy",
                "destroyed"
            ]
        );
        assert_eq!(LifecycleHook::Mounted.to_string(), "mounted");
    }

    #[test]
    fn phases() {
        assert_eq!(Phase::default(), Phase::Constructed);
        assert!(Phase::Destroyed.is_destroyed());
        assert!(!Phase::Mounted.is_destroyed());
    }
}

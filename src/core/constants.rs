// ============================================================================
// spark-components - Constants
// Flag constants for tracked computations and framework-wide limits
// ============================================================================

// =============================================================================
// COMPUTATION FLAGS
// =============================================================================

/// Computation is a tracked effect
pub const EFFECT: u32 = 1 << 0;

/// Effect drives a component render
pub const RENDER_EFFECT: u32 = 1 << 1;

/// Effect is currently executing its body
pub const RUNNING: u32 = 1 << 2;

/// Effect has run at least once
pub const EFFECT_RAN: u32 = 1 << 3;

/// Effect has been disposed and will never run again
pub const DESTROYED: u32 = 1 << 4;

// =============================================================================
// LIMITS
// =============================================================================

/// Maximum nesting of write-triggered re-runs before we give up.
///
/// A computation that writes a field it depends on re-triggers itself forever.
/// Rather than overflowing the native stack (which aborts the process), the
/// trigger path panics once this depth is exceeded.
pub const MAX_TRIGGER_DEPTH: u32 = 128;

/// Condition sources an evaluator keeps parsed before starting over.
///
/// Sources built by interpolation (`v-if="{{ n }} > 5"`) differ per state
/// value, so the cache is cleared once it reaches this size.
pub const MAX_CACHED_EXPRESSIONS: usize = 256;

// =============================================================================
// TEMPLATE MARKERS
// =============================================================================

/// Attribute carried by the container a child component is mounted into
pub const PLACEHOLDER_ATTR: &str = "data-component";

/// Conditional block attributes
pub const V_IF: &str = "v-if";
pub const V_ELSE_IF: &str = "v-else-if";
pub const V_ELSE: &str = "v-else";

/// Loop block attribute
pub const V_FOR: &str = "v-for";

/// Event binding prefixes (`@click`, `v-on:click`)
pub const EVENT_SHORTHAND: &str = "@";
pub const EVENT_PREFIX: &str = "v-on:";

/// Prefix for custom directive attributes (`v-<name>`)
pub const DIRECTIVE_PREFIX: &str = "v-";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_are_distinct() {
        let flags = [EFFECT, RENDER_EFFECT, RUNNING, EFFECT_RAN, DESTROYED];
        for (i, a) in flags.iter().enumerate() {
            for b in &flags[i + 1..] {
                assert_eq!(a & b, 0);
            }
        }
    }

    #[test]
    fn conditional_markers_do_not_prefix_collide_on_exact_match() {
        assert_ne!(V_ELSE, V_ELSE_IF);
        assert!(V_ELSE_IF.starts_with(V_ELSE));
    }
}

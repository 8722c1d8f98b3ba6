// ============================================================================
// spark-components - Dependency Registry
// Map-of-sets from (state, field) to the computations that read it
// ============================================================================
//
// Two indexes are kept in sync:
//
//   dependents: DepKey   -> ordered set of (EffectId, Weak<dyn Reaction>)
//   sources:    EffectId -> ordered set of DepKey
//
// Dependents are insertion-ordered. Pruning uses `shift_remove`, so the
// subscribers that survive a re-run keep their position and trigger order
// stays "first subscribed, first run".
// ============================================================================

use std::rc::Weak;

use indexmap::{IndexMap, IndexSet};
use rustc_hash::{FxBuildHasher, FxHashMap};

use super::types::{DepKey, EffectId, Reaction};

type Subscribers = IndexMap<EffectId, Weak<dyn Reaction>, FxBuildHasher>;
type Sources = IndexSet<DepKey, FxBuildHasher>;

/// Relation between trackable properties and the computations reading them.
#[derive(Default)]
pub struct DependencyRegistry {
    dependents: FxHashMap<DepKey, Subscribers>,
    sources: FxHashMap<EffectId, Sources>,
}

impl DependencyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe `effect` to `key`. Idempotent; an existing subscription keeps
    /// its position.
    pub fn subscribe(&mut self, key: DepKey, effect: EffectId, reaction: Weak<dyn Reaction>) {
        self.sources
            .entry(effect)
            .or_default()
            .insert(key.clone());
        self.dependents
            .entry(key)
            .or_default()
            .entry(effect)
            .or_insert(reaction);
    }

    /// Drop every subscription of `effect` that is not in `keep`.
    ///
    /// Called when a run finishes, so the registry reflects exactly what the
    /// most recent run read.
    pub fn retain_only(&mut self, effect: EffectId, keep: &IndexSet<DepKey, FxBuildHasher>) {
        let Some(current) = self.sources.get_mut(&effect) else {
            return;
        };

        let stale: Vec<DepKey> = current
            .iter()
            .filter(|key| !keep.contains(*key))
            .cloned()
            .collect();

        for key in &stale {
            current.shift_remove(key);
        }
        if current.is_empty() {
            self.sources.remove(&effect);
        }

        for key in stale {
            self.unlink(&key, effect);
        }
    }

    /// Remove `effect` from the registry entirely.
    pub fn remove_effect(&mut self, effect: EffectId) {
        if let Some(keys) = self.sources.remove(&effect) {
            for key in keys {
                self.unlink(&key, effect);
            }
        }
    }

    fn unlink(&mut self, key: &DepKey, effect: EffectId) {
        if let Some(subscribers) = self.dependents.get_mut(key) {
            subscribers.shift_remove(&effect);
            if subscribers.is_empty() {
                self.dependents.remove(key);
            }
        }
    }

    /// Snapshot of the subscribers of `key`, in subscription order.
    ///
    /// Returned by value so callers can release the registry borrow before
    /// running anything.
    pub fn dependents(&self, key: &DepKey) -> Vec<Weak<dyn Reaction>> {
        self.dependents
            .get(key)
            .map(|subscribers| subscribers.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Ids subscribed to `key`, in subscription order.
    pub fn dependent_ids(&self, key: &DepKey) -> Vec<EffectId> {
        self.dependents
            .get(key)
            .map(|subscribers| subscribers.keys().copied().collect())
            .unwrap_or_default()
    }

    pub fn dependent_count(&self, key: &DepKey) -> usize {
        self.dependents.get(key).map_or(0, IndexMap::len)
    }

    /// Keys `effect` is currently subscribed to, in first-read order.
    pub fn dependencies_of(&self, effect: EffectId) -> Vec<DepKey> {
        self.sources
            .get(&effect)
            .map(|keys| keys.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of (key, effect) subscriptions.
    pub fn len(&self) -> usize {
        self.dependents.values().map(IndexMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.dependents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::StateId;
    use std::rc::Rc;

    struct Noop(EffectId);

    impl Reaction for Noop {
        fn id(&self) -> EffectId {
            self.0
        }
        fn run(&self) {}
        fn is_disposed(&self) -> bool {
            false
        }
    }

    fn reaction(id: u64) -> (EffectId, Rc<dyn Reaction>) {
        let id = EffectId(id);
        (id, Rc::new(Noop(id)))
    }

    fn key(field: &str) -> DepKey {
        DepKey::new(StateId(1), field)
    }

    #[test]
    fn subscribe_is_idempotent() {
        let mut registry = DependencyRegistry::new();
        let (id, r) = reaction(1);

        registry.subscribe(key("a"), id, Rc::downgrade(&r));
        registry.subscribe(key("a"), id, Rc::downgrade(&r));

        assert_eq!(registry.dependent_count(&key("a")), 1);
        assert_eq!(registry.dependencies_of(id), vec![key("a")]);
    }

    #[test]
    fn dependents_keep_subscription_order() {
        let mut registry = DependencyRegistry::new();
        let (a, ra) = reaction(1);
        let (b, rb) = reaction(2);
        let (c, rc) = reaction(3);

        registry.subscribe(key("x"), b, Rc::downgrade(&rb));
        registry.subscribe(key("x"), a, Rc::downgrade(&ra));
        registry.subscribe(key("x"), c, Rc::downgrade(&rc));

        assert_eq!(registry.dependent_ids(&key("x")), vec![b, a, c]);
    }

    #[test]
    fn retain_only_prunes_stale_keys_and_preserves_positions() {
        let mut registry = DependencyRegistry::new();
        let (a, ra) = reaction(1);
        let (b, rb) = reaction(2);

        registry.subscribe(key("x"), a, Rc::downgrade(&ra));
        registry.subscribe(key("x"), b, Rc::downgrade(&rb));
        registry.subscribe(key("y"), a, Rc::downgrade(&ra));

        let mut keep = IndexSet::default();
        keep.insert(key("x"));
        registry.retain_only(a, &keep);

        assert_eq!(registry.dependent_ids(&key("x")), vec![a, b]);
        assert_eq!(registry.dependent_count(&key("y")), 0);
        assert_eq!(registry.dependencies_of(a), vec![key("x")]);
    }

    #[test]
    fn remove_effect_clears_both_indexes() {
        let mut registry = DependencyRegistry::new();
        let (a, ra) = reaction(1);

        registry.subscribe(key("x"), a, Rc::downgrade(&ra));
        registry.subscribe(key("y"), a, Rc::downgrade(&ra));
        assert_eq!(registry.len(), 2);

        registry.remove_effect(a);

        assert!(registry.is_empty());
        assert!(registry.dependencies_of(a).is_empty());
    }
}

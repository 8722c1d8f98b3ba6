// ============================================================================
// spark-components - Template Evaluator
// The four template passes, applied recursively
// ============================================================================
//
// Pass order for every (sub)template:
//
//   1. interpolation        `{{ path }}`, loop bodies skipped
//   2. child placeholders   `<Name/>` → `<div data-component="Name"></div>`
//   3. conditionals         `v-if` / `v-else-if` / `v-else`
//   4. loops                `v-for`
//
// Conditional and loop bodies come back through `evaluate`, so blocks nest
// freely. Condition sources are parsed once per evaluator and cached,
// including sources that fail to parse. The cache is bounded and starts over
// when full.
// ============================================================================

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use super::conditional::render_conditionals;
use super::interpolate::interpolate;
use super::looping::render_loops;
use super::placeholder::Placeholders;
use super::scope::Scope;
use crate::core::constants::MAX_CACHED_EXPRESSIONS;
use crate::expr::Expression;

/// Evaluates templates for one component.
#[derive(Debug)]
pub struct TemplateEvaluator {
    placeholders: Placeholders,
    expressions: RefCell<FxHashMap<String, Option<Rc<Expression>>>>,
}

impl TemplateEvaluator {
    /// An evaluator that rewrites placeholders for the given child names.
    pub fn new<I, S>(component_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            placeholders: Placeholders::new(component_names),
            expressions: RefCell::new(FxHashMap::default()),
        }
    }

    /// Expand `template` against `scope` into final markup.
    pub fn evaluate(&self, template: &str, scope: &Scope) -> String {
        let interpolated = interpolate(template, scope);
        let placed = self.placeholders.apply(&interpolated);
        let conditioned = render_conditionals(self, &placed, scope);
        render_loops(self, &conditioned, scope)
    }

    /// Evaluate a condition source. Anything that fails to lex, parse or
    /// evaluate is false.
    pub fn condition(&self, source: &str, scope: &Scope) -> bool {
        let Some(expression) = self.expression(source) else {
            return false;
        };
        match expression.is_truthy(scope) {
            Ok(holds) => holds,
            Err(err) => {
                tracing::trace!(source, %err, "condition evaluated as false");
                false
            }
        }
    }

    /// Number of distinct condition sources seen so far.
    pub fn cached_expressions(&self) -> usize {
        self.expressions.borrow().len()
    }

    fn expression(&self, source: &str) -> Option<Rc<Expression>> {
        if let Some(cached) = self.expressions.borrow().get(source) {
            return cached.clone();
        }

        let parsed = Expression::parse(source)
            .inspect_err(|err| tracing::trace!(source, %err, "condition failed to parse"))
            .ok()
            .map(Rc::new);
        let mut expressions = self.expressions.borrow_mut();
        if expressions.len() >= MAX_CACHED_EXPRESSIONS {
            tracing::trace!(size = expressions.len(), "condition cache cleared");
            expressions.clear();
        }
        expressions.insert(source.to_string(), parsed.clone());
        parsed
    }
}

/// One-shot evaluation with a throwaway evaluator.
pub fn evaluate<S: AsRef<str>>(template: &str, scope: &Scope, components: &[S]) -> String {
    TemplateEvaluator::new(components).evaluate(template, scope)
}

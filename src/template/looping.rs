// ============================================================================
// spark-components - Loop Blocks
// `v-for="item in path"` expansion
// ============================================================================

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use super::blocks::find_block;
use super::evaluator::TemplateEvaluator;
use super::scope::Scope;
use super::value::resolve_path;
use crate::core::constants::V_FOR;

static LOOP_EXPR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\w+)\s+in\s+([\w.]+)\s*$").expect("loop pattern"));

/// Parse `item in path` into its binding name and source path.
pub fn parse_loop(expression: &str) -> Option<(&str, &str)> {
    let caps = LOOP_EXPR.captures(expression)?;
    Some((caps.get(1)?.as_str(), caps.get(2)?.as_str()))
}

/// Expand every `v-for` block in `template`.
///
/// Each item re-evaluates the whole element (directive removed) in a scope
/// with the loop name bound, so interpolation in attributes and a `v-if` on
/// the same element are decided per item.
pub fn render_loops(evaluator: &TemplateEvaluator, template: &str, scope: &Scope) -> String {
    let mut out = String::with_capacity(template.len());
    let mut cursor = 0;

    while let Some(block) = find_block(template, cursor, &[V_FOR]) {
        out.push_str(&template[cursor..block.start]);
        cursor = block.end;

        let expression = block.value.unwrap_or_default();
        let Some((name, path)) = parse_loop(expression) else {
            tracing::trace!(expression, "malformed loop expression");
            continue;
        };
        let Some(Value::Array(items)) = resolve_path(scope, path) else {
            tracing::trace!(path, "loop source is not a list");
            continue;
        };

        let element = block.render_verbatim();
        for item in items {
            out.push_str(&evaluator.evaluate(&element, &scope.with_binding(name, item)));
        }
    }

    out.push_str(&template[cursor..]);
    out
}

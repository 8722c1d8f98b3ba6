// ============================================================================
// spark-components - Interpolation
// `{{ path }}` markers replaced by the display form of the path's value
// ============================================================================

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::blocks::find_block;
use super::scope::Scope;
use super::value::{display_value, resolve_path};
use crate::core::constants::V_FOR;

static MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*([\w.]+)\s*\}\}").expect("interpolation pattern"));

/// Replace every marker in `text` that resolves against `scope`.
/// Unresolvable markers are left exactly as written.
pub fn interpolate_text(text: &str, scope: &Scope) -> String {
    MARKER
        .replace_all(text, |caps: &Captures<'_>| match resolve_path(scope, &caps[1]) {
            Some(value) => display_value(&value),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Interpolate a template, leaving the bodies of `v-for` blocks alone.
///
/// Loop bodies are interpolated per item when the loop expands, so a loop
/// binding wins over a state field of the same name.
pub fn interpolate(template: &str, scope: &Scope) -> String {
    let mut out = String::with_capacity(template.len());
    let mut cursor = 0;

    while let Some(block) = find_block(template, cursor, &[V_FOR]) {
        out.push_str(&interpolate_text(&template[cursor..block.start], scope));
        out.push_str(&template[block.start..block.end]);
        cursor = block.end;
    }
    out.push_str(&interpolate_text(&template[cursor..], scope));
    out
}

// ============================================================================
// spark-components - Child Placeholders
// `<Name></Name>` / `<Name/>` rewritten to mountable containers
// ============================================================================

use std::borrow::Cow;

use regex::Regex;

use crate::core::constants::PLACEHOLDER_ATTR;

/// Rewrites child-component tags for a fixed set of registered names.
#[derive(Debug, Clone)]
pub struct Placeholders {
    pattern: Option<Regex>,
}

impl Placeholders {
    /// Build the matcher for `names`. Names are matched case-sensitively.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let alternatives: Vec<String> = names
            .into_iter()
            .filter(|name| !name.as_ref().is_empty())
            .map(|name| {
                let name = regex::escape(name.as_ref());
                format!(r"<{name}\s*/>|<{name}\s*>\s*</{name}\s*>")
            })
            .collect();

        if alternatives.is_empty() {
            return Self { pattern: None };
        }

        let pattern = Regex::new(&alternatives.join("|"))
            .inspect_err(|err| tracing::warn!(%err, "child placeholder pattern rejected"))
            .ok();
        Self { pattern }
    }

    pub fn is_empty(&self) -> bool {
        self.pattern.is_none()
    }

    /// Replace every placeholder tag with `<div data-component="Name"></div>`.
    pub fn apply<'t>(&self, template: &'t str) -> Cow<'t, str> {
        let Some(pattern) = &self.pattern else {
            return Cow::Borrowed(template);
        };
        pattern.replace_all(template, |caps: &regex::Captures<'_>| {
            container(tag_name(&caps[0]))
        })
    }
}

/// The name of a `<Name …` tag.
fn tag_name(tag: &str) -> &str {
    let rest = tag.trim_start_matches('<');
    let end = rest
        .find(|c: char| c.is_whitespace() || c == '/' || c == '>')
        .unwrap_or(rest.len());
    &rest[..end]
}

/// Markup of the container a child named `name` mounts into
pub fn container(name: &str) -> String {
    format!(r#"<div {PLACEHOLDER_ATTR}="{name}"></div>"#)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_tag_forms_are_rewritten() {
        let placeholders = Placeholders::new(["Counter", "TodoList"]);
        let out = placeholders.apply("<h1>x</h1><Counter></Counter><TodoList/><Counter />");
        assert_eq!(
            out,
            concat!(
                "<h1>x</h1>",
                r#"<div data-component="Counter"></div>"#,
                r#"<div data-component="TodoList"></div>"#,
                r#"<div data-component="Counter"></div>"#,
            )
        );
    }

    #[test]
    fn unregistered_names_and_prefixes_are_untouched() {
        let placeholders = Placeholders::new(["Counter"]);
        let template = "<Other></Other><CounterBox/><counter></counter>";
        assert_eq!(placeholders.apply(template), template);
    }

    #[test]
    fn no_names_borrows_the_input() {
        let placeholders = Placeholders::new(Vec::<String>::new());
        assert!(placeholders.is_empty());
        assert!(matches!(placeholders.apply("<A/>"), Cow::Borrowed(_)));
    }
}

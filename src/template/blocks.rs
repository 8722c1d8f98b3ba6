// ============================================================================
// spark-components - Directive Blocks
// Locating `<tag v-…>…</tag>` regions in raw template text
// ============================================================================
//
// Templates are scanned as strings, never parsed into a tree. A block is an
// element whose opening tag carries one of the requested directive attributes,
// from its `<` through its matching closing tag. Matching counts nested
// elements with the same tag name, so `<div v-if="…"><div></div></div>` ends
// at the outer `</div>`. Content may span lines.
// ============================================================================

use crate::dom::is_void_element;
use crate::dom::parse::{read_open_tag, OpenTag};

/// One directive-carrying element in a template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block<'a> {
    /// Offset of the opening `<`
    pub start: usize,
    /// Offset just past the closing tag (or the opening tag if it has none)
    pub end: usize,
    pub tag: &'a str,
    /// The directive attribute that selected this block
    pub directive: &'static str,
    /// Attribute value; `None` for a bare attribute such as `v-else`
    pub value: Option<&'a str>,
    /// Text between the opening and closing tags
    pub content: &'a str,
    /// The opening tag with the directive attribute removed
    pub open_tag: String,
    has_close: bool,
}

impl Block<'_> {
    /// The element with its directive attribute removed and `inner` as
    /// content.
    pub fn render(&self, inner: &str) -> String {
        if !self.has_close && is_void_element(&self.tag.to_ascii_lowercase()) {
            return self.open_tag.clone();
        }
        format!("{}{}</{}>", self.open_tag, inner, self.tag)
    }

    /// The element without its directive attribute, content untouched.
    pub fn render_verbatim(&self) -> String {
        self.render(self.content)
    }
}

/// Find the first block at or after `from` whose opening tag carries one of
/// `directives`. When a tag carries several, the one listed first in
/// `directives` selects the block regardless of attribute order. Elements
/// that cannot be closed are left as text and skipped.
pub fn find_block<'a>(src: &'a str, from: usize, directives: &[&'static str]) -> Option<Block<'a>> {
    let mut cursor = from;
    while let Some(offset) = src.get(cursor..)?.find('<') {
        let start = cursor + offset;
        let Some(tag) = read_open_tag(src, start) else {
            cursor = start + 1;
            continue;
        };

        let directive = directives.iter().copied().find(|d| tag.attr(d).is_some());

        if let Some(directive) = directive {
            if let Some(block) = close_block(src, start, &tag, directive) {
                return Some(block);
            }
            tracing::trace!(tag = tag.name, "unterminated directive block left as text");
        }
        cursor = tag.end;
    }
    None
}

fn close_block<'a>(
    src: &'a str,
    start: usize,
    tag: &OpenTag<'a>,
    directive: &'static str,
) -> Option<Block<'a>> {
    let value = tag.attr(directive).and_then(|a| a.value);
    let open_tag = rebuild_open_tag(src, tag, directive);

    if tag.self_closing || is_void_element(&tag.name.to_ascii_lowercase()) {
        return Some(Block {
            start,
            end: tag.end,
            tag: tag.name,
            directive,
            value,
            content: "",
            open_tag,
            has_close: tag.self_closing && !is_void_element(&tag.name.to_ascii_lowercase()),
        });
    }

    let (content_end, end) = find_closing_tag(src, tag.name, tag.end)?;
    Some(Block {
        start,
        end,
        tag: tag.name,
        directive,
        value,
        content: &src[tag.end..content_end],
        open_tag,
        has_close: true,
    })
}

/// Matching `</name>` for an element whose content starts at `from`,
/// counting nested same-name elements. Returns (content end, block end).
pub fn find_closing_tag(src: &str, name: &str, from: usize) -> Option<(usize, usize)> {
    let mut depth = 1usize;
    let mut cursor = from;

    while let Some(offset) = src.get(cursor..)?.find('<') {
        let at = cursor + offset;
        let rest = &src[at..];

        if let Some(after) = rest.strip_prefix("</") {
            if closing_name_matches(after, name) {
                depth -= 1;
                let close_end = at + rest.find('>')? + 1;
                if depth == 0 {
                    return Some((at, close_end));
                }
                cursor = close_end;
                continue;
            }
            cursor = at + 2;
            continue;
        }

        match read_open_tag(src, at) {
            Some(inner) => {
                if inner.name.eq_ignore_ascii_case(name) && !inner.self_closing {
                    depth += 1;
                }
                cursor = inner.end;
            }
            None => cursor = at + 1,
        }
    }
    None
}

fn closing_name_matches(after_slash: &str, name: &str) -> bool {
    after_slash.len() >= name.len()
        && after_slash.is_char_boundary(name.len())
        && after_slash[..name.len()].eq_ignore_ascii_case(name)
        && after_slash[name.len()..]
            .chars()
            .next()
            .is_some_and(|c| c == '>' || c.is_whitespace())
}

/// The opening tag text with `directive` removed and other attributes kept
/// exactly as written.
fn rebuild_open_tag(src: &str, tag: &OpenTag<'_>, directive: &str) -> String {
    let mut out = format!("<{}", tag.name);
    for attr in &tag.attrs {
        if attr.name.eq_ignore_ascii_case(directive) {
            continue;
        }
        out.push(' ');
        out.push_str(&src[attr.span.clone()]);
    }
    out.push('>');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::constants::{V_ELSE, V_FOR, V_IF};

    #[test]
    fn finds_blocks_with_nested_same_name_elements() {
        let src = r#"<p>x</p><div class="a" v-if="state.on"><div>inner</div></div>tail"#;
        let block = find_block(src, 0, &[V_IF]).unwrap();

        assert_eq!(block.tag, "div");
        assert_eq!(block.value, Some("state.on"));
        assert_eq!(block.content, "<div>inner</div>");
        assert_eq!(&src[block.end..], "tail");
        assert_eq!(block.open_tag, r#"<div class="a">"#);
        assert_eq!(block.render("!"), r#"<div class="a">!</div>"#);
    }

    #[test]
    fn content_may_span_lines() {
        let src = "<ul>\n  <li v-for=\"item in items\">\n    {{ item }}\n  </li>\n</ul>";
        let block = find_block(src, 0, &[V_FOR]).unwrap();
        assert_eq!(block.value, Some("item in items"));
        assert_eq!(block.content, "\n    {{ item }}\n  ");
    }

    #[test]
    fn bare_attributes_and_search_offsets() {
        let src = r#"<b v-if="a">1</b><i v-else>2</i>"#;
        let first = find_block(src, 0, &[V_IF, V_ELSE]).unwrap();
        let second = find_block(src, first.end, &[V_IF, V_ELSE]).unwrap();

        assert_eq!(first.directive, V_IF);
        assert_eq!(second.directive, V_ELSE);
        assert_eq!(second.value, None);
        assert_eq!(second.render_verbatim(), "<i>2</i>");
    }

    #[test]
    fn unterminated_blocks_are_skipped() {
        let src = r#"<p v-if="a">never closed <span v-if="b">ok</span>"#;
        let block = find_block(src, 0, &[V_IF]).unwrap();
        assert_eq!(block.tag, "span");
        assert_eq!(block.value, Some("b"));
    }

    #[test]
    fn void_and_self_closing_elements() {
        let src = r#"<img v-if="a" src="x.png"><Comp v-if="b"/>"#;
        let img = find_block(src, 0, &[V_IF]).unwrap();
        assert_eq!(img.render("ignored"), r#"<img src="x.png">"#);

        let comp = find_block(src, img.end, &[V_IF]).unwrap();
        assert_eq!(comp.render(""), "<Comp></Comp>");
    }

    #[test]
    fn listed_order_decides_between_directives_on_one_tag() {
        let src = r#"<li v-if="t.done" v-for="t in todos">x</li>"#;
        let block = find_block(src, 0, &[V_FOR, V_IF]).unwrap();
        assert_eq!(block.directive, V_FOR);
        assert_eq!(block.open_tag, r#"<li v-if="t.done">"#);

        let block = find_block(src, 0, &[V_IF, V_FOR]).unwrap();
        assert_eq!(block.directive, V_IF);
    }

    #[test]
    fn closing_tag_names_must_match_exactly() {
        let src = "<b v-if=\"x\">a</br></b>";
        let block = find_block(src, 0, &[V_IF]).unwrap();
        assert_eq!(block.content, "a</br>");
    }
}

// ============================================================================
// spark-components - Markup Parsing
// A forgiving HTML fragment reader for rendered templates
// ============================================================================
//
// Only what rendered templates need: elements, attributes (quoted, unquoted
// or bare), text, comments and void elements. Character references in text
// and attribute values are decoded. Stray closing tags are dropped; an
// unclosed element closes at the end of input.
// ============================================================================

use std::ops::Range;

use html_escape::decode_html_entities;

use super::node::{is_void_element, Node};

// =============================================================================
// TAG READER
// =============================================================================

/// One attribute as written in the source
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RawAttr<'a> {
    pub name: &'a str,
    pub value: Option<&'a str>,
    /// Byte range of the whole attribute (name through closing quote)
    pub span: Range<usize>,
}

/// An opening tag read from the source
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct OpenTag<'a> {
    pub name: &'a str,
    pub attrs: Vec<RawAttr<'a>>,
    pub self_closing: bool,
    /// Byte offset just past the closing `>`
    pub end: usize,
}

impl<'a> OpenTag<'a> {
    pub fn attr(&self, name: &str) -> Option<&RawAttr<'a>> {
        self.attrs.iter().find(|a| a.name.eq_ignore_ascii_case(name))
    }
}

fn is_tag_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b':' | b'.')
}

fn is_attr_name_end(b: u8) -> bool {
    b.is_ascii_whitespace() || matches!(b, b'=' | b'>' | b'/' | b'"' | b'\'')
}

fn skip_whitespace(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    i
}

/// Read the opening tag starting at `start` (which must be a `<`).
///
/// Quote-aware: a `>` inside an attribute value does not end the tag.
/// Returns `None` if there is no well-formed opening tag at `start`.
pub(crate) fn read_open_tag(src: &str, start: usize) -> Option<OpenTag<'_>> {
    let bytes = src.as_bytes();
    if bytes.get(start) != Some(&b'<') || !bytes.get(start + 1)?.is_ascii_alphabetic() {
        return None;
    }

    let name_start = start + 1;
    let mut i = name_start;
    while i < bytes.len() && is_tag_name_byte(bytes[i]) {
        i += 1;
    }
    let name = &src[name_start..i];

    let mut attrs = Vec::new();
    loop {
        i = skip_whitespace(bytes, i);
        match bytes.get(i)? {
            b'>' => {
                return Some(OpenTag {
                    name,
                    attrs,
                    self_closing: false,
                    end: i + 1,
                });
            }
            b'/' if bytes.get(i + 1) == Some(&b'>') => {
                return Some(OpenTag {
                    name,
                    attrs,
                    self_closing: true,
                    end: i + 2,
                });
            }
            b'/' | b'"' | b'\'' | b'=' => {
                i += 1;
                continue;
            }
            _ => {}
        }

        let attr_start = i;
        while i < bytes.len() && !is_attr_name_end(bytes[i]) {
            i += 1;
        }
        let attr_name = &src[attr_start..i];

        let after_name = skip_whitespace(bytes, i);
        let mut value = None;
        if bytes.get(after_name) == Some(&b'=') {
            let value_start = skip_whitespace(bytes, after_name + 1);
            match bytes.get(value_start)? {
                quote @ (b'"' | b'\'') => {
                    let close = src[value_start + 1..].find(*quote as char)? + value_start + 1;
                    value = Some(&src[value_start + 1..close]);
                    i = close + 1;
                }
                _ => {
                    let mut end = value_start;
                    while end < bytes.len() && !bytes[end].is_ascii_whitespace() && bytes[end] != b'>'
                    {
                        end += 1;
                    }
                    value = Some(&src[value_start..end]);
                    i = end;
                }
            }
        }

        attrs.push(RawAttr {
            name: attr_name,
            value,
            span: attr_start..i,
        });
    }
}

// =============================================================================
// FRAGMENT PARSER
// =============================================================================

/// Parse `markup` into a list of detached top-level nodes.
pub fn parse_fragment(markup: &str) -> Vec<Node> {
    let mut roots: Vec<Node> = Vec::new();
    let mut stack: Vec<Node> = Vec::new();
    let bytes = markup.as_bytes();

    let push = |node: Node, stack: &[Node], roots: &mut Vec<Node>| match stack.last() {
        Some(parent) => parent.append_child(&node),
        None => roots.push(node),
    };

    let mut text_start = 0;
    let mut i = 0;
    while let Some(offset) = markup[i..].find('<') {
        let lt = i + offset;
        let rest = &markup[lt..];

        // Comments and declarations are dropped
        if rest.starts_with("<!--") {
            flush_text(&markup[text_start..lt], stack.as_slice(), &mut roots, &push);
            let end = rest.find("-->").map_or(markup.len(), |e| lt + e + 3);
            i = end;
            text_start = end;
            continue;
        }
        if rest.starts_with("<!") {
            flush_text(&markup[text_start..lt], stack.as_slice(), &mut roots, &push);
            let end = rest.find('>').map_or(markup.len(), |e| lt + e + 1);
            i = end;
            text_start = end;
            continue;
        }

        if bytes.get(lt + 1) == Some(&b'/') {
            let name_start = lt + 2;
            let mut name_end = name_start;
            while name_end < bytes.len() && is_tag_name_byte(bytes[name_end]) {
                name_end += 1;
            }
            if name_end > name_start {
                if let Some(gt) = markup[name_end..].find('>') {
                    flush_text(&markup[text_start..lt], stack.as_slice(), &mut roots, &push);
                    let name = markup[name_start..name_end].to_ascii_lowercase();
                    if let Some(depth) = stack.iter().rposition(|n| n.has_tag(&name)) {
                        stack.truncate(depth);
                    }
                    i = name_end + gt + 1;
                    text_start = i;
                    continue;
                }
            }
            i = lt + 1;
            continue;
        }

        match read_open_tag(markup, lt) {
            Some(tag) => {
                flush_text(&markup[text_start..lt], stack.as_slice(), &mut roots, &push);
                let element = Node::element(tag.name);
                for attr in &tag.attrs {
                    let value = attr
                        .value
                        .map(|v| decode_html_entities(v).into_owned())
                        .unwrap_or_default();
                    element.set_attribute(attr.name, value);
                }
                push(element.clone(), stack.as_slice(), &mut roots);
                let tag_name = tag.name.to_ascii_lowercase();
                if !tag.self_closing && !is_void_element(&tag_name) {
                    stack.push(element);
                }
                i = tag.end;
                text_start = i;
            }
            None => i = lt + 1,
        }
    }

    flush_text(&markup[text_start..], stack.as_slice(), &mut roots, &push);
    roots
}

fn flush_text<F>(text: &str, stack: &[Node], roots: &mut Vec<Node>, push: &F)
where
    F: Fn(Node, &[Node], &mut Vec<Node>),
{
    if !text.is_empty() {
        push(Node::text(decode_html_entities(text)), stack, roots);
    }
}

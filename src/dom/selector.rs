// ============================================================================
// spark-components - Selectors
// Parsing and matching the CSS selector subset used for queries
// ============================================================================
//
// Supported: type (`div`), universal (`*`), `#id`, `.class`, `[attr]`,
// `[attr="value"]`, descendant (space) and child (`>`) combinators, and
// comma-separated selector lists.
// ============================================================================

use nom::{
    branch::alt,
    bytes::complete::{take_while, take_while1},
    character::complete::{char, multispace0, multispace1},
    combinator::{all_consuming, map, opt, value},
    error::{context, convert_error, VerboseError},
    multi::{many0, separated_list1},
    sequence::{delimited, preceded, tuple},
    Finish, IResult,
};

use super::node::Node;
use crate::error::{Error, Result};

type ParseResult<'a, O> = IResult<&'a str, O, VerboseError<&'a str>>;

// =============================================================================
// TYPES
// =============================================================================

/// One simple selector inside a compound selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorPart {
    Id(String),
    Class(String),
    /// `[name]`
    Attribute(String),
    /// `[name="value"]`
    AttributeEquals(String, String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// `a b`
    Descendant,
    /// `a > b`
    Child,
}

/// Simple selectors with no combinator between them, e.g. `li.item[data-id]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompoundSelector {
    /// `None` for `*` or an omitted type
    pub tag: Option<String>,
    pub parts: Vec<SelectorPart>,
}

/// Compound selectors joined by combinators. Each segment's combinator
/// relates it to the next segment; the last segment (the subject) has none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexSelector {
    pub segments: Vec<(CompoundSelector, Option<Combinator>)>,
}

/// A parsed selector list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    pub alternatives: Vec<ComplexSelector>,
}

// =============================================================================
// PARSING
// =============================================================================

fn identifier(input: &str) -> ParseResult<'_, &str> {
    take_while1(|c: char| c.is_alphanumeric() || c == '-' || c == '_')(input)
}

fn attribute_name(input: &str) -> ParseResult<'_, &str> {
    take_while1(|c: char| c.is_alphanumeric() || matches!(c, '-' | '_' | ':' | '@' | '.'))(input)
}

fn quoted(input: &str) -> ParseResult<'_, &str> {
    alt((
        delimited(char('"'), take_while(|c| c != '"'), char('"')),
        delimited(char('\''), take_while(|c| c != '\''), char('\'')),
    ))(input)
}

fn attribute_part(input: &str) -> ParseResult<'_, SelectorPart> {
    context("attribute selector", |input| {
        let (input, _) = char('[')(input)?;
        let (input, _) = multispace0(input)?;
        let (input, name) = attribute_name(input)?;
        let (input, _) = multispace0(input)?;
        let (input, expected) = opt(preceded(
            tuple((char('='), multispace0)),
            alt((quoted, identifier)),
        ))(input)?;
        let (input, _) = multispace0(input)?;
        let (input, _) = char(']')(input)?;

        let name = name.to_ascii_lowercase();
        let part = match expected {
            Some(value) => SelectorPart::AttributeEquals(name, value.to_string()),
            None => SelectorPart::Attribute(name),
        };
        Ok((input, part))
    })(input)
}

fn simple_part(input: &str) -> ParseResult<'_, SelectorPart> {
    alt((
        map(preceded(char('#'), identifier), |id| SelectorPart::Id(id.to_string())),
        map(preceded(char('.'), identifier), |class| {
            SelectorPart::Class(class.to_string())
        }),
        attribute_part,
    ))(input)
}

fn compound_selector(input: &str) -> ParseResult<'_, CompoundSelector> {
    let (rest, tag) = opt(alt((value("*", char('*')), identifier)))(input)?;
    let (rest, parts) = many0(simple_part)(rest)?;

    if tag.is_none() && parts.is_empty() {
        return Err(nom::Err::Error(nom::error::ParseError::from_error_kind(
            input,
            nom::error::ErrorKind::Many1,
        )));
    }

    let tag = tag
        .filter(|t| *t != "*")
        .map(|t| t.to_ascii_lowercase());
    Ok((rest, CompoundSelector { tag, parts }))
}

fn child_combinator(input: &str) -> ParseResult<'_, Combinator> {
    value(
        Combinator::Child,
        tuple((multispace0, char('>'), multispace0)),
    )(input)
}

fn descendant_combinator(input: &str) -> ParseResult<'_, Combinator> {
    value(Combinator::Descendant, multispace1)(input)
}

fn complex_selector(input: &str) -> ParseResult<'_, ComplexSelector> {
    let (mut remaining, first) = compound_selector(input)?;
    let mut segments = vec![(first, None)];

    loop {
        let Ok((after, combinator)) = alt((child_combinator, descendant_combinator))(remaining)
        else {
            break;
        };
        // Trailing whitespace before `,` or the end is not a combinator
        let Ok((rest, next)) = compound_selector(after) else {
            break;
        };
        if let Some(last) = segments.last_mut() {
            last.1 = Some(combinator);
        }
        segments.push((next, None));
        remaining = rest;
    }

    Ok((remaining, ComplexSelector { segments }))
}

fn selector_list(input: &str) -> ParseResult<'_, Vec<ComplexSelector>> {
    all_consuming(delimited(
        multispace0,
        separated_list1(
            tuple((multispace0, char(','), multispace0)),
            complex_selector,
        ),
        multispace0,
    ))(input)
}

impl Selector {
    pub fn parse(source: &str) -> Result<Self> {
        match selector_list(source).finish() {
            Ok((_, alternatives)) => Ok(Self { alternatives }),
            Err(err) => Err(Error::invalid_selector(
                source,
                convert_error(source, err).trim().to_string(),
            )),
        }
    }

    /// Whether `node` is matched by any alternative
    pub fn matches(&self, node: &Node) -> bool {
        node.is_element() && self.alternatives.iter().any(|s| s.matches(node))
    }
}

// =============================================================================
// MATCHING
// =============================================================================

impl CompoundSelector {
    pub fn matches(&self, node: &Node) -> bool {
        if !node.is_element() {
            return false;
        }
        if let Some(tag) = &self.tag {
            if !node.has_tag(tag) {
                return false;
            }
        }
        self.parts.iter().all(|part| match part {
            SelectorPart::Id(id) => node.id().as_deref() == Some(id.as_str()),
            SelectorPart::Class(class) => node.has_class(class),
            SelectorPart::Attribute(name) => node.has_attribute(name),
            SelectorPart::AttributeEquals(name, expected) => {
                node.get_attribute(name).as_deref() == Some(expected.as_str())
            }
        })
    }
}

impl ComplexSelector {
    /// Right to left: the subject must match `node`, then each earlier
    /// segment must match along the ancestor chain.
    pub fn matches(&self, node: &Node) -> bool {
        let Some((subject, _)) = self.segments.last() else {
            return false;
        };
        if !subject.matches(node) {
            return false;
        }
        match self.segments.len() {
            1 => true,
            n => self.matches_ancestors(n - 2, node),
        }
    }

    fn matches_ancestors(&self, index: usize, matched: &Node) -> bool {
        let (compound, combinator) = &self.segments[index];
        let rest = |candidate: &Node| index == 0 || self.matches_ancestors(index - 1, candidate);

        match combinator {
            Some(Combinator::Child) => matched
                .parent()
                .is_some_and(|parent| compound.matches(&parent) && rest(&parent)),
            _ => {
                let mut cursor = matched.parent();
                while let Some(ancestor) = cursor {
                    if compound.matches(&ancestor) && rest(&ancestor) {
                        return true;
                    }
                    cursor = ancestor.parent();
                }
                false
            }
        }
    }
}

//! CSS selector subset
//!
//! Parses and matches the selectors the interaction engine uses to discover
//! page elements. Supported syntax:
//!
//! - type (`section`), universal (`*`), id (`#main-header`), class (`.nav-menu`)
//! - attributes: `[data-src]`, `[type=email]`, `[href^="#"]`, `[src$=".png"]`, `[alt*=farm]`
//! - compound selectors (`section[id].dark`)
//! - descendant (`.nav-menu a`) and child (`.gallery > img`) combinators
//! - selector lists (`.blog-card img, .gallery-item img`)
//!
//! Pseudo-classes and sibling combinators are not supported.

use std::fmt;
use std::str::FromStr;

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{char, multispace0, multispace1},
    combinator::{all_consuming, map, opt, value, verify},
    error::{context, VerboseError, VerboseErrorKind},
    multi::{many0, separated_list1},
    sequence::{delimited, pair, preceded, tuple},
    Finish, IResult,
};
use thiserror::Error;

use crate::dom::{Document, NodeId};

type ParseResult<'a, O> = IResult<&'a str, O, VerboseError<&'a str>>;

/// Error produced when a selector string cannot be parsed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid selector `{selector}` at column {column}: {message}")]
pub struct SelectorError {
    /// The full selector text
    pub selector: String,
    /// Column of the failure (1-indexed)
    pub column: usize,
    /// What the parser expected
    pub message: String,
}

/// Attribute comparison operator
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttrOp {
    /// `[name=value]`
    Equals,
    /// `[name^=value]`
    Prefix,
    /// `[name$=value]`
    Suffix,
    /// `[name*=value]`
    Substring,
}

/// A single attribute test
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttrSelector {
    pub name: String,
    pub matcher: Option<(AttrOp, String)>,
}

impl AttrSelector {
    fn matches(&self, actual: Option<&str>) -> bool {
        let Some(actual) = actual else {
            return false;
        };
        match &self.matcher {
            None => true,
            Some((AttrOp::Equals, v)) => actual == v.as_str(),
            Some((AttrOp::Prefix, v)) => !v.is_empty() && actual.starts_with(v.as_str()),
            Some((AttrOp::Suffix, v)) => !v.is_empty() && actual.ends_with(v.as_str()),
            Some((AttrOp::Substring, v)) => !v.is_empty() && actual.contains(v.as_str()),
        }
    }
}

/// Tests applying to a single element
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompoundSelector {
    pub tag: Option<String>,
    pub universal: bool,
    pub ids: Vec<String>,
    pub classes: Vec<String>,
    pub attributes: Vec<AttrSelector>,
}

impl CompoundSelector {
    fn is_empty(&self) -> bool {
        self.tag.is_none()
            && !self.universal
            && self.ids.is_empty()
            && self.classes.is_empty()
            && self.attributes.is_empty()
    }

    fn matches(&self, doc: &Document, node: NodeId) -> bool {
        let Some(n) = doc.node(node) else {
            return false;
        };
        if let Some(tag) = &self.tag {
            if n.tag() != tag.as_str() {
                return false;
            }
        }
        self.ids.iter().all(|id| n.attr("id") == Some(id.as_str()))
            && self.classes.iter().all(|c| n.has_class(c))
            && self.attributes.iter().all(|a| a.matches(node_attr(n, &a.name)))
    }
}

fn node_attr<'a>(node: &'a crate::dom::Node, name: &str) -> Option<&'a str> {
    if name == "class" {
        return (!node.classes().is_empty()).then_some("");
    }
    node.attr(name)
}

/// How a compound relates to the one before it
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Combinator {
    Descendant,
    Child,
}

/// A chain of compound selectors joined by combinators
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComplexSelector {
    /// The first entry's combinator is unused
    parts: Vec<(Combinator, CompoundSelector)>,
}

impl ComplexSelector {
    pub fn matches(&self, doc: &Document, node: NodeId) -> bool {
        match self.parts.len() {
            0 => false,
            len => self.matches_from(doc, node, len - 1),
        }
    }

    fn matches_from(&self, doc: &Document, node: NodeId, index: usize) -> bool {
        let (combinator, compound) = &self.parts[index];
        if !compound.matches(doc, node) {
            return false;
        }
        if index == 0 {
            return true;
        }
        match combinator {
            Combinator::Child => doc
                .parent(node)
                .is_some_and(|p| self.matches_from(doc, p, index - 1)),
            Combinator::Descendant => doc
                .ancestors(node)
                .skip(1)
                .any(|a| self.matches_from(doc, a, index - 1)),
        }
    }
}

/// A comma-separated list of selectors; matches if any entry matches
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectorList {
    source: String,
    selectors: Vec<ComplexSelector>,
}

impl SelectorList {
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let parsed = all_consuming(delimited(multispace0, selector_list, multispace0))(input)
            .finish();
        match parsed {
            Ok((_, selectors)) => Ok(Self {
                source: input.trim().to_string(),
                selectors,
            }),
            Err(e) => Err(to_selector_error(input, e)),
        }
    }

    pub fn matches(&self, doc: &Document, node: NodeId) -> bool {
        self.selectors.iter().any(|s| s.matches(doc, node))
    }

    /// The selector text this list was parsed from
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }
}

impl FromStr for SelectorList {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for SelectorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn to_selector_error(input: &str, err: VerboseError<&str>) -> SelectorError {
    let (remaining, message) = err
        .errors
        .iter()
        .find_map(|(rest, kind)| match kind {
            VerboseErrorKind::Context(ctx) => Some((*rest, format!("expected {}", ctx))),
            _ => None,
        })
        .or_else(|| {
            err.errors
                .first()
                .map(|(rest, kind)| (*rest, format!("unexpected input ({:?})", kind)))
        })
        .unwrap_or((input, "unexpected input".to_string()));

    SelectorError {
        selector: input.to_string(),
        column: input.len() - remaining.len() + 1,
        message,
    }
}

// ============================================================================
// Parser
// ============================================================================

enum SimplePart {
    Id(String),
    Class(String),
    Attr(AttrSelector),
}

#[derive(Clone)]
enum TypePart {
    Universal,
    Named(String),
}

/// Parse an identifier (alphanumeric, hyphen, underscore)
fn identifier(input: &str) -> ParseResult<&str> {
    take_while1(|c: char| c.is_alphanumeric() || c == '-' || c == '_')(input)
}

fn attr_op(input: &str) -> ParseResult<AttrOp> {
    alt((
        value(AttrOp::Prefix, tag("^=")),
        value(AttrOp::Suffix, tag("$=")),
        value(AttrOp::Substring, tag("*=")),
        value(AttrOp::Equals, tag("=")),
    ))(input)
}

fn attr_value(input: &str) -> ParseResult<&str> {
    alt((
        delimited(char('"'), take_while(|c: char| c != '"'), char('"')),
        delimited(char('\''), take_while(|c: char| c != '\''), char('\'')),
        take_while1(|c: char| !c.is_whitespace() && c != ']'),
    ))(input)
}

fn attribute(input: &str) -> ParseResult<AttrSelector> {
    context("attribute selector", |input| {
        let (input, _) = char('[')(input)?;
        let (input, _) = multispace0(input)?;
        let (input, name) = identifier(input)?;
        let (input, _) = multispace0(input)?;
        let (input, matcher) = opt(pair(attr_op, preceded(multispace0, attr_value)))(input)?;
        let (input, _) = multispace0(input)?;
        let (input, _) = char(']')(input)?;
        Ok((
            input,
            AttrSelector {
                name: name.to_ascii_lowercase(),
                matcher: matcher.map(|(op, v)| (op, v.to_string())),
            },
        ))
    })(input)
}

fn simple_part(input: &str) -> ParseResult<SimplePart> {
    alt((
        map(preceded(char('#'), identifier), |id| {
            SimplePart::Id(id.to_string())
        }),
        map(preceded(char('.'), identifier), |class| {
            SimplePart::Class(class.to_string())
        }),
        map(attribute, SimplePart::Attr),
    ))(input)
}

fn type_part(input: &str) -> ParseResult<TypePart> {
    alt((
        value(TypePart::Universal, char('*')),
        map(identifier, |t| TypePart::Named(t.to_ascii_lowercase())),
    ))(input)
}

fn compound(input: &str) -> ParseResult<CompoundSelector> {
    context(
        "compound selector",
        verify(
            map(tuple((opt(type_part), many0(simple_part))), |(ty, parts)| {
                let mut compound = CompoundSelector::default();
                match ty {
                    Some(TypePart::Universal) => compound.universal = true,
                    Some(TypePart::Named(t)) => compound.tag = Some(t),
                    None => {}
                }
                for part in parts {
                    match part {
                        SimplePart::Id(id) => compound.ids.push(id),
                        SimplePart::Class(c) => compound.classes.push(c),
                        SimplePart::Attr(a) => compound.attributes.push(a),
                    }
                }
                compound
            }),
            |c: &CompoundSelector| !c.is_empty(),
        ),
    )(input)
}

fn combinator(input: &str) -> ParseResult<Combinator> {
    alt((
        value(
            Combinator::Child,
            delimited(multispace0, char('>'), multispace0),
        ),
        value(Combinator::Descendant, multispace1),
    ))(input)
}

fn complex(input: &str) -> ParseResult<ComplexSelector> {
    let (input, first) = compound(input)?;
    let (input, rest) = many0(pair(combinator, compound))(input)?;

    let mut parts = Vec::with_capacity(rest.len() + 1);
    parts.push((Combinator::Descendant, first));
    parts.extend(rest);
    Ok((input, ComplexSelector { parts }))
}

fn selector_list(input: &str) -> ParseResult<Vec<ComplexSelector>> {
    separated_list1(delimited(multispace0, char(','), multispace0), complex)(input)
}

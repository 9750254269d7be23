// src/document/selector.rs

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::document::tree::{DocumentTree, ElementData, NodeId};

/// A compiled selector.
///
/// Selectors are compiled once with [`Selector::parse`] and matched against
/// the document many times (the resolver re-queries every frame). The
/// supported subset:
///
/// - type selectors (`div`) and the universal selector (`*`)
/// - `#id`, `.class`, `[attr]`, `[attr=value]` (bare or quoted value)
/// - compounds of the above (`div.step[role=note]`)
/// - descendant (whitespace) and child (`>`) combinators
/// - comma-separated groups (`.first, .second`)
#[derive(Clone)]
pub struct Selector {
    source: String,
    groups: Vec<ComplexSelector>,
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Selector")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Selector::parse(s)
    }
}

/// Error produced when a selector string cannot be compiled.
///
/// Matching never fails; only compilation does. The position is a byte
/// offset into the original selector string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid selector {selector:?}: {kind} at byte {position}")]
pub struct SelectorError {
    selector: String,
    kind: SelectorErrorKind,
    position: usize,
}

impl SelectorError {
    pub fn kind(&self) -> &SelectorErrorKind {
        &self.kind
    }

    pub fn position(&self) -> usize {
        self.position
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorErrorKind {
    /// The whole selector was empty (or whitespace only).
    Empty,
    /// A comma-separated group had no content.
    EmptyGroup,
    /// A name was required (after `#`, `.`, or `[`) but missing.
    ExpectedName,
    /// A character that cannot start or continue a selector at this point.
    UnexpectedChar(char),
    /// An attribute condition was not closed with `]`.
    UnterminatedAttribute,
    /// A combinator (`>` or trailing whitespace group) without a selector
    /// after it.
    DanglingCombinator,
}

impl fmt::Display for SelectorErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty selector"),
            Self::EmptyGroup => write!(f, "empty selector group"),
            Self::ExpectedName => write!(f, "expected a name"),
            Self::UnexpectedChar(c) => write!(f, "unexpected character {c:?}"),
            Self::UnterminatedAttribute => write!(f, "unterminated attribute condition"),
            Self::DanglingCombinator => write!(f, "combinator without a following selector"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

/// One comma-separated alternative: compounds joined by combinators.
///
/// `combinators.len() == parts.len() - 1`; `combinators[i]` sits between
/// `parts[i]` and `parts[i + 1]`.
#[derive(Debug, Clone)]
struct ComplexSelector {
    parts: Vec<CompoundSelector>,
    combinators: Vec<Combinator>,
}

#[derive(Debug, Clone, Default)]
struct CompoundSelector {
    tag: Option<String>,
    ids: Vec<String>,
    classes: Vec<String>,
    attrs: Vec<AttrCondition>,
}

#[derive(Debug, Clone)]
enum AttrCondition {
    Exists { name: String },
    Equals { name: String, value: String },
}

impl Selector {
    /// Compile a selector string.
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let groups = Parser::new(input).parse()?;
        Ok(Self {
            source: input.to_string(),
            groups,
        })
    }

    /// The original selector string this was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether the element `node` matches any group of this selector.
    pub(crate) fn matches(&self, tree: &DocumentTree, node: NodeId) -> bool {
        self.groups.iter().any(|group| group.matches(tree, node))
    }
}

impl ComplexSelector {
    fn matches(&self, tree: &DocumentTree, node: NodeId) -> bool {
        let Some((target, prefix)) = self.parts.split_last() else {
            return false;
        };
        if !compound_matches(tree, node, target) {
            return false;
        }
        matches_prefix(tree, node, prefix, &self.combinators)
    }
}

/// Match the remaining (leftward) parts of a complex selector against the
/// ancestors of `node`, backtracking across descendant combinators.
fn matches_prefix(
    tree: &DocumentTree,
    node: NodeId,
    parts: &[CompoundSelector],
    combinators: &[Combinator],
) -> bool {
    let (Some((compound, rest_parts)), Some((combinator, rest_combinators))) =
        (parts.split_last(), combinators.split_last())
    else {
        return true;
    };

    match combinator {
        Combinator::Child => {
            let Some(parent) = tree.parent(node) else {
                return false;
            };
            compound_matches(tree, parent, compound)
                && matches_prefix(tree, parent, rest_parts, rest_combinators)
        }
        Combinator::Descendant => {
            let mut cursor = tree.parent(node);
            while let Some(ancestor) = cursor {
                if compound_matches(tree, ancestor, compound)
                    && matches_prefix(tree, ancestor, rest_parts, rest_combinators)
                {
                    return true;
                }
                cursor = tree.parent(ancestor);
            }
            false
        }
    }
}

fn compound_matches(tree: &DocumentTree, node: NodeId, compound: &CompoundSelector) -> bool {
    let Some(el) = tree.element(node) else {
        return false;
    };

    if let Some(tag) = &compound.tag {
        if !el.tag.eq_ignore_ascii_case(tag) {
            return false;
        }
    }

    if !compound.ids.is_empty() {
        let Some(id) = el.attributes.get("id") else {
            return false;
        };
        if !compound.ids.iter().all(|want| want == id) {
            return false;
        }
    }

    if !compound.classes.is_empty() && !classes_match(el, &compound.classes) {
        return false;
    }

    compound.attrs.iter().all(|attr| match attr {
        AttrCondition::Exists { name } => el.attributes.contains_key(name),
        AttrCondition::Equals { name, value } => el.attributes.get(name) == Some(value),
    })
}

fn classes_match(el: &ElementData, wanted: &[String]) -> bool {
    let Some(class_attr) = el.attributes.get("class") else {
        return false;
    };
    wanted
        .iter()
        .all(|class| class_attr.split_whitespace().any(|have| have == class))
}

struct Parser<'a> {
    input: &'a str,
    chars: Vec<(usize, char)>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.char_indices().collect(),
            pos: 0,
        }
    }

    fn error(&self, kind: SelectorErrorKind, position: usize) -> SelectorError {
        SelectorError {
            selector: self.input.to_string(),
            kind,
            position,
        }
    }

    fn peek(&self) -> Option<(usize, char)> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    /// Skip whitespace; returns true if any was skipped.
    fn eat_whitespace(&mut self) -> bool {
        let mut skipped = false;
        while matches!(self.peek(), Some((_, c)) if c.is_whitespace()) {
            self.bump();
            skipped = true;
        }
        skipped
    }

    fn end_position(&self) -> usize {
        self.input.len()
    }

    fn parse(mut self) -> Result<Vec<ComplexSelector>, SelectorError> {
        let mut groups = Vec::new();
        let mut parts: Vec<CompoundSelector> = Vec::new();
        let mut combinators: Vec<Combinator> = Vec::new();
        let mut pending: Option<Combinator> = None;

        loop {
            let saw_whitespace = self.eat_whitespace();
            let Some((position, c)) = self.peek() else {
                break;
            };

            match c {
                ',' => {
                    self.bump();
                    if pending.take().is_some() {
                        return Err(self.error(SelectorErrorKind::DanglingCombinator, position));
                    }
                    if parts.is_empty() {
                        return Err(self.error(SelectorErrorKind::EmptyGroup, position));
                    }
                    groups.push(ComplexSelector {
                        parts: std::mem::take(&mut parts),
                        combinators: std::mem::take(&mut combinators),
                    });
                }
                '>' => {
                    self.bump();
                    if parts.is_empty() || pending.is_some() {
                        return Err(self.error(SelectorErrorKind::DanglingCombinator, position));
                    }
                    pending = Some(Combinator::Child);
                }
                _ => {
                    let combinator = match pending.take() {
                        Some(combinator) => Some(combinator),
                        None if saw_whitespace && !parts.is_empty() => {
                            Some(Combinator::Descendant)
                        }
                        None => None,
                    };
                    if !parts.is_empty() && combinator.is_none() {
                        // A compound cannot directly continue a finished one
                        // (e.g. `div*`).
                        return Err(self.error(SelectorErrorKind::UnexpectedChar(c), position));
                    }

                    let compound = self.parse_compound()?;
                    if let Some(combinator) = combinator {
                        combinators.push(combinator);
                    }
                    parts.push(compound);
                }
            }
        }

        if pending.is_some() {
            return Err(self.error(
                SelectorErrorKind::DanglingCombinator,
                self.end_position(),
            ));
        }
        if parts.is_empty() {
            let kind = if groups.is_empty() {
                SelectorErrorKind::Empty
            } else {
                SelectorErrorKind::EmptyGroup
            };
            return Err(self.error(kind, self.end_position()));
        }
        groups.push(ComplexSelector { parts, combinators });

        Ok(groups)
    }

    fn parse_compound(&mut self) -> Result<CompoundSelector, SelectorError> {
        let mut compound = CompoundSelector::default();
        let mut any = false;

        loop {
            let Some((position, c)) = self.peek() else {
                break;
            };
            match c {
                '*' => {
                    if any {
                        return Err(self.error(SelectorErrorKind::UnexpectedChar('*'), position));
                    }
                    self.bump();
                }
                '#' => {
                    self.bump();
                    let name = self
                        .read_ident()
                        .ok_or_else(|| self.error(SelectorErrorKind::ExpectedName, position))?;
                    compound.ids.push(name);
                }
                '.' => {
                    self.bump();
                    let name = self
                        .read_ident()
                        .ok_or_else(|| self.error(SelectorErrorKind::ExpectedName, position))?;
                    compound.classes.push(name);
                }
                '[' => {
                    let attr = self.parse_attr(position)?;
                    compound.attrs.push(attr);
                }
                c if is_ident_char(c) => {
                    if any {
                        // Type selectors must come first in a compound.
                        return Err(self.error(SelectorErrorKind::UnexpectedChar(c), position));
                    }
                    // read_ident always succeeds here: the current char is an
                    // ident char.
                    compound.tag = self.read_ident();
                }
                _ => break,
            }
            any = true;
        }

        if !any {
            return match self.peek() {
                Some((position, c)) => {
                    Err(self.error(SelectorErrorKind::UnexpectedChar(c), position))
                }
                None => Err(self.error(SelectorErrorKind::Empty, self.end_position())),
            };
        }
        Ok(compound)
    }

    fn parse_attr(&mut self, bracket_position: usize) -> Result<AttrCondition, SelectorError> {
        self.bump(); // consume '['
        self.eat_whitespace();

        let name_position = self.peek().map(|(p, _)| p).unwrap_or(self.end_position());
        let name = self
            .read_ident()
            .ok_or_else(|| self.error(SelectorErrorKind::ExpectedName, name_position))?;
        self.eat_whitespace();

        match self.peek() {
            Some((_, ']')) => {
                self.bump();
                Ok(AttrCondition::Exists { name })
            }
            Some((_, '=')) => {
                self.bump();
                self.eat_whitespace();
                let value = self.read_attr_value(bracket_position)?;
                self.eat_whitespace();
                match self.peek() {
                    Some((_, ']')) => {
                        self.bump();
                        Ok(AttrCondition::Equals { name, value })
                    }
                    _ => Err(self.error(
                        SelectorErrorKind::UnterminatedAttribute,
                        bracket_position,
                    )),
                }
            }
            Some((position, c)) => {
                Err(self.error(SelectorErrorKind::UnexpectedChar(c), position))
            }
            None => Err(self.error(
                SelectorErrorKind::UnterminatedAttribute,
                bracket_position,
            )),
        }
    }

    fn read_attr_value(&mut self, bracket_position: usize) -> Result<String, SelectorError> {
        match self.peek() {
            Some((_, quote)) if quote == '"' || quote == '\'' => {
                self.bump();
                let mut value = String::new();
                loop {
                    match self.peek() {
                        Some((_, c)) if c == quote => {
                            self.bump();
                            return Ok(value);
                        }
                        Some((_, c)) => {
                            value.push(c);
                            self.bump();
                        }
                        None => {
                            return Err(self.error(
                                SelectorErrorKind::UnterminatedAttribute,
                                bracket_position,
                            ));
                        }
                    }
                }
            }
            Some((position, _)) => {
                let mut value = String::new();
                while let Some((_, c)) = self.peek() {
                    if c == ']' || c.is_whitespace() {
                        break;
                    }
                    value.push(c);
                    self.bump();
                }
                if value.is_empty() {
                    return Err(self.error(SelectorErrorKind::ExpectedName, position));
                }
                Ok(value)
            }
            None => Err(self.error(
                SelectorErrorKind::UnterminatedAttribute,
                bracket_position,
            )),
        }
    }

    fn read_ident(&mut self) -> Option<String> {
        let mut ident = String::new();
        while let Some((_, c)) = self.peek() {
            if is_ident_char(c) {
                ident.push(c);
                self.bump();
            } else {
                break;
            }
        }
        if ident.is_empty() { None } else { Some(ident) }
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

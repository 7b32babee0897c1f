//! Filter clause parser for `tp ls`
//!
//! Turns the loose tokens given on the command line into typed filter
//! clauses. Parsing is total: a token that fits no other rule becomes a
//! free-text search on the entity name, so no token is ever rejected here.
//! Whether a field actually exists is left to the remote service.

use std::collections::BTreeSet;
use std::fmt;

use crate::core::entity::EntityTypes;

/// Field searched by bare words
pub const TEXT_FIELD: &str = "name";

/// Field searched by `+tag` tokens
pub const TAG_FIELD: &str = "tag";

/// Comparison requested by a filter clause
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// `field=value`
    Equality,
    /// `field!=value`
    NotEqual,
    /// `field:value` or `field~=value`
    Contains,
    /// `field>value`
    Greater,
    /// `field>=value`
    GreaterOrEqual,
    /// `field<value`
    Less,
    /// `field<=value`
    LessOrEqual,
}

impl Operator {
    /// Operator keyword in the service's query language
    pub fn keyword(&self) -> &'static str {
        match self {
            Operator::Equality => "eq",
            Operator::NotEqual => "ne",
            Operator::Contains => "contains",
            Operator::Greater => "gt",
            Operator::GreaterOrEqual => "gte",
            Operator::Less => "lt",
            Operator::LessOrEqual => "lte",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operator::Equality => write!(f, "="),
            Operator::NotEqual => write!(f, "!="),
            Operator::Contains => write!(f, ":"),
            Operator::Greater => write!(f, ">"),
            Operator::GreaterOrEqual => write!(f, ">="),
            Operator::Less => write!(f, "<"),
            Operator::LessOrEqual => write!(f, "<="),
        }
    }
}

/// One parsed constraint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterClause {
    pub field: String,
    pub operator: Operator,
    pub value: String,
}

impl FilterClause {
    pub fn new(field: impl Into<String>, operator: Operator, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }

    /// Free-text search on the default field
    pub fn text(value: impl Into<String>) -> Self {
        Self::new(TEXT_FIELD, Operator::Contains, value)
    }
}

impl fmt::Display for FilterClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.field, self.operator, self.value)
    }
}

/// What a single command-line token turned out to be
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A field constraint (explicit, tag, or free text)
    Clause(FilterClause),
    /// A known entity type name, in its configured spelling
    EntityType(String),
    /// A named template section, in its configured spelling
    Template(String),
    /// A bare integer, the page size
    Number(u32),
}

/// Result of parsing all filter tokens of one invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedFilter {
    /// Entity types named on the command line (union of all matches)
    pub entity_types: BTreeSet<String>,
    /// Clauses in command-line order
    pub filters: Vec<FilterClause>,
    /// Template names in command-line order
    pub templates: Vec<String>,
    /// Bare integers in command-line order
    pub numbers: Vec<u32>,
}

impl ParsedFilter {
    pub fn is_empty(&self) -> bool {
        self.entity_types.is_empty()
            && self.filters.is_empty()
            && self.templates.is_empty()
            && self.numbers.is_empty()
    }
}

/// Parser for `tp ls` filter tokens
#[derive(Debug, Clone)]
pub struct FilterParser<'a> {
    types: &'a EntityTypes,
    templates: Vec<String>,
}

impl<'a> FilterParser<'a> {
    pub fn new(types: &'a EntityTypes) -> Self {
        Self {
            types,
            templates: Vec::new(),
        }
    }

    /// Template names that bare tokens may select
    pub fn with_templates<I, S>(mut self, templates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.templates = templates.into_iter().map(Into::into).collect();
        self
    }

    /// Classify a single token
    pub fn classify(&self, token: &str) -> Token {
        // the whole remainder is the tag, delimiters included
        if let Some(tag) = token.strip_prefix('+').filter(|t| !t.is_empty()) {
            return Token::Clause(FilterClause::new(TAG_FIELD, Operator::Contains, tag));
        }

        if let Some((field, operator, value)) = split_condition(token) {
            return Token::Clause(FilterClause::new(field.to_lowercase(), operator, value));
        }

        if let Some(name) = self.types.canonical(token) {
            return Token::EntityType(name.to_string());
        }

        if let Some(name) = self
            .templates
            .iter()
            .find(|t| t.eq_ignore_ascii_case(token))
        {
            return Token::Template(name.clone());
        }

        if token.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(number) = token.parse() {
                return Token::Number(number);
            }
        }

        Token::Clause(FilterClause::text(token))
    }

    /// Parse every token; blank tokens are ignored
    pub fn parse<I, S>(&self, tokens: I) -> ParsedFilter
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut parsed = ParsedFilter::default();

        for token in tokens {
            let token = token.as_ref();
            if token.trim().is_empty() {
                continue;
            }
            match self.classify(token) {
                Token::Clause(clause) => parsed.filters.push(clause),
                Token::EntityType(name) => {
                    parsed.entity_types.insert(name);
                }
                Token::Template(name) => parsed.templates.push(name),
                Token::Number(number) => parsed.numbers.push(number),
            }
        }

        tracing::debug!(
            types = ?parsed.entity_types,
            filters = parsed.filters.len(),
            templates = ?parsed.templates,
            numbers = ?parsed.numbers,
            "parsed filter tokens"
        );

        parsed
    }
}

/// Split `field<op>value` on the first operator found scanning left to right
///
/// `!` and `~` only count as operators when followed by `=`, and `==` is the
/// same as `=`. Returns `None`
/// when there is no operator or the field part is empty.
fn split_condition(token: &str) -> Option<(&str, Operator, &str)> {
    let bytes = token.as_bytes();

    for (i, c) in token.char_indices() {
        let next_is_eq = bytes.get(i + 1) == Some(&b'=');
        let (operator, width) = match c {
            '=' if next_is_eq => (Operator::Equality, 2),
            '=' => (Operator::Equality, 1),
            ':' => (Operator::Contains, 1),
            '!' if next_is_eq => (Operator::NotEqual, 2),
            '~' if next_is_eq => (Operator::Contains, 2),
            '<' if next_is_eq => (Operator::LessOrEqual, 2),
            '<' => (Operator::Less, 1),
            '>' if next_is_eq => (Operator::GreaterOrEqual, 2),
            '>' => (Operator::Greater, 1),
            _ => continue,
        };

        let field = &token[..i];
        if field.is_empty() {
            return None;
        }
        return Some((field, operator, &token[i + width..]));
    }

    None
}

//! Field/pattern filters over events.
//!
//! A [`Filter`] pairs a calendar URL with one of the filterable fields and a
//! regular expression. Matching is a case-sensitive, unanchored search over the
//! selected field, so `Room` matches `"Room A"` and `^Team` matches only at the
//! start of the value.

use std::fmt;
use std::str::FromStr;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::event::Event;

/// Errors raised while building a filter.
#[derive(Debug, Error)]
pub enum FilterError {
    /// The field is not one of `name`, `description`, `location`.
    #[error("unexpected filter field value: {0}")]
    InvalidField(String),

    /// The pattern is not a valid regular expression.
    #[error("invalid filter pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// The event field a filter applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterField {
    Name,
    Description,
    Location,
}

impl FilterField {
    /// Every filterable field, in display order.
    pub const ALL: [FilterField; 3] = [Self::Name, Self::Description, Self::Location];

    /// Returns the stored/wire name of the field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Description => "description",
            Self::Location => "location",
        }
    }
}

impl fmt::Display for FilterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterField {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| FilterError::InvalidField(s.to_string()))
    }
}

/// A stored (field, pattern) rule scoped to one calendar URL.
#[derive(Debug, Clone)]
pub struct Filter {
    url: String,
    field: FilterField,
    pattern: Regex,
}

impl Filter {
    /// Validates `field` and compiles `pattern`.
    ///
    /// The field is checked first, so a bad field is reported even when the
    /// pattern is also invalid.
    pub fn new(url: impl Into<String>, field: &str, pattern: &str) -> Result<Self, FilterError> {
        let field = field.parse::<FilterField>()?;
        let pattern = compile_pattern(pattern)?;
        Ok(Self::from_parts(url, field, pattern))
    }

    /// Builds a filter from already validated parts.
    pub fn from_parts(url: impl Into<String>, field: FilterField, pattern: Regex) -> Self {
        Self {
            url: url.into(),
            field,
            pattern,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn field(&self) -> FilterField {
        self.field
    }

    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }

    /// Returns the pattern source text.
    pub fn pattern_str(&self) -> &str {
        self.pattern.as_str()
    }

    /// Returns whether the event's selected field matches the pattern.
    pub fn matches(&self, event: &Event) -> bool {
        self.matches_value(event.field(self.field))
    }

    /// Returns whether a raw field value matches the pattern.
    pub fn matches_value(&self, value: &str) -> bool {
        self.pattern.is_match(value)
    }
}

impl PartialEq for Filter {
    fn eq(&self, other: &Self) -> bool {
        self.url == other.url
            && self.field == other.field
            && self.pattern.as_str() == other.pattern.as_str()
    }
}

impl Eq for Filter {}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} =~ /{}/", self.field, self.pattern.as_str())
    }
}

/// Compiles a filter pattern, mapping syntax errors to [`FilterError::Pattern`].
pub fn compile_pattern(pattern: &str) -> Result<Regex, FilterError> {
    Regex::new(pattern).map_err(|source| FilterError::Pattern {
        pattern: pattern.to_string(),
        source,
    })
}

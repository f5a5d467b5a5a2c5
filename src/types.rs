//! Core types for the catalog.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a book.
///
/// Issued by the store from a monotonically increasing counter and never
/// reused. Opaque to clients: on the wire it is a decimal string.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct BookId(pub u64);

impl BookId {
    pub fn next(self) -> Self {
        BookId(self.0 + 1)
    }

    /// Parse a wire id.
    ///
    /// Only the exact form the store renders is accepted, so `"01"`, `"+1"`
    /// or `" 1 "` name no book.
    pub fn parse(s: &str) -> Option<Self> {
        let id = BookId(s.parse().ok()?);
        (id.to_string() == s).then_some(id)
    }
}

impl fmt::Debug for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BookId({})", self.0)
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<BookId> for String {
    fn from(id: BookId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for BookId {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        BookId::parse(&s).ok_or_else(|| format!("invalid book id: {:?}", s))
    }
}

/// A book in the catalog.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Book {
    /// Unique identifier (assigned by store).
    pub id: BookId,

    pub title: String,

    /// Empty when not supplied on create.
    pub description: String,

    pub rating: Option<f64>,

    pub author: String,

    pub year: Option<i32>,
}

/// Input for creating a new book (before the id is assigned).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub year: Option<i32>,
}

impl NewBook {
    /// Create an input with the two required fields.
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = Some(rating);
        self
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }
}

/// Partial update for an existing book.
///
/// Only truthy values are applied; see [`crate::catalog::merge`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BookPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub rating: Option<f64>,
}

impl BookPatch {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn rating(mut self, rating: f64) -> Self {
        self.rating = Some(rating);
        self
    }
}

/// Catalog statistics.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CatalogStats {
    pub book_count: usize,
    pub topic_count: usize,
    pub subscriber_count: usize,
}

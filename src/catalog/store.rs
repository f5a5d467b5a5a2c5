//! In-memory book collection.

use crate::error::{CatalogError, Result};
use crate::types::{Book, BookId, BookPatch, NewBook};
use std::collections::BTreeMap;

use super::merge::apply_patch;

/// The catalog store.
///
/// Exclusively owns the book collection. Mutations take `&mut self`; the
/// store does no locking of its own, callers that share it across threads
/// must guard it (see [`crate::Api`]).
#[derive(Debug)]
pub struct CatalogStore {
    /// Books keyed by id. Ids are monotonic, so map order is insertion order.
    books: BTreeMap<BookId, Book>,

    /// Next id to hand out. Never rewound, so deleted ids are not reused.
    next_id: BookId,
}

impl CatalogStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            books: BTreeMap::new(),
            next_id: BookId(1),
        }
    }

    // --- Queries ---

    /// List books in insertion order.
    ///
    /// An absent or empty search term returns every book. Otherwise only
    /// books whose title contains the term, ignoring case, are returned.
    pub fn list(&self, search: Option<&str>) -> Vec<Book> {
        match search.filter(|term| !term.is_empty()) {
            None => self.books.values().cloned().collect(),
            Some(term) => {
                let needle = term.to_lowercase();
                self.books
                    .values()
                    .filter(|book| book.title.to_lowercase().contains(&needle))
                    .cloned()
                    .collect()
            }
        }
    }

    /// Get a book by ID.
    pub fn get(&self, id: BookId) -> Option<Book> {
        self.books.get(&id).cloned()
    }

    /// Check whether a book exists.
    pub fn contains(&self, id: BookId) -> bool {
        self.books.contains_key(&id)
    }

    /// Number of stored books.
    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    // --- Mutations ---

    /// Create a book.
    ///
    /// Fails with [`CatalogError::Validation`] if `title` or `author` is
    /// empty; the store is left untouched in that case.
    pub fn create(&mut self, input: NewBook) -> Result<Book> {
        if input.title.is_empty() {
            return Err(CatalogError::Validation { field: "title" });
        }
        if input.author.is_empty() {
            return Err(CatalogError::Validation { field: "author" });
        }

        let id = self.next_id;
        self.next_id = id.next();

        let book = Book {
            id,
            title: input.title,
            description: input.description.unwrap_or_default(),
            rating: input.rating,
            author: input.author,
            year: input.year,
        };

        self.books.insert(id, book.clone());
        tracing::debug!(id = %id, title = %book.title, "book created");

        Ok(book)
    }

    /// Merge a partial update into an existing book.
    ///
    /// Returns `None` if no book has this id.
    pub fn update(&mut self, id: BookId, patch: BookPatch) -> Option<Book> {
        let book = self.books.get_mut(&id)?;
        let changed = apply_patch(book, patch);
        tracing::debug!(id = %id, changed, "book updated");
        Some(book.clone())
    }

    /// Remove a book, returning it. Returns `None` if no book has this id.
    pub fn delete(&mut self, id: BookId) -> Option<Book> {
        let removed = self.books.remove(&id);
        if removed.is_some() {
            tracing::debug!(id = %id, "book deleted");
        }
        removed
    }
}

impl Default for CatalogStore {
    fn default() -> Self {
        Self::new()
    }
}

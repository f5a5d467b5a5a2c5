//! Truthy-overwrite merge policy for partial updates.
//!
//! A supplied value replaces the stored field only when it is truthy:
//! non-empty text or a non-zero, non-NaN number. Zero, empty text and
//! omission all mean "no change", so a field can never be cleared
//! through an update.

use crate::types::{Book, BookPatch};

/// Whether a supplied value counts as present for overwrite purposes.
pub trait Truthy {
    fn is_truthy(&self) -> bool;
}

impl Truthy for String {
    fn is_truthy(&self) -> bool {
        !self.is_empty()
    }
}

impl Truthy for i32 {
    fn is_truthy(&self) -> bool {
        *self != 0
    }
}

impl Truthy for f64 {
    fn is_truthy(&self) -> bool {
        *self != 0.0 && !self.is_nan()
    }
}

impl<T: Truthy> Truthy for Option<T> {
    fn is_truthy(&self) -> bool {
        self.as_ref().is_some_and(|v| v.is_truthy())
    }
}

/// Overwrite a required field if the incoming value is truthy.
fn overwrite<T: Truthy>(slot: &mut T, incoming: Option<T>) {
    if let Some(value) = incoming.filter(|v| v.is_truthy()) {
        *slot = value;
    }
}

/// Overwrite an optional field if the incoming value is truthy.
fn overwrite_opt<T: Truthy>(slot: &mut Option<T>, incoming: Option<T>) {
    if let Some(value) = incoming.filter(|v| v.is_truthy()) {
        *slot = Some(value);
    }
}

/// Apply a patch to a book. Returns true if any field was written.
pub fn apply_patch(book: &mut Book, patch: BookPatch) -> bool {
    let before = book.clone();

    overwrite(&mut book.title, patch.title);
    overwrite(&mut book.description, patch.description);
    overwrite(&mut book.author, patch.author);
    overwrite_opt(&mut book.year, patch.year);
    overwrite_opt(&mut book.rating, patch.rating);

    *book != before
}

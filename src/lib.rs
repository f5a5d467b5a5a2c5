//! # Bookshelf
//!
//! An in-memory book catalog with a live subscription for new books.
//!
//! ## Core Concepts
//!
//! - **Catalog Store**: Owned collection of books with create, read, update,
//!   delete and title search
//! - **Event Channel**: Topic-keyed broadcast where every listener gets its
//!   own ordered copy of each event
//! - **API Surface**: Named queries, mutations and the `bookSub`
//!   subscription, validated against the schema before reaching the store
//!
//! ## Example
//!
//! ```ignore
//! use bookshelf::{Api, NewBook};
//!
//! let api = Api::default();
//! let mut stream = api.book_sub();
//!
//! let book = api.add_book(NewBook::new("Dune", "Herbert"))?;
//! assert_eq!(stream.next(), Some(book));
//!
//! // Same thing through the dispatch boundary
//! let books = api.execute("allBooks", json!({ "search": "dune" }))?;
//! ```

pub mod api;
pub mod catalog;
pub mod channel;
pub mod error;
pub mod types;

// Re-exports
pub use api::{
    Api, ApiConfig, BookStream, Operation, OperationCall, OperationKind, BOOK_ADDED, SCHEMA_SDL,
};
pub use catalog::CatalogStore;
pub use channel::{
    ChannelEvent, DropReason, EventChannel, SubscriptionConfig, SubscriptionHandle, SubscriptionId,
};
pub use error::{CatalogError, Result};
pub use types::*;

//! The API surface tying the store and the event channel together.

use crate::catalog::CatalogStore;
use crate::channel::{EventChannel, SubscriptionConfig};
use crate::error::{CatalogError, Result};
use crate::types::{Book, BookId, BookPatch, CatalogStats, NewBook};
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;

use super::schema::{Operation, OperationCall, OperationKind};
use super::stream::BookStream;

/// Default topic for book creation events.
pub const BOOK_ADDED: &str = "BOOK_ADDED";

/// API configuration.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Topic book creations are published on.
    pub book_added_topic: String,

    /// Buffering for `bookSub` streams.
    pub subscription: SubscriptionConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            book_added_topic: BOOK_ADDED.to_string(),
            subscription: SubscriptionConfig::default(),
        }
    }
}

/// The catalog API.
///
/// Provides a unified interface for:
/// - Queries (`allBooks`, `getBook`) against the store
/// - Mutations (`addBook`, `updateBook`, `deleteBook`)
/// - The `bookSub` subscription fed by successful creations
///
/// Mutations hold the store's write guard across "modify, then publish",
/// so an event is never observed before the store reflects it and
/// creation events reach every stream in creation order.
pub struct Api {
    config: ApiConfig,

    /// Book collection. The only path to mutate it is through this guard.
    store: RwLock<CatalogStore>,

    /// Broadcast channel for live events.
    channel: EventChannel<Book>,
}

impl Api {
    /// Create an API over an empty store.
    pub fn new(config: ApiConfig) -> Self {
        Self::with_store(config, CatalogStore::new())
    }

    /// Create an API over an existing store.
    pub fn with_store(config: ApiConfig, store: CatalogStore) -> Self {
        Self {
            config,
            store: RwLock::new(store),
            channel: EventChannel::new(),
        }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    // --- Queries ---

    pub fn all_books(&self, search: Option<&str>) -> Vec<Book> {
        self.store.read().list(search)
    }

    pub fn get_book(&self, id: BookId) -> Option<Book> {
        self.store.read().get(id)
    }

    // --- Mutations ---

    /// Create a book and announce it to `bookSub` streams.
    pub fn add_book(&self, input: NewBook) -> Result<Book> {
        let mut store = self.store.write();
        let book = store.create(input)?;

        // Publish before releasing the guard: a reader that sees the event
        // is guaranteed to find the book.
        let delivered = self
            .channel
            .publish(&self.config.book_added_topic, book.clone());
        drop(store);

        tracing::debug!(id = %book.id, delivered, "book added");
        Ok(book)
    }

    pub fn update_book(&self, id: BookId, patch: BookPatch) -> Option<Book> {
        self.store.write().update(id, patch)
    }

    pub fn delete_book(&self, id: BookId) -> Option<Book> {
        self.store.write().delete(id)
    }

    // --- Subscriptions ---

    /// Open a stream of books created from now on.
    pub fn book_sub(&self) -> BookStream {
        let handle = self.channel.subscribe(
            &self.config.book_added_topic,
            self.config.subscription.clone(),
        );
        BookStream::new(handle)
    }

    // --- Dispatch ---

    /// Run a query or mutation by name.
    ///
    /// Ids that do not name a book yield `null`, not an error.
    pub fn execute(&self, operation: &str, args: Value) -> Result<Value> {
        let op = lookup(operation)?;
        if op.kind() == OperationKind::Subscription {
            return Err(CatalogError::WrongOperationKind {
                operation: operation.to_string(),
                expected: "query or mutation",
            });
        }

        let call = OperationCall::parse(op, &args)?;
        tracing::trace!(operation, kind = %op.kind(), "executing operation");

        match call {
            OperationCall::AllBooks { search } => to_json(self.all_books(search.as_deref())),
            OperationCall::GetBook { id } => {
                to_json(BookId::parse(&id).and_then(|id| self.get_book(id)))
            }
            OperationCall::AddBook { input } => to_json(self.add_book(input)?),
            OperationCall::UpdateBook { id, patch } => {
                to_json(BookId::parse(&id).and_then(|id| self.update_book(id, patch)))
            }
            OperationCall::DeleteBook { id } => {
                to_json(BookId::parse(&id).and_then(|id| self.delete_book(id)))
            }
            OperationCall::BookSub => Err(CatalogError::WrongOperationKind {
                operation: operation.to_string(),
                expected: "query or mutation",
            }),
        }
    }

    /// Open a subscription by name.
    pub fn subscribe(&self, operation: &str, args: Value) -> Result<BookStream> {
        let op = lookup(operation)?;
        if op.kind() != OperationKind::Subscription {
            return Err(CatalogError::WrongOperationKind {
                operation: operation.to_string(),
                expected: "subscription",
            });
        }

        match OperationCall::parse(op, &args)? {
            OperationCall::BookSub => Ok(self.book_sub()),
            _ => Err(CatalogError::WrongOperationKind {
                operation: operation.to_string(),
                expected: "subscription",
            }),
        }
    }

    // --- Lifecycle ---

    /// Current counts of books and live subscriptions.
    pub fn stats(&self) -> CatalogStats {
        CatalogStats {
            book_count: self.store.read().len(),
            topic_count: self.channel.topics().len(),
            subscriber_count: self.channel.total_subscriptions(),
        }
    }

    /// Cancel every open stream. Queries and mutations keep working;
    /// new subscriptions end immediately.
    pub fn shutdown(&self) -> usize {
        self.channel.shutdown()
    }
}

impl Default for Api {
    fn default() -> Self {
        Self::new(ApiConfig::default())
    }
}

impl Drop for Api {
    fn drop(&mut self) {
        if !self.channel.is_closed() {
            self.channel.shutdown();
        }
    }
}

fn lookup(operation: &str) -> Result<Operation> {
    Operation::from_name(operation)
        .ok_or_else(|| CatalogError::UnknownOperation(operation.to_string()))
}

fn to_json<T: Serialize>(value: T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    fn wait() -> Duration {
        Duration::from_millis(100)
    }

    #[test]
    fn test_add_book_publishes() {
        let api = Api::default();
        let mut stream = api.book_sub();

        let book = api.add_book(NewBook::new("Dune", "Herbert")).unwrap();

        assert_eq!(stream.next_timeout(wait()), Some(book));
        assert_eq!(stream.next_timeout(Duration::from_millis(20)), None);
    }

    #[test]
    fn test_failed_add_publishes_nothing() {
        let api = Api::default();
        let mut stream = api.book_sub();

        assert!(api.add_book(NewBook::new("", "Herbert")).is_err());
        assert_eq!(stream.next_timeout(Duration::from_millis(20)), None);
        assert_eq!(api.stats().book_count, 0);
    }

    #[test]
    fn test_update_and_delete_do_not_publish() {
        let api = Api::default();
        let book = api.add_book(NewBook::new("Dune", "Herbert")).unwrap();
        let mut stream = api.book_sub();

        api.update_book(book.id, BookPatch::default().rating(5.0)).unwrap();
        api.delete_book(book.id).unwrap();

        assert_eq!(stream.next_timeout(Duration::from_millis(20)), None);
    }

    #[test]
    fn test_custom_topic() {
        let api = Api::new(ApiConfig {
            book_added_topic: "books".into(),
            ..Default::default()
        });
        let _stream = api.book_sub();

        assert_eq!(api.config().book_added_topic, "books");
        assert_eq!(api.channel.subscription_count("books"), 1);
        assert_eq!(api.channel.subscription_count(BOOK_ADDED), 0);
    }

    #[test]
    fn test_execute_round_trip() {
        let api = Api::default();

        let created = api
            .execute(
                "addBook",
                json!({"input": {"title": "Dune", "author": "Herbert"}}),
            )
            .unwrap();
        assert_eq!(created["title"], "Dune");
        assert_eq!(created["description"], "");
        assert!(created["rating"].is_null());

        let id = created["id"].as_str().unwrap().to_string();
        let fetched = api.execute("getBook", json!({ "id": id })).unwrap();
        assert_eq!(fetched, created);
    }

    #[test]
    fn test_streams_have_distinct_ids() {
        let api = Api::default();
        let a = api.book_sub();
        let b = api.book_sub();
        assert_ne!(a.id(), b.id());

        api.channel.unsubscribe(a.id());
        assert_eq!(api.stats().subscriber_count, 1);
        assert_eq!(a.count(), 0);
    }

    #[test]
    fn test_execute_unparsable_id_is_null() {
        let api = Api::default();
        api.add_book(NewBook::new("Dune", "Herbert")).unwrap();

        assert_eq!(api.execute("getBook", json!({"id": "abc"})).unwrap(), Value::Null);
        assert_eq!(api.execute("deleteBook", json!({"id": "abc"})).unwrap(), Value::Null);
        assert_eq!(
            api.execute("updateBook", json!({"input": {"id": "abc", "title": "x"}}))
                .unwrap(),
            Value::Null
        );
        assert_eq!(api.stats().book_count, 1);
    }

    #[test]
    fn test_operation_kind_mismatch() {
        let api = Api::default();

        let result = api.execute("bookSub", Value::Null);
        assert!(matches!(result, Err(CatalogError::WrongOperationKind { .. })));

        let result = api.subscribe("allBooks", Value::Null);
        assert!(matches!(result, Err(CatalogError::WrongOperationKind { .. })));

        let result = api.execute("nope", Value::Null);
        assert!(matches!(result, Err(CatalogError::UnknownOperation(_))));
    }

    #[test]
    fn test_stats() {
        let api = Api::default();
        api.add_book(NewBook::new("Dune", "Herbert")).unwrap();
        let _a = api.book_sub();
        let _b = api.book_sub();

        assert_eq!(
            api.stats(),
            CatalogStats {
                book_count: 1,
                topic_count: 1,
                subscriber_count: 2,
            }
        );
    }

    #[test]
    fn test_drop_ends_streams() {
        let api = Api::default();
        let stream = api.book_sub();
        drop(api);

        assert_eq!(stream.count(), 0);
    }
}

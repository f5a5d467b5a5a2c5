//! Operation bindings between callers, the store and the event channel.
//!
//! The transport that owns connections calls [`Api::execute`] for queries
//! and mutations, and [`Api::subscribe`] for the subscription, draining the
//! returned [`BookStream`] until it cancels it.

pub mod schema;
mod stream;
mod surface;

pub use schema::{Operation, OperationCall, OperationKind, SCHEMA_SDL};
pub use stream::BookStream;
pub use surface::{Api, ApiConfig, BOOK_ADDED};

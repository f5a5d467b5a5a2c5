//! The catalog store.
//!
//! Books live in an id-keyed ordered map. Ids are issued in increasing
//! order, so iterating the map yields books in insertion order.

pub mod merge;
mod store;

pub use merge::Truthy;
pub use store::CatalogStore;

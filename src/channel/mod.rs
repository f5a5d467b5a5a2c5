//! Topic-keyed broadcast channel for live events.
//!
//! Each subscription is backed by its own queue, so every listener on a
//! topic receives its own copy of every payload published after it joined,
//! in publish order. Subscriptions support:
//! - Unbounded or bounded buffers, with slow-subscriber eviction
//! - Cancellation by dropping the handle, without disturbing other listeners
//! - Channel-wide shutdown that terminates every open stream
//!
//! # Example
//!
//! ```ignore
//! let channel = EventChannel::new();
//! let handle = channel.subscribe("BOOK_ADDED", SubscriptionConfig::default());
//!
//! channel.publish("BOOK_ADDED", book);
//!
//! for book in handle {
//!     println!("new book: {}", book.title);
//! }
//! ```

mod manager;
mod types;

pub use manager::EventChannel;
pub use types::{ChannelEvent, DropReason, SubscriptionConfig, SubscriptionHandle, SubscriptionId};

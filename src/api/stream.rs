//! Outbound stream for the `bookSub` subscription.

use crate::channel::{SubscriptionHandle, SubscriptionId};
use crate::types::Book;
use std::time::Duration;

/// Stream of newly created books.
///
/// Yields each book exactly once, in creation order, starting with the
/// first creation after the stream was opened. Dropping the stream
/// cancels the subscription.
#[derive(Debug)]
pub struct BookStream {
    handle: SubscriptionHandle<Book>,
}

impl BookStream {
    pub(crate) fn new(handle: SubscriptionHandle<Book>) -> Self {
        Self { handle }
    }

    pub fn id(&self) -> SubscriptionId {
        self.handle.id
    }

    /// Wait up to `timeout` for the next book.
    ///
    /// Returns `None` on timeout or once the stream has ended.
    pub fn next_timeout(&mut self, timeout: Duration) -> Option<Book> {
        self.handle.next_timeout(timeout)
    }

    /// Number of books delivered but not yet taken from the stream.
    pub fn pending(&self) -> usize {
        self.handle.pending()
    }

    /// Cancel the subscription.
    pub fn cancel(self) {
        self.handle.cancel();
    }
}

impl Iterator for BookStream {
    type Item = Book;

    fn next(&mut self) -> Option<Book> {
        self.handle.next()
    }
}

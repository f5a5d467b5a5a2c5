//! Concurrent mutation and fan-out tests.

use bookshelf::{Api, Book, BookId, NewBook};
use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

const WRITERS: usize = 8;
const BOOKS_PER_WRITER: usize = 50;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

#[test]
fn test_concurrent_creates_get_unique_ids() {
    init_tracing();
    let api = Arc::new(Api::default());
    let barrier = Arc::new(Barrier::new(WRITERS));

    let writers: Vec<_> = (0..WRITERS)
        .map(|w| {
            let api = Arc::clone(&api);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                (0..BOOKS_PER_WRITER)
                    .map(|i| {
                        api.add_book(NewBook::new(format!("w{}-{}", w, i), "Anon"))
                            .unwrap()
                            .id
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let ids: Vec<BookId> = writers
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();

    let unique: HashSet<_> = ids.iter().copied().collect();
    assert_eq!(ids.len(), WRITERS * BOOKS_PER_WRITER);
    assert_eq!(unique.len(), ids.len());
    assert_eq!(api.stats().book_count, ids.len());
}

#[test]
fn test_every_subscriber_sees_every_creation_in_one_order() {
    init_tracing();
    let api = Arc::new(Api::default());
    let total = WRITERS * BOOKS_PER_WRITER;

    let readers: Vec<_> = (0..3)
        .map(|_| {
            let stream = api.book_sub();
            thread::spawn(move || stream.take(total).collect::<Vec<Book>>())
        })
        .collect();

    let writers: Vec<_> = (0..WRITERS)
        .map(|w| {
            let api = Arc::clone(&api);
            thread::spawn(move || {
                for i in 0..BOOKS_PER_WRITER {
                    api.add_book(NewBook::new(format!("w{}-{}", w, i), "Anon"))
                        .unwrap();
                }
            })
        })
        .collect();

    for writer in writers {
        writer.join().unwrap();
    }

    let received: Vec<Vec<Book>> = readers.into_iter().map(|h| h.join().unwrap()).collect();

    // Creations are serialized, so the stream order is id order and
    // identical for every subscriber.
    let expected = api.all_books(None);
    assert_eq!(expected.len(), total);
    for stream in &received {
        assert_eq!(stream, &expected);
    }

    // Each writer's own books arrive in the order it created them
    for w in 0..WRITERS {
        let prefix = format!("w{}-", w);
        let mine: Vec<_> = received[0]
            .iter()
            .filter(|b| b.title.starts_with(&prefix))
            .map(|b| b.title.clone())
            .collect();
        let in_order: Vec<_> = (0..BOOKS_PER_WRITER)
            .map(|i| format!("w{}-{}", w, i))
            .collect();
        assert_eq!(mine, in_order);
    }
}

#[test]
fn test_stalled_subscriber_does_not_block_others() {
    let api = Arc::new(Api::default());
    let _stalled = api.book_sub();
    let live = api.book_sub();

    let reader = thread::spawn(move || live.take(100).count());

    for i in 0..100 {
        api.add_book(NewBook::new(format!("Book {}", i), "Anon"))
            .unwrap();
    }

    assert_eq!(reader.join().unwrap(), 100);
}

#[test]
fn test_readers_run_alongside_writers() {
    let api = Arc::new(Api::default());
    let mut stream = api.book_sub();

    let writer = {
        let api = Arc::clone(&api);
        thread::spawn(move || {
            for i in 0..200 {
                api.add_book(NewBook::new(format!("Book {}", i), "Anon"))
                    .unwrap();
            }
        })
    };

    // Whatever the stream delivers is already visible to readers
    let mut seen = 0;
    while seen < 200 {
        let book = stream
            .next_timeout(Duration::from_secs(5))
            .expect("stream stalled");
        assert_eq!(api.get_book(book.id).as_ref(), Some(&book));
        seen += 1;
    }

    writer.join().unwrap();
}

#[test]
fn test_shutdown_wakes_blocked_subscriber() {
    let api = Arc::new(Api::default());
    let stream = api.book_sub();

    let reader = thread::spawn(move || stream.count());

    thread::sleep(Duration::from_millis(20));
    api.shutdown();

    assert_eq!(reader.join().unwrap(), 0);
}

#[test]
fn test_cancel_while_publishing() {
    let api = Arc::new(Api::default());
    let keep = api.book_sub();

    let churn = {
        let api = Arc::clone(&api);
        thread::spawn(move || {
            for _ in 0..200 {
                let stream = api.book_sub();
                stream.cancel();
            }
        })
    };

    for i in 0..200 {
        api.add_book(NewBook::new(format!("Book {}", i), "Anon"))
            .unwrap();
    }
    churn.join().unwrap();

    assert_eq!(keep.take(200).count(), 200);
    assert_eq!(api.stats().subscriber_count, 1);
}

//! Test helpers for the transport module.

use std::io::Read;
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use super::{ConnectionHandler, ConnectionStream};

pub(crate) struct CountingHandler {
    count: Arc<AtomicUsize>,
}

impl CountingHandler {
    pub(crate) fn new() -> (Arc<AtomicUsize>, Arc<Self>) {
        let count = Arc::new(AtomicUsize::new(0));
        let handler = Arc::new(Self {
            count: Arc::clone(&count),
        });
        (count, handler)
    }
}

impl ConnectionHandler for CountingHandler {
    fn handle(&self, _stream: ConnectionStream) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}

/// Handler that holds the connection until the peer closes it, then records
/// completion.
pub(crate) struct BlockingHandler {
    completed: Arc<AtomicUsize>,
}

impl BlockingHandler {
    pub(crate) fn new() -> (Arc<AtomicUsize>, Arc<Self>) {
        let completed = Arc::new(AtomicUsize::new(0));
        let handler = Arc::new(Self {
            completed: Arc::clone(&completed),
        });
        (completed, handler)
    }
}

impl ConnectionHandler for BlockingHandler {
    fn handle(&self, mut stream: ConnectionStream) {
        let mut sink = Vec::new();
        let _ = stream.read_to_end(&mut sink);
        self.completed.fetch_add(1, Ordering::SeqCst);
    }
}

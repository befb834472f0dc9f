//! Async transports for the rechunker.
//!
//! Both adapters are runtime-agnostic: they build on `futures-io` and
//! `futures-core`, so they work with tokio (through `tokio_util::compat`),
//! async-std, smol or any other executor.
//!
//! - [`rechunk_async`] - Re-frames the bytes of a `futures_io::AsyncRead`
//! - [`rechunk_stream`] - Re-frames a `Stream` of byte chunks
//!
//! This module requires the `async-io` feature to be enabled.

mod pipe;
mod reader;

pub use pipe::{RechunkPipe, rechunk_stream};
pub use reader::{RechunkStream, rechunk_async};

use std::collections::VecDeque;
use std::task::Poll;

use bytes::Bytes;

use crate::error::RechunkError;
use crate::rechunker::{Rechunker, Transform};

type Item = Result<Bytes, RechunkError>;

/// Rechunker plus the queue of chunks not yet yielded, shared by both
/// async adapters.
///
/// Upstream is only polled once the queue is empty.
struct Driver<T> {
    rechunker: Rechunker<T>,
    ready: VecDeque<Bytes>,
    finished: bool,
}

impl<T: Transform> Driver<T> {
    fn new(rechunker: Rechunker<T>) -> Self {
        Self {
            rechunker,
            ready: VecDeque::new(),
            finished: false,
        }
    }

    /// Returns the next item if one can be produced without polling
    /// upstream.
    fn poll_ready(&mut self) -> Option<Poll<Option<Item>>> {
        if let Some(chunk) = self.ready.pop_front() {
            return Some(Poll::Ready(Some(Ok(chunk))));
        }
        self.finished.then_some(Poll::Ready(None))
    }

    fn accept(&mut self, data: &[u8]) -> Option<Item> {
        match self.rechunker.push(data) {
            Ok(chunks) => {
                self.ready.extend(chunks);
                None
            }
            Err(e) => Some(self.fail(e)),
        }
    }

    fn complete(&mut self) -> Option<Item> {
        self.finished = true;
        match self.rechunker.finish() {
            Ok(last) => {
                self.ready.extend(last);
                None
            }
            Err(e) => Some(Err(e)),
        }
    }

    fn fail(&mut self, e: RechunkError) -> Item {
        self.finished = true;
        self.ready.clear();
        self.rechunker.abort();
        Err(e)
    }
}

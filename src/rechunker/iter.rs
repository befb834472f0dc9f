//! Pull-based adapter over [`std::io::Read`].
//!
//! # Example
//!
//! ```
//! use rechunkrs::{ChunkRule, Identity, Rechunker, RechunkIter};
//! use std::io::Cursor;
//!
//! let data = vec![0u8; 100];
//! let rechunker = Rechunker::new(ChunkRule::fixed(32)?, Identity);
//!
//! let lengths: Vec<usize> = RechunkIter::new(Cursor::new(data), rechunker)
//!     .map(|chunk| chunk.map(|c| c.len()))
//!     .collect::<Result<_, _>>()?;
//! assert_eq!(lengths, vec![32, 32, 32, 4]);
//! # Ok::<(), rechunkrs::RechunkError>(())
//! ```

use std::collections::VecDeque;
use std::io::{ErrorKind, Read};

use bytes::Bytes;

use super::engine::Rechunker;
use super::transform::Transform;
use crate::error::RechunkError;

/// Default read size for transport adapters (8 KiB).
pub const DEFAULT_READ_SIZE: usize = 8 * 1024;

/// An iterator that reads from a [`Read`] source and yields re-framed
/// chunks.
///
/// The iterator is lazy: it only reads when every chunk produced so far has
/// been yielded. End of input finishes the rechunker; a read error aborts
/// it, so the buffered remainder is never handed to
/// [`Transform::transform_last`].
pub struct RechunkIter<R, T> {
    reader: R,
    rechunker: Rechunker<T>,
    buffer: Vec<u8>,
    ready: VecDeque<Bytes>,
    finished: bool,
}

impl<R: Read, T: Transform> RechunkIter<R, T> {
    /// Creates a new iterator reading up to [`DEFAULT_READ_SIZE`] bytes at
    /// a time.
    ///
    /// # Arguments
    ///
    /// * `reader` - The source of data
    /// * `rechunker` - The engine (and its transform) to run the data through
    pub fn new(reader: R, rechunker: Rechunker<T>) -> Self {
        Self::with_read_size(reader, rechunker, DEFAULT_READ_SIZE)
    }

    /// Creates a new iterator with a custom read size.
    pub fn with_read_size(reader: R, rechunker: Rechunker<T>, read_size: usize) -> Self {
        Self {
            reader,
            rechunker,
            buffer: vec![0u8; read_size.max(1)],
            ready: VecDeque::new(),
            finished: false,
        }
    }

    /// Returns the rechunker driving this iterator.
    pub fn rechunker(&self) -> &Rechunker<T> {
        &self.rechunker
    }

    /// Consumes the iterator, returning the reader and the rechunker.
    pub fn into_parts(self) -> (R, Rechunker<T>) {
        (self.reader, self.rechunker)
    }

    fn fail(&mut self, e: RechunkError) -> Option<Result<Bytes, RechunkError>> {
        self.finished = true;
        self.ready.clear();
        self.rechunker.abort();
        Some(Err(e))
    }
}

impl<R: Read, T: Transform> Iterator for RechunkIter<R, T> {
    type Item = Result<Bytes, RechunkError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(chunk) = self.ready.pop_front() {
                return Some(Ok(chunk));
            }
            if self.finished {
                return None;
            }

            match self.reader.read(&mut self.buffer) {
                Ok(0) => {
                    self.finished = true;
                    match self.rechunker.finish() {
                        Ok(last) => self.ready.extend(last),
                        Err(e) => return Some(Err(e)),
                    }
                }
                Ok(n) => match self.rechunker.push(&self.buffer[..n]) {
                    Ok(chunks) => self.ready.extend(chunks),
                    Err(e) => return self.fail(e),
                },
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return self.fail(e.into()),
            }
        }
    }
}

//! Push-based adapter over [`std::io::Write`].

use std::io::{self, Write};

use super::engine::Rechunker;
use super::transform::Transform;
use crate::error::RechunkError;

/// A writer that re-frames everything written to it before passing it on.
///
/// `write` accepts bytes, [`finish`](Self::finish) completes the stream and
/// [`abort`](Self::abort) drops it. Dropping the writer without finishing it
/// aborts the stream as well: the buffered remainder is never written.
///
/// # Example
///
/// ```
/// use std::io::Write;
/// use rechunkrs::{ChunkRule, Identity, Rechunker, RechunkWriter};
///
/// let rechunker = Rechunker::new(ChunkRule::fixed(4)?, Identity);
/// let mut writer = RechunkWriter::new(Vec::new(), rechunker);
/// writer.write_all(b"hello world")?;
/// let out = writer.finish()?;
/// assert_eq!(out, b"hello world");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct RechunkWriter<W, T> {
    inner: W,
    rechunker: Rechunker<T>,
}

impl<W: Write, T: Transform> RechunkWriter<W, T> {
    /// Creates a new writer around `inner`.
    pub fn new(inner: W, rechunker: Rechunker<T>) -> Self {
        Self { inner, rechunker }
    }

    /// Emits the last chunk, flushes and returns the inner writer.
    pub fn finish(mut self) -> Result<W, RechunkError> {
        if let Some(last) = self.rechunker.finish()? {
            self.inner.write_all(&last)?;
        }
        self.inner.flush()?;
        Ok(self.inner)
    }

    /// Drops the buffered remainder and returns the inner writer.
    ///
    /// Bytes already emitted stay written.
    pub fn abort(mut self) -> W {
        self.rechunker.abort();
        self.inner
    }

    /// Returns the rechunker driving this writer.
    pub fn rechunker(&self) -> &Rechunker<T> {
        &self.rechunker
    }

    /// Returns a reference to the inner writer.
    pub fn get_ref(&self) -> &W {
        &self.inner
    }
}

impl<W: Write, T: Transform> Write for RechunkWriter<W, T> {
    /// Re-frames `buf` and writes every completed chunk.
    ///
    /// `buf` is consumed even when writing a chunk fails, so an inner write
    /// error aborts the stream and later writes fail.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for chunk in self.rechunker.push(buf)? {
            if let Err(e) = self.inner.write_all(&chunk) {
                self.rechunker.abort();
                return Err(e);
            }
        }
        Ok(buf.len())
    }

    /// Flushes the inner writer. Bytes still buffered for the next chunk are
    /// not written.
    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

//! Core re-framing engine - Rechunker with streaming API.
//!
//! This module implements the stateful re-framing engine. It provides a
//! pure streaming interface:
//!
//! - [`Rechunker`] - Stateful engine that turns arbitrary input chunks into
//!   chunks obeying a [`ChunkRule`]
//! - `push()` - Feed data in any size (1 byte, 8KB, 1MB, etc.)
//! - `finish()` - Flush remaining data when the stream ends
//! - `abort()` - Drop remaining data when the stream fails
//!
//! # Example
//!
//! ```
//! use rechunkrs::{ChunkRule, Identity, Rechunker};
//!
//! let rule = ChunkRule::new(13, 16)?;
//! let mut rechunker = Rechunker::new(rule, Identity);
//!
//! // Feed data in any size
//! let mut lengths = Vec::new();
//! for input in [vec![0u8; 12], vec![0u8; 44], vec![0u8; 8]] {
//!     lengths.extend(rechunker.push(input)?.iter().map(|c| c.len()));
//! }
//!
//! // When stream ends, get the final chunk
//! if let Some(last) = rechunker.finish()? {
//!     lengths.push(last.len());
//! }
//!
//! assert_eq!(lengths, vec![13, 16, 16, 16, 3]);
//! # Ok::<(), rechunkrs::RechunkError>(())
//! ```

use std::fmt;

use bytes::{Bytes, BytesMut};

use super::transform::{FnTransform, Identity, Transform};
use crate::config::ChunkRule;
use crate::error::RechunkError;

/// Emission state of a [`Rechunker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// The designated first chunk has not been emitted yet.
    First,
    /// Every further emission is an "other" chunk.
    Other,
    /// Finished, aborted or failed.
    Closed,
}

/// A stateful engine that re-frames a byte stream according to a
/// [`ChunkRule`].
///
/// `Rechunker` accepts bytes via `push()` and emits chunks as soon as the
/// buffered data satisfies the rule, passing every chunk through a
/// [`Transform`] on the way out. Bytes that are not enough for one more
/// chunk stay buffered until more data arrives or the stream finishes.
///
/// # Streaming API
///
/// - Call `push()` with data in any size (1 byte to megabytes)
/// - Returns the chunks that became available, in order
/// - Call `finish()` when the stream ends to emit the remainder
/// - Call `abort()` (or drop the rechunker) to discard the remainder
///
/// # Determinism
///
/// For the identity transform, the concatenation of all emitted chunks is
/// the concatenation of all pushed chunks, and the chunk boundaries only
/// depend on the pushed bytes, not on how they were split into `push()`
/// calls (except for the `exhausts_input` flag handed to
/// [`Transform::transform_other`]).
///
/// # Memory
///
/// After every `push()` fewer bytes remain buffered than the rule needs for
/// the next chunk.
///
/// # Example
///
/// ```
/// use rechunkrs::{ChunkRule, Identity, Rechunker};
///
/// let rule = ChunkRule::fixed(16)?.with_multiples(true);
/// let mut rechunker = Rechunker::new(rule, Identity);
///
/// let chunks = rechunker.push(vec![7u8; 1022])?;
/// assert_eq!(chunks[0].len(), 1008);
/// assert_eq!(rechunker.pending_len(), 14);
///
/// let last = rechunker.finish()?.expect("14 bytes left");
/// assert_eq!(last.len(), 14);
/// # Ok::<(), rechunkrs::RechunkError>(())
/// ```
pub struct Rechunker<T = Identity> {
    rule: ChunkRule,
    transform: T,
    leftover: BytesMut,
    phase: Phase,
    offset: u64,
}

impl<T: Transform> Rechunker<T> {
    /// Creates a new rechunker with the given rule and transform.
    ///
    /// # Arguments
    ///
    /// * `rule` - The length rule for emitted chunks
    /// * `transform` - Hooks applied to the first, other and last chunks
    pub fn new(rule: ChunkRule, transform: T) -> Self {
        tracing::debug!(
            first_length = rule.first_length(),
            other_length = rule.other_length(),
            allow_multiples = rule.allow_multiples(),
            "rechunker created"
        );

        Self {
            rule,
            transform,
            leftover: BytesMut::new(),
            phase: if rule.has_first() {
                Phase::First
            } else {
                Phase::Other
            },
            offset: 0,
        }
    }

    /// Pushes data into the rechunker and returns the chunks that became
    /// available.
    ///
    /// # Processing Flow
    ///
    /// 1. Append `data` to the buffered bytes
    /// 2. Emit the first chunk once `first_length` bytes are buffered
    /// 3. Emit other chunks while at least `other_length` bytes are buffered
    /// 4. Keep the rest for the next call
    ///
    /// Transformed chunks of length zero are not returned.
    ///
    /// # Errors
    ///
    /// Returns [`RechunkError::Closed`] after `finish()`, `abort()` or a
    /// previous error, and propagates any error returned by the transform.
    /// A transform error closes the rechunker and drops the buffered bytes.
    pub fn push(&mut self, data: impl AsRef<[u8]>) -> Result<Vec<Bytes>, RechunkError> {
        self.ensure_open()?;
        self.leftover.extend_from_slice(data.as_ref());

        let mut out = Vec::new();
        if let Err(e) = self.drain(&mut out) {
            self.close();
            return Err(e);
        }
        Ok(out)
    }

    /// Finalizes the stream and returns the last chunk, if any.
    ///
    /// The remaining bytes (possibly none) are handed to
    /// [`Transform::transform_last`] exactly once. `None` is returned when
    /// the transformed remainder is empty.
    ///
    /// # Errors
    ///
    /// Returns [`RechunkError::Closed`] if the stream is already closed,
    /// and propagates any error returned by the transform.
    pub fn finish(&mut self) -> Result<Option<Bytes>, RechunkError> {
        self.ensure_open()?;
        self.phase = Phase::Closed;

        let remainder = self.leftover.split().freeze();
        let residue = remainder.len();
        self.offset += residue as u64;

        let chunk = self.transform.transform_last(remainder)?;
        tracing::debug!(
            residue,
            emitted = chunk.len(),
            offset = self.offset,
            "rechunker finished"
        );
        Ok((!chunk.is_empty()).then_some(chunk))
    }

    /// Pushes every chunk, then finishes, returning all emitted chunks.
    ///
    /// # Example
    ///
    /// ```
    /// use rechunkrs::{ChunkRule, Identity, Rechunker};
    ///
    /// let rule = ChunkRule::fixed(4)?;
    /// let chunks = Rechunker::new(rule, Identity).rechunk([&b"abcde"[..], &b"fghij"[..]])?;
    /// let lengths: Vec<_> = chunks.iter().map(|c| c.len()).collect();
    /// assert_eq!(lengths, vec![4, 4, 2]);
    /// # Ok::<(), rechunkrs::RechunkError>(())
    /// ```
    pub fn rechunk<I>(mut self, chunks: I) -> Result<Vec<Bytes>, RechunkError>
    where
        I: IntoIterator,
        I::Item: AsRef<[u8]>,
    {
        let mut out = Vec::new();
        for chunk in chunks {
            out.extend(self.push(chunk)?);
        }
        out.extend(self.finish()?);
        Ok(out)
    }

    /// Emits every chunk the buffered bytes allow.
    fn drain(&mut self, out: &mut Vec<Bytes>) -> Result<(), RechunkError> {
        if self.phase == Phase::First {
            let first_length = self.rule.first_length();
            if self.leftover.len() < first_length {
                return Ok(());
            }

            let chunk = self.leftover.split_to(first_length).freeze();
            self.phase = Phase::Other;
            self.offset += first_length as u64;
            let chunk = self.transform.transform_first(chunk)?;
            emit(out, chunk, "first");
        }

        while let Some(usable) = self.rule.usable_len(self.leftover.len()) {
            let chunk = self.leftover.split_to(usable).freeze();
            let exhausts_input = self.leftover.is_empty();
            self.offset += usable as u64;
            let chunk = self.transform.transform_other(chunk, exhausts_input)?;
            emit(out, chunk, "other");
        }

        Ok(())
    }
}

impl<T> Rechunker<T> {
    /// Discards the buffered bytes and closes the stream without calling
    /// [`Transform::transform_last`].
    ///
    /// Returns the number of bytes discarded. Dropping an unfinished
    /// rechunker has the same effect.
    pub fn abort(&mut self) -> usize {
        let discarded = self.leftover.len();
        if self.phase != Phase::Closed {
            tracing::debug!(discarded, offset = self.offset, "rechunker aborted");
        }
        self.close();
        discarded
    }

    /// Returns the rule this rechunker applies.
    pub fn rule(&self) -> &ChunkRule {
        &self.rule
    }

    /// Returns the number of bytes buffered and waiting for more input.
    pub fn pending_len(&self) -> usize {
        self.leftover.len()
    }

    /// Returns the number of input bytes handed to the transform so far.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Returns true once the stream is finished, aborted or failed.
    pub fn is_closed(&self) -> bool {
        self.phase == Phase::Closed
    }

    /// Returns a reference to the transform.
    pub fn transform(&self) -> &T {
        &self.transform
    }

    /// Returns a mutable reference to the transform.
    pub fn transform_mut(&mut self) -> &mut T {
        &mut self.transform
    }

    /// Consumes the rechunker, returning the transform.
    pub fn into_transform(self) -> T {
        self.transform
    }

    fn ensure_open(&self) -> Result<(), RechunkError> {
        if self.phase == Phase::Closed {
            return Err(RechunkError::Closed);
        }
        Ok(())
    }

    fn close(&mut self) {
        self.phase = Phase::Closed;
        self.leftover.clear();
    }
}

impl<F, O, L> Rechunker<FnTransform<F, O, L>>
where
    F: FnMut(Bytes) -> Result<Bytes, RechunkError>,
    O: FnMut(Bytes, bool) -> Result<Bytes, RechunkError>,
    L: FnMut(Bytes) -> Result<Bytes, RechunkError>,
{
    /// Creates a rechunker whose hooks are plain closures.
    ///
    /// # Example
    ///
    /// ```
    /// use bytes::Bytes;
    /// use rechunkrs::{ChunkRule, Rechunker};
    ///
    /// let rule = ChunkRule::new(2, 3)?;
    /// let rechunker = Rechunker::from_fns(
    ///     rule,
    ///     |_first| Ok(Bytes::new()),
    ///     |chunk, _exhausts_input| Ok(chunk),
    ///     |last| Ok(Bytes::from(last.iter().rev().copied().collect::<Vec<_>>())),
    /// );
    /// let out = rechunker.rechunk([&b"xxabcdef"[..]])?;
    /// assert_eq!(out, vec![Bytes::from_static(b"abc"), Bytes::from_static(b"def")]);
    /// # Ok::<(), rechunkrs::RechunkError>(())
    /// ```
    pub fn from_fns(rule: ChunkRule, first: F, other: O, last: L) -> Self {
        Self::new(rule, FnTransform::new(first, other, last))
    }
}

impl Default for Rechunker<Identity> {
    /// Passes bytes through in 16-byte multiples.
    fn default() -> Self {
        Self::new(ChunkRule::default(), Identity)
    }
}

impl<T> fmt::Debug for Rechunker<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rechunker")
            .field("rule", &self.rule)
            .field("phase", &self.phase)
            .field("pending", &self.leftover.len())
            .field("offset", &self.offset)
            .finish_non_exhaustive()
    }
}

fn emit(out: &mut Vec<Bytes>, chunk: Bytes, kind: &'static str) {
    tracing::trace!(kind, len = chunk.len(), "chunk emitted");
    if !chunk.is_empty() {
        out.push(chunk);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lengths(chunks: &[Bytes]) -> Vec<usize> {
        chunks.iter().map(|c| c.len()).collect()
    }

    #[test]
    fn test_first_chunk_then_fixed() {
        let mut rechunker = Rechunker::new(ChunkRule::new(13, 16).unwrap(), Identity);

        assert!(rechunker.push([0u8; 12]).unwrap().is_empty());
        assert_eq!(rechunker.pending_len(), 12);

        let chunks = rechunker.push([0u8; 44]).unwrap();
        assert_eq!(lengths(&chunks), vec![13, 16, 16]);
        assert_eq!(rechunker.pending_len(), 11);

        let chunks = rechunker.push([0u8; 8]).unwrap();
        assert_eq!(lengths(&chunks), vec![16]);

        let last = rechunker.finish().unwrap().unwrap();
        assert_eq!(last.len(), 3);
        assert_eq!(rechunker.offset(), 64);
    }

    #[test]
    fn test_closed_after_finish() {
        let mut rechunker = Rechunker::new(ChunkRule::fixed(4).unwrap(), Identity);
        rechunker.push(b"abc").unwrap();
        rechunker.finish().unwrap();

        assert!(rechunker.is_closed());
        assert!(matches!(rechunker.push(b"d"), Err(RechunkError::Closed)));
        assert!(matches!(rechunker.finish(), Err(RechunkError::Closed)));
    }

    #[test]
    fn test_exhausts_input_flag() {
        let mut flags = Vec::new();
        let rule = ChunkRule::fixed(4).unwrap();
        let mut rechunker = Rechunker::from_fns(
            rule,
            |chunk| Ok(chunk),
            |chunk, exhausts_input| {
                flags.push(exhausts_input);
                Ok(chunk)
            },
            |chunk| Ok(chunk),
        );

        rechunker.push(b"abcdefgh").unwrap();
        rechunker.push(b"ijklm").unwrap();
        rechunker.finish().unwrap();
        drop(rechunker);

        assert_eq!(flags, vec![false, true, false]);
    }

    #[test]
    fn test_transform_error_closes() {
        let rule = ChunkRule::fixed(2).unwrap();
        let mut rechunker = Rechunker::from_fns(
            rule,
            |chunk| Ok(chunk),
            |_chunk, _| Err(RechunkError::Primitive("boom".into())),
            |chunk| Ok(chunk),
        );

        assert!(matches!(
            rechunker.push(b"abcde"),
            Err(RechunkError::Primitive(_))
        ));
        assert!(rechunker.is_closed());
        assert_eq!(rechunker.pending_len(), 0);
        assert!(matches!(rechunker.push(b"f"), Err(RechunkError::Closed)));
    }

    #[test]
    fn test_abort_discards_without_last() {
        let mut last_called = false;
        let rule = ChunkRule::fixed(16).unwrap();
        let mut rechunker = Rechunker::from_fns(
            rule,
            |c| Ok(c),
            |c, _| Ok(c),
            |c| {
                last_called = true;
                Ok(c)
            },
        );

        rechunker.push([1u8; 20]).unwrap();
        assert_eq!(rechunker.abort(), 4);
        assert!(rechunker.is_closed());
        assert!(matches!(rechunker.finish(), Err(RechunkError::Closed)));
        drop(rechunker);

        assert!(!last_called);
    }

    #[test]
    fn test_default_passes_multiples() {
        let mut rechunker = Rechunker::default();
        let chunks = rechunker.push([0u8; 40]).unwrap();
        assert_eq!(lengths(&chunks), vec![32]);
        assert_eq!(rechunker.finish().unwrap().map(|c| c.len()), Some(8));
    }
}

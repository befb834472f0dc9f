//! Emission hooks applied by the [`Rechunker`](super::Rechunker).

use bytes::Bytes;

use crate::error::RechunkError;

/// Hooks invoked on every chunk a [`Rechunker`](super::Rechunker) emits.
///
/// Each hook receives the re-framed bytes and returns what should be sent
/// downstream. Returning an empty `Bytes` suppresses the emission. Returning
/// an error closes the stream.
///
/// All hooks default to the identity, so an implementation only overrides
/// the ones it needs.
///
/// # Example
///
/// ```
/// use bytes::Bytes;
/// use rechunkrs::{ChunkRule, RechunkError, Rechunker, Transform};
///
/// /// Drops a fixed-size header and uppercases the rest.
/// struct StripHeader;
///
/// impl Transform for StripHeader {
///     fn transform_first(&mut self, _header: Bytes) -> Result<Bytes, RechunkError> {
///         Ok(Bytes::new())
///     }
///
///     fn transform_other(
///         &mut self,
///         chunk: Bytes,
///         _exhausts_input: bool,
///     ) -> Result<Bytes, RechunkError> {
///         Ok(Bytes::from(chunk.to_ascii_uppercase()))
///     }
/// }
///
/// let rule = ChunkRule::new(4, 1)?.with_multiples(true);
/// let out = Rechunker::new(rule, StripHeader).rechunk([&b"HDR:hello"[..]])?;
/// assert_eq!(out, vec![Bytes::from_static(b"HELLO")]);
/// # Ok::<(), RechunkError>(())
/// ```
pub trait Transform {
    /// Called once with the designated first chunk (exactly
    /// `first_length` bytes).
    fn transform_first(&mut self, chunk: Bytes) -> Result<Bytes, RechunkError> {
        Ok(chunk)
    }

    /// Called for every chunk that satisfies `other_length`.
    ///
    /// `exhausts_input` is true when this chunk consumed every byte pushed
    /// so far. It says nothing about whether the stream has ended: more
    /// data may still be pushed later.
    fn transform_other(
        &mut self,
        chunk: Bytes,
        exhausts_input: bool,
    ) -> Result<Bytes, RechunkError> {
        let _ = exhausts_input;
        Ok(chunk)
    }

    /// Called exactly once when the stream finishes, with whatever bytes
    /// are left (possibly none).
    fn transform_last(&mut self, chunk: Bytes) -> Result<Bytes, RechunkError> {
        Ok(chunk)
    }
}

impl<T: Transform + ?Sized> Transform for Box<T> {
    fn transform_first(&mut self, chunk: Bytes) -> Result<Bytes, RechunkError> {
        (**self).transform_first(chunk)
    }

    fn transform_other(
        &mut self,
        chunk: Bytes,
        exhausts_input: bool,
    ) -> Result<Bytes, RechunkError> {
        (**self).transform_other(chunk, exhausts_input)
    }

    fn transform_last(&mut self, chunk: Bytes) -> Result<Bytes, RechunkError> {
        (**self).transform_last(chunk)
    }
}

/// Passes every chunk through unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Identity;

impl Transform for Identity {}

/// A [`Transform`] built from three closures.
///
/// Created by [`Rechunker::from_fns`](super::Rechunker::from_fns).
#[derive(Clone)]
pub struct FnTransform<F, O, L> {
    first: F,
    other: O,
    last: L,
}

impl<F, O, L> FnTransform<F, O, L>
where
    F: FnMut(Bytes) -> Result<Bytes, RechunkError>,
    O: FnMut(Bytes, bool) -> Result<Bytes, RechunkError>,
    L: FnMut(Bytes) -> Result<Bytes, RechunkError>,
{
    /// Wraps the first, other and last hooks.
    pub fn new(first: F, other: O, last: L) -> Self {
        Self { first, other, last }
    }
}

impl<F, O, L> Transform for FnTransform<F, O, L>
where
    F: FnMut(Bytes) -> Result<Bytes, RechunkError>,
    O: FnMut(Bytes, bool) -> Result<Bytes, RechunkError>,
    L: FnMut(Bytes) -> Result<Bytes, RechunkError>,
{
    fn transform_first(&mut self, chunk: Bytes) -> Result<Bytes, RechunkError> {
        (self.first)(chunk)
    }

    fn transform_other(
        &mut self,
        chunk: Bytes,
        exhausts_input: bool,
    ) -> Result<Bytes, RechunkError> {
        (self.other)(chunk, exhausts_input)
    }

    fn transform_last(&mut self, chunk: Bytes) -> Result<Bytes, RechunkError> {
        (self.last)(chunk)
    }
}

impl<F, O, L> std::fmt::Debug for FnTransform<F, O, L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnTransform").finish_non_exhaustive()
    }
}

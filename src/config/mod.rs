//! Configuration for re-framing behavior.
//!
//! This module provides the value types that configure a stream:
//!
//! - [`ChunkRule`] - Controls the length of every emitted chunk
//! - [`EncryptConfig`] - Initialization value and padding for CBC encryption
//! - [`DecryptConfig`] - Initialization value delivery and padding for CBC decryption
//!
//! # Example
//!
//! ```
//! use rechunkrs::ChunkRule;
//!
//! // A 13-byte header followed by 16-byte chunks
//! let rule = ChunkRule::new(13, 16)?;
//!
//! // Whole multiples of 16 bytes, as large as the buffered data allows
//! let rule = ChunkRule::fixed(16)?.with_multiples(true);
//! assert!(rule.allow_multiples());
//! # Ok::<(), rechunkrs::RechunkError>(())
//! ```

mod cipher;

pub use cipher::{DecryptConfig, EncryptConfig};

use crate::error::RechunkError;

/// Default unit length (one AES block).
pub const DEFAULT_OTHER_LENGTH: usize = 16;

/// Length rule applied by a [`Rechunker`](crate::Rechunker).
///
/// A rule has three parts:
///
/// - `first_length` - Length of the designated first chunk. `0` means there
///   is no special first chunk and the stream starts with "other" chunks.
/// - `other_length` - Length of every following chunk (must be non-zero).
/// - `allow_multiples` - When set, an "other" emission takes the largest
///   multiple of `other_length` currently buffered instead of exactly one.
///
/// Whatever is left when the stream finishes is handed over as the last
/// chunk, whatever its length.
///
/// # Example
///
/// ```
/// use rechunkrs::ChunkRule;
///
/// let rule = ChunkRule::new(0, 16)?.with_multiples(true);
/// assert_eq!(rule.first_length(), 0);
/// assert_eq!(rule.other_length(), 16);
/// # Ok::<(), rechunkrs::RechunkError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkRule {
    /// Length of the first chunk, `0` for none.
    first_length: usize,

    /// Length (or unit length, with multiples) of every other chunk.
    other_length: usize,

    /// Whether other chunks may span several `other_length` units.
    allow_multiples: bool,
}

impl ChunkRule {
    /// Creates a new rule with multiples disabled.
    ///
    /// # Errors
    ///
    /// Returns [`RechunkError::InvalidRule`] if `other_length` is zero.
    ///
    /// # Example
    ///
    /// ```
    /// use rechunkrs::ChunkRule;
    ///
    /// assert!(ChunkRule::new(13, 16).is_ok());
    /// assert!(ChunkRule::new(13, 0).is_err());
    /// ```
    pub fn new(first_length: usize, other_length: usize) -> Result<Self, RechunkError> {
        if other_length == 0 {
            return Err(RechunkError::InvalidRule {
                message: "other_length must be a strictly positive integer",
            });
        }

        Ok(Self {
            first_length,
            other_length,
            allow_multiples: false,
        })
    }

    /// Creates a rule without a special first chunk.
    pub fn fixed(other_length: usize) -> Result<Self, RechunkError> {
        Self::new(0, other_length)
    }

    /// Creates a rule from untyped numeric input, such as values read from
    /// a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`RechunkError::InvalidRule`] if `first_length` is not a
    /// non-negative integer or `other_length` is not a strictly positive
    /// integer.
    ///
    /// # Example
    ///
    /// ```
    /// use rechunkrs::ChunkRule;
    ///
    /// assert!(ChunkRule::from_f64(13.0, 16.0).is_ok());
    /// assert!(ChunkRule::from_f64(11.3, 4.0).is_err());
    /// assert!(ChunkRule::from_f64(-11.0, 4.0).is_err());
    /// ```
    pub fn from_f64(first_length: f64, other_length: f64) -> Result<Self, RechunkError> {
        let first_length = whole_length(first_length).ok_or(RechunkError::InvalidRule {
            message: "first_length must be a non-negative integer",
        })?;
        let other_length = whole_length(other_length).ok_or(RechunkError::InvalidRule {
            message: "other_length must be a strictly positive integer",
        })?;

        Self::new(first_length, other_length)
    }

    /// Enables or disables multiples of `other_length`.
    pub fn with_multiples(mut self, allow: bool) -> Self {
        self.allow_multiples = allow;
        self
    }

    /// Returns the first chunk length (`0` when there is no first chunk).
    pub fn first_length(&self) -> usize {
        self.first_length
    }

    /// Returns the length of other chunks.
    pub fn other_length(&self) -> usize {
        self.other_length
    }

    /// Returns whether other chunks may be multiples of `other_length`.
    pub fn allow_multiples(&self) -> bool {
        self.allow_multiples
    }

    /// Returns whether the rule has a special first chunk.
    pub fn has_first(&self) -> bool {
        self.first_length > 0
    }

    /// Number of bytes an "other" emission takes out of `available`
    /// buffered bytes, or `None` if that is not enough for one chunk.
    pub(crate) fn usable_len(&self, available: usize) -> Option<usize> {
        if available < self.other_length {
            None
        } else if self.allow_multiples {
            Some(available / self.other_length * self.other_length)
        } else {
            Some(self.other_length)
        }
    }
}

impl Default for ChunkRule {
    /// Multiples of [`DEFAULT_OTHER_LENGTH`] without a first chunk.
    fn default() -> Self {
        Self {
            first_length: 0,
            other_length: DEFAULT_OTHER_LENGTH,
            allow_multiples: true,
        }
    }
}

fn whole_length(value: f64) -> Option<usize> {
    // usize::MAX rounds up to 2^64 as an f64, which no usize can hold.
    if !value.is_finite()
        || value < 0.0
        || value.fract() != 0.0
        || value >= usize::MAX as f64
    {
        return None;
    }
    Some(value as usize)
}

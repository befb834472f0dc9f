//! Error types for rechunkrs.

use std::io;

use thiserror::Error;

/// Errors that can occur while re-framing or transforming a byte stream.
///
/// Every variant is fatal for the stream that produced it: once a
/// [`Rechunker`](crate::Rechunker) has returned an error it is closed and
/// any resident bytes are dropped.
#[derive(Debug, Error)]
pub enum RechunkError {
    /// An I/O error occurred in the transport feeding or draining the stream.
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// Invalid chunk length rule.
    #[error("invalid chunk rule: {message}")]
    InvalidRule {
        /// Description of what was invalid.
        message: &'static str,
    },

    /// The initialization value does not match the cipher block length.
    #[error("invalid initialization value: expected {expected} bytes, got {actual}")]
    InvalidIv {
        /// The block length of the cipher.
        expected: usize,
        /// The length that was supplied.
        actual: usize,
    },

    /// A ciphertext stream ended with a partial block.
    #[error(
        "stream length must be a multiple of the block length ({residue} trailing bytes, block length {block_len})"
    )]
    Framing {
        /// Number of bytes left over at the end of the stream.
        residue: usize,
        /// The cipher block length.
        block_len: usize,
    },

    /// Terminal block padding was malformed or missing.
    #[error("padding error: {0}")]
    Padding(String),

    /// The block cipher primitive rejected its input.
    #[error("block cipher error: {0}")]
    Primitive(String),

    /// The stream was already finished, aborted or failed.
    #[error("stream is closed")]
    Closed,
}

impl From<RechunkError> for io::Error {
    fn from(e: RechunkError) -> Self {
        match e {
            RechunkError::Io(e) => e,
            other => io::Error::new(io::ErrorKind::InvalidData, other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "test");
        let err: RechunkError = io_err.into();
        assert!(matches!(err, RechunkError::Io(_)));
    }

    #[test]
    fn test_into_io_error_keeps_kind() {
        let err = RechunkError::Io(io::Error::new(io::ErrorKind::BrokenPipe, "gone"));
        let io_err: io::Error = err.into();
        assert_eq!(io_err.kind(), io::ErrorKind::BrokenPipe);

        let io_err: io::Error = RechunkError::Closed.into();
        assert_eq!(io_err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_display() {
        let err = RechunkError::Framing {
            residue: 5,
            block_len: 16,
        };
        assert!(err.to_string().contains("multiple of the block length"));

        let err = RechunkError::InvalidIv {
            expected: 16,
            actual: 8,
        };
        assert!(err.to_string().contains("expected 16 bytes, got 8"));
    }
}

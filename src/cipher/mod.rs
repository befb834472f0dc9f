//! Block cipher primitive seam.
//!
//! The CBC stream stages never touch a cipher directly. They call a
//! [`CbcPrimitive`], handing it the chaining value to start from, so every
//! call is stateless and all chaining state lives in the stage.
//!
//! - [`CbcPrimitive`] - Encrypt/decrypt a block-aligned buffer from a given chaining value
//! - [`Padding`] - Padding scheme applied to the final block
//! - [`AesCbc`] - AES-128/192/256 implementation (feature `aes-cbc`)

#[cfg(feature = "aes-cbc")]
mod aes_cbc;

#[cfg(feature = "aes-cbc")]
pub use aes_cbc::{AES_BLOCK_LEN, AesCbc};

use std::fmt;

use crate::error::RechunkError;

/// Padding scheme for the final block of a stream.
///
/// Streams configured without padding must be block-aligned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Padding {
    /// PKCS#7: `n` bytes of value `n`.
    Pkcs7,
    /// ISO/IEC 7816-4: `0x80` followed by zeros.
    Iso7816,
    /// ANSI X9.23: zeros followed by the pad length.
    AnsiX923,
}

impl fmt::Display for Padding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Padding::Pkcs7 => "pkcs7",
            Padding::Iso7816 => "iso7816",
            Padding::AnsiX923 => "ansix923",
        };
        f.write_str(name)
    }
}

/// A block cipher in CBC mode, used one call at a time.
///
/// Implementations must be pure: the result of a call only depends on its
/// arguments and the key held by the implementation.
pub trait CbcPrimitive {
    /// Block length in bytes. Chaining values are exactly this long.
    fn block_len(&self) -> usize;

    /// Encrypts `data` starting from `chaining`.
    ///
    /// Without padding `data` must be a multiple of the block length; with
    /// padding the result is always block-aligned and non-empty.
    fn encrypt(
        &self,
        data: &[u8],
        chaining: &[u8],
        padding: Option<Padding>,
    ) -> Result<Vec<u8>, RechunkError>;

    /// Decrypts `data` starting from `chaining`, removing `padding` from the
    /// final block when given.
    fn decrypt(
        &self,
        data: &[u8],
        chaining: &[u8],
        padding: Option<Padding>,
    ) -> Result<Vec<u8>, RechunkError>;
}

impl<P: CbcPrimitive + ?Sized> CbcPrimitive for &P {
    fn block_len(&self) -> usize {
        (**self).block_len()
    }

    fn encrypt(
        &self,
        data: &[u8],
        chaining: &[u8],
        padding: Option<Padding>,
    ) -> Result<Vec<u8>, RechunkError> {
        (**self).encrypt(data, chaining, padding)
    }

    fn decrypt(
        &self,
        data: &[u8],
        chaining: &[u8],
        padding: Option<Padding>,
    ) -> Result<Vec<u8>, RechunkError> {
        (**self).decrypt(data, chaining, padding)
    }
}

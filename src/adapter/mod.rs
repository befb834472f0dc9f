//! CBC stream stages built on the [`Rechunker`](crate::Rechunker).
//!
//! Both stages are plain configurations of the re-framing engine: a
//! [`ChunkRule`](crate::ChunkRule) that produces whole cipher blocks and a
//! [`Transform`](crate::Transform) that runs them through a
//! [`CbcPrimitive`](crate::CbcPrimitive) while carrying the chaining value
//! from one chunk to the next.
//!
//! - [`encryptor`] / [`aes_cbc_encryptor`] - plaintext in, ciphertext out
//! - [`decryptor`] / [`aes_cbc_decryptor`] - ciphertext in, plaintext out
//!
//! # Example
//!
//! ```
//! use rechunkrs::{aes_cbc_decryptor, aes_cbc_encryptor, DecryptConfig, EncryptConfig, Padding};
//!
//! let key = b"SuperDuperSecretSuperDuperSecret";
//! let config = EncryptConfig::new(*b"HushItsASecret!!")
//!     .with_padding(Padding::Pkcs7)
//!     .with_embedded_iv(true);
//!
//! let ciphertext = aes_cbc_encryptor(key, config)?.rechunk([&b"A short story."[..]])?;
//!
//! // The decryptor reads the IV from the first block of the stream.
//! let plaintext = aes_cbc_decryptor(key, DecryptConfig::new().with_padding(Padding::Pkcs7))?
//!     .rechunk(&ciphertext)?;
//! assert_eq!(plaintext.concat(), b"A short story.");
//! # Ok::<(), rechunkrs::RechunkError>(())
//! ```

mod decrypt;
mod encrypt;

#[cfg(feature = "aes-cbc")]
pub use decrypt::aes_cbc_decryptor;
pub use decrypt::{CbcDecrypt, DecryptState, Decryptor, decryptor};
#[cfg(feature = "aes-cbc")]
pub use encrypt::aes_cbc_encryptor;
pub use encrypt::{CbcEncrypt, EncryptState, Encryptor, encryptor};

use bytes::Bytes;

use crate::error::RechunkError;

fn check_iv(iv: &Bytes, block_len: usize) -> Result<(), RechunkError> {
    if iv.len() != block_len {
        return Err(RechunkError::InvalidIv {
            expected: block_len,
            actual: iv.len(),
        });
    }
    Ok(())
}

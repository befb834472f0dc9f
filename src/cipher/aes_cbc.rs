//! AES-CBC primitive backed by the RustCrypto `aes` and `cbc` crates.

use std::fmt;

use aes::{Aes128, Aes192, Aes256};
use cbc::cipher::block_padding::{AnsiX923, Iso7816, NoPadding, Pkcs7};
use cbc::cipher::{BlockCipher, BlockDecryptMut, BlockEncryptMut, KeyInit, KeyIvInit};
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::{CbcPrimitive, Padding};
use crate::error::RechunkError;

/// AES block length in bytes, for every key size.
pub const AES_BLOCK_LEN: usize = 16;

/// AES in CBC mode. The key length selects AES-128, AES-192 or AES-256.
///
/// The key is wiped from memory when the value is dropped.
///
/// # Example
///
/// ```
/// use rechunkrs::{AesCbc, CbcPrimitive, Padding};
///
/// let aes = AesCbc::new(b"SuperDuperSecretSuperDuperSecret")?;
/// assert_eq!(aes.key_bits(), 256);
///
/// let iv = [0u8; 16];
/// let ciphertext = aes.encrypt(b"short", &iv, Some(Padding::Pkcs7))?;
/// assert_eq!(ciphertext.len(), 16);
/// assert_eq!(aes.decrypt(&ciphertext, &iv, Some(Padding::Pkcs7))?, b"short");
/// # Ok::<(), rechunkrs::RechunkError>(())
/// ```
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct AesCbc {
    key: Vec<u8>,
}

impl AesCbc {
    /// Creates the primitive from a 16, 24 or 32 byte key.
    ///
    /// # Errors
    ///
    /// Returns [`RechunkError::Primitive`] for any other key length.
    pub fn new(key: &[u8]) -> Result<Self, RechunkError> {
        match key.len() {
            16 | 24 | 32 => Ok(Self { key: key.to_vec() }),
            n => Err(RechunkError::Primitive(format!(
                "AES key must be 16, 24 or 32 bytes, got {n}"
            ))),
        }
    }

    /// Returns the key size in bits.
    pub fn key_bits(&self) -> usize {
        self.key.len() * 8
    }

    fn check_aligned(data: &[u8], what: &str) -> Result<(), RechunkError> {
        if data.len() % AES_BLOCK_LEN != 0 {
            return Err(RechunkError::Primitive(format!(
                "{what} of {} bytes is not a multiple of the block length",
                data.len()
            )));
        }
        Ok(())
    }
}

impl CbcPrimitive for AesCbc {
    fn block_len(&self) -> usize {
        AES_BLOCK_LEN
    }

    fn encrypt(
        &self,
        data: &[u8],
        chaining: &[u8],
        padding: Option<Padding>,
    ) -> Result<Vec<u8>, RechunkError> {
        if padding.is_none() {
            Self::check_aligned(data, "unpadded plaintext")?;
            if data.is_empty() {
                return Ok(Vec::new());
            }
        }

        match self.key.len() {
            16 => encrypt_with::<Aes128>(&self.key, chaining, data, padding),
            24 => encrypt_with::<Aes192>(&self.key, chaining, data, padding),
            _ => encrypt_with::<Aes256>(&self.key, chaining, data, padding),
        }
    }

    fn decrypt(
        &self,
        data: &[u8],
        chaining: &[u8],
        padding: Option<Padding>,
    ) -> Result<Vec<u8>, RechunkError> {
        Self::check_aligned(data, "ciphertext")?;
        if data.is_empty() && padding.is_none() {
            return Ok(Vec::new());
        }

        match self.key.len() {
            16 => decrypt_with::<Aes128>(&self.key, chaining, data, padding),
            24 => decrypt_with::<Aes192>(&self.key, chaining, data, padding),
            _ => decrypt_with::<Aes256>(&self.key, chaining, data, padding),
        }
    }
}

impl fmt::Debug for AesCbc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AesCbc")
            .field("key_bits", &self.key_bits())
            .finish_non_exhaustive()
    }
}

fn encrypt_with<C>(
    key: &[u8],
    iv: &[u8],
    data: &[u8],
    padding: Option<Padding>,
) -> Result<Vec<u8>, RechunkError>
where
    C: BlockEncryptMut + BlockCipher + KeyInit,
{
    let cipher = cbc::Encryptor::<C>::new_from_slices(key, iv)
        .map_err(|_| RechunkError::Primitive("invalid key or chaining value length".into()))?;

    Ok(match padding {
        None => cipher.encrypt_padded_vec_mut::<NoPadding>(data),
        Some(Padding::Pkcs7) => cipher.encrypt_padded_vec_mut::<Pkcs7>(data),
        Some(Padding::Iso7816) => cipher.encrypt_padded_vec_mut::<Iso7816>(data),
        Some(Padding::AnsiX923) => cipher.encrypt_padded_vec_mut::<AnsiX923>(data),
    })
}

fn decrypt_with<C>(
    key: &[u8],
    iv: &[u8],
    data: &[u8],
    padding: Option<Padding>,
) -> Result<Vec<u8>, RechunkError>
where
    C: BlockDecryptMut + BlockCipher + KeyInit,
{
    let cipher = cbc::Decryptor::<C>::new_from_slices(key, iv)
        .map_err(|_| RechunkError::Primitive("invalid key or chaining value length".into()))?;

    let result = match padding {
        None => cipher.decrypt_padded_vec_mut::<NoPadding>(data),
        Some(Padding::Pkcs7) => cipher.decrypt_padded_vec_mut::<Pkcs7>(data),
        Some(Padding::Iso7816) => cipher.decrypt_padded_vec_mut::<Iso7816>(data),
        Some(Padding::AnsiX923) => cipher.decrypt_padded_vec_mut::<AnsiX923>(data),
    };
    result.map_err(|_| match padding {
        Some(padding) => RechunkError::Padding(format!("invalid {padding} padding")),
        None => RechunkError::Primitive("decryption failed".into()),
    })
}

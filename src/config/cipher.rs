//! Cipher stage configuration.

use bytes::Bytes;

use crate::cipher::Padding;

/// Configuration for a CBC encryption stage.
///
/// # Example
///
/// ```
/// use rechunkrs::{EncryptConfig, Padding};
///
/// let config = EncryptConfig::new(*b"HushItsASecret!!")
///     .with_padding(Padding::Pkcs7)
///     .with_embedded_iv(true);
/// assert!(config.embed_iv());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptConfig {
    iv: Bytes,
    padding: Option<Padding>,
    embed_iv: bool,
}

impl EncryptConfig {
    /// Creates a configuration with the given initialization value, no
    /// padding, and the IV transmitted out-of-band.
    ///
    /// The IV length is checked against the cipher block length when the
    /// encryptor is built.
    pub fn new(iv: impl AsRef<[u8]>) -> Self {
        Self {
            iv: Bytes::copy_from_slice(iv.as_ref()),
            padding: None,
            embed_iv: false,
        }
    }

    /// Sets the padding scheme applied to the final block.
    pub fn with_padding(mut self, padding: Padding) -> Self {
        self.padding = Some(padding);
        self
    }

    /// Writes the IV in front of the ciphertext when set.
    pub fn with_embedded_iv(mut self, embed: bool) -> Self {
        self.embed_iv = embed;
        self
    }

    /// Returns the initialization value.
    pub fn iv(&self) -> &Bytes {
        &self.iv
    }

    /// Returns the padding scheme, if any.
    pub fn padding(&self) -> Option<Padding> {
        self.padding
    }

    /// Returns whether the IV is written at the start of the stream.
    pub fn embed_iv(&self) -> bool {
        self.embed_iv
    }
}

/// Configuration for a CBC decryption stage.
///
/// Without an explicit IV the first block of the ciphertext stream is
/// taken as the IV.
///
/// # Example
///
/// ```
/// use rechunkrs::{DecryptConfig, Padding};
///
/// // IV read from the stream
/// let embedded = DecryptConfig::new().with_padding(Padding::Pkcs7);
/// assert!(embedded.iv().is_none());
///
/// // IV shared out-of-band
/// let shared = DecryptConfig::new().with_iv(*b"HushItsASecret!!");
/// assert!(shared.iv().is_some());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecryptConfig {
    iv: Option<Bytes>,
    padding: Option<Padding>,
}

impl DecryptConfig {
    /// Creates a configuration that reads the IV from the stream and
    /// expects no padding.
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses an IV supplied out-of-band.
    pub fn with_iv(mut self, iv: impl AsRef<[u8]>) -> Self {
        self.iv = Some(Bytes::copy_from_slice(iv.as_ref()));
        self
    }

    /// Sets the padding scheme expected on the final block.
    pub fn with_padding(mut self, padding: Padding) -> Self {
        self.padding = Some(padding);
        self
    }

    /// Returns the out-of-band IV, if any.
    pub fn iv(&self) -> Option<&Bytes> {
        self.iv.as_ref()
    }

    /// Returns the padding scheme, if any.
    pub fn padding(&self) -> Option<Padding> {
        self.padding
    }
}

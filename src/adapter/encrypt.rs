//! CBC encryption stage.

use bytes::Bytes;

use super::check_iv;
use crate::cipher::{CbcPrimitive, Padding};
use crate::config::{ChunkRule, EncryptConfig};
use crate::error::RechunkError;
use crate::rechunker::{Rechunker, Transform};
use crate::util::combine_bytes;

#[cfg(feature = "aes-cbc")]
use crate::cipher::AesCbc;

/// A [`Rechunker`] that encrypts with a [`CbcEncrypt`] transform.
pub type Encryptor<P> = Rechunker<CbcEncrypt<P>>;

/// Progress of a [`CbcEncrypt`] stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncryptState {
    /// Nothing has been emitted yet.
    AwaitingFirstBlock,
    /// At least one batch of blocks has been emitted.
    Streaming,
    /// The final (padded) block has been emitted.
    Finished,
}

/// Transform that encrypts whole blocks and carries the chaining value
/// across chunks.
///
/// Built by [`encryptor`]; every "other" chunk it sees is a multiple of the
/// block length and is encrypted without padding, the final remainder is
/// encrypted with the configured padding.
pub struct CbcEncrypt<P> {
    primitive: P,
    padding: Option<Padding>,
    chaining: Bytes,
    iv_prefix: Option<Bytes>,
    state: EncryptState,
}

impl<P: CbcPrimitive> CbcEncrypt<P> {
    /// Returns the current state.
    pub fn state(&self) -> EncryptState {
        self.state
    }

    /// Returns the chaining value the next block will be encrypted with.
    pub fn chaining_value(&self) -> &[u8] {
        &self.chaining
    }

    fn encrypt(&mut self, chunk: &[u8], padding: Option<Padding>) -> Result<Bytes, RechunkError> {
        let block_len = self.primitive.block_len();
        let ciphertext = Bytes::from(self.primitive.encrypt(chunk, &self.chaining, padding)?);
        if ciphertext.len() >= block_len {
            self.chaining = ciphertext.slice(ciphertext.len() - block_len..);
        }

        // The IV goes in front of whatever is emitted first, even an empty
        // unpadded remainder.
        Ok(match self.iv_prefix.take() {
            Some(iv) => combine_bytes(&iv, &ciphertext),
            None => ciphertext,
        })
    }
}

impl<P: CbcPrimitive> Transform for CbcEncrypt<P> {
    fn transform_other(
        &mut self,
        chunk: Bytes,
        _exhausts_input: bool,
    ) -> Result<Bytes, RechunkError> {
        let ciphertext = self.encrypt(&chunk, None)?;
        self.state = EncryptState::Streaming;
        Ok(ciphertext)
    }

    fn transform_last(&mut self, chunk: Bytes) -> Result<Bytes, RechunkError> {
        let ciphertext = self.encrypt(&chunk, self.padding)?;
        self.state = EncryptState::Finished;
        Ok(ciphertext)
    }
}

/// Builds a rechunker that encrypts a plaintext stream in CBC mode.
///
/// Plaintext is consumed in the largest available multiple of the block
/// length; the remainder at the end of the stream is encrypted with the
/// configured padding. Without padding the plaintext must be
/// block-aligned, otherwise the primitive's error is returned by
/// [`Rechunker::finish`].
///
/// # Errors
///
/// Returns [`RechunkError::InvalidIv`] if the IV is not exactly one block
/// long.
pub fn encryptor<P: CbcPrimitive>(
    primitive: P,
    config: EncryptConfig,
) -> Result<Encryptor<P>, RechunkError> {
    let block_len = primitive.block_len();
    check_iv(config.iv(), block_len)?;
    let rule = ChunkRule::fixed(block_len)?.with_multiples(true);

    tracing::debug!(
        block_len,
        padding = ?config.padding(),
        embed_iv = config.embed_iv(),
        "cbc encryptor configured"
    );

    let transform = CbcEncrypt {
        primitive,
        padding: config.padding(),
        chaining: config.iv().clone(),
        iv_prefix: config.embed_iv().then(|| config.iv().clone()),
        state: EncryptState::AwaitingFirstBlock,
    };
    Ok(Rechunker::new(rule, transform))
}

/// Builds an AES-CBC encrypting rechunker; the key length selects the AES
/// variant.
#[cfg(feature = "aes-cbc")]
pub fn aes_cbc_encryptor(
    key: &[u8],
    config: EncryptConfig,
) -> Result<Encryptor<AesCbc>, RechunkError> {
    encryptor(AesCbc::new(key)?, config)
}

#[cfg(all(test, feature = "aes-cbc"))]
mod tests {
    use super::*;

    const KEY: &[u8; 16] = b"0123456789abcdef";
    const IV: [u8; 16] = [0x11; 16];

    #[test]
    fn test_rejects_short_iv() {
        let err = aes_cbc_encryptor(KEY, EncryptConfig::new([0u8; 8])).unwrap_err();
        assert!(matches!(
            err,
            RechunkError::InvalidIv {
                expected: 16,
                actual: 8
            }
        ));
    }

    #[test]
    fn test_state_transitions() {
        let config = EncryptConfig::new(IV).with_padding(Padding::Pkcs7);
        let mut enc = aes_cbc_encryptor(KEY, config).unwrap();
        assert_eq!(enc.transform().state(), EncryptState::AwaitingFirstBlock);

        assert!(enc.push([0u8; 10]).unwrap().is_empty());
        assert_eq!(enc.transform().state(), EncryptState::AwaitingFirstBlock);

        let out = enc.push([0u8; 30]).unwrap();
        assert_eq!(out.concat().len(), 32);
        assert_eq!(enc.transform().state(), EncryptState::Streaming);
        assert_eq!(enc.transform().chaining_value(), &out[0][16..]);

        let last = enc.finish().unwrap().unwrap();
        assert_eq!(last.len(), 16);
        assert_eq!(enc.transform().state(), EncryptState::Finished);
    }

    #[test]
    fn test_embedded_iv_on_first_emission_only() {
        let config = EncryptConfig::new(IV).with_embedded_iv(true);
        let mut enc = aes_cbc_encryptor(KEY, config).unwrap();

        let first = enc.push([0u8; 16]).unwrap();
        assert_eq!(first[0].len(), 32);
        assert_eq!(&first[0][..16], &IV);

        let second = enc.push([0u8; 16]).unwrap();
        assert_eq!(second[0].len(), 16);
        assert!(enc.finish().unwrap().is_none());
    }

    #[test]
    fn test_embedded_iv_short_plaintext() {
        let config = EncryptConfig::new(IV)
            .with_padding(Padding::Pkcs7)
            .with_embedded_iv(true);
        let out = aes_cbc_encryptor(KEY, config)
            .unwrap()
            .rechunk([&b"tiny"[..]])
            .unwrap();

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].len(), 32);
        assert_eq!(&out[0][..16], &IV);
    }

    #[test]
    fn test_aligned_plaintext_gains_padding_block() {
        let config = EncryptConfig::new(IV).with_padding(Padding::Pkcs7);
        let out = aes_cbc_encryptor(KEY, config)
            .unwrap()
            .rechunk([[0u8; 32]])
            .unwrap();
        assert_eq!(out.concat().len(), 48);
    }

    #[test]
    fn test_unaligned_without_padding_fails_at_finish() {
        let mut enc = aes_cbc_encryptor(KEY, EncryptConfig::new(IV)).unwrap();
        enc.push([0u8; 20]).unwrap();
        assert!(matches!(enc.finish(), Err(RechunkError::Primitive(_))));
    }
}

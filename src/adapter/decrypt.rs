//! CBC decryption stage.

use bytes::Bytes;

use super::check_iv;
use crate::cipher::{CbcPrimitive, Padding};
use crate::config::{ChunkRule, DecryptConfig};
use crate::error::RechunkError;
use crate::rechunker::{Rechunker, Transform};
use crate::util::combine_bytes;

#[cfg(feature = "aes-cbc")]
use crate::cipher::AesCbc;

/// A [`Rechunker`] that decrypts with a [`CbcDecrypt`] transform.
pub type Decryptor<P> = Rechunker<CbcDecrypt<P>>;

/// Progress of a [`CbcDecrypt`] stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecryptState {
    /// Waiting for the IV at the start of the stream.
    AwaitingIv,
    /// The IV is known; ciphertext blocks are being decrypted.
    Streaming,
    /// The end of the stream has been handled.
    Finished,
}

/// Transform that decrypts whole blocks and carries the chaining value
/// (the previous ciphertext block) across chunks.
///
/// # Padding and the end of known data
///
/// Padding can only be removed from the block that really ends the stream,
/// but a chunk that [exhausts the input](Transform::transform_other) only
/// ends the data known *so far*. When padding is configured, the final
/// block of such a chunk is therefore held back undecrypted. If more
/// ciphertext arrives, the held block is decrypted without padding in front
/// of it; when the stream finishes, it is decrypted with padding. At most
/// one block is ever held.
pub struct CbcDecrypt<P> {
    primitive: P,
    padding: Option<Padding>,
    chaining: Bytes,
    held: Option<Bytes>,
    state: DecryptState,
}

impl<P: CbcPrimitive> CbcDecrypt<P> {
    /// Returns the current state.
    pub fn state(&self) -> DecryptState {
        self.state
    }

    /// Returns the chaining value the next block will be decrypted with
    /// (empty while the IV has not been read).
    pub fn chaining_value(&self) -> &[u8] {
        &self.chaining
    }

    /// Returns the number of ciphertext bytes held back as a candidate
    /// padded block.
    pub fn held_len(&self) -> usize {
        self.held.as_ref().map_or(0, Bytes::len)
    }

    fn decrypt(
        &mut self,
        ciphertext: Bytes,
        padding: Option<Padding>,
    ) -> Result<Bytes, RechunkError> {
        if ciphertext.is_empty() {
            return Ok(Bytes::new());
        }
        let block_len = self.primitive.block_len();
        let next = ciphertext.slice(ciphertext.len() - block_len..);
        let plaintext = self.primitive.decrypt(&ciphertext, &self.chaining, padding)?;
        self.chaining = next;
        Ok(Bytes::from(plaintext))
    }
}

impl<P: CbcPrimitive> Transform for CbcDecrypt<P> {
    fn transform_first(&mut self, iv: Bytes) -> Result<Bytes, RechunkError> {
        tracing::debug!(len = iv.len(), "initialization value read from stream");
        self.chaining = iv;
        self.state = DecryptState::Streaming;
        Ok(Bytes::new())
    }

    fn transform_other(
        &mut self,
        chunk: Bytes,
        exhausts_input: bool,
    ) -> Result<Bytes, RechunkError> {
        let block_len = self.primitive.block_len();
        let ciphertext = match self.held.take() {
            Some(held) => combine_bytes(&held, &chunk),
            None => chunk,
        };

        let ciphertext = if self.padding.is_some() && exhausts_input {
            let split = ciphertext.len() - block_len;
            self.held = Some(ciphertext.slice(split..));
            ciphertext.slice(..split)
        } else {
            ciphertext
        };

        self.decrypt(ciphertext, None)
    }

    fn transform_last(&mut self, residue: Bytes) -> Result<Bytes, RechunkError> {
        self.state = DecryptState::Finished;
        let block_len = self.primitive.block_len();

        if !residue.is_empty() {
            tracing::debug!(residue = residue.len(), block_len, "truncated ciphertext stream");
            return Err(RechunkError::Framing {
                residue: residue.len(),
                block_len,
            });
        }

        match (self.held.take(), self.padding) {
            (Some(block), padding) => self.decrypt(block, padding),
            (None, Some(padding)) => Err(RechunkError::Padding(format!(
                "stream ended without a final {padding} padded block"
            ))),
            (None, None) => Ok(Bytes::new()),
        }
    }
}

/// Builds a rechunker that decrypts a CBC ciphertext stream.
///
/// With an IV in `config` the whole stream is ciphertext; without one the
/// first block of the stream is read as the IV and produces no output.
///
/// # Errors
///
/// Returns [`RechunkError::InvalidIv`] if a supplied IV is not exactly one
/// block long. While streaming, [`Rechunker::finish`] fails with
/// [`RechunkError::Framing`] when the ciphertext is not block-aligned and
/// with [`RechunkError::Padding`] when the final block is badly padded.
pub fn decryptor<P: CbcPrimitive>(
    primitive: P,
    config: DecryptConfig,
) -> Result<Decryptor<P>, RechunkError> {
    let block_len = primitive.block_len();
    let (first_length, chaining, state) = match config.iv() {
        Some(iv) => {
            check_iv(iv, block_len)?;
            (0, iv.clone(), DecryptState::Streaming)
        }
        None => (block_len, Bytes::new(), DecryptState::AwaitingIv),
    };
    let rule = ChunkRule::new(first_length, block_len)?.with_multiples(true);

    tracing::debug!(
        block_len,
        padding = ?config.padding(),
        embedded_iv = config.iv().is_none(),
        "cbc decryptor configured"
    );

    let transform = CbcDecrypt {
        primitive,
        padding: config.padding(),
        chaining,
        held: None,
        state,
    };
    Ok(Rechunker::new(rule, transform))
}

/// Builds an AES-CBC decrypting rechunker; the key length selects the AES
/// variant.
#[cfg(feature = "aes-cbc")]
pub fn aes_cbc_decryptor(
    key: &[u8],
    config: DecryptConfig,
) -> Result<Decryptor<AesCbc>, RechunkError> {
    decryptor(AesCbc::new(key)?, config)
}

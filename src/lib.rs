//! rechunkrs
//!
//! Streaming fixed-length re-framing for Rust, with CBC cipher stages on top.
//!
//! `rechunkrs` turns a byte stream delivered in arbitrary pieces into chunks
//! that obey a strict length rule, typically the block length of a cipher.
//! It is designed as a small, composable primitive for:
//!
//! - block cipher streams (CBC encryption and decryption)
//! - fixed-size record framing
//! - protocols with a fixed-size header followed by fixed-size frames
//!
//! The crate intentionally:
//! - does NOT manage files or sockets
//! - does NOT manage concurrency
//! - does NOT authenticate ciphertext (no MAC/AEAD)
//! - never buffers more than one chunk's worth of unconsumed bytes
//!
//! It only does one thing: **bytes in any size → chunks of the right size**
//!
//! # Re-framing
//!
//! ```
//! use rechunkrs::{ChunkRule, Identity, Rechunker};
//!
//! let rule = ChunkRule::new(13, 16)?;
//! let pieces = [vec![0u8; 12], vec![0u8; 44], vec![0u8; 8]];
//! let chunks = Rechunker::new(rule, Identity).rechunk(pieces)?;
//! let lengths: Vec<_> = chunks.iter().map(|c| c.len()).collect();
//! assert_eq!(lengths, vec![13, 16, 16, 16, 3]);
//! # Ok::<(), rechunkrs::RechunkError>(())
//! ```
//!
//! # Encryption (feature = "aes-cbc")
//!
//! ```no_run
//! use std::fs::File;
//! use rechunkrs::{aes_cbc_encryptor, EncryptConfig, Padding, RechunkError, RechunkIter};
//!
//! fn main() -> Result<(), RechunkError> {
//!     let key = [0x42u8; 32];
//!     let config = EncryptConfig::new([0u8; 16])
//!         .with_padding(Padding::Pkcs7)
//!         .with_embedded_iv(true);
//!
//!     let file = File::open("plain.txt")?;
//!     for chunk in RechunkIter::new(file, aes_cbc_encryptor(&key, config)?) {
//!         println!("ciphertext {} bytes", chunk?.len());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Async (feature = "async-io")
//!
//! ```ignore
//! use futures_util::StreamExt;
//! use rechunkrs::{rechunk_async, Rechunker};
//! use futures_io::AsyncRead;
//!
//! async fn demo<R: AsyncRead + Unpin>(reader: R) -> Result<(), rechunkrs::RechunkError> {
//!     let mut stream = rechunk_async(reader, Rechunker::default());
//!
//!     while let Some(chunk) = stream.next().await {
//!         println!("chunk {}", chunk?.len());
//!     }
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod adapter;
mod cipher;
mod config;
mod error;
mod rechunker;

mod util; // internal byte helpers

#[cfg(feature = "async-io")]
mod async_stream;

//
// Public surface
//

pub use adapter::{
    CbcDecrypt, CbcEncrypt, DecryptState, Decryptor, EncryptState, Encryptor, decryptor, encryptor,
};
#[cfg(feature = "aes-cbc")]
pub use adapter::{aes_cbc_decryptor, aes_cbc_encryptor};
pub use cipher::{CbcPrimitive, Padding};
#[cfg(feature = "aes-cbc")]
pub use cipher::{AES_BLOCK_LEN, AesCbc};
pub use config::{ChunkRule, DEFAULT_OTHER_LENGTH, DecryptConfig, EncryptConfig};
pub use error::RechunkError;
pub use rechunker::{
    DEFAULT_READ_SIZE, FnTransform, Identity, RechunkIter, RechunkWriter, Rechunker, Transform,
};

#[cfg(feature = "async-io")]
pub use async_stream::{RechunkPipe, RechunkStream, rechunk_async, rechunk_stream};

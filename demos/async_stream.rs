//! Async pipeline over a stream of byte chunks.
//!
//! Encrypts a stream of uneven pieces, re-splits the ciphertext like a
//! network would, and decrypts it again, all with `rechunk_stream`.
//!
//! Run with:
//!     cargo run --example async_stream --features async-io

use std::io;

use bytes::Bytes;
use futures_util::{StreamExt, stream};
use rechunkrs::{
    DecryptConfig, EncryptConfig, Padding, RechunkError, aes_cbc_decryptor, aes_cbc_encryptor,
    rechunk_stream,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let key = [0x42u8; 16];
    let iv = [0x24u8; 16];

    let data: Vec<u8> = (0..10_000).map(|i| (i % 251) as u8).collect();
    let pieces: Vec<Result<Bytes, io::Error>> = data
        .chunks(777)
        .map(|piece| Ok(Bytes::copy_from_slice(piece)))
        .collect();

    println!("Encrypting {} bytes in {} pieces...", data.len(), pieces.len());

    let config = EncryptConfig::new(iv).with_padding(Padding::Pkcs7);
    let encryptor = aes_cbc_encryptor(&key, config)?;
    let ciphertext: Vec<Bytes> = rechunk_stream(stream::iter(pieces), encryptor)
        .collect::<Vec<_>>()
        .await
        .into_iter()
        .collect::<Result<_, _>>()?;

    for (i, chunk) in ciphertext.iter().enumerate() {
        println!("  ciphertext chunk {}: {} bytes", i + 1, chunk.len());
    }

    // Re-split the ciphertext into 100-byte pieces before decrypting.
    let joined = Bytes::from(ciphertext.concat());
    let resplit: Vec<Result<Bytes, RechunkError>> = (0..joined.len())
        .step_by(100)
        .map(|start| Ok(joined.slice(start..(start + 100).min(joined.len()))))
        .collect();

    let config = DecryptConfig::new().with_iv(iv).with_padding(Padding::Pkcs7);
    let mut plaintext = Vec::with_capacity(data.len());
    let mut decrypted = rechunk_stream(stream::iter(resplit), aes_cbc_decryptor(&key, config)?);
    while let Some(chunk) = decrypted.next().await {
        plaintext.extend_from_slice(&chunk?);
    }

    println!(
        "\nDecrypted {} bytes, round trip {}",
        plaintext.len(),
        if plaintext == data { "ok" } else { "MISMATCH" }
    );
    Ok(())
}

//! Async file encryption with tokio.
//!
//! Reads a file through `tokio::fs`, bridges it to `futures-io` with
//! `tokio_util::compat` and encrypts it as an async stream.
//!
//! Run with:
//!     cargo run --example async_tokio --features async-io -- <path>

use futures_util::StreamExt;
use rechunkrs::{EncryptConfig, Padding, aes_cbc_encryptor, rechunk_async};
use tokio_util::compat::TokioAsyncReadCompatExt;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "Cargo.toml".to_string());

    let key = [0x42u8; 32];
    let config = EncryptConfig::new([0x24u8; 16])
        .with_padding(Padding::Pkcs7)
        .with_embedded_iv(true);

    let file = tokio::fs::File::open(&path).await?;
    let mut stream = rechunk_async(file.compat(), aes_cbc_encryptor(&key, config)?);

    let mut chunk_count = 0;
    let mut total_bytes = 0;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        chunk_count += 1;
        total_bytes += chunk.len();
        println!("  ciphertext chunk {chunk_count}: {} bytes", chunk.len());
    }

    println!("\n{path}: {chunk_count} chunks, {total_bytes} bytes of ciphertext");
    Ok(())
}

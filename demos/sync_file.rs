//! File encryption example.
//!
//! Encrypts a file with AES-256-CBC through a `RechunkWriter`, then
//! decrypts it again through a `RechunkIter` and checks the round trip.
//!
//! Run with:
//!     cargo run --example sync_file -- <path>
//!
//! Set `RUST_LOG=rechunkrs=debug` to see the stage events.

use std::fs::File;
use std::io::{self, BufWriter, Write};

use rechunkrs::{
    DecryptConfig, EncryptConfig, Padding, RechunkIter, RechunkWriter, aes_cbc_decryptor,
    aes_cbc_encryptor,
};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "Cargo.toml".to_string());
    let encrypted_path = format!("{path}.enc");

    let key = *b"SuperDuperSecretSuperDuperSecret";
    let iv = *b"HushItsASecret!!";

    // Encrypt: the IV is written in front of the ciphertext.
    let config = EncryptConfig::new(iv)
        .with_padding(Padding::Pkcs7)
        .with_embedded_iv(true);
    let output = BufWriter::new(File::create(&encrypted_path)?);
    let mut writer = RechunkWriter::new(output, aes_cbc_encryptor(&key, config)?);
    io::copy(&mut File::open(&path)?, &mut writer)?;
    writer.finish()?.flush()?;

    let encrypted_len = std::fs::metadata(&encrypted_path)?.len();
    println!("{path} -> {encrypted_path} ({encrypted_len} bytes)");

    // Decrypt: the IV is read back from the first block.
    let config = DecryptConfig::new().with_padding(Padding::Pkcs7);
    let mut plaintext = Vec::new();
    for chunk in RechunkIter::new(File::open(&encrypted_path)?, aes_cbc_decryptor(&key, config)?) {
        plaintext.extend_from_slice(&chunk?);
    }

    let original = std::fs::read(&path)?;
    println!(
        "decrypted {} bytes, round trip {}",
        plaintext.len(),
        if plaintext == original { "ok" } else { "MISMATCH" }
    );

    std::fs::remove_file(&encrypted_path)?;
    Ok(())
}

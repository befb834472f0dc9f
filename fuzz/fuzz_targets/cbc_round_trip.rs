#![no_main]

use libfuzzer_sys::fuzz_target;
use rechunkrs::{
    DecryptConfig, EncryptConfig, Padding, RechunkError, aes_cbc_decryptor, aes_cbc_encryptor,
};

const KEY: [u8; 16] = [7; 16];
const IV: [u8; 16] = [9; 16];

fuzz_target!(|input: (bool, u8, Vec<u8>)| {
    let (embed, piece, data) = input;
    let piece = (piece as usize).max(1);

    // Round trip with arbitrary piece sizes
    let config = EncryptConfig::new(IV)
        .with_padding(Padding::Pkcs7)
        .with_embedded_iv(embed);
    let ciphertext = aes_cbc_encryptor(&KEY, config)
        .unwrap()
        .rechunk(data.chunks(piece))
        .unwrap()
        .concat();

    let mut decrypt_config = DecryptConfig::new().with_padding(Padding::Pkcs7);
    if !embed {
        decrypt_config = decrypt_config.with_iv(IV);
    }
    let plain = aes_cbc_decryptor(&KEY, decrypt_config.clone())
        .unwrap()
        .rechunk(ciphertext.chunks(piece))
        .unwrap()
        .concat();
    assert_eq!(plain, data);

    // Arbitrary ciphertext must fail cleanly, never panic
    let result = aes_cbc_decryptor(&KEY, decrypt_config)
        .unwrap()
        .rechunk(data.chunks(piece));
    if let Err(e) = result {
        assert!(matches!(
            e,
            RechunkError::Framing { .. } | RechunkError::Padding(_)
        ));
    }
});

// Integration tests for the CBC stream stages
// Tests cover: known answers, round trips under arbitrary chunking, IV delivery, failures

#![cfg(feature = "aes-cbc")]

use bytes::Bytes;
use proptest::prelude::*;
use rechunkrs::{
    AesCbc, CbcPrimitive, DecryptConfig, EncryptConfig, Padding, RechunkError, aes_cbc_decryptor,
    aes_cbc_encryptor,
};

const KEY: &[u8; 32] = b"SuperDuperSecretSuperDuperSecret";
const IV: &[u8; 16] = b"HushItsASecret!!";
const STORY: &str = "Once upon a time there lived a king and queen who were very unhappy \
because they had no children. But at last a little daughter was born, and their \
sorrow was turned to joy. All the bells in the land were rung to tell the glad tidings.\n\n\
The king gave a christening feast so grand that the like of it had never been known. \
He invited all the fairies he could find in the kingdom - there were seven of them - to \
come to the christening as godmothers. He hoped that each would give the princess a good gift.";

/// Cuts `data` at the given offsets, like the pieces of a network read.
fn pieces<'a>(data: &'a [u8], cuts: &[usize]) -> Vec<&'a [u8]> {
    let mut out = Vec::new();
    let mut start = 0;
    for &cut in cuts {
        out.push(&data[start..cut]);
        start = cut;
    }
    out.push(&data[start..]);
    out
}

fn one_shot_encrypt(plain: &[u8]) -> Vec<u8> {
    AesCbc::new(KEY)
        .unwrap()
        .encrypt(plain, IV, Some(Padding::Pkcs7))
        .unwrap()
}

// ============================================================================
// Known Answers
// ============================================================================

// NIST SP 800-38A, F.2.1 CBC-AES128.Encrypt
const NIST_KEY: &str = "2b7e151628aed2a6abf7158809cf4f3c";
const NIST_IV: &str = "000102030405060708090a0b0c0d0e0f";
const NIST_PLAIN: &str = "6bc1bee22e409f96e93d7e117393172a\
ae2d8a571e03ac9c9eb76fac45af8e51\
30c81c46a35ce411e5fbc1191a0a52ef\
f69f2445df4f9b17ad2b417be66c3710";
const NIST_CIPHER: &str = "7649abac8119b246cee98e9b12e9197d\
5086cb9b507219ee95db113a917678b2\
73bed6b8e3c1743b7116e69e22229516\
3ff1caa1681fac09120eca307586e1a7";

#[test]
fn test_nist_streaming_encrypt() {
    let key = hex::decode(NIST_KEY).unwrap();
    let iv = hex::decode(NIST_IV).unwrap();
    let plain = hex::decode(NIST_PLAIN).unwrap();

    let encryptor = aes_cbc_encryptor(&key, EncryptConfig::new(&iv)).unwrap();
    let ciphertext = encryptor.rechunk(pieces(&plain, &[5, 28, 29, 47])).unwrap();

    assert_eq!(hex::encode(ciphertext.concat()), NIST_CIPHER);
}

#[test]
fn test_nist_streaming_decrypt() {
    let key = hex::decode(NIST_KEY).unwrap();
    let iv = hex::decode(NIST_IV).unwrap();
    let ciphertext = hex::decode(NIST_CIPHER).unwrap();

    let decryptor = aes_cbc_decryptor(&key, DecryptConfig::new().with_iv(&iv)).unwrap();
    let plain = decryptor.rechunk(pieces(&ciphertext, &[1, 17, 50])).unwrap();

    assert_eq!(hex::encode(plain.concat()), NIST_PLAIN);
}

// ============================================================================
// Story Round Trips
// ============================================================================

#[test]
fn test_encrypt_without_embedded_iv() {
    let data = STORY.as_bytes();
    let config = EncryptConfig::new(IV).with_padding(Padding::Pkcs7);
    let ciphertext = aes_cbc_encryptor(KEY, config)
        .unwrap()
        .rechunk(pieces(data, &[15, 97, 231, 299, 413]))
        .unwrap()
        .concat();

    assert_eq!(ciphertext, one_shot_encrypt(data));
}

#[test]
fn test_encrypt_with_embedded_iv() {
    let data = STORY.as_bytes();
    let config = EncryptConfig::new(IV)
        .with_padding(Padding::Pkcs7)
        .with_embedded_iv(true);
    let ciphertext = aes_cbc_encryptor(KEY, config)
        .unwrap()
        .rechunk(pieces(data, &[231, 299, 413]))
        .unwrap()
        .concat();

    assert_eq!(&ciphertext[..16], IV);
    assert_eq!(&ciphertext[16..], &one_shot_encrypt(data)[..]);
}

#[test]
fn test_decrypt_with_iv_parameter() {
    let ciphertext = one_shot_encrypt(STORY.as_bytes());
    let config = DecryptConfig::new().with_iv(IV).with_padding(Padding::Pkcs7);
    let plain = aes_cbc_decryptor(KEY, config)
        .unwrap()
        .rechunk(pieces(&ciphertext, &[15, 97, 231, 299, 413]))
        .unwrap()
        .concat();

    assert_eq!(String::from_utf8(plain).unwrap(), STORY);
}

#[test]
fn test_decrypt_with_iv_at_stream_start() {
    let mut stream = IV.to_vec();
    stream.extend(one_shot_encrypt(STORY.as_bytes()));

    let config = DecryptConfig::new().with_padding(Padding::Pkcs7);
    let plain = aes_cbc_decryptor(KEY, config)
        .unwrap()
        .rechunk(pieces(&stream, &[390]))
        .unwrap()
        .concat();

    assert_eq!(String::from_utf8(plain).unwrap(), STORY);
}

#[test]
fn test_encrypt_then_decrypt_halved_chunks() {
    let config = EncryptConfig::new(IV)
        .with_padding(Padding::Pkcs7)
        .with_embedded_iv(true);
    let encrypted = aes_cbc_encryptor(KEY, config)
        .unwrap()
        .rechunk([STORY.as_bytes()])
        .unwrap();

    // Re-split every ciphertext chunk in two before decrypting.
    let halves: Vec<Bytes> = encrypted
        .iter()
        .flat_map(|chunk| {
            let mid = chunk.len() / 2;
            [chunk.slice(..mid), chunk.slice(mid..)]
        })
        .collect();

    let plain = aes_cbc_decryptor(KEY, DecryptConfig::new().with_padding(Padding::Pkcs7))
        .unwrap()
        .rechunk(&halves)
        .unwrap()
        .concat();

    assert_eq!(String::from_utf8(plain).unwrap(), STORY);
}

// ============================================================================
// Edge Lengths
// ============================================================================

#[test]
fn test_round_trip_edge_lengths() {
    for len in [0usize, 1, 15, 16, 17, 32, 48, 100] {
        let plain: Vec<u8> = (0..len).map(|i| i as u8).collect();
        for embed in [false, true] {
            let config = EncryptConfig::new(IV)
                .with_padding(Padding::Pkcs7)
                .with_embedded_iv(embed);
            let ciphertext = aes_cbc_encryptor(KEY, config)
                .unwrap()
                .rechunk([&plain])
                .unwrap()
                .concat();

            let padded_len = (len / 16 + 1) * 16;
            let expected_len = if embed { padded_len + 16 } else { padded_len };
            assert_eq!(ciphertext.len(), expected_len, "len {len}, embed {embed}");

            let mut decrypt_config = DecryptConfig::new().with_padding(Padding::Pkcs7);
            if !embed {
                decrypt_config = decrypt_config.with_iv(IV);
            }
            let decrypted = aes_cbc_decryptor(KEY, decrypt_config)
                .unwrap()
                .rechunk(ciphertext.chunks(7))
                .unwrap()
                .concat();
            assert_eq!(decrypted, plain, "len {len}, embed {embed}");
        }
    }
}

#[test]
fn test_unpadded_empty_stream() {
    let ciphertext = aes_cbc_encryptor(KEY, EncryptConfig::new(IV))
        .unwrap()
        .rechunk(Vec::<Bytes>::new())
        .unwrap();
    assert!(ciphertext.is_empty());

    let embedded = aes_cbc_encryptor(KEY, EncryptConfig::new(IV).with_embedded_iv(true))
        .unwrap()
        .rechunk(Vec::<Bytes>::new())
        .unwrap();
    assert_eq!(embedded.concat(), IV);
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_truncated_ciphertext() {
    let ciphertext = one_shot_encrypt(STORY.as_bytes());
    let config = DecryptConfig::new().with_iv(IV).with_padding(Padding::Pkcs7);
    let result = aes_cbc_decryptor(KEY, config)
        .unwrap()
        .rechunk([&ciphertext[..ciphertext.len() - 5]]);

    assert!(matches!(
        result,
        Err(RechunkError::Framing {
            residue: 11,
            block_len: 16
        })
    ));
}

#[test]
fn test_wrong_key_fails_padding() {
    let ciphertext = one_shot_encrypt(b"attack at dawn");
    let config = DecryptConfig::new().with_iv(IV).with_padding(Padding::Pkcs7);
    let mut decryptor = aes_cbc_decryptor(&[0x11u8; 32], config).unwrap();

    assert!(decryptor.push(&ciphertext).unwrap().is_empty());
    // A wrong key almost never yields a valid PKCS#7 tail; both outcomes
    // must leave the decryptor closed.
    let result = decryptor.finish();
    if let Ok(Some(plain)) = &result {
        assert_ne!(&plain[..], b"attack at dawn");
    }
    assert!(decryptor.is_closed());
}

#[test]
fn test_invalid_key_length() {
    let result = aes_cbc_encryptor(&[0u8; 20], EncryptConfig::new(IV));
    assert!(matches!(result, Err(RechunkError::Primitive(_))));
}

#[test]
fn test_abort_emits_nothing_more() {
    let config = EncryptConfig::new(IV).with_padding(Padding::Pkcs7);
    let mut encryptor = aes_cbc_encryptor(KEY, config).unwrap();

    assert_eq!(encryptor.push(&STORY.as_bytes()[..40]).unwrap().concat().len(), 32);
    assert_eq!(encryptor.abort(), 8);
    assert!(matches!(encryptor.finish(), Err(RechunkError::Closed)));
}

// ============================================================================
// Round Trip Under Arbitrary Chunking
// ============================================================================

fn padding_strategy() -> impl Strategy<Value = Option<Padding>> {
    prop_oneof![
        Just(None),
        Just(Some(Padding::Pkcs7)),
        Just(Some(Padding::Iso7816)),
        Just(Some(Padding::AnsiX923)),
    ]
}

fn cut_points(len: usize, raw: &[usize]) -> Vec<usize> {
    let mut cuts: Vec<usize> = raw.iter().map(|c| c % (len + 1)).collect();
    cuts.sort_unstable();
    cuts
}

proptest! {
    #[test]
    fn prop_round_trip(
        data in proptest::collection::vec(any::<u8>(), 0..600),
        encrypt_cuts in proptest::collection::vec(any::<usize>(), 0..8),
        decrypt_cuts in proptest::collection::vec(any::<usize>(), 0..8),
        padding in padding_strategy(),
        embed in any::<bool>(),
    ) {
        let mut data = data;
        if padding.is_none() {
            data.truncate(data.len() / 16 * 16);
        }

        let mut config = EncryptConfig::new(IV).with_embedded_iv(embed);
        if let Some(padding) = padding {
            config = config.with_padding(padding);
        }
        let ciphertext = aes_cbc_encryptor(KEY, config)
            .unwrap()
            .rechunk(pieces(&data, &cut_points(data.len(), &encrypt_cuts)))
            .unwrap()
            .concat();

        // Chunking never changes the ciphertext.
        let mut reference = AesCbc::new(KEY).unwrap().encrypt(&data, IV, padding).unwrap();
        if embed {
            reference.splice(0..0, IV.iter().copied());
        }
        prop_assert_eq!(&ciphertext, &reference);

        let mut decrypt_config = DecryptConfig::new();
        if !embed {
            decrypt_config = decrypt_config.with_iv(IV);
        }
        if let Some(padding) = padding {
            decrypt_config = decrypt_config.with_padding(padding);
        }
        let plain = aes_cbc_decryptor(KEY, decrypt_config)
            .unwrap()
            .rechunk(pieces(&ciphertext, &cut_points(ciphertext.len(), &decrypt_cuts)))
            .unwrap()
            .concat();
        prop_assert_eq!(plain, data);
    }
}

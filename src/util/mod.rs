//! Internal byte helpers.

use bytes::{BufMut, Bytes, BytesMut};

/// Joins a held prefix and a new chunk into one contiguous buffer.
///
/// Used by the CBC stages to put the embedded IV in front of the first
/// ciphertext and a held-back block in front of the next batch.
pub(crate) fn combine_bytes(prefix: &[u8], rest: &[u8]) -> Bytes {
    if prefix.is_empty() {
        return Bytes::copy_from_slice(rest);
    }
    let mut combined = BytesMut::with_capacity(prefix.len() + rest.len());
    combined.put_slice(prefix);
    combined.put_slice(rest);
    combined.freeze()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combine_bytes() {
        assert_eq!(combine_bytes(b"iv", b"data"), Bytes::from_static(b"ivdata"));
        assert_eq!(combine_bytes(b"", b"data"), Bytes::from_static(b"data"));
        assert!(combine_bytes(b"", b"").is_empty());
    }
}

//! Tagged zstd compression.
//!
//! Output is a 3-byte tag followed by the body: `CMP` + zstd frame when that
//! is strictly smaller than the input, otherwise `NOC` + the input verbatim.
//! The output is therefore never longer than `input.len() + 3`.

use tracing::trace;

use crate::error::{CodecError, Result};

/// Tag for a zstd-compressed body.
pub const TAG_COMPRESSED: &[u8; 3] = b"CMP";

/// Tag for a stored (uncompressed) body.
pub const TAG_STORED: &[u8; 3] = b"NOC";

/// Length of the tag prefix.
pub const TAG_LEN: usize = 3;

/// Default zstd level.
pub const DEFAULT_LEVEL: i32 = 3;

/// Compress `data`, falling back to storing it when compression does not help.
pub fn compress(data: &[u8], level: i32) -> Vec<u8> {
    if let Ok(body) = zstd::stream::encode_all(data, level) {
        if body.len() < data.len() {
            trace!(input = data.len(), output = body.len(), "compressed");
            return framed(TAG_COMPRESSED, &body);
        }
    }
    framed(TAG_STORED, data)
}

/// Reverse [`compress`].
pub fn decompress(buffer: &[u8]) -> Result<Vec<u8>> {
    if buffer.len() < TAG_LEN {
        return Err(CodecError::CompressionFormat(format!(
            "buffer of {} bytes is shorter than the tag",
            buffer.len()
        )));
    }
    let (tag, body) = buffer.split_at(TAG_LEN);

    if tag == TAG_COMPRESSED {
        zstd::stream::decode_all(body).map_err(|e| CodecError::CompressionFormat(e.to_string()))
    } else if tag == TAG_STORED {
        Ok(body.to_vec())
    } else {
        Err(CodecError::CompressionFormat(format!(
            "unrecognized tag {:?}",
            String::from_utf8_lossy(tag)
        )))
    }
}

fn framed(tag: &[u8; 3], body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(TAG_LEN + body.len());
    out.extend_from_slice(tag);
    out.extend_from_slice(body);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_compressible_data_is_tagged_cmp() {
        let data = vec![b'a'; 4096];
        let out = compress(&data, DEFAULT_LEVEL);
        assert_eq!(&out[..3], TAG_COMPRESSED);
        assert!(out.len() < data.len());
        assert_eq!(decompress(&out).unwrap(), data);
    }

    #[test]
    fn test_empty_input_is_stored() {
        let out = compress(&[], DEFAULT_LEVEL);
        assert_eq!(out, TAG_STORED.to_vec());
        assert_eq!(decompress(&out).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_tiny_input_is_stored() {
        let out = compress(b"x", DEFAULT_LEVEL);
        assert_eq!(out, b"NOCx".to_vec());
    }

    #[test]
    fn test_unknown_tag_rejected() {
        let err = decompress(b"ZZZpayload").unwrap_err();
        assert!(matches!(err, CodecError::CompressionFormat(_)));
    }

    #[test]
    fn test_short_buffer_rejected() {
        assert!(matches!(decompress(b"CM"), Err(CodecError::CompressionFormat(_))));
    }

    #[test]
    fn test_corrupt_body_rejected() {
        let mut out = compress(&vec![b'z'; 1024], DEFAULT_LEVEL);
        assert_eq!(&out[..3], TAG_COMPRESSED);
        out.truncate(out.len() / 2);
        assert!(matches!(decompress(&out), Err(CodecError::CompressionFormat(_))));
    }

    proptest! {
        #[test]
        fn test_roundtrip(data in prop::collection::vec(any::<u8>(), 0..4096)) {
            let out = compress(&data, DEFAULT_LEVEL);
            prop_assert!(out.len() <= data.len() + TAG_LEN);
            prop_assert_eq!(decompress(&out).unwrap(), data);
        }
    }
}

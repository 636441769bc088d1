//! Raw-deflate decompression of a single container entry.
//!
//! Container entries use headerless deflate framing (no zlib wrapper, no
//! gzip header), so this is [`flate2::read::DeflateDecoder`] rather than
//! `ZlibDecoder`. Failure is a pipeline failure: a truncated or invalid
//! stream returns [`ExtractError::DecompressionFailed`], never a partial or
//! empty buffer.

use crate::error::ExtractError;
use flate2::read::DeflateDecoder;
use std::io::Read;

/// Inflate a raw-deflate payload into a single buffer.
pub fn inflate_raw(data: &[u8]) -> Result<Vec<u8>, ExtractError> {
    let mut decoder = DeflateDecoder::new(data);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|e| ExtractError::DecompressionFailed {
            detail: e.to_string(),
        })?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::DeflateEncoder;
    use flate2::Compression;
    use std::io::Write;

    pub(crate) fn deflate(data: &[u8]) -> Vec<u8> {
        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn inflates_deflated_payload() {
        let compressed = deflate(b"<w:document>body</w:document>");
        let out = inflate_raw(&compressed).unwrap();
        assert_eq!(out, b"<w:document>body</w:document>");
    }

    #[test]
    fn invalid_stream_is_an_error_not_empty_output() {
        // 0xFF opens a block with the reserved BTYPE, which no inflater accepts.
        let err = inflate_raw(&[0xFF, 0xFF, 0xFF, 0xFF]).unwrap_err();
        assert!(matches!(err, ExtractError::DecompressionFailed { .. }));
    }
}

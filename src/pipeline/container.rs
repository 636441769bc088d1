//! Container byte reader: minimal ZIP central-directory parsing.
//!
//! Modern word-processor documents are ZIP containers; the body text lives
//! in a named entry inside. This module parses just enough of the format to
//! list entries and slice out one entry's payload from an in-memory buffer:
//! locate the End-Of-Central-Directory record by scanning backward, walk the
//! central directory, then re-read the entry's local header to find its
//! data.
//!
//! ## Bounds discipline
//!
//! Every offset and length in the file is attacker-controlled. All reads go
//! through [`read_u16`]/[`read_u32`]/[`take`], which turn any out-of-range
//! access into [`ExtractError::MalformedContainer`]. A truncated or
//! malicious container fails deterministically; it can never index past the
//! buffer or silently truncate an entry.

use crate::error::ExtractError;
use tracing::debug;

/// End-Of-Central-Directory signature ("PK\x05\x06").
const EOCD_SIG: [u8; 4] = [0x50, 0x4B, 0x05, 0x06];
/// Central-directory file-header signature ("PK\x01\x02").
const CENTRAL_SIG: [u8; 4] = [0x50, 0x4B, 0x01, 0x02];
/// Local file-header signature ("PK\x03\x04").
const LOCAL_SIG: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

/// Fixed portion of the EOCD record.
const EOCD_LEN: usize = 22;
/// Fixed portion of one central-directory header.
const CENTRAL_HEADER_LEN: usize = 46;
/// Fixed portion of one local file header.
const LOCAL_HEADER_LEN: usize = 30;
/// The format caps the trailing comment at 64 KiB, which bounds how far back
/// the EOCD scan must look.
const MAX_EOCD_SCAN: usize = 64 * 1024 + EOCD_LEN;

/// Entry compression method: stored (no compression).
pub const METHOD_STORED: u16 = 0;
/// Entry compression method: raw deflate.
pub const METHOD_DEFLATE: u16 = 8;

/// One file stored inside the container, as described by the central
/// directory. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZipEntry {
    /// Path of the entry within the container, unique per container.
    pub name: String,
    /// Compression method code (see [`METHOD_STORED`], [`METHOD_DEFLATE`]).
    pub method: u16,
    /// Byte length of the entry's compressed payload.
    pub compressed_size: u32,
    /// Offset of the entry's local header from the start of the buffer.
    pub local_header_offset: u32,
}

fn malformed(detail: impl Into<String>) -> ExtractError {
    ExtractError::MalformedContainer {
        detail: detail.into(),
    }
}

fn read_u16(buf: &[u8], at: usize) -> Result<u16, ExtractError> {
    let bytes = take(buf, at, 2)?;
    Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
}

fn read_u32(buf: &[u8], at: usize) -> Result<u32, ExtractError> {
    let bytes = take(buf, at, 4)?;
    Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

fn take(buf: &[u8], at: usize, len: usize) -> Result<&[u8], ExtractError> {
    let end = at
        .checked_add(len)
        .ok_or_else(|| malformed("offset overflow"))?;
    if end > buf.len() {
        return Err(malformed(format!(
            "read of {len} bytes at offset {at} exceeds buffer length {}",
            buf.len()
        )));
    }
    Ok(&buf[at..end])
}

/// Locate the EOCD record by scanning backward from the end of the buffer.
fn find_eocd(buf: &[u8]) -> Result<usize, ExtractError> {
    if buf.len() < EOCD_LEN {
        return Err(malformed("buffer smaller than end-of-directory record"));
    }
    let floor = buf.len().saturating_sub(MAX_EOCD_SCAN);
    let mut pos = buf.len() - EOCD_LEN;
    loop {
        if buf[pos..pos + 4] == EOCD_SIG {
            return Ok(pos);
        }
        if pos == floor {
            return Err(malformed("end-of-directory signature not found"));
        }
        pos -= 1;
    }
}

/// Scan the container's central directory and return one descriptor per
/// stored entry, in directory order.
pub fn list_entries(buf: &[u8]) -> Result<Vec<ZipEntry>, ExtractError> {
    let eocd = find_eocd(buf)?;
    let entry_count = read_u16(buf, eocd + 10)? as usize;
    let cd_size = read_u32(buf, eocd + 12)? as usize;
    let cd_offset = read_u32(buf, eocd + 16)? as usize;

    let cd_end = cd_offset
        .checked_add(cd_size)
        .filter(|end| *end <= buf.len())
        .ok_or_else(|| malformed("central directory extends past end of buffer"))?;

    let mut entries = Vec::with_capacity(entry_count);
    let mut cursor = cd_offset;

    for index in 0..entry_count {
        if cursor + CENTRAL_HEADER_LEN > cd_end {
            return Err(malformed(format!(
                "central directory truncated at entry {index} of {entry_count}"
            )));
        }
        if take(buf, cursor, 4)? != CENTRAL_SIG.as_slice() {
            return Err(malformed(format!(
                "bad central-directory signature at entry {index}"
            )));
        }

        let method = read_u16(buf, cursor + 10)?;
        let compressed_size = read_u32(buf, cursor + 20)?;
        let name_len = read_u16(buf, cursor + 28)? as usize;
        let extra_len = read_u16(buf, cursor + 30)? as usize;
        let comment_len = read_u16(buf, cursor + 32)? as usize;
        let local_header_offset = read_u32(buf, cursor + 42)?;

        let name_bytes = take(buf, cursor + CENTRAL_HEADER_LEN, name_len)?;
        let name = String::from_utf8_lossy(name_bytes).into_owned();

        entries.push(ZipEntry {
            name,
            method,
            compressed_size,
            local_header_offset,
        });

        cursor += CENTRAL_HEADER_LEN + name_len + extra_len + comment_len;
        if cursor > cd_end {
            return Err(malformed(format!(
                "entry {index} variable fields extend past central directory"
            )));
        }
    }

    debug!("container lists {} entries", entries.len());
    Ok(entries)
}

/// Find a descriptor by exact entry name.
pub fn find_entry<'a>(entries: &'a [ZipEntry], name: &str) -> Option<&'a ZipEntry> {
    entries.iter().find(|e| e.name == name)
}

/// Read one entry's payload, inflating it when the entry is deflated.
///
/// Re-reads the local header named by the descriptor (verifying its
/// signature), skips the header's own name/extra fields, and slices exactly
/// `compressed_size` bytes. Method 8 is handed to the raw decompressor;
/// every other method — stored included — is returned unchanged.
pub fn read_entry(buf: &[u8], entry: &ZipEntry) -> Result<Vec<u8>, ExtractError> {
    let offset = entry.local_header_offset as usize;
    if take(buf, offset, 4)? != LOCAL_SIG.as_slice() {
        return Err(malformed(format!(
            "bad local-header signature for entry '{}'",
            entry.name
        )));
    }

    // The local header repeats the name/extra fields with its own lengths,
    // which may differ from the central directory's.
    let name_len = read_u16(buf, offset + 26)? as usize;
    let extra_len = read_u16(buf, offset + 28)? as usize;
    let data_start = offset + LOCAL_HEADER_LEN + name_len + extra_len;
    let raw = take(buf, data_start, entry.compressed_size as usize)?;

    match entry.method {
        METHOD_DEFLATE => super::inflate::inflate_raw(raw),
        _ => Ok(raw.to_vec()),
    }
}

// ── Test fixtures ────────────────────────────────────────────────────────────

/// Hand-built archive fixtures, shared with the integration tests.
#[cfg(test)]
pub(crate) mod fixtures {
    /// Build a minimal valid archive from (name, method, payload) triples.
    /// The payload must already be in its stored form (raw bytes for method
    /// 0, deflate-compressed bytes for method 8). CRCs are written as zero —
    /// the reader never checks them.
    pub fn build_zip(entries: &[(&str, u16, &[u8])]) -> Vec<u8> {
        let mut buf = Vec::new();
        let mut locals: Vec<(u32, &str, u16, usize)> = Vec::new();

        for (name, method, payload) in entries {
            let offset = buf.len() as u32;
            locals.push((offset, name, *method, payload.len()));

            buf.extend_from_slice(&[0x50, 0x4B, 0x03, 0x04]); // local sig
            buf.extend_from_slice(&20u16.to_le_bytes()); // version needed
            buf.extend_from_slice(&0u16.to_le_bytes()); // flags
            buf.extend_from_slice(&method.to_le_bytes());
            buf.extend_from_slice(&0u16.to_le_bytes()); // mod time
            buf.extend_from_slice(&0u16.to_le_bytes()); // mod date
            buf.extend_from_slice(&0u32.to_le_bytes()); // crc32
            buf.extend_from_slice(&(payload.len() as u32).to_le_bytes());
            buf.extend_from_slice(&(payload.len() as u32).to_le_bytes());
            buf.extend_from_slice(&(name.len() as u16).to_le_bytes());
            buf.extend_from_slice(&0u16.to_le_bytes()); // extra len
            buf.extend_from_slice(name.as_bytes());
            buf.extend_from_slice(payload);
        }

        let cd_offset = buf.len() as u32;
        for (offset, name, method, payload_len) in &locals {
            buf.extend_from_slice(&[0x50, 0x4B, 0x01, 0x02]); // central sig
            buf.extend_from_slice(&20u16.to_le_bytes()); // version made by
            buf.extend_from_slice(&20u16.to_le_bytes()); // version needed
            buf.extend_from_slice(&0u16.to_le_bytes()); // flags
            buf.extend_from_slice(&method.to_le_bytes());
            buf.extend_from_slice(&0u16.to_le_bytes()); // mod time
            buf.extend_from_slice(&0u16.to_le_bytes()); // mod date
            buf.extend_from_slice(&0u32.to_le_bytes()); // crc32
            buf.extend_from_slice(&(*payload_len as u32).to_le_bytes());
            buf.extend_from_slice(&(*payload_len as u32).to_le_bytes());
            buf.extend_from_slice(&(name.len() as u16).to_le_bytes());
            buf.extend_from_slice(&0u16.to_le_bytes()); // extra len
            buf.extend_from_slice(&0u16.to_le_bytes()); // comment len
            buf.extend_from_slice(&0u16.to_le_bytes()); // disk number
            buf.extend_from_slice(&0u16.to_le_bytes()); // internal attrs
            buf.extend_from_slice(&0u32.to_le_bytes()); // external attrs
            buf.extend_from_slice(&offset.to_le_bytes());
            buf.extend_from_slice(name.as_bytes());
        }
        let cd_size = buf.len() as u32 - cd_offset;

        buf.extend_from_slice(&[0x50, 0x4B, 0x05, 0x06]); // EOCD sig
        buf.extend_from_slice(&0u16.to_le_bytes()); // disk number
        buf.extend_from_slice(&0u16.to_le_bytes()); // cd start disk
        buf.extend_from_slice(&(locals.len() as u16).to_le_bytes());
        buf.extend_from_slice(&(locals.len() as u16).to_le_bytes());
        buf.extend_from_slice(&cd_size.to_le_bytes());
        buf.extend_from_slice(&cd_offset.to_le_bytes());
        buf.extend_from_slice(&0u16.to_le_bytes()); // comment len
        buf
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::build_zip;
    use super::*;
    use crate::error::ExtractError;

    #[test]
    fn lists_entries_in_directory_order() {
        let zip = build_zip(&[
            ("word/document.xml", METHOD_STORED, b"<doc/>"),
            ("word/styles.xml", METHOD_STORED, b"<styles/>"),
        ]);
        let entries = list_entries(&zip).expect("valid archive");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "word/document.xml");
        assert_eq!(entries[1].name, "word/styles.xml");
        assert_eq!(entries[0].method, METHOD_STORED);
        assert_eq!(entries[0].compressed_size, 6);
    }

    #[test]
    fn reads_stored_entry_payload() {
        let zip = build_zip(&[("a.txt", METHOD_STORED, b"hello container")]);
        let entries = list_entries(&zip).unwrap();
        let data = read_entry(&zip, &entries[0]).unwrap();
        assert_eq!(data, b"hello container");
    }

    #[test]
    fn rejects_buffer_without_signature() {
        let err = list_entries(b"this is definitely not an archive").unwrap_err();
        assert!(matches!(err, ExtractError::MalformedContainer { .. }));
    }

    #[test]
    fn rejects_tiny_buffer() {
        let err = list_entries(&[0x50, 0x4B]).unwrap_err();
        assert!(matches!(err, ExtractError::MalformedContainer { .. }));
    }

    #[test]
    fn finds_eocd_behind_trailing_comment() {
        let mut zip = build_zip(&[("a.txt", METHOD_STORED, b"x")]);
        // Patch the comment length and append a comment after the record.
        let comment = b"archive comment";
        let clen_at = zip.len() - 2;
        zip[clen_at..].copy_from_slice(&(comment.len() as u16).to_le_bytes());
        zip.extend_from_slice(comment);
        let entries = list_entries(&zip).expect("EOCD behind comment");
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn rejects_directory_offset_past_buffer() {
        let mut zip = build_zip(&[("a.txt", METHOD_STORED, b"x")]);
        // Corrupt the EOCD's central-directory offset to point past the end.
        let eocd = zip.len() - 22;
        zip[eocd + 16..eocd + 20].copy_from_slice(&u32::MAX.to_le_bytes());
        let err = list_entries(&zip).unwrap_err();
        assert!(matches!(err, ExtractError::MalformedContainer { .. }));
    }

    #[test]
    fn rejects_entry_count_beyond_directory() {
        let mut zip = build_zip(&[("a.txt", METHOD_STORED, b"x")]);
        // Claim more entries than the directory holds.
        let eocd = zip.len() - 22;
        zip[eocd + 10..eocd + 12].copy_from_slice(&9u16.to_le_bytes());
        let err = list_entries(&zip).unwrap_err();
        assert!(matches!(err, ExtractError::MalformedContainer { .. }));
    }

    #[test]
    fn rejects_compressed_size_past_buffer() {
        let zip = build_zip(&[("a.txt", METHOD_STORED, b"x")]);
        let mut entry = list_entries(&zip).unwrap().remove(0);
        entry.compressed_size = 10_000;
        let err = read_entry(&zip, &entry).unwrap_err();
        assert!(matches!(err, ExtractError::MalformedContainer { .. }));
    }

    #[test]
    fn rejects_bad_local_header_signature() {
        let zip = build_zip(&[("a.txt", METHOD_STORED, b"x")]);
        let mut entry = list_entries(&zip).unwrap().remove(0);
        // Point the descriptor at the central directory instead.
        entry.local_header_offset = (zip.len() - 22 - 46 - 5) as u32;
        let err = read_entry(&zip, &entry).unwrap_err();
        assert!(matches!(err, ExtractError::MalformedContainer { .. }));
    }

    #[test]
    fn unknown_method_passes_payload_through() {
        let zip = build_zip(&[("a.bin", 12, b"\x01\x02\x03")]);
        let entries = list_entries(&zip).unwrap();
        let data = read_entry(&zip, &entries[0]).unwrap();
        assert_eq!(data, b"\x01\x02\x03");
    }

    #[test]
    fn find_entry_is_exact_match() {
        let zip = build_zip(&[("word/document.xml", METHOD_STORED, b"<doc/>")]);
        let entries = list_entries(&zip).unwrap();
        assert!(find_entry(&entries, "word/document.xml").is_some());
        assert!(find_entry(&entries, "word/Document.xml").is_none());
    }
}

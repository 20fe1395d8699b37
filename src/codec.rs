//! Binary codec for cached variant maps. All integers little-endian.
//!
//! ```text
//! 0        4         count n of non-source variants (u32)
//! 4        16*n      records: id (u64), source len (u32), variant len (u32)
//! 4+16n    ...       per record in order: source bytes, then variant bytes
//! ```
//!
//! The source form is repeated once per record. Entries written by other
//! producers of this layout rely on it, so it is kept.

use std::collections::HashSet;

use crate::error::CodecError;
use crate::variant::{VariantMap, SOURCE_ID};

const COUNT_LEN: usize = 4;
const RECORD_LEN: usize = 16;

/// Serialize a variant map. Variants are written in ascending id order.
///
/// A map holding only the source form encodes to a bare zero count, which
/// [`decode`] reports as a miss: the source is only stored inside records.
///
/// Count and length fields are 32 bits wide, so a single string (or the
/// number of variants) must stay below 4 GiB.
pub fn encode(map: &VariantMap) -> Vec<u8> {
    let source = map.source().as_bytes();
    let count = map.variant_count();
    let data_len: usize = map.variants().map(|(_, v)| source.len() + v.len()).sum();

    let mut buf = Vec::with_capacity(COUNT_LEN + count * RECORD_LEN + data_len);
    buf.extend_from_slice(&len_u32(count).to_le_bytes());
    for (id, variant) in map.variants() {
        buf.extend_from_slice(&u64::from(id).to_le_bytes());
        buf.extend_from_slice(&len_u32(source.len()).to_le_bytes());
        buf.extend_from_slice(&len_u32(variant.len()).to_le_bytes());
    }
    for (_, variant) in map.variants() {
        buf.extend_from_slice(source);
        buf.extend_from_slice(variant.as_bytes());
    }
    buf
}

/// Parse an encoded entry.
///
/// `Ok(None)` for an empty buffer or a zero count. Any structural damage is an
/// error: a partially decoded map is never returned.
pub fn decode(buf: &[u8]) -> Result<Option<VariantMap>, CodecError> {
    if buf.is_empty() {
        return Ok(None);
    }

    let count = read_u32(buf, 0, "count")? as usize;
    let header_len = count
        .checked_mul(RECORD_LEN)
        .ok_or(CodecError::Truncated {
            field: "header",
            offset: COUNT_LEN,
            needed: usize::MAX,
            available: buf.len() - COUNT_LEN,
        })?;
    let data_start = COUNT_LEN + header_len;
    if data_start > buf.len() {
        return Err(CodecError::Truncated {
            field: "header",
            offset: COUNT_LEN,
            needed: header_len,
            available: buf.len() - COUNT_LEN,
        });
    }

    if count == 0 {
        return match buf.len() - COUNT_LEN {
            0 => Ok(None),
            extra => Err(CodecError::TrailingBytes(extra)),
        };
    }

    let mut source: Option<&str> = None;
    let mut variants = Vec::with_capacity(count);
    let mut seen = HashSet::with_capacity(count);
    let mut cursor = data_start;

    for record in 0..count {
        let at = COUNT_LEN + record * RECORD_LEN;
        let raw_id = read_u64(buf, at, "variant id")?;
        let id = u32::try_from(raw_id).map_err(|_| CodecError::IdOutOfRange(raw_id))?;
        if id == SOURCE_ID {
            return Err(CodecError::ReservedId { record });
        }
        if !seen.insert(id) {
            return Err(CodecError::DuplicateId { record, id });
        }
        let source_len = read_u32(buf, at + 8, "source length")? as usize;
        let variant_len = read_u32(buf, at + 12, "variant length")? as usize;

        let src = take(buf, cursor, source_len, "source bytes")?;
        cursor += source_len;
        let dst = take(buf, cursor, variant_len, "variant bytes")?;
        cursor += variant_len;

        let src = std::str::from_utf8(src).map_err(|_| CodecError::InvalidUtf8 { id: 0 })?;
        let dst = std::str::from_utf8(dst).map_err(|_| CodecError::InvalidUtf8 { id })?;

        match source {
            Some(first) if first != src => return Err(CodecError::SourceMismatch { record }),
            Some(_) => {}
            None => source = Some(src),
        }
        variants.push((id, dst));
    }

    if cursor != buf.len() {
        return Err(CodecError::TrailingBytes(buf.len() - cursor));
    }

    let mut map = VariantMap::new(source.unwrap_or_default());
    for (id, text) in variants {
        map.insert(id, text);
    }
    Ok(Some(map))
}

fn len_u32(len: usize) -> u32 {
    debug_assert!(len <= u32::MAX as usize, "length {len} overflows a u32 field");
    len as u32
}

fn take<'a>(
    buf: &'a [u8],
    offset: usize,
    len: usize,
    field: &'static str,
) -> Result<&'a [u8], CodecError> {
    offset
        .checked_add(len)
        .and_then(|end| buf.get(offset..end))
        .ok_or(CodecError::Truncated {
            field,
            offset,
            needed: len,
            available: buf.len().saturating_sub(offset),
        })
}

fn read_u32(buf: &[u8], offset: usize, field: &'static str) -> Result<u32, CodecError> {
    let bytes = take(buf, offset, 4, field)?;
    let mut raw = [0u8; 4];
    raw.copy_from_slice(bytes);
    Ok(u32::from_le_bytes(raw))
}

fn read_u64(buf: &[u8], offset: usize, field: &'static str) -> Result<u64, CodecError> {
    let bytes = take(buf, offset, 8, field)?;
    let mut raw = [0u8; 8];
    raw.copy_from_slice(bytes);
    Ok(u64::from_le_bytes(raw))
}

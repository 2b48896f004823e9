//! KLV (Key-Length-Value) triplets.
//!
//! Every structure in an MXF header partition is a KLV triplet: a 16-byte Universal Label key, a
//! BER-encoded length and the value bytes. Local sets nest 2-byte tag / 2-byte length items inside
//! the value.

use crate::foundation::error::{ImfError, ImfResult};
use crate::mxf::ul::Ul;
use byteorder::{BigEndian, ReadBytesExt};
use std::io::Cursor;

/// Position of one KLV triplet within a byte buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KlvHeader {
    /// Triplet key.
    pub key: Ul,
    /// Offset of the key from the start of the buffer.
    pub offset: u64,
    /// Bytes taken by the key and the BER length.
    pub header_len: u64,
    /// Length of the value.
    pub value_len: u64,
}

impl KlvHeader {
    /// Offset of the first value byte.
    pub fn value_offset(&self) -> u64 {
        self.offset + self.header_len
    }

    /// Total size of the triplet.
    pub fn total_len(&self) -> u64 {
        self.header_len + self.value_len
    }
}

/// Sequential reader over KLV triplets.
pub struct KlvReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> KlvReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn has_more(&self) -> bool {
        self.position + 16 <= self.data.len()
    }

    /// Read the next triplet; `None` at the end of the buffer.
    pub fn read_klv(&mut self) -> ImfResult<Option<(KlvHeader, &'a [u8])>> {
        if !self.has_more() {
            return Ok(None);
        }
        let start = self.position;
        let mut key = [0u8; 16];
        key.copy_from_slice(&self.data[start..start + 16]);

        let (length, len_size) = decode_ber_length(&self.data[start + 16..]).map_err(|e| {
            ImfError::mxf(format!("bad KLV length at offset {start}: {e}"))
        })?;
        let value_start = start + 16 + len_size;
        let value_end = value_start
            .checked_add(length)
            .filter(|end| *end <= self.data.len())
            .ok_or_else(|| {
                ImfError::mxf(format!(
                    "KLV at offset {start} needs {length} value bytes, {} available",
                    self.data.len().saturating_sub(value_start)
                ))
            })?;
        self.position = value_end;

        let header = KlvHeader {
            key: Ul(key),
            offset: start as u64,
            header_len: (16 + len_size) as u64,
            value_len: length as u64,
        };
        Ok(Some((header, &self.data[value_start..value_end])))
    }
}

/// Decode a BER length, returning `(length, bytes consumed)`.
pub fn decode_ber_length(data: &[u8]) -> ImfResult<(usize, usize)> {
    let first = *data
        .first()
        .ok_or_else(|| ImfError::mxf("missing BER length"))?;
    if first < 0x80 {
        return Ok((first as usize, 1));
    }
    if first == 0x80 {
        return Err(ImfError::mxf("indefinite BER length is not supported"));
    }
    let num_bytes = (first & 0x7F) as usize;
    if num_bytes > 8 {
        return Err(ImfError::mxf(format!("BER length of {num_bytes} bytes")));
    }
    let bytes = data
        .get(1..1 + num_bytes)
        .ok_or_else(|| ImfError::mxf("truncated BER length"))?;
    let length = bytes
        .iter()
        .fold(0u64, |acc, b| (acc << 8) | u64::from(*b));
    let length = usize::try_from(length)
        .map_err(|_| ImfError::mxf(format!("BER length {length} exceeds address space")))?;
    Ok((length, 1 + num_bytes))
}

/// Split a local set value into `(tag, value)` items.
pub fn read_local_items(value: &[u8]) -> ImfResult<Vec<(u16, &[u8])>> {
    let mut items = Vec::new();
    let mut cursor = Cursor::new(value);
    while (cursor.position() as usize) < value.len() {
        let at = cursor.position() as usize;
        let tag = cursor
            .read_u16::<BigEndian>()
            .map_err(|_| ImfError::mxf(format!("truncated local tag at {at}")))?;
        let len = cursor
            .read_u16::<BigEndian>()
            .map_err(|_| ImfError::mxf(format!("truncated local length at {at}")))?
            as usize;
        let start = at + 4;
        let item = value.get(start..start + len).ok_or_else(|| {
            ImfError::mxf(format!("local item {tag:04x} overruns its set ({len} bytes)"))
        })?;
        items.push((tag, item));
        cursor.set_position((start + len) as u64);
    }
    Ok(items)
}

/// Read a batch/array header (`count`, `item length`) followed by its items.
pub fn read_batch(value: &[u8]) -> ImfResult<Vec<&[u8]>> {
    let mut cursor = Cursor::new(value);
    let count = cursor
        .read_u32::<BigEndian>()
        .map_err(|_| ImfError::mxf("truncated batch count"))? as usize;
    let item_len = cursor
        .read_u32::<BigEndian>()
        .map_err(|_| ImfError::mxf("truncated batch item length"))? as usize;
    let body = &value[8..];
    if item_len == 0 {
        return Ok(Vec::new());
    }
    let needed = count
        .checked_mul(item_len)
        .filter(|n| *n <= body.len())
        .ok_or_else(|| {
            ImfError::mxf(format!(
                "batch of {count} x {item_len} bytes exceeds {} available",
                body.len()
            ))
        })?;
    Ok(body[..needed].chunks_exact(item_len).collect())
}

#[cfg(test)]
#[path = "../../tests/unit/mxf/klv.rs"]
mod tests;

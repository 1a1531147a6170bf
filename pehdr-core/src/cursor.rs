//! Bounds-checked, position-free reads over an immutable byte buffer.
//!
//! Every read takes the offset to read at and returns the offset just past
//! the value, so callers thread the position explicitly from one structure
//! to the next. Byte order is chosen per read.

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use serde::Serialize;

use crate::error::{DecodeError, DecodeResult};

/// Byte order of a single multi-byte field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Endian {
    Little,
    Big,
}

fn window(buf: &[u8], offset: usize, width: usize) -> DecodeResult<&[u8]> {
    offset
        .checked_add(width)
        .and_then(|end| buf.get(offset..end))
        .ok_or(DecodeError::OutOfBounds {
            offset,
            width,
            len: buf.len(),
        })
}

pub fn read_u8(buf: &[u8], offset: usize) -> DecodeResult<(usize, u8)> {
    let bytes = window(buf, offset, 1)?;
    Ok((offset + 1, bytes[0]))
}

pub fn read_u16(buf: &[u8], offset: usize, order: Endian) -> DecodeResult<(usize, u16)> {
    let bytes = window(buf, offset, 2)?;
    let value = match order {
        Endian::Little => LittleEndian::read_u16(bytes),
        Endian::Big => BigEndian::read_u16(bytes),
    };
    Ok((offset + 2, value))
}

pub fn read_u32(buf: &[u8], offset: usize, order: Endian) -> DecodeResult<(usize, u32)> {
    let bytes = window(buf, offset, 4)?;
    let value = match order {
        Endian::Little => LittleEndian::read_u32(bytes),
        Endian::Big => BigEndian::read_u32(bytes),
    };
    Ok((offset + 4, value))
}

pub fn read_u64(buf: &[u8], offset: usize, order: Endian) -> DecodeResult<(usize, u64)> {
    let bytes = window(buf, offset, 8)?;
    let value = match order {
        Endian::Little => LittleEndian::read_u64(bytes),
        Endian::Big => BigEndian::read_u64(bytes),
    };
    Ok((offset + 8, value))
}

/// Reads `len` bytes of text. Trailing NUL padding is dropped and invalid
/// UTF-8 is replaced rather than rejected.
pub fn read_text(buf: &[u8], offset: usize, len: usize) -> DecodeResult<(usize, String)> {
    let bytes = window(buf, offset, len)?;
    let end = bytes
        .iter()
        .rposition(|&b| b != 0)
        .map(|pos| pos + 1)
        .unwrap_or(0);
    let text = String::from_utf8_lossy(&bytes[..end]).into_owned();
    Ok((offset + len, text))
}

/// Little-endian `u16` helper, the order used by every field except the image signature.
pub fn le_u16(buf: &[u8], offset: usize) -> DecodeResult<(usize, u16)> {
    read_u16(buf, offset, Endian::Little)
}

pub fn le_u32(buf: &[u8], offset: usize) -> DecodeResult<(usize, u32)> {
    read_u32(buf, offset, Endian::Little)
}

pub fn le_u64(buf: &[u8], offset: usize) -> DecodeResult<(usize, u64)> {
    read_u64(buf, offset, Endian::Little)
}

use serde::Serialize;

use crate::cursor::{le_u16, le_u32};
use crate::error::DecodeResult;

/// `"MZ"` read as a little-endian word.
pub const DOS_MAGIC: u16 = 0x5a4d;

/// Size of the DOS header in bytes.
pub const DOS_HEADER_SIZE: usize = 64;

/// Represents the legacy MS-DOS header at the start of every image.
///
/// Only `e_lfanew` matters to a modern loader: it holds the file offset of the
/// image signature and COFF header. The remaining fields describe the DOS stub
/// program and are kept for inspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DosHeader {
    /// Magic number, `0x5A4D` ("MZ") in well-formed files.
    pub e_magic: u16,
    /// Bytes on the last 512-byte page of the file.
    pub e_cblp: u16,
    /// Pages in file.
    pub e_cp: u16,
    /// Relocation entries.
    pub e_crlc: u16,
    /// Size of the header in 16-byte paragraphs.
    pub e_cparhdr: u16,
    /// Minimum extra paragraphs needed.
    pub e_minalloc: u16,
    /// Maximum extra paragraphs needed.
    pub e_maxalloc: u16,
    /// Initial (relative) SS value.
    pub e_ss: u16,
    /// Initial SP value.
    pub e_sp: u16,
    pub e_csum: u16,
    /// Initial IP value.
    pub e_ip: u16,
    /// Initial (relative) CS value.
    pub e_cs: u16,
    /// File address of the relocation table.
    pub e_lfarlc: u16,
    pub e_ovno: u16,
    pub e_res: [u16; 4],
    pub e_oemid: u16,
    pub e_oeminfo: u16,
    pub e_res2: [u16; 10],
    /// File offset of the COFF header (the `PE\0\0` signature). Occupies the
    /// last two word slots of the header.
    pub e_lfanew: u32,
}

impl DosHeader {
    /// Decodes the 64-byte header starting at `offset` (always 0 for a real
    /// image). Returns the offset just past the header.
    pub fn decode(buf: &[u8], offset: usize) -> DecodeResult<(usize, Self)> {
        let (o, e_magic) = le_u16(buf, offset)?;
        let (o, e_cblp) = le_u16(buf, o)?;
        let (o, e_cp) = le_u16(buf, o)?;
        let (o, e_crlc) = le_u16(buf, o)?;
        let (o, e_cparhdr) = le_u16(buf, o)?;
        let (o, e_minalloc) = le_u16(buf, o)?;
        let (o, e_maxalloc) = le_u16(buf, o)?;
        let (o, e_ss) = le_u16(buf, o)?;
        let (o, e_sp) = le_u16(buf, o)?;
        let (o, e_csum) = le_u16(buf, o)?;
        let (o, e_ip) = le_u16(buf, o)?;
        let (o, e_cs) = le_u16(buf, o)?;
        let (o, e_lfarlc) = le_u16(buf, o)?;
        let (mut o, e_ovno) = le_u16(buf, o)?;

        let mut e_res = [0u16; 4];
        for word in e_res.iter_mut() {
            (o, *word) = le_u16(buf, o)?;
        }

        let (o, e_oemid) = le_u16(buf, o)?;
        let (mut o, e_oeminfo) = le_u16(buf, o)?;

        let mut e_res2 = [0u16; 10];
        for word in e_res2.iter_mut() {
            (o, *word) = le_u16(buf, o)?;
        }

        let (o, e_lfanew) = le_u32(buf, o)?;

        Ok((
            o,
            DosHeader {
                e_magic,
                e_cblp,
                e_cp,
                e_crlc,
                e_cparhdr,
                e_minalloc,
                e_maxalloc,
                e_ss,
                e_sp,
                e_csum,
                e_ip,
                e_cs,
                e_lfarlc,
                e_ovno,
                e_res,
                e_oemid,
                e_oeminfo,
                e_res2,
                e_lfanew,
            },
        ))
    }

    pub fn has_valid_magic(&self) -> bool {
        self.e_magic == DOS_MAGIC
    }

    /// Offset of the COFF header.
    pub fn coff_offset(&self) -> usize {
        self.e_lfanew as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DecodeError;

    fn words(values: &[u16]) -> Vec<u8> {
        values.iter().flat_map(|w| w.to_le_bytes()).collect()
    }

    #[test]
    fn decodes_all_fields_in_order() {
        let values: Vec<u16> = (0..32).map(|i| 0x100 + i).collect();
        let buf = words(&values);
        let (next, dos) = DosHeader::decode(&buf, 0).unwrap();

        assert_eq!(next, DOS_HEADER_SIZE);
        assert_eq!(dos.e_magic, 0x100);
        assert_eq!(dos.e_ovno, 0x10d);
        assert_eq!(dos.e_res, [0x10e, 0x10f, 0x110, 0x111]);
        assert_eq!(dos.e_oemid, 0x112);
        assert_eq!(dos.e_oeminfo, 0x113);
        assert_eq!(dos.e_res2[0], 0x114);
        assert_eq!(dos.e_res2[9], 0x11d);
        assert_eq!(dos.e_lfanew, 0x011f_011e);
        assert!(!dos.has_valid_magic());
    }

    #[test]
    fn coff_offset_is_last_field() {
        let mut values = [0u16; 32];
        values[0] = DOS_MAGIC;
        values[30] = 128;
        let (_, dos) = DosHeader::decode(&words(&values), 0).unwrap();
        assert!(dos.has_valid_magic());
        assert_eq!(dos.coff_offset(), 128);
    }

    #[test]
    fn truncated_header_fails_on_missing_word() {
        let buf = vec![0u8; 63];
        let err = DosHeader::decode(&buf, 0).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::OutOfBounds {
                offset: 60,
                width: 4,
                ..
            }
        ));
    }
}

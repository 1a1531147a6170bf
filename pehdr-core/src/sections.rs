use serde::Serialize;

use crate::cursor::{le_u16, le_u32, read_text};
use crate::error::DecodeResult;
use crate::flags::{section_alignment, SECTION_CHARACTERISTICS};

/// Size of one section header record in bytes.
pub const SECTION_HEADER_SIZE: usize = 40;

pub const IMAGE_SCN_CNT_CODE: u32 = 0x0000_0020;
pub const IMAGE_SCN_MEM_EXECUTE: u32 = 0x2000_0000;
pub const IMAGE_SCN_MEM_READ: u32 = 0x4000_0000;
pub const IMAGE_SCN_MEM_WRITE: u32 = 0x8000_0000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionHeader {
    /// Up to 8 bytes of name, NUL padding removed.
    pub name: String,
    pub virtual_size: u32,
    pub virtual_address: u32,
    pub size_of_raw_data: u32,
    pub pointer_to_raw_data: u32,
    pub pointer_to_relocations: u32,
    pub pointer_to_linenumbers: u32,
    pub number_of_relocations: u16,
    pub number_of_linenumbers: u16,
    pub characteristics: u32,
    /// Byte alignment encoded in the characteristics, object files only.
    pub alignment: Option<u32>,
    pub characteristic_names: Vec<&'static str>,
}

impl SectionHeader {
    /// Decodes one 40-byte section header at `offset`.
    pub fn decode(buf: &[u8], offset: usize) -> DecodeResult<(usize, Self)> {
        let (o, name) = read_text(buf, offset, 8)?;
        let (o, virtual_size) = le_u32(buf, o)?;
        let (o, virtual_address) = le_u32(buf, o)?;
        let (o, size_of_raw_data) = le_u32(buf, o)?;
        let (o, pointer_to_raw_data) = le_u32(buf, o)?;
        let (o, pointer_to_relocations) = le_u32(buf, o)?;
        let (o, pointer_to_linenumbers) = le_u32(buf, o)?;
        let (o, number_of_relocations) = le_u16(buf, o)?;
        let (o, number_of_linenumbers) = le_u16(buf, o)?;
        let (o, characteristics) = le_u32(buf, o)?;

        let mut characteristic_names = SECTION_CHARACTERISTICS.describe(characteristics);
        let alignment = section_alignment(characteristics).map(|(bytes, desc)| {
            characteristic_names.push(desc);
            bytes
        });

        Ok((
            o,
            SectionHeader {
                name,
                virtual_size,
                virtual_address,
                size_of_raw_data,
                pointer_to_raw_data,
                pointer_to_relocations,
                pointer_to_linenumbers,
                number_of_relocations,
                number_of_linenumbers,
                characteristics,
                alignment,
                characteristic_names,
            },
        ))
    }

    pub fn is_executable(&self) -> bool {
        self.characteristics & (IMAGE_SCN_CNT_CODE | IMAGE_SCN_MEM_EXECUTE) != 0
    }

    /// Whether `rva` falls inside the section's virtual extent.
    pub fn contains_rva(&self, rva: u32) -> bool {
        let size = self.virtual_size.max(self.size_of_raw_data);
        rva >= self.virtual_address && u64::from(rva) < u64::from(self.virtual_address) + u64::from(size)
    }
}

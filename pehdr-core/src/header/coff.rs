use serde::Serialize;

use crate::cursor::{le_u16, le_u32, read_u32, Endian};
use crate::error::{DecodeError, DecodeResult};
use crate::flags::{COFF_CHARACTERISTICS, MACHINE_TYPES};

/// `"PE\0\0"` read as a big-endian word.
pub const PE_SIGNATURE: u32 = 0x5045_0000;

/// Size of the COFF file header, not counting the signature.
pub const COFF_HEADER_SIZE: usize = 20;

/// Image signature followed by the COFF file header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoffHeader {
    pub signature: u32,
    pub machine: u16,
    /// Description of `machine` from the machine-type vocabulary.
    pub machine_name: &'static str,
    /// Number of section headers following the optional header.
    pub number_of_sections: u16,
    /// Seconds since the Unix epoch at link time.
    pub time_date_stamp: u32,
    pub pointer_to_symbol_table: u32,
    pub number_of_symbols: u32,
    /// Zero for object files, in which case no optional header follows.
    pub size_of_optional_header: u16,
    pub characteristics: u16,
    pub characteristic_names: Vec<&'static str>,
}

impl CoffHeader {
    /// Decodes the signature and the 20-byte COFF header at `offset`.
    /// Returns the offset of the optional header.
    pub fn decode(buf: &[u8], offset: usize) -> DecodeResult<(usize, Self)> {
        let (o, signature) = read_u32(buf, offset, Endian::Big)?;
        if signature != PE_SIGNATURE {
            return Err(DecodeError::InvalidSignature {
                offset,
                found: signature,
            });
        }

        let machine_offset = o;
        let (o, machine) = le_u16(buf, o)?;
        let machine_name = MACHINE_TYPES
            .lookup(machine)
            .ok_or(DecodeError::UnknownMachineType {
                offset: machine_offset,
                code: machine,
            })?;

        let (o, number_of_sections) = le_u16(buf, o)?;
        let (o, time_date_stamp) = le_u32(buf, o)?;
        let (o, pointer_to_symbol_table) = le_u32(buf, o)?;
        let (o, number_of_symbols) = le_u32(buf, o)?;
        let (o, size_of_optional_header) = le_u16(buf, o)?;
        let (o, characteristics) = le_u16(buf, o)?;

        Ok((
            o,
            CoffHeader {
                signature,
                machine,
                machine_name,
                number_of_sections,
                time_date_stamp,
                pointer_to_symbol_table,
                number_of_symbols,
                size_of_optional_header,
                characteristics,
                characteristic_names: COFF_CHARACTERISTICS.describe(u32::from(characteristics)),
            },
        ))
    }

    pub fn has_characteristic(&self, flag: u16) -> bool {
        self.characteristics & flag == flag
    }
}

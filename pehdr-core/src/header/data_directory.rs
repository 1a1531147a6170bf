use serde::Serialize;

use crate::cursor::le_u32;
use crate::error::{DecodeError, DecodeResult};
use crate::flags::data_directory_name;

/// Size of one directory entry in bytes.
pub const DATA_DIRECTORY_SIZE: usize = 8;

/// One `(address, size)` slot of the optional header's directory table.
/// The slot's meaning comes from its position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataDirectory {
    pub slot: usize,
    pub name: &'static str,
    /// RVA of the table.
    pub virtual_address: u32,
    pub size: u32,
}

impl DataDirectory {
    pub fn decode(buf: &[u8], offset: usize, slot: usize) -> DecodeResult<(usize, Self)> {
        let name = data_directory_name(slot).ok_or(DecodeError::DirectoryCountOverflow {
            offset,
            count: slot as u32 + 1,
        })?;
        let (o, virtual_address) = le_u32(buf, offset)?;
        let (o, size) = le_u32(buf, o)?;
        Ok((
            o,
            DataDirectory {
                slot,
                name,
                virtual_address,
                size,
            },
        ))
    }

    pub fn is_present(&self) -> bool {
        self.virtual_address != 0 || self.size != 0
    }
}

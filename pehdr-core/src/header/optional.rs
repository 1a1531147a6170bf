use serde::Serialize;

use crate::cursor::{le_u16, le_u32, le_u64, read_u8};
use crate::error::{DecodeError, DecodeResult};
use crate::flags::{
    DATA_DIRECTORY_SLOTS, DLL_CHARACTERISTICS, MAGIC_PE32, MAGIC_PE32_PLUS, MAGIC_ROM,
    OPTIONAL_MAGIC, SUBSYSTEMS,
};
use crate::header::data_directory::{DataDirectory, DATA_DIRECTORY_SIZE};

/// Bytes of fixed fields before the directory table of a PE32 (and ROM) header.
pub const PE32_FIXED_SIZE: usize = 96;
/// Bytes of fixed fields before the directory table of a PE32+ header.
pub const PE32_PLUS_FIXED_SIZE: usize = 112;

/// Layout variant selected by the optional header magic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OptionalKind {
    Pe32,
    Pe32Plus,
    Rom,
}

impl OptionalKind {
    pub fn from_magic(magic: u16) -> Option<Self> {
        match magic {
            MAGIC_PE32 => Some(OptionalKind::Pe32),
            MAGIC_PE32_PLUS => Some(OptionalKind::Pe32Plus),
            MAGIC_ROM => Some(OptionalKind::Rom),
            _ => None,
        }
    }

    pub fn magic(self) -> u16 {
        match self {
            OptionalKind::Pe32 => MAGIC_PE32,
            OptionalKind::Pe32Plus => MAGIC_PE32_PLUS,
            OptionalKind::Rom => MAGIC_ROM,
        }
    }

    /// Width in bytes of image base and the stack/heap size fields.
    pub fn word_size(self) -> usize {
        match self {
            OptionalKind::Pe32Plus => 8,
            OptionalKind::Pe32 | OptionalKind::Rom => 4,
        }
    }

    pub fn has_base_of_data(self) -> bool {
        self != OptionalKind::Pe32Plus
    }

    pub fn fixed_size(self) -> usize {
        match self {
            OptionalKind::Pe32Plus => PE32_PLUS_FIXED_SIZE,
            OptionalKind::Pe32 | OptionalKind::Rom => PE32_FIXED_SIZE,
        }
    }

    fn read_word(self, buf: &[u8], offset: usize) -> DecodeResult<(usize, u64)> {
        match self {
            OptionalKind::Pe32Plus => le_u64(buf, offset),
            OptionalKind::Pe32 | OptionalKind::Rom => {
                le_u32(buf, offset).map(|(o, v)| (o, u64::from(v)))
            }
        }
    }
}

/// The optional header, widened to a single shape.
///
/// Fields whose width depends on [`OptionalKind`] are stored as `u64`;
/// `base_of_data` only exists for PE32 and ROM images.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionalHeader {
    pub kind: OptionalKind,
    pub magic: u16,
    pub kind_name: &'static str,
    pub major_linker_version: u8,
    pub minor_linker_version: u8,
    pub size_of_code: u32,
    pub size_of_initialized_data: u32,
    pub size_of_uninitialized_data: u32,
    /// RVA of the entry point. Recorded, never followed.
    pub address_of_entry_point: u32,
    pub base_of_code: u32,
    pub base_of_data: Option<u32>,
    pub image_base: u64,
    pub section_alignment: u32,
    pub file_alignment: u32,
    pub major_operating_system_version: u16,
    pub minor_operating_system_version: u16,
    pub major_image_version: u16,
    pub minor_image_version: u16,
    pub major_subsystem_version: u16,
    pub minor_subsystem_version: u16,
    pub win32_version_value: u32,
    pub size_of_image: u32,
    pub size_of_headers: u32,
    pub check_sum: u32,
    pub subsystem: u16,
    /// `None` when the subsystem code is not in the vocabulary.
    pub subsystem_name: Option<&'static str>,
    pub dll_characteristics: u16,
    pub dll_characteristic_names: Vec<&'static str>,
    pub size_of_stack_reserve: u64,
    pub size_of_stack_commit: u64,
    pub size_of_heap_reserve: u64,
    pub size_of_heap_commit: u64,
    pub loader_flags: u32,
    pub number_of_rva_and_sizes: u32,
    pub data_directories: Vec<DataDirectory>,
}

impl OptionalHeader {
    /// Decodes the optional header and its directory table at `offset`.
    /// Returns the offset of the first section header.
    pub fn decode(buf: &[u8], offset: usize) -> DecodeResult<(usize, Self)> {
        let (o, magic) = le_u16(buf, offset)?;
        let unknown = DecodeError::UnknownOptionalMagic { offset, magic };
        let kind = OptionalKind::from_magic(magic).ok_or(unknown.clone())?;
        let kind_name = OPTIONAL_MAGIC.lookup(magic).ok_or(unknown)?;

        let (o, major_linker_version) = read_u8(buf, o)?;
        let (o, minor_linker_version) = read_u8(buf, o)?;
        let (o, size_of_code) = le_u32(buf, o)?;
        let (o, size_of_initialized_data) = le_u32(buf, o)?;
        let (o, size_of_uninitialized_data) = le_u32(buf, o)?;
        let (o, address_of_entry_point) = le_u32(buf, o)?;
        let (mut o, base_of_code) = le_u32(buf, o)?;

        let base_of_data = if kind.has_base_of_data() {
            let (next, value) = le_u32(buf, o)?;
            o = next;
            Some(value)
        } else {
            None
        };
        let (o, image_base) = kind.read_word(buf, o)?;

        let (o, section_alignment) = le_u32(buf, o)?;
        let (o, file_alignment) = le_u32(buf, o)?;
        let (o, major_operating_system_version) = le_u16(buf, o)?;
        let (o, minor_operating_system_version) = le_u16(buf, o)?;
        let (o, major_image_version) = le_u16(buf, o)?;
        let (o, minor_image_version) = le_u16(buf, o)?;
        let (o, major_subsystem_version) = le_u16(buf, o)?;
        let (o, minor_subsystem_version) = le_u16(buf, o)?;
        let (o, win32_version_value) = le_u32(buf, o)?;
        let (o, size_of_image) = le_u32(buf, o)?;
        let (o, size_of_headers) = le_u32(buf, o)?;
        let (o, check_sum) = le_u32(buf, o)?;

        let (o, subsystem) = le_u16(buf, o)?;
        let subsystem_name = SUBSYSTEMS.lookup(subsystem);
        if subsystem_name.is_none() {
            log::warn!("Unrecognised subsystem code {subsystem} at offset {:#x}", o - 2);
        }

        let (o, dll_characteristics) = le_u16(buf, o)?;

        let (o, size_of_stack_reserve) = kind.read_word(buf, o)?;
        let (o, size_of_stack_commit) = kind.read_word(buf, o)?;
        let (o, size_of_heap_reserve) = kind.read_word(buf, o)?;
        let (o, size_of_heap_commit) = kind.read_word(buf, o)?;

        let (o, loader_flags) = le_u32(buf, o)?;
        let count_offset = o;
        let (mut o, number_of_rva_and_sizes) = le_u32(buf, o)?;

        if number_of_rva_and_sizes as usize > DATA_DIRECTORY_SLOTS {
            return Err(DecodeError::DirectoryCountOverflow {
                offset: count_offset,
                count: number_of_rva_and_sizes,
            });
        }

        let mut data_directories = Vec::with_capacity(number_of_rva_and_sizes as usize);
        for slot in 0..number_of_rva_and_sizes as usize {
            let (next, dir) = DataDirectory::decode(buf, o, slot)?;
            o = next;
            data_directories.push(dir);
        }

        Ok((
            o,
            OptionalHeader {
                kind,
                magic,
                kind_name,
                major_linker_version,
                minor_linker_version,
                size_of_code,
                size_of_initialized_data,
                size_of_uninitialized_data,
                address_of_entry_point,
                base_of_code,
                base_of_data,
                image_base,
                section_alignment,
                file_alignment,
                major_operating_system_version,
                minor_operating_system_version,
                major_image_version,
                minor_image_version,
                major_subsystem_version,
                minor_subsystem_version,
                win32_version_value,
                size_of_image,
                size_of_headers,
                check_sum,
                subsystem,
                subsystem_name,
                dll_characteristics,
                dll_characteristic_names: DLL_CHARACTERISTICS.describe(u32::from(dll_characteristics)),
                size_of_stack_reserve,
                size_of_stack_commit,
                size_of_heap_reserve,
                size_of_heap_commit,
                loader_flags,
                number_of_rva_and_sizes,
                data_directories,
            },
        ))
    }

    /// Bytes this header occupies in the file, directory table included.
    pub fn encoded_size(&self) -> usize {
        self.kind.fixed_size() + self.data_directories.len() * DATA_DIRECTORY_SIZE
    }

    pub fn data_directory(&self, slot: usize) -> Option<&DataDirectory> {
        self.data_directories.get(slot)
    }
}

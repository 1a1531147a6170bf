use serde::Serialize;

use crate::error::{DecodeError, ImageResult, Stage};
use crate::flags::{IMAGE_FILE_DLL, IMAGE_FILE_EXECUTABLE_IMAGE};
use crate::header::coff::CoffHeader;
use crate::header::data_directory::DataDirectory;
use crate::header::dos::DosHeader;
use crate::header::optional::{OptionalHeader, OptionalKind};
use crate::header::Header;
use crate::sections::SectionHeader;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Fail when the DOS header does not start with "MZ" instead of only
    /// logging it.
    pub strict_dos_magic: bool,
}

/// Every header of an image, decoded from one buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeImage {
    pub dos_header: DosHeader,
    pub coff_header: CoffHeader,
    pub optional_header: Option<OptionalHeader>,
    pub section_headers: Vec<SectionHeader>,
}

impl PeImage {
    pub fn decode(buf: &[u8]) -> ImageResult<Self> {
        Self::decode_with(buf, DecodeOptions::default())
    }

    /// Decodes DOS header, COFF header, the optional header when one is
    /// declared, then exactly `number_of_sections` section headers. Each step
    /// starts where the previous one ended. The first failure aborts the decode.
    pub fn decode_with(buf: &[u8], options: DecodeOptions) -> ImageResult<Self> {
        log::debug!("Decoding DOS header ({} byte buffer)", buf.len());
        let (_, dos_header) = DosHeader::decode(buf, 0).map_err(|e| e.at(Stage::Dos))?;
        if !dos_header.has_valid_magic() {
            if options.strict_dos_magic {
                return Err(DecodeError::InvalidDosMagic {
                    found: dos_header.e_magic,
                }
                .at(Stage::Dos));
            }
            log::warn!(
                "DOS magic is {:#06x}, expected \"MZ\"; continuing",
                dos_header.e_magic
            );
        }

        let coff_offset = dos_header.coff_offset();
        log::debug!("Decoding COFF header at {coff_offset:#x}");
        let (mut offset, coff_header) =
            CoffHeader::decode(buf, coff_offset).map_err(|e| e.at(Stage::Coff))?;

        let optional_header = if coff_header.size_of_optional_header > 0 {
            log::debug!("Decoding optional header at {offset:#x}");
            let start = offset;
            let (next, optional) =
                OptionalHeader::decode(buf, start).map_err(|e| e.at(Stage::Optional))?;
            let declared = usize::from(coff_header.size_of_optional_header);
            if next - start != declared {
                log::warn!(
                    "Optional header spans {} bytes but COFF header declares {declared}",
                    next - start
                );
            }
            offset = next;
            Some(optional)
        } else {
            log::debug!("No optional header declared");
            None
        };

        let count = usize::from(coff_header.number_of_sections);
        let mut section_headers = Vec::with_capacity(count);
        for index in 0..count {
            log::debug!("Decoding section header {index} at {offset:#x}");
            let (next, section) =
                SectionHeader::decode(buf, offset).map_err(|e| e.at(Stage::Section(index)))?;
            offset = next;
            section_headers.push(section);
        }

        log::info!(
            "Decoded {} image for {} with {} sections",
            optional_header
                .as_ref()
                .map(|o| o.kind_name)
                .unwrap_or("object"),
            coff_header.machine_name,
            section_headers.len()
        );

        Ok(Self {
            dos_header,
            coff_header,
            optional_header,
            section_headers,
        })
    }

    pub fn kind(&self) -> Option<OptionalKind> {
        self.optional_header.as_ref().map(|o| o.kind)
    }

    pub fn image_base(&self) -> Option<u64> {
        self.optional_header.as_ref().map(|o| o.image_base)
    }

    pub fn is_dll(&self) -> bool {
        self.coff_header.has_characteristic(IMAGE_FILE_DLL)
    }

    pub fn data_directories(&self) -> &[DataDirectory] {
        self.optional_header
            .as_ref()
            .map(|o| o.data_directories.as_slice())
            .unwrap_or(&[])
    }

    pub fn data_directory(&self, name: &str) -> Option<&DataDirectory> {
        self.data_directories().iter().find(|d| d.name == name)
    }

    pub fn section_by_name(&self, name: &str) -> Option<&SectionHeader> {
        self.section_headers.iter().find(|s| s.name == name)
    }

    /// Section whose virtual extent holds the entry point.
    pub fn entry_section(&self) -> Option<&SectionHeader> {
        let entry = self.optional_header.as_ref()?.address_of_entry_point;
        self.section_headers.iter().find(|s| s.contains_rva(entry))
    }
}

impl Header for PeImage {
    fn entry_point(&self) -> u64 {
        self.optional_header
            .as_ref()
            .map(|o| o.image_base.wrapping_add(u64::from(o.address_of_entry_point)))
            .unwrap_or(0)
    }

    fn machine(&self) -> u16 {
        self.coff_header.machine
    }

    fn is_64(&self) -> bool {
        self.kind() == Some(OptionalKind::Pe32Plus)
    }

    fn format_name(&self) -> &'static str {
        match self.kind() {
            Some(OptionalKind::Pe32) => "PE32",
            Some(OptionalKind::Pe32Plus) => "PE32+",
            Some(OptionalKind::Rom) => "ROM",
            None => "COFF",
        }
    }

    fn is_executable(&self) -> bool {
        self.coff_header.has_characteristic(IMAGE_FILE_EXECUTABLE_IMAGE)
    }
}

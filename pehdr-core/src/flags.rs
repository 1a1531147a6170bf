//! Static vocabularies for the coded and bit-flag fields of the image headers.
//!
//! Bit-flag vocabularies are queried with [`FlagTable::describe`], which keeps
//! only the bits that have a listed meaning. Single-valued codes are queried
//! with [`CodeTable::lookup`].

/// Bit-to-description vocabulary for a bitmask field.
#[derive(Debug)]
pub struct FlagTable {
    pub name: &'static str,
    pub entries: &'static [(u32, &'static str)],
}

impl FlagTable {
    /// Descriptions of every known bit set in `mask`, in ascending bit order.
    pub fn describe(&self, mask: u32) -> Vec<&'static str> {
        self.entries
            .iter()
            .filter(|(bit, _)| mask & bit != 0)
            .map(|&(_, desc)| desc)
            .collect()
    }

    /// Bits of `mask` that no entry accounts for.
    pub fn unknown_bits(&self, mask: u32) -> u32 {
        let known = self.entries.iter().fold(0, |acc, (bit, _)| acc | bit);
        mask & !known
    }
}

/// Code-to-description vocabulary for a single-valued field.
#[derive(Debug)]
pub struct CodeTable {
    pub name: &'static str,
    pub entries: &'static [(u16, &'static str)],
}

impl CodeTable {
    pub fn lookup(&self, code: u16) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(c, _)| *c == code)
            .map(|&(_, desc)| desc)
    }
}

pub const MAGIC_PE32: u16 = 0x10b;
pub const MAGIC_PE32_PLUS: u16 = 0x20b;
pub const MAGIC_ROM: u16 = 0x107;

pub static OPTIONAL_MAGIC: CodeTable = CodeTable {
    name: "optional header magic",
    entries: &[
        (MAGIC_PE32, "PE32 executable"),
        (MAGIC_PE32_PLUS, "PE32+ executable"),
        (MAGIC_ROM, "ROM image"),
    ],
};

pub const MACHINE_I386: u16 = 0x14c;
pub const MACHINE_AMD64: u16 = 0x8664;
pub const MACHINE_ARM64: u16 = 0xaa64;

pub static MACHINE_TYPES: CodeTable = CodeTable {
    name: "machine type",
    entries: &[
        (0x0, "Unknown"),
        (0x184, "Alpha AXP, 32-bit address space"),
        (0x284, "AXP 64 (Same as Alpha 64)"),
        (0x1d3, "Matsushita AM33"),
        (MACHINE_AMD64, "x64"),
        (0x1c0, "ARM little endian"),
        (MACHINE_ARM64, "ARM64 little endian"),
        (0x1c4, "ARM Thumb-2 little endian"),
        (0xebc, "EFI byte code"),
        (MACHINE_I386, "Intel 386 or later processors and compatible processors"),
        (0x200, "Intel Itanium processor family"),
        (0x6232, "LoongArch 32-bit processor family"),
        (0x6264, "LoongArch 64-bit processor family"),
        (0x9041, "Mitsubishi M32R little endian"),
        (0x266, "MIPS16"),
        (0x366, "MIPS with FPU"),
        (0x466, "MIPS16 with FPU"),
        (0x1f0, "Power PC little endian"),
        (0x1f1, "Power PC with floating point support"),
        (0x166, "MIPS little endian"),
        (0x5032, "RISC-V 32-bit address space"),
        (0x5064, "RISC-V 64-bit address space"),
        (0x5128, "RISC-V 128-bit address space"),
        (0x1a2, "Hitachi SH3"),
        (0x1a3, "Hitachi SH3 DSP"),
        (0x1a6, "Hitachi SH4"),
        (0x1a8, "Hitachi SH5"),
        (0x1c2, "Thumb"),
        (0x169, "MIPS little-endian WCE v2"),
    ],
};

pub static SUBSYSTEMS: CodeTable = CodeTable {
    name: "subsystem",
    entries: &[
        (0, "An unknown subsystem"),
        (1, "Device drivers and native Windows processes"),
        (2, "The Windows graphical user interface (GUI) subsystem"),
        (3, "The Windows character subsystem"),
        (5, "The OS/2 character subsystem"),
        (7, "The Posix character subsystem"),
        (8, "Native Win9x driver"),
        (9, "Windows CE"),
        (10, "An Extensible Firmware Interface (EFI) application"),
        (11, "An EFI driver with boot services"),
        (12, "An EFI driver with run-time services"),
        (13, "An EFI ROM image"),
        (14, "XBOX"),
        (16, "Windows boot application"),
    ],
};

pub const IMAGE_FILE_EXECUTABLE_IMAGE: u16 = 0x0002;
pub const IMAGE_FILE_DLL: u16 = 0x2000;

pub static COFF_CHARACTERISTICS: FlagTable = FlagTable {
    name: "COFF characteristics",
    entries: &[
        (0x0001, "Image only, Windows CE, and Microsoft Windows NT and later. This indicates that the file does not contain base relocations and must therefore be loaded at its preferred base address. If the base address is not available, the loader reports an error. The default behavior of the linker is to strip base relocations from executable (EXE) files."),
        (0x0002, "Image only. This indicates that the image file is valid and can be run. If this flag is not set, it indicates a linker error."),
        (0x0004, "COFF line numbers have been removed. This flag is deprecated and should be zero."),
        (0x0008, "COFF symbol table entries for local symbols have been removed. This flag is deprecated and should be zero."),
        (0x0010, "Obsolete. Aggressively trim working set. This flag is deprecated for Windows 2000 and later and must be zero."),
        (0x0020, "Application can handle > 2-GB addresses."),
        (0x0080, "Little endian: the least significant bit (LSB) precedes the most significant bit (MSB) in memory. This flag is deprecated and should be zero."),
        (0x0100, "Machine is based on a 32-bit-word architecture."),
        (0x0200, "Debugging information is removed from the image file."),
        (0x0400, "If the image is on removable media, fully load it and copy it to the swap file."),
        (0x0800, "If the image is on network media, fully load it and copy it to the swap file."),
        (0x1000, "The image file is a system file, not a user program."),
        (0x2000, "The image file is a dynamic-link library (DLL). Such files are considered executable files for almost all purposes, although they cannot be directly run."),
        (0x4000, "The file should be run only on a uniprocessor machine."),
        (0x8000, "Big endian: the MSB precedes the LSB in memory. This flag is deprecated and should be zero."),
    ],
};

pub static DLL_CHARACTERISTICS: FlagTable = FlagTable {
    name: "DLL characteristics",
    entries: &[
        (0x0020, "Image can handle a high entropy 64-bit virtual address space."),
        (0x0040, "DLL can be relocated at load time."),
        (0x0080, "Code Integrity checks are enforced."),
        (0x0100, "Image is NX compatible."),
        (0x0200, "Isolation aware, but do not isolate the image."),
        (0x0400, "Does not use structured exception (SE) handling. No SE handler may be called in this image."),
        (0x0800, "Do not bind the image."),
        (0x1000, "Image must execute in an AppContainer."),
        (0x2000, "A WDM driver."),
        (0x4000, "Image supports Control Flow Guard."),
        (0x8000, "Terminal Server aware."),
    ],
};

/// Mask of the 4-bit alignment code inside the section characteristics.
pub const SECTION_ALIGN_MASK: u32 = 0x00F0_0000;

pub static SECTION_CHARACTERISTICS: FlagTable = FlagTable {
    name: "section characteristics",
    entries: &[
        (0x0000_0008, "The section should not be padded to the next boundary. This flag is obsolete and is replaced by IMAGE_SCN_ALIGN_1BYTES."),
        (0x0000_0020, "The section contains executable code."),
        (0x0000_0040, "The section contains initialized data."),
        (0x0000_0080, "The section contains uninitialized data."),
        (0x0000_0200, "The section contains comments or other information. The .drectve section has this type. This is valid for object files only."),
        (0x0000_0800, "The section will not become part of the image. This is valid only for object files."),
        (0x0000_1000, "The section contains COMDAT data. For more information, see COMDAT Sections (Object Only). This is valid only for object files."),
        (0x0000_8000, "The section contains data referenced through the global pointer (GP)."),
        (0x0100_0000, "The section contains extended relocations."),
        (0x0200_0000, "The section can be discarded as needed."),
        (0x0400_0000, "The section cannot be cached."),
        (0x0800_0000, "The section is not pageable."),
        (0x1000_0000, "The section can be shared in memory."),
        (0x2000_0000, "The section can be executed as code."),
        (0x4000_0000, "The section can be read."),
        (0x8000_0000, "The section can be written to."),
    ],
};

static SECTION_ALIGNMENTS: [&str; 14] = [
    "Align data on a 1-byte boundary. Valid only for object files.",
    "Align data on a 2-byte boundary. Valid only for object files.",
    "Align data on a 4-byte boundary. Valid only for object files.",
    "Align data on an 8-byte boundary. Valid only for object files.",
    "Align data on a 16-byte boundary. Valid only for object files.",
    "Align data on a 32-byte boundary. Valid only for object files.",
    "Align data on a 64-byte boundary. Valid only for object files.",
    "Align data on a 128-byte boundary. Valid only for object files.",
    "Align data on a 256-byte boundary. Valid only for object files.",
    "Align data on a 512-byte boundary. Valid only for object files.",
    "Align data on a 1024-byte boundary. Valid only for object files.",
    "Align data on a 2048-byte boundary. Valid only for object files.",
    "Align data on a 4096-byte boundary. Valid only for object files.",
    "Align data on an 8192-byte boundary. Valid only for object files.",
];

/// Decodes the alignment code of a section characteristics mask into a byte
/// alignment and its description. Codes 0 and 15 carry no alignment.
pub fn section_alignment(mask: u32) -> Option<(u32, &'static str)> {
    let code = (mask & SECTION_ALIGN_MASK) >> 20;
    match code {
        1..=14 => Some((1 << (code - 1), SECTION_ALIGNMENTS[code as usize - 1])),
        _ => None,
    }
}

/// Number of named data directory slots.
pub const DATA_DIRECTORY_SLOTS: usize = 16;

pub static DATA_DIRECTORY_NAMES: [&str; DATA_DIRECTORY_SLOTS] = [
    "Export table (.edata)",
    "Import table (.idata)",
    "Resource table (.rsrc)",
    "Exception table (.pdata)",
    "Cert table",
    "Base reloc table (.reloc)",
    "Debug (.debug)",
    "Architecture (must be 0)",
    "Global ptr (size must be 0)",
    "TLS table (.tls)",
    "Load config table",
    "Bound import",
    "Import addr table",
    "Delay import descriptor",
    "CLR runtime header (.cormeta)",
    "Reserved (must be 0)",
];

pub fn data_directory_name(slot: usize) -> Option<&'static str> {
    DATA_DIRECTORY_NAMES.get(slot).copied()
}

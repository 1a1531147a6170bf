use std::fmt::Display;

use colored::Colorize;
use pehdr_core::{CoffHeader, DataDirectory, DosHeader, OptionalHeader, SectionHeader};
use tabled::settings::Style;
use tabled::{Table, Tabled};

fn heading(title: &str) {
    println!("{}", title.bold().cyan());
}

fn field(label: &str, value: impl Display) {
    println!("  {:<34} {}", label, value);
}

fn flags(label: &str, names: &[&str]) {
    if names.is_empty() {
        field(label, "none");
        return;
    }
    println!("  {label}:");
    for name in names {
        println!("    - {name}");
    }
}

fn hex(value: impl std::fmt::LowerHex) -> String {
    format!("{value:#x}")
}

/// Renders a link timestamp as a UTC date, falling back to the raw value.
pub fn timestamp(secs: u32) -> String {
    chrono::DateTime::from_timestamp(i64::from(secs), 0)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| secs.to_string())
}

pub fn dos_header(dos: &DosHeader) {
    heading("DOS header");
    field("Magic number", hex(dos.e_magic));
    field("Number of bytes on last page", dos.e_cblp);
    field("Number of pages in file", dos.e_cp);
    field("Relocations", dos.e_crlc);
    field("Size of header in paragraphs", dos.e_cparhdr);
    field("Min extra paragraphs needed", dos.e_minalloc);
    field("Max extra paragraphs needed", dos.e_maxalloc);
    field("Initial SS value", dos.e_ss);
    field("Initial SP value", dos.e_sp);
    field("Checksum", dos.e_csum);
    field("Initial IP value", dos.e_ip);
    field("Initial CS value", dos.e_cs);
    field("File addr of reloc table", hex(dos.e_lfarlc));
    field("Overlay number", dos.e_ovno);
    field("Reserved words[4]", format!("{:?}", dos.e_res));
    field("OEM ID", dos.e_oemid);
    field("OEM info", dos.e_oeminfo);
    field("Reserved words[10]", format!("{:?}", dos.e_res2));
    field("File addr of COFF header", hex(dos.e_lfanew));
    println!();
}

pub fn coff_header(coff: &CoffHeader) {
    heading("COFF header");
    field("Signature", hex(coff.signature));
    field("Target machine", format!("{} ({:#x})", coff.machine_name, coff.machine));
    field("Number of sections", coff.number_of_sections);
    field("Date & time of creation", timestamp(coff.time_date_stamp));
    field("Pointer to symbol table", hex(coff.pointer_to_symbol_table));
    field("Number of symbols", coff.number_of_symbols);
    field("Size of optional header", coff.size_of_optional_header);
    flags("Characteristics", &coff.characteristic_names);
    println!();
}

pub fn optional_header(opt: &OptionalHeader) {
    heading("Optional header");
    field("Executable type", opt.kind_name);
    field("Major linker version", opt.major_linker_version);
    field("Minor linker version", opt.minor_linker_version);
    field("Size of code", opt.size_of_code);
    field("Size of initialized data", opt.size_of_initialized_data);
    field("Size of uninitialized data", opt.size_of_uninitialized_data);
    field("Addr of entry point", hex(opt.address_of_entry_point));
    field("Base of code", hex(opt.base_of_code));
    match opt.base_of_data {
        Some(base) => field("Base of data", hex(base)),
        None => field("Base of data", "n/a"),
    }
    field("Image base", hex(opt.image_base));
    field("Section alignment", hex(opt.section_alignment));
    field("File alignment", hex(opt.file_alignment));
    field("Major OS version", opt.major_operating_system_version);
    field("Minor OS version", opt.minor_operating_system_version);
    field("Major image version", opt.major_image_version);
    field("Minor image version", opt.minor_image_version);
    field("Major subsystem version", opt.major_subsystem_version);
    field("Minor subsystem version", opt.minor_subsystem_version);
    field("Win32 version", opt.win32_version_value);
    field("Size of image", hex(opt.size_of_image));
    field("Size of headers", hex(opt.size_of_headers));
    field("Checksum", opt.check_sum);
    match opt.subsystem_name {
        Some(name) => field("Subsystem", name),
        None => field("Subsystem", format!("unrecognised ({})", opt.subsystem)),
    }
    flags("DLL characteristics", &opt.dll_characteristic_names);
    field("Size of stack reserve", opt.size_of_stack_reserve);
    field("Size of stack commit", opt.size_of_stack_commit);
    field("Size of heap reserve", opt.size_of_heap_reserve);
    field("Size of heap commit", opt.size_of_heap_commit);
    field("Loader flags", opt.loader_flags);
    field("Number of RVA/size pairs", opt.number_of_rva_and_sizes);
    println!();
}

#[derive(Tabled)]
struct DirectoryRow {
    #[tabled(rename = "#")]
    slot: usize,
    #[tabled(rename = "Directory")]
    name: &'static str,
    #[tabled(rename = "RVA")]
    virtual_address: String,
    #[tabled(rename = "Size")]
    size: u32,
}

pub fn data_directories(dirs: &[DataDirectory]) {
    heading("Data directories");
    if dirs.is_empty() {
        println!("  No data directories.");
        println!();
        return;
    }
    let rows = dirs.iter().map(|d| DirectoryRow {
        slot: d.slot,
        name: d.name,
        virtual_address: hex(d.virtual_address),
        size: d.size,
    });
    println!("{}", Table::new(rows).with(Style::rounded()));
    println!();
}

#[derive(Tabled)]
struct SectionRow {
    #[tabled(rename = "Section")]
    name: String,
    #[tabled(rename = "VMA")]
    virtual_address: String,
    #[tabled(rename = "VSize")]
    virtual_size: String,
    #[tabled(rename = "Raw ptr")]
    pointer_to_raw_data: String,
    #[tabled(rename = "Raw size")]
    size_of_raw_data: String,
    #[tabled(rename = "Relocs")]
    number_of_relocations: u16,
    #[tabled(rename = "Flags")]
    characteristics: String,
}

pub fn section_headers(sections: &[SectionHeader]) {
    heading("Section headers");
    if sections.is_empty() {
        println!("  No sections found.");
        return;
    }
    let rows = sections.iter().map(|s| SectionRow {
        name: s.name.clone(),
        virtual_address: hex(s.virtual_address),
        virtual_size: hex(s.virtual_size),
        pointer_to_raw_data: hex(s.pointer_to_raw_data),
        size_of_raw_data: hex(s.size_of_raw_data),
        number_of_relocations: s.number_of_relocations,
        characteristics: format!("{:#010x}", s.characteristics),
    });
    println!("{}", Table::new(rows).with(Style::rounded()));

    for s in sections {
        println!();
        println!("  {}", s.name.as_str().bold());
        field("Pointer to relocations", hex(s.pointer_to_relocations));
        field("Number of line numbers", s.number_of_linenumbers);
        field("Pointer to line numbers", hex(s.pointer_to_linenumbers));
        flags("Characteristics", &s.characteristic_names);
    }
}

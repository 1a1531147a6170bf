mod common;

use common::{ImageBuilder, Layout};
use pehdr_core::header::dos::DOS_HEADER_SIZE;
use pehdr_core::{
    CoffHeader, DecodeError, DecodeOptions, DosHeader, Header, OptionalHeader, OptionalKind,
    PeImage, SectionHeader, Stage, SECTION_HEADER_SIZE,
};

#[test]
fn end_to_end_x64_image() {
    let buf = ImageBuilder::new(Layout::Pe32Plus).build();

    let (after_dos, dos) = DosHeader::decode(&buf, 0).unwrap();
    assert_eq!(after_dos, DOS_HEADER_SIZE);
    assert_eq!(dos.coff_offset(), 128);

    let (after_coff, coff) = CoffHeader::decode(&buf, dos.coff_offset()).unwrap();
    assert_eq!(after_coff, 128 + 4 + 20);
    assert_eq!(coff.machine_name, "x64");
    assert_eq!(coff.number_of_sections, 3);

    let (mut offset, optional) = OptionalHeader::decode(&buf, after_coff).unwrap();
    assert_eq!(offset - after_coff, usize::from(coff.size_of_optional_header));

    let mut names = Vec::new();
    for _ in 0..coff.number_of_sections {
        let (next, section) = SectionHeader::decode(&buf, offset).unwrap();
        assert_eq!(next - offset, SECTION_HEADER_SIZE);
        offset = next;
        names.push(section.name);
    }
    assert_eq!(names, [".text", ".rdata", ".data"]);
    assert_eq!(offset, after_coff + optional.encoded_size() + 3 * SECTION_HEADER_SIZE);

    let image = PeImage::decode(&buf).unwrap();
    assert_eq!(image.dos_header, dos);
    assert_eq!(image.coff_header, coff);
    assert_eq!(image.optional_header.as_ref(), Some(&optional));
    assert_eq!(image.section_headers.len(), 3);
    assert!(image.is_64());
    assert!(image.is_executable());
    assert!(!image.is_dll());
    assert_eq!(image.format_name(), "PE32+");
    assert_eq!(image.entry_point(), 0x1_4000_1010);
    assert_eq!(image.entry_section().map(|s| s.name.as_str()), Some(".text"));
    assert_eq!(
        image
            .data_directory("Import table (.idata)")
            .map(|d| d.virtual_address),
        Some(0x2000)
    );
    assert_eq!(
        image.section_by_name(".data").map(|s| s.virtual_address),
        Some(0x3000)
    );
}

#[test]
fn section_offsets_are_contiguous() {
    let buf = ImageBuilder::new(Layout::Pe32).build();
    let image = PeImage::decode(&buf).unwrap();
    let first = 128 + 4 + 20 + image.optional_header.as_ref().unwrap().encoded_size();

    for (i, section) in image.section_headers.iter().enumerate() {
        let start = first + i * SECTION_HEADER_SIZE;
        let (next, decoded) = SectionHeader::decode(&buf, start).unwrap();
        assert_eq!(next, start + SECTION_HEADER_SIZE);
        assert_eq!(&decoded, section);
    }
}

#[test]
fn decoding_is_deterministic() {
    let buf = ImageBuilder::new(Layout::Pe32Plus).build();
    let first = PeImage::decode(&buf).unwrap();
    let second = PeImage::decode(&buf).unwrap();
    assert_eq!(first, second);
}

#[test]
fn pe32_and_pe32_plus_differ_by_field_widths() {
    let narrow = ImageBuilder::new(Layout::Pe32).build();
    let wide = ImageBuilder::new(Layout::Pe32Plus).build();
    let start = 128 + 4 + 20;

    let (narrow_end, narrow_opt) = OptionalHeader::decode(&narrow, start).unwrap();
    let (wide_end, wide_opt) = OptionalHeader::decode(&wide, start).unwrap();
    assert_eq!(narrow_opt.kind, OptionalKind::Pe32);
    assert_eq!(wide_opt.kind, OptionalKind::Pe32Plus);

    // Four stack/heap fields and image base grow from 4 to 8 bytes;
    // base of data disappears.
    let growth = OptionalKind::Pe32Plus.word_size() - OptionalKind::Pe32.word_size();
    let expected = 4 * growth + growth - 4;
    assert_eq!((wide_end - start) - (narrow_end - start), expected);

    assert_eq!(narrow_opt.base_of_data, Some(0x2000));
    assert_eq!(wide_opt.base_of_data, None);
    assert_eq!(narrow_opt.size_of_stack_reserve, wide_opt.size_of_stack_reserve);
    assert_eq!(narrow_opt.data_directories, wide_opt.data_directories);
}

#[test]
fn bad_signature_fails_at_coff_stage() {
    let mut builder = ImageBuilder::new(Layout::Pe32Plus);
    builder.signature = *b"NE\0\0";
    let err = PeImage::decode(&builder.build()).unwrap_err();

    assert_eq!(err.stage, Stage::Coff);
    assert_eq!(err.offset(), 128);
    assert!(matches!(err.source, DecodeError::InvalidSignature { .. }));
}

#[test]
fn unknown_machine_fails_at_coff_stage() {
    let mut builder = ImageBuilder::new(Layout::Pe32Plus);
    builder.machine = 0xbeef;
    let err = PeImage::decode(&builder.build()).unwrap_err();

    assert_eq!(err.stage, Stage::Coff);
    assert_eq!(
        err.source,
        DecodeError::UnknownMachineType {
            offset: 132,
            code: 0xbeef
        }
    );
}

#[test]
fn directory_count_of_twenty_overflows() {
    let buf = ImageBuilder::new(Layout::Pe32)
        .with_rva_count(20, 16)
        .build();
    let err = PeImage::decode(&buf).unwrap_err();

    assert_eq!(err.stage, Stage::Optional);
    assert_eq!(
        err.source,
        DecodeError::DirectoryCountOverflow {
            offset: 128 + 24 + 92,
            count: 20
        }
    );
}

#[test]
fn short_directory_table_is_honoured() {
    let buf = ImageBuilder::new(Layout::Pe32Plus)
        .with_rva_count(2, 2)
        .build();
    let image = PeImage::decode(&buf).unwrap();
    assert_eq!(image.data_directories().len(), 2);
    assert_eq!(image.section_headers[0].name, ".text");
}

#[test]
fn object_without_optional_header() {
    let buf = ImageBuilder::new(Layout::Object).build();
    let image = PeImage::decode(&buf).unwrap();

    assert!(image.optional_header.is_none());
    assert!(image.data_directories().is_empty());
    assert_eq!(image.entry_point(), 0);
    assert_eq!(image.format_name(), "COFF");
    assert_eq!(image.section_headers.len(), 3);

    let (_, first) = SectionHeader::decode(&buf, 128 + 24).unwrap();
    assert_eq!(first, image.section_headers[0]);
}

#[test]
fn truncated_section_table_reports_index() {
    let mut buf = ImageBuilder::new(Layout::Pe32Plus).build();
    let table_end = 128 + 24 + 112 + 16 * 8 + 3 * SECTION_HEADER_SIZE;
    buf.truncate(table_end - 10);

    let err = PeImage::decode(&buf).unwrap_err();
    assert_eq!(err.stage, Stage::Section(2));
    assert!(matches!(err.source, DecodeError::OutOfBounds { .. }));
}

#[test]
fn coff_offset_past_end_is_out_of_bounds() {
    let mut builder = ImageBuilder::new(Layout::Pe32);
    builder.sections.clear();
    let mut buf = builder.build();
    buf[60..64].copy_from_slice(&0x10_0000u32.to_le_bytes());

    let err = PeImage::decode(&buf).unwrap_err();
    assert_eq!(err.stage, Stage::Coff);
    assert_eq!(err.offset(), 0x10_0000);
}

#[test]
fn missing_dos_magic_is_lenient_by_default() {
    let mut builder = ImageBuilder::new(Layout::Pe32Plus);
    builder.dos_magic = *b"ZM";
    let buf = builder.build();

    let image = PeImage::decode(&buf).unwrap();
    assert!(!image.dos_header.has_valid_magic());

    let strict = DecodeOptions {
        strict_dos_magic: true,
    };
    let err = PeImage::decode_with(&buf, strict).unwrap_err();
    assert_eq!(err.stage, Stage::Dos);
    assert_eq!(err.source, DecodeError::InvalidDosMagic { found: 0x4d5a });
}

#[test]
fn empty_buffer_fails_at_dos_stage() {
    let err = PeImage::decode(&[]).unwrap_err();
    assert_eq!(err.stage, Stage::Dos);
    assert_eq!(err.to_string(), "DOS header decode failed at offset 0x0: read of 2 bytes at offset 0x0 exceeds buffer length 0");
}

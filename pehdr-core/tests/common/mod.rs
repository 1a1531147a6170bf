//! Builder for synthetic images with known field values.
#![allow(dead_code)]

pub const MACHINE_AMD64: u16 = 0x8664;
pub const MACHINE_I386: u16 = 0x14c;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Pe32,
    Pe32Plus,
    /// No optional header; COFF declares size zero.
    Object,
}

#[derive(Debug, Clone)]
pub struct ImageBuilder {
    pub layout: Layout,
    pub coff_offset: u32,
    pub dos_magic: [u8; 2],
    pub signature: [u8; 4],
    pub machine: u16,
    pub characteristics: u16,
    pub rva_count: u32,
    /// Directory entries actually written after the fixed fields.
    pub directories_written: usize,
    pub entry_point: u32,
    pub image_base: u64,
    pub sections: Vec<(&'static str, u32)>,
}

impl ImageBuilder {
    pub fn new(layout: Layout) -> Self {
        ImageBuilder {
            layout,
            coff_offset: 128,
            dos_magic: *b"MZ",
            signature: *b"PE\0\0",
            machine: if layout == Layout::Pe32 {
                MACHINE_I386
            } else {
                MACHINE_AMD64
            },
            characteristics: 0x0022,
            rva_count: 16,
            directories_written: 16,
            entry_point: 0x1010,
            image_base: if layout == Layout::Pe32Plus {
                0x1_4000_0000
            } else {
                0x40_0000
            },
            sections: vec![
                (".text", 0x6000_0020),
                (".rdata", 0x4000_0040),
                (".data", 0xC000_0040),
            ],
        }
    }

    pub fn with_rva_count(mut self, declared: u32, written: usize) -> Self {
        self.rva_count = declared;
        self.directories_written = written;
        self
    }

    pub fn optional_size(&self) -> usize {
        match self.layout {
            Layout::Pe32 => 96 + 8 * self.directories_written,
            Layout::Pe32Plus => 112 + 8 * self.directories_written,
            Layout::Object => 0,
        }
    }

    pub fn build(&self) -> Vec<u8> {
        let mut b = vec![0u8; self.coff_offset as usize];
        b[0..2].copy_from_slice(&self.dos_magic);
        b[60..64].copy_from_slice(&self.coff_offset.to_le_bytes());
        for (i, byte) in b.iter_mut().enumerate().skip(64) {
            *byte = i as u8;
        }

        b.extend_from_slice(&self.signature);
        push16(&mut b, self.machine);
        push16(&mut b, self.sections.len() as u16);
        push32(&mut b, 0x6523_1c00);
        push32(&mut b, 0);
        push32(&mut b, 0);
        push16(&mut b, self.optional_size() as u16);
        push16(&mut b, self.characteristics);

        if self.layout != Layout::Object {
            self.push_optional(&mut b);
        }

        for (i, (name, characteristics)) in self.sections.iter().enumerate() {
            let mut raw_name = [0u8; 8];
            raw_name[..name.len()].copy_from_slice(name.as_bytes());
            b.extend_from_slice(&raw_name);
            let rva = 0x1000 * (i as u32 + 1);
            push32(&mut b, 0x180);
            push32(&mut b, rva);
            push32(&mut b, 0x200);
            push32(&mut b, 0x400 + 0x200 * i as u32);
            push32(&mut b, 0);
            push32(&mut b, 0);
            push16(&mut b, 0);
            push16(&mut b, 0);
            push32(&mut b, *characteristics);
        }

        // section payload padding
        b.resize(b.len() + 0x200, 0);
        b
    }

    fn push_optional(&self, b: &mut Vec<u8>) {
        let wide = self.layout == Layout::Pe32Plus;
        push16(b, if wide { 0x20b } else { 0x10b });
        b.push(14);
        b.push(38);
        push32(b, 0x200);
        push32(b, 0x400);
        push32(b, 0);
        push32(b, self.entry_point);
        push32(b, 0x1000);
        if wide {
            push64(b, self.image_base);
        } else {
            push32(b, 0x2000);
            push32(b, self.image_base as u32);
        }
        push32(b, 0x1000);
        push32(b, 0x200);
        for v in [6u16, 0, 0, 0, 6, 0] {
            push16(b, v);
        }
        push32(b, 0);
        push32(b, 0x4000);
        push32(b, 0x400);
        push32(b, 0);
        push16(b, 3);
        push16(b, 0x8160);
        for v in [0x10_0000u64, 0x1000, 0x10_0000, 0x1000] {
            if wide {
                push64(b, v);
            } else {
                push32(b, v as u32);
            }
        }
        push32(b, 0);
        push32(b, self.rva_count);
        for slot in 0..self.directories_written {
            if slot == 1 {
                push32(b, 0x2000);
                push32(b, 0x3c);
            } else {
                push32(b, 0);
                push32(b, 0);
            }
        }
    }
}

pub fn push16(b: &mut Vec<u8>, v: u16) {
    b.extend_from_slice(&v.to_le_bytes());
}

pub fn push32(b: &mut Vec<u8>, v: u32) {
    b.extend_from_slice(&v.to_le_bytes());
}

pub fn push64(b: &mut Vec<u8>, v: u64) {
    b.extend_from_slice(&v.to_le_bytes());
}

//! Shared fixtures for unit tests: synthetic section tables and a minimal
//! crafted PE32 image that goblin parses cleanly.

use goblin::pe::section_table::SectionTable;

use crate::translate::align_up;

/// Builds a section table entry from the four fields the address-space
/// semantics care about; everything else stays zeroed.
pub(crate) fn section(
    name: &str,
    virtual_address: u32,
    virtual_size: u32,
    pointer_to_raw_data: u32,
    size_of_raw_data: u32,
) -> SectionTable {
    let mut table = SectionTable {
        virtual_address,
        virtual_size,
        pointer_to_raw_data,
        size_of_raw_data,
        characteristics: 0x6000_0020,
        ..SectionTable::default()
    };
    table.name[..name.len()].copy_from_slice(name.as_bytes());

    table
}

/// One section of a crafted PE image: placement in both address spaces plus
/// the raw bytes stored on disk (`size_of_raw_data` is the data length).
pub(crate) struct SectionSpec {
    pub name: &'static str,
    pub virtual_address: u32,
    pub virtual_size: u32,
    pub pointer_to_raw_data: u32,
    pub data: Vec<u8>,
}

const PE_OFFSET: usize = 0x80;
const OPTIONAL_OFFSET: usize = PE_OFFSET + 4 + 20;
const SECTIONS_OFFSET: usize = OPTIONAL_OFFSET + 0xE0;

/// Assembles a minimal, parseable PE32 file around the given sections.
///
/// DOS header, PE signature, COFF header, optional header (16 zeroed data
/// directories) and section table are laid out back to back; each section's
/// raw bytes land at its declared file offset. Sections must be placed past
/// the header area (`pointer_to_raw_data >= 0x200` keeps things simple).
pub(crate) fn build_pe(sections: &[SectionSpec]) -> Vec<u8> {
    assert!(!sections.is_empty(), "need at least one section");

    let headers_end = SECTIONS_OFFSET + sections.len() * 40;
    let file_size = sections
        .iter()
        .map(|spec| spec.pointer_to_raw_data as usize + spec.data.len())
        .max()
        .unwrap()
        .max(headers_end);
    let mut file = vec![0_u8; file_size];

    // DOS header: signature and the pointer to the PE signature.
    file[0..2].copy_from_slice(b"MZ");
    put_u32(&mut file, 0x3C, PE_OFFSET as u32);

    file[PE_OFFSET..PE_OFFSET + 4].copy_from_slice(b"PE\0\0");

    // COFF header.
    let coff = PE_OFFSET + 4;
    put_u16(&mut file, coff, 0x014C); // IMAGE_FILE_MACHINE_I386
    put_u16(&mut file, coff + 2, sections.len() as u16);
    put_u16(&mut file, coff + 16, 0xE0); // size of optional header
    put_u16(&mut file, coff + 18, 0x0102); // executable, 32-bit

    // Optional header, PE32.
    let opt = OPTIONAL_OFFSET;
    put_u16(&mut file, opt, 0x010B);
    file[opt + 2] = 14; // linker version
    put_u32(&mut file, opt + 16, sections[0].virtual_address); // entry point
    put_u32(&mut file, opt + 20, sections[0].virtual_address); // base of code
    put_u32(&mut file, opt + 28, 0x0040_0000); // image base
    put_u32(&mut file, opt + 32, 0x1000); // section alignment
    put_u32(&mut file, opt + 36, 0x200); // file alignment
    put_u16(&mut file, opt + 40, 6); // major OS version
    put_u16(&mut file, opt + 48, 6); // major subsystem version

    let last = sections.last().unwrap();
    #[allow(clippy::cast_possible_truncation)]
    let size_of_image =
        u64::from(last.virtual_address) + align_up(u64::from(last.virtual_size), 0x1000);
    put_u32(&mut file, opt + 56, size_of_image as u32);
    put_u32(&mut file, opt + 60, 0x200); // size of headers
    put_u16(&mut file, opt + 68, 3); // console subsystem
    put_u32(&mut file, opt + 72, 0x10_0000); // stack reserve
    put_u32(&mut file, opt + 76, 0x1000); // stack commit
    put_u32(&mut file, opt + 80, 0x10_0000); // heap reserve
    put_u32(&mut file, opt + 84, 0x1000); // heap commit
    put_u32(&mut file, opt + 92, 16); // number of data directories (all zero)

    // Section table.
    for (index, spec) in sections.iter().enumerate() {
        let base = SECTIONS_OFFSET + index * 40;
        file[base..base + spec.name.len()].copy_from_slice(spec.name.as_bytes());
        put_u32(&mut file, base + 8, spec.virtual_size);
        put_u32(&mut file, base + 12, spec.virtual_address);
        put_u32(&mut file, base + 16, spec.data.len() as u32);
        put_u32(&mut file, base + 20, spec.pointer_to_raw_data);
        put_u32(&mut file, base + 36, 0x6000_0020);

        let raw = spec.pointer_to_raw_data as usize;
        file[raw..raw + spec.data.len()].copy_from_slice(&spec.data);
    }

    file
}

fn put_u16(buffer: &mut [u8], offset: usize, value: u16) {
    buffer[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
}

fn put_u32(buffer: &mut [u8], offset: usize, value: u32) {
    buffer[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crafted_pe_parses_with_expected_sections() {
        let file = build_pe(&[SectionSpec {
            name: ".text",
            virtual_address: 0x1000,
            virtual_size: 0x200,
            pointer_to_raw_data: 0x400,
            data: vec![0xBB; 0x200],
        }]);

        let pe = goblin::pe::PE::parse(&file).unwrap();
        assert_eq!(pe.sections.len(), 1);
        assert_eq!(pe.image_base, 0x40_0000);

        let text = &pe.sections[0];
        assert_eq!(text.virtual_address, 0x1000);
        assert_eq!(text.virtual_size, 0x200);
        assert_eq!(text.pointer_to_raw_data, 0x400);
        assert_eq!(text.size_of_raw_data, 0x200);
    }
}

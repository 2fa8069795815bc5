//! Reconstruction of the flat in-memory image from the on-disk section table.
//!
//! When the operating system maps a PE file, it does not copy the file
//! verbatim: headers land at the start of the image, each section's raw bytes
//! are placed at that section's virtual address, and every gap — between
//! sections, and between a section's raw end and its virtual end — is
//! zero-filled. [`build_image`] performs the same transformation over a
//! parsed section table and the raw file bytes, and [`load_image`] is the
//! one-shot path from a file on disk to the finished buffer.
//!
//! The produced buffer is sized
//! `last_section.virtual_address + align_up(last_section.virtual_size, 0x1000)`,
//! matching the page granularity the loader pads the final section to.
//!
//! # Examples
//!
//! ```rust,no_run
//! use pemap::layout::load_image;
//! use std::path::Path;
//!
//! let image = load_image(Path::new("program.exe"))?;
//! println!("Mapped image occupies {} bytes", image.len());
//! # Ok::<(), pemap::Error>(())
//! ```
//!
//! All copies are bounds-checked: a section table that claims more raw bytes
//! than the file holds surfaces as [`crate::Error::Truncated`] instead of an
//! out-of-range read, and section data placed outside the computed image
//! bounds surfaces as [`crate::Error::Malformed`]. Nothing is retried — this
//! is a one-shot transformation, and every failure aborts the whole load.

use std::path::Path;

use goblin::pe::section_table::SectionTable;

use crate::{file::File, translate::align_up, Error, Result};

/// Page granularity the final section is padded to when sizing the image.
pub const SECTION_ALIGNMENT: u64 = 0x1000;

/// Builds the flat in-memory image for a PE file.
///
/// `sections` is the parsed section table in file order; `data` is the
/// complete raw file. The returned buffer holds the image as it would appear
/// once mapped: headers at offset 0, each section's raw bytes at its virtual
/// address, zeroes everywhere else.
///
/// # Arguments
///
/// * `sections` - The parsed section table, in file order.
/// * `data` - The raw bytes of the PE file.
///
/// # Errors
///
/// Returns [`crate::Error::Malformed`] if the section table is empty or
/// places section data outside the computed image bounds, and
/// [`crate::Error::Truncated`] if the file ends before a declared raw extent.
pub fn build_image(sections: &[SectionTable], data: &[u8]) -> Result<Vec<u8>> {
    let Some(last) = sections.last() else {
        return Err(malformed_error!("Section table is empty, nothing to lay out"));
    };
    let first = &sections[0];

    #[allow(clippy::cast_possible_truncation)]
    let image_size = (u64::from(last.virtual_address)
        + align_up(u64::from(last.virtual_size), SECTION_ALIGNMENT)) as usize;
    let mut image = vec![0_u8; image_size];

    // Headers occupy identical positions in both address spaces.
    copy_region(&mut image, 0, data, 0, first.pointer_to_raw_data as usize)?;

    for section in sections {
        copy_region(
            &mut image,
            section.virtual_address as usize,
            data,
            section.pointer_to_raw_data as usize,
            section.size_of_raw_data as usize,
        )?;
    }

    Ok(image)
}

/// Loads a PE file from disk and builds its flat in-memory image.
///
/// Parses the file's section table and streams the raw bytes into the mapped
/// layout in one shot. The file handle is scoped to the call and released on
/// every exit path.
///
/// # Arguments
///
/// * `path` - Path to the PE file on disk.
///
/// # Errors
///
/// Returns [`crate::Error::FileError`] if the file cannot be opened,
/// [`crate::Error::GoblinErr`] if it is not a parseable PE, and the
/// [`build_image`] errors for an inconsistent or truncated section table.
///
/// # Examples
///
/// ```rust,no_run
/// use pemap::layout::load_image;
/// use std::path::Path;
///
/// let image = load_image(Path::new("program.exe"))?;
///
/// // Headers start with the DOS signature at image offset 0.
/// assert_eq!(&image[0..2], b"MZ");
/// # Ok::<(), pemap::Error>(())
/// ```
pub fn load_image(path: &Path) -> Result<Vec<u8>> {
    File::from_file(path)?.image_layout()
}

/// Copies `len` bytes from `data[data_offset..]` to `image[image_offset..]`,
/// turning out-of-range reads into `Truncated` and out-of-range writes into
/// `Malformed`.
fn copy_region(
    image: &mut [u8],
    image_offset: usize,
    data: &[u8],
    data_offset: usize,
    len: usize,
) -> Result<()> {
    let image_len = image.len();

    let Some(data_end) = data_offset.checked_add(len) else {
        return Err(Error::OutOfBounds);
    };
    let Some(source) = data.get(data_offset..data_end) else {
        return Err(Error::Truncated {
            declared: data_end,
            available: data.len(),
        });
    };

    let Some(image_end) = image_offset.checked_add(len) else {
        return Err(Error::OutOfBounds);
    };
    let Some(target) = image.get_mut(image_offset..image_end) else {
        return Err(malformed_error!(
            "Section bytes at {:#x}..{:#x} do not fit the {:#x} byte image",
            image_offset,
            image_end,
            image_len
        ));
    };

    target.copy_from_slice(source);
    Ok(())
}

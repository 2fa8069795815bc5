//! PE file abstraction and parsed-image access.
//!
//! This module binds a raw data source to the parsed view of a PE file and
//! exposes the operations the rest of the crate builds on: header and section
//! access, translation between the file and image address spaces, and
//! reconstruction of the flat in-memory layout.
//!
//! # Architecture
//!
//! - **File abstraction layer** - Unified interface for PE file access
//! - **Backend system** - Pluggable data sources (disk files, memory buffers)
//! - **Address translation** - RVA to file offset conversion and its inverse
//! - **Image layout** - Flat mapped-image reconstruction
//!
//! # Key Components
//!
//! - [`crate::File`] - Main PE file abstraction
//! - [`crate::file::Backend`] - Trait for different data sources (disk files, memory buffers)
//! - [`crate::file::physical::Physical`] - Memory-mapped file backend for disk access
//! - [`crate::file::memory::Memory`] - In-memory buffer backend
//!
//! The PE structures themselves are parsed by goblin; this module never
//! decodes headers by hand. It consumes the parsed section table and applies
//! the address-space semantics on top of it.
//!
//! # Examples
//!
//! ## Loading from File
//!
//! ```rust,no_run
//! use pemap::File;
//! use std::path::Path;
//!
//! let file = File::from_file(Path::new("program.exe"))?;
//! println!("Loaded PE file with {} bytes", file.len());
//!
//! println!("Image base: 0x{:x}", file.imagebase());
//! println!("Number of sections: {}", file.sections().len());
//! # Ok::<(), pemap::Error>(())
//! ```
//!
//! ## Address Translation
//!
//! ```rust,no_run
//! use pemap::File;
//! use std::path::Path;
//!
//! let file = File::from_file(Path::new("program.exe"))?;
//!
//! // Convert the entry point RVA to a file offset.
//! let entry_rva = file.header_optional().unwrap().standard_fields.address_of_entry_point;
//! let translation = file.rva_to_offset(entry_rva as u32);
//!
//! if let Some(offset) = translation.address() {
//!     let entry_code = file.data_slice(offset as usize, 16)?;
//!     println!("Entry point bytes: {:02x?}", entry_code);
//! }
//! # Ok::<(), pemap::Error>(())
//! ```
//!
//! # Thread Safety
//!
//! All components are thread-safe and can be shared across threads for
//! concurrent read-only analysis of the same PE file.

mod memory;
mod physical;

use std::path::Path;

use crate::{
    layout,
    translate::{self, Translation},
    Error::{Empty, GoblinErr},
    Result,
};
use goblin::pe::{
    header::Header, optional_header::OptionalHeader, section_table::SectionTable, PE,
};
use memory::Memory;
use ouroboros::self_referencing;
use physical::Physical;

/// Backend trait for file data sources.
///
/// This trait abstracts over the source of PE data, allowing for both in-memory and on-disk
/// representations. All implementations must be thread-safe.
pub trait Backend: Send + Sync {
    /// Returns a slice of the data at the given offset and length.
    ///
    /// This method provides bounds-checked access to the underlying data.
    ///
    /// # Arguments
    ///
    /// * `offset` - The starting offset within the data.
    /// * `len` - The length of the slice in bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the requested range is out of bounds.
    fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]>;

    /// Returns the entire data buffer.
    fn data(&self) -> &[u8];

    /// Returns the total length of the data buffer.
    fn len(&self) -> usize;
}

#[self_referencing]
/// Represents a loaded PE file.
///
/// This struct wraps the parsed PE and provides methods for accessing headers and sections,
/// for converting between address spaces, and for rebuilding the flat in-memory image.
/// It supports loading from both files and memory buffers.
///
/// # Examples
///
/// ## Loading from a file
///
/// ```rust,no_run
/// use pemap::File;
/// use std::path::Path;
///
/// let file = File::from_file(Path::new("program.exe"))?;
/// println!("Loaded PE with {} sections", file.sections().len());
/// # Ok::<(), pemap::Error>(())
/// ```
///
/// ## Working with addresses
///
/// ```rust,no_run
/// use pemap::File;
/// use std::path::Path;
///
/// let file = File::from_file(Path::new("program.exe"))?;
///
/// // Round-trip a section-backed address through both spaces.
/// if let Some(offset) = file.rva_to_offset(0x1050).address() {
///     assert_eq!(file.offset_to_rva(offset).address(), Some(0x1050));
/// }
/// # Ok::<(), pemap::Error>(())
/// ```
pub struct File {
    /// The underlying data source (memory or file).
    data: Box<dyn Backend>,
    /// The parsed PE structure, referencing the data.
    #[borrows(data)]
    #[not_covariant]
    pe: PE<'this>,
}

impl File {
    /// Loads a PE file from the given path.
    ///
    /// The file is memory-mapped for efficient access; the mapping (and with
    /// it the file handle) is released when the returned `File` is dropped.
    ///
    /// # Arguments
    ///
    /// * `file` - Path to the PE file on disk.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read or opened
    /// - The file is not a valid PE format
    /// - The file is empty
    pub fn from_file(file: &Path) -> Result<File> {
        let input = Physical::new(file)?;

        Self::load(input)
    }

    /// Loads a PE file from a memory buffer.
    ///
    /// Useful when working with embedded resources or downloaded files.
    ///
    /// # Arguments
    ///
    /// * `data` - The bytes of the PE file.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer is empty or the data is not a valid PE format.
    pub fn from_mem(data: Vec<u8>) -> Result<File> {
        let input = Memory::new(data);

        Self::load(input)
    }

    /// Internal loader for any backend.
    ///
    /// # Arguments
    ///
    /// * `data` - The backend providing the PE data.
    ///
    /// # Errors
    ///
    /// Returns an error if the data is empty or not a valid PE.
    fn load<T: Backend + 'static>(data: T) -> Result<File> {
        if data.len() == 0 {
            return Err(Empty);
        }

        let data = Box::new(data);

        File::try_new(data, |data| {
            let data = data.as_ref();
            match PE::parse(data.data()) {
                Ok(pe) => {
                    if pe.header.optional_header.is_none() {
                        return Err(malformed_error!("File does not have an OptionalHeader"));
                    }

                    Ok(pe)
                }
                Err(error) => Err(GoblinErr(error)),
            }
        })
    }

    /// Returns the total size of the loaded file in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data().len()
    }

    /// Returns `true` if the file has a length of zero.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the image base address of the loaded PE file.
    ///
    /// The image base is the preferred virtual address where the PE file
    /// should be loaded in memory; RVAs are relative to it.
    #[must_use]
    pub fn imagebase(&self) -> u64 {
        self.with_pe(|pe| pe.image_base)
    }

    /// Returns a reference to the PE header.
    #[must_use]
    pub fn header(&self) -> &Header {
        self.with_pe(|pe| &pe.header)
    }

    /// Returns a reference to the optional header, if present.
    ///
    /// This is always `Some` for files loaded through this crate; the
    /// optional header is validated during the initial load.
    #[must_use]
    pub fn header_optional(&self) -> &Option<OptionalHeader> {
        self.with_pe(|pe| &pe.header.optional_header)
    }

    /// Returns the section table of the PE file, in file order.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use pemap::File;
    /// use std::path::Path;
    ///
    /// let file = File::from_file(Path::new("program.exe"))?;
    /// for section in file.sections() {
    ///     let name = std::str::from_utf8(&section.name)
    ///         .unwrap_or("<invalid>")
    ///         .trim_end_matches('\0');
    ///     println!("Section: {} at RVA 0x{:x}, size: {} bytes",
    ///              name, section.virtual_address, section.virtual_size);
    /// }
    /// # Ok::<(), pemap::Error>(())
    /// ```
    #[must_use]
    pub fn sections(&self) -> &[SectionTable] {
        self.with_pe(|pe| pe.sections.as_slice())
    }

    /// Returns the raw data of the loaded file.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        self.with_data(|data| data.data())
    }

    /// Returns a slice of the file data at the given offset and length.
    ///
    /// This is a safe way to access specific portions of the PE file data
    /// with bounds checking to prevent buffer overruns.
    ///
    /// # Arguments
    ///
    /// * `offset` - The offset to start the slice from.
    /// * `len` - The length of the slice.
    ///
    /// # Errors
    ///
    /// Returns an error if the requested range is out of bounds.
    pub fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]> {
        self.with_data(|data| data.data_slice(offset, len))
    }

    /// Converts a relative virtual address (RVA) to a file offset.
    ///
    /// RVAs are addresses relative to the image base. This is the most common
    /// address format used within PE files for referencing data and code.
    /// The result is always a [`Translation`]; check it for the header-region
    /// and not-found outcomes.
    ///
    /// # Arguments
    ///
    /// * `rva` - The RVA to convert.
    #[must_use]
    pub fn rva_to_offset(&self, rva: u32) -> Translation {
        self.with_pe(|pe| translate::rva_to_offset(&pe.sections, rva))
    }

    /// Converts a file offset to a relative virtual address (RVA).
    ///
    /// The inverse of [`File::rva_to_offset`] for offsets backed by section
    /// raw data or the header region.
    ///
    /// # Arguments
    ///
    /// * `offset` - The file offset to convert.
    #[must_use]
    pub fn offset_to_rva(&self, offset: u32) -> Translation {
        self.with_pe(|pe| translate::offset_to_rva(&pe.sections, offset))
    }

    /// Converts a virtual address (VA) to a file offset.
    ///
    /// Virtual addresses are absolute addresses relative to the process,
    /// offset from the image base. Addresses below the image base, or so far
    /// above it that the RVA no longer fits the image address space, resolve
    /// to [`Translation::NotFound`].
    ///
    /// # Arguments
    ///
    /// * `va` - The virtual address to convert.
    #[must_use]
    pub fn va_to_offset(&self, va: u64) -> Translation {
        let Some(rva) = va.checked_sub(self.imagebase()) else {
            return Translation::NotFound;
        };

        match u32::try_from(rva) {
            Ok(rva) => self.rva_to_offset(rva),
            Err(_) => Translation::NotFound,
        }
    }

    /// Builds the flat in-memory image of this file.
    ///
    /// See [`crate::layout::build_image`] for the layout rules.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Malformed`] for an empty or inconsistent
    /// section table and [`crate::Error::Truncated`] if the file is shorter
    /// than a declared section extent.
    pub fn image_layout(&self) -> Result<Vec<u8>> {
        let data = self.data();
        self.with_pe(|pe| layout::build_image(&pe.sections, data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::{build_pe, SectionSpec};

    fn sample_pe() -> Vec<u8> {
        build_pe(&[
            SectionSpec {
                name: ".text",
                virtual_address: 0x1000,
                virtual_size: 0x200,
                pointer_to_raw_data: 0x400,
                data: vec![0xBB; 0x200],
            },
            SectionSpec {
                name: ".data",
                virtual_address: 0x2000,
                virtual_size: 0x400,
                pointer_to_raw_data: 0x600,
                data: vec![0xCC; 0x100],
            },
        ])
    }

    fn verify_file(file: &File) {
        assert_eq!(file.data()[0..2], [0x4D, 0x5A]);

        let slice = file.data_slice(0, 2).unwrap();
        assert_eq!(slice, [0x4D, 0x5A]);

        assert_eq!(file.imagebase(), 0x40_0000);
        assert_eq!(file.sections().len(), 2);
        assert!(file
            .sections()
            .iter()
            .any(|section| section.name.starts_with(b".text")));

        assert_eq!(file.rva_to_offset(0x1050).address(), Some(0x450));
        assert_eq!(file.rva_to_offset(0x2000).section(), Some(1));
        assert_eq!(file.offset_to_rva(0x450).address(), Some(0x1050));

        assert_eq!(file.va_to_offset(0x40_1050).address(), Some(0x450));
        assert_eq!(file.va_to_offset(0x1050), Translation::NotFound);
        assert_eq!(file.va_to_offset(u64::MAX), Translation::NotFound);
    }

    #[test]
    fn load_buffer() {
        let file = File::from_mem(sample_pe()).unwrap();

        verify_file(&file);
    }

    #[test]
    fn load_file() {
        let path = std::env::temp_dir().join("pemap_file_mod_sample.exe");
        std::fs::write(&path, sample_pe()).unwrap();

        let file = File::from_file(&path).unwrap();
        verify_file(&file);

        drop(file);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn load_empty() {
        match File::from_mem(Vec::new()) {
            Err(Empty) => {}
            _ => panic!("Empty input should not load!"),
        }
    }

    #[test]
    fn load_invalid() {
        if File::from_mem(vec![0x42; 0x400]).is_ok() {
            panic!("This should not load!")
        }
    }

    #[test]
    fn image_layout_from_parsed_file() {
        let file = File::from_mem(sample_pe()).unwrap();

        let image = file.image_layout().unwrap();
        assert_eq!(image.len(), 0x2000 + 0x1000);

        // Headers at the start, section bytes at their virtual addresses.
        assert_eq!(&image[0..2], b"MZ");
        assert!(image[0x1000..0x1200].iter().all(|&byte| byte == 0xBB));
        assert!(image[0x2000..0x2100].iter().all(|&byte| byte == 0xCC));
        assert!(image[0x2100..].iter().all(|&byte| byte == 0));
    }
}

// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
// - 'file/physical.rs' uses mmap to map a file into memory

//! # pemap
//!
//! Address-space translation and in-memory layout reconstruction for Portable
//! Executable (PE) images. Built in pure Rust, `pemap` converts between the
//! two address spaces a PE file lives in — RVAs once the image is mapped into
//! process memory, and byte offsets in the raw file on disk — and rebuilds the
//! flat mapped-image buffer from the on-disk section table.
//!
//! ## Features
//!
//! - **📦 Efficient memory access** - Memory-mapped file access with bounds-checked reads
//! - **🔁 Bidirectional translation** - RVA to file offset and file offset to RVA
//! - **🧱 Image reconstruction** - Header region, section placement, and zero-fill padding
//!   exactly as the OS loader lays them out
//! - **🔧 Cross-platform** - Works on Windows, Linux, macOS, and any Rust-supported platform
//! - **🛡️ Memory safe** - Truncated and inconsistent section tables surface as errors,
//!   never as out-of-range reads
//!
//! ## Quick Start
//!
//! Add `pemap` to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! pemap = "0.2"
//! ```
//!
//! ### Using the Prelude
//!
//! ```rust,no_run
//! use pemap::prelude::*;
//!
//! // Load a PE file and resolve an address
//! let file = File::from_file("program.exe".as_ref())?;
//! let translation = file.rva_to_offset(0x1050);
//! println!("RVA 0x1050 -> {:?}", translation);
//! # Ok::<(), pemap::Error>(())
//! ```
//!
//! ### Rebuilding the mapped image
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
//! ## Architecture
//!
//! `pemap` is organized into a few small modules:
//!
//! - [`prelude`] - Convenient re-exports of commonly used types and functions
//! - [`translate`] - Pure address translation over a parsed section table
//! - [`layout`] - Flat mapped-image reconstruction
//! - [`File`] - PE file abstraction over disk and memory data sources
//! - [`Error`] and [`Result`] - Comprehensive error handling
//!
//! PE structures are parsed by [goblin](https://docs.rs/goblin); `pemap`
//! consumes the parsed section table and encodes the address-space semantics
//! on top: header-region handling, section boundary conditions, and alignment
//! padding.
//!
//! ## Translation outcomes
//!
//! Translation never fails with an error. Every query resolves to a
//! [`Translation`] variant — mapped into a section, identity-mapped header
//! bytes, the unmapped header gap, or not found — and the legacy
//! `(address, section index)` sentinel encoding used by long-standing callers
//! is available via [`Translation::to_sentinel_pair`]:
//!
//! ```rust
//! use goblin::pe::section_table::SectionTable;
//! use pemap::translate::{rva_to_offset, ADDRESS_NOT_FOUND};
//!
//! let sections = [SectionTable {
//!     virtual_address: 0x1000,
//!     virtual_size: 0x200,
//!     pointer_to_raw_data: 0x400,
//!     size_of_raw_data: 0x200,
//!     ..SectionTable::default()
//! }];
//!
//! assert_eq!(rva_to_offset(&sections, 0x1050).to_sentinel_pair(), (0x450, 0));
//! assert_eq!(rva_to_offset(&sections, 0x1300).to_sentinel_pair(), (ADDRESS_NOT_FOUND, -1));
//! ```
//!
//! ## Error Handling
//!
//! The fallible paths — opening, parsing, and laying out an image — return
//! [`Result<T, Error>`](Result):
//!
//! ```rust,no_run
//! use pemap::{layout, Error};
//!
//! match layout::load_image(std::path::Path::new("program.exe")) {
//!     Ok(image) => println!("Image: {} bytes", image.len()),
//!     Err(Error::Truncated { declared, available }) => {
//!         println!("Section table claims {declared} bytes, file has {available}")
//!     }
//!     Err(e) => println!("Other error: {e}"),
//! }
//! ```

#[macro_use]
pub(crate) mod error;
pub(crate) mod file;

/// Shared functionality which is used in unit-tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and functions.
///
/// # Example
///
/// ```rust,no_run
/// use pemap::prelude::*;
///
/// let file = File::from_file("program.exe".as_ref())?;
/// let image = file.image_layout()?;
/// # Ok::<(), pemap::Error>(())
/// ```
pub mod prelude;

/// Flat mapped-image reconstruction from the on-disk section table.
///
/// The main entry points are [`layout::build_image`] for callers that already
/// hold the parsed section table and raw bytes, and [`layout::load_image`]
/// for the one-shot path from a file on disk.
pub mod layout;

/// Pure translation between the file and image address spaces.
///
/// Provides [`translate::rva_to_offset`], [`translate::offset_to_rva`], the
/// [`Translation`] result type with its legacy sentinel encoding, and the
/// [`translate::align_up`] helper.
pub mod translate;

/// `pemap` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
/// This is used consistently throughout the crate for all fallible operations.
pub type Result<T> = std::result::Result<T, Error>;

/// `pemap` Error type
///
/// The main error type for all operations in this crate. Provides detailed error information
/// for file access, PE parsing, and image layout.
pub use error::Error;

/// Main entry point for working with PE files.
///
/// See [`File`] for loading from disk or memory, header and section access,
/// and the address translation methods.
pub use file::File;

/// Outcome of an address translation; see [`translate`] for the functions
/// producing it.
pub use translate::Translation;

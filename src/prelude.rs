//! Convenient re-exports of the most commonly used types and traits.
//!
//! This module provides a curated selection of the most frequently used items
//! from across the pemap library, allowing for convenient glob imports.
//!
//! # Example
//!
//! ```rust,no_run
//! use pemap::prelude::*;
//!
//! let file = File::from_file("program.exe".as_ref())?;
//!
//! match file.rva_to_offset(0x1050) {
//!     Translation::Mapped { address, section } => {
//!         println!("offset 0x{address:x} in section {section}")
//!     }
//!     Translation::Header { address } => println!("header byte at 0x{address:x}"),
//!     _ => println!("no file backing"),
//! }
//! # Ok::<(), pemap::Error>(())
//! ```

pub use crate::{
    layout::{build_image, load_image, SECTION_ALIGNMENT},
    translate::{
        align_up, offset_to_rva, rva_to_offset, ADDRESS_NOT_FOUND, HEADER_UNMAPPED_SECTION,
        NO_SECTION,
    },
    Error, File, Result, Translation,
};

use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// This enum covers the failure modes of loading a PE image and reconstructing its in-memory
/// layout. Address translation itself never produces an error; absence of a mapping is encoded
/// in [`crate::translate::Translation`] and the sentinel pair it exposes.
///
/// # Error Categories
///
/// ## Image Loading Errors
/// - [`Error::Malformed`] - Corrupted or inconsistent section table
/// - [`Error::Truncated`] - Declared section extent exceeds the actual file size
/// - [`Error::OutOfBounds`] - Attempted to read beyond file boundaries
/// - [`Error::Empty`] - Empty input provided
///
/// ## I/O and External Errors
/// - [`Error::FileError`] - Filesystem I/O errors
/// - [`Error::GoblinErr`] - PE parsing errors from the goblin crate
///
/// # Examples
///
/// ```rust,no_run
/// use pemap::{layout, Error};
/// use std::path::Path;
///
/// match layout::load_image(Path::new("program.exe")) {
///     Ok(image) => {
///         println!("Mapped image occupies {} bytes", image.len());
///     }
///     Err(Error::Truncated { declared, available }) => {
///         eprintln!("File cut short: needs {} bytes, has {}", declared, available);
///     }
///     Err(Error::FileError(io_err)) => {
///         eprintln!("I/O error: {}", io_err);
///     }
///     Err(e) => {
///         eprintln!("Other error: {}", e);
///     }
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The file is damaged and could not be processed.
    ///
    /// This error indicates that the section table is inconsistent with the
    /// rest of the image, such as an empty table or section data placed
    /// outside the computed image bounds. The error includes the source
    /// location where the malformation was detected for debugging purposes.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// A section declares more raw data than the file contains.
    ///
    /// Raised while building the image layout when the byte range a section
    /// (or the header region) claims on disk extends past the end of the
    /// actual file data.
    #[error("Declared extent of {declared:#x} bytes exceeds the {available:#x} bytes present")]
    Truncated {
        /// End of the byte range the section table declares
        declared: usize,
        /// Number of bytes actually present in the file
        available: usize,
    },

    /// An out of bound access was attempted while reading the file.
    ///
    /// This error occurs when trying to read data beyond the end of the
    /// underlying buffer. It's a safety check to prevent buffer overruns.
    #[error("Out of Bound read would have occurred!")]
    OutOfBounds,

    /// Provided input was empty.
    ///
    /// This error occurs when an empty file or buffer is provided where
    /// actual PE image data was expected.
    #[error("Provided input was empty")]
    Empty,

    /// File I/O error.
    ///
    /// Wraps standard I/O errors that can occur during file operations
    /// such as reading from disk, permission issues, or filesystem errors.
    #[error("{0}")]
    FileError(#[from] std::io::Error),

    /// Generic error for miscellaneous failures.
    ///
    /// Used for errors that don't fit into other categories or for
    /// wrapping external library errors with additional context.
    #[error("{0}")]
    Error(String),

    /// Error from the goblin crate during PE parsing.
    ///
    /// The goblin crate is used for low-level PE format parsing.
    /// This error wraps any failures from that parsing layer.
    #[error("{0}")]
    GoblinErr(#[from] goblin::error::Error),
}

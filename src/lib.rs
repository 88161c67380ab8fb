//! # zipread
//!
//! A ZIP archive reader with its own DEFLATE decoder.
//!
//! The reader locates the End of Central Directory record by scanning back
//! from the end of the last disk, walks the Central Directory (which may be
//! spread over several disks), and extracts entries after checking their
//! local headers against the directory. Compressed entries are decoded by
//! the [`inflate`] module, which implements stored, fixed Huffman and
//! dynamic Huffman blocks.
//!
//! ## Features
//!
//! - Single and multi-disk (split) archives
//! - Lookup by entry number or by name
//! - Raw (still compressed) and decompressed extraction
//! - STORED and DEFLATE compression methods
//! - CRC-32 verification of extracted data
//!
//! ## Example
//!
//! ```no_run
//! use zipread::ZipArchive;
//!
//! fn main() -> zipread::Result<()> {
//!     let archive = ZipArchive::open(["archive.z01", "archive.zip"])?;
//!
//!     for entry in archive.entries() {
//!         println!("{}", entry.file_name);
//!     }
//!
//!     let n = archive.find_by_name("hello.txt")?;
//!     let data = archive.extract(n)?;
//!     println!("{}", String::from_utf8_lossy(&data));
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod error;
pub mod inflate;
pub mod io;
pub mod zip;

pub use cli::Cli;
pub use error::{Result, ZipError};
pub use inflate::{InflateError, inflate};
pub use io::{DiskPosition, DiskSet, LocalFileReader, MemoryReader, ReadAt};
pub use zip::{
    CompressionMethod, ExtractOptions, OpenStatus, PendingArchive, ZipArchive, ZipFileEntry,
};

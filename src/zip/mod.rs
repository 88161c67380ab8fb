//! ZIP archive parsing and extraction.
//!
//! This module provides functionality for reading and extracting ZIP archives,
//! including archives split over several disks (volumes).
//!
//! ## Architecture
//!
//! - [`structures`]: Data structures representing ZIP format elements (EOCD, file headers, etc.)
//! - [`locator`]: Backward scan for the End of Central Directory record
//! - [`parser`]: Central Directory walk and Local File Header checks
//! - [`archive`]: High-level API for end users
//!
//! ## ZIP Format Overview
//!
//! A ZIP file consists of:
//! 1. Local file headers and compressed data for each file
//! 2. Central Directory with metadata for all files
//! 3. End of Central Directory (EOCD) record at the end
//!
//! This implementation reads the EOCD first (from the end of the last disk),
//! then the Central Directory, so an archive can be listed without touching
//! any entry data.
//!
//! ## Supported Features
//!
//! - Standard ZIP format (PKZIP APPNOTE 6.3.x compatible)
//! - Multi-disk archives
//! - Data descriptors, with or without signature
//! - STORED (no compression) method
//! - DEFLATE compression method, decoded by [`crate::inflate`]
//!
//! ## Limitations
//!
//! - No encryption support
//! - No ZIP64 extensions
//! - No BZIP2, LZMA, or other compression methods
//! - Read only

pub mod archive;
pub mod locator;
pub mod parser;
pub mod structures;

pub use archive::{ExtractOptions, OpenStatus, PendingArchive, ZipArchive};
pub use locator::{LocatedEocdr, locate_eocdr};
pub use parser::LocalEntry;
pub use structures::*;

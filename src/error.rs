use thiserror::Error;

use crate::inflate::InflateError;

/// Errors produced while opening or reading a ZIP archive.
#[derive(Error, Debug)]
pub enum ZipError {
    /// Opening, seeking or reading one of the disks failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A record has a bad signature or a field that makes no sense.
    #[error("Malformed archive: {0}")]
    Format(String),

    /// The DEFLATE stream of an entry is corrupt.
    #[error("Invalid deflate stream: {0}")]
    Inflate(#[from] InflateError),

    /// The central directory and the local header (or data descriptor) disagree.
    #[error("Inconsistent headers: {field} is {central:#x} in the central directory but {local:#x} locally")]
    InconsistentHeaders {
        field: &'static str,
        central: u64,
        local: u64,
    },

    #[error("Unsupported compression method: {0}")]
    UnsupportedCompressionMethod(u16),

    /// Zip64 archives and encrypted entries.
    #[error("Unsupported feature: {0}")]
    Unsupported(String),

    /// No end of central directory record on the disks supplied so far.
    ///
    /// Not a failure as such: append the next disk and try again.
    #[error("End of central directory not found, additional disk required")]
    NeedAdditionalDisk,

    #[error("File not found in archive: {0}")]
    NotFound(String),

    #[error("Capacity exceeded: {required} bytes required, {available} available")]
    CapacityExceeded { required: u64, available: u64 },

    #[error("Entry index {index} out of range ({count} entries)")]
    IndexOutOfRange { index: usize, count: usize },

    #[error("CRC-32 mismatch: expected {expected:#010x}, got {actual:#010x}")]
    ChecksumMismatch { expected: u32, actual: u32 },
}

impl ZipError {
    pub(crate) fn format(msg: impl Into<String>) -> Self {
        ZipError::Format(msg.into())
    }

    /// Short stable name of the error kind, suitable for scripts and exit reports.
    pub fn code(&self) -> &'static str {
        match self {
            ZipError::Io(_) => "io-error",
            ZipError::Inflate(InflateError::CapacityExceeded { .. }) => "capacity-exceeded",
            ZipError::Format(_) | ZipError::Inflate(_) => "format-error",
            ZipError::InconsistentHeaders { .. } => "inconsistent-headers",
            ZipError::UnsupportedCompressionMethod(_) => "unsupported-compression-method",
            ZipError::Unsupported(_) => "unsupported",
            ZipError::NeedAdditionalDisk => "need-additional-disk",
            ZipError::NotFound(_) => "not-found",
            ZipError::CapacityExceeded { .. } | ZipError::IndexOutOfRange { .. } => {
                "capacity-exceeded"
            }
            ZipError::ChecksumMismatch { .. } => "checksum-mismatch",
        }
    }
}

pub type Result<T, E = ZipError> = std::result::Result<T, E>;

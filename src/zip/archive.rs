use std::path::Path;

use log::debug;

use crate::error::{Result, ZipError};
use crate::inflate::{self, InflateError};
use crate::io::{DiskSet, LocalFileReader, MemoryReader, ReadAt};

use super::locator::locate_eocdr;
use super::parser::{
    LocalEntry, read_central_directory, read_local_entry, skip_spanning, validate_eocdr,
};
use super::structures::{CompressionMethod, ZipFileEntry};

/// Limits applied when extracting entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Largest entry (compressed or not) that will be read into memory.
    pub max_entry_size: u64,
    /// Check the CRC-32 of extracted data against the central directory.
    pub verify_crc: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            max_entry_size: u32::MAX as u64,
            verify_crc: true,
        }
    }
}

/// An archive whose central directory has not been found yet.
///
/// Disks are added in volume order. Each addition scans the newest disk for
/// the end of central directory; once it is found the archive is complete
/// and no more disks can be added.
pub struct PendingArchive<R: ReadAt> {
    disks: DiskSet<R>,
}

/// Outcome of adding a disk to a [`PendingArchive`].
pub enum OpenStatus<R: ReadAt> {
    Complete(ZipArchive<R>),
    NeedAdditionalDisk(PendingArchive<R>),
}

impl<R: ReadAt> Default for PendingArchive<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: ReadAt> PendingArchive<R> {
    pub fn new() -> Self {
        Self {
            disks: DiskSet::new(),
        }
    }

    pub fn disk_count(&self) -> usize {
        self.disks.len()
    }

    pub fn add_disk(mut self, reader: R) -> Result<OpenStatus<R>> {
        let disk = self.disks.push(reader);
        debug!("added disk {disk} ({} bytes)", self.disks.disk_size(disk)?);

        let Some(eocdr) = locate_eocdr(&self.disks)? else {
            return Ok(OpenStatus::NeedAdditionalDisk(self));
        };
        validate_eocdr(&self.disks, &eocdr)?;
        let entries = read_central_directory(&self.disks, &eocdr)?;

        Ok(OpenStatus::Complete(ZipArchive {
            disks: self.disks,
            entries,
            comment: eocdr.comment,
            options: ExtractOptions::default(),
        }))
    }
}

/// A ZIP archive with a fully parsed central directory.
///
/// Entries are addressed by their position in the central directory.
/// All reads are positioned, so extraction only needs `&self`.
pub struct ZipArchive<R: ReadAt> {
    disks: DiskSet<R>,
    entries: Vec<ZipFileEntry>,
    comment: Vec<u8>,
    options: ExtractOptions,
}

impl ZipArchive<LocalFileReader> {
    /// Open an archive from its disk files, given in volume order.
    pub fn open<P: AsRef<Path>>(paths: impl IntoIterator<Item = P>) -> Result<Self> {
        let mut pending = PendingArchive::new();
        let mut paths = paths.into_iter();
        for path in paths.by_ref() {
            let reader = LocalFileReader::new(path.as_ref())?;
            match pending.add_disk(reader)? {
                OpenStatus::Complete(archive) => {
                    return archive.reject_leftover(paths.next().is_some());
                }
                OpenStatus::NeedAdditionalDisk(next) => pending = next,
            }
        }
        Err(ZipError::NeedAdditionalDisk)
    }
}

impl ZipArchive<MemoryReader> {
    /// Open a single-disk archive held in memory.
    pub fn from_bytes(data: impl Into<Vec<u8>>) -> Result<Self> {
        Self::from_readers([MemoryReader::new(data)])
    }
}

impl<R: ReadAt> ZipArchive<R> {
    /// Open an archive from readers for its disks, given in volume order.
    pub fn from_readers(readers: impl IntoIterator<Item = R>) -> Result<Self> {
        let mut pending = PendingArchive::new();
        let mut readers = readers.into_iter();
        for reader in readers.by_ref() {
            match pending.add_disk(reader)? {
                OpenStatus::Complete(archive) => {
                    return archive.reject_leftover(readers.next().is_some());
                }
                OpenStatus::NeedAdditionalDisk(next) => pending = next,
            }
        }
        Err(ZipError::NeedAdditionalDisk)
    }

    fn reject_leftover(self, leftover: bool) -> Result<Self> {
        if leftover {
            return Err(ZipError::format(format!(
                "disks supplied after the end of central directory on disk {}",
                self.disks.len() - 1
            )));
        }
        Ok(self)
    }

    pub fn options(&self) -> ExtractOptions {
        self.options
    }

    pub fn set_options(&mut self, options: ExtractOptions) {
        self.options = options;
    }

    pub fn with_options(mut self, options: ExtractOptions) -> Self {
        self.options = options;
        self
    }

    pub fn disk_count(&self) -> usize {
        self.disks.len()
    }

    /// Archive comment, as stored.
    pub fn comment(&self) -> &[u8] {
        &self.comment
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[ZipFileEntry] {
        &self.entries
    }

    pub fn entry(&self, n: usize) -> Result<&ZipFileEntry> {
        self.entries.get(n).ok_or(ZipError::IndexOutOfRange {
            index: n,
            count: self.entries.len(),
        })
    }

    pub fn filename(&self, n: usize) -> Result<&str> {
        Ok(&self.entry(n)?.file_name)
    }

    /// Copy the stored name of entry `n` into `dest`, without a terminator.
    /// Returns the number of bytes written.
    pub fn copy_filename(&self, n: usize, dest: &mut [u8]) -> Result<usize> {
        let name = &self.entry(n)?.file_name_raw;
        let available = dest.len() as u64;
        let target = dest
            .get_mut(..name.len())
            .ok_or(ZipError::CapacityExceeded {
                required: name.len() as u64,
                available,
            })?;
        target.copy_from_slice(name);
        Ok(name.len())
    }

    /// Index of the first entry whose stored name is exactly `name`.
    ///
    /// Names are compared as raw bytes, so entries whose names are not
    /// UTF-8 can be found too.
    pub fn find_by_name(&self, name: impl AsRef<[u8]>) -> Result<usize> {
        let name = name.as_ref();
        self.entries
            .iter()
            .position(|e| e.file_name_raw == name)
            .ok_or_else(|| ZipError::NotFound(String::from_utf8_lossy(name).into_owned()))
    }

    pub fn uncompressed_length(&self, n: usize) -> Result<u64> {
        Ok(self.entry(n)?.uncompressed_size)
    }

    /// Read and cross-check the local header of entry `n`.
    pub fn local_entry(&self, n: usize) -> Result<LocalEntry> {
        read_local_entry(&self.disks, self.entry(n)?)
    }

    /// The stored bytes of entry `n`, still compressed.
    pub fn extract_raw(&self, n: usize) -> Result<Vec<u8>> {
        let entry = self.entry(n)?;
        self.check_limit(entry.compressed_size)?;
        let local = read_local_entry(&self.disks, entry)?;
        // bound the allocation by what the disks actually hold
        skip_spanning(&self.disks, local.data_start, entry.compressed_size)?;

        let mut buf = vec![0u8; entry.compressed_size as usize];
        self.disks.read_spanning(local.data_start, &mut buf)?;
        Ok(buf)
    }

    /// The decompressed contents of entry `n`.
    pub fn extract(&self, n: usize) -> Result<Vec<u8>> {
        let entry = self.entry(n)?;
        if entry.is_encrypted() {
            return Err(ZipError::Unsupported(format!(
                "encrypted entry {}",
                entry.file_name
            )));
        }
        if let CompressionMethod::Unknown(method) = entry.compression_method {
            return Err(ZipError::UnsupportedCompressionMethod(method));
        }
        self.check_limit(entry.uncompressed_size)?;

        let raw = self.extract_raw(n)?;
        let expected = entry.uncompressed_size as usize;
        let data = match entry.compression_method {
            CompressionMethod::Stored => raw,
            CompressionMethod::Deflate => match inflate::inflate(&raw, expected) {
                Ok(data) => data,
                Err(InflateError::CapacityExceeded { capacity }) => {
                    return Err(ZipError::CapacityExceeded {
                        required: capacity as u64 + 1,
                        available: capacity as u64,
                    });
                }
                Err(e) => return Err(e.into()),
            },
            CompressionMethod::Unknown(method) => {
                return Err(ZipError::UnsupportedCompressionMethod(method));
            }
        };
        if data.len() != expected {
            return Err(ZipError::format(format!(
                "{} decompressed to {} bytes, expected {}",
                entry.file_name,
                data.len(),
                expected
            )));
        }

        if self.options.verify_crc {
            let actual = crc32fast::hash(&data);
            if actual != entry.crc32 {
                return Err(ZipError::ChecksumMismatch {
                    expected: entry.crc32,
                    actual,
                });
            }
        }

        debug!(
            "extracted {} ({} -> {} bytes)",
            entry.file_name, entry.compressed_size, expected
        );
        Ok(data)
    }

    fn check_limit(&self, size: u64) -> Result<()> {
        if size > self.options.max_entry_size {
            return Err(ZipError::CapacityExceeded {
                required: size,
                available: self.options.max_entry_size,
            });
        }
        Ok(())
    }
}

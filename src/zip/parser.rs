//! Low-level ZIP archive parser.
//!
//! This module handles the binary parsing of ZIP file structures,
//! reading from a [`DiskSet`] that may span several volumes.
//!
//! ## Parsing Strategy
//!
//! ZIP files are designed to be read from the end:
//! 1. Find the End of Central Directory (EOCD) on the last disk
//! 2. Walk the Central Directory from its start disk and offset, moving on
//!    to the next disk whenever one is used up
//! 3. For extraction, read each file's Local File Header (and data
//!    descriptor, if any) and check it against the Central Directory

use log::{debug, warn};

use crate::error::{Result, ZipError};
use crate::io::{DiskPosition, DiskSet, ReadAt};

use super::locator::LocatedEocdr;
use super::structures::*;

/// Sizes and checksum of an entry as recorded next to its data, along
/// with where that data starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalEntry {
    pub data_start: DiskPosition,
    pub crc32: u32,
    pub compressed_size: u64,
    pub uncompressed_size: u64,
}

/// Check the EOCDR against the disks it was found with.
pub fn validate_eocdr<R: ReadAt>(disks: &DiskSet<R>, eocdr: &LocatedEocdr) -> Result<()> {
    let record = &eocdr.record;
    if record.is_zip64() {
        return Err(ZipError::Unsupported("Zip64 archives".into()));
    }
    if record.disk_number as usize != eocdr.position.disk {
        return Err(ZipError::format(format!(
            "end of central directory claims to be on disk {} but was found on disk {}",
            record.disk_number, eocdr.position.disk
        )));
    }
    if record.disk_with_cd > record.disk_number {
        return Err(ZipError::format(format!(
            "central directory starts on disk {}, after the last disk {}",
            record.disk_with_cd, record.disk_number
        )));
    }
    if disks.len() == 1 && record.disk_entries != record.total_entries {
        warn!(
            "single-disk archive lists {} entries on this disk but {} in total",
            record.disk_entries, record.total_entries
        );
    }
    Ok(())
}

/// Read every Central Directory File Header, in directory order.
pub fn read_central_directory<R: ReadAt>(
    disks: &DiskSet<R>,
    eocdr: &LocatedEocdr,
) -> Result<Vec<ZipFileEntry>> {
    let record = &eocdr.record;
    let total_entries = record.total_entries as usize;
    let mut pos = DiskPosition::new(record.disk_with_cd as usize, record.cd_offset as u64);
    if pos.offset > disks.disk_size(pos.disk)? {
        return Err(ZipError::format(format!(
            "central directory offset {pos} is out of bounds"
        )));
    }

    let mut entries = Vec::with_capacity(total_entries);
    let mut fixed = [0u8; CDFH_MIN_SIZE];
    for index in 0..total_entries {
        // records never straddle disks, but may end exactly at a boundary
        pos = disks.normalize(pos)?;
        disks.read_exact_at(pos, &mut fixed).map_err(|e| match e {
            ZipError::Format(msg) => {
                ZipError::format(format!("central directory entry {index}: {msg}"))
            }
            other => other,
        })?;
        if &fixed[0..4] != CDFH_SIGNATURE {
            return Err(ZipError::format(format!(
                "bad central directory signature for entry {index} at {pos}"
            )));
        }
        let header = CentralFileHeader::from_bytes(&fixed)?;

        let mut variable = vec![0u8; header.variable_size()];
        disks.read_exact_at(pos.forward(CDFH_MIN_SIZE as u64), &mut variable)?;
        entries.push(ZipFileEntry::from_central(&header, &variable)?);

        pos = pos.forward((CDFH_MIN_SIZE + variable.len()) as u64);
    }

    let start_disk = record.disk_with_cd as usize;
    if pos.disk == start_disk && pos.offset - record.cd_offset as u64 != record.cd_size as u64 {
        warn!(
            "central directory is {} bytes, end of central directory says {}",
            pos.offset - record.cd_offset as u64,
            record.cd_size
        );
    }
    debug!(
        "central directory: {} entries, ends at {pos}",
        entries.len()
    );
    Ok(entries)
}

/// Read the Local File Header of `entry`, follow it to the data descriptor
/// if the entry has one, and verify both against the Central Directory.
pub fn read_local_entry<R: ReadAt>(disks: &DiskSet<R>, entry: &ZipFileEntry) -> Result<LocalEntry> {
    let lfh_pos = DiskPosition::new(entry.disk_number as usize, entry.lfh_offset);
    let mut lfh_buf = [0u8; LFH_SIZE];
    disks.read_exact_at(lfh_pos, &mut lfh_buf)?;

    // Verify LFH signature (PK\x03\x04)
    if &lfh_buf[0..4] != LFH_SIGNATURE {
        return Err(ZipError::format(format!(
            "bad local file header signature for {} at {lfh_pos}",
            entry.file_name
        )));
    }
    let lfh = LocalFileHeader::from_bytes(&lfh_buf)?;

    // Data starts after: LFH (30 bytes) + filename + extra field
    let data_start = disks.normalize(lfh_pos.forward(lfh.total_size()))?;

    let local = if entry.has_data_descriptor() {
        let descriptor = read_data_descriptor(disks, entry, data_start)?;
        LocalEntry {
            data_start,
            crc32: descriptor.crc32,
            compressed_size: descriptor.compressed_size as u64,
            uncompressed_size: descriptor.uncompressed_size as u64,
        }
    } else {
        LocalEntry {
            data_start,
            crc32: lfh.crc32,
            compressed_size: lfh.compressed_size as u64,
            uncompressed_size: lfh.uncompressed_size as u64,
        }
    };

    let checks = [
        ("crc32", entry.crc32 as u64, local.crc32 as u64),
        ("compressed size", entry.compressed_size, local.compressed_size),
        ("uncompressed size", entry.uncompressed_size, local.uncompressed_size),
    ];
    for (field, central, local) in checks {
        if central != local {
            return Err(ZipError::InconsistentHeaders {
                field,
                central,
                local,
            });
        }
    }

    Ok(local)
}

/// The descriptor sits right after the compressed data, whose size is only
/// known from the Central Directory at this point.
fn read_data_descriptor<R: ReadAt>(
    disks: &DiskSet<R>,
    entry: &ZipFileEntry,
    data_start: DiskPosition,
) -> Result<DataDescriptor> {
    let descriptor_pos = skip_spanning(disks, data_start, entry.compressed_size)?;

    let mut buf = [0u8; DataDescriptor::MAX_SIZE];
    let after_first = disks.read_spanning(descriptor_pos, &mut buf[..12])?;

    // A bare descriptor whose CRC happens to equal the signature is told
    // apart by the CRC the Central Directory expects.
    let signed = &buf[0..4] == DataDescriptor::SIGNATURE
        && entry.crc32.to_le_bytes() != DataDescriptor::SIGNATURE;
    if signed {
        disks.read_spanning(after_first, &mut buf[12..])?;
        DataDescriptor::from_bytes(&buf)
    } else {
        DataDescriptor::from_bytes(&buf[..12])
    }
}

/// Advance `pos` by `len` bytes of entry data, which may continue on
/// following disks.
pub fn skip_spanning<R: ReadAt>(
    disks: &DiskSet<R>,
    mut pos: DiskPosition,
    mut len: u64,
) -> Result<DiskPosition> {
    loop {
        pos = disks.normalize(pos)?;
        let available = disks.disk_size(pos.disk)? - pos.offset;
        if len <= available {
            return Ok(pos.forward(len));
        }
        if pos.disk + 1 >= disks.len() {
            return Err(ZipError::format("entry data runs past the last disk"));
        }
        len -= available;
        pos = DiskPosition::new(pos.disk + 1, 0);
    }
}

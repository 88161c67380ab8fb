//! Ordered collection of the disks (volumes) making up one archive.
//!
//! Split archives address data as a pair of disk number and offset within
//! that disk. [`DiskSet`] keeps one reader per disk together with its cached
//! length and turns those pairs into bounds-checked reads.

use std::fmt;
use std::io;

use super::ReadAt;
use crate::error::{Result, ZipError};

/// A location inside a multi-disk archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct DiskPosition {
    pub disk: usize,
    pub offset: u64,
}

impl DiskPosition {
    pub fn new(disk: usize, offset: u64) -> Self {
        Self { disk, offset }
    }

    /// The same disk, `len` bytes further on.
    pub fn forward(self, len: u64) -> Self {
        Self {
            disk: self.disk,
            offset: self.offset + len,
        }
    }
}

impl fmt::Display for DiskPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "disk {} offset {:#x}", self.disk, self.offset)
    }
}

struct Disk<R> {
    reader: R,
    size: u64,
}

pub struct DiskSet<R: ReadAt> {
    disks: Vec<Disk<R>>,
}

impl<R: ReadAt> Default for DiskSet<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: ReadAt> DiskSet<R> {
    pub fn new() -> Self {
        Self { disks: Vec::new() }
    }

    /// Append the next disk. Returns its disk number.
    pub fn push(&mut self, reader: R) -> usize {
        let size = reader.size();
        self.disks.push(Disk { reader, size });
        self.disks.len() - 1
    }

    pub fn len(&self) -> usize {
        self.disks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.disks.is_empty()
    }

    pub fn disk_size(&self, disk: usize) -> Result<u64> {
        self.disks
            .get(disk)
            .map(|d| d.size)
            .ok_or_else(|| ZipError::format(format!("reference to missing disk {disk}")))
    }

    /// Fill `buf` from a single disk. Reading past the end of that disk is a
    /// format error, never a silent short read.
    pub fn read_exact_at(&self, pos: DiskPosition, buf: &mut [u8]) -> Result<()> {
        let disk = self
            .disks
            .get(pos.disk)
            .ok_or_else(|| ZipError::format(format!("reference to missing disk {}", pos.disk)))?;

        let end = pos.offset.checked_add(buf.len() as u64);
        if end.is_none_or(|end| end > disk.size) {
            return Err(ZipError::format(format!(
                "read of {} bytes at {pos} runs past the end of the disk ({} bytes)",
                buf.len(),
                disk.size
            )));
        }

        let mut filled = 0;
        while filled < buf.len() {
            let n = disk
                .reader
                .read_at(pos.offset + filled as u64, &mut buf[filled..])?;
            if n == 0 {
                return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into());
            }
            filled += n;
        }
        Ok(())
    }

    /// Move a position sitting exactly at the end of a disk to the start of
    /// the next one. Positions inside a disk are returned unchanged.
    pub fn normalize(&self, mut pos: DiskPosition) -> Result<DiskPosition> {
        while pos.offset >= self.disk_size(pos.disk)? {
            if pos.offset > self.disk_size(pos.disk)? {
                return Err(ZipError::format(format!("{pos} is beyond the end of the disk")));
            }
            if pos.disk + 1 >= self.disks.len() {
                break;
            }
            pos = DiskPosition::new(pos.disk + 1, 0);
        }
        Ok(pos)
    }

    /// Fill `buf` starting at `pos`, continuing onto the following disks
    /// whenever one runs out. Returns the position just after the data.
    pub fn read_spanning(&self, mut pos: DiskPosition, buf: &mut [u8]) -> Result<DiskPosition> {
        let mut filled = 0;
        while filled < buf.len() {
            pos = self.normalize(pos)?;
            let available = self.disk_size(pos.disk)? - pos.offset;
            if available == 0 {
                return Err(ZipError::format(format!(
                    "data runs past the last disk ({} bytes missing)",
                    buf.len() - filled
                )));
            }
            let chunk = available.min((buf.len() - filled) as u64) as usize;
            self.read_exact_at(pos, &mut buf[filled..filled + chunk])?;
            filled += chunk;
            pos = pos.forward(chunk as u64);
        }
        Ok(pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::MemoryReader;

    fn two_disks() -> DiskSet<MemoryReader> {
        let mut set = DiskSet::new();
        set.push(MemoryReader::new(b"abcd".to_vec()));
        set.push(MemoryReader::new(b"efgh".to_vec()));
        set
    }

    #[test]
    fn test_read_exact_rejects_overrun() {
        let set = two_disks();
        let mut buf = [0u8; 3];
        set.read_exact_at(DiskPosition::new(0, 1), &mut buf).unwrap();
        assert_eq!(&buf, b"bcd");

        let err = set.read_exact_at(DiskPosition::new(0, 2), &mut buf).unwrap_err();
        assert!(matches!(err, ZipError::Format(_)));

        let err = set.read_exact_at(DiskPosition::new(5, 0), &mut buf).unwrap_err();
        assert!(matches!(err, ZipError::Format(_)));
    }

    #[test]
    fn test_normalize_advances_at_boundary() {
        let set = two_disks();
        assert_eq!(
            set.normalize(DiskPosition::new(0, 4)).unwrap(),
            DiskPosition::new(1, 0)
        );
        assert_eq!(
            set.normalize(DiskPosition::new(0, 3)).unwrap(),
            DiskPosition::new(0, 3)
        );
        // the last disk has nowhere to advance to
        assert_eq!(
            set.normalize(DiskPosition::new(1, 4)).unwrap(),
            DiskPosition::new(1, 4)
        );
    }

    #[test]
    fn test_read_spanning_crosses_disks() {
        let set = two_disks();
        let mut buf = [0u8; 5];
        let end = set.read_spanning(DiskPosition::new(0, 2), &mut buf).unwrap();
        assert_eq!(&buf, b"cdefg");
        assert_eq!(end, DiskPosition::new(1, 3));

        let mut buf = [0u8; 8];
        assert!(set.read_spanning(DiskPosition::new(0, 2), &mut buf).is_err());
    }
}

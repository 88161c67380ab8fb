//! Finding the End of Central Directory Record.
//!
//! The EOCDR is the last record of an archive, followed only by the archive
//! comment. Since the comment may contain anything, including the EOCDR
//! signature itself, every candidate found while scanning backwards is
//! checked against the file size: the comment length it declares must reach
//! exactly to the end of the disk.

use log::debug;

use crate::error::Result;
use crate::io::{DiskPosition, DiskSet, ReadAt};

use super::structures::EndOfCentralDirectory;

/// Maximum ZIP comment size allowed by the format (65535 bytes).
///
/// This limits the search area when looking for EOCD with a comment.
const MAX_COMMENT_SIZE: u64 = 65535;

/// A validated EOCDR and where it was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedEocdr {
    pub record: EndOfCentralDirectory,
    pub position: DiskPosition,
    pub comment: Vec<u8>,
}

/// Scan the most recently added disk for the EOCDR.
///
/// Returns `Ok(None)` when the disk holds no valid record, which for a split
/// archive means later disks are still missing.
pub fn locate_eocdr<R: ReadAt>(disks: &DiskSet<R>) -> Result<Option<LocatedEocdr>> {
    let Some(disk) = disks.len().checked_sub(1) else {
        return Ok(None);
    };
    let size = disks.disk_size(disk)?;
    let record_size = EndOfCentralDirectory::SIZE as u64;
    if size < record_size {
        return Ok(None);
    }

    // Anything further back than this could not reach the end with its comment
    let search_size = (MAX_COMMENT_SIZE + record_size).min(size);
    let search_start = size - search_size;
    let mut buf = vec![0u8; search_size as usize];
    disks.read_exact_at(DiskPosition::new(disk, search_start), &mut buf)?;

    // Byte by byte, starting at the only spot a comment-less record can sit
    for i in (0..=buf.len() - EndOfCentralDirectory::SIZE).rev() {
        if &buf[i..i + 4] != EndOfCentralDirectory::SIGNATURE {
            continue;
        }
        let len_at = i + EndOfCentralDirectory::COMMENT_LEN_OFFSET;
        let comment_len = u16::from_le_bytes([buf[len_at], buf[len_at + 1]]) as usize;
        let comment_start = i + EndOfCentralDirectory::SIZE;

        if comment_start + comment_len != buf.len() {
            debug!(
                "ignoring EOCDR signature at {:#x}: comment length {} does not reach end of disk",
                search_start + i as u64,
                comment_len
            );
            continue;
        }

        let record = EndOfCentralDirectory::from_bytes(&buf[i..comment_start])?;
        let position = DiskPosition::new(disk, search_start + i as u64);
        debug!("found EOCDR at {position} ({} entries)", record.total_entries);
        return Ok(Some(LocatedEocdr {
            record,
            position,
            comment: buf[comment_start..].to_vec(),
        }));
    }

    debug!("no EOCDR on disk {disk}");
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::MemoryReader;

    fn eocdr(comment: &[u8]) -> Vec<u8> {
        let mut data = EndOfCentralDirectory::SIGNATURE.to_vec();
        data.extend_from_slice(&[0u8; 16]);
        data.extend_from_slice(&(comment.len() as u16).to_le_bytes());
        data.extend_from_slice(comment);
        data
    }

    fn single(data: Vec<u8>) -> DiskSet<MemoryReader> {
        let mut set = DiskSet::new();
        set.push(MemoryReader::new(data));
        set
    }

    #[test]
    fn test_without_comment() {
        let mut data = vec![0xAAu8; 40];
        data.extend(eocdr(b""));
        let found = locate_eocdr(&single(data)).unwrap().unwrap();
        assert_eq!(found.position, DiskPosition::new(0, 40));
        assert!(found.comment.is_empty());
    }

    #[test]
    fn test_signature_inside_comment_is_ignored() {
        // the comment holds a complete fake record with zero comment length
        let fake = eocdr(b"");
        let mut comment = b"note: ".to_vec();
        comment.extend_from_slice(&fake[..20]);
        comment.extend_from_slice(&[0x05, 0x00]);
        let mut data = vec![0u8; 10];
        data.extend(eocdr(&comment));

        let found = locate_eocdr(&single(data)).unwrap().unwrap();
        assert_eq!(found.position, DiskPosition::new(0, 10));
        assert_eq!(found.comment, comment);
    }

    #[test]
    fn test_not_found() {
        assert_eq!(locate_eocdr(&single(vec![0u8; 100])).unwrap(), None);
        assert_eq!(locate_eocdr(&single(vec![0u8; 5])).unwrap(), None);
        assert_eq!(locate_eocdr(&DiskSet::<MemoryReader>::new()).unwrap(), None);
    }

    #[test]
    fn test_scans_last_disk_only() {
        let mut set = DiskSet::new();
        set.push(MemoryReader::new(eocdr(b"")));
        set.push(MemoryReader::new(vec![0u8; 64]));
        assert_eq!(locate_eocdr(&set).unwrap(), None);
    }
}

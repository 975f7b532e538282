//! `LZMA` container: the range-coded backend's on-disk format.
//!
//! Header (12 bytes): magic `"LZMA"`, `u32` version = 1, `u32` entry count —
//! all little-endian. Entry layout is identical to the `LZHA` container.

use crate::entry::FileEntry;
use crate::error::{Error,Result};

const MAGIC: &[u8;4] = b"LZMA";
const VERSION: u32 = 1;
const HEADER_LEN: usize = 12;

/// Serialize `entries` into a complete `LZMA` archive buffer.
pub fn write_archive(entries: &[FileEntry]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&VERSION.to_le_bytes());
    out.extend_from_slice(&(entries.len() as u32).to_le_bytes());
    for entry in entries {
        entry.write(&mut out);
    }
    out
}

/// Parse a complete `LZMA` archive buffer into its entries.
pub fn read_archive(data: &[u8]) -> Result<Vec<FileEntry>> {
    if data.len() < HEADER_LEN {
        return Err(Error::TruncatedArchive);
    }
    if &data[0..4] != MAGIC {
        return Err(Error::BadMagic);
    }
    let version = u32::from_le_bytes(data[4..8].try_into().unwrap());
    if version != VERSION {
        return Err(Error::UnsupportedVersion(version));
    }
    let count = u32::from_le_bytes(data[8..12].try_into().unwrap()) as usize;
    let mut pos = HEADER_LEN;
    let mut entries = Vec::with_capacity(count);
    for _ in 0..count {
        let (entry,consumed) = FileEntry::read(&data[pos..])?;
        pos += consumed;
        entries.push(entry);
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_entries() -> Vec<FileEntry> {
        vec![FileEntry::new("report.bin".to_string(),4000,0xabcdef01,vec![9;16])]
    }

    #[test]
    fn archive_round_trips_field_for_field() {
        let entries = sample_entries();
        let archive = write_archive(&entries);
        let restored = read_archive(&archive).unwrap();
        assert_eq!(restored,entries);
    }

    #[test]
    fn header_has_expected_shape() {
        let archive = write_archive(&sample_entries());
        assert_eq!(&archive[0..4],b"LZMA");
        let version = u32::from_le_bytes(archive[4..8].try_into().unwrap());
        assert_eq!(version,1);
        let count = u32::from_le_bytes(archive[8..12].try_into().unwrap());
        assert_eq!(count,1);
    }

    #[test]
    fn empty_archive_round_trips() {
        let archive = write_archive(&[]);
        let restored = read_archive(&archive).unwrap();
        assert!(restored.is_empty());
    }

    #[test]
    fn rejects_bad_magic() {
        let mut archive = write_archive(&sample_entries());
        archive[0] = b'X';
        assert!(matches!(read_archive(&archive),Err(Error::BadMagic)));
    }

    #[test]
    fn rejects_unsupported_version() {
        let mut archive = write_archive(&sample_entries());
        archive[4] = 9;
        assert!(matches!(read_archive(&archive),Err(Error::UnsupportedVersion(9))));
    }
}

//! `LZHA` container: the LZ77+Huffman backend's on-disk format.
//!
//! Header (16 bytes): magic `"LZHA"`, version `u8 = 1`, reserved `u8 = 0`,
//! reserved `[u8; 10] = 0`. Then `u32` entry count, then entries back to
//! back with no padding or central directory.

use crate::entry::FileEntry;
use crate::error::{Error,Result};

const MAGIC: &[u8;4] = b"LZHA";
const VERSION: u8 = 1;
const HEADER_LEN: usize = 16;

/// Serialize `entries` into a complete `LZHA` archive buffer.
pub fn write_archive(entries: &[FileEntry]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(MAGIC);
    out.push(VERSION);
    out.push(0); // reserved
    out.extend_from_slice(&[0u8;10]); // reserved
    out.extend_from_slice(&(entries.len() as u32).to_le_bytes());
    for entry in entries {
        entry.write(&mut out);
    }
    out
}

/// Parse a complete `LZHA` archive buffer into its entries.
///
/// The reserved header bytes are skipped without validation, per the
/// container's forward-compatibility stance.
pub fn read_archive(data: &[u8]) -> Result<Vec<FileEntry>> {
    if data.len() < HEADER_LEN {
        return Err(Error::TruncatedArchive);
    }
    if &data[0..4] != MAGIC {
        return Err(Error::BadMagic);
    }
    let version = data[4];
    if version as u32 != VERSION as u32 {
        return Err(Error::UnsupportedVersion(version as u32));
    }
    if data.len() < HEADER_LEN + 4 {
        return Err(Error::TruncatedArchive);
    }
    let count = u32::from_le_bytes(data[HEADER_LEN..HEADER_LEN+4].try_into().unwrap()) as usize;
    let mut pos = HEADER_LEN + 4;
    let mut entries = Vec::with_capacity(count);
    for _ in 0..count {
        let (entry,consumed) = FileEntry::read(&data[pos..])?;
        pos += consumed;
        entries.push(entry);
    }
    Ok(entries)
}

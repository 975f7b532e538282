//! File entry record shared by both container formats.
//!
//! The two containers differ only in their header; the entry layout is
//! byte-identical between them, so both read/write through this module.

use crate::error::{Error,Result};

/// One file's worth of metadata and compressed payload inside an archive.
#[derive(Debug,Clone,PartialEq,Eq)]
pub struct FileEntry {
    pub filename: String,
    pub original_size: u64,
    pub compressed_size: u64,
    pub crc32: u32,
    pub compressed_data: Vec<u8>,
}

impl FileEntry {
    pub fn new(filename: String,original_size: u64,crc32: u32,compressed_data: Vec<u8>) -> Self {
        Self{
            filename,
            original_size,
            compressed_size: compressed_data.len() as u64,
            crc32,
            compressed_data,
        }
    }

    /// `u16` filename-length, filename bytes, `u64` original-size,
    /// `u64` compressed-size, `u32` CRC32, then the payload bytes.
    pub fn write(&self,out: &mut Vec<u8>) {
        let name_bytes = self.filename.as_bytes();
        out.extend_from_slice(&(name_bytes.len() as u16).to_le_bytes());
        out.extend_from_slice(name_bytes);
        out.extend_from_slice(&self.original_size.to_le_bytes());
        out.extend_from_slice(&self.compressed_size.to_le_bytes());
        out.extend_from_slice(&self.crc32.to_le_bytes());
        out.extend_from_slice(&self.compressed_data);
    }

    /// Returns the parsed entry and the number of bytes consumed from `data`.
    pub fn read(data: &[u8]) -> Result<(Self,usize)> {
        let mut pos = 0usize;
        if pos + 2 > data.len() {
            return Err(Error::TruncatedArchive);
        }
        let name_len = u16::from_le_bytes([data[pos],data[pos+1]]) as usize;
        pos += 2;
        if pos + name_len > data.len() {
            return Err(Error::TruncatedArchive);
        }
        let filename = String::from_utf8_lossy(&data[pos..pos+name_len]).into_owned();
        pos += name_len;
        if pos + 8 + 8 + 4 > data.len() {
            return Err(Error::TruncatedArchive);
        }
        let original_size = u64::from_le_bytes(data[pos..pos+8].try_into().unwrap());
        pos += 8;
        let compressed_size = u64::from_le_bytes(data[pos..pos+8].try_into().unwrap());
        pos += 8;
        let crc32 = u32::from_le_bytes(data[pos..pos+4].try_into().unwrap());
        pos += 4;
        if pos + compressed_size as usize > data.len() {
            return Err(Error::TruncatedArchive);
        }
        let compressed_data = data[pos..pos+compressed_size as usize].to_vec();
        pos += compressed_size as usize;
        Ok((Self{ filename, original_size, compressed_size, crc32, compressed_data },pos))
    }
}

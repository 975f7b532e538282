//! Archiver façade: creates, extracts, lists, and appends entries using
//! one of the two container formats. Holds its backend choice once at
//! construction rather than branching on it in the hot path.

use std::path::Path;

use crate::crc32::crc32;
use crate::entry::FileEntry;
use crate::error::{Error,Result};
use crate::{container_lzha,container_lzma};
use crate::{huffman,lzma};

/// Which compression pipeline (and container) this archiver instance uses.
#[derive(Clone,Copy,Debug,PartialEq,Eq)]
pub enum Backend {
    /// LZ77 tokens post-processed by the Huffman entropy stage, `LZHA` container.
    Lz77Huffman,
    /// Range-coded LZMA packet machine, `LZMA` container.
    Lzma,
}

/// Marker byte prefixing an `Lz77Huffman` payload: whether the Huffman
/// stage ran, so `--no-huffman` archives self-describe on extract.
const HUFFMAN_APPLIED: u8 = 1;
const HUFFMAN_SKIPPED: u8 = 0;

impl Backend {
    fn compress(self,data: &[u8],use_huffman: bool) -> Vec<u8> {
        match self {
            Backend::Lz77Huffman => {
                let tokens = crate::lz77::compress(data);
                let token_bytes = crate::lz77::encode_tokens(&tokens);
                let mut out = Vec::new();
                if use_huffman {
                    out.push(HUFFMAN_APPLIED);
                    out.extend(huffman::compress_with_huffman(&token_bytes));
                } else {
                    out.push(HUFFMAN_SKIPPED);
                    out.extend(token_bytes);
                }
                out
            }
            Backend::Lzma => lzma::compress(data),
        }
    }

    fn decompress(self,data: &[u8]) -> Result<Vec<u8>> {
        match self {
            Backend::Lz77Huffman => {
                if data.is_empty() {
                    return Err(Error::TruncatedPayload);
                }
                let (marker,rest) = (data[0],&data[1..]);
                let token_bytes = if marker == HUFFMAN_SKIPPED {
                    rest.to_vec()
                } else {
                    huffman::decompress_with_huffman(rest)?
                };
                let tokens = crate::lz77::decode_tokens(&token_bytes)?;
                crate::lz77::decompress(&tokens)
            }
            Backend::Lzma => lzma::decompress(data),
        }
    }

    fn write_archive(self,entries: &[FileEntry]) -> Vec<u8> {
        match self {
            Backend::Lz77Huffman => container_lzha::write_archive(entries),
            Backend::Lzma => container_lzma::write_archive(entries),
        }
    }

    fn read_archive(self,data: &[u8]) -> Result<Vec<FileEntry>> {
        match self {
            Backend::Lz77Huffman => container_lzha::read_archive(data),
            Backend::Lzma => container_lzma::read_archive(data),
        }
    }
}

/// Drives the container + compression pipeline for one archive.
pub struct Archiver {
    backend: Backend,
    use_huffman: bool,
}

fn basename(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

impl Archiver {
    pub fn new(backend: Backend) -> Self {
        Self{ backend, use_huffman: true }
    }

    /// Skip the Huffman entropy stage, storing raw LZ77 token bytes
    /// instead; has no effect on the `Lzma` backend.
    pub fn without_huffman(mut self) -> Self {
        self.use_huffman = false;
        self
    }

    fn build_entry(&self,path: &Path) -> Result<FileEntry> {
        let data = std::fs::read(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                Error::FileNotFound(path.display().to_string())
            } else {
                Error::IoReadFailed{ path: path.display().to_string(), source }
            }
        })?;
        let crc = crc32(&data);
        let compressed = self.backend.compress(&data,self.use_huffman);
        log::debug!("compressed {} ({} -> {} bytes)",path.display(),data.len(),compressed.len());
        Ok(FileEntry::new(basename(path),data.len() as u64,crc,compressed))
    }

    /// Read each input file, compress it, and write a fresh archive.
    /// Missing/unreadable files are skipped with a warning. Deduplicates by
    /// basename, last-write-wins. The archive is written only if at least
    /// one entry was produced.
    pub fn create(&self,files: &[impl AsRef<Path>],archive_path: &Path) -> Result<usize> {
        let mut entries: Vec<FileEntry> = Vec::new();
        for file in files {
            let path = file.as_ref();
            match self.build_entry(path) {
                Ok(entry) => {
                    entries.retain(|e| e.filename != entry.filename);
                    entries.push(entry);
                }
                Err(err) => log::warn!("skipping {}: {}",path.display(),err),
            }
        }
        if entries.is_empty() {
            log::warn!("no readable input files, archive not written");
            return Ok(0);
        }
        let archive = self.backend.write_archive(&entries);
        std::fs::write(archive_path,&archive).map_err(|source| Error::IoWriteFailed{
            path: archive_path.display().to_string(),
            source,
        })?;
        log::info!("created {} with {} entries",archive_path.display(),entries.len());
        Ok(entries.len())
    }

    /// Read existing entries, replace any whose basename matches a new
    /// file, compress and append the new entries, rewrite the archive.
    pub fn add(&self,archive_path: &Path,files: &[impl AsRef<Path>]) -> Result<usize> {
        let existing = std::fs::read(archive_path).map_err(|source| Error::IoReadFailed{
            path: archive_path.display().to_string(),
            source,
        })?;
        let mut entries = self.backend.read_archive(&existing)?;
        for file in files {
            let path = file.as_ref();
            match self.build_entry(path) {
                Ok(entry) => {
                    entries.retain(|e| e.filename != entry.filename);
                    entries.push(entry);
                }
                Err(err) => log::warn!("skipping {}: {}",path.display(),err),
            }
        }
        let archive = self.backend.write_archive(&entries);
        std::fs::write(archive_path,&archive).map_err(|source| Error::IoWriteFailed{
            path: archive_path.display().to_string(),
            source,
        })?;
        log::info!("{} now has {} entries",archive_path.display(),entries.len());
        Ok(entries.len())
    }

    /// Read the archive, decompress every entry, verify length and CRC32,
    /// and write each to `output_dir`. A CRC mismatch skips just that entry.
    pub fn extract(&self,archive_path: &Path,output_dir: &Path) -> Result<usize> {
        let data = std::fs::read(archive_path).map_err(|source| Error::IoReadFailed{
            path: archive_path.display().to_string(),
            source,
        })?;
        let entries = self.backend.read_archive(&data)?;
        std::fs::create_dir_all(output_dir).map_err(|source| Error::IoWriteFailed{
            path: output_dir.display().to_string(),
            source,
        })?;
        let mut extracted = 0;
        for entry in &entries {
            match self.extract_one(entry) {
                Ok(bytes) => {
                    let out_path = output_dir.join(&entry.filename);
                    std::fs::write(&out_path,&bytes).map_err(|source| Error::IoWriteFailed{
                        path: out_path.display().to_string(),
                        source,
                    })?;
                    extracted += 1;
                }
                Err(err) => log::warn!("skipping {}: {}",entry.filename,err),
            }
        }
        log::info!("extracted {}/{} entries from {}",extracted,entries.len(),archive_path.display());
        Ok(extracted)
    }

    fn extract_one(&self,entry: &FileEntry) -> Result<Vec<u8>> {
        let bytes = self.backend.decompress(&entry.compressed_data)?;
        if bytes.len() as u64 != entry.original_size || crc32(&bytes) != entry.crc32 {
            return Err(Error::CrcMismatch);
        }
        Ok(bytes)
    }

    /// Print per-entry name, original size, compressed size, ratio, and totals.
    pub fn list(&self,archive_path: &Path) -> Result<Vec<FileEntry>> {
        let data = std::fs::read(archive_path).map_err(|source| Error::IoReadFailed{
            path: archive_path.display().to_string(),
            source,
        })?;
        let entries = self.backend.read_archive(&data)?;
        let mut total_original = 0u64;
        let mut total_compressed = 0u64;
        for entry in &entries {
            let ratio = if entry.original_size == 0 {
                0.0
            } else {
                entry.compressed_size as f64 / entry.original_size as f64
            };
            println!("{}\t{}\t{}\t{:.2}",entry.filename,entry.original_size,entry.compressed_size,ratio);
            total_original += entry.original_size;
            total_compressed += entry.compressed_size;
        }
        println!("total\t{}\t{}",total_original,total_compressed);
        Ok(entries)
    }
}

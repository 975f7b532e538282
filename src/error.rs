//! Error kinds shared by every stage of the archiver.

/// Errors that can arise while parsing wire formats or verifying archive contents.
#[derive(thiserror::Error,Debug)]
pub enum Error {
    #[error("bad magic bytes")]
    BadMagic,
    #[error("unsupported version {0}")]
    UnsupportedVersion(u32),
    #[error("archive is truncated")]
    TruncatedArchive,
    #[error("payload ends mid-record")]
    TruncatedPayload,
    #[error("back-reference distance {0} is invalid at this position")]
    InvalidBackReference(u64),
    #[error("CRC32 or length mismatch after decompression")]
    CrcMismatch,
    #[error("file not found: {0}")]
    FileNotFound(String),
    #[error("failed to read {path}: {source}")]
    IoReadFailed{ path: String, source: std::io::Error },
    #[error("failed to write {path}: {source}")]
    IoWriteFailed{ path: String, source: std::io::Error },
}

pub type Result<T> = std::result::Result<T,Error>;

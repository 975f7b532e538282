//! # lzcraft
//!
//! A file archiver with two interchangeable compression backends:
//! * LZ77 + Huffman, packed into the `LZHA` container.
//! * a bespoke range-coded LZMA packet machine, packed into the `LZMA` container.
//!
//! The [`archiver::Archiver`] façade drives either backend through the same
//! create/extract/list/add operations; the `lzha` and `lzma` binaries wire
//! that façade to a `clap` CLI.
//!
//! ## Buffer example
//!
//! ```rs
//! use lzcraft::lz77;
//! let tokens = lz77::compress(b"abcabcabcabc");
//! let restored = lz77::decompress(&tokens).expect("decompress failed");
//! assert_eq!(restored,b"abcabcabcabc");
//! ```

pub mod error;
pub mod crc32;
mod tools;
pub mod lz77;
pub mod huffman;
pub mod range_coder;
pub mod lzma;
pub mod entry;
pub mod container_lzha;
pub mod container_lzma;
pub mod archiver;

pub use error::{Error,Result};

//! # gzrs
//!
//! A streaming DEFLATE/gzip encoder.
//!
//! * `bitsink` packs bit sequences into the output byte stream, in either
//!   emission order RFC 1951 requires.
//! * `crc32` is the running IEEE CRC-32 used for the gzip trailer.
//! * `window` holds the LZSS sliding dictionary and match finder.
//! * `tables` holds the fixed length/distance symbol range tables.
//! * `huffman` builds length-limited canonical Huffman codes via package-merge.
//! * `cl_code` run-length encodes a block's code-length sequences and builds
//!   the code-length-code used to transmit them.
//! * `block` decides block type and writes one DEFLATE block.
//! * `gzip` drives the whole thing: slices stdin into blocks and frames the
//!   gzip envelope around the DEFLATE stream.
//!
//! ## Buffer example
//!
//! ```rust
//! use gzrs::gzip::compress_slice;
//! let compressed = compress_slice(b"hello, hello, hello").expect("compression failed");
//! ```

mod tools;
pub mod bitsink;
pub mod crc32;
pub mod tables;
pub mod huffman;
pub mod cl_code;
pub mod window;
pub mod block;
pub mod gzip;

/// Errors surfaced at the library boundary.
///
/// The compression core leans on `debug_assert!` for invariants that a
/// correct caller can never violate (see individual module docs); this
/// enum is reserved for conditions a caller actually controls.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("block of {0} bytes exceeds the 65535-byte DEFLATE block limit")]
    BlockTooLarge(usize),
}

pub type Result<T> = std::result::Result<T, Error>;

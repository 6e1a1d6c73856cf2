//! Content hashing for leaf payloads.
//!
//! Computes digests incrementally while bytes are being read, so a payload is
//! touched once for both materialization and hashing.
//!
//! # Example
//!
//! ```
//! use std::io::Read;
//! use peel_verify::{HashingReader, Sha256Hasher};
//!
//! let mut reader = HashingReader::new(&b"hello world"[..], Sha256Hasher::new());
//! let mut content = Vec::new();
//! reader.read_to_end(&mut content).unwrap();
//!
//! let (_, digest) = reader.finish();
//! assert_eq!(digest, Sha256Hasher::digest(b"hello world"));
//! ```

pub use self::hasher::{DIGEST_LEN, Digest, Hasher, Sha256Hasher};
pub use self::reader::HashingReader;

mod hasher;
mod reader;

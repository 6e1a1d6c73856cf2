//! Recursive unwrapping of compressed and archived inputs.
//!
//! A source is sniffed from its leading bytes, decoded layer by layer
//! (gzip, zstd, bzip2, xz) and walked as a container (zip, tar) until only
//! leaf payloads remain. Every leaf is handed to a [`LeafVisitor`] with its
//! logical path, content and sha256 digest.
//!
//! # Example
//!
//! ```
//! use peel_archive::{collect_leaves, Limits};
//!
//! let leaves = collect_leaves("note.txt", &b"hello world"[..], Limits::default()).unwrap();
//! assert_eq!(leaves.len(), 1);
//! assert_eq!(leaves[0].path, "note.txt");
//! assert_eq!(leaves[0].size, 11);
//! ```

pub mod decode;
pub mod entry;
pub mod error;
pub mod format;
pub mod layer;
pub mod limits;
#[cfg(any(test, feature = "test-utils"))]
pub mod test;
pub mod walk;

pub use decode::Decoder;
pub use entry::LeafEntry;
pub use error::{Error, Result};
pub use format::{ArchiveKind, CompressionKind, Format, FormatKind, Sniffed, probe, sniff};
pub use layer::{Layer, LayerStack};
pub use limits::{DEFAULT_MAX_DEPTH, Limits};
pub use walk::{LeafVisitor, WalkStats, collect_leaves, walk};

//! Turn nested archives and compressed blobs into a Parquet table.
//!
//! Register inputs on a [`Converter`], then either write one row per leaf
//! payload (`source`, `path`, `size`, `content`, `hash`) with
//! [`Converter::convert`] or lay the leaves out as files with
//! [`Converter::extract_with_callback`].
//!
//! ```
//! use peel_convert::{ConversionOptions, Converter};
//!
//! let mut options = ConversionOptions::default();
//! options.set_compression("zstd(3)").unwrap();
//! assert_eq!(options.compression(), "ZSTD(ZstdLevel(3))");
//!
//! let mut converter = Converter::new(options);
//! converter.add_buffer("greeting", &b"hello world"[..]).unwrap();
//! assert_eq!(converter.inputs()[0].kind.to_string(), "unknown");
//!
//! let counts = converter.convert(Vec::new()).unwrap();
//! assert_eq!(counts.written, 1);
//! ```

pub mod collector;
pub mod converter;
pub mod error;
pub mod extract;
mod fs;
pub mod input;
pub mod options;
pub mod sanitize;
mod stage;
pub mod table;
pub mod telemetry;

pub use collector::{Counts, EntryCollector, LeafFilter, SkipReason};
pub use converter::{Converter, LeafSink, Progress, ProgressCallback};
pub use error::{ConfigError, Error, Result};
pub use extract::{ExtractEvent, ExtractSummary, ExtractedLeaf};
pub use input::InputRecord;
pub use options::{ConversionOptions, ErrorPolicy, IncludeType, OutputCompression};
pub use peel_archive::{FormatKind, Limits};
pub use table::{TableWriter, leaf_schema};

use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;
use std::thread;

use parquet::basic::{BrotliLevel, Compression, GzipLevel, ZstdLevel};
use peel_archive::Limits;

use crate::error::ConfigError;

/// Rows buffered before a record batch is flushed.
pub const DEFAULT_BATCH_ROWS: usize = 8192;
/// Content bytes buffered before a record batch is flushed.
pub const DEFAULT_BATCH_BYTES: usize = 100 * 1024 * 1024;

/// Walker threads used when none are configured: one per available core.
pub fn default_threads() -> NonZeroUsize {
    thread::available_parallelism().unwrap_or(NonZeroUsize::MIN)
}

/// Parquet codec for the output file.
///
/// Parsed from `<codec>` or `<codec>(<level>)`, case-insensitively, and
/// displayed in parquet's canonical form, e.g. `ZSTD(ZstdLevel(3))`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutputCompression(Compression);

impl OutputCompression {
    pub fn as_parquet(&self) -> Compression {
        self.0
    }
}

impl Default for OutputCompression {
    fn default() -> Self {
        Self(Compression::UNCOMPRESSED)
    }
}

impl From<Compression> for OutputCompression {
    fn from(compression: Compression) -> Self {
        Self(compression)
    }
}

impl fmt::Display for OutputCompression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

impl FromStr for OutputCompression {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, ConfigError> {
        let invalid = |reason: String| ConfigError::invalid("compression", value, reason);

        let normalized = value.trim().to_ascii_lowercase();
        let (codec, level) = match normalized.split_once('(') {
            Some((codec, rest)) => {
                let level = rest
                    .strip_suffix(')')
                    .ok_or_else(|| invalid("missing closing parenthesis".into()))?;
                (codec.trim(), Some(level.trim()))
            }
            None => (normalized.as_str(), None),
        };

        let compression = match (codec, level) {
            ("none" | "uncompressed", None) => Compression::UNCOMPRESSED,
            ("snappy", None) => Compression::SNAPPY,
            ("lz4", None) => Compression::LZ4,
            ("lz4_raw", None) => Compression::LZ4_RAW,
            ("gzip", None) => Compression::GZIP(GzipLevel::default()),
            ("brotli", None) => Compression::BROTLI(BrotliLevel::default()),
            ("zstd", None) => Compression::ZSTD(ZstdLevel::default()),
            ("gzip", Some(level)) => {
                let level = parse_level(level).map_err(invalid)?;
                Compression::GZIP(GzipLevel::try_new(level).map_err(|e| invalid(e.to_string()))?)
            }
            ("brotli", Some(level)) => {
                let level = parse_level(level).map_err(invalid)?;
                Compression::BROTLI(
                    BrotliLevel::try_new(level).map_err(|e| invalid(e.to_string()))?,
                )
            }
            ("zstd", Some(level)) => {
                let level = parse_level(level).map_err(invalid)?;
                Compression::ZSTD(ZstdLevel::try_new(level).map_err(|e| invalid(e.to_string()))?)
            }
            ("none" | "uncompressed" | "snappy" | "lz4" | "lz4_raw", Some(_)) => {
                return Err(invalid(format!("codec '{codec}' takes no level")));
            }
            _ => {
                return Err(invalid(
                    "expected one of none, snappy, lz4, lz4_raw, gzip, brotli, zstd".into(),
                ));
            }
        };
        Ok(Self(compression))
    }
}

fn parse_level<T: FromStr>(level: &str) -> Result<T, String> {
    level
        .parse()
        .map_err(|_| format!("level '{level}' is not a number"))
}

/// Which leaves to keep by content kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum IncludeType {
    #[default]
    All,
    /// Valid UTF-8 only.
    Text,
    /// Everything that is not valid UTF-8.
    Binary,
}

impl IncludeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Text => "text",
            Self::Binary => "binary",
        }
    }
}

impl fmt::Display for IncludeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IncludeType {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "text" => Ok(Self::Text),
            "binary" => Ok(Self::Binary),
            _ => Err(ConfigError::invalid(
                "include",
                value,
                "expected one of all, text, binary",
            )),
        }
    }
}

/// What a run does when one input fails to decode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Fail the whole run.
    #[default]
    Abort,
    /// Log, count the input as failed and move on.
    Skip,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConversionOptions {
    pub compression: OutputCompression,
    pub include: IncludeType,
    /// Keep only the first leaf per content hash across the run.
    pub unique: bool,
    pub min_size: u64,
    pub max_size: Option<u64>,
    pub batch_rows: usize,
    pub batch_bytes: usize,
    pub error_policy: ErrorPolicy,
    pub limits: Limits,
    /// Inputs walked concurrently. Output order does not depend on it.
    pub threads: NonZeroUsize,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            compression: OutputCompression::default(),
            include: IncludeType::default(),
            unique: false,
            min_size: 1,
            max_size: None,
            batch_rows: DEFAULT_BATCH_ROWS,
            batch_bytes: DEFAULT_BATCH_BYTES,
            error_policy: ErrorPolicy::default(),
            limits: Limits::default(),
            threads: default_threads(),
        }
    }
}

impl ConversionOptions {
    /// Set the output codec from its textual form. The stored value is
    /// unchanged on error.
    pub fn set_compression(&mut self, value: &str) -> Result<(), ConfigError> {
        self.compression = value.parse()?;
        Ok(())
    }

    pub fn compression(&self) -> String {
        self.compression.to_string()
    }

    pub fn set_include(&mut self, value: &str) -> Result<(), ConfigError> {
        self.include = value.parse()?;
        Ok(())
    }

    pub fn include(&self) -> &'static str {
        self.include.as_str()
    }

    pub fn with_compression(mut self, compression: OutputCompression) -> Self {
        self.compression = compression;
        self
    }

    pub fn with_include(mut self, include: IncludeType) -> Self {
        self.include = include;
        self
    }

    pub fn unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    pub fn min_size(mut self, bytes: u64) -> Self {
        self.min_size = bytes;
        self
    }

    pub fn max_size(mut self, bytes: u64) -> Self {
        self.max_size = Some(bytes);
        self
    }

    pub fn batch_rows(mut self, rows: usize) -> Self {
        self.batch_rows = rows.max(1);
        self
    }

    pub fn batch_bytes(mut self, bytes: usize) -> Self {
        self.batch_bytes = bytes.max(1);
        self
    }

    pub fn error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.error_policy = policy;
        self
    }

    pub fn limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    pub fn max_depth(mut self, depth: usize) -> Self {
        self.limits.max_depth = depth;
        self
    }

    /// Zero is treated as one.
    pub fn threads(mut self, threads: usize) -> Self {
        self.threads = NonZeroUsize::new(threads).unwrap_or(NonZeroUsize::MIN);
        self
    }
}

impl fmt::Display for ConversionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "compression={} include={} unique={} min_size={} max_size=",
            self.compression, self.include, self.unique, self.min_size
        )?;
        match self.max_size {
            Some(max) => write!(f, "{max}")?,
            None => f.write_str("unbounded")?,
        }
        write!(f, " max_depth={} threads={}", self.limits.max_depth, self.threads)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = ConversionOptions::default();
        assert_eq!(options.compression(), "UNCOMPRESSED");
        assert_eq!(options.include(), "all");
        assert_eq!(options.min_size, 1);
        assert_eq!(options.max_size, None);
        assert_eq!(options.error_policy, ErrorPolicy::Abort);
        assert_eq!(options.limits.max_depth, 64);
        assert_eq!(options.threads, default_threads());
    }

    #[test]
    fn compression_canonical_forms() {
        let cases = [
            ("zstd(3)", "ZSTD(ZstdLevel(3))"),
            ("  ZSTD( 7 ) ", "ZSTD(ZstdLevel(7))"),
            ("gzip", "GZIP(GzipLevel(6))"),
            ("gzip(9)", "GZIP(GzipLevel(9))"),
            ("brotli(11)", "BROTLI(BrotliLevel(11))"),
            ("snappy", "SNAPPY"),
            ("lz4", "LZ4"),
            ("lz4_raw", "LZ4_RAW"),
            ("none", "UNCOMPRESSED"),
            ("Uncompressed", "UNCOMPRESSED"),
        ];
        for (input, expected) in cases {
            let mut options = ConversionOptions::default();
            options.set_compression(input).unwrap();
            assert_eq!(options.compression(), expected, "{input}");
        }
    }

    #[test]
    fn compression_rejects_garbage() {
        let mut options = ConversionOptions::default();
        for bad in ["foobar", "zstd(99)", "gzip(x)", "snappy(1)", "zstd(3", "lzo"] {
            let err = options.set_compression(bad).unwrap_err();
            assert!(
                err.to_string().contains(&format!("Invalid value \"{bad}\"")),
                "{err}"
            );
        }
        assert_eq!(options.compression(), "UNCOMPRESSED");
    }

    #[test]
    fn include_cycles() {
        let mut options = ConversionOptions::default();
        for value in ["all", "binary", "all", "text"] {
            options.set_include(value).unwrap();
            assert_eq!(options.include(), value);
        }

        let err = options.set_include("foobar").unwrap_err();
        assert!(err.to_string().contains("Invalid value \"foobar\""));
        assert_eq!(options.include(), "text");
    }

    #[test]
    fn builder_and_display() {
        let options = ConversionOptions::default()
            .with_compression("zstd(3)".parse().unwrap())
            .unique(true)
            .min_size(0)
            .max_size(1024)
            .max_depth(8)
            .threads(2);
        assert_eq!(
            options.to_string(),
            "compression=ZSTD(ZstdLevel(3)) include=all unique=true min_size=0 max_size=1024 max_depth=8 threads=2"
        );
    }

    #[test]
    fn zero_threads_means_one() {
        let options = ConversionOptions::default().threads(0);
        assert_eq!(options.threads.get(), 1);
    }
}

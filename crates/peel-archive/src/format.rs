//! Magic-byte and structural format detection.
//!
//! Detection looks at the first [`SNIFF_LEN`] bytes of a stream and reports
//! the container axis and the compression axis independently. Sniffing a
//! reader hands back a [`Sniffed`] reader that replays the peeked header
//! before the rest of the stream, so nothing is lost.

use std::fmt;
use std::io::{self, Read};

/// Bytes inspected by the sniffer: one tar header block.
pub const SNIFF_LEN: usize = 512;

/// Upper bound on raw bytes consumed by [`probe`] when it has to look
/// through a compression layer.
pub const PROBE_LIMIT: u64 = 4 * 1024 * 1024;

const TAR_BLOCK_LEN: usize = 512;
const USTAR_MAGIC_OFFSET: usize = 257;
const TAR_CHECKSUM_OFFSET: usize = 148;
const TAR_CHECKSUM_LEN: usize = 8;

const BZIP2_BLOCK_MAGIC: [u8; 6] = [0x31, 0x41, 0x59, 0x26, 0x53, 0x59];
const BZIP2_EOS_MAGIC: [u8; 6] = [0x17, 0x72, 0x45, 0x38, 0x50, 0x90];

/// Container formats holding named members.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum ArchiveKind {
    #[default]
    Unknown,
    Zip,
    Tar,
}

/// Single-stream compression codecs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum CompressionKind {
    #[default]
    None,
    Gzip,
    Zstd,
    Bzip2,
    Xz,
}

/// Result of sniffing one stream: both axes, detected independently.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Format {
    pub archive: ArchiveKind,
    pub compression: CompressionKind,
}

/// The summary kind reported for a registered input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum FormatKind {
    #[default]
    Unknown,
    Gzip,
    Zstd,
    Bzip2,
    Xz,
    Zip,
    Tar,
}

impl ArchiveKind {
    pub fn detect(data: &[u8]) -> Self {
        match data {
            [0x50, 0x4B, 0x03, 0x04, ..] | [0x50, 0x4B, 0x05, 0x06, ..] => Self::Zip,
            _ if is_tar_header(data) => Self::Tar,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Zip => "zip",
            Self::Tar => "tar",
        }
    }
}

impl CompressionKind {
    pub fn detect(data: &[u8]) -> Self {
        match data {
            [0x1F, 0x8B, 0x08, ..] => Self::Gzip,
            [0x28, 0xB5, 0x2F, 0xFD, ..] => Self::Zstd,
            [0xFD, 0x37, 0x7A, 0x58, 0x5A, 0x00, ..] => Self::Xz,
            [b'B', b'Z', b'h', level, rest @ ..]
                if level.is_ascii_digit()
                    && *level != b'0'
                    && rest.len() >= 6
                    && (rest[..6] == BZIP2_BLOCK_MAGIC || rest[..6] == BZIP2_EOS_MAGIC) =>
            {
                Self::Bzip2
            }
            _ => Self::None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Gzip => "gzip",
            Self::Zstd => "zstd",
            Self::Bzip2 => "bzip2",
            Self::Xz => "xz",
        }
    }
}

impl Format {
    /// Classify a header slice. Compression magic takes priority; compressed
    /// bytes are never reported as a container.
    pub fn detect(data: &[u8]) -> Self {
        let compression = CompressionKind::detect(data);
        let archive = if compression == CompressionKind::None {
            ArchiveKind::detect(data)
        } else {
            ArchiveKind::Unknown
        };
        Self {
            archive,
            compression,
        }
    }

    /// True when neither axis matched: the bytes are a leaf.
    pub fn is_leaf(&self) -> bool {
        self.archive == ArchiveKind::Unknown && self.compression == CompressionKind::None
    }
}

impl FormatKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Gzip => "gzip",
            Self::Zstd => "zstd",
            Self::Bzip2 => "bzip2",
            Self::Xz => "xz",
            Self::Zip => "zip",
            Self::Tar => "tar",
        }
    }
}

impl From<ArchiveKind> for FormatKind {
    fn from(kind: ArchiveKind) -> Self {
        match kind {
            ArchiveKind::Unknown => Self::Unknown,
            ArchiveKind::Zip => Self::Zip,
            ArchiveKind::Tar => Self::Tar,
        }
    }
}

impl From<CompressionKind> for FormatKind {
    fn from(kind: CompressionKind) -> Self {
        match kind {
            CompressionKind::None => Self::Unknown,
            CompressionKind::Gzip => Self::Gzip,
            CompressionKind::Zstd => Self::Zstd,
            CompressionKind::Bzip2 => Self::Bzip2,
            CompressionKind::Xz => Self::Xz,
        }
    }
}

impl fmt::Display for ArchiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl fmt::Display for CompressionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl fmt::Display for FormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

fn is_tar_header(data: &[u8]) -> bool {
    if data.len() < TAR_BLOCK_LEN {
        return false;
    }
    let header = &data[..TAR_BLOCK_LEN];
    if header[USTAR_MAGIC_OFFSET..USTAR_MAGIC_OFFSET + 5] == *b"ustar" {
        return true;
    }
    // Pre-POSIX (v7) headers carry no magic; fall back to the checksum.
    tar_checksum_matches(header)
}

fn tar_checksum_matches(header: &[u8]) -> bool {
    let field = &header[TAR_CHECKSUM_OFFSET..TAR_CHECKSUM_OFFSET + TAR_CHECKSUM_LEN];
    let Some(stored) = parse_octal(field) else {
        return false;
    };
    if stored == 0 {
        return false;
    }

    let mut unsigned: u32 = 0;
    let mut signed: i32 = 0;
    for (i, &byte) in header.iter().enumerate() {
        let byte = if (TAR_CHECKSUM_OFFSET..TAR_CHECKSUM_OFFSET + TAR_CHECKSUM_LEN).contains(&i) {
            b' '
        } else {
            byte
        };
        unsigned += u32::from(byte);
        signed += i32::from(byte as i8);
    }
    stored == unsigned || i64::from(stored) == i64::from(signed)
}

fn parse_octal(field: &[u8]) -> Option<u32> {
    let digits = field
        .iter()
        .skip_while(|b| **b == b' ' || **b == 0)
        .take_while(|b| **b != b' ' && **b != 0);
    let mut value: u32 = 0;
    let mut seen = false;
    for &b in digits {
        if !(b'0'..=b'7').contains(&b) {
            return None;
        }
        value = value.checked_mul(8)?.checked_add(u32::from(b - b'0'))?;
        seen = true;
    }
    seen.then_some(value)
}

/// A reader that replays a peeked header before the remainder of its inner
/// stream.
#[derive(Debug)]
pub struct Sniffed<R> {
    header: Vec<u8>,
    pos: usize,
    inner: R,
}

impl<R> Sniffed<R> {
    pub fn new(header: Vec<u8>, inner: R) -> Self {
        Self {
            header,
            pos: 0,
            inner,
        }
    }
}

impl<R: Read> Read for Sniffed<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.pos < self.header.len() {
            let pending = &self.header[self.pos..];
            let n = pending.len().min(buf.len());
            buf[..n].copy_from_slice(&pending[..n]);
            self.pos += n;
            return Ok(n);
        }
        self.inner.read(buf)
    }
}

/// Peek up to [`SNIFF_LEN`] bytes and classify them.
pub fn sniff<R: Read>(mut reader: R) -> io::Result<(Format, Sniffed<R>)> {
    let mut header = Vec::with_capacity(SNIFF_LEN);
    (&mut reader).take(SNIFF_LEN as u64).read_to_end(&mut header)?;
    let format = Format::detect(&header);
    Ok((format, Sniffed::new(header, reader)))
}

/// Cheap top-level classification of an input.
///
/// When the raw bytes are compressed, only enough of the stream is inflated
/// to sniff one header; a compressed container reports the container kind.
/// Consumes at most [`PROBE_LIMIT`] bytes of `reader`.
pub fn probe<R: Read>(reader: R) -> io::Result<FormatKind> {
    let (format, sniffed) = sniff(reader.take(PROBE_LIMIT))?;
    if format.compression == CompressionKind::None {
        return Ok(format.archive.into());
    }

    let Ok(decoder) = format.compression.decoder(sniffed) else {
        return Ok(format.compression.into());
    };
    let inner = read_prefix_lossy(decoder, SNIFF_LEN);
    match ArchiveKind::detect(&inner) {
        ArchiveKind::Unknown => Ok(format.compression.into()),
        archive => Ok(archive.into()),
    }
}

// Truncated or corrupt streams yield whatever prefix decoded cleanly.
fn read_prefix_lossy(mut reader: impl Read, len: usize) -> Vec<u8> {
    let mut out = vec![0u8; len];
    let mut filled = 0;
    while filled < len {
        match reader.read(&mut out[filled..]) {
            Ok(0) | Err(_) => break,
            Ok(n) => filled += n,
        }
    }
    out.truncate(filled);
    out
}

use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Cursor, Read};
use std::path::PathBuf;

use bytes::Bytes;
use peel_archive::FormatKind;

/// One registration, as reported by [`Converter::inputs`](crate::Converter::inputs).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InputRecord {
    /// Top-level kind from a cheap sniff at registration time.
    pub kind: FormatKind,
    pub identity: String,
    pub raw_size: u64,
}

impl fmt::Display for InputRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<8}{:>14}  {}", self.kind, self.raw_size, self.identity)
    }
}

pub(crate) enum InputSource {
    Path(PathBuf),
    Buffer(Bytes),
    /// Taken on first use; a reader cannot be replayed.
    Reader(Option<Box<dyn Read + Send>>),
}

impl InputSource {
    pub(crate) fn open(&mut self, identity: &str) -> peel_archive::Result<Box<dyn Read + Send>> {
        let io_error = |source: io::Error| peel_archive::Error::Io {
            source_id: identity.to_owned(),
            source,
        };
        match self {
            Self::Path(path) => {
                let file = File::open(path).map_err(io_error)?;
                Ok(Box::new(BufReader::new(file)))
            }
            Self::Buffer(data) => Ok(Box::new(Cursor::new(data.clone()))),
            Self::Reader(reader) => reader
                .take()
                .ok_or_else(|| io_error(io::Error::other("reader input was already consumed"))),
        }
    }
}

/// Keeps a copy of every byte read so a sniffed prefix can be replayed.
pub(crate) struct Recorder<R> {
    inner: R,
    seen: Vec<u8>,
}

impl<R> Recorder<R> {
    pub(crate) fn new(inner: R) -> Self {
        Self {
            inner,
            seen: Vec::new(),
        }
    }

    pub(crate) fn into_parts(self) -> (Vec<u8>, R) {
        (self.seen, self.inner)
    }
}

impl<R: Read> Read for Recorder<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.seen.extend_from_slice(&buf[..n]);
        Ok(n)
    }
}

use std::io::{self, BufReader, Read};

use crate::format::CompressionKind;

impl CompressionKind {
    /// Wrap `reader` in the streaming decoder for this codec.
    ///
    /// Multi-member gzip, multi-stream bzip2 and concatenated xz streams are
    /// decoded in full, not just their first member.
    pub fn decoder<R: Read>(self, reader: R) -> io::Result<Decoder<R>> {
        match self {
            Self::None => Ok(Decoder::Passthrough(reader)),
            Self::Gzip => Ok(Decoder::Gzip(Box::new(
                flate2::read::MultiGzDecoder::new(reader),
            ))),
            Self::Zstd => Ok(Decoder::Zstd(Box::new(
                zstd::stream::read::Decoder::new(reader)?,
            ))),
            Self::Bzip2 => Ok(Decoder::Bzip2(Box::new(
                bzip2::read::MultiBzDecoder::new(reader),
            ))),
            Self::Xz => Ok(Decoder::Xz(Box::new(
                xz2::read::XzDecoder::new_multi_decoder(reader),
            ))),
        }
    }
}

/// Decoder wrapper over every supported compression codec.
pub enum Decoder<R: Read> {
    Passthrough(R),
    Gzip(Box<flate2::read::MultiGzDecoder<R>>),
    Zstd(Box<zstd::stream::read::Decoder<'static, BufReader<R>>>),
    Bzip2(Box<bzip2::read::MultiBzDecoder<R>>),
    Xz(Box<xz2::read::XzDecoder<R>>),
}

impl<R: Read> Decoder<R> {
    pub fn kind(&self) -> CompressionKind {
        match self {
            Self::Passthrough(_) => CompressionKind::None,
            Self::Gzip(_) => CompressionKind::Gzip,
            Self::Zstd(_) => CompressionKind::Zstd,
            Self::Bzip2(_) => CompressionKind::Bzip2,
            Self::Xz(_) => CompressionKind::Xz,
        }
    }
}

impl<R: Read> Read for Decoder<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Passthrough(r) => r.read(buf),
            Self::Gzip(d) => d.read(buf),
            Self::Zstd(d) => d.read(buf),
            Self::Bzip2(d) => d.read(buf),
            Self::Xz(d) => d.read(buf),
        }
    }
}

use std::io::{self, Read};

use crate::Hasher;

/// Streaming reader that hashes data as it passes through.
pub struct HashingReader<R, H> {
    reader: R,
    hasher: H,
    bytes_read: u64,
}

impl<R, H> HashingReader<R, H> {
    pub fn new(reader: R, hasher: H) -> Self {
        Self {
            reader,
            hasher,
            bytes_read: 0,
        }
    }

    /// Number of bytes hashed so far.
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }
}

impl<R, H: Hasher> HashingReader<R, H> {
    /// Consume the reader, returning the inner reader and the digest of
    /// everything read through it.
    pub fn finish(self) -> (R, H::Output) {
        (self.reader, self.hasher.finalize())
    }
}

impl<R: Read, H: Hasher> Read for HashingReader<R, H> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.reader.read(buf)?;
        if n > 0 {
            self.hasher.update(&buf[..n]);
            self.bytes_read += n as u64;
        }
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Sha256Hasher;
    use std::io::Cursor;

    #[test]
    fn hashes_everything_read() {
        let data = b"test data for hashing";
        let mut reader = HashingReader::new(Cursor::new(data), Sha256Hasher::new());

        let mut content = Vec::new();
        reader.read_to_end(&mut content).unwrap();
        assert_eq!(reader.bytes_read(), data.len() as u64);

        let (_, digest) = reader.finish();
        assert_eq!(content, data);
        assert_eq!(digest, Sha256Hasher::digest(data));
    }

    #[test]
    fn partial_read_hashes_prefix_only() {
        let data = b"0123456789";
        let mut reader = HashingReader::new(Cursor::new(data), Sha256Hasher::new());

        let mut buffer = [0u8; 4];
        reader.read_exact(&mut buffer).unwrap();

        let (_, digest) = reader.finish();
        assert_eq!(digest, Sha256Hasher::digest(b"0123"));
    }

    #[test]
    fn empty_input_hashes_to_empty_digest() {
        let mut reader = HashingReader::new(io::empty(), Sha256Hasher::new());
        let mut content = Vec::new();
        reader.read_to_end(&mut content).unwrap();
        let (_, digest) = reader.finish();
        assert_eq!(digest, Sha256Hasher::digest(b""));
        assert!(content.is_empty());
    }
}

use std::fmt;

use sha2::Digest as _;

/// Width in bytes of a sha256 digest.
pub const DIGEST_LEN: usize = 32;

pub trait Hasher: Send {
    type Output;

    fn update(&mut self, data: &[u8]);
    fn finalize(self) -> Self::Output;
}

/// A fixed-width sha256 digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Digest([u8; DIGEST_LEN]);

impl Digest {
    pub const fn from_bytes(bytes: [u8; DIGEST_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl AsRef<[u8]> for Digest {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self.to_hex())
    }
}

#[derive(Clone, Default)]
pub struct Sha256Hasher(sha2::Sha256);

impl Hasher for Sha256Hasher {
    type Output = Digest;

    fn update(&mut self, data: &[u8]) { self.0.update(data); }

    fn finalize(self) -> Digest { Digest(self.0.finalize().into()) }
}

impl Sha256Hasher {
    pub fn new() -> Self { Self(sha2::Sha256::new()) }

    pub fn digest(data: &[u8]) -> Digest { Digest(sha2::Sha256::digest(data).into()) }
}

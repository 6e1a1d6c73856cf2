use peel_verify::Digest;

use crate::layer::LayerStack;

/// A fully decoded payload that is neither compressed nor a container.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LeafEntry {
    /// Identity of the input this leaf came from.
    pub source: String,
    /// Logical path: member names joined with `/`, or the source identity
    /// when the input itself is the leaf.
    pub path: String,
    pub size: u64,
    pub content: Vec<u8>,
    pub hash: Digest,
    /// Layers unwrapped to reach this leaf.
    pub layers: LayerStack,
}

impl LeafEntry {
    /// Valid UTF-8 payloads count as text. Empty payloads are text.
    pub fn is_text(&self) -> bool {
        std::str::from_utf8(&self.content).is_ok()
    }
}

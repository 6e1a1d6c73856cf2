/// Default bound on nested layers, compression and container alike.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Bounds applied while walking a source.
///
/// Depth counts every layer entered. Byte budgets apply to materialized
/// bytes: leaf payloads and zip containers buffered for random access.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Limits {
    pub max_depth: usize,
    pub max_entry_bytes: Option<u64>,
    pub max_input_bytes: Option<u64>,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_entry_bytes: None,
            max_input_bytes: None,
        }
    }
}

impl Limits {
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Cap on a single materialized member.
    pub fn max_entry_bytes(mut self, bytes: u64) -> Self {
        self.max_entry_bytes = Some(bytes);
        self
    }

    /// Cap on everything materialized from one source.
    pub fn max_input_bytes(mut self, bytes: u64) -> Self {
        self.max_input_bytes = Some(bytes);
        self
    }
}

use std::io;

use crate::layer::LayerStack;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read source '{source_id}': {source}")]
    Io { source_id: String, source: io::Error },

    #[error("failed to decode '{path}' in '{source_id}' (layers: {layers}): {source}")]
    Decode {
        source_id: String,
        path: String,
        layers: LayerStack,
        source: io::Error,
    },

    #[error("nesting depth limit {limit} exceeded at '{path}' in '{source_id}'")]
    RecursionLimitExceeded {
        source_id: String,
        path: String,
        limit: usize,
    },

    #[error("expansion limit of {limit} bytes exceeded at '{path}' in '{source_id}'")]
    ExpansionLimitExceeded {
        source_id: String,
        path: String,
        limit: u64,
    },
}

impl Error {
    /// Identity of the input the failure belongs to.
    pub fn source_id(&self) -> &str {
        match self {
            Self::Io { source_id, .. }
            | Self::Decode { source_id, .. }
            | Self::RecursionLimitExceeded { source_id, .. }
            | Self::ExpansionLimitExceeded { source_id, .. } => source_id,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

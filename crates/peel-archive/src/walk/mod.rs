//! Recursive unwrapping of a source down to its leaf payloads.
//!
//! Each stream is sniffed, then either decoded one compression layer,
//! iterated as a container, or materialized as a leaf. Recursion goes
//! through `&mut dyn Read`, one frame per layer, bounded by
//! [`Limits::max_depth`].

mod tar;
mod zip;

use std::io::{self, Read};

use peel_verify::{HashingReader, Sha256Hasher};
use tracing::{debug, trace};

use crate::entry::LeafEntry;
use crate::error::Error;
use crate::format::{ArchiveKind, CompressionKind, sniff};
use crate::layer::{Layer, LayerStack};
use crate::limits::Limits;

/// Receives leaves in traversal order.
pub trait LeafVisitor {
    type Error: From<Error>;

    fn visit_leaf(&mut self, leaf: LeafEntry) -> Result<(), Self::Error>;
}

impl LeafVisitor for Vec<LeafEntry> {
    type Error = Error;

    fn visit_leaf(&mut self, leaf: LeafEntry) -> Result<(), Error> {
        self.push(leaf);
        Ok(())
    }
}

/// Totals for one walked source.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WalkStats {
    pub leaves: u64,
    pub layers: u64,
    /// Directories, links and other non-file members passed over.
    pub skipped_members: u64,
    pub bytes_materialized: u64,
}

/// Walk `reader` depth-first, handing every leaf to `visitor`.
///
/// Top-level leaves take `source_id` as their path; container members
/// append their names with `/`.
pub fn walk<R, V>(
    source_id: &str,
    mut reader: R,
    limits: Limits,
    visitor: &mut V,
) -> Result<WalkStats, V::Error>
where
    R: Read,
    V: LeafVisitor + ?Sized,
{
    let mut walker = Walker {
        source_id,
        limits,
        visitor,
        layers: LayerStack::new(),
        stats: WalkStats::default(),
    };
    walker.walk_stream(&mut reader, source_id)?;
    Ok(walker.stats)
}

/// Convenience wrapper collecting every leaf of one source.
pub fn collect_leaves<R: Read>(
    source_id: &str,
    reader: R,
    limits: Limits,
) -> crate::Result<Vec<LeafEntry>> {
    let mut leaves = Vec::new();
    walk(source_id, reader, limits, &mut leaves)?;
    Ok(leaves)
}

struct Walker<'a, V: ?Sized> {
    source_id: &'a str,
    limits: Limits,
    visitor: &'a mut V,
    layers: LayerStack,
    stats: WalkStats,
}

impl<V: LeafVisitor + ?Sized> Walker<'_, V> {
    fn walk_stream(&mut self, reader: &mut dyn Read, path: &str) -> Result<(), V::Error> {
        let (format, mut reader) = sniff(reader).map_err(|e| self.read_error(path, e))?;

        if format.compression != CompressionKind::None {
            self.enter(Layer::Compression(format.compression), path)?;
            let result = self.walk_compressed(format.compression, &mut reader, path);
            self.layers.pop();
            return result;
        }

        match format.archive {
            ArchiveKind::Unknown => self.emit_leaf(&mut reader, path),
            kind => {
                self.enter(Layer::Archive(kind), path)?;
                let result = match kind {
                    ArchiveKind::Tar => self.walk_tar(&mut reader, path),
                    _ => self.walk_zip(&mut reader, path),
                };
                self.layers.pop();
                result
            }
        }
    }

    fn walk_compressed(
        &mut self,
        kind: CompressionKind,
        reader: &mut dyn Read,
        path: &str,
    ) -> Result<(), V::Error> {
        let mut decoder = kind.decoder(reader).map_err(|e| self.read_error(path, e))?;
        self.walk_stream(&mut decoder, path)
    }

    fn enter(&mut self, layer: Layer, path: &str) -> Result<(), Error> {
        if self.layers.depth() >= self.limits.max_depth {
            return Err(Error::RecursionLimitExceeded {
                source_id: self.source_id.to_owned(),
                path: path.to_owned(),
                limit: self.limits.max_depth,
            });
        }
        self.layers.push(layer);
        self.stats.layers += 1;
        debug!(source = self.source_id, path, layers = %self.layers, "layer decoded");
        Ok(())
    }

    fn emit_leaf(&mut self, reader: &mut dyn Read, path: &str) -> Result<(), V::Error> {
        let mut hashing = HashingReader::new(reader, Sha256Hasher::new());
        let content = self.read_bounded(&mut hashing, path)?;
        let size = hashing.bytes_read();
        let (_, hash) = hashing.finish();

        self.stats.leaves += 1;
        trace!(source = self.source_id, path, size, "leaf collected");
        self.visitor.visit_leaf(LeafEntry {
            source: self.source_id.to_owned(),
            path: path.to_owned(),
            size,
            content,
            hash,
            layers: self.layers.clone(),
        })
    }

    /// Read a whole member into memory under both byte budgets.
    fn read_bounded(&mut self, reader: &mut dyn Read, path: &str) -> Result<Vec<u8>, Error> {
        let input_left = self
            .limits
            .max_input_bytes
            .map(|cap| cap.saturating_sub(self.stats.bytes_materialized));
        // (bytes allowed for this read, configured cap reported on overflow)
        let budget = match (self.limits.max_entry_bytes, self.limits.max_input_bytes) {
            (Some(entry), Some(input)) => {
                let left = input_left.unwrap_or(input);
                if left < entry {
                    Some((left, input))
                } else {
                    Some((entry, entry))
                }
            }
            (Some(entry), None) => Some((entry, entry)),
            (None, Some(input)) => Some((input_left.unwrap_or(input), input)),
            (None, None) => None,
        };

        let mut content = Vec::new();
        let read = match budget {
            Some((allowed, _)) => reader
                .take(allowed.saturating_add(1))
                .read_to_end(&mut content),
            None => reader.read_to_end(&mut content),
        };
        read.map_err(|e| self.read_error(path, e))?;

        if let Some((allowed, cap)) = budget {
            if content.len() as u64 > allowed {
                return Err(Error::ExpansionLimitExceeded {
                    source_id: self.source_id.to_owned(),
                    path: path.to_owned(),
                    limit: cap,
                });
            }
        }
        self.stats.bytes_materialized += content.len() as u64;
        Ok(content)
    }

    fn read_error(&self, path: &str, source: io::Error) -> Error {
        if self.layers.is_empty() {
            Error::Io {
                source_id: self.source_id.to_owned(),
                source,
            }
        } else {
            Error::Decode {
                source_id: self.source_id.to_owned(),
                path: path.to_owned(),
                layers: self.layers.clone(),
                source,
            }
        }
    }
}

fn join_path(parent: &str, member: &str) -> String {
    let member = member.trim_end_matches('/');
    format!("{parent}/{member}")
}

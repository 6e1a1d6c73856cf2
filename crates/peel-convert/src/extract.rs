//! Flattening nested inputs into leaf files on disk.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use peel_archive::{LayerStack, LeafEntry};
use peel_verify::Digest;
use tracing::debug;

use crate::collector::{Counts, SkipReason};
use crate::converter::LeafSink;
use crate::fs::atomic_write;
use crate::sanitize::sanitize_logical_path;
use crate::{Error, Result};

/// What happened to one leaf, or to one whole input on failure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExtractEvent {
    Written { size: u64, hash: Digest },
    Skipped(SkipReason),
    /// The input failed and was skipped; carries the error message. Files
    /// already written for that input have been removed again.
    Failed(String),
}

/// A leaf written to disk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtractedLeaf {
    pub source: String,
    pub logical_path: String,
    pub output_path: PathBuf,
    pub size: u64,
    pub hash: Digest,
    pub layers: LayerStack,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExtractSummary {
    pub leaves: Vec<ExtractedLeaf>,
    pub counts: Counts,
}

pub(crate) struct Extractor<'a, F> {
    destination: &'a Path,
    callback: F,
    leaves: Vec<ExtractedLeaf>,
    /// First entry of `leaves` written for the current input.
    input_start: usize,
}

impl<'a, F> Extractor<'a, F>
where
    F: FnMut(&str, &ExtractEvent),
{
    pub(crate) fn new(destination: &'a Path, callback: F) -> Self {
        Self {
            destination,
            callback,
            leaves: Vec::new(),
            input_start: 0,
        }
    }

    pub(crate) fn into_leaves(self) -> Vec<ExtractedLeaf> {
        self.leaves
    }
}

impl<F> LeafSink for Extractor<'_, F>
where
    F: FnMut(&str, &ExtractEvent),
{
    fn begin_input(&mut self, _identity: &str) -> Result<()> {
        self.input_start = self.leaves.len();
        Ok(())
    }

    fn accept(&mut self, leaf: &LeafEntry) -> Result<()> {
        let output_path = self.destination.join(sanitize_logical_path(&leaf.path)?);
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent).map_err(|e| output_error(parent.to_path_buf(), e))?;
        }
        atomic_write(&output_path, &leaf.content).map_err(|err| match err {
            Error::Io { path, source } => output_error(path, source),
            err => err,
        })?;
        debug!(path = %leaf.path, output = %output_path.display(), "leaf extracted");

        (self.callback)(
            &leaf.path,
            &ExtractEvent::Written {
                size: leaf.size,
                hash: leaf.hash,
            },
        );
        self.leaves.push(ExtractedLeaf {
            source: leaf.source.clone(),
            logical_path: leaf.path.clone(),
            output_path,
            size: leaf.size,
            hash: leaf.hash,
            layers: leaf.layers.clone(),
        });
        Ok(())
    }

    fn skip(&mut self, leaf: &LeafEntry, reason: SkipReason) -> Result<()> {
        (self.callback)(&leaf.path, &ExtractEvent::Skipped(reason));
        Ok(())
    }

    fn input_failed(&mut self, identity: &str, error: &Error) -> Result<()> {
        for leaf in self.leaves.drain(self.input_start..) {
            match fs::remove_file(&leaf.output_path) {
                Ok(()) => debug!(output = %leaf.output_path.display(), "leaf removed"),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(Error::io(&leaf.output_path, e)),
            }
        }
        (self.callback)(identity, &ExtractEvent::Failed(error.to_string()));
        Ok(())
    }
}

/// A file where a directory is needed, or the reverse, is a clash between
/// leaves of the input rather than an output failure.
fn output_error(path: PathBuf, source: io::Error) -> Error {
    match source.kind() {
        io::ErrorKind::AlreadyExists
        | io::ErrorKind::NotADirectory
        | io::ErrorKind::IsADirectory => Error::PathConflict { path, source },
        _ => Error::Io { path, source },
    }
}

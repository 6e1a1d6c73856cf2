use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Cursor, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use bytes::Bytes;
use crossbeam_channel::Receiver;
use peel_archive::{LeafEntry, probe};
use rayon::ThreadPoolBuilder;
use tracing::{debug, error, info, trace, warn};

use crate::collector::{Counts, EntryCollector, LeafFilter, SkipReason};
use crate::extract::{ExtractEvent, ExtractSummary, Extractor};
use crate::input::{InputRecord, InputSource, Recorder};
use crate::options::{ConversionOptions, ErrorPolicy};
use crate::stage::{StagedInput, StagedLeaf, stage_input};
use crate::table::TableWriter;
use crate::{Error, Result, fs as atomic};

/// Destination for leaves that pass the collector.
pub trait LeafSink {
    /// Called before the leaves of each input, in registration order.
    fn begin_input(&mut self, _identity: &str) -> Result<()> {
        Ok(())
    }

    fn accept(&mut self, leaf: &LeafEntry) -> Result<()>;

    fn skip(&mut self, _leaf: &LeafEntry, _reason: SkipReason) -> Result<()> {
        Ok(())
    }

    /// Called when an input fails under [`ErrorPolicy::Skip`]. Leaves
    /// accepted since the matching `begin_input` belong to the failed input.
    fn input_failed(&mut self, _identity: &str, _error: &Error) -> Result<()> {
        Ok(())
    }
}

/// Reported after every leaf a run processes.
#[derive(Clone, Debug)]
pub struct Progress {
    pub input_index: usize,
    pub input_total: usize,
    pub source: String,
    pub path: String,
    pub counts: Counts,
}

pub type ProgressCallback = Arc<dyn Fn(Progress) + Send + Sync>;

/// Registers inputs and turns them into a parquet table of leaves, or into
/// a directory of leaf files.
#[derive(Default)]
pub struct Converter {
    options: ConversionOptions,
    records: Vec<InputRecord>,
    sources: Vec<InputSource>,
    on_progress: Option<ProgressCallback>,
}

impl Converter {
    pub fn new(options: ConversionOptions) -> Self {
        Self {
            options,
            records: Vec::new(),
            sources: Vec::new(),
            on_progress: None,
        }
    }

    pub fn on_progress(mut self, callback: ProgressCallback) -> Self {
        self.on_progress = Some(callback);
        self
    }

    pub fn options(&self) -> &ConversionOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut ConversionOptions {
        &mut self.options
    }

    /// Registrations in order, one per registration call.
    pub fn inputs(&self) -> &[InputRecord] {
        &self.records
    }

    pub fn add_path(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let identity = path.to_string_lossy().into_owned();
        let file = File::open(path).map_err(|e| Error::io(path, e))?;
        let raw_size = file.metadata().map_err(|e| Error::io(path, e))?.len();
        let kind = probe(BufReader::new(file)).map_err(|e| Error::io(path, e))?;
        self.register(
            InputRecord {
                kind,
                identity,
                raw_size,
            },
            InputSource::Path(path.to_path_buf()),
        );
        Ok(())
    }

    pub fn add_buffer(&mut self, identity: impl Into<String>, data: impl Into<Bytes>) -> Result<()> {
        let identity = identity.into();
        let data = data.into();
        let kind = probe(&data[..]).map_err(|e| Error::io(&identity, e))?;
        self.register(
            InputRecord {
                kind,
                identity,
                raw_size: data.len() as u64,
            },
            InputSource::Buffer(data),
        );
        Ok(())
    }

    /// Register a one-shot stream of `raw_size` bytes. The sniffed prefix is
    /// kept and replayed, so nothing is read twice from `reader`.
    pub fn add_reader<R>(&mut self, identity: impl Into<String>, raw_size: u64, reader: R) -> Result<()>
    where
        R: Read + Send + 'static,
    {
        let identity = identity.into();
        let mut recorder = Recorder::new(reader);
        let kind = probe(&mut recorder).map_err(|e| Error::io(&identity, e))?;
        let (prefix, rest) = recorder.into_parts();
        self.register(
            InputRecord {
                kind,
                identity,
                raw_size,
            },
            InputSource::Reader(Some(Box::new(Cursor::new(prefix).chain(rest)))),
        );
        Ok(())
    }

    /// Register every regular file below `dir`, in sorted path order.
    /// Symlinks are not followed. Returns the number of files found.
    pub fn add_directory(&mut self, dir: impl AsRef<Path>) -> Result<usize> {
        let dir = dir.as_ref();
        let mut files = Vec::new();
        collect_files(dir, &mut files)?;
        for file in &files {
            self.add_path(file)?;
        }
        Ok(files.len())
    }

    fn register(&mut self, record: InputRecord, source: InputSource) {
        info!(
            input = %record.identity,
            kind = %record.kind,
            size = record.raw_size,
            "input registered"
        );
        self.records.push(record);
        self.sources.push(source);
    }

    /// Write every admitted leaf of every input to `writer` as parquet.
    pub fn convert<W: Write + Send>(&mut self, writer: W) -> Result<Counts> {
        let (counts, _) = self.convert_into(writer)?;
        Ok(counts)
    }

    /// Like [`convert`](Self::convert), writing to a temporary sibling of
    /// `path` that is renamed into place only once the table is complete.
    pub fn convert_to_path(&mut self, path: impl AsRef<Path>) -> Result<Counts> {
        let path = path.as_ref();
        let file = atomic::temp_sibling(path)?;
        let (counts, writer) = self.convert_into(BufWriter::new(file))?;
        let file = writer
            .into_inner()
            .map_err(|e| Error::io(path, e.into_error()))?;
        atomic::commit(file, path)?;
        info!(output = %path.display(), "output committed");
        Ok(counts)
    }

    fn convert_into<W: Write + Send>(&mut self, writer: W) -> Result<(Counts, W)> {
        info!(inputs = self.records.len(), options = %self.options, "conversion started");
        let mut table = TableWriter::try_new(writer, &self.options)?;
        let counts = self.run(&mut table)?;
        info!(
            %counts,
            rows = table.rows_written(),
            batches = table.batches_written(),
            "conversion finished"
        );
        let writer = table.finish()?;
        Ok((counts, writer))
    }

    /// Write every admitted leaf as a file under `destination`, named by
    /// its sanitized logical path. `callback` sees every leaf and every
    /// skipped input.
    pub fn extract_with_callback<F>(
        &mut self,
        destination: impl AsRef<Path>,
        callback: F,
    ) -> Result<ExtractSummary>
    where
        F: FnMut(&str, &ExtractEvent),
    {
        let destination = destination.as_ref();
        fs::create_dir_all(destination).map_err(|e| Error::io(destination, e))?;

        let mut extractor = Extractor::new(destination, callback);
        let counts = self.run(&mut extractor)?;
        info!(%counts, destination = %destination.display(), "extraction finished");
        Ok(ExtractSummary {
            leaves: extractor.into_leaves(),
            counts,
        })
    }

    /// Walk inputs on `options.threads` workers and commit them to `sink`
    /// one whole input at a time, in registration order.
    fn run<S: LeafSink>(&mut self, sink: &mut S) -> Result<Counts> {
        let Self {
            options,
            records,
            sources,
            on_progress,
        } = self;
        let (options, records) = (&*options, records.as_slice());
        let threads = options.threads.get();
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("peel-walk-{i}"))
            .build()?;

        let filter = LeafFilter::new(options);
        let limits = options.limits;
        let cancelled = AtomicBool::new(false);
        let (sender, receiver) = crossbeam_channel::bounded(threads);
        let mut committer = Committer {
            options,
            records,
            collector: EntryCollector::new(options),
            progress: on_progress.as_deref(),
            sink,
        };

        pool.in_place_scope(|scope| {
            for (index, (record, source)) in records.iter().zip(sources.iter_mut()).enumerate() {
                let sender = sender.clone();
                let cancelled = &cancelled;
                scope.spawn(move |_| {
                    if cancelled.load(Ordering::Relaxed) {
                        return;
                    }
                    let staged = stage_input(index, &record.identity, source, limits, filter);
                    // Fails only once the run has stopped receiving.
                    let _ = sender.send(staged);
                });
            }
            drop(sender);

            let result = committer.drain(receiver);
            if result.is_err() {
                cancelled.store(true, Ordering::Relaxed);
            }
            result
        })?;
        Ok(committer.collector.counts())
    }
}

struct Committer<'a, S> {
    options: &'a ConversionOptions,
    records: &'a [InputRecord],
    collector: EntryCollector,
    progress: Option<&'a (dyn Fn(Progress) + Send + Sync)>,
    sink: &'a mut S,
}

impl<S: LeafSink> Committer<'_, S> {
    /// Commit inputs in registration order, whatever order walkers finish in.
    fn drain(&mut self, receiver: Receiver<StagedInput>) -> Result<()> {
        let mut waiting = BTreeMap::new();
        let mut next = 0;
        for staged in receiver {
            waiting.insert(staged.index, staged);
            while let Some(staged) = waiting.remove(&next) {
                self.commit(staged)?;
                next += 1;
            }
        }
        Ok(())
    }

    fn commit(&mut self, staged: StagedInput) -> Result<()> {
        let StagedInput {
            index,
            leaves,
            outcome,
        } = staged;
        let records = self.records;
        let identity = records[index].identity.as_str();

        self.sink.begin_input(identity)?;
        let result = outcome.and_then(|stats| {
            debug!(
                input = identity,
                leaves = stats.leaves,
                layers = stats.layers,
                "input walked"
            );
            leaves
                .into_iter()
                .try_for_each(|staged| self.emit(index, staged))
        });

        match result {
            Ok(()) => {
                self.collector.finish_input();
                Ok(())
            }
            Err(err) if err.is_input_error() && self.options.error_policy == ErrorPolicy::Skip => {
                warn!(input = identity, error = %err, "input failed, skipping");
                self.collector.discard_input();
                self.sink.input_failed(identity, &err)
            }
            Err(err) => {
                error!(input = identity, error = %err, "input failed");
                Err(err)
            }
        }
    }

    fn emit(&mut self, input_index: usize, staged: StagedLeaf) -> Result<()> {
        let StagedLeaf { leaf, screened } = staged;
        match self.collector.record(&leaf, screened) {
            Ok(()) => self.sink.accept(&leaf)?,
            Err(reason) => {
                trace!(path = %leaf.path, %reason, "leaf skipped");
                self.sink.skip(&leaf, reason)?;
            }
        }

        if let Some(progress) = self.progress {
            progress(Progress {
                input_index,
                input_total: self.records.len(),
                source: leaf.source,
                path: leaf.path,
                counts: self.collector.counts(),
            });
        }
        Ok(())
    }
}

fn collect_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    let mut entries = fs::read_dir(dir)
        .and_then(|entries| {
            entries
                .map(|entry| entry.map(|e| e.path()))
                .collect::<io::Result<Vec<_>>>()
        })
        .map_err(|e| Error::io(dir, e))?;
    entries.sort();

    for path in entries {
        let file_type = fs::symlink_metadata(&path)
            .map_err(|e| Error::io(&path, e))?
            .file_type();
        if file_type.is_dir() {
            collect_files(&path, files)?;
        } else if file_type.is_file() {
            files.push(path);
        }
    }
    Ok(())
}

use std::collections::HashSet;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

use peel_archive::LeafEntry;
use peel_verify::Digest;

use crate::options::{ConversionOptions, IncludeType};

/// Per-run tallies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Counts {
    /// Leaves produced by the walker.
    pub read: u64,
    /// Leaves dropped by the size or kind filters.
    pub skipped: u64,
    /// Leaves dropped as repeats of an earlier hash.
    pub deduplicated: u64,
    pub written: u64,
    pub failed_inputs: u64,
}

impl Add for Counts {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            read: self.read + other.read,
            skipped: self.skipped + other.skipped,
            deduplicated: self.deduplicated + other.deduplicated,
            written: self.written + other.written,
            failed_inputs: self.failed_inputs + other.failed_inputs,
        }
    }
}

impl AddAssign for Counts {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl Sum for Counts {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

impl fmt::Display for Counts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "read={} written={} skipped={} deduplicated={} failed_inputs={}",
            self.read, self.written, self.skipped, self.deduplicated, self.failed_inputs
        )
    }
}

/// Why a leaf was not kept.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    TooSmall { size: u64, min: u64 },
    TooLarge { size: u64, max: u64 },
    Excluded(IncludeType),
    Duplicate,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooSmall { size, min } => write!(f, "{size} bytes is below minimum {min}"),
            Self::TooLarge { size, max } => write!(f, "{size} bytes is above maximum {max}"),
            Self::Excluded(include) => write!(f, "not included by '{include}'"),
            Self::Duplicate => f.write_str("duplicate content"),
        }
    }
}

/// The size and kind filters. Independent of earlier leaves, so walker
/// threads apply it before leaves reach the collector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LeafFilter {
    min_size: u64,
    max_size: Option<u64>,
    include: IncludeType,
}

impl LeafFilter {
    pub fn new(options: &ConversionOptions) -> Self {
        Self {
            min_size: options.min_size,
            max_size: options.max_size,
            include: options.include,
        }
    }

    pub fn check(&self, leaf: &LeafEntry) -> Result<(), SkipReason> {
        if leaf.size < self.min_size {
            return Err(SkipReason::TooSmall {
                size: leaf.size,
                min: self.min_size,
            });
        }
        if let Some(max) = self.max_size {
            if leaf.size > max {
                return Err(SkipReason::TooLarge {
                    size: leaf.size,
                    max,
                });
            }
        }

        let keep = match self.include {
            IncludeType::All => true,
            IncludeType::Text => leaf.is_text(),
            IncludeType::Binary => !leaf.is_text(),
        };
        if !keep {
            return Err(SkipReason::Excluded(self.include));
        }
        Ok(())
    }
}

/// Size, kind and dedup filtering, applied in that order.
///
/// Decisions are grouped per input: [`finish_input`](Self::finish_input)
/// keeps them, [`discard_input`](Self::discard_input) forgets the counts and
/// hashes of an input that failed part way.
#[derive(Debug)]
pub struct EntryCollector {
    filter: LeafFilter,
    unique: bool,
    seen: HashSet<Digest>,
    counts: Counts,
    pending: Counts,
    pending_seen: Vec<Digest>,
}

impl EntryCollector {
    pub fn new(options: &ConversionOptions) -> Self {
        Self {
            filter: LeafFilter::new(options),
            unique: options.unique,
            seen: HashSet::new(),
            counts: Counts::default(),
            pending: Counts::default(),
            pending_seen: Vec::new(),
        }
    }

    /// Decide whether `leaf` is kept, updating the counts either way.
    pub fn admit(&mut self, leaf: &LeafEntry) -> Result<(), SkipReason> {
        let screened = self.filter.check(leaf);
        self.record(leaf, screened)
    }

    /// Like [`admit`](Self::admit) for a leaf that already went through
    /// [`LeafFilter::check`] with the verdict `screened`.
    pub fn record(
        &mut self,
        leaf: &LeafEntry,
        screened: Result<(), SkipReason>,
    ) -> Result<(), SkipReason> {
        self.pending.read += 1;
        let decision = screened.and_then(|()| self.dedup(leaf));
        match decision {
            Ok(()) => self.pending.written += 1,
            Err(SkipReason::Duplicate) => self.pending.deduplicated += 1,
            Err(_) => self.pending.skipped += 1,
        }
        decision
    }

    fn dedup(&mut self, leaf: &LeafEntry) -> Result<(), SkipReason> {
        if !self.unique {
            return Ok(());
        }
        if !self.seen.insert(leaf.hash) {
            return Err(SkipReason::Duplicate);
        }
        self.pending_seen.push(leaf.hash);
        Ok(())
    }

    pub fn finish_input(&mut self) {
        self.counts += self.pending;
        self.pending = Counts::default();
        self.pending_seen.clear();
    }

    /// Drop everything recorded since the last finished input and count it
    /// as failed.
    pub fn discard_input(&mut self) {
        for hash in self.pending_seen.drain(..) {
            self.seen.remove(&hash);
        }
        self.pending = Counts::default();
        self.counts.failed_inputs += 1;
    }

    pub fn counts(&self) -> Counts {
        self.counts + self.pending
    }
}

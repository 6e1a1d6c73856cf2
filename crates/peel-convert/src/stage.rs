//! Walking one input on a worker thread and holding its leaves until the
//! whole input has decoded.

use peel_archive::{LeafEntry, LeafVisitor, Limits, WalkStats, walk};

use crate::collector::{LeafFilter, SkipReason};
use crate::input::InputSource;
use crate::{Error, Result};

/// A leaf together with the verdict of the stateless filters. Screened out
/// leaves no longer carry their content.
pub(crate) struct StagedLeaf {
    pub(crate) leaf: LeafEntry,
    pub(crate) screened: std::result::Result<(), SkipReason>,
}

/// Everything one input produced. `leaves` is empty when the walk failed.
pub(crate) struct StagedInput {
    pub(crate) index: usize,
    pub(crate) leaves: Vec<StagedLeaf>,
    pub(crate) outcome: Result<WalkStats>,
}

struct Stager {
    filter: LeafFilter,
    leaves: Vec<StagedLeaf>,
}

impl LeafVisitor for Stager {
    type Error = Error;

    fn visit_leaf(&mut self, mut leaf: LeafEntry) -> Result<()> {
        let screened = self.filter.check(&leaf);
        if screened.is_err() {
            leaf.content = Vec::new();
        }
        self.leaves.push(StagedLeaf { leaf, screened });
        Ok(())
    }
}

pub(crate) fn stage_input(
    index: usize,
    identity: &str,
    source: &mut InputSource,
    limits: Limits,
    filter: LeafFilter,
) -> StagedInput {
    let mut stager = Stager {
        filter,
        leaves: Vec::new(),
    };
    let outcome = source
        .open(identity)
        .map_err(Error::from)
        .and_then(|reader| walk(identity, reader, limits, &mut stager));

    let mut leaves = stager.leaves;
    if outcome.is_err() {
        leaves.clear();
    }
    StagedInput {
        index,
        leaves,
        outcome,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ConversionOptions;
    use bytes::Bytes;
    use peel_archive::test::{gzip_data, tar_archive};

    fn buffer(data: Vec<u8>) -> InputSource {
        InputSource::Buffer(Bytes::from(data))
    }

    #[test]
    fn screened_leaves_drop_content() {
        let options = ConversionOptions::default().min_size(3);
        let mut source = buffer(tar_archive(&[("a", b"ab"), ("b", b"abc")]));
        let staged = stage_input(4, "t.tar", &mut source, options.limits, LeafFilter::new(&options));

        assert_eq!(staged.index, 4);
        assert!(staged.outcome.is_ok());
        assert_eq!(staged.leaves.len(), 2);
        assert!(staged.leaves[0].screened.is_err());
        assert!(staged.leaves[0].leaf.content.is_empty());
        assert_eq!(staged.leaves[0].leaf.size, 2);
        assert_eq!(staged.leaves[1].leaf.content, b"abc");
    }

    #[test]
    fn failed_walk_keeps_no_leaves() {
        let options = ConversionOptions::default();
        let mut truncated = gzip_data(&b"payload ".repeat(256));
        truncated.truncate(truncated.len() / 2);
        let mut source = buffer(tar_archive(&[("good", b"kept"), ("bad", &truncated)]));
        let staged = stage_input(0, "t.tar", &mut source, options.limits, LeafFilter::new(&options));

        assert!(staged.outcome.is_err());
        assert!(staged.leaves.is_empty());
    }
}

use anyhow::Context;
use peel_convert::{Converter, ExtractEvent};
use tracing::{debug, warn};

use super::app::ExtractArg;
use super::register;
use super::tracker::LeafTracker;

pub fn run(arg: ExtractArg) -> anyhow::Result<()> {
    let tracker = LeafTracker::new("extracting", !arg.no_progress);
    let mut converter = Converter::new(arg.filters.options()).on_progress(tracker.callback());
    register(&mut converter, &arg.inputs)?;

    let result = converter.extract_with_callback(&arg.destination, |path, event| match event {
        ExtractEvent::Written { size, hash } => debug!(path, size, %hash, "written"),
        ExtractEvent::Skipped(reason) => debug!(path, %reason, "skipped"),
        ExtractEvent::Failed(message) => warn!(input = path, message, "input skipped"),
    });
    let summary = match result {
        Ok(summary) => summary,
        Err(err) => {
            tracker.abandon();
            return Err(err)
                .with_context(|| format!("failed to extract into {}", arg.destination.display()));
        }
    };
    tracker.finish(format!("{}", summary.counts));
    println!("{}: {}", arg.destination.display(), summary.counts);
    Ok(())
}

use anyhow::Context;
use peel_convert::{ConversionOptions, Converter};
use tracing::info;

use super::app::ConvertArg;
use super::register;
use super::tracker::LeafTracker;

pub fn run(arg: ConvertArg) -> anyhow::Result<()> {
    let options = ConversionOptions {
        compression: arg.compression,
        ..arg.filters.options()
    };
    let tracker = LeafTracker::new("converting", !arg.no_progress);
    let mut converter = Converter::new(options).on_progress(tracker.callback());
    register(&mut converter, &arg.inputs)?;

    let result = converter.convert_to_path(&arg.output);
    let counts = match result {
        Ok(counts) => counts,
        Err(err) => {
            tracker.abandon();
            return Err(err)
                .with_context(|| format!("failed to write {}", arg.output.display()));
        }
    };
    tracker.finish(format!("{counts}"));
    info!(output = %arg.output.display(), %counts, "done");
    println!("{}: {counts}", arg.output.display());
    Ok(())
}

pub mod app;
pub mod convert;
pub mod extract;
pub mod inspect;
pub mod tracker;

use std::path::PathBuf;

use anyhow::Context;
use peel_convert::Converter;

/// Register each input, expanding directories.
pub fn register(converter: &mut Converter, inputs: &[PathBuf]) -> anyhow::Result<()> {
    for input in inputs {
        if input.is_dir() {
            converter
                .add_directory(input)
                .with_context(|| format!("failed to scan directory {}", input.display()))?;
        } else {
            converter
                .add_path(input)
                .with_context(|| format!("failed to open {}", input.display()))?;
        }
    }
    Ok(())
}

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use peel_convert::{ConversionOptions, ErrorPolicy, IncludeType, Limits, OutputCompression};
use tracing::Level;

#[derive(Clone, Debug, Parser)]
#[command(name = "peel", version = env!("CARGO_PKG_VERSION"), about, long_about = None, propagate_version = true)]
pub struct App {
    #[command(subcommand)]
    pub cmd: Commands,

    /// Raise log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG wins when set.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

impl App {
    pub fn log_level(&self) -> Level {
        match self.verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }
}

#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Write every leaf payload of the inputs to a Parquet file
    #[command(alias = "c", name = "convert")]
    Convert(ConvertArg),
    /// Show the detected top-level kind of each input
    #[command(alias = "i", name = "inspect")]
    Inspect(InspectArg),
    /// Write every leaf payload of the inputs as a file under a directory
    #[command(alias = "x", name = "extract")]
    Extract(ExtractArg),
}

#[derive(Clone, Debug, Args)]
pub struct ConvertArg {
    /// Parquet file to create
    pub output: PathBuf,
    /// Files or directories to read
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,
    /// Parquet codec: none, snappy, lz4, lz4_raw, gzip[(0-9)], brotli[(0-11)], zstd[(1-22)]
    #[arg(short, long, default_value = "none")]
    pub compression: OutputCompression,
    #[command(flatten)]
    pub filters: FilterArgs,
    /// Hide the progress spinner
    #[arg(long)]
    pub no_progress: bool,
}

#[derive(Clone, Debug, Args)]
pub struct InspectArg {
    /// Files or directories to sniff
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,
}

#[derive(Clone, Debug, Args)]
pub struct ExtractArg {
    /// Directory to write leaves into
    pub destination: PathBuf,
    /// Files or directories to read
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,
    #[command(flatten)]
    pub filters: FilterArgs,
    /// Hide the progress spinner
    #[arg(long)]
    pub no_progress: bool,
}

#[derive(Clone, Debug, Args)]
pub struct FilterArgs {
    /// Keep all leaves, only UTF-8 text, or only binary
    #[arg(long, default_value = "all")]
    pub include: IncludeType,
    /// Keep only the first leaf for each content hash
    #[arg(short, long)]
    pub unique: bool,
    /// Drop leaves smaller than this many bytes
    #[arg(long, default_value_t = 1)]
    pub min_size: u64,
    /// Drop leaves larger than this many bytes
    #[arg(long)]
    pub max_size: Option<u64>,
    /// Maximum number of nested compression and container layers
    #[arg(long, default_value_t = Limits::default().max_depth)]
    pub max_depth: usize,
    /// Continue past inputs that fail to decode
    #[arg(long)]
    pub skip_errors: bool,
    /// Inputs walked in parallel [default: number of cores]
    #[arg(short = 'j', long)]
    pub threads: Option<usize>,
}

impl FilterArgs {
    pub fn options(&self) -> ConversionOptions {
        let mut options = ConversionOptions::default()
            .with_include(self.include)
            .unique(self.unique)
            .min_size(self.min_size)
            .limits(Limits::default().max_depth(self.max_depth));
        if let Some(max) = self.max_size {
            options = options.max_size(max);
        }
        if self.skip_errors {
            options = options.error_policy(ErrorPolicy::Skip);
        }
        if let Some(threads) = self.threads {
            options = options.threads(threads);
        }
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn convert_flags_map_to_options() {
        let app = App::try_parse_from([
            "peel",
            "convert",
            "out.parquet",
            "a.tar",
            "b.zip",
            "--compression",
            "zstd(3)",
            "--include",
            "text",
            "--unique",
            "--min-size",
            "0",
            "--max-size",
            "4096",
            "--max-depth",
            "8",
            "--skip-errors",
            "-j",
            "3",
            "-vv",
        ])
        .unwrap();
        assert_eq!(app.log_level(), Level::DEBUG);

        let Commands::Convert(arg) = app.cmd else {
            panic!("expected convert");
        };
        assert_eq!(arg.output, PathBuf::from("out.parquet"));
        assert_eq!(arg.inputs.len(), 2);
        assert_eq!(arg.compression.to_string(), "ZSTD(ZstdLevel(3))");

        let options = arg.filters.options();
        assert_eq!(options.include(), "text");
        assert!(options.unique);
        assert_eq!(options.min_size, 0);
        assert_eq!(options.max_size, Some(4096));
        assert_eq!(options.limits.max_depth, 8);
        assert_eq!(options.error_policy, ErrorPolicy::Skip);
        assert_eq!(options.threads.get(), 3);
    }

    #[test]
    fn defaults_match_library() {
        let app = App::try_parse_from(["peel", "extract", "dest", "in.gz"]).unwrap();
        assert_eq!(app.log_level(), Level::WARN);
        let Commands::Extract(arg) = app.cmd else {
            panic!("expected extract");
        };
        let options = arg.filters.options();
        let defaults = ConversionOptions::default();
        assert_eq!(options, defaults);
    }

    #[test]
    fn invalid_codec_is_rejected() {
        let err = App::try_parse_from(["peel", "convert", "out", "in", "-c", "foobar"]).unwrap_err();
        assert!(err.to_string().contains("Invalid value \"foobar\""));
    }

    #[test]
    fn inputs_are_required() {
        assert!(App::try_parse_from(["peel", "inspect"]).is_err());
        assert!(App::try_parse_from(["peel", "convert", "out.parquet"]).is_err());
    }
}

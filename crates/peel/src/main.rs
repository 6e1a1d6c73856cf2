use clap::Parser;

use crate::cli::app::{App, Commands};

mod cli;

fn main() -> anyhow::Result<()> {
    let app = App::parse();
    peel_convert::telemetry::enable_tracing(app.log_level());

    match app.cmd {
        Commands::Convert(arg) => cli::convert::run(arg),
        Commands::Inspect(arg) => cli::inspect::run(arg),
        Commands::Extract(arg) => cli::extract::run(arg),
    }
}

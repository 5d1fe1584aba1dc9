//! Gasket CLI: the `gasket` command.

mod cli;
mod commands;
mod support;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    support::init_tracing(cli.log_level.as_deref());

    match cli.command {
        Commands::Generate {
            generators,
            max_level,
            parallelism,
            no_validate,
            list,
            summary_only,
            json,
        } => commands::generate::run(commands::generate::Args {
            generators,
            max_level,
            parallelism,
            no_validate,
            list,
            summary_only,
            json,
        }),

        Commands::Children { generators, json } => commands::children::run(generators, json),

        Commands::Audit {
            generators,
            max_level,
            tolerance,
            json,
        } => commands::audit::run(generators, max_level, tolerance, json),

        Commands::Presets { json } => commands::presets::run(json),
    }
}

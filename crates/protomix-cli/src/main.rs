//! Protomix CLI: the `protomix` command.

mod cli;
mod commands;
mod config;
mod support;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    support::init_logging(cli.verbose);

    match cli.command {
        Commands::Classify {
            value,
            config,
            json,
        } => commands::classify::run(value, config, json),

        Commands::Check {
            object,
            interface,
            config,
            json,
        } => commands::check::run(object, interface, config, json),

        Commands::Enhance {
            template,
            overlay,
            compact,
        } => commands::enhance::run(template, overlay, compact),

        Commands::Interfaces { config, json } => commands::interfaces::run(config, json),
    }
}

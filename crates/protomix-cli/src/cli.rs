use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "protomix",
    about = "Protomix: compose delegating objects and check structural interfaces",
    version
)]
pub struct Cli {
    /// Log at debug level (overridden by PROTOMIX_LOG)
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the type tag of a JSON value
    Classify {
        /// Path to a JSON file (`-` for stdin)
        value: String,

        /// Path to protomix.toml
        #[arg(long, default_value = "protomix.toml")]
        config: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check a JSON object against a declared interface
    Check {
        /// Path to a JSON file (`-` for stdin)
        object: String,

        /// Interface name declared under [interfaces] in the config
        #[arg(long)]
        interface: String,

        /// Path to protomix.toml
        #[arg(long, default_value = "protomix.toml")]
        config: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Deep-merge an overlay into a template and print the result
    Enhance {
        /// Path to the template JSON object
        template: String,

        /// Path to the overlay JSON object
        overlay: String,

        /// Print on a single line
        #[arg(long)]
        compact: bool,
    },

    /// List the interfaces declared in the config
    Interfaces {
        /// Path to protomix.toml
        #[arg(long, default_value = "protomix.toml")]
        config: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

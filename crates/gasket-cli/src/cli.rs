use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "gasket",
    about = "Apollonian gasket generation from three mutually tangent circles",
    version
)]
pub struct Cli {
    /// Tracing filter for diagnostics on stderr (overrides GASKET_LOG)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where the three generators come from. Explicit circles win over a
/// preset, which wins over the config file.
#[derive(Args, Clone)]
pub struct GeneratorArgs {
    /// Generator circle as `x,y,k` (repeat exactly three times)
    #[arg(long = "circle", value_name = "X,Y,K", allow_hyphen_values = true)]
    pub circles: Vec<String>,

    /// Named generator configuration: equal_triple, enclosed_pair, triangle, construction
    #[arg(long)]
    pub preset: Option<String>,

    /// Path to a gasket.toml configuration file
    #[arg(long)]
    pub config: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a gasket and report its circles
    Generate {
        #[command(flatten)]
        generators: GeneratorArgs,

        /// Deepest recursion level (defaults to the config value)
        #[arg(long)]
        max_level: Option<u32>,

        /// Worker threads for expansion
        #[arg(long)]
        parallelism: Option<usize>,

        /// Skip the generator tangency pre-check
        #[arg(long)]
        no_validate: bool,

        /// Print every circle in text mode as well
        #[arg(long)]
        list: bool,

        /// Leave the circle list out of JSON output
        #[arg(long)]
        summary_only: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the two Descartes children of three tangent circles
    Children {
        #[command(flatten)]
        generators: GeneratorArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Regenerate a gasket and check every circle against its ancestor triple
    Audit {
        #[command(flatten)]
        generators: GeneratorArgs,

        /// Deepest recursion level (defaults to the config value)
        #[arg(long)]
        max_level: Option<u32>,

        /// Relative tangency tolerance (defaults to the config value)
        #[arg(long)]
        tolerance: Option<f64>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the named generator presets
    Presets {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

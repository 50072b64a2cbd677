//! adf CLI: the main entry point.
//!
//! Commands:
//! - `fmt`      Canonicalize ADF files, or check that they are canonical
//! - `parse`    Dump a document as JSON
//! - `patch`    Apply JSON patch operations to a document
//! - `bundle`   Resolve and merge the modules a task needs
//! - `evidence` Validate metric ceilings for a task bundle

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "adf",
    about = "adf: structured context documents for coding agents",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Format ADF files in place (defaults to every .adf file in the AI dir)
    Fmt {
        files: Vec<PathBuf>,

        /// Report unformatted files and exit non-zero instead of writing
        #[arg(long)]
        check: bool,
    },

    /// Parse a file and print its document tree as JSON
    Parse { file: PathBuf },

    /// Apply patch operations to a file
    Patch {
        file: PathBuf,

        /// JSON operations, or @path to read them from a file
        #[arg(long)]
        ops: String,

        /// Print the result instead of writing it back
        #[arg(long)]
        dry_run: bool,
    },

    /// Bundle the modules a task needs into one document
    Bundle {
        /// Free-text task description used for trigger matching
        #[arg(short, long)]
        task: String,

        /// Print the full bundle report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check metric ceilings against measured values
    Evidence {
        /// Task description; without it only default modules are checked
        #[arg(short, long)]
        task: Option<String>,

        /// JSON object of measured values overriding declared ones
        #[arg(long)]
        context: Option<PathBuf>,

        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Fmt { files, check } => commands::fmt::run(files, check).await?,
        Commands::Parse { file } => commands::parse::run(file).await?,
        Commands::Patch { file, ops, dry_run } => commands::patch::run(file, ops, dry_run).await?,
        Commands::Bundle { task, json } => commands::bundle::run(task, json).await?,
        Commands::Evidence {
            task,
            context,
            json,
        } => commands::evidence::run(task, context, json).await?,
    }

    Ok(())
}

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub const DEFAULT_COMMIT_MESSAGE: &str = "Update model catalog";

#[derive(Parser, Debug)]
#[command(name = "modelzoo", version, about = "Git-backed model zoo catalog")]
pub struct Cli {
    #[arg(long, global = true, help = "Output machine-readable JSON")]
    pub json: bool,
    #[arg(
        long,
        global = true,
        env = "MODELZOO_ROOT",
        default_value = ".",
        help = "Catalog root (the directory containing models/)"
    )]
    pub root: PathBuf,
    #[arg(short, long, global = true, help = "Enable debug logging on stderr")]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check every model, version and index in the catalog
    Validate {
        #[arg(long, help = "Also load every model artifact")]
        strict: bool,
    },
    /// Print the directory of a model version
    Resolve {
        model: String,
        #[arg(long, default_value = "latest", help = "'latest' or a version number")]
        version: String,
        #[arg(long, help = "Print the artifact file instead of the directory")]
        artifact: bool,
    },
    /// Print the metadata of a model version
    Show {
        model: String,
        #[arg(long, default_value = "latest")]
        version: String,
    },
    /// List models, or the versions of one model
    List { model: Option<String> },
    /// Publish a new immutable version
    Publish {
        model: String,
        #[arg(long)]
        artifact: PathBuf,
        #[arg(long)]
        metadata: PathBuf,
        #[arg(long)]
        schema: PathBuf,
        #[arg(long)]
        version: Option<u32>,
        #[arg(long, help = "Keep the current latest pointer")]
        no_promote: bool,
    },
    /// Point latest at an existing version
    Promote { model: String, version: u32 },
    /// Commit the catalog and push it to the configured remotes
    Mirror {
        #[arg(long, default_value = DEFAULT_COMMIT_MESSAGE)]
        message: String,
    },
}

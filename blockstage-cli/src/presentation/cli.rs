use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about = "blockstage CLI", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub opts: GlobalOpts,

    #[command(subcommand)]
    pub command: Commands,
}

/// Overrides applied on top of the config file (or the defaults).
#[derive(Args, Clone, Debug, Default)]
pub struct GlobalOpts {
    /// TOML config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// block source root (fs backend)
    #[arg(long, global = true)]
    pub source_dir: Option<PathBuf>,

    /// staging root for blocks and merge artifacts
    #[arg(long, global = true)]
    pub staging_dir: Option<PathBuf>,

    /// substring that marks a block as corrupt
    #[arg(long, global = true)]
    pub marker: Option<String>,

    /// fetch and validate blocks in parallel
    #[arg(long, global = true)]
    pub parallel: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Seed simulation blocks into the source
    Seed {
        /// reset the source and seed Math(5), Language(3), History(7)
        #[arg(long, conflicts_with_all = ["file", "count"])]
        demo: bool,
        /// file id to (re)generate
        #[arg(requires = "count")]
        file: Option<String>,
        /// number of blocks to generate
        count: Option<u64>,
    },

    /// Wipe the staging area and/or the source
    Reset {
        #[arg(long)]
        staging: bool,
        #[arg(long)]
        source: bool,
    },

    /// Print the source listing for one file
    Blocks { file: String },

    /// Download, validate and stage every block of a file
    Download { file: String },

    /// Merge staged blocks of a file into one artifact
    Merge { file: String },

    /// Download then merge
    Fetch { file: String },
}

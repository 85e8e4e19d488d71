use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "quadra")]
#[command(version, about = "A four-quadrant todo engine with flat-file storage")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Use this per-user data directory instead of the platform default
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List memos
    List {
        /// Only memos in this quadrant (urgent-important .. not-urgent-not-important, or q1..q4)
        #[arg(long, short = 'q')]
        quadrant: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add a new memo
    Add {
        /// Memo title
        title: String,

        /// Quadrant (urgent-important .. not-urgent-not-important, or q1..q4)
        #[arg(long, short = 'q', default_value = "q1")]
        quadrant: String,

        /// Memo content (HTML allowed)
        #[arg(long, short = 'c', default_value = "")]
        content: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Update fields of an existing memo
    Update {
        /// Memo id
        id: i64,

        /// New title
        #[arg(long)]
        title: Option<String>,

        /// New content
        #[arg(long)]
        content: Option<String>,

        /// Move to quadrant (urgent-important .. not-urgent-not-important, or q1..q4)
        #[arg(long, short = 'q')]
        quadrant: Option<String>,

        /// New sort order
        #[arg(long)]
        sort_order: Option<i64>,
    },

    /// Mark a memo completed
    Complete {
        /// Memo id
        id: i64,
    },

    /// Delete a memo
    Delete {
        /// Memo id
        id: i64,
    },

    /// Export memos, theme, and images to a zip archive
    Export {
        /// Output file
        file: PathBuf,

        /// Theme recorded in the archive
        #[arg(long, default_value = "light")]
        theme: String,
    },

    /// Import a zip archive, replacing all memos and images
    Import {
        /// Archive file
        file: PathBuf,
    },

    /// Delete stored images no memo references
    Cleanup,

    /// Rewrite inline base64 images in memo content to blob files
    MigrateImages,

    /// Move the data directory and record the override in config.json
    MigrateDir {
        /// New data directory
        path: PathBuf,
    },

    /// Show the resolved data directory and image count
    Info {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

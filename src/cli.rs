use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pdfslice")]
#[command(about = "Extract a page range from a PDF into a new document")]
#[command(version)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show what a session sees after loading a PDF
    Info {
        /// PDF file to inspect
        path: PathBuf,

        /// Print the session snapshot as JSON
        #[arg(long)]
        json: bool,
    },

    /// Extract a page range to a new PDF
    #[command(alias = "cat")]
    Extract {
        /// PDF file to extract from
        path: PathBuf,

        /// Page range (e.g., "3-5", "7", "4-end")
        pages: String,

        /// Output file (defaults to "<name>_pages_<start>-<end>.pdf")
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

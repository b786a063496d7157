use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use sar_security::MatchMode;

#[derive(Parser)]
#[command(name = "sar")]
#[command(about = "Filter and redact an extracted mailbox export for a subject access request", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (default: ./sar.toml, then the per-user config)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Prune metadata, relocate or delete attachments, convert HTML bodies
    Normalize {
        /// Root of the extracted export
        root: PathBuf,

        /// Subject name or token; attachments whose name contains it are kept
        #[arg(long = "subject", required = true)]
        subjects: Vec<String>,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Blank identifying header fields and every email address
    RedactHeaders {
        /// Root of the normalized export
        root: PathBuf,

        /// Replacement text (default from config: [REDACTED])
        #[arg(long)]
        marker: Option<String>,

        /// Worker threads (0 = one per core)
        #[arg(long)]
        jobs: Option<usize>,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Redact the terms in the word list and report hits per file
    RedactWords {
        /// Root of the header-redacted export
        root: PathBuf,

        #[command(flatten)]
        words: WordArgs,

        /// Replacement text (default from config: [REDACTED])
        #[arg(long)]
        marker: Option<String>,

        /// Worker threads (0 = one per core)
        #[arg(long)]
        jobs: Option<usize>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Run all three stages in order
    Run {
        /// Root of the extracted export
        root: PathBuf,

        /// Subject name or token; attachments whose name contains it are kept
        #[arg(long = "subject", required = true)]
        subjects: Vec<String>,

        #[command(flatten)]
        words: WordArgs,

        /// Print the reports as JSON
        #[arg(long)]
        json: bool,

        /// Report what would change without touching the tree. The header and
        /// word reports then cover the tree as it is now: HTML bodies are not
        /// converted yet, so their hits are not counted
        #[arg(long)]
        dry_run: bool,
    },

    /// Show which stages have completed on a tree
    Status {
        /// Root of the export
        root: PathBuf,
    },
}

#[derive(Args)]
pub struct CommonArgs {
    /// Report what would change without touching the tree
    #[arg(long)]
    pub dry_run: bool,

    /// Refuse to run unless the previous stage has completed
    #[arg(long)]
    pub require_previous: bool,
}

#[derive(Args)]
pub struct WordArgs {
    /// Word list, one term per line (default from config: redact_words.txt)
    #[arg(long = "words")]
    pub list: Option<PathBuf>,

    /// word or substring
    #[arg(long)]
    pub match_mode: Option<MatchMode>,
}

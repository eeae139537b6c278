//! CLI argument definitions using clap
//!
//! Commands:
//! - blocksmith catalog --config <path>
//! - blocksmith schema <type> --levels core,styling --config <path>
//! - blocksmith validate [file] --config <path>
//! - blocksmith fix [file] --config <path>
//! - blocksmith format [file] --config <path>
//! - blocksmith create [file] --title <title> --config <path>
//! - blocksmith serve --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// blocksmith - schema-checked block content tooling for agent-driven CMS editing
#[derive(Parser, Debug)]
#[command(name = "blocksmith")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the block type catalog summary
    Catalog {
        /// Path to configuration file
        #[arg(long, default_value = "./blocksmith.json")]
        config: PathBuf,
    },

    /// Print the schema for one block type
    Schema {
        /// Namespaced type name, e.g. craft/heading
        type_name: String,

        /// Comma-separated levels (meta, core, styling, full)
        #[arg(long, value_delimiter = ',', default_value = "full")]
        levels: Vec<String>,

        /// Leave shared-definition references unresolved
        #[arg(long)]
        raw_refs: bool,

        /// Path to configuration file
        #[arg(long, default_value = "./blocksmith.json")]
        config: PathBuf,
    },

    /// Validate a block tree (from file or stdin)
    Validate {
        /// Tree file; stdin when omitted
        file: Option<PathBuf>,

        /// Path to configuration file
        #[arg(long, default_value = "./blocksmith.json")]
        config: PathBuf,
    },

    /// Auto-fix a block tree and re-validate (from file or stdin)
    Fix {
        /// Tree file; stdin when omitted
        file: Option<PathBuf>,

        /// Path to configuration file
        #[arg(long, default_value = "./blocksmith.json")]
        config: PathBuf,
    },

    /// Derive rendering markup for a block tree (from file or stdin)
    Format {
        /// Tree file; stdin when omitted
        file: Option<PathBuf>,

        /// Path to configuration file
        #[arg(long, default_value = "./blocksmith.json")]
        config: PathBuf,
    },

    /// Validate, format, and submit a tree as a draft document
    Create {
        /// Tree file; stdin when omitted
        file: Option<PathBuf>,

        /// Document title
        #[arg(long)]
        title: Option<String>,

        /// Document slug
        #[arg(long)]
        slug: Option<String>,

        /// Path to configuration file
        #[arg(long, default_value = "./blocksmith.json")]
        config: PathBuf,
    },

    /// Serve request envelopes, one JSON object per stdin line
    Serve {
        /// Path to configuration file
        #[arg(long, default_value = "./blocksmith.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

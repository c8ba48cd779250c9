use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::DEFAULT_DATA_DIR;

#[derive(Parser, Debug)]
#[command(name = "lexdesk")]
#[command(version, about = "A local catalog of legal texts, procedures and news")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory holding the snapshot database, config.yaml and downloads
    #[arg(long, global = true, default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,

    /// Act as this user; it becomes the persisted current user
    #[arg(long, global = true)]
    pub user: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Raise one catalog command
    Dispatch {
        /// Command name, e.g. "view-legal-text"
        command: String,

        /// JSON payload, e.g. '{"textId": "abc"}'
        #[arg(long, short = 'p')]
        payload: Option<String>,
    },

    /// Read "COMMAND [JSON]" lines from stdin and raise each one
    Shell,

    /// Search every collection ("key:value" tokens become filters)
    Search {
        /// Query text
        query: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List a collection
    List {
        /// legal-text, procedure, news, template, saved-search or favorite
        #[arg(value_name = "TYPE")]
        item_type: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Export the catalog as JSON
    Export {
        /// Write here instead of the downloads directory
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Import a previously exported JSON document
    Import {
        /// Export document to read
        file: PathBuf,
    },

    /// Print the command catalog
    Commands,
}

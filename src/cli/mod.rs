//! Command line interface for deepl-scraper.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::types::config::DEFAULT_CONFIG_FILE;

/// deepl-scraper - cached translation retrieval from the command line.
#[derive(Parser, Debug)]
#[command(name = "deepl-scraper")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file.
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Only print errors.
    #[arg(short, long)]
    pub quiet: bool,

    /// Command to run.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Writes a default configuration to the given directory.
    Init {
        /// Target directory (default: current directory).
        #[arg(short, long)]
        path: Option<PathBuf>,
    },

    /// Translates one or more texts.
    Translate {
        /// Texts to translate. More than one runs as a batch.
        #[arg(required = true)]
        text: Vec<String>,

        /// Source language (default: translator.default_source_lang).
        #[arg(short, long)]
        from: Option<String>,

        /// Target language.
        #[arg(short, long)]
        to: String,

        /// Run the batch on the worker pool.
        #[arg(long)]
        concurrent: bool,

        /// Print the result as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Starts the HTTP front-end.
    #[cfg(feature = "server")]
    Serve {
        /// Bind address.
        #[arg(long)]
        host: Option<String>,

        /// Bind port.
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Inspects or clears the translation cache.
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Diagnoses configuration and browser problems.
    Doctor,

    /// Shows version.
    Version,
}

/// Cache subcommands.
#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// Shows size, capacity and location.
    Stats,

    /// Lists cached translations, oldest first.
    List {
        /// Maximum entries to show.
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },

    /// Removes every cached translation.
    Clear,
}

//! CLI module - Command-line interface for Weatherlog
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand};

/// Weatherlog - saved weather lookups by location and date range
#[derive(Parser)]
#[command(name = "weatherlog")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the web server (default)
    #[command(alias = "daemon", alias = "web")]
    Serve,

    /// List all saved records, newest first
    #[command(alias = "ls", alias = "l")]
    List,

    /// Show one saved record with its current conditions
    #[command(alias = "i", alias = "info")]
    Show {
        /// Record ID
        id: String,
    },

    /// Fetch weather for a location and save it
    #[command(alias = "f")]
    Fetch {
        /// Location, e.g. "Boston" or "Paris,FR"
        location: String,
        /// Free-text date range the lookup is saved under
        date_range: String,
    },

    /// Delete a saved record
    #[command(alias = "rm", alias = "r")]
    Remove {
        /// Record ID
        id: String,
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },

    /// Create default config file
    #[command(alias = "--init")]
    Init,
}

pub use commands::*;

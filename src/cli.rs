use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "gunluk",
    version,
    about = "Daily mood journal with entertainment tracking"
)]
pub struct Cli {
    /// Config file to use instead of the default location.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Write today's journal entry.
    Write {
        /// Date the entry on this day (YYYY-MM-DD) instead of now.
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Add a book, game, movie, series, audiobook or Lego set.
    AddEntertainment,
    /// Search entertainments by name.
    Find { name: String },
    /// Show the latest journal entries with their entertainments.
    Recent {
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Run a SQL statement; extra arguments bind to `?` placeholders.
    Query { sql: String, params: Vec<String> },
    /// Move an entertainment's latest entry onto today's journal.
    Move,
    /// Print the journal text kept from the last composition.
    Draft,
    /// Browse recent entries full screen.
    Browse,
    /// Numbered menu, the default.
    Menu,
}

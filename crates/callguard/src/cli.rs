//! Command line definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Manage call-blocking rules and review blocked calls.
#[derive(Debug, Parser)]
#[command(name = "callguard", version)]
pub struct Cli {
    /// Configuration file (defaults to the platform config directory).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Database file, overriding the configuration.
    #[arg(long, global = true)]
    pub database: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Add a blocking rule.
    #[command(subcommand)]
    Add(RuleInput),

    /// Remove a blocking rule by id (see `list`).
    Remove {
        /// Kind of rule to remove.
        kind: RuleKind,
        /// Rule id.
        id: i64,
    },

    /// List blocking rules, newest first.
    List {
        /// Only list one kind of rule.
        kind: Option<RuleKind>,
    },

    /// Show rule counts.
    Summary,

    /// Delete every blocking rule.
    ClearRules,

    /// Screen a call handle (e.g. `tel:+14085550123`) as if it were ringing.
    ///
    /// Blocked calls are written to the history.
    Screen {
        /// Call handle or bare number.
        handle: String,
    },

    /// Show what would happen to a number without logging anything.
    Check {
        /// Phone number.
        number: String,
    },

    /// Show blocked-call history.
    History {
        /// Delete all history instead of showing it.
        #[arg(long)]
        clear: bool,
    },

    /// Show recent calls from an exported device call history.
    Calls {
        /// JSON file with an array of call entries.
        file: PathBuf,

        /// Block the caller at this position in the listing.
        #[arg(long)]
        block: Option<usize>,
    },
}

/// Rule to add.
#[derive(Debug, Subcommand)]
pub enum RuleInput {
    /// Block an exact number.
    Number {
        /// Phone number.
        number: String,
    },
    /// Block every number starting with a prefix.
    Prefix {
        /// Number prefix, e.g. `+1900`.
        prefix: String,
    },
    /// Block a contact's number.
    Contact {
        /// Phone number.
        number: String,
        /// Display name.
        #[arg(long)]
        name: Option<String>,
    },
}

/// Kind of blocking rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum RuleKind {
    /// Exact numbers.
    Number,
    /// Number prefixes.
    Prefix,
    /// Blocked contacts.
    Contact,
}

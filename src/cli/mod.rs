//! CLI argument parsing types.
//!
//! This module provides the command-line interface structure for the
//! `redmine` binary.

use std::time::Duration;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};

use crate::config::{Config, API_KEY_ENV, TIMEOUT_ENV, URL_ENV};
use crate::error::Result;

/// Redmine command-line interface.
#[derive(Parser, Debug)]
#[command(name = "redmine", about = "Redmine REST API CLI", version)]
pub struct Cli {
    /// Output results as JSON instead of a table.
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    /// Base URL of the Redmine instance.
    #[arg(long, global = true, env = URL_ENV)]
    pub url: Option<String>,

    /// API access key.
    #[arg(long, global = true, env = API_KEY_ENV, hide_env_values = true)]
    pub api_key: Option<String>,

    /// Per-request timeout in seconds.
    #[arg(long, global = true, env = TIMEOUT_ENV)]
    pub timeout: Option<u64>,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Build connection settings from the parsed flags.
    ///
    /// # Errors
    ///
    /// Returns a config error when the URL or API key is missing.
    pub fn config(&self) -> Result<Config> {
        let config = Config::new(
            self.url.clone().unwrap_or_default(),
            self.api_key.clone().unwrap_or_default(),
        )?;
        Ok(match self.timeout {
            Some(secs) => config.with_timeout(Duration::from_secs(secs)),
            None => config,
        })
    }

    /// Default tracing filter for the chosen verbosity.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "redmine_api=debug",
            _ => "redmine_api=trace",
        }
    }
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List entities with optional filtering and pagination.
    List {
        /// The type of entity to list.
        entity: Entity,

        /// Project id or identifier (required for wiki pages).
        #[arg(long)]
        project: Option<String>,

        /// Issue id (required for journals and relations).
        #[arg(long)]
        issue: Option<u64>,

        /// Status filter (`open`, `closed`, `*` or an id).
        #[arg(long)]
        status: Option<String>,

        /// Comma-separated include expansions.
        #[arg(long)]
        include: Option<String>,

        /// Sort expression, e.g. `priority:desc,id`.
        #[arg(long)]
        sort: Option<String>,

        /// Number of items per page.
        #[arg(long)]
        limit: Option<u32>,

        /// Number of items to skip.
        #[arg(long)]
        offset: Option<u32>,

        /// Fetch every page instead of a single one.
        #[arg(long, conflicts_with_all = ["limit", "offset"])]
        all: bool,
    },

    /// Show a single entity.
    Show {
        /// The type of entity to show.
        entity: Entity,

        /// Numeric id, project identifier or wiki page title.
        /// Not needed for `my-account`.
        id: Option<String>,

        /// Project id or identifier (required for wiki pages).
        #[arg(long)]
        project: Option<String>,

        /// Comma-separated include expansions.
        #[arg(long)]
        include: Option<String>,

        /// Historical wiki page version.
        #[arg(long)]
        version: Option<u32>,
    },

    /// Delete an entity.
    Delete {
        /// The type of entity to delete.
        entity: Entity,

        /// Numeric id, project identifier or wiki page title.
        id: String,

        /// Project id or identifier (required for wiki pages).
        #[arg(long)]
        project: Option<String>,
    },
}

/// Entity types that can be operated on.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Entity {
    /// A project.
    #[value(alias = "projects")]
    Project,
    /// An issue.
    #[value(alias = "issues")]
    Issue,
    /// A user account.
    #[value(alias = "users")]
    User,
    /// A user group.
    #[value(alias = "groups")]
    Group,
    /// Logged time.
    #[value(alias = "time-entries", alias = "time_entries")]
    TimeEntry,
    /// A wiki page.
    #[value(alias = "wiki-pages", alias = "wiki_pages")]
    Wiki,
    /// A file attachment.
    #[value(alias = "attachments")]
    Attachment,
    /// Issue history entries.
    #[value(alias = "journals")]
    Journal,
    /// An issue tracker.
    #[value(alias = "trackers")]
    Tracker,
    /// A news item.
    News,
    /// A relation between issues.
    #[value(alias = "relations")]
    Relation,
    /// The authenticated user's account.
    #[value(alias = "account")]
    MyAccount,
}

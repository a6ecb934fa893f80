//! Main CLI application structure

use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};

use super::output::{Output, OutputFormat};
use super::{entry, repo};
use crate::storage::{ConfigLoader, EntryStore, StoreConfig};

#[derive(Parser)]
#[command(name = "pea")]
#[command(author, version, about = "Named text snippets, versioned with git")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List entry names
    Ls,

    /// Print an entry
    Get {
        /// Entry name
        name: String,

        /// Read the entry as of a git revision (e.g. HEAD~1)
        #[arg(long)]
        rev: Option<String>,
    },

    /// Add an entry from a file, piped stdin, or the editor
    Add {
        /// Entry name
        name: String,

        /// Read content from this file
        file: Option<PathBuf>,
    },

    /// Open an existing entry in the editor
    Edit {
        /// Entry name
        name: String,
    },

    /// Delete an entry
    Rm {
        /// Entry name
        name: String,

        /// Show what would happen without deleting
        #[arg(long)]
        dry_run: bool,

        /// Undo the last delete of this entry via git revert
        #[arg(long, conflicts_with = "dry_run")]
        undo: bool,
    },

    /// Rename an entry
    Mv {
        /// Current name
        old: String,

        /// New name
        new: String,

        /// Show what would happen without renaming
        #[arg(long)]
        dry_run: bool,

        /// Record the rename as a chore commit
        #[arg(long)]
        chore: bool,
    },

    /// Show the commits that touched an entry
    History {
        /// Entry name
        name: String,

        /// Maximum number of commits
        #[arg(long, short = 'n', default_value = "20")]
        limit: usize,

        /// Oldest first
        #[arg(long)]
        reverse: bool,
    },

    /// Search entries by name, content and tags
    Search {
        /// Case-insensitive text to look for
        #[arg(default_value = "")]
        query: String,

        /// Require a tag (repeatable)
        #[arg(long = "tag", short = 't')]
        tags: Vec<String>,
    },

    /// Set the git remote for the store
    Remote {
        /// Remote URL
        url: String,
    },

    /// Pull from and push to the remote
    Sync,

    /// Show resolved configuration
    Config,
}

/// Settings and output shared by every command in one invocation
pub struct Session {
    pub output: Rc<Output>,
    pub loader: ConfigLoader,
    pub config: StoreConfig,
}

impl Session {
    pub fn load(output: Rc<Output>) -> Result<Self> {
        let loader = ConfigLoader::from_process().context("Failed to resolve pea paths")?;
        let config = loader.load()?;
        output.verbose_ctx(
            "config",
            &format!(
                "store={} git={} remote={:?}",
                config.store_dir.display(),
                config.git_enabled,
                config.remote_url
            ),
        );
        Ok(Self {
            output,
            loader,
            config,
        })
    }

    /// Opens the store, bootstrapping git if needed
    pub fn open_store(&self) -> Result<EntryStore> {
        let store = EntryStore::open(&self.config, self.output.clone())
            .with_context(|| format!("Failed to open store {}", self.config.store_dir.display()))?;
        Ok(store)
    }

    pub fn editor(&self) -> String {
        self.loader.editor(&self.config)
    }
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let output = Rc::new(Output::new(cli.format, cli.verbose));

    output.verbose("pea starting");
    let session = Session::load(output)?;

    match cli.command {
        Commands::Ls => entry::list(&session),
        Commands::Get { name, rev } => entry::get(&session, &name, rev.as_deref()),
        Commands::Add { name, file } => entry::add(&session, &name, file.as_deref()),
        Commands::Edit { name } => entry::edit(&session, &name),
        Commands::Rm {
            name,
            dry_run,
            undo,
        } => {
            if undo {
                entry::undo_remove(&session, &name)
            } else {
                entry::remove(&session, &name, dry_run)
            }
        }
        Commands::Mv {
            old,
            new,
            dry_run,
            chore,
        } => entry::rename(&session, &old, &new, dry_run, chore),
        Commands::History {
            name,
            limit,
            reverse,
        } => repo::history(&session, &name, limit, reverse),
        Commands::Search { query, tags } => entry::search(&session, &query, &tags),
        Commands::Remote { url } => repo::set_remote(&session, &url),
        Commands::Sync => repo::sync(&session),
        Commands::Config => repo::show_config(&session),
    }
}

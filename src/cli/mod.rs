//! # Command-Line Interface
//!
//! User-facing CLI commands and output formatting.
//!
//! ## Commands
//!
//! | Group | Purpose | Examples |
//! |-------|---------|----------|
//! | Entries | Create, read, change | `add`, `get`, `edit`, `rm`, `mv` |
//! | Lookup | Find entries | `ls`, `search --tag go` |
//! | History | Git-backed | `history`, `get --rev HEAD~1`, `rm --undo` |
//! | Remote | Sharing | `remote <url>`, `sync` |
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable output; `get` prints the raw body
//! - `json` - Machine-parseable JSON
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for debug output, including each git step:
//! ```bash
//! pea --verbose add notes notes.md
//! ```
//!
//! Git failures during routine commits are printed as warnings and never fail
//! the command.

mod app;
mod editor;
mod entry;
mod output;
mod repo;

pub use app::{run, Cli, Commands, Session};
pub use output::{Output, OutputFormat};

//! # Storage Layer
//!
//! Entries are plain files in a flat store directory, versioned through
//! [`crate::vcs`].
//!
//! ## Layout
//!
//! ```text
//! ~/.pea/
//! ├── config.toml           # Optional settings (created on first run)
//! └── prompts/              # Default store
//!     ├── .git/             # When versioning is enabled
//!     ├── notes.md          # Current extension
//!     └── old_entry.txt     # Legacy extension, still fully supported
//! ```
//!
//! ## Write Safety
//!
//! - Writes go to `<file>.tmp` and are renamed into place
//! - The filesystem change always happens before the commit
//!
//! ## Key Types
//!
//! - [`ConfigLoader`] - Resolves [`StoreConfig`] from env and config file
//! - [`PathResolver`] - Maps names to `.md` / `.txt` files
//! - [`EntryStore`] - Read, write, search, rename and delete entries

mod config;
mod entries;
mod error;
mod paths;

pub use config::{
    resolve_editor, ConfigError, ConfigFile, ConfigLoader, ConfigSource, Environment, PeaPaths,
    StoreConfig, EDITOR_ENV, FALLBACK_EDITORS, STORE_ENV,
};
pub use entries::{DeleteOutcome, EntryRecord, EntryStore, RenameOutcome, WriteOutcome};
pub use error::StoreError;
pub use paths::{EntryPath, Extension, PathResolver};

//! pea - named text snippets, versioned with git
//!
//! Entries are small files in a flat store directory. Every change is
//! committed to a local git repository and pushed when a remote is
//! configured. Entries may start with a `---` front matter block carrying
//! tags, which `search` can filter on.

pub mod cli;
pub mod domain;
pub mod storage;
pub mod vcs;

pub use domain::{EntryName, TagSet};
pub use storage::{ConfigLoader, EntryStore, StoreConfig, StoreError};

//! Store errors

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::ConfigError;
use crate::domain::NameError;
use crate::vcs::GitError;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    InvalidName(#[from] NameError),

    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("not found in revision {rev}: {name}")]
    NotFoundInRevision { rev: String, name: String },

    #[error("empty content: {0}")]
    EmptyContent(String),

    #[error("no history: no commits found for {0}")]
    NoHistory(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error(transparent)]
    Git(GitError),

    #[error("failed to {action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl From<GitError> for StoreError {
    fn from(e: GitError) -> Self {
        match e {
            GitError::NoHistory(path) => StoreError::NoHistory(path),
            other => StoreError::Git(other),
        }
    }
}

impl StoreError {
    /// Builds a `map_err` adapter that records what was being done to which path
    pub(crate) fn io(action: &'static str, path: &Path) -> impl FnOnce(io::Error) -> Self {
        let path = path.to_path_buf();
        move |source| StoreError::Io {
            action,
            path,
            source,
        }
    }

    /// Returns true for the "entry does not exist" family of errors
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StoreError::NotFound(_) | StoreError::NotFoundInRevision { .. }
        )
    }
}

//! # Versioning
//!
//! Every store mutation is recorded in a version-control history. The
//! mechanics live behind [`VersioningBackend`]:
//!
//! | Backend | Used when |
//! |---------|-----------|
//! | [`GitBackend`] | `git` is on `PATH` and versioning is enabled |
//! | [`NoopBackend`] | versioning disabled in config, or `git` missing |
//! | `MemoryBackend` | unit tests only, no subprocesses |
//!
//! [`Versioning`] composes backend primitives into the operations the
//! store uses and routes each result through exactly one policy:
//!
//! | Operation | Policy |
//! |-----------|--------|
//! | bootstrap | fatal |
//! | add-and-commit | best effort |
//! | remove-and-commit | best effort |
//! | push-if-remote | best effort |
//! | revert-last-commit-for-path | fatal |
//! | show-at-revision | fatal |
//! | set-remote | fatal |
//! | history | fatal |
//! | sync | fatal |
//!
//! Best-effort failures are written to the [`Diagnostics`] sink and
//! swallowed: the filesystem change they follow has already happened.
//!
//! ## Concurrency
//!
//! Nothing here coordinates concurrent invocations against one store. Two
//! processes writing different entries may race on the git index; the loser's
//! commit fails (best effort, logged) while its file write survives.

mod git;
#[cfg(test)]
mod memory;
mod noop;

use std::rc::Rc;

use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use thiserror::Error;

pub use git::GitBackend;
#[cfg(test)]
pub use memory::MemoryBackend;
pub use noop::NoopBackend;

#[derive(Debug, Error)]
pub enum GitError {
    #[error("git {op} failed: {detail}")]
    Command { op: String, detail: String },

    #[error("failed to run git: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("no commits found for {0}")]
    NoHistory(String),

    #[error("no remote 'origin' configured")]
    NoRemote,

    #[error("versioning is disabled for this store")]
    Disabled,

    #[error("unexpected git output: {0}")]
    Parse(String),
}

/// One line of an entry's history, newest first unless reversed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryLine {
    pub commit: String,
    pub date: DateTime<FixedOffset>,
    pub subject: String,
}

/// Where versioning warnings and debug chatter go
pub trait Diagnostics {
    /// Reports a non-fatal failure
    fn warn(&self, message: &str);

    /// Reports progress detail, shown only in verbose mode
    fn debug(&self, _message: &str) {}
}

/// Discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl Diagnostics for Silent {
    fn warn(&self, _message: &str) {}
}

/// Version-control primitives, addressed relative to the store directory
///
/// Paths are file names inside the store (e.g. `notes.md`).
pub trait VersioningBackend {
    /// Short backend name for diagnostics
    fn name(&self) -> &'static str;

    /// Returns false for backends that record nothing
    fn is_enabled(&self) -> bool {
        true
    }

    /// Initializes the repository and identity, and adds `origin` if missing.
    /// Must be idempotent.
    fn bootstrap(&self, remote: Option<&str>) -> Result<(), GitError>;

    /// Stages the current state of `paths` (additions, edits, disappearances)
    fn stage(&self, paths: &[String]) -> Result<(), GitError>;

    /// Stages the removal of `paths`
    fn stage_removal(&self, paths: &[String]) -> Result<(), GitError>;

    /// Commits the index. Returns false when there was nothing to commit.
    fn commit(&self, message: &str) -> Result<bool, GitError>;

    /// Returns the configured `origin` URL, if any
    fn remote_url(&self) -> Result<Option<String>, GitError>;

    /// Pushes the current branch to `origin`, setting upstream
    fn push(&self) -> Result<(), GitError>;

    /// Most recent commit touching `path`
    fn last_commit_for_path(&self, path: &str) -> Result<Option<String>, GitError>;

    /// Reverts `commit` without opening an editor
    fn revert(&self, commit: &str) -> Result<(), GitError>;

    /// Content of `path` at `rev`
    fn show_at_revision(&self, rev: &str, path: &str) -> Result<Vec<u8>, GitError>;

    /// Sets or adds the `origin` URL, overwriting an existing one
    fn set_remote(&self, url: &str) -> Result<(), GitError>;

    /// Commits touching `path`, following renames
    fn history(&self, path: &str, limit: usize, reverse: bool)
        -> Result<Vec<HistoryLine>, GitError>;

    /// Pulls (rebasing local work) from `origin`
    fn pull(&self) -> Result<(), GitError>;
}

/// Log-and-continue handling for routine operations
///
/// Returns `None` after reporting the failure.
pub fn best_effort<T>(
    diagnostics: &dyn Diagnostics,
    op: &str,
    result: Result<T, GitError>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e @ GitError::Command { .. }) => {
            diagnostics.warn(&format!("warning: {}", e));
            None
        }
        Err(e) => {
            diagnostics.warn(&format!("warning: git {} failed: {}", op, e));
            None
        }
    }
}

/// Propagating handling for operations the caller depends on
pub fn fatal<T>(
    diagnostics: &dyn Diagnostics,
    op: &str,
    result: Result<T, GitError>,
) -> Result<T, GitError> {
    if let Err(e) = &result {
        diagnostics.debug(&format!("git {} failed: {}", op, e));
    }
    result
}

/// Store-level versioning operations over a backend
pub struct Versioning {
    backend: Box<dyn VersioningBackend>,
    diagnostics: Rc<dyn Diagnostics>,
}

impl Versioning {
    pub fn new(backend: Box<dyn VersioningBackend>, diagnostics: Rc<dyn Diagnostics>) -> Self {
        Self {
            backend,
            diagnostics,
        }
    }

    /// Versioning that records nothing
    pub fn disabled() -> Self {
        Self::new(Box::new(NoopBackend), Rc::new(Silent))
    }

    pub fn backend(&self) -> &dyn VersioningBackend {
        self.backend.as_ref()
    }

    pub fn is_enabled(&self) -> bool {
        self.backend.is_enabled()
    }

    pub fn diagnostics(&self) -> &dyn Diagnostics {
        self.diagnostics.as_ref()
    }

    /// Initializes the repository; an existing one is left alone
    pub fn bootstrap(&self, remote: Option<&str>) -> Result<(), GitError> {
        fatal(self.diagnostics(), "init", self.backend.bootstrap(remote))
    }

    /// Stages `paths` and commits, then pushes if a remote is configured
    pub fn add_and_commit(&self, paths: &[String], message: &str) {
        let result = self
            .backend
            .stage(paths)
            .and_then(|()| self.backend.commit(message));
        self.finish_commit("commit", result, message);
    }

    /// Stages removal of `paths` and commits, then pushes if a remote is configured
    pub fn remove_and_commit(&self, paths: &[String], message: &str) {
        let result = self
            .backend
            .stage_removal(paths)
            .and_then(|()| self.backend.commit(message));
        self.finish_commit("rm", result, message);
    }

    fn finish_commit(&self, op: &str, result: Result<bool, GitError>, message: &str) {
        match best_effort(self.diagnostics(), op, result) {
            Some(true) => {
                self.diagnostics.debug(&format!("committed: {}", message));
                self.push_if_remote_configured();
            }
            Some(false) => self.diagnostics.debug("nothing to commit"),
            None => {}
        }
    }

    /// Pushes when `origin` exists; a no-op otherwise
    pub fn push_if_remote_configured(&self) {
        let result = self.backend.remote_url().and_then(|remote| match remote {
            Some(_) => self.backend.push().map(|()| true),
            None => Ok(false),
        });
        if let Some(true) = best_effort(self.diagnostics(), "push", result) {
            self.diagnostics.debug("pushed to origin");
        }
    }

    /// Reverts the most recent commit touching `path`
    pub fn revert_last_commit_for_path(&self, path: &str) -> Result<(), GitError> {
        let result = self
            .backend
            .last_commit_for_path(path)
            .and_then(|commit| commit.ok_or_else(|| GitError::NoHistory(path.to_string())))
            .and_then(|commit| self.backend.revert(&commit));
        fatal(self.diagnostics(), "revert", result)
    }

    pub fn show_at_revision(&self, rev: &str, path: &str) -> Result<Vec<u8>, GitError> {
        fatal(
            self.diagnostics(),
            "show",
            self.backend.show_at_revision(rev, path),
        )
    }

    /// Points `origin` at `url`; the only way an existing remote is replaced
    pub fn set_remote(&self, url: &str) -> Result<(), GitError> {
        fatal(self.diagnostics(), "remote", self.backend.set_remote(url))
    }

    pub fn history(
        &self,
        path: &str,
        limit: usize,
        reverse: bool,
    ) -> Result<Vec<HistoryLine>, GitError> {
        fatal(
            self.diagnostics(),
            "log",
            self.backend.history(path, limit, reverse),
        )
    }

    /// Pulls from and pushes to `origin`
    pub fn sync(&self) -> Result<(), GitError> {
        if !self.is_enabled() {
            return fatal(self.diagnostics(), "sync", Err(GitError::Disabled));
        }
        let result = self.backend.remote_url().and_then(|remote| {
            if remote.is_none() {
                return Err(GitError::NoRemote);
            }
            self.backend.pull()?;
            self.backend.push()
        });
        fatal(self.diagnostics(), "sync", result)
    }
}

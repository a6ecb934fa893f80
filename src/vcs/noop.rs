//! Versioning disabled

use super::{GitError, HistoryLine, VersioningBackend};

/// Backend for stores without version control
///
/// Routine operations succeed without doing anything. Operations that only
/// make sense with a history fail.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopBackend;

impl VersioningBackend for NoopBackend {
    fn name(&self) -> &'static str {
        "disabled"
    }

    fn is_enabled(&self) -> bool {
        false
    }

    fn bootstrap(&self, _remote: Option<&str>) -> Result<(), GitError> {
        Ok(())
    }

    fn stage(&self, _paths: &[String]) -> Result<(), GitError> {
        Ok(())
    }

    fn stage_removal(&self, _paths: &[String]) -> Result<(), GitError> {
        Ok(())
    }

    fn commit(&self, _message: &str) -> Result<bool, GitError> {
        Ok(false)
    }

    fn remote_url(&self) -> Result<Option<String>, GitError> {
        Ok(None)
    }

    fn push(&self) -> Result<(), GitError> {
        Ok(())
    }

    fn last_commit_for_path(&self, _path: &str) -> Result<Option<String>, GitError> {
        Ok(None)
    }

    fn revert(&self, _commit: &str) -> Result<(), GitError> {
        Err(GitError::Disabled)
    }

    fn show_at_revision(&self, _rev: &str, _path: &str) -> Result<Vec<u8>, GitError> {
        Err(GitError::Disabled)
    }

    fn set_remote(&self, _url: &str) -> Result<(), GitError> {
        Err(GitError::Disabled)
    }

    fn history(
        &self,
        _path: &str,
        _limit: usize,
        _reverse: bool,
    ) -> Result<Vec<HistoryLine>, GitError> {
        Ok(Vec::new())
    }

    fn pull(&self) -> Result<(), GitError> {
        Err(GitError::Disabled)
    }
}

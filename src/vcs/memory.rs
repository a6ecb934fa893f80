//! In-process versioning for tests
//!
//! Keeps an index and a linear list of commit snapshots in memory while
//! reading and writing real files in the store directory, so store-level
//! behavior (undo, historical reads) can be exercised without a `git` binary.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::rc::Rc;

use chrono::{DateTime, FixedOffset, Utc};

use super::{GitError, HistoryLine, VersioningBackend};

type Tree = BTreeMap<String, Vec<u8>>;

#[derive(Debug, Clone)]
struct Snapshot {
    id: String,
    message: String,
    date: DateTime<FixedOffset>,
    tree: Tree,
}

#[derive(Debug, Default)]
struct State {
    index: Tree,
    commits: Vec<Snapshot>,
    remote: Option<String>,
    pushes: usize,
    fail_commits: bool,
    fail_push: bool,
}

impl State {
    fn head_tree(&self) -> Tree {
        self.commits.last().map(|c| c.tree.clone()).unwrap_or_default()
    }

    fn parent_tree(&self, position: usize) -> Option<&Tree> {
        position.checked_sub(1).map(|p| &self.commits[p].tree)
    }

    fn touches(&self, position: usize, path: &str) -> bool {
        let before = self.parent_tree(position).and_then(|t| t.get(path));
        before != self.commits[position].tree.get(path)
    }

    /// Resolves `HEAD`, `HEAD~N`, `HEAD^` or a commit id to a position
    fn resolve(&self, rev: &str) -> Option<usize> {
        let head = self.commits.len().checked_sub(1)?;
        if let Some(rest) = rev.strip_prefix("HEAD") {
            let back = match rest {
                "" => 0,
                "^" => 1,
                _ => rest.strip_prefix('~')?.parse::<usize>().ok()?,
            };
            return head.checked_sub(back);
        }
        self.commits.iter().position(|c| c.id == rev)
    }

    fn record(&mut self, message: &str) {
        let id = format!("{:07x}", 0xa11ce + self.commits.len());
        self.commits.push(Snapshot {
            id,
            message: message.to_string(),
            date: Utc::now().fixed_offset(),
            tree: self.index.clone(),
        });
    }
}

/// Versioning backend that never leaves the process
///
/// Clones share state, so a test can keep a handle for inspection after
/// handing one to the store.
#[derive(Debug, Clone)]
pub struct MemoryBackend {
    dir: PathBuf,
    state: Rc<RefCell<State>>,
}

impl MemoryBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            state: Rc::new(RefCell::new(State::default())),
        }
    }

    /// Makes every commit fail, for exercising best-effort handling
    pub fn set_fail_commits(&self, fail: bool) {
        self.state.borrow_mut().fail_commits = fail;
    }

    /// Makes every push fail
    pub fn set_fail_push(&self, fail: bool) {
        self.state.borrow_mut().fail_push = fail;
    }

    /// Commit messages, oldest first
    pub fn commit_messages(&self) -> Vec<String> {
        self.state
            .borrow()
            .commits
            .iter()
            .map(|c| c.message.clone())
            .collect()
    }

    pub fn push_count(&self) -> usize {
        self.state.borrow().pushes
    }

    fn read_worktree(&self, path: &str) -> Result<Option<Vec<u8>>, GitError> {
        match fs::read(self.dir.join(path)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(GitError::Command {
                op: "add".to_string(),
                detail: e.to_string(),
            }),
        }
    }

    fn write_worktree(&self, path: &str, content: Option<&Vec<u8>>) -> Result<(), GitError> {
        let full = self.dir.join(path);
        let result = match content {
            Some(bytes) => fs::write(&full, bytes),
            None => match fs::remove_file(&full) {
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
                other => other,
            },
        };
        result.map_err(|e| GitError::Command {
            op: "revert".to_string(),
            detail: e.to_string(),
        })
    }
}

fn pathspec_error(op: &str, path: &str) -> GitError {
    GitError::Command {
        op: op.to_string(),
        detail: format!("pathspec '{}' did not match any files", path),
    }
}

impl VersioningBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn bootstrap(&self, remote: Option<&str>) -> Result<(), GitError> {
        let mut state = self.state.borrow_mut();
        if state.remote.is_none() {
            state.remote = remote.map(str::to_string);
        }
        Ok(())
    }

    fn stage(&self, paths: &[String]) -> Result<(), GitError> {
        for path in paths {
            let content = self.read_worktree(path)?;
            let mut state = self.state.borrow_mut();
            match content {
                Some(bytes) => {
                    state.index.insert(path.clone(), bytes);
                }
                None => {
                    if state.index.remove(path).is_none() {
                        return Err(pathspec_error("add", path));
                    }
                }
            }
        }
        Ok(())
    }

    fn stage_removal(&self, paths: &[String]) -> Result<(), GitError> {
        let mut state = self.state.borrow_mut();
        for path in paths {
            if state.index.remove(path).is_none() {
                return Err(pathspec_error("rm", path));
            }
        }
        Ok(())
    }

    fn commit(&self, message: &str) -> Result<bool, GitError> {
        let mut state = self.state.borrow_mut();
        if state.fail_commits {
            return Err(GitError::Command {
                op: "commit".to_string(),
                detail: "simulated failure".to_string(),
            });
        }
        if state.index == state.head_tree() {
            return Ok(false);
        }
        state.record(message);
        Ok(true)
    }

    fn remote_url(&self) -> Result<Option<String>, GitError> {
        Ok(self.state.borrow().remote.clone())
    }

    fn push(&self) -> Result<(), GitError> {
        let mut state = self.state.borrow_mut();
        if state.fail_push {
            return Err(GitError::Command {
                op: "push".to_string(),
                detail: "simulated failure".to_string(),
            });
        }
        state.pushes += 1;
        Ok(())
    }

    fn last_commit_for_path(&self, path: &str) -> Result<Option<String>, GitError> {
        let state = self.state.borrow();
        Ok((0..state.commits.len())
            .rev()
            .find(|&i| state.touches(i, path))
            .map(|i| state.commits[i].id.clone()))
    }

    fn revert(&self, commit: &str) -> Result<(), GitError> {
        let (message, restore) = {
            let state = self.state.borrow();
            let position = state.resolve(commit).ok_or_else(|| GitError::Command {
                op: "revert".to_string(),
                detail: format!("bad revision '{}'", commit),
            })?;
            let empty = Tree::new();
            let before = state.parent_tree(position).unwrap_or(&empty);
            let after = &state.commits[position].tree;

            let paths: BTreeSet<&String> = before.keys().chain(after.keys()).collect();
            let restore: Vec<(String, Option<Vec<u8>>)> = paths
                .into_iter()
                .filter(|p| before.get(*p) != after.get(*p))
                .map(|p| (p.clone(), before.get(p).cloned()))
                .collect();
            let message = format!("Revert \"{}\"", state.commits[position].message);
            (message, restore)
        };

        for (path, content) in &restore {
            self.write_worktree(path, content.as_ref())?;
            let mut state = self.state.borrow_mut();
            match content {
                Some(bytes) => state.index.insert(path.clone(), bytes.clone()),
                None => state.index.remove(path),
            };
        }

        self.state.borrow_mut().record(&message);
        Ok(())
    }

    fn show_at_revision(&self, rev: &str, path: &str) -> Result<Vec<u8>, GitError> {
        let state = self.state.borrow();
        let position = state.resolve(rev).ok_or_else(|| GitError::Command {
            op: "show".to_string(),
            detail: format!("invalid object name '{}'", rev),
        })?;
        state.commits[position]
            .tree
            .get(path)
            .cloned()
            .ok_or_else(|| GitError::Command {
                op: "show".to_string(),
                detail: format!("path '{}' does not exist in '{}'", path, rev),
            })
    }

    fn set_remote(&self, url: &str) -> Result<(), GitError> {
        self.state.borrow_mut().remote = Some(url.to_string());
        Ok(())
    }

    fn history(
        &self,
        path: &str,
        limit: usize,
        reverse: bool,
    ) -> Result<Vec<HistoryLine>, GitError> {
        let state = self.state.borrow();
        let mut lines: Vec<HistoryLine> = (0..state.commits.len())
            .rev()
            .filter(|&i| state.touches(i, path))
            .take(limit)
            .map(|i| {
                let c = &state.commits[i];
                HistoryLine {
                    commit: c.id.clone(),
                    date: c.date,
                    subject: c.message.lines().next().unwrap_or_default().to_string(),
                }
            })
            .collect();
        if reverse {
            lines.reverse();
        }
        Ok(lines)
    }

    fn pull(&self) -> Result<(), GitError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn commit_file(backend: &MemoryBackend, dir: &TempDir, name: &str, content: &str, msg: &str) {
        fs::write(dir.path().join(name), content).unwrap();
        backend.stage(&[name.to_string()]).unwrap();
        backend.commit(msg).unwrap();
    }

    #[test]
    fn resolves_relative_revisions() {
        let dir = TempDir::new().unwrap();
        let backend = MemoryBackend::new(dir.path());
        commit_file(&backend, &dir, "r.md", "v1\n", "one");
        commit_file(&backend, &dir, "r.md", "v2\n", "two");

        assert_eq!(backend.show_at_revision("HEAD", "r.md").unwrap(), b"v2\n");
        assert_eq!(backend.show_at_revision("HEAD~1", "r.md").unwrap(), b"v1\n");
        assert_eq!(backend.show_at_revision("HEAD^", "r.md").unwrap(), b"v1\n");
        assert!(backend.show_at_revision("HEAD~2", "r.md").is_err());
    }

    #[test]
    fn unchanged_index_commits_nothing() {
        let dir = TempDir::new().unwrap();
        let backend = MemoryBackend::new(dir.path());
        commit_file(&backend, &dir, "a.md", "x", "one");

        backend.stage(&["a.md".to_string()]).unwrap();
        assert!(!backend.commit("again").unwrap());
        assert_eq!(backend.commit_messages(), vec!["one"]);
    }

    #[test]
    fn revert_restores_removed_file() {
        let dir = TempDir::new().unwrap();
        let backend = MemoryBackend::new(dir.path());
        commit_file(&backend, &dir, "a.md", "keep me\n", "add");

        fs::remove_file(dir.path().join("a.md")).unwrap();
        backend.stage_removal(&["a.md".to_string()]).unwrap();
        backend.commit("remove").unwrap();

        let last = backend.last_commit_for_path("a.md").unwrap().unwrap();
        backend.revert(&last).unwrap();

        assert_eq!(fs::read(dir.path().join("a.md")).unwrap(), b"keep me\n");
        assert_eq!(backend.commit_messages().last().unwrap(), "Revert \"remove\"");
    }

    #[test]
    fn history_lists_touching_commits() {
        let dir = TempDir::new().unwrap();
        let backend = MemoryBackend::new(dir.path());
        commit_file(&backend, &dir, "a.md", "1", "a one");
        commit_file(&backend, &dir, "b.md", "1", "b one");
        commit_file(&backend, &dir, "a.md", "2", "a two");

        let subjects: Vec<_> = backend
            .history("a.md", 10, false)
            .unwrap()
            .into_iter()
            .map(|l| l.subject)
            .collect();
        assert_eq!(subjects, vec!["a two", "a one"]);

        let oldest = backend.history("a.md", 10, true).unwrap();
        assert_eq!(oldest[0].subject, "a one");
    }
}

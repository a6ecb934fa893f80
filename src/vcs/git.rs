//! Versioning through the `git` executable

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use chrono::DateTime;

use super::{GitError, HistoryLine, VersioningBackend};

const DEFAULT_USER_NAME: &str = "pea";
const DEFAULT_USER_EMAIL: &str = "pea@localhost";

/// Runs `git` subprocesses inside the store directory
#[derive(Debug, Clone)]
pub struct GitBackend {
    store: PathBuf,
    git: PathBuf,
}

impl GitBackend {
    /// Creates a backend using an explicit `git` executable
    pub fn new(store: impl Into<PathBuf>, git: impl Into<PathBuf>) -> Self {
        Self {
            store: store.into(),
            git: git.into(),
        }
    }

    /// Locates `git` on `PATH`. Returns `None` when it is not installed.
    pub fn discover(store: impl Into<PathBuf>) -> Option<Self> {
        which::which("git").ok().map(|git| Self::new(store, git))
    }

    pub fn store(&self) -> &Path {
        &self.store
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.git);
        cmd.current_dir(&self.store);
        cmd
    }

    fn output(&self, args: &[&str]) -> Result<Output, GitError> {
        Ok(self.command().args(args).output()?)
    }

    /// Runs git and returns stdout, turning a non-zero exit into an error
    fn run(&self, op: &str, args: &[&str]) -> Result<Vec<u8>, GitError> {
        let output = self.output(args)?;
        if output.status.success() {
            Ok(output.stdout)
        } else {
            Err(command_error(op, &output))
        }
    }

    /// Runs git and reports only whether it exited successfully
    fn succeeds(&self, args: &[&str]) -> Result<bool, GitError> {
        Ok(self.output(args)?.status.success())
    }

    fn config_value(&self, key: &str) -> Result<Option<String>, GitError> {
        let output = self.output(&["config", "--get", key])?;
        let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok((output.status.success() && !value.is_empty()).then_some(value))
    }

    fn ensure_identity(&self) -> Result<(), GitError> {
        if self.config_value("user.name")?.is_none() {
            self.run("config", &["config", "user.name", DEFAULT_USER_NAME])?;
        }
        if self.config_value("user.email")?.is_none() {
            self.run("config", &["config", "user.email", DEFAULT_USER_EMAIL])?;
        }
        Ok(())
    }

    fn set_remote_if_missing(&self, url: &str) -> Result<(), GitError> {
        if self.succeeds(&["remote", "get-url", "origin"])? {
            return Ok(());
        }
        self.run("remote add", &["remote", "add", "origin", url])?;
        Ok(())
    }

    fn has_commits(&self) -> Result<bool, GitError> {
        self.succeeds(&["rev-parse", "--verify", "--quiet", "HEAD"])
    }

    fn current_branch(&self) -> Result<String, GitError> {
        let out = self.run("symbolic-ref", &["symbolic-ref", "--short", "HEAD"])?;
        Ok(String::from_utf8_lossy(&out).trim().to_string())
    }
}

fn command_error(op: &str, output: &Output) -> GitError {
    let mut detail = String::from_utf8_lossy(&output.stderr).trim().to_string();
    if detail.is_empty() {
        detail = String::from_utf8_lossy(&output.stdout).trim().to_string();
    }
    if detail.is_empty() {
        detail = output.status.to_string();
    }
    GitError::Command {
        op: op.to_string(),
        detail,
    }
}

fn with_paths<'a>(mut args: Vec<&'a str>, paths: &'a [String]) -> Vec<&'a str> {
    args.push("--");
    args.extend(paths.iter().map(String::as_str));
    args
}

/// Parses `%h%x09%cI%x09%s` log lines
fn parse_history(raw: &str) -> Result<Vec<HistoryLine>, GitError> {
    raw.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let mut parts = line.splitn(3, '\t');
            let (Some(commit), Some(date), Some(subject)) =
                (parts.next(), parts.next(), parts.next())
            else {
                return Err(GitError::Parse(line.to_string()));
            };
            let date = DateTime::parse_from_rfc3339(date)
                .map_err(|e| GitError::Parse(format!("{}: {}", line, e)))?;
            Ok(HistoryLine {
                commit: commit.to_string(),
                date,
                subject: subject.to_string(),
            })
        })
        .collect()
}

impl VersioningBackend for GitBackend {
    fn name(&self) -> &'static str {
        "git"
    }

    fn bootstrap(&self, remote: Option<&str>) -> Result<(), GitError> {
        if !self.store.join(".git").exists() {
            self.run("init", &["init"])?;
            self.ensure_identity()?;
        }

        if let Some(url) = remote {
            self.set_remote_if_missing(url)?;
        }
        Ok(())
    }

    fn stage(&self, paths: &[String]) -> Result<(), GitError> {
        self.run("add", &with_paths(vec!["add", "-A"], paths))?;
        Ok(())
    }

    fn stage_removal(&self, paths: &[String]) -> Result<(), GitError> {
        self.run("rm", &with_paths(vec!["rm", "-f"], paths))?;
        Ok(())
    }

    fn commit(&self, message: &str) -> Result<bool, GitError> {
        let output = self.output(&["commit", "-m", message])?;
        if output.status.success() {
            return Ok(true);
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        if stdout.contains("nothing to commit")
            || stdout.contains("nothing added to commit")
            || stdout.contains("no changes added to commit")
        {
            Ok(false)
        } else {
            Err(command_error("commit", &output))
        }
    }

    fn remote_url(&self) -> Result<Option<String>, GitError> {
        self.config_value("remote.origin.url")
    }

    fn push(&self) -> Result<(), GitError> {
        self.run("push", &["push", "-u", "origin", "HEAD"])?;
        Ok(())
    }

    fn last_commit_for_path(&self, path: &str) -> Result<Option<String>, GitError> {
        if !self.has_commits()? {
            return Ok(None);
        }
        let out = self.run("log", &["log", "-n1", "--format=%H", "--", path])?;
        let sha = String::from_utf8_lossy(&out).trim().to_string();
        Ok((!sha.is_empty()).then_some(sha))
    }

    fn revert(&self, commit: &str) -> Result<(), GitError> {
        self.run("revert", &["revert", "--no-edit", commit])?;
        Ok(())
    }

    fn show_at_revision(&self, rev: &str, path: &str) -> Result<Vec<u8>, GitError> {
        let spec = format!("{}:{}", rev, path);
        self.run("show", &["show", &spec])
    }

    fn set_remote(&self, url: &str) -> Result<(), GitError> {
        if self.succeeds(&["remote", "set-url", "origin", url])? {
            return Ok(());
        }
        self.run("remote add", &["remote", "add", "origin", url])?;
        Ok(())
    }

    fn history(
        &self,
        path: &str,
        limit: usize,
        reverse: bool,
    ) -> Result<Vec<HistoryLine>, GitError> {
        if !self.has_commits()? {
            return Ok(Vec::new());
        }

        let limit = limit.to_string();
        let mut args = vec![
            "log",
            "--follow",
            "--format=%h%x09%cI%x09%s",
            "--max-count",
            &limit,
        ];
        if reverse {
            args.push("--reverse");
        }
        args.extend(["--", path]);

        let out = self.run("log", &args)?;
        parse_history(&String::from_utf8_lossy(&out))
    }

    fn pull(&self) -> Result<(), GitError> {
        let branch = self.current_branch()?;

        // exit code 2: the remote has no such branch yet, nothing to pull
        let probe = self.output(&["ls-remote", "--exit-code", "--heads", "origin", &branch])?;
        match probe.status.code() {
            Some(0) => {}
            Some(2) => return Ok(()),
            _ => return Err(command_error("ls-remote", &probe)),
        }

        self.run("pull", &["pull", "--rebase", "origin", &branch])?;
        Ok(())
    }
}

//! Entry CLI commands

use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::Path;

use anyhow::{Context, Result};

use super::app::Session;
use super::editor;
use crate::storage::EntryStore;

pub fn list(session: &Session) -> Result<()> {
    let store = session.open_store()?;
    let names = store.list()?;

    if session.output.is_json() {
        session.output.data(&names);
    } else {
        for name in names {
            println!("{}", name);
        }
    }
    Ok(())
}

pub fn get(session: &Session, name: &str, rev: Option<&str>) -> Result<()> {
    let store = session.open_store()?;
    let body = store.read(name, rev)?;

    if session.output.is_json() {
        session.output.data(&serde_json::json!({
            "name": name,
            "rev": rev,
            "content": String::from_utf8_lossy(&body),
        }));
    } else {
        session.output.raw(&body).context("Failed to write to stdout")?;
    }
    Ok(())
}

pub fn add(session: &Session, name: &str, file: Option<&Path>) -> Result<()> {
    let store = session.open_store()?;

    let content = match file {
        Some(path) => Some(
            fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?,
        ),
        None if !io::stdin().is_terminal() => {
            let mut buf = Vec::new();
            io::stdin()
                .read_to_end(&mut buf)
                .context("Failed to read stdin")?;
            Some(buf)
        }
        None => None,
    };

    match content {
        Some(content) => {
            let outcome = store.write(name, &content)?;
            session.output.verbose_ctx(
                "add",
                &format!(
                    "{} ({}, changed={})",
                    outcome.name,
                    if outcome.created { "created" } else { "updated" },
                    outcome.changed
                ),
            );
            report(session, outcome.name.as_str(), &outcome);
        }
        None => {
            let name = edit_in_place(session, &store, name, true)?;
            session.output.success(&name);
        }
    }
    Ok(())
}

pub fn edit(session: &Session, name: &str) -> Result<()> {
    let store = session.open_store()?;
    let name = edit_in_place(session, &store, name, false)?;
    session.output.success(&name);
    Ok(())
}

/// Runs the editor on the entry file and commits the result
///
/// With `allow_new`, a missing entry gets an empty placeholder which is
/// removed again if the editor leaves it empty.
fn edit_in_place(
    session: &Session,
    store: &EntryStore,
    name: &str,
    allow_new: bool,
) -> Result<String> {
    let target = if allow_new {
        store.target_path(name)?
    } else {
        store.existing_path(name)?
    };
    let is_new = !target.exists();
    if is_new {
        fs::write(&target.path, b"")
            .with_context(|| format!("Failed to create {}", target.path.display()))?;
    }

    let editor = session.editor();
    session
        .output
        .verbose_ctx("edit", &format!("{} {}", editor, target.path.display()));
    if let Err(e) = editor::launch(&editor, &target.path) {
        if is_new {
            if let Err(cleanup) = fs::remove_file(&target.path) {
                session.output.warn(&format!(
                    "warning: failed to remove placeholder {}: {}",
                    target.path.display(),
                    cleanup
                ));
            }
        }
        return Err(e);
    }

    let name = target.stem();
    store.commit_entry_write(&name, target.ext, is_new)?;
    Ok(name)
}

fn report<T: serde::Serialize>(session: &Session, name: &str, outcome: &T) {
    if session.output.is_json() {
        session.output.data(outcome);
    } else {
        session.output.success(name);
    }
}

pub fn remove(session: &Session, name: &str, dry_run: bool) -> Result<()> {
    let store = session.open_store()?;

    if dry_run {
        let found = store.existing_path(name).context("delete failed")?;
        session
            .output
            .success(&format!("dry-run: would delete {}", found.file_name()));
        return Ok(());
    }

    let outcome = store.delete(name).context("delete failed")?;
    report(session, outcome.name.as_str(), &outcome);
    Ok(())
}

pub fn undo_remove(session: &Session, name: &str) -> Result<()> {
    let store = session.open_store()?;
    let restored = store.undelete(name).context("undo failed")?;
    session.output.verbose_ctx(
        "rm",
        &format!("restored {}", restored.path.display()),
    );
    session.output.success(&restored.stem());
    Ok(())
}

pub fn rename(session: &Session, old: &str, new: &str, dry_run: bool, chore: bool) -> Result<()> {
    let store = session.open_store()?;

    if dry_run {
        let (source, dest) = store.plan_rename(old, new).context("rename failed")?;
        session.output.success(&format!(
            "dry-run: would rename {} to {}",
            source.file_name(),
            dest.file_name()
        ));
        return Ok(());
    }

    let outcome = store.rename(old, new, chore).context("rename failed")?;
    report(session, outcome.to.as_str(), &outcome);
    Ok(())
}

pub fn search(session: &Session, query: &str, tags: &[String]) -> Result<()> {
    let store = session.open_store()?;
    let names = store.search(query, tags)?;

    if session.output.is_json() {
        session.output.data(&names);
    } else {
        for name in names {
            println!("{}", name);
        }
    }
    Ok(())
}

//! History, remote and configuration commands

use anyhow::{Context, Result};

use super::app::Session;
use crate::storage::ConfigSource;

pub fn history(session: &Session, name: &str, limit: usize, reverse: bool) -> Result<()> {
    let store = session.open_store()?;
    let lines = store.history(name, limit, reverse)?;

    if session.output.is_json() {
        session.output.data(&lines);
    } else if lines.is_empty() {
        println!("no history for {}", name);
    } else {
        for line in lines {
            println!("{} {}", line.commit, line.subject);
        }
    }
    Ok(())
}

pub fn set_remote(session: &Session, url: &str) -> Result<()> {
    let store = session.open_store()?;
    store.set_remote(url).context("remote failed")?;

    match &session.config.source {
        ConfigSource::ConfigFile(path) => {
            session
                .loader
                .update_remote_url(url)
                .with_context(|| format!("Failed to save remote_url to {}", path.display()))?;
            session
                .output
                .verbose_ctx("remote", &format!("saved remote_url to {}", path.display()));
        }
        ConfigSource::Environment => {
            session
                .output
                .verbose_ctx("remote", "store set by environment, config file left alone");
        }
    }

    session.output.success(&format!("remote set to {}", url));
    Ok(())
}

pub fn sync(session: &Session) -> Result<()> {
    let store = session.open_store()?;
    store.sync().context("sync failed")?;
    session.output.success("synced");
    Ok(())
}

pub fn show_config(session: &Session) -> Result<()> {
    let config = &session.config;
    let editor = session.editor();
    let config_file = &session.loader.paths().config_file;

    if session.output.is_json() {
        session.output.data(&serde_json::json!({
            "store_dir": config.store_dir,
            "config_file": config_file,
            "source": config.source,
            "remote_url": config.remote_url,
            "git": config.git_enabled,
            "editor": editor,
        }));
    } else {
        let source = match &config.source {
            ConfigSource::Environment => "environment".to_string(),
            ConfigSource::ConfigFile(path) => path.display().to_string(),
        };
        println!("store:   {} (from {})", config.store_dir.display(), source);
        println!("config:  {}", config_file.display());
        println!("remote:  {}", config.remote_url.as_deref().unwrap_or("(none)"));
        println!("git:     {}", config.git_enabled);
        println!(
            "editor:  {}",
            if editor.is_empty() { "(none)" } else { editor.as_str() }
        );
    }
    Ok(())
}

//! Configuration handling for pea
//!
//! The store location is resolved once per invocation:
//!
//! 1. `$PEA_STORE`, when set and non-empty, wins outright. The config file is
//!    not read, no remote is implied and versioning stays on.
//! 2. Otherwise `~/.pea/config.toml` is read (and created with commented
//!    defaults on first run). `store_dir` defaults to `~/.pea/prompts`.
//!
//! Recognized config keys:
//!
//! ```toml
//! store_dir = "/absolute/path"   # must be absolute
//! remote_url = "git@host:me/prompts.git"
//! git = true                     # set false to disable versioning
//! editor = "code --wait"
//! ```
//!
//! Unknown keys are ignored.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Store directory override
pub const STORE_ENV: &str = "PEA_STORE";

/// Editor override
pub const EDITOR_ENV: &str = "PEA_EDITOR";

const VISUAL_ENV: &str = "VISUAL";
const GENERIC_EDITOR_ENV: &str = "EDITOR";

const BASE_DIR_NAME: &str = ".pea";
const STORE_DIR_NAME: &str = "prompts";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Editors tried, in order, when nothing is configured
pub const FALLBACK_EDITORS: &[&str] = &["nvim", "vim", "vi", "nano"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config {}: {reason}", .path.display())]
    Invalid { path: PathBuf, reason: String },

    #[error("{source_name} must be an absolute path, got \"{}\"", .value.display())]
    NotAbsolute {
        source_name: String,
        value: PathBuf,
    },

    #[error("could not determine home directory")]
    NoHome,

    #[error("failed to {action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn io_error(action: &'static str, path: &Path) -> impl FnOnce(std::io::Error) -> ConfigError {
    let path = path.to_path_buf();
    move |source| ConfigError::Io {
        action,
        path,
        source,
    }
}

/// Environment variables relevant to configuration, read once
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    pub store: Option<String>,
    pub editor_override: Option<String>,
    pub visual: Option<String>,
    pub editor: Option<String>,
}

impl Environment {
    /// Snapshots the current process environment. Empty values count as unset.
    pub fn from_process() -> Self {
        let var = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());
        Self {
            store: var(STORE_ENV),
            editor_override: var(EDITOR_ENV),
            visual: var(VISUAL_ENV),
            editor: var(GENERIC_EDITOR_ENV),
        }
    }
}

/// Fixed locations under the user's home directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeaPaths {
    pub base: PathBuf,
    pub default_store: PathBuf,
    pub config_file: PathBuf,
}

impl PeaPaths {
    pub fn from_home(home: &Path) -> Self {
        let base = home.join(BASE_DIR_NAME);
        Self {
            default_store: base.join(STORE_DIR_NAME),
            config_file: base.join(CONFIG_FILE_NAME),
            base,
        }
    }

    /// Paths for the current user
    pub fn discover() -> Result<Self, ConfigError> {
        let dirs = BaseDirs::new().ok_or(ConfigError::NoHome)?;
        Ok(Self::from_home(dirs.home_dir()))
    }
}

/// On-disk configuration file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    /// Store directory override (absolute)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_dir: Option<PathBuf>,

    /// Remote pushed to after every commit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_url: Option<String>,

    /// Record changes in git
    pub git: bool,

    /// Editor command
    #[serde(skip_serializing_if = "Option::is_none")]
    pub editor: Option<String>,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            store_dir: None,
            remote_url: None,
            git: true,
            editor: None,
        }
    }
}

impl ConfigFile {
    /// Parses config text; empty strings are treated as absent
    pub fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let mut config: ConfigFile = toml::from_str(content).map_err(|e| ConfigError::Invalid {
            path: path.to_path_buf(),
            reason: e.message().to_string(),
        })?;

        config.store_dir = config.store_dir.filter(|p| !p.as_os_str().is_empty());
        config.remote_url = config.remote_url.filter(|s| !s.trim().is_empty());
        config.editor = config.editor.filter(|s| !s.trim().is_empty());
        Ok(config)
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(io_error("read config", path))?;
        Self::parse(&content, path)
    }

    fn default_content(default_store: &Path) -> String {
        format!(
            "# pea config\n\
             # store_dir = \"{}\"\n\
             # remote_url = \"\"\n\
             # git = true\n\
             # editor = \"\"\n",
            default_store.display()
        )
    }
}

/// Where the store directory setting came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "path")]
pub enum ConfigSource {
    Environment,
    ConfigFile(PathBuf),
}

/// Resolved settings for one invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreConfig {
    pub store_dir: PathBuf,
    pub remote_url: Option<String>,
    pub git_enabled: bool,
    pub editor: Option<String>,
    pub source: ConfigSource,
}

impl StoreConfig {
    /// Config for an explicit directory with defaults for everything else
    pub fn for_dir(store_dir: impl Into<PathBuf>) -> Self {
        Self {
            store_dir: store_dir.into(),
            remote_url: None,
            git_enabled: true,
            editor: None,
            source: ConfigSource::Environment,
        }
    }
}

/// Resolves [`StoreConfig`] from the environment and config file
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    paths: PeaPaths,
    env: Environment,
}

impl ConfigLoader {
    pub fn new(paths: PeaPaths, env: Environment) -> Self {
        Self { paths, env }
    }

    /// Loader for the current user and process environment
    pub fn from_process() -> Result<Self, ConfigError> {
        Ok(Self::new(PeaPaths::discover()?, Environment::from_process()))
    }

    pub fn paths(&self) -> &PeaPaths {
        &self.paths
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    /// Resolves the store configuration
    ///
    /// Creates the base directory and a commented default config file when
    /// the config file is in play and missing.
    pub fn load(&self) -> Result<StoreConfig, ConfigError> {
        if let Some(store) = &self.env.store {
            let store_dir = PathBuf::from(store);
            ensure_absolute(STORE_ENV, &store_dir)?;
            return Ok(StoreConfig::for_dir(store_dir));
        }

        self.ensure_config_file()?;
        let file = ConfigFile::read(&self.paths.config_file)?;

        let store_dir = file
            .store_dir
            .clone()
            .unwrap_or_else(|| self.paths.default_store.clone());
        if !store_dir.is_absolute() {
            return Err(ConfigError::Invalid {
                path: self.paths.config_file.clone(),
                reason: format!(
                    "store_dir must be an absolute path, got \"{}\"",
                    store_dir.display()
                ),
            });
        }

        Ok(StoreConfig {
            store_dir,
            remote_url: file.remote_url,
            git_enabled: file.git,
            editor: file.editor,
            source: ConfigSource::ConfigFile(self.paths.config_file.clone()),
        })
    }

    fn ensure_config_file(&self) -> Result<(), ConfigError> {
        fs::create_dir_all(&self.paths.base)
            .map_err(io_error("create base directory", &self.paths.base))?;

        let path = &self.paths.config_file;
        match fs::metadata(path) {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let content = ConfigFile::default_content(&self.paths.default_store);
                fs::write(path, content).map_err(io_error("write default config", path))
            }
            Err(e) => Err(io_error("stat config", path)(e)),
        }
    }

    /// Persists `remote_url`, keeping the other settings
    pub fn update_remote_url(&self, url: &str) -> Result<(), ConfigError> {
        fs::create_dir_all(&self.paths.base)
            .map_err(io_error("create base directory", &self.paths.base))?;

        let path = &self.paths.config_file;
        let mut file = if path.exists() {
            ConfigFile::read(path)?
        } else {
            ConfigFile::default()
        };
        file.remote_url = Some(url.to_string()).filter(|u| !u.trim().is_empty());

        let content = toml::to_string_pretty(&file).map_err(|e| ConfigError::Invalid {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        fs::write(path, content).map_err(io_error("write config", path))
    }

    /// Picks the editor command, or an empty string if none is available
    ///
    /// Highest precedence first: `$PEA_EDITOR`, the config file, `$VISUAL`,
    /// `$EDITOR`, then the first of [`FALLBACK_EDITORS`] found on `PATH`.
    pub fn editor(&self, config: &StoreConfig) -> String {
        resolve_editor(&self.env, config.editor.as_deref(), |cmd| {
            which::which(cmd).is_ok()
        })
    }
}

fn ensure_absolute(source_name: &str, path: &Path) -> Result<(), ConfigError> {
    if path.is_absolute() {
        Ok(())
    } else {
        Err(ConfigError::NotAbsolute {
            source_name: source_name.to_string(),
            value: path.to_path_buf(),
        })
    }
}

/// Editor precedence with an injectable executable lookup
pub fn resolve_editor(
    env: &Environment,
    configured: Option<&str>,
    is_installed: impl Fn(&str) -> bool,
) -> String {
    env.editor_override
        .as_deref()
        .or(configured)
        .or(env.visual.as_deref())
        .or(env.editor.as_deref())
        .map(str::to_string)
        .or_else(|| {
            FALLBACK_EDITORS
                .iter()
                .find(|cmd| is_installed(cmd))
                .map(|cmd| cmd.to_string())
        })
        .unwrap_or_default()
}

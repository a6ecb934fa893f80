//! Entry file paths
//!
//! An entry lives in `<store>/<name>.md`, or in `<store>/<name>.txt` for
//! entries created before markdown became the default. When both files exist
//! the `.md` one is authoritative.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::StoreError;
use crate::domain::EntryName;

/// Recognized entry file extensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Extension {
    /// `.md`
    Current,
    /// `.txt`
    Legacy,
}

impl Extension {
    /// Lookup order: current wins ties
    pub const ALL: [Extension; 2] = [Extension::Current, Extension::Legacy];

    pub fn as_str(self) -> &'static str {
        match self {
            Extension::Current => "md",
            Extension::Legacy => "txt",
        }
    }

    /// Splits `notes.md` into `("notes", Current)`; `None` for other files
    pub fn split_file_name(file_name: &str) -> Option<(&str, Extension)> {
        Self::ALL.into_iter().find_map(|ext| {
            file_name
                .strip_suffix(ext.as_str())
                .and_then(|stem| stem.strip_suffix('.'))
                .filter(|stem| !stem.is_empty())
                .map(|stem| (stem, ext))
        })
    }
}

/// A resolved entry location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPath {
    pub path: PathBuf,
    pub ext: Extension,
}

impl EntryPath {
    /// File name relative to the store, as git sees it
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// The entry name this path belongs to
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }
}

/// Maps entry names to files in a store directory
#[derive(Debug, Clone)]
pub struct PathResolver {
    store: PathBuf,
}

impl PathResolver {
    pub fn new(store: impl Into<PathBuf>) -> Self {
        Self {
            store: store.into(),
        }
    }

    pub fn store(&self) -> &Path {
        &self.store
    }

    pub fn path_for(&self, name: &EntryName, ext: Extension) -> EntryPath {
        EntryPath {
            path: self.store.join(name.file_name(ext.as_str())),
            ext,
        }
    }

    /// Path under the current extension
    pub fn default_path(&self, name: &EntryName) -> EntryPath {
        self.path_for(name, Extension::Current)
    }

    /// Path under the legacy extension
    pub fn legacy_path(&self, name: &EntryName) -> EntryPath {
        self.path_for(name, Extension::Legacy)
    }

    /// Finds the file backing `name`, preferring the current extension
    pub fn existing_path(&self, name: &EntryName) -> Result<EntryPath, StoreError> {
        for ext in Extension::ALL {
            let candidate = self.path_for(name, ext);
            match fs::metadata(&candidate.path) {
                Ok(meta) if meta.is_file() => return Ok(candidate),
                Ok(_) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(StoreError::io("stat", &candidate.path)(e)),
            }
        }
        Err(StoreError::NotFound(name.to_string()))
    }

    /// Where a write to `name` should go: the existing file, so edits keep a
    /// legacy extension, or the default path for a new entry
    pub fn target_path(&self, name: &EntryName) -> Result<EntryPath, StoreError> {
        match self.existing_path(name) {
            Ok(found) => Ok(found),
            Err(StoreError::NotFound(_)) => Ok(self.default_path(name)),
            Err(e) => Err(e),
        }
    }
}

//! Entry store operations
//!
//! Every public operation takes a raw, user-supplied name and normalizes it
//! before touching the filesystem. Filesystem changes happen first; the
//! versioning step that follows is best effort unless documented otherwise.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::rc::Rc;

use serde::Serialize;

use super::config::StoreConfig;
use super::paths::{EntryPath, Extension, PathResolver};
use super::StoreError;
use crate::domain::{strip_front_matter, EntryName, FrontMatter, TagSet};
use crate::vcs::{
    Diagnostics, GitBackend, HistoryLine, NoopBackend, Versioning, VersioningBackend,
};

/// Result of [`EntryStore::write`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteOutcome {
    pub name: EntryName,
    pub ext: Extension,
    /// The entry did not exist before
    pub created: bool,
    /// Content differed from what was on disk
    pub changed: bool,
}

/// Result of [`EntryStore::delete`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteOutcome {
    pub name: EntryName,
    pub ext: Extension,
}

/// Result of [`EntryStore::rename`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenameOutcome {
    pub from: EntryName,
    pub to: EntryName,
    pub ext: Extension,
}

/// An entry loaded for searching
#[derive(Debug, Clone)]
pub struct EntryRecord {
    pub name: String,
    pub ext: Extension,
    pub tags: TagSet,
    pub content: Vec<u8>,
}

impl EntryRecord {
    /// Case-insensitive substring match against name or full content
    pub fn matches_query(&self, query: &str) -> bool {
        if query.is_empty() {
            return true;
        }
        let needle = query.to_lowercase();
        self.name.to_lowercase().contains(&needle)
            || String::from_utf8_lossy(&self.content)
                .to_lowercase()
                .contains(&needle)
    }
}

/// A directory of entries plus its version history
pub struct EntryStore {
    resolver: PathResolver,
    versioning: Versioning,
}

impl EntryStore {
    pub fn new(dir: impl AsRef<Path>, versioning: Versioning) -> Self {
        Self {
            resolver: PathResolver::new(dir.as_ref()),
            versioning,
        }
    }

    /// Opens the store described by `config`
    ///
    /// Creates the store directory and bootstraps git when versioning is
    /// enabled and `git` is installed. A missing `git` silently yields an
    /// unversioned store.
    pub fn open(
        config: &StoreConfig,
        diagnostics: Rc<dyn Diagnostics>,
    ) -> Result<Self, StoreError> {
        let dir = &config.store_dir;
        fs::create_dir_all(dir).map_err(StoreError::io("create store directory", dir))?;

        let backend: Box<dyn VersioningBackend> = if config.git_enabled {
            match GitBackend::discover(dir) {
                Some(git) => Box::new(git),
                None => {
                    diagnostics.debug("git not found, versioning disabled");
                    Box::new(NoopBackend)
                }
            }
        } else {
            Box::new(NoopBackend)
        };
        diagnostics.debug(&format!("store {} ({})", dir.display(), backend.name()));

        let versioning = Versioning::new(backend, diagnostics);
        versioning.bootstrap(config.remote_url.as_deref())?;
        Ok(Self::new(dir, versioning))
    }

    pub fn dir(&self) -> &Path {
        self.resolver.store()
    }

    pub fn versioning(&self) -> &Versioning {
        &self.versioning
    }

    /// Where a write to `name` lands; keeps a legacy extension for existing entries
    pub fn target_path(&self, name: &str) -> Result<EntryPath, StoreError> {
        self.resolver.target_path(&EntryName::normalize(name)?)
    }

    /// The file currently backing `name`
    pub fn existing_path(&self, name: &str) -> Result<EntryPath, StoreError> {
        self.resolver.existing_path(&EntryName::normalize(name)?)
    }

    /// Names of all entries, sorted, each listed once
    pub fn list(&self) -> Result<Vec<String>, StoreError> {
        let mut names: Vec<String> = self
            .scan()?
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        names.sort();
        names.dedup();
        Ok(names)
    }

    /// Entry files on disk as `(name, ext)`, in directory order
    fn scan(&self) -> Result<Vec<(String, Extension)>, StoreError> {
        let dir = self.dir();
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io("read store directory", dir)(e)),
        };

        let mut found = Vec::new();
        for entry in entries {
            let entry = entry.map_err(StoreError::io("read store directory", dir))?;
            let is_file = entry
                .file_type()
                .map(|t| t.is_file())
                .map_err(StoreError::io("stat", &entry.path()))?;
            if !is_file {
                continue;
            }
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            if let Some((stem, ext)) = Extension::split_file_name(file_name) {
                found.push((stem.to_string(), ext));
            }
        }
        Ok(found)
    }

    /// Reads an entry body, front matter stripped
    ///
    /// With `rev`, the content is taken from that revision, trying the current
    /// extension before the legacy one.
    pub fn read(&self, name: &str, rev: Option<&str>) -> Result<Vec<u8>, StoreError> {
        let name = EntryName::normalize(name)?;
        match rev.filter(|r| !r.is_empty()) {
            None => {
                let found = self.resolver.existing_path(&name)?;
                let content =
                    fs::read(&found.path).map_err(|_| StoreError::NotFound(name.to_string()))?;
                Ok(strip_front_matter(&content).to_vec())
            }
            Some(rev) => {
                for ext in Extension::ALL {
                    let file = name.file_name(ext.as_str());
                    if let Ok(content) = self.versioning.show_at_revision(rev, &file) {
                        return Ok(strip_front_matter(&content).to_vec());
                    }
                }
                Err(StoreError::NotFoundInRevision {
                    rev: rev.to_string(),
                    name: name.to_string(),
                })
            }
        }
    }

    /// Loads every entry with its tags and raw content
    ///
    /// Every file `list` reports is loaded, whether or not its stem is a
    /// normalized name. When both extensions exist, the current one is read.
    pub fn collect(&self) -> Result<Vec<EntryRecord>, StoreError> {
        let mut files: BTreeMap<String, Extension> = BTreeMap::new();
        for (stem, ext) in self.scan()? {
            let chosen = files.entry(stem).or_insert(ext);
            if ext == Extension::Current {
                *chosen = ext;
            }
        }

        let mut records = Vec::with_capacity(files.len());
        for (name, ext) in files {
            let path = self.dir().join(format!("{}.{}", name, ext.as_str()));
            let content = fs::read(&path).map_err(StoreError::io("read", &path))?;
            records.push(EntryRecord {
                tags: FrontMatter::split(&content).tags(),
                name,
                ext,
                content,
            });
        }
        Ok(records)
    }

    /// Names matching `query` that carry every tag in `tags`
    ///
    /// An empty query matches everything. Tag comparison ignores case.
    pub fn search<S: AsRef<str>>(&self, query: &str, tags: &[S]) -> Result<Vec<String>, StoreError> {
        Ok(self
            .collect()?
            .into_iter()
            .filter(|record| record.matches_query(query))
            .filter(|record| record.tags.contains_all(tags))
            .map(|record| record.name)
            .collect())
    }

    /// Creates or overwrites an entry, then commits it
    ///
    /// Content that is empty after trimming is rejected before anything is
    /// written. Rewriting identical content is a no-op.
    pub fn write(&self, name: &str, content: &[u8]) -> Result<WriteOutcome, StoreError> {
        let name = EntryName::normalize(name)?;
        let target = self.resolver.target_path(&name)?;
        let created = !target.exists();

        if content.trim_ascii().is_empty() {
            return Err(StoreError::EmptyContent(name.to_string()));
        }

        if !created {
            let current = fs::read(&target.path).map_err(StoreError::io("read", &target.path))?;
            if current == content {
                return Ok(WriteOutcome {
                    name,
                    ext: target.ext,
                    created,
                    changed: false,
                });
            }
        }

        fs::create_dir_all(self.dir()).map_err(StoreError::io("create store directory", self.dir()))?;
        write_atomic(&target.path, content)?;
        self.commit_write(&target, created);

        Ok(WriteOutcome {
            name,
            ext: target.ext,
            created,
            changed: true,
        })
    }

    /// Captures a change made outside the store, e.g. by an editor
    ///
    /// An empty file is rejected; a brand-new one is removed first.
    pub fn commit_entry_write(
        &self,
        name: &str,
        ext: Extension,
        is_new: bool,
    ) -> Result<(), StoreError> {
        let name = EntryName::normalize(name)?;
        let target = self.resolver.path_for(&name, ext);

        let content = match fs::read(&target.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(StoreError::io("read", &target.path)(e)),
        };

        if content.trim_ascii().is_empty() {
            if is_new {
                remove_if_present(&target.path)?;
            }
            return Err(StoreError::EmptyContent(name.to_string()));
        }

        self.commit_write(&target, is_new);
        Ok(())
    }

    fn commit_write(&self, target: &EntryPath, created: bool) {
        let file = target.file_name();
        let verb = if created { "add" } else { "edit" };
        self.versioning
            .add_and_commit(&[file.clone()], &format!("feat: {} {}", verb, file));
    }

    /// Removes an entry and commits the removal
    pub fn delete(&self, name: &str) -> Result<DeleteOutcome, StoreError> {
        let name = EntryName::normalize(name)?;
        let found = self.resolver.existing_path(&name)?;

        fs::remove_file(&found.path).map_err(StoreError::io("delete", &found.path))?;

        let file = found.file_name();
        self.versioning
            .remove_and_commit(&[file.clone()], &format!("chore: remove {}", file));

        Ok(DeleteOutcome {
            name,
            ext: found.ext,
        })
    }

    /// Reverts the most recent commit touching the entry
    ///
    /// Used to undo a delete. Failures propagate.
    pub fn undelete(&self, name: &str) -> Result<EntryPath, StoreError> {
        let name = EntryName::normalize(name)?;

        let candidates = match self.resolver.existing_path(&name) {
            Ok(found) => vec![found],
            Err(StoreError::NotFound(_)) => Extension::ALL
                .into_iter()
                .map(|ext| self.resolver.path_for(&name, ext))
                .collect(),
            Err(e) => return Err(e),
        };

        let mut last_err = StoreError::NoHistory(name.to_string());
        for candidate in candidates {
            match self
                .versioning
                .revert_last_commit_for_path(&candidate.file_name())
            {
                Ok(()) => return Ok(candidate),
                Err(e) => {
                    last_err = StoreError::from(e);
                    if !matches!(last_err, StoreError::NoHistory(_)) {
                        return Err(last_err);
                    }
                }
            }
        }
        Err(last_err)
    }

    /// Resolves the source and destination of a rename without touching disk
    ///
    /// The destination keeps the source's extension. Fails if it already
    /// exists under either extension, including renaming onto itself.
    pub fn plan_rename(&self, old: &str, new: &str) -> Result<(EntryPath, EntryPath), StoreError> {
        let from = EntryName::normalize(old)?;
        let to = EntryName::normalize(new)?;
        let source = self.resolver.existing_path(&from)?;

        if from == to {
            return Err(StoreError::AlreadyExists(to.to_string()));
        }
        match self.resolver.existing_path(&to) {
            Ok(_) => return Err(StoreError::AlreadyExists(to.to_string())),
            Err(StoreError::NotFound(_)) => {}
            Err(e) => return Err(e),
        }

        let dest = self.resolver.path_for(&to, source.ext);
        Ok((source, dest))
    }

    /// Renames an entry, keeping its extension
    ///
    /// Fails if the destination already exists under either extension.
    pub fn rename(&self, old: &str, new: &str, chore: bool) -> Result<RenameOutcome, StoreError> {
        let (source, dest) = self.plan_rename(old, new)?;
        let from = EntryName::normalize(old)?;
        let to = EntryName::normalize(new)?;

        fs::rename(&source.path, &dest.path).map_err(StoreError::io("rename", &source.path))?;

        let (old_file, new_file) = (source.file_name(), dest.file_name());
        let kind = if chore { "chore" } else { "refactor" };
        self.versioning.add_and_commit(
            &[old_file.clone(), new_file.clone()],
            &format!("{}: rename {} to {}", kind, old_file, new_file),
        );

        Ok(RenameOutcome {
            from,
            to,
            ext: source.ext,
        })
    }

    /// Commits that touched the entry, newest first unless `reverse`
    pub fn history(
        &self,
        name: &str,
        limit: usize,
        reverse: bool,
    ) -> Result<Vec<HistoryLine>, StoreError> {
        let name = EntryName::normalize(name)?;
        let file = match self.resolver.existing_path(&name) {
            Ok(found) => found.file_name(),
            Err(StoreError::NotFound(_)) => self.resolver.default_path(&name).file_name(),
            Err(e) => return Err(e),
        };
        Ok(self.versioning.history(&file, limit, reverse)?)
    }

    /// Points `origin` at `url`
    pub fn set_remote(&self, url: &str) -> Result<(), StoreError> {
        Ok(self.versioning.set_remote(url)?)
    }

    /// Pulls from and pushes to `origin`
    pub fn sync(&self) -> Result<(), StoreError> {
        Ok(self.versioning.sync()?)
    }
}

/// Writes through a temp file and rename so readers never see partial content
fn write_atomic(path: &Path, content: &[u8]) -> Result<(), StoreError> {
    let mut temp = path.as_os_str().to_owned();
    temp.push(".tmp");
    let temp = Path::new(&temp);

    fs::write(temp, content).map_err(StoreError::io("write temp file", temp))?;
    fs::rename(temp, path).map_err(StoreError::io("replace", path))
}

fn remove_if_present(path: &Path) -> Result<(), StoreError> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != ErrorKind::NotFound => Err(StoreError::io("remove", path)(e)),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vcs::testing::RecordingDiagnostics;
    use crate::vcs::MemoryBackend;
    use tempfile::TempDir;

    struct Fixture {
        dir: TempDir,
        backend: MemoryBackend,
        diagnostics: Rc<RecordingDiagnostics>,
        store: EntryStore,
    }

    fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        let backend = MemoryBackend::new(dir.path());
        let diagnostics = Rc::new(RecordingDiagnostics::default());
        let versioning = Versioning::new(Box::new(backend.clone()), diagnostics.clone());
        let store = EntryStore::new(dir.path(), versioning);
        Fixture {
            dir,
            backend,
            diagnostics,
            store,
        }
    }

    fn unversioned() -> (TempDir, EntryStore) {
        let dir = TempDir::new().unwrap();
        let store = EntryStore::new(dir.path(), Versioning::disabled());
        (dir, store)
    }

    #[test]
    fn add_then_list_and_read() {
        let f = fixture();

        let outcome = f.store.write("notes", b"hello\n").unwrap();

        assert!(outcome.created);
        assert_eq!(outcome.ext, Extension::Current);
        assert_eq!(f.store.list().unwrap(), vec!["notes"]);
        assert_eq!(f.store.read("notes", None).unwrap(), b"hello\n");
        assert_eq!(f.backend.commit_messages(), vec!["feat: add notes.md"]);
    }

    #[test]
    fn read_strips_front_matter() {
        let f = fixture();
        f.store
            .write("a", b"---\ntags: [x]\n---\nbody\n")
            .unwrap();
        assert_eq!(f.store.read("a", None).unwrap(), b"body\n");
    }

    #[test]
    fn names_are_normalized() {
        let f = fixture();
        f.store.write("My Notes!", b"x\n").unwrap();
        assert_eq!(f.store.list().unwrap(), vec!["my_notes"]);
        assert_eq!(f.store.read("MY NOTES", None).unwrap(), b"x\n");
    }

    #[test]
    fn reserved_name_rejected_before_io() {
        let f = fixture();
        let err = f.store.write("add", b"x\n").unwrap_err();
        assert!(matches!(err, StoreError::InvalidName(_)));
        assert!(f.store.list().unwrap().is_empty());
    }

    #[test]
    fn missing_entry_is_not_found() {
        let f = fixture();
        let err = f.store.read("ghost", None).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(n) if n == "ghost"));
    }

    #[test]
    fn search_by_tag() {
        let f = fixture();
        f.store
            .write("a", b"---\ntags: [x]\n---\nbody\n")
            .unwrap();
        f.store.write("b", b"plain\n").unwrap();

        assert_eq!(f.store.search("", &["x"]).unwrap(), vec!["a"]);
        assert_eq!(f.store.search("", &["X"]).unwrap(), vec!["a"]);
        assert!(f.store.search("", &["y"]).unwrap().is_empty());
    }

    #[test]
    fn search_sees_files_with_unnormalized_names() {
        let f = fixture();
        f.store.write("notes", b"plain\n").unwrap();
        fs::write(f.dir.path().join("Draft.md"), "---\ntags: [x]\n---\nbody\n").unwrap();
        fs::write(f.dir.path().join("x.md.txt"), "legacy\n").unwrap();

        let listed = f.store.list().unwrap();
        let found = f.store.search("", &[] as &[&str]).unwrap();

        assert_eq!(listed, vec!["Draft", "notes", "x.md"]);
        assert_eq!(found, listed);
        assert_eq!(f.store.search("", &["x"]).unwrap(), vec!["Draft"]);
    }

    #[test]
    fn collect_prefers_current_extension() {
        let f = fixture();
        fs::write(f.dir.path().join("both.txt"), "---\ntags: [old]\n---\n").unwrap();
        fs::write(f.dir.path().join("both.md"), "---\ntags: [new]\n---\n").unwrap();

        let records = f.store.collect().unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].ext, Extension::Current);
        assert!(records[0].tags.contains("new"));
        assert!(!records[0].tags.contains("old"));
    }

    #[test]
    fn plan_rename_refuses_same_name() {
        let f = fixture();
        f.store.write("a", b"x\n").unwrap();

        assert!(matches!(
            f.store.plan_rename("a", "A").unwrap_err(),
            StoreError::AlreadyExists(n) if n == "a"
        ));
        assert!(matches!(
            f.store.rename("a", "a", false).unwrap_err(),
            StoreError::AlreadyExists(_)
        ));

        let (source, dest) = f.store.plan_rename("a", "b").unwrap();
        assert_eq!(source.file_name(), "a.md");
        assert_eq!(dest.file_name(), "b.md");
        assert!(source.exists());
    }

    #[test]
    fn search_by_name_or_content() {
        let f = fixture();
        f.store.write("greeting", b"Hello World\n").unwrap();
        f.store.write("farewell", b"goodbye\n").unwrap();

        assert_eq!(f.store.search("world", &[] as &[&str]).unwrap(), vec!["greeting"]);
        assert_eq!(f.store.search("FARE", &[] as &[&str]).unwrap(), vec!["farewell"]);
    }

    #[test]
    fn empty_search_returns_each_entry_once() {
        let f = fixture();
        f.store.write("one", b"1\n").unwrap();
        f.store.write("two", b"2\n").unwrap();
        fs::write(f.dir.path().join("one.txt"), "legacy duplicate").unwrap();

        let mut all = f.store.search("", &[] as &[&str]).unwrap();
        all.sort();
        assert_eq!(all, vec!["one", "two"]);
    }

    #[test]
    fn historical_reads() {
        let f = fixture();
        f.store.write("r", b"v1\n").unwrap();
        f.store.write("r", b"v2\n").unwrap();

        assert_eq!(f.store.read("r", Some("HEAD~1")).unwrap(), b"v1\n");
        assert_eq!(f.store.read("r", Some("HEAD")).unwrap(), b"v2\n");
        assert_eq!(
            f.backend.commit_messages(),
            vec!["feat: add r.md", "feat: edit r.md"]
        );
    }

    #[test]
    fn historical_read_of_legacy_entry() {
        let f = fixture();
        fs::write(f.dir.path().join("old.txt"), "legacy\n").unwrap();
        f.store.commit_entry_write("old", Extension::Legacy, true).unwrap();

        assert_eq!(f.store.read("old", Some("HEAD")).unwrap(), b"legacy\n");
    }

    #[test]
    fn missing_revision_is_not_found_in_revision() {
        let f = fixture();
        f.store.write("r", b"v1\n").unwrap();

        let err = f.store.read("r", Some("HEAD~5")).unwrap_err();
        assert!(matches!(err, StoreError::NotFoundInRevision { .. }));
        assert!(err.is_not_found());
    }

    #[test]
    fn identical_rewrite_does_not_commit() {
        let f = fixture();
        f.store.write("same", b"text\n").unwrap();

        let outcome = f.store.write("same", b"text\n").unwrap();

        assert!(!outcome.changed);
        assert_eq!(f.backend.commit_messages().len(), 1);
    }

    #[test]
    fn empty_content_rejected() {
        let f = fixture();
        let err = f.store.write("blank", b"  \n\t\n").unwrap_err();
        assert!(matches!(err, StoreError::EmptyContent(_)));
        assert!(!f.dir.path().join("blank.md").exists());
    }

    #[test]
    fn editor_placeholder_removed_when_left_empty() {
        let f = fixture();
        let target = f.store.target_path("draft").unwrap();
        fs::write(&target.path, "").unwrap();

        let err = f
            .store
            .commit_entry_write("draft", target.ext, true)
            .unwrap_err();

        assert!(matches!(err, StoreError::EmptyContent(_)));
        assert!(!target.path.exists());
        assert!(f.backend.commit_messages().is_empty());
    }

    #[test]
    fn editor_emptying_existing_entry_keeps_file() {
        let f = fixture();
        f.store.write("keep", b"content\n").unwrap();
        let target = f.store.existing_path("keep").unwrap();
        fs::write(&target.path, "\n").unwrap();

        let err = f
            .store
            .commit_entry_write("keep", target.ext, false)
            .unwrap_err();

        assert!(matches!(err, StoreError::EmptyContent(_)));
        assert!(target.path.exists());
    }

    #[test]
    fn editor_changes_are_committed() {
        let f = fixture();
        f.store.write("e", b"before\n").unwrap();
        let target = f.store.existing_path("e").unwrap();
        fs::write(&target.path, "after\n").unwrap();

        f.store.commit_entry_write("e", target.ext, false).unwrap();

        assert_eq!(
            f.backend.commit_messages(),
            vec!["feat: add e.md", "feat: edit e.md"]
        );
    }

    #[test]
    fn edit_keeps_legacy_extension() {
        let f = fixture();
        fs::write(f.dir.path().join("old.txt"), "v1\n").unwrap();

        let outcome = f.store.write("old", b"v2\n").unwrap();

        assert_eq!(outcome.ext, Extension::Legacy);
        assert!(!outcome.created);
        assert!(!f.dir.path().join("old.md").exists());
        assert_eq!(fs::read(f.dir.path().join("old.txt")).unwrap(), b"v2\n");
    }

    #[test]
    fn delete_then_undo_restores_bytes() {
        let f = fixture();
        let original = b"---\ntags: [keep]\n---\nprecious\n";
        f.store.write("gone", original).unwrap();

        let deleted = f.store.delete("gone").unwrap();
        assert_eq!(deleted.ext, Extension::Current);
        assert!(f.store.list().unwrap().is_empty());

        let restored = f.store.undelete("gone").unwrap();
        assert_eq!(restored.ext, Extension::Current);
        assert_eq!(fs::read(f.dir.path().join("gone.md")).unwrap(), original);
        assert_eq!(
            f.backend.commit_messages(),
            vec![
                "feat: add gone.md",
                "chore: remove gone.md",
                "Revert \"chore: remove gone.md\""
            ]
        );
    }

    #[test]
    fn undo_legacy_delete() {
        let f = fixture();
        fs::write(f.dir.path().join("old.txt"), "legacy\n").unwrap();
        f.store.commit_entry_write("old", Extension::Legacy, true).unwrap();
        f.store.delete("old").unwrap();

        let restored = f.store.undelete("old").unwrap();

        assert_eq!(restored.ext, Extension::Legacy);
        assert_eq!(fs::read(f.dir.path().join("old.txt")).unwrap(), b"legacy\n");
    }

    #[test]
    fn undo_without_history_fails() {
        let f = fixture();
        let err = f.store.undelete("never").unwrap_err();
        assert!(matches!(err, StoreError::NoHistory(_)));
    }

    #[test]
    fn delete_missing_is_not_found() {
        let f = fixture();
        assert!(matches!(
            f.store.delete("ghost").unwrap_err(),
            StoreError::NotFound(_)
        ));
    }

    #[test]
    fn rename_moves_visibility() {
        let f = fixture();
        f.store
            .write("old_name", b"---\ntags: [t]\n---\nbody\n")
            .unwrap();

        let outcome = f.store.rename("old_name", "new name", false).unwrap();

        assert_eq!(outcome.to.as_str(), "new_name");
        assert_eq!(outcome.ext, Extension::Current);
        assert_eq!(f.store.search("", &["t"]).unwrap(), vec!["new_name"]);
        assert!(matches!(
            f.store.read("old_name", None).unwrap_err(),
            StoreError::NotFound(_)
        ));
        assert_eq!(
            f.backend.commit_messages().last().unwrap(),
            "refactor: rename old_name.md to new_name.md"
        );
    }

    #[test]
    fn rename_preserves_legacy_extension() {
        let f = fixture();
        fs::write(f.dir.path().join("old.txt"), "legacy\n").unwrap();

        let outcome = f.store.rename("old", "renamed", true).unwrap();

        assert_eq!(outcome.ext, Extension::Legacy);
        assert!(f.dir.path().join("renamed.txt").exists());
        assert!(!f.dir.path().join("old.txt").exists());
    }

    #[test]
    fn rename_chore_message() {
        let f = fixture();
        f.store.write("a", b"x\n").unwrap();
        f.store.rename("a", "b", true).unwrap();
        assert_eq!(
            f.backend.commit_messages().last().unwrap(),
            "chore: rename a.md to b.md"
        );
    }

    #[test]
    fn rename_refuses_existing_destination() {
        let f = fixture();
        f.store.write("a", b"x\n").unwrap();
        fs::write(f.dir.path().join("b.txt"), "y\n").unwrap();

        let err = f.store.rename("a", "b", false).unwrap_err();

        assert!(matches!(err, StoreError::AlreadyExists(n) if n == "b"));
        assert_eq!(f.store.read("a", None).unwrap(), b"x\n");
    }

    #[test]
    fn history_lists_entry_commits() {
        let f = fixture();
        f.store.write("h", b"1\n").unwrap();
        f.store.write("other", b"x\n").unwrap();
        f.store.write("h", b"2\n").unwrap();

        let subjects: Vec<String> = f
            .store
            .history("h", 10, false)
            .unwrap()
            .into_iter()
            .map(|line| line.subject)
            .collect();
        assert_eq!(subjects, vec!["feat: edit h.md", "feat: add h.md"]);

        let oldest_first = f.store.history("h", 10, true).unwrap();
        assert_eq!(oldest_first[0].subject, "feat: add h.md");

        // the limit applies before reversing, as with `git log`
        let limited = f.store.history("h", 1, true).unwrap();
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].subject, "feat: edit h.md");
    }

    #[test]
    fn commit_failures_do_not_fail_writes() {
        let f = fixture();
        f.backend.set_fail_commits(true);

        f.store.write("x", b"kept\n").unwrap();

        assert_eq!(f.store.read("x", None).unwrap(), b"kept\n");
        assert_eq!(f.diagnostics.warnings.borrow().len(), 1);
    }

    #[test]
    fn writes_push_when_remote_configured() {
        let f = fixture();
        f.store.set_remote("/tmp/remote.git").unwrap();
        f.store.write("p", b"x\n").unwrap();
        assert_eq!(f.backend.push_count(), 1);
    }

    #[test]
    fn unversioned_store_still_works() {
        let (_dir, store) = unversioned();
        store.write("plain", b"v1\n").unwrap();
        store.write("plain", b"v2\n").unwrap();

        assert_eq!(store.read("plain", None).unwrap(), b"v2\n");
        assert!(matches!(
            store.read("plain", Some("HEAD")).unwrap_err(),
            StoreError::NotFoundInRevision { .. }
        ));
        assert!(matches!(
            store.undelete("plain").unwrap_err(),
            StoreError::NoHistory(_)
        ));
        assert!(store.history("plain", 5, false).unwrap().is_empty());
        assert!(store.sync().is_err());
    }

    #[test]
    fn list_ignores_temp_files_and_directories() {
        let (dir, store) = unversioned();
        store.write("real", b"x\n").unwrap();
        fs::write(dir.path().join("partial.md.tmp"), "x").unwrap();
        fs::create_dir(dir.path().join("folder.md")).unwrap();
        fs::write(dir.path().join("notes.json"), "{}").unwrap();

        assert_eq!(store.list().unwrap(), vec!["real"]);
    }

    #[test]
    fn open_without_git_enabled_is_unversioned() {
        let dir = TempDir::new().unwrap();
        let mut config = StoreConfig::for_dir(dir.path().join("store"));
        config.git_enabled = false;

        let store = EntryStore::open(&config, Rc::new(RecordingDiagnostics::default())).unwrap();

        assert!(dir.path().join("store").is_dir());
        assert!(!store.versioning().is_enabled());
        assert!(!dir.path().join("store/.git").exists());
    }
}

//! Working directory used as mirror cache and migration ledger
use std::{
    fs::{create_dir_all, remove_dir_all, rename, File},
    path::{Path, PathBuf},
};

use log::debug;

use crate::errors::{GitMoverError, GitMoverErrorKind};

/// Directory name of the cached admin repository
pub(crate) const ADMIN_REPO: &str = "gitolite-admin";

/// Suffix of the marker files
pub(crate) const RECORD_SUFFIX: &str = "-migrated";

/// Suffix of a mirror still being fetched
pub(crate) const STAGING_SUFFIX: &str = ".partial";

/// Local mirror handed out by a store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mirror {
    /// Path of the bare mirror
    pub path: PathBuf,

    /// Whether the mirror was left over by a previous run
    pub reused: bool,
}

/// Persistent migration state
pub trait StateStore: Sync + Send {
    /// Whether the repository was already migrated
    fn has_record(&self, name: &str) -> bool;

    /// Remember that the repository was migrated
    /// # Errors
    /// Error if the name is empty or the marker can't be written
    fn mark_record(&self, name: &str) -> Result<(), GitMoverError>;

    /// Reuse the local mirror of `name`, or create it with `fetch`
    ///
    /// A mirror is only handed out once `fetch` completed.
    /// # Errors
    /// Error returned by `fetch`, after the partial mirror was removed
    fn get_or_create_mirror(
        &self,
        name: &str,
        fetch: &mut dyn FnMut(&Path) -> Result<(), GitMoverError>,
    ) -> Result<Mirror, GitMoverError>;

    /// Delete the local mirror of `name`
    /// # Errors
    /// Error if the name is empty or the directory can't be removed
    fn remove_mirror(&self, name: &str) -> Result<(), GitMoverError>;

    /// Location of the admin repository checkout
    fn admin_path(&self) -> PathBuf;
}

/// State store backed by a plain directory
#[derive(Debug, Clone)]
pub struct WorkdirStore {
    /// Root of the working directory
    root: PathBuf,
}

impl WorkdirStore {
    /// Open the store, creating the directory if needed
    /// # Errors
    /// Error if the directory can't be created
    pub fn try_new<P: AsRef<Path>>(root: P) -> Result<Self, GitMoverError> {
        let root = root.as_ref().to_path_buf();
        create_dir_all(&root).map_err(|e| {
            GitMoverError::with_source(GitMoverErrorKind::Io, e)
                .with_repo(&root.display().to_string())
        })?;
        Ok(Self { root })
    }

    /// Path of the marker file of `name`
    fn record_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}{RECORD_SUFFIX}"))
    }

    /// Path of the mirror of `name`
    fn mirror_path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Path the mirror of `name` is fetched into
    fn staging_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}{STAGING_SUFFIX}"))
    }
}

/// Reject empty names before touching the filesystem
fn ensure_name(name: &str) -> Result<(), GitMoverError> {
    if name.is_empty() {
        return Err(GitMoverError::new(GitMoverErrorKind::Record)
            .with_text("empty repository name"));
    }
    Ok(())
}

impl StateStore for WorkdirStore {
    fn has_record(&self, name: &str) -> bool {
        !name.is_empty() && self.record_path(name).is_file()
    }

    fn mark_record(&self, name: &str) -> Result<(), GitMoverError> {
        ensure_name(name)?;
        let path = self.record_path(name);
        File::create(&path).map_err(|e| {
            GitMoverError::with_source(GitMoverErrorKind::Record, e).with_repo(name)
        })?;
        debug!("Recorded {}", path.display());
        Ok(())
    }

    fn get_or_create_mirror(
        &self,
        name: &str,
        fetch: &mut dyn FnMut(&Path) -> Result<(), GitMoverError>,
    ) -> Result<Mirror, GitMoverError> {
        ensure_name(name)?;
        let path = self.mirror_path(name);
        if path.is_dir() {
            return Ok(Mirror { path, reused: true });
        }
        // only a complete fetch is moved to the mirror path
        let staging = self.staging_path(name);
        if staging.exists() {
            debug!("Removing interrupted mirror {}", staging.display());
            remove_dir_all(&staging)?;
        }
        if let Err(e) = fetch(&staging) {
            if staging.exists() {
                debug!("Removing partial mirror {}", staging.display());
                remove_dir_all(&staging)?;
            }
            return Err(e);
        }
        rename(&staging, &path).map_err(|e| {
            GitMoverError::with_source(GitMoverErrorKind::Io, e).with_repo(name)
        })?;
        Ok(Mirror {
            path,
            reused: false,
        })
    }

    fn remove_mirror(&self, name: &str) -> Result<(), GitMoverError> {
        ensure_name(name)?;
        let path = self.mirror_path(name);
        if path.exists() {
            remove_dir_all(&path).map_err(|e| {
                GitMoverError::with_source(GitMoverErrorKind::Io, e).with_repo(name)
            })?;
        }
        Ok(())
    }

    fn admin_path(&self) -> PathBuf {
        self.root.join(ADMIN_REPO)
    }
}

#[cfg(test)]
mod test {
    use std::fs::create_dir;

    use super::*;

    #[test]
    fn records_are_marker_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = WorkdirStore::try_new(dir.path().join("tmp")).unwrap();
        assert!(!store.has_record("foo"));
        store.mark_record("foo").unwrap();
        assert!(store.has_record("foo"));
        assert!(dir.path().join("tmp").join("foo-migrated").is_file());
        // a mirror directory that happens to carry the suffix is not a record
        create_dir(dir.path().join("tmp").join("bar-migrated")).unwrap();
        assert!(!store.has_record("bar"));
    }

    #[test]
    fn empty_names_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = WorkdirStore::try_new(dir.path()).unwrap();
        assert!(!store.has_record(""));
        let err = store.mark_record("").unwrap_err();
        assert_eq!(err.kind(), &GitMoverErrorKind::Record);
        assert!(store.remove_mirror("").is_err());
    }

    #[test]
    fn existing_mirror_is_reused() {
        let dir = tempfile::tempdir().unwrap();
        let store = WorkdirStore::try_new(dir.path()).unwrap();
        let mut calls = 0;
        let mirror = store
            .get_or_create_mirror("foo", &mut |path| {
                calls += 1;
                create_dir(path)?;
                Ok(())
            })
            .unwrap();
        assert!(!mirror.reused);
        assert_eq!(mirror.path, dir.path().join("foo"));
        let again = store
            .get_or_create_mirror("foo", &mut |_| {
                calls += 1;
                Ok(())
            })
            .unwrap();
        assert!(again.reused);
        assert_eq!(calls, 1);
        store.remove_mirror("foo").unwrap();
        assert!(!dir.path().join("foo").exists());
    }

    #[test]
    fn failed_fetch_leaves_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        let store = WorkdirStore::try_new(dir.path()).unwrap();
        let err = store
            .get_or_create_mirror("foo", &mut |path| {
                create_dir(path)?;
                File::create(path.join("HEAD"))?;
                Err(GitMoverError::new(GitMoverErrorKind::MirrorFetch))
            })
            .unwrap_err();
        assert_eq!(err.kind(), &GitMoverErrorKind::MirrorFetch);
        assert!(!dir.path().join("foo").exists());
        assert!(!dir.path().join("foo.partial").exists());
    }

    #[test]
    fn interrupted_fetch_is_started_over() {
        let dir = tempfile::tempdir().unwrap();
        let store = WorkdirStore::try_new(dir.path()).unwrap();
        // what a killed fetch leaves behind
        git2::Repository::init_bare(dir.path().join("foo.partial")).unwrap();
        let mut fetched_into = vec![];
        let mirror = store
            .get_or_create_mirror("foo", &mut |path| {
                assert!(!path.exists());
                fetched_into.push(path.to_path_buf());
                create_dir(path)?;
                Ok(())
            })
            .unwrap();
        assert!(!mirror.reused);
        assert_eq!(mirror.path, dir.path().join("foo"));
        assert_eq!(fetched_into, vec![dir.path().join("foo.partial")]);
        assert!(!dir.path().join("foo.partial").exists());
    }

    #[test]
    fn admin_checkout_lives_in_workdir() {
        let dir = tempfile::tempdir().unwrap();
        let store = WorkdirStore::try_new(dir.path()).unwrap();
        assert_eq!(store.admin_path(), dir.path().join("gitolite-admin"));
    }
}

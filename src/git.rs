//! Git operations: admin checkout, mirror clone and mirror push
use std::path::Path;

use git2::{
    build::RepoBuilder, Cred, Direction, FetchOptions, PushOptions, ReferenceType,
    RemoteCallbacks, Repository,
};
use log::{debug, info};

use crate::errors::{GitMoverError, GitMoverErrorKind};

/// Refspec copying every ref as is
const MIRROR_REFSPEC: &str = "+refs/*:refs/*";

/// Git capabilities needed by a migration
pub trait GitBackend: Sync + Send {
    /// Clone `url` with a working tree into `path`
    /// # Errors
    /// Error if the clone fails
    fn clone_checkout(&self, url: &str, path: &Path) -> Result<(), GitMoverError>;

    /// Bare clone of every ref of `url` into `path`
    /// # Errors
    /// Error if the clone fails
    fn clone_mirror(&self, url: &str, path: &Path) -> Result<(), GitMoverError>;

    /// Make the refs of `url` those of the repository at `path`:
    /// every ref is force-pushed, refs missing locally are deleted
    /// # Errors
    /// Error if the repository can't be opened or the push is rejected
    fn push_mirror(&self, path: &Path, url: &str) -> Result<(), GitMoverError>;
}

/// libgit2 implementation, authenticating through the ssh agent
#[derive(Debug, Default, Clone)]
pub struct Git2Backend;

/// Callbacks asking the ssh agent for credentials
fn ssh_callbacks<'a>() -> RemoteCallbacks<'a> {
    let mut callbacks = RemoteCallbacks::new();
    callbacks.credentials(|_url, username_from_url, _allowed| {
        let username = username_from_url.unwrap_or("git");
        Cred::ssh_key_from_agent(username)
    });
    callbacks
}

/// Fetch options using the ssh agent
fn fetch_options<'a>() -> FetchOptions<'a> {
    let mut fetch_opts = FetchOptions::new();
    fetch_opts.remote_callbacks(ssh_callbacks());
    fetch_opts
}

impl GitBackend for Git2Backend {
    fn clone_checkout(&self, url: &str, path: &Path) -> Result<(), GitMoverError> {
        info!("Cloning '{}' to '{}'", url, path.display());
        let mut builder = RepoBuilder::new();
        builder.fetch_options(fetch_options());
        builder.clone(url, path).map_err(|e| {
            GitMoverError::with_source(GitMoverErrorKind::ConfigFetch, e).with_repo(url)
        })?;
        Ok(())
    }

    fn clone_mirror(&self, url: &str, path: &Path) -> Result<(), GitMoverError> {
        info!("Mirroring '{}' to '{}'", url, path.display());
        let fetch_error =
            |e: git2::Error| GitMoverError::with_source(GitMoverErrorKind::MirrorFetch, e).with_repo(url);
        let repo = Repository::init_bare(path).map_err(fetch_error)?;
        let mut remote = repo
            .remote_with_fetch("origin", url, MIRROR_REFSPEC)
            .map_err(fetch_error)?;
        repo.config()
            .and_then(|mut config| config.set_bool("remote.origin.mirror", true))?;
        remote
            .fetch(&[MIRROR_REFSPEC], Some(&mut fetch_options()), None)
            .map_err(fetch_error)?;
        debug!("Fetched {} refs", repo.references()?.count());
        Ok(())
    }

    fn push_mirror(&self, path: &Path, url: &str) -> Result<(), GitMoverError> {
        let repo = Repository::open_bare(path)?;
        let mut local_refs = vec![];
        for reference in repo.references()? {
            let reference = reference?;
            if reference.kind() == Some(ReferenceType::Symbolic) {
                continue;
            }
            if let Ok(ref_name) = reference.name() {
                local_refs.push(ref_name.to_string());
            }
        }
        let push_error =
            |e: git2::Error| GitMoverError::with_source(GitMoverErrorKind::Push, e).with_repo(url);
        let mut remote = repo.remote_anonymous(url)?;
        let remote_refs: Vec<String> = {
            let connection = remote
                .connect_auth(Direction::Push, Some(ssh_callbacks()), None)
                .map_err(push_error)?;
            connection
                .list()
                .map_err(push_error)?
                .iter()
                .map(|head| head.name().to_string())
                .filter(|name| name.starts_with("refs/"))
                .collect()
        };

        let mut refspecs: Vec<String> = local_refs
            .iter()
            .map(|ref_name| format!("+{ref_name}:{ref_name}"))
            .collect();
        // the destination ends up with exactly the refs of the mirror
        refspecs.extend(
            remote_refs
                .iter()
                .filter(|ref_name| !local_refs.contains(ref_name))
                .map(|ref_name| format!(":{ref_name}")),
        );
        if refspecs.is_empty() {
            info!("Nothing to push from '{}'", path.display());
            return Ok(());
        }
        info!("Pushing {} refs to '{}'", refspecs.len(), url);
        for refspec in &refspecs {
            debug!("Pushing '{refspec}'");
        }
        let mut rejected = vec![];
        {
            let mut callbacks = ssh_callbacks();
            callbacks.push_update_reference(|ref_name, status| {
                if let Some(message) = status {
                    rejected.push(format!("{ref_name}: {message}"));
                }
                Ok(())
            });
            let mut opts = PushOptions::new();
            opts.remote_callbacks(callbacks);
            remote.push(&refspecs, Some(&mut opts)).map_err(push_error)?;
        }
        if !rejected.is_empty() {
            return Err(GitMoverError::new(GitMoverErrorKind::Push)
                .with_repo(url)
                .with_text(&rejected.join(", ")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_utils::{commit_file, init_source};

    #[test]
    fn mirror_round_trip_keeps_every_ref() {
        let dir = tempfile::tempdir().unwrap();
        let source = init_source(&dir.path().join("src").join("foo.git"));
        commit_file(&source, "second.txt", "more", "second commit");
        let head = source.head().unwrap().name().unwrap().to_string();
        source.branch("feature", &source.head().unwrap().peel_to_commit().unwrap(), false).unwrap();

        let backend = Git2Backend;
        let mirror_path = dir.path().join("mirror");
        backend
            .clone_mirror(dir.path().join("src").join("foo.git").to_str().unwrap(), &mirror_path)
            .unwrap();
        let mirror = Repository::open_bare(&mirror_path).unwrap();
        assert!(mirror.find_reference(&head).is_ok());
        assert!(mirror.find_reference("refs/heads/feature").is_ok());
        assert!(mirror.find_reference("refs/tags/v1").is_ok());

        let dest_path = dir.path().join("dest.git");
        Repository::init_bare(&dest_path).unwrap();
        backend.push_mirror(&mirror_path, dest_path.to_str().unwrap()).unwrap();
        let dest = Repository::open_bare(&dest_path).unwrap();
        let source_tip = source.refname_to_id(&head).unwrap();
        assert_eq!(dest.refname_to_id(&head).unwrap(), source_tip);
        assert!(dest.find_reference("refs/heads/feature").is_ok());
        assert!(dest.find_reference("refs/tags/v1").is_ok());
    }

    #[test]
    fn push_prunes_refs_missing_from_the_mirror() {
        let dir = tempfile::tempdir().unwrap();
        let source_path = dir.path().join("src").join("foo.git");
        let source = init_source(&source_path);
        let head = source.head().unwrap().name().unwrap().to_string();

        // destination already holding a branch the source never had
        let dest_path = dir.path().join("dest.git");
        let stale_path = dir.path().join("stale");
        let stale = init_source(&stale_path);
        stale.branch("stale", &stale.head().unwrap().peel_to_commit().unwrap(), false).unwrap();
        let stale_mirror = dir.path().join("stale-mirror");
        Git2Backend.clone_mirror(stale_path.to_str().unwrap(), &stale_mirror).unwrap();
        Repository::init_bare(&dest_path).unwrap();
        Git2Backend.push_mirror(&stale_mirror, dest_path.to_str().unwrap()).unwrap();
        let dest = Repository::open_bare(&dest_path).unwrap();
        assert!(dest.find_reference("refs/heads/stale").is_ok());

        let mirror_path = dir.path().join("mirror");
        Git2Backend.clone_mirror(source_path.to_str().unwrap(), &mirror_path).unwrap();
        Git2Backend.push_mirror(&mirror_path, dest_path.to_str().unwrap()).unwrap();

        let dest = Repository::open_bare(&dest_path).unwrap();
        assert!(dest.find_reference("refs/heads/stale").is_err());
        assert_eq!(
            dest.refname_to_id(&head).unwrap(),
            source.refname_to_id(&head).unwrap()
        );
        assert!(dest.find_reference("refs/tags/v1").is_ok());
    }

    #[test]
    fn unreachable_source_is_a_mirror_fetch_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Git2Backend
            .clone_mirror(
                dir.path().join("missing.git").to_str().unwrap(),
                &dir.path().join("out"),
            )
            .unwrap_err();
        assert_eq!(err.kind(), &GitMoverErrorKind::MirrorFetch);
    }

    #[test]
    #[ignore] // This test is ignored because it requires a valid ssh key
    fn test_ssh_clone() {
        let dir = tempfile::tempdir().unwrap();
        Git2Backend
            .clone_mirror("git@github.com:rust-lang/git2-rs.git", &dir.path().join("git2-rs"))
            .unwrap();
    }
}

//! Fetch the gitolite admin repository and read the managed repositories
use std::{fs::read_to_string, path::Path};

use log::{debug, info, warn};

use crate::{
    errors::{GitMoverError, GitMoverErrorKind},
    git::GitBackend,
    store::{StateStore, ADMIN_REPO},
};

/// Configuration file inside the admin repository
const GITOLITE_CONF: &str = "conf/gitolite.conf";

/// Keyword introducing repository names
const REPO_KEYWORD: &str = "repo";

/// Get the repositories managed by gitolite, in configuration order
/// # Errors
/// Error if the admin repository can't be cloned or its configuration read
pub fn fetch_repo_list(
    git: &dyn GitBackend,
    store: &dyn StateStore,
    config_repo: &str,
) -> Result<Vec<String>, GitMoverError> {
    let admin_path = store.admin_path();
    if admin_path.is_dir() {
        info!("Reusing {}", admin_path.display());
    } else if let Err(e) = git.clone_checkout(config_repo, &admin_path) {
        if admin_path.exists() {
            std::fs::remove_dir_all(&admin_path)?;
        }
        return Err(e);
    }
    read_repo_list(&admin_path)
}

/// Read the managed repositories from an admin checkout
fn read_repo_list(admin_path: &Path) -> Result<Vec<String>, GitMoverError> {
    let conf_path = admin_path.join(GITOLITE_CONF);
    let contents = read_to_string(&conf_path).map_err(|e| {
        GitMoverError::with_source(GitMoverErrorKind::ConfigFetch, e)
            .with_repo(&conf_path.display().to_string())
    })?;
    Ok(parse_repo_list(&contents))
}

/// Extract the names of `repo <name>...` lines, without the admin repository
pub fn parse_repo_list(contents: &str) -> Vec<String> {
    let mut repos: Vec<String> = vec![];
    for line in contents.lines() {
        let line = match line.split_once('#') {
            Some((before, _comment)) => before,
            None => line,
        };
        let mut words = line.split_whitespace();
        if words.next() != Some(REPO_KEYWORD) {
            continue;
        }
        for name in words {
            if name.starts_with('@') {
                warn!("Skipping group {name}");
                continue;
            }
            if name == ADMIN_REPO {
                continue;
            }
            if repos.iter().any(|r| r == name) {
                debug!("{name} is configured more than once");
                continue;
            }
            repos.push(name.to_string());
        }
    }
    repos
}

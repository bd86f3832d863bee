//! Map gitolite repository names to GitLab project names
use std::collections::BTreeMap;

use crate::{
    errors::{GitMoverError, GitMoverErrorKind},
    store::{ADMIN_REPO, RECORD_SUFFIX, STAGING_SUFFIX},
};

/// Character used in place of anything GitLab refuses in a project path
const REPLACEMENT: char = '-';

/// Check if a character is allowed in a destination project name
fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-')
}

/// Destination project name for a source repository name
pub fn normalize_name(name: &str) -> String {
    if name.chars().all(is_allowed) {
        return name.to_string();
    }
    name.chars()
        .map(|c| if is_allowed(c) { c } else { REPLACEMENT })
        .collect()
}

/// Destination name whose working directory entry another entry already uses
fn working_directory_clash(dest: &str, by_destination: &BTreeMap<String, Vec<&str>>) -> Option<String> {
    if dest == ADMIN_REPO {
        return Some("the admin checkout".to_string());
    }
    for (suffix, what) in [(RECORD_SUFFIX, "record"), (STAGING_SUFFIX, "partial mirror")] {
        if let Some(other) = dest.strip_suffix(suffix) {
            if by_destination.contains_key(other) {
                return Some(format!("the {what} of {other}"));
            }
        }
    }
    None
}

/// Fail if two distinct source names normalize to the same destination name,
/// or if a destination name is taken by the working directory
/// # Errors
/// `NameCollision` listing every colliding group
pub fn check_collisions<S: AsRef<str>>(names: &[S]) -> Result<(), GitMoverError> {
    let mut by_destination: BTreeMap<String, Vec<&str>> = BTreeMap::new();
    for name in names {
        let name = name.as_ref();
        let sources = by_destination.entry(normalize_name(name)).or_default();
        if !sources.contains(&name) {
            sources.push(name);
        }
    }
    let mut collisions: Vec<String> = by_destination
        .iter()
        .filter(|(_, sources)| sources.len() > 1)
        .map(|(dest, sources)| format!("{} -> {dest}", sources.join(", ")))
        .collect();
    for (dest, sources) in &by_destination {
        if let Some(clash) = working_directory_clash(dest, &by_destination) {
            collisions.push(format!("{} -> {dest} clashes with {clash}", sources.join(", ")));
        }
    }
    if collisions.is_empty() {
        Ok(())
    } else {
        Err(GitMoverError::new(GitMoverErrorKind::NameCollision).with_text(&collisions.join("; ")))
    }
}

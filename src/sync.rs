//! Migrate repositories one after the other
use std::{
    fmt,
    io::{stderr, stdin},
};

use colored::Colorize;
use log::info;

use crate::{
    config::SourceBase,
    errors::{GitMoverError, GitMoverErrorKind},
    git::GitBackend,
    normalize::{check_collisions, normalize_name},
    platform::{Platform, ProjectCreation},
    store::StateStore,
    utils::{input, is_affirmative},
};

/// Asks whether a repository should be migrated
pub trait Confirm {
    /// Ask `question`, true to proceed
    /// # Errors
    /// Error if the answer can't be read
    fn confirm(&mut self, question: &str) -> Result<bool, GitMoverError>;
}

/// Confirmation read from the terminal
#[derive(Debug, Default)]
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&mut self, question: &str) -> Result<bool, GitMoverError> {
        let answer = input(
            &format!("{question} [y/N] "),
            &mut stdin().lock(),
            &mut stderr(),
        )?;
        Ok(is_affirmative(&answer))
    }
}

/// What a run did
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MigrationSummary {
    /// Repositories migrated by this run
    pub migrated: Vec<String>,

    /// Repositories recorded by a previous run
    pub already_migrated: Vec<String>,

    /// Repositories declined interactively
    pub skipped: Vec<String>,
}

impl fmt::Display for MigrationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Migrated {}, already migrated {}, skipped {}",
            self.migrated.len(),
            self.already_migrated.len(),
            self.skipped.len()
        )
    }
}

/// Moves a single repository to the destination
pub struct Migrator<'a> {
    /// Mirror cache and ledger
    store: &'a dyn StateStore,

    /// Git operations
    git: &'a dyn GitBackend,

    /// Destination
    platform: &'a dyn Platform,

    /// Address prefix of the sources
    source: &'a SourceBase,
}

impl<'a> Migrator<'a> {
    /// Create a new migrator
    pub fn new(
        store: &'a dyn StateStore,
        git: &'a dyn GitBackend,
        platform: &'a dyn Platform,
        source: &'a SourceBase,
    ) -> Self {
        Self {
            store,
            git,
            platform,
            source,
        }
    }

    /// Mirror `source_name`, create `dest_name`, push, then record it
    /// # Errors
    /// Error of the first step that fails
    pub async fn migrate_one(&self, source_name: &str, dest_name: &str) -> Result<(), GitMoverError> {
        if dest_name.is_empty() {
            return Err(GitMoverError::new(GitMoverErrorKind::Record)
                .with_repo(source_name)
                .with_text("empty destination name"));
        }
        let source_url = self.source.repo_url(source_name);
        let mirror = self.store.get_or_create_mirror(dest_name, &mut |path| {
            self.git.clone_mirror(&source_url, path)
        })?;
        if mirror.reused {
            eprintln!(
                "{}",
                format!("Reusing local mirror {}", mirror.path.display()).cyan()
            );
        }

        match self.platform.create_project(dest_name).await? {
            ProjectCreation::Created => info!(
                "Created {}/{} on {}",
                self.platform.get_username(),
                dest_name,
                self.platform.get_remote_url()
            ),
            ProjectCreation::AlreadyExists => eprintln!(
                "{}",
                format!("Project {dest_name} already exists, pushing into it").yellow()
            ),
        }

        let push_url = self.platform.get_push_url(dest_name);
        self.git.push_mirror(&mirror.path, &push_url)?;

        self.store.remove_mirror(dest_name)?;
        self.store.mark_record(dest_name)?;
        eprintln!(
            "{}",
            format!("{source_name} migrated to {push_url}").green().bold()
        );
        Ok(())
    }
}

/// Migrate every repository in order, skipping recorded ones
/// # Errors
/// Name collision before anything starts, else the first error met
pub async fn migrate_all<S: AsRef<str>>(
    migrator: &Migrator<'_>,
    repos: &[S],
    mut confirm: Option<&mut dyn Confirm>,
) -> Result<MigrationSummary, GitMoverError> {
    check_collisions(repos)?;
    let mut summary = MigrationSummary::default();
    let total = repos.len();
    for (idx, name) in repos.iter().enumerate() {
        let name = name.as_ref();
        eprintln!("{}", format!("({}/{}) {}", idx + 1, total, name).cyan());
        if let Some(confirm) = confirm.as_deref_mut() {
            if !confirm.confirm(&format!("Migrate {name}?"))? {
                eprintln!("{}", format!("Skipping {name}").yellow());
                summary.skipped.push(name.to_string());
                continue;
            }
        }
        let dest_name = normalize_name(name);
        if migrator.store.has_record(&dest_name) {
            eprintln!("{}", format!("{name} already migrated").yellow());
            summary.already_migrated.push(name.to_string());
            continue;
        }
        migrator.migrate_one(name, &dest_name).await?;
        summary.migrated.push(name.to_string());
    }
    Ok(summary)
}

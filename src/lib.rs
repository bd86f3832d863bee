//! # gitolite-mover
//!
//! Mirror every repository listed in a gitolite-admin repository into private GitLab projects
//!
//! ## Usage
//!
//! ```txt
//! Usage: gitolite-mover [OPTIONS] <CONFIG_REPO> <DESTINATION> <USER> <TOKEN>
//!
//! Arguments:
//!   <CONFIG_REPO>  Address of the gitolite-admin repository (e.g. git@host:gitolite-admin)
//!   <DESTINATION>  GitLab URL, protocol included (e.g. https://gitlab.example.com)
//!   <USER>         GitLab user owning the new projects
//!   <TOKEN>        GitLab private token
//!
//! Options:
//!   -i, --interactive        Ask before migrating each repository
//!   -w, --workdir <WORKDIR>  Working directory (defaults to tmp/ next to the executable)
//!   -v, --verbose...         Verbose mode (-v, -vv)
//!   -h, --help               Print help
//!   -V, --version            Print version
//! ```
//!
//! The working directory keeps one bare mirror per repository while it is migrated
//! and an empty `<name>-migrated` file once it is done, so an interrupted run can be
//! started again. `GITOLITE_BASE` (also read from `.env`) overrides the address the
//! repositories are cloned from.

#![warn(clippy::all, rust_2018_idioms)]
#![deny(
    missing_docs,
    clippy::all,
    clippy::missing_docs_in_private_items,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::unwrap_used,
    clippy::expect_used
)]

pub(crate) mod admin;
pub(crate) mod cli;
pub(crate) mod config;
pub(crate) mod errors;
pub(crate) mod git;
pub(crate) mod normalize;
pub(crate) mod platform;
pub(crate) mod store;
pub(crate) mod sync;
pub(crate) mod utils;

mod gitlab;

#[cfg(test)]
mod test_utils;

pub use admin::{fetch_repo_list, parse_repo_list};
pub use cli::{gitolite_mover_main, GitMoverCli};
pub use config::{GitMoverConfig, SourceBase, SOURCE_BASE_ENV};
pub use errors::{GitMoverError, GitMoverErrorKind};
pub use git::{Git2Backend, GitBackend};
pub use gitlab::platform::GitlabPlatform;
pub use normalize::{check_collisions, normalize_name};
pub use platform::{Platform, ProjectCreation};
pub use store::{Mirror, StateStore, WorkdirStore};
pub use sync::{migrate_all, Confirm, MigrationSummary, Migrator, StdinConfirm};

//! Configuration handling
use std::{env, path::PathBuf};

use log::debug;
use url::Url;

use crate::{
    cli::GitMoverCli,
    errors::{GitMoverError, GitMoverErrorKind},
};

/// Environment variable overriding the source base address
pub const SOURCE_BASE_ENV: &str = "GITOLITE_BASE";

/// Name of the working directory next to the executable
const WORKDIR_NAME: &str = "tmp";

/// Address prefix of the gitolite repositories
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceBase {
    /// Prefix ending with `:` or `/`
    prefix: String,
}

impl SourceBase {
    /// Base given explicitly, as in `git@host`
    pub fn from_override(base: &str) -> Self {
        let prefix = if base.ends_with(':') || base.ends_with('/') {
            base.to_string()
        } else {
            format!("{base}:")
        };
        Self { prefix }
    }

    /// Base derived from the address of the admin repository
    /// # Errors
    /// Usage error if the address has neither a host part nor a directory
    pub fn from_config_repo(config_repo: &str) -> Result<Self, GitMoverError> {
        let split_at = if config_repo.contains("://") {
            config_repo.rfind('/')
        } else {
            // scp-like `user@host:path` unless it looks like a local path
            match config_repo.find(':') {
                Some(idx) if !config_repo[..idx].contains('/') => {
                    config_repo[idx + 1..].rfind('/').map(|i| i + idx + 1).or(Some(idx))
                }
                _ => config_repo.rfind('/'),
            }
        };
        match split_at {
            Some(idx) => Ok(Self {
                prefix: config_repo[..=idx].to_string(),
            }),
            None => Err(GitMoverError::new(GitMoverErrorKind::Usage).with_text(&format!(
                "can't derive the source address from '{config_repo}', set {SOURCE_BASE_ENV}"
            ))),
        }
    }

    /// Address of the source repository `name`
    pub fn repo_url(&self, name: &str) -> String {
        format!("{}{}.git", self.prefix, name)
    }
}

/// Configuration data
#[derive(Debug, Clone)]
pub struct GitMoverConfig {
    /// Address of the gitolite admin repository
    pub config_repo: String,

    /// GitLab instance URL
    pub destination: Url,

    /// GitLab user owning the new projects
    pub user: String,

    /// GitLab token
    pub token: String,

    /// Ask before migrating each repository
    pub interactive: bool,

    /// Mirror cache and migration ledger
    pub workdir: PathBuf,

    /// Address prefix of the source repositories
    pub source_base: SourceBase,
}

impl GitMoverConfig {
    /// Build the configuration from the CLI and the environment
    /// # Errors
    /// Error if the working directory or the source base can't be determined
    pub fn try_new(cli_args: GitMoverCli) -> Result<Self, GitMoverError> {
        let source_base = match env::var(SOURCE_BASE_ENV) {
            Ok(base) if !base.is_empty() => {
                debug!("Using {SOURCE_BASE_ENV}={base}");
                SourceBase::from_override(&base)
            }
            _ => SourceBase::from_config_repo(&cli_args.config_repo)?,
        };
        let workdir = match cli_args.workdir {
            Some(dir) => dir,
            None => Self::default_workdir()?,
        };
        Ok(GitMoverConfig {
            config_repo: cli_args.config_repo,
            destination: cli_args.destination,
            user: cli_args.user,
            token: cli_args.token,
            interactive: cli_args.interactive,
            workdir,
            source_base,
        })
    }

    /// `tmp/` next to the running executable
    /// # Errors
    /// Error if the executable path can't be found
    pub fn default_workdir() -> Result<PathBuf, GitMoverError> {
        let exe = env::current_exe()?;
        match exe.parent() {
            Some(dir) => Ok(dir.join(WORKDIR_NAME)),
            None => Err("Unable to find the directory of the executable".into()),
        }
    }
}

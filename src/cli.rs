//! Command line options for the gitolite-mover tool
use std::path::PathBuf;

use clap::Parser;
use colored::Colorize;
use url::Url;

use crate::{
    admin::fetch_repo_list, config::GitMoverConfig, errors::GitMoverError, git::Git2Backend,
    gitlab::platform::GitlabPlatform, store::WorkdirStore,
    sync::{migrate_all, Confirm, Migrator, StdinConfirm},
};

/// gitolite-mover - Mirror gitolite repositories into private GitLab projects
#[derive(Parser, Clone, Debug)]
#[command(version)]
pub struct GitMoverCli {
    /// Ask before migrating each repository
    #[arg(short, long)]
    pub interactive: bool,

    /// Working directory (defaults to tmp/ next to the executable)
    #[arg(short, long)]
    pub workdir: Option<PathBuf>,

    /// Verbose mode (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Address of the gitolite-admin repository (e.g. git@host:gitolite-admin)
    pub config_repo: String,

    /// GitLab URL, protocol included (e.g. https://gitlab.example.com)
    #[arg(value_parser = parse_destination)]
    pub destination: Url,

    /// GitLab user owning the new projects
    pub user: String,

    /// GitLab private token
    pub token: String,
}

/// Parse the destination URL, refusing addresses without protocol
fn parse_destination(value: &str) -> Result<Url, String> {
    if !value.contains("://") {
        return Err(format!("'{value}' has no protocol (e.g. https://{value})"));
    }
    let url = Url::parse(value).map_err(|e| e.to_string())?;
    if url.host_str().is_none() {
        return Err(format!("'{value}' has no host"));
    }
    Ok(url)
}

/// Log level for a number of `-v`
fn log_level(verbose: u8) -> log::LevelFilter {
    match verbose {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    }
}

/// Run the gitolite-mover tool with the command line options
/// # Errors
/// Error if the migration stops
pub async fn gitolite_mover_main() -> Result<(), GitMoverError> {
    dotenv::dotenv().ok();
    let args = GitMoverCli::parse();
    env_logger::builder()
        .filter_level(log_level(args.verbose))
        .format_target(false)
        .format_timestamp(None)
        .init();
    let config = GitMoverConfig::try_new(args)?;
    let store = WorkdirStore::try_new(&config.workdir)?;
    let git = Git2Backend;

    eprintln!("{}", format!("Fetching {}", config.config_repo).cyan());
    let repos = fetch_repo_list(&git, &store, &config.config_repo)?;

    let platform = GitlabPlatform::new(&config.destination, config.user.clone(), config.token.clone())?;
    let migrator = Migrator::new(&store, &git, &platform, &config.source_base);
    let mut stdin_confirm = StdinConfirm;
    let confirm: Option<&mut dyn Confirm> = if config.interactive {
        Some(&mut stdin_confirm)
    } else {
        None
    };
    let summary = migrate_all(&migrator, &repos, confirm).await?;
    eprintln!("{}", summary.to_string().bold());
    Ok(())
}

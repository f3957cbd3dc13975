mod commands;
mod config;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use locale_sync::AddOptions;
use locale_sync_crowdin::CrowdinClient;
use locale_sync_git::GitRepositories;
use locale_sync_store::UpdateStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::commands::pull::{PullScope, PullSettings};
use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "locale-sync")]
#[command(about = "Synchronize mod localization files between git repositories and Crowdin")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Onboard repositories into the translation project
    Add {
        /// Repositories as owner/name (defaults to every configured repository)
        repositories: Vec<String>,
        /// Treat an existing project directory as an error
        #[arg(long)]
        first_run: bool,
    },
    /// Upload changed source-language files of a repository
    Push {
        /// Repository as owner/name
        repository: String,
        /// Changed paths relative to the repository root
        files: Vec<String>,
    },
    /// Pull translations from the project into repositories
    Pull {
        /// Pull a single repository (owner/name)
        #[arg(long, conflicts_with = "if_due")]
        repo: Option<String>,
        /// Skip the run unless the update period has elapsed
        #[arg(long)]
        if_due: bool,
    },
    /// Show when translations were last pulled
    Status,
    /// Delete a repository's directory from the translation project
    DeleteDirectory {
        /// Project directory name, e.g. "Factorio Mod Example (dima74)"
        name: String,
    },
}

fn cache_dir() -> Result<PathBuf> {
    let base = dirs::cache_dir().context("could not determine cache directory")?;
    let dir = base.join("locale-sync");
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create cache directory: {}", dir.display()))?;
    Ok(dir)
}

fn open_store() -> Result<UpdateStore> {
    let path = cache_dir()?.join("updates.db");
    UpdateStore::open(&path).map_err(|e| anyhow::anyhow!("{e}"))
}

fn github_token() -> Option<String> {
    std::env::var("GITHUB_TOKEN").ok()
}

fn build_project(config: &AppConfig) -> Result<CrowdinClient> {
    Ok(CrowdinClient::new(config.crowdin_config()?))
}

fn build_repositories(config: &AppConfig) -> Result<GitRepositories> {
    let token = github_token();
    let entries = config.repository_entries(token.as_deref())?;
    Ok(GitRepositories::new(entries))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "locale_sync=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = config::load_config();

    match cli.command {
        Command::Add {
            repositories,
            first_run,
        } => {
            let project = build_project(&config)?;
            let vcs = build_repositories(&config)?;
            let options = AddOptions {
                tolerate_existing_directory: !first_run,
            };
            commands::add::run(&project, &vcs, &repositories, options, config.concurrency).await
        }
        Command::Push { repository, files } => {
            let project = build_project(&config)?;
            let vcs = build_repositories(&config)?;
            commands::push::run(&project, &vcs, &repository, files).await
        }
        Command::Pull { repo, if_due } => {
            let project = build_project(&config)?;
            let vcs = build_repositories(&config)?;
            let store = open_store()?;
            let identity = config.commit_identity();
            let scope = match (repo, if_due) {
                (Some(name), _) => PullScope::Single(name),
                (None, true) => PullScope::IfDue,
                (None, false) => PullScope::All,
            };
            let settings = PullSettings {
                identity: &identity,
                period: config.update_period(),
                concurrency: config.concurrency,
            };
            commands::pull::run(&project, &vcs, &store, scope, settings).await
        }
        Command::Status => {
            let store = open_store()?;
            commands::status::run(&store, config.update_period(), config.repositories.len())
        }
        Command::DeleteDirectory { name } => {
            let project = build_project(&config)?;
            commands::delete::run(&project, &name).await
        }
    }
}

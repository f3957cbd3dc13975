use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use locale_sync::{CommitIdentity, RepositoryName};
use locale_sync_crowdin::CrowdinConfig;
use locale_sync_git::{CheckoutSource, RepositoryEntry, github_clone_url};
use serde::{Deserialize, Serialize};

/// Top-level application configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub crowdin: CrowdinSection,
    #[serde(default)]
    pub commit: CommitSection,
    /// Owners whose project directories `delete-directory` may remove.
    #[serde(default = "default_allowed_owners")]
    pub allowed_owners: Vec<String>,
    /// Repositories processed at the same time by batch commands.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default = "default_update_period_days")]
    pub update_period_days: u64,
    #[serde(default)]
    pub repositories: Vec<RepositoryConfig>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CrowdinSection {
    pub project_id: Option<String>,
    pub api_key: Option<String>,
    pub api_base_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CommitSection {
    #[serde(default = "default_author_name")]
    pub author_name: String,
    #[serde(default = "default_author_email")]
    pub author_email: String,
    #[serde(default = "default_message")]
    pub message: String,
}

impl Default for CommitSection {
    fn default() -> Self {
        Self {
            author_name: default_author_name(),
            author_email: default_author_email(),
            message: default_message(),
        }
    }
}

/// A repository under management.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RepositoryConfig {
    /// `owner/name`
    pub full_name: String,
    pub id: Option<u64>,
    /// Existing local checkout to use instead of cloning.
    pub path: Option<PathBuf>,
    pub clone_url: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            crowdin: CrowdinSection::default(),
            commit: CommitSection::default(),
            allowed_owners: default_allowed_owners(),
            concurrency: default_concurrency(),
            update_period_days: default_update_period_days(),
            repositories: Vec::new(),
        }
    }
}

fn default_allowed_owners() -> Vec<String> {
    vec!["factorio-mods-helper".into()]
}

fn default_concurrency() -> usize {
    1
}

fn default_update_period_days() -> u64 {
    7
}

fn default_author_name() -> String {
    CommitIdentity::default().author_name
}

fn default_author_email() -> String {
    CommitIdentity::default().author_email
}

fn default_message() -> String {
    CommitIdentity::default().message
}

impl AppConfig {
    /// Let `CROWDIN_PROJECT_ID` and `CROWDIN_API_KEY` override the file.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(project_id) = lookup("CROWDIN_PROJECT_ID") {
            self.crowdin.project_id = Some(project_id);
        }
        if let Some(api_key) = lookup("CROWDIN_API_KEY") {
            self.crowdin.api_key = Some(api_key);
        }
    }

    pub fn crowdin_config(&self) -> Result<CrowdinConfig> {
        let project_id = self
            .crowdin
            .project_id
            .clone()
            .context("Crowdin project id is not set (CROWDIN_PROJECT_ID or [crowdin] project_id)")?;
        let api_key = self
            .crowdin
            .api_key
            .clone()
            .context("Crowdin API key is not set (CROWDIN_API_KEY or [crowdin] api_key)")?;

        Ok(CrowdinConfig {
            project_id,
            api_key,
            api_base_url: self.crowdin.api_base_url.clone(),
            allowed_owners: self.allowed_owners.clone(),
        })
    }

    pub fn commit_identity(&self) -> CommitIdentity {
        CommitIdentity {
            author_name: self.commit.author_name.clone(),
            author_email: self.commit.author_email.clone(),
            message: self.commit.message.clone(),
        }
    }

    pub fn update_period(&self) -> Duration {
        Duration::from_secs(self.update_period_days * 24 * 60 * 60)
    }

    /// Checkout sources for every configured repository. Repositories
    /// without a path or clone URL are cloned from GitHub, with `token`
    /// when given.
    pub fn repository_entries(&self, token: Option<&str>) -> Result<Vec<RepositoryEntry>> {
        self.repositories
            .iter()
            .enumerate()
            .map(|(index, repo)| {
                let name: RepositoryName = repo
                    .full_name
                    .parse()
                    .with_context(|| format!("invalid repository in config: {}", repo.full_name))?;
                let source = match (&repo.path, &repo.clone_url) {
                    (Some(path), _) => CheckoutSource::Local(path.clone()),
                    (None, Some(url)) => CheckoutSource::Remote(url.clone()),
                    (None, None) => CheckoutSource::Remote(github_clone_url(&name, token)),
                };
                Ok(RepositoryEntry {
                    id: repo.id.unwrap_or(index as u64 + 1),
                    name,
                    source,
                })
            })
            .collect()
    }
}

/// Config file path: `~/.config/locale-sync/config.toml`
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("locale-sync").join("config.toml"))
}

/// Load config from file, falling back to defaults if missing or invalid.
/// Environment overrides are applied either way.
pub fn load_config() -> AppConfig {
    let mut config = read_config_file().unwrap_or_default();
    config.apply_env(|key| std::env::var(key).ok());
    config
}

fn read_config_file() -> Option<AppConfig> {
    let path = config_path()?;
    let contents = std::fs::read_to_string(&path).ok()?;
    match toml::from_str::<AppConfig>(&contents) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!("failed to parse config at {}, using defaults: {e}", path.display());
            None
        }
    }
}

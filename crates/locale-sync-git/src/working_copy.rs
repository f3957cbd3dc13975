use std::path::PathBuf;

use locale_sync::{CommitIdentity, Repository, RepositoryName, SyncError, WorkingCopy};
use tempfile::TempDir;

use crate::command::git;

/// A git checkout on local disk.
///
/// Clones live in a temporary directory that is removed together with the
/// working copy.
pub struct GitWorkingCopy {
    repository: Repository,
    /// Branch commits are pushed to; the upstream of the checkout when `None`.
    branch: Option<String>,
    _checkout: Option<TempDir>,
}

impl GitWorkingCopy {
    /// Use an existing checkout at `path`.
    pub fn open(name: RepositoryName, path: impl Into<PathBuf>) -> Result<Self, SyncError> {
        let path = path.into();
        if !path.is_dir() {
            return Err(SyncError::VersionControl(format!(
                "working copy of {name} not found at {}",
                path.display()
            )));
        }
        Ok(Self {
            repository: Repository::new(name, path),
            branch: None,
            _checkout: None,
        })
    }

    /// Shallow-clone `url` into a fresh temporary directory.
    pub async fn clone(name: RepositoryName, url: &str) -> Result<Self, SyncError> {
        let dir = tempfile::tempdir()?;
        tracing::info!(repository = %name, "cloning");
        git(dir.path(), &["clone", "--depth", "1", url, "."]).await?;

        Ok(Self {
            repository: Repository::new(name, dir.path()),
            branch: None,
            _checkout: Some(dir),
        })
    }

    /// Replace the checkout with the tip of `branch` from `origin` and push
    /// future commits there.
    pub async fn switch_branch(&mut self, branch: &str) -> Result<(), SyncError> {
        let root = &self.repository.root;
        tracing::info!(repository = %self.repository.name, branch, "switching branch");
        git(root, &["fetch", "--depth", "1", "origin", branch]).await?;
        git(root, &["checkout", "-B", branch, "FETCH_HEAD"]).await?;
        self.branch = Some(branch.to_owned());
        Ok(())
    }
}

#[async_trait::async_trait]
impl WorkingCopy for GitWorkingCopy {
    fn repository(&self) -> &Repository {
        &self.repository
    }

    async fn commit_and_push(&self, identity: &CommitIdentity) -> Result<bool, SyncError> {
        let root = &self.repository.root;
        git(root, &["add", "."]).await?;

        let status = git(root, &["status", "--porcelain"]).await?;
        if status.iter().all(u8::is_ascii_whitespace) {
            return Ok(false);
        }

        let user_name = format!("user.name={}", identity.author_name);
        let user_email = format!("user.email={}", identity.author_email);
        git(
            root,
            &["-c", &user_name, "-c", &user_email, "commit", "-m", &identity.message],
        )
        .await?;
        match &self.branch {
            Some(branch) => {
                let refspec = format!("HEAD:refs/heads/{branch}");
                git(root, &["push", "origin", &refspec]).await?;
            }
            None => {
                git(root, &["push"]).await?;
            }
        }

        tracing::info!(repository = %self.repository.name, "pushed commit");
        Ok(true)
    }
}

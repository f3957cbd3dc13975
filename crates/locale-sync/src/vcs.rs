use crate::error::SyncError;
use crate::layout::RepositoryLayout;
use crate::repository::{Repository, RepositoryName};

/// A repository the engine can see on the source-control side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryRef {
    pub id: u64,
    pub name: RepositoryName,
}

impl RepositoryRef {
    pub fn new(id: u64, name: RepositoryName) -> Self {
        Self { id, name }
    }
}

/// A repository together with the mods it declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedRepository {
    pub repository: RepositoryRef,
    pub layout: RepositoryLayout,
}

/// Author identity and message used for translation commits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitIdentity {
    pub author_name: String,
    pub author_email: String,
    pub message: String,
}

impl Default for CommitIdentity {
    fn default() -> Self {
        Self {
            author_name: "Factorio Mods Helper".into(),
            author_email: "factorio-mods-helper@users.noreply.github.com".into(),
            message: "Update translations from Crowdin".into(),
        }
    }
}

/// A checked-out repository on local disk.
#[async_trait::async_trait]
pub trait WorkingCopy: Send + Sync {
    fn repository(&self) -> &Repository;

    /// Stage everything, and if anything changed commit with `identity`
    /// and push. Returns whether there were changes.
    async fn commit_and_push(&self, identity: &CommitIdentity) -> Result<bool, SyncError>;
}

/// Source-control side of the engine: enumerates repositories and
/// materializes working copies on demand.
#[async_trait::async_trait]
pub trait VersionControl: Send + Sync {
    async fn list_repositories(&self) -> Result<Vec<RepositoryRef>, SyncError>;

    /// Clone (or locate an existing checkout of) a repository, on the
    /// branch its layout names if it names one.
    async fn checkout(&self, repo: &RepositoryRef) -> Result<Box<dyn WorkingCopy>, SyncError>;

    /// Read the repository's `factorio-mods-localization.json`.
    ///
    /// The provided implementation checks the repository out; backends with
    /// a cheaper way to read a single file should override it.
    async fn repository_layout(&self, repo: &RepositoryRef) -> Result<RepositoryLayout, SyncError> {
        let working_copy = self.checkout(repo).await?;
        RepositoryLayout::read(&working_copy.repository().root)
    }

    /// Find a visible repository by `owner/name`.
    async fn find_repository(&self, name: &RepositoryName) -> Result<Option<RepositoryRef>, SyncError> {
        Ok(self
            .list_repositories()
            .await?
            .into_iter()
            .find(|repo| &repo.name == name))
    }
}

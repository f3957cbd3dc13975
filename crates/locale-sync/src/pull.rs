//! Distribution of project translations back into repositories.

use std::time::{Duration, SystemTime};

use crate::batch::{BatchReport, run_batch};
use crate::error::SyncError;
use crate::layout::RepositoryLayout;
use crate::movement::copy_translations_into;
use crate::project::{TranslationProject, TranslationsArchive};
use crate::repository::RepositoryName;
use crate::update::{UpdateLog, is_update_due};
use crate::vcs::{CommitIdentity, RepositoryRef, TrackedRepository, VersionControl, WorkingCopy};

/// What a pull did to one repository.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PullOutcome {
    pub languages: Vec<String>,
    pub files: usize,
    /// Whether a commit was pushed. False when the translations were
    /// already up to date.
    pub pushed: bool,
}

/// Copy the translations of every mod in `layout` from `archive` into the
/// working copy, then commit the result once if anything changed.
pub async fn pull_repository(
    archive: &TranslationsArchive,
    working_copy: &dyn WorkingCopy,
    layout: &RepositoryLayout,
    identity: &CommitIdentity,
) -> Result<PullOutcome, SyncError> {
    let repo = working_copy.repository();
    let mut outcome = PullOutcome::default();
    for location in layout.mods_in(repo) {
        let copied = copy_translations_into(archive, &location)?;
        for language in copied.languages {
            if !outcome.languages.contains(&language) {
                outcome.languages.push(language);
            }
        }
        outcome.files += copied.files;
    }
    outcome.pushed = working_copy.commit_and_push(identity).await?;

    if outcome.pushed {
        tracing::info!(repository = %repo.name, files = outcome.files, "pushed updated translations");
    } else {
        tracing::info!(repository = %repo.name, "translations already up to date");
    }
    Ok(outcome)
}

async fn track(vcs: &dyn VersionControl, repository: RepositoryRef) -> Result<TrackedRepository, SyncError> {
    let layout = vcs.repository_layout(&repository).await?;
    Ok(TrackedRepository { repository, layout })
}

/// Repositories taking part in a full pull: those that did not opt out of
/// scheduled updates, narrowed to the mods with a project directory.
///
/// A repository whose layout cannot be read is logged and left out.
async fn managed_repositories(
    project: &dyn TranslationProject,
    vcs: &dyn VersionControl,
) -> Result<Vec<TrackedRepository>, SyncError> {
    let mut tracked = Vec::new();
    for repository in vcs.list_repositories().await? {
        let name = repository.name.clone();
        match track(vcs, repository).await {
            Ok(entry) if !entry.layout.weekly_update => {
                tracing::info!(repository = %name, "repository opted out of scheduled updates, skipping");
            }
            Ok(entry) => tracked.push(entry),
            Err(e) => tracing::warn!(repository = %name, "cannot read repository settings: {e}"),
        }
    }
    project.filter_known_directories(tracked).await
}

/// Pull translations into every repository that has a project directory.
///
/// The project is exported once and the archive shared by all repositories.
/// A failing repository does not stop the others.
pub async fn pull_all(
    project: &dyn TranslationProject,
    vcs: &dyn VersionControl,
    identity: &CommitIdentity,
    concurrency: usize,
) -> Result<BatchReport<PullOutcome>, SyncError> {
    let repositories = managed_repositories(project, vcs).await?;
    if repositories.is_empty() {
        tracing::info!("no repositories are managed by the translation project");
        return Ok(BatchReport::default());
    }
    tracing::info!(repositories = repositories.len(), "pulling translations");

    let archive = project.export_and_download_all().await?;
    let archive = &archive;
    let jobs = repositories.into_iter().map(|tracked| {
        let name = tracked.repository.name.clone();
        let job = async move {
            let working_copy = vcs.checkout(&tracked.repository).await?;
            pull_repository(archive, working_copy.as_ref(), &tracked.layout, identity).await
        };
        (name, job)
    });

    Ok(run_batch(jobs, concurrency).await)
}

/// Pull translations into a single repository, whether or not it opted out
/// of scheduled updates.
///
/// Fails with [`SyncError::RepositoryNotFound`] if the repository is not
/// visible or none of its mods has a project directory.
pub async fn pull_one(
    project: &dyn TranslationProject,
    vcs: &dyn VersionControl,
    name: &RepositoryName,
    identity: &CommitIdentity,
) -> Result<PullOutcome, SyncError> {
    let repository = vcs
        .find_repository(name)
        .await?
        .ok_or_else(|| SyncError::RepositoryNotFound(name.clone()))?;
    let tracked = track(vcs, repository).await?;
    let tracked = project
        .filter_known_directories(vec![tracked])
        .await?
        .pop()
        .ok_or_else(|| SyncError::RepositoryNotFound(name.clone()))?;

    let archive = project.export_and_download_all().await?;
    let working_copy = vcs.checkout(&tracked.repository).await?;
    pull_repository(&archive, working_copy.as_ref(), &tracked.layout, identity).await
}

/// Run [`pull_all`] if the last recorded run is older than `period`, then
/// record this run. Returns `None` when no run was due.
pub async fn pull_all_if_due(
    project: &dyn TranslationProject,
    vcs: &dyn VersionControl,
    log: &dyn UpdateLog,
    period: Duration,
    identity: &CommitIdentity,
    concurrency: usize,
) -> Result<Option<BatchReport<PullOutcome>>, SyncError> {
    if !is_update_due(log, period, SystemTime::now()).await? {
        tracing::info!("translations were pulled recently, skipping");
        return Ok(None);
    }

    let report = pull_all(project, vcs, identity, concurrency).await?;
    log.record_update_now().await?;
    Ok(Some(report))
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use crate::repository::Repository;
    use crate::test_support::{FakeProject, FakeVersionControl, FakeWorkingCopy, MemoryUpdateLog};
    use crate::update::DEFAULT_UPDATE_PERIOD;

    use super::*;

    const DIR: &str = "Factorio Mod Example (dima74)";

    fn write(root: &Path, path: &str, content: &str) {
        let full = root.join(path);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, content).unwrap();
    }

    fn name() -> RepositoryName {
        RepositoryName::new("dima74", "factorio-mod-example")
    }

    fn checkout_with_source() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "locale/en/a.cfg", "[s]\nkey=Key\n");
        dir
    }

    #[tokio::test]
    async fn new_translation_is_committed() {
        let dir = checkout_with_source();
        let project = FakeProject::new().with_archive_file(&format!("fr/{DIR}/a.ini"), "[s]\nkey=Clé\n");
        let archive = project.export_and_download_all().await.unwrap();
        let working_copy = FakeWorkingCopy::open(Repository::new(name(), dir.path())).unwrap();
        let identity = CommitIdentity::default();

        let outcome = pull_repository(&archive, &working_copy, &RepositoryLayout::default(), &identity)
            .await
            .unwrap();

        assert!(outcome.pushed);
        assert_eq!(outcome.languages, vec!["fr"]);
        assert_eq!(
            fs::read_to_string(dir.path().join("locale/fr/a.cfg")).unwrap(),
            "[s]\nkey=Clé\n"
        );
        let commits = working_copy.commits();
        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].identity, identity);
    }

    #[tokio::test]
    async fn empty_translation_is_pruned() {
        let dir = checkout_with_source();
        let project = FakeProject::new().with_archive_file(&format!("fr/{DIR}/a.ini"), "[s]\n\n");
        let archive = project.export_and_download_all().await.unwrap();
        let working_copy = FakeWorkingCopy::open(Repository::new(name(), dir.path())).unwrap();

        let outcome = pull_repository(&archive, &working_copy, &RepositoryLayout::default(), &CommitIdentity::default())
            .await
            .unwrap();

        assert!(!outcome.pushed);
        assert!(!dir.path().join("locale/fr/a.cfg").exists());
        assert!(working_copy.commits().is_empty());
    }

    #[tokio::test]
    async fn unchanged_translation_is_not_committed() {
        let dir = checkout_with_source();
        write(dir.path(), "locale/fr/a.cfg", "[s]\nkey=Clé\n");
        let project = FakeProject::new().with_archive_file(&format!("fr/{DIR}/a.ini"), "[s]\nkey=Clé\n");
        let archive = project.export_and_download_all().await.unwrap();
        let working_copy = FakeWorkingCopy::open(Repository::new(name(), dir.path())).unwrap();

        let outcome = pull_repository(&archive, &working_copy, &RepositoryLayout::default(), &CommitIdentity::default())
            .await
            .unwrap();

        assert_eq!(outcome.files, 1);
        assert!(!outcome.pushed);
        assert!(working_copy.commits().is_empty());
    }

    #[tokio::test]
    async fn pull_all_skips_unmanaged_and_survives_failures() {
        let managed = checkout_with_source();
        let broken = checkout_with_source();
        let unmanaged = checkout_with_source();
        let broken_name = RepositoryName::new("owner", "broken-mod");

        let vcs = FakeVersionControl::new()
            .with_repository(name(), managed.path())
            .with_repository(broken_name.clone(), broken.path())
            .with_repository(RepositoryName::new("owner", "unmanaged"), unmanaged.path())
            .with_failing_checkout(broken_name.clone());
        let project = FakeProject::new()
            .with_directory(DIR, &["a.ini"])
            .with_directory("Broken Mod (owner)", &["a.ini"])
            .with_archive_file(&format!("de/{DIR}/a.ini"), "[s]\nkey=Schlüssel\n");

        let report = pull_all(&project, &vcs, &CommitIdentity::default(), 2).await.unwrap();

        assert_eq!(report.len(), 2);
        assert_eq!(report.failure_count(), 1);
        assert_eq!(report.failed().next().unwrap().0, &broken_name);
        assert!(managed.path().join("locale/de/a.cfg").exists());
        assert_eq!(vcs.commits().len(), 1);
        assert_eq!(project.calls().iter().filter(|c| *c == "export").count(), 1);
    }

    #[tokio::test]
    async fn pull_all_skips_repository_that_opted_out() {
        let opted_out = checkout_with_source();
        write(
            opted_out.path(),
            "factorio-mods-localization.json",
            r#"{"weekly_update_from_crowdin": false}"#,
        );
        let vcs = FakeVersionControl::new().with_repository(name(), opted_out.path());
        let project = FakeProject::new()
            .with_directory(DIR, &["a.ini"])
            .with_archive_file(&format!("fr/{DIR}/a.ini"), "[s]\nkey=Clé\n");

        let report = pull_all(&project, &vcs, &CommitIdentity::default(), 1).await.unwrap();

        assert!(report.is_empty());
        assert!(vcs.checkouts().is_empty());
        assert!(!opted_out.path().join("locale/fr/a.cfg").exists());

        let outcome = pull_one(&project, &vcs, &name(), &CommitIdentity::default()).await.unwrap();
        assert!(outcome.pushed);
        assert!(opted_out.path().join("locale/fr/a.cfg").exists());
    }

    #[tokio::test]
    async fn pull_all_copies_every_known_mod_in_one_commit() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "factorio-mods-localization.json", r#"["first", "second", "third"]"#);
        for subpath in ["first", "second", "third"] {
            write(dir.path(), &format!("{subpath}/locale/en/a.cfg"), "[s]\nkey=Key\n");
        }
        let pack = RepositoryName::new("owner", "pack");
        let vcs = FakeVersionControl::new().with_repository(pack.clone(), dir.path());
        let project = FakeProject::new()
            .with_directory("Pack - First (owner)", &["a.ini"])
            .with_directory("Pack - Second (owner)", &["a.ini"])
            .with_archive_file("fr/Pack - First (owner)/a.ini", "[s]\nkey=Un\n")
            .with_archive_file("de/Pack - Second (owner)/a.ini", "[s]\nkey=Zwei\n")
            .with_archive_file("fr/Pack - Third (owner)/a.ini", "[s]\nkey=Trois\n");

        let report = pull_all(&project, &vcs, &CommitIdentity::default(), 1).await.unwrap();

        let (_, outcome) = report.succeeded().next().unwrap();
        assert_eq!(outcome.files, 2);
        assert_eq!(outcome.languages, vec!["fr", "de"]);
        assert!(dir.path().join("first/locale/fr/a.cfg").exists());
        assert!(dir.path().join("second/locale/de/a.cfg").exists());
        assert!(!dir.path().join("third/locale/fr/a.cfg").exists());
        assert_eq!(vcs.commits().len(), 1);
    }

    #[tokio::test]
    async fn pull_one_reports_unknown_repository() {
        let dir = checkout_with_source();
        let vcs = FakeVersionControl::new().with_repository(name(), dir.path());
        let project = FakeProject::new();

        let result = pull_one(&project, &vcs, &name(), &CommitIdentity::default()).await;

        assert!(matches!(result, Err(SyncError::RepositoryNotFound(n)) if n == name()));
        assert!(project.calls().is_empty());
    }

    #[tokio::test]
    async fn pull_one_updates_named_repository() {
        let dir = checkout_with_source();
        let vcs = FakeVersionControl::new().with_repository(name(), dir.path());
        let project = FakeProject::new()
            .with_directory(DIR, &["a.ini"])
            .with_archive_file(&format!("ru/{DIR}/a.ini"), "[s]\nkey=Ключ\n");

        let outcome = pull_one(&project, &vcs, &name(), &CommitIdentity::default()).await.unwrap();

        assert!(outcome.pushed);
        assert_eq!(outcome.languages, vec!["ru"]);
    }

    #[tokio::test]
    async fn scheduled_pull_records_run_and_waits_for_period() {
        let dir = checkout_with_source();
        let vcs = FakeVersionControl::new().with_repository(name(), dir.path());
        let project = FakeProject::new().with_directory(DIR, &["a.ini"]);
        let log = MemoryUpdateLog::default();
        let identity = CommitIdentity::default();

        let first = pull_all_if_due(&project, &vcs, &log, DEFAULT_UPDATE_PERIOD, &identity, 1)
            .await
            .unwrap();
        assert!(first.is_some());
        assert!(log.last_update_time().await.unwrap().is_some());

        let second = pull_all_if_due(&project, &vcs, &log, DEFAULT_UPDATE_PERIOD, &identity, 1)
            .await
            .unwrap();
        assert!(second.is_none());
    }
}

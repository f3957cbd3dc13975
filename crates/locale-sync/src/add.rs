//! Onboarding: first upload of a repository into the translation project.

use crate::batch::{BatchReport, run_batch};
use crate::error::SyncError;
use crate::index::{LocaleInventory, list_language_codes, verify_localizations_match_source};
use crate::project::TranslationProject;
use crate::repository::Repository;
use crate::vcs::{RepositoryRef, VersionControl};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddOptions {
    /// Treat an existing project directory as already created instead of
    /// failing with [`SyncError::DirectoryConflict`].
    pub tolerate_existing_directory: bool,
}

impl Default for AddOptions {
    fn default() -> Self {
        Self {
            tolerate_existing_directory: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OnboardReport {
    /// Languages that had to be added to the project configuration.
    pub new_languages: Vec<String>,
    pub source_files: usize,
    pub translated_files: usize,
}

impl OnboardReport {
    fn merge(&mut self, other: OnboardReport) {
        self.new_languages.extend(other.new_languages);
        self.source_files += other.source_files;
        self.translated_files += other.translated_files;
    }
}

/// Upload one repository's source and translated files.
///
/// Validation runs before anything is sent: a missing `locale/en` or a
/// translation without a source file aborts without touching the project.
/// The first failed upload stops the repository.
pub async fn onboard_repository(
    project: &dyn TranslationProject,
    repo: &Repository,
    options: AddOptions,
) -> Result<OnboardReport, SyncError> {
    let inventory = LocaleInventory::read(repo)?;
    verify_localizations_match_source(repo)?;

    let repository_codes: Vec<String> = list_language_codes(repo)?.into_iter().collect();
    let new_languages = project.reconcile_project_languages(&repository_codes).await?;

    let directory = repo.project_directory();
    match project.create_directory(directory.as_str()).await {
        Ok(()) => tracing::info!(repository = %repo.name, "created project directory \"{directory}\""),
        Err(SyncError::DirectoryConflict(_)) if options.tolerate_existing_directory => {
            tracing::info!(repository = %repo.name, "project directory \"{directory}\" already exists");
        }
        Err(e) => return Err(e),
    }

    for file in &inventory.source_files {
        project.add_source_file(directory.as_str(), file).await?;
    }

    for (language, files) in &inventory.localizations {
        for file in files {
            project
                .upload_translated_file(directory.as_str(), language, file)
                .await?;
        }
    }

    let report = OnboardReport {
        new_languages,
        source_files: inventory.source_files.len(),
        translated_files: inventory.translated_file_count(),
    };
    tracing::info!(
        repository = %repo.name,
        directory = %directory,
        source_files = report.source_files,
        translated_files = report.translated_files,
        "onboarding finished"
    );
    Ok(report)
}

/// Check out and onboard every mod of every repository in `repositories`.
///
/// Each repository succeeds or fails on its own; failures are kept in the
/// returned report.
pub async fn onboard_all(
    project: &dyn TranslationProject,
    vcs: &dyn VersionControl,
    repositories: Vec<RepositoryRef>,
    options: AddOptions,
    concurrency: usize,
) -> BatchReport<OnboardReport> {
    let jobs = repositories.into_iter().map(|repo| {
        let name = repo.name.clone();
        let job = async move {
            let layout = vcs.repository_layout(&repo).await?;
            let working_copy = vcs.checkout(&repo).await?;
            let mut report = OnboardReport::default();
            for location in layout.mods_in(working_copy.repository()) {
                report.merge(onboard_repository(project, &location, options).await?);
            }
            Ok(report)
        };
        (name, job)
    });

    run_batch(jobs, concurrency).await
}

//! Incremental upload of edited source-language files.

use std::collections::HashSet;

use crate::error::SyncError;
use crate::index::verify_localizations_match_source;
use crate::language::SOURCE_LANGUAGE;
use crate::naming::{is_translatable_file, to_project_file_name};
use crate::project::TranslationProject;
use crate::repository::{LOCALE_DIRECTORY, Repository};
use crate::vcs::{RepositoryRef, VersionControl};

/// Paths touched by one commit of a push event, relative to the repository root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PushCommit {
    pub added: Vec<String>,
    pub modified: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PushReport {
    /// Source files uploaded for the first time.
    pub added: Vec<String>,
    /// Source files re-uploaded over an existing project file.
    pub updated: Vec<String>,
}

impl PushReport {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.updated.is_empty()
    }
}

/// All added and modified paths of a push, first occurrence wins.
pub fn changed_files_from_commits(commits: &[PushCommit]) -> Vec<String> {
    let mut seen = HashSet::new();
    commits
        .iter()
        .flat_map(|commit| commit.added.iter().chain(&commit.modified))
        .filter(|path| seen.insert(path.as_str()))
        .cloned()
        .collect()
}

/// File names of the source-language files among `paths`.
///
/// Only direct children of `locale/en/` with the source extension count;
/// everything else is ignored.
pub fn source_changes<I, S>(paths: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    source_changes_in(LOCALE_DIRECTORY, paths)
}

/// [`source_changes`] for a mod whose locale tree is at `locale_path`.
pub fn source_changes_in<I, S>(locale_path: &str, paths: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let prefix = format!("{locale_path}/{SOURCE_LANGUAGE}/");
    let mut names: Vec<String> = Vec::new();
    for path in paths {
        let Some(name) = path.as_ref().strip_prefix(&prefix) else {
            continue;
        };
        if name.contains('/') || !is_translatable_file(name) {
            continue;
        }
        if !names.iter().any(|n| n == name) {
            names.push(name.to_owned());
        }
    }
    names
}

/// Upload the named source files of `repo`, choosing update for files the
/// project already has and add for new ones.
pub async fn push_source_changes(
    project: &dyn TranslationProject,
    repo: &Repository,
    file_names: &[String],
) -> Result<PushReport, SyncError> {
    if file_names.is_empty() {
        tracing::info!(repository = %repo.name, "no source-language changes to upload");
        return Ok(PushReport::default());
    }

    let directory = repo.project_directory();
    let directories = project.list_directories().await?;
    if !directories.iter().any(|d| d == directory.as_str()) {
        return Err(SyncError::DirectoryNotFound(directory.to_string()));
    }

    match verify_localizations_match_source(repo) {
        Ok(()) => {}
        Err(SyncError::OrphanFile { language, file }) => {
            tracing::warn!(
                repository = %repo.name,
                "translation {language}/{file} has no source file"
            );
        }
        Err(e) => return Err(e),
    }

    let existing: HashSet<String> = project
        .list_project_files(directory.as_str())
        .await?
        .into_iter()
        .collect();

    let mut report = PushReport::default();
    for name in file_names {
        let path = repo.source_language_path().join(name);
        if !path.is_file() {
            tracing::warn!(repository = %repo.name, "changed file {name} is not in the working copy, skipping");
            continue;
        }

        if existing.contains(&to_project_file_name(name)) {
            project.update_source_file(directory.as_str(), &path).await?;
            report.updated.push(name.clone());
        } else {
            project.add_source_file(directory.as_str(), &path).await?;
            report.added.push(name.clone());
        }
    }

    tracing::info!(
        repository = %repo.name,
        added = report.added.len(),
        updated = report.updated.len(),
        "source changes uploaded"
    );
    Ok(report)
}

/// Handle a push event for one repository.
///
/// The repository is only checked out if the push touched source files of
/// at least one of its mods.
pub async fn on_push(
    project: &dyn TranslationProject,
    vcs: &dyn VersionControl,
    repo: &RepositoryRef,
    commits: &[PushCommit],
) -> Result<PushReport, SyncError> {
    let changed = changed_files_from_commits(commits);
    let layout = vcs.repository_layout(repo).await?;
    let changes: Vec<_> = layout
        .mods
        .iter()
        .map(|location| (location, source_changes_in(&location.locale_path, &changed)))
        .filter(|(_, file_names)| !file_names.is_empty())
        .collect();
    if changes.is_empty() {
        tracing::info!(repository = %repo.name, "push does not touch source-language files");
        return Ok(PushReport::default());
    }

    let working_copy = vcs.checkout(repo).await?;
    let checkout = working_copy.repository();
    let mut report = PushReport::default();
    for (location, file_names) in changes {
        let repo = location.in_checkout(&checkout.name, &checkout.root);
        let pushed = push_source_changes(project, &repo, &file_names).await?;
        report.added.extend(pushed.added);
        report.updated.extend(pushed.updated);
    }
    Ok(report)
}

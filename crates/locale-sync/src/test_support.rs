//! In-memory collaborators for pipeline tests.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::SystemTime;

use crate::error::SyncError;
use crate::ini::prepare_upload;
use crate::movement::prune_empty_translations;
use crate::naming::to_project_file_name;
use crate::project::{TranslationProject, TranslationsArchive};
use crate::layout::RepositoryLayout;
use crate::repository::{ProjectDirectory, Repository, RepositoryName};
use crate::update::UpdateLog;
use crate::vcs::{CommitIdentity, RepositoryRef, VersionControl, WorkingCopy};

const SUPPORTED_LANGUAGES: &[&str] = &["en", "fr", "de", "ru", "uk", "es-ES", "pt-BR", "zh-CN", "ja"];

#[derive(Default)]
struct ProjectState {
    supported: Vec<String>,
    languages: Vec<String>,
    /// directory -> project file name -> uploaded content
    directories: BTreeMap<String, BTreeMap<String, String>>,
    /// (language, directory, project file name) -> uploaded content
    translations: BTreeMap<(String, String, String), String>,
    /// Extra `<language>/<directory>/<file>` entries placed in every export.
    archive_extras: Vec<(String, String)>,
    /// (language, `<directory>/<file>`) pairs whose upload reports a failure.
    failing_translations: HashSet<(String, String)>,
    calls: Vec<String>,
}

/// Translation project kept in memory. Every call is appended to a log
/// readable through [`FakeProject::calls`].
pub struct FakeProject {
    state: Mutex<ProjectState>,
}

impl Default for FakeProject {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeProject {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ProjectState {
                supported: SUPPORTED_LANGUAGES.iter().map(|c| (*c).to_owned()).collect(),
                ..ProjectState::default()
            }),
        }
    }

    pub fn with_project_languages(self, codes: &[&str]) -> Self {
        self.lock().languages = codes.iter().map(|c| (*c).to_owned()).collect();
        self
    }

    pub fn with_supported_languages(self, codes: &[&str]) -> Self {
        self.lock().supported = codes.iter().map(|c| (*c).to_owned()).collect();
        self
    }

    /// Pre-populate a directory with empty source files.
    pub fn with_directory(self, name: &str, files: &[&str]) -> Self {
        self.lock().directories.insert(
            name.to_owned(),
            files.iter().map(|f| ((*f).to_owned(), String::new())).collect(),
        );
        self
    }

    /// Add a raw entry to every export, e.g. `fr/Some Mod (owner)/a.ini`.
    pub fn with_archive_file(self, path: &str, content: &str) -> Self {
        self.lock().archive_extras.push((path.to_owned(), content.to_owned()));
        self
    }

    /// Make translation uploads of `<directory>/<file>.ini` for `language`
    /// report a failed status.
    pub fn with_failing_translation(self, language: &str, project_path: &str) -> Self {
        self.lock()
            .failing_translations
            .insert((language.to_owned(), project_path.to_owned()));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    pub fn project_languages(&self) -> Vec<String> {
        self.lock().languages.clone()
    }

    pub fn directories(&self) -> Vec<String> {
        self.lock().directories.keys().cloned().collect()
    }

    pub fn source_content(&self, directory: &str, file: &str) -> Option<String> {
        self.lock().directories.get(directory)?.get(file).cloned()
    }

    pub fn translation(&self, language: &str, directory: &str, file: &str) -> Option<String> {
        self.lock()
            .translations
            .get(&(language.to_owned(), directory.to_owned(), file.to_owned()))
            .cloned()
    }

    fn lock(&self) -> MutexGuard<'_, ProjectState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn store_source(&self, call: &str, directory: &str, file: &Path) -> Result<(), SyncError> {
        let name = project_file_name(file);
        let content = prepare_upload(&fs::read_to_string(file)?);
        let path = ProjectDirectory::new(directory).file_path(&name);

        let mut state = self.lock();
        state.calls.push(format!("{call} {path}"));
        let files = state
            .directories
            .get_mut(directory)
            .ok_or_else(|| SyncError::DirectoryNotFound(directory.to_owned()))?;
        files.insert(name, content);
        Ok(())
    }
}

fn project_file_name(file: &Path) -> String {
    let name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    to_project_file_name(&name)
}

#[async_trait::async_trait]
impl TranslationProject for FakeProject {
    async fn supported_language_codes(&self) -> Result<Vec<String>, SyncError> {
        Ok(self.lock().supported.clone())
    }

    async fn project_language_codes(&self) -> Result<Vec<String>, SyncError> {
        Ok(self.lock().languages.clone())
    }

    async fn set_project_languages(&self, codes: &[String]) -> Result<(), SyncError> {
        let mut state = self.lock();
        state.calls.push(format!("set-languages {}", codes.join(",")));
        state.languages = codes.to_vec();
        Ok(())
    }

    async fn list_directories(&self) -> Result<Vec<String>, SyncError> {
        Ok(self.directories())
    }

    async fn list_project_files(&self, directory: &str) -> Result<Vec<String>, SyncError> {
        let state = self.lock();
        let files = state
            .directories
            .get(directory)
            .ok_or_else(|| SyncError::DirectoryNotFound(directory.to_owned()))?;
        Ok(files.keys().cloned().collect())
    }

    async fn create_directory(&self, name: &str) -> Result<(), SyncError> {
        let mut state = self.lock();
        state.calls.push(format!("create-directory {name}"));
        if state.directories.contains_key(name) {
            return Err(SyncError::DirectoryConflict(name.to_owned()));
        }
        state.directories.insert(name.to_owned(), BTreeMap::new());
        Ok(())
    }

    async fn add_source_file(&self, directory: &str, file: &Path) -> Result<(), SyncError> {
        self.store_source("add-source", directory, file)
    }

    async fn update_source_file(&self, directory: &str, file: &Path) -> Result<(), SyncError> {
        self.store_source("update-source", directory, file)
    }

    async fn upload_translated_file(
        &self,
        directory: &str,
        language: &str,
        file: &Path,
    ) -> Result<(), SyncError> {
        let name = project_file_name(file);
        let content = prepare_upload(&fs::read_to_string(file)?);
        let path = ProjectDirectory::new(directory).file_path(&name);

        let mut state = self.lock();
        state.calls.push(format!("upload-translation {language} {path}"));
        if state.failing_translations.contains(&(language.to_owned(), path.clone())) {
            return Err(SyncError::UploadStatus {
                file: path,
                status: "failed".into(),
            });
        }
        let has_source = state
            .directories
            .get(directory)
            .is_some_and(|files| files.contains_key(&name));
        if !has_source {
            return Err(SyncError::UnmatchedTranslation {
                language: language.to_owned(),
                file: path,
            });
        }
        state
            .translations
            .insert((language.to_owned(), directory.to_owned(), name), content);
        Ok(())
    }

    async fn export_and_download_all(&self) -> Result<TranslationsArchive, SyncError> {
        let dir = tempfile::tempdir()?;
        let entries: Vec<(String, String)> = {
            let mut state = self.lock();
            state.calls.push("export".into());
            state
                .translations
                .iter()
                .map(|((language, directory, file), content)| {
                    (format!("{language}/{directory}/{file}"), content.clone())
                })
                .chain(state.archive_extras.iter().cloned())
                .collect()
        };

        for (path, content) in entries {
            let target = dir.path().join(path);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(target, content)?;
        }
        prune_empty_translations(dir.path())?;
        Ok(TranslationsArchive::new(dir))
    }

    async fn delete_directory(&self, name: &str) -> Result<(), SyncError> {
        let mut state = self.lock();
        state.calls.push(format!("delete-directory {name}"));
        state
            .directories
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| SyncError::DirectoryNotFound(name.to_owned()))
    }
}

/// A commit observed by a [`FakeWorkingCopy`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    pub repository: RepositoryName,
    pub identity: CommitIdentity,
}

type CommitLog = Arc<Mutex<Vec<CommitRecord>>>;

/// Working copy over a plain directory. Changes are detected by comparing
/// the tree with the snapshot taken when the copy was opened.
pub struct FakeWorkingCopy {
    repository: Repository,
    snapshot: BTreeMap<PathBuf, Vec<u8>>,
    commits: CommitLog,
}

impl FakeWorkingCopy {
    pub fn open(repository: Repository) -> Result<Self, SyncError> {
        Self::with_log(repository, CommitLog::default())
    }

    fn with_log(repository: Repository, commits: CommitLog) -> Result<Self, SyncError> {
        let snapshot = snapshot(&repository.root)?;
        Ok(Self {
            repository,
            snapshot,
            commits,
        })
    }

    pub fn commits(&self) -> Vec<CommitRecord> {
        lock_commits(&self.commits).clone()
    }
}

#[async_trait::async_trait]
impl WorkingCopy for FakeWorkingCopy {
    fn repository(&self) -> &Repository {
        &self.repository
    }

    async fn commit_and_push(&self, identity: &CommitIdentity) -> Result<bool, SyncError> {
        if snapshot(&self.repository.root)? == self.snapshot {
            return Ok(false);
        }
        lock_commits(&self.commits).push(CommitRecord {
            repository: self.repository.name.clone(),
            identity: identity.clone(),
        });
        Ok(true)
    }
}

fn lock_commits(commits: &CommitLog) -> MutexGuard<'_, Vec<CommitRecord>> {
    commits.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn snapshot(root: &Path) -> Result<BTreeMap<PathBuf, Vec<u8>>, SyncError> {
    let mut files = BTreeMap::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            let path = entry.path();
            if entry.file_type()?.is_dir() {
                pending.push(path);
            } else {
                files.insert(path.clone(), fs::read(&path)?);
            }
        }
    }
    Ok(files)
}

/// Version control over directories prepared by the test.
#[derive(Default)]
pub struct FakeVersionControl {
    repositories: Vec<(RepositoryRef, PathBuf)>,
    failing_checkouts: HashSet<RepositoryName>,
    checkouts: Mutex<Vec<RepositoryName>>,
    commits: CommitLog,
}

impl FakeVersionControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_repository(mut self, name: RepositoryName, root: impl Into<PathBuf>) -> Self {
        let id = self.repositories.len() as u64 + 1;
        self.repositories.push((RepositoryRef::new(id, name), root.into()));
        self
    }

    pub fn with_failing_checkout(mut self, name: RepositoryName) -> Self {
        self.failing_checkouts.insert(name);
        self
    }

    pub fn repository_refs(&self) -> Vec<RepositoryRef> {
        self.repositories.iter().map(|(r, _)| r.clone()).collect()
    }

    pub fn checkouts(&self) -> Vec<RepositoryName> {
        self.checkouts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn commits(&self) -> Vec<CommitRecord> {
        lock_commits(&self.commits).clone()
    }

    fn root(&self, repo: &RepositoryRef) -> Result<&Path, SyncError> {
        self.repositories
            .iter()
            .find(|(r, _)| r.name == repo.name)
            .map(|(_, root)| root.as_path())
            .ok_or_else(|| SyncError::VersionControl(format!("unknown repository {}", repo.name)))
    }
}

#[async_trait::async_trait]
impl VersionControl for FakeVersionControl {
    async fn list_repositories(&self) -> Result<Vec<RepositoryRef>, SyncError> {
        Ok(self.repository_refs())
    }

    async fn checkout(&self, repo: &RepositoryRef) -> Result<Box<dyn WorkingCopy>, SyncError> {
        self.checkouts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(repo.name.clone());
        if self.failing_checkouts.contains(&repo.name) {
            return Err(SyncError::VersionControl(format!("clone of {} failed", repo.name)));
        }
        let working_copy =
            FakeWorkingCopy::with_log(Repository::new(repo.name.clone(), self.root(repo)?), self.commits.clone())?;
        Ok(Box::new(working_copy))
    }

    /// Reads the directory directly; no checkout is recorded.
    async fn repository_layout(&self, repo: &RepositoryRef) -> Result<RepositoryLayout, SyncError> {
        RepositoryLayout::read(self.root(repo)?)
    }
}

/// Update log held in memory.
#[derive(Debug, Default)]
pub struct MemoryUpdateLog(Mutex<Option<SystemTime>>);

impl MemoryUpdateLog {
    pub fn at(time: SystemTime) -> Self {
        Self(Mutex::new(Some(time)))
    }
}

#[async_trait::async_trait]
impl UpdateLog for MemoryUpdateLog {
    async fn last_update_time(&self) -> Result<Option<SystemTime>, SyncError> {
        Ok(*self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner()))
    }

    async fn record_update_now(&self) -> Result<(), SyncError> {
        *self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(SystemTime::now());
        Ok(())
    }
}

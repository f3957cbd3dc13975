use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::error::SyncError;
use crate::language::{SOURCE_LANGUAGE, normalize_language_code};
use crate::naming::directory_owner;
use crate::repository::ProjectDirectory;
use crate::vcs::TrackedRepository;

/// Extracted copy of every translation in the project.
///
/// Layout: `<root>/<language-code>/<project directory>/<file>.ini`.
/// The directory is removed when the archive is dropped.
#[derive(Debug)]
pub struct TranslationsArchive {
    dir: TempDir,
}

impl TranslationsArchive {
    pub fn new(dir: TempDir) -> Self {
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Language directories present in the archive, sorted.
    pub fn languages(&self) -> Result<Vec<String>, SyncError> {
        let mut languages = Vec::new();
        for entry in std::fs::read_dir(self.path())? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                languages.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        languages.sort();
        Ok(languages)
    }

    /// Files of one project directory for one language, sorted.
    /// Empty if the directory is absent for that language.
    pub fn files(&self, language: &str, directory: &ProjectDirectory) -> Result<Vec<PathBuf>, SyncError> {
        let path = directory.in_archive(self.path(), language);
        if !path.is_dir() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in std::fs::read_dir(&path)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                files.push(entry.path());
            }
        }
        files.sort();
        Ok(files)
    }
}

/// Refuse to delete a project directory whose `(owner)` suffix is not in
/// `allowed_owners`.
pub fn ensure_deletion_allowed(directory: &str, allowed_owners: &[String]) -> Result<(), SyncError> {
    match directory_owner(directory) {
        Some(owner) if allowed_owners.iter().any(|allowed| allowed == owner) => Ok(()),
        _ => Err(SyncError::ForbiddenDeletion(directory.to_owned())),
    }
}

/// All state-changing and reading operations against the translation
/// project. Implementations decode backend-specific error codes into
/// [`SyncError`] variants so callers never inspect response bodies.
#[async_trait::async_trait]
pub trait TranslationProject: Send + Sync {
    /// Every language code the backend can represent.
    async fn supported_language_codes(&self) -> Result<Vec<String>, SyncError>;

    /// Target languages currently configured for the project.
    async fn project_language_codes(&self) -> Result<Vec<String>, SyncError>;

    /// Replace the project's target languages.
    async fn set_project_languages(&self, codes: &[String]) -> Result<(), SyncError>;

    /// Names of all top-level project directories.
    async fn list_directories(&self) -> Result<Vec<String>, SyncError>;

    /// Names of the files inside one project directory.
    async fn list_project_files(&self, directory: &str) -> Result<Vec<String>, SyncError>;

    /// Create a project directory. Fails with [`SyncError::DirectoryConflict`]
    /// if it already exists.
    async fn create_directory(&self, name: &str) -> Result<(), SyncError>;

    /// First upload of a source-language file.
    async fn add_source_file(&self, directory: &str, file: &Path) -> Result<(), SyncError>;

    /// Re-upload of an existing source-language file. Changed strings are
    /// marked unapproved rather than overwriting approved translations.
    async fn update_source_file(&self, directory: &str, file: &Path) -> Result<(), SyncError>;

    /// Upload a translated file for `language`.
    async fn upload_translated_file(
        &self,
        directory: &str,
        language: &str,
        file: &Path,
    ) -> Result<(), SyncError>;

    /// Export the whole project, download it into a fresh scratch directory
    /// and prune files that contain no translated strings.
    async fn export_and_download_all(&self) -> Result<TranslationsArchive, SyncError>;

    /// Delete a project directory with everything in it.
    async fn delete_directory(&self, name: &str) -> Result<(), SyncError>;

    /// Make sure every repository language is a target language of the project.
    ///
    /// Fails with [`SyncError::UnsupportedLanguages`] if any code is unknown
    /// to the backend. Returns the codes that were added.
    async fn reconcile_project_languages(
        &self,
        repository_codes: &[String],
    ) -> Result<Vec<String>, SyncError> {
        let codes: Vec<String> = repository_codes
            .iter()
            .map(|code| normalize_language_code(code))
            .collect();

        let supported: HashSet<String> = self.supported_language_codes().await?.into_iter().collect();
        let unsupported: Vec<String> = codes
            .iter()
            .filter(|code| !supported.contains(*code))
            .cloned()
            .collect();
        if !unsupported.is_empty() {
            return Err(SyncError::UnsupportedLanguages(unsupported));
        }

        let mut project_codes = self.project_language_codes().await?;
        let mut added = Vec::new();
        for code in codes {
            if code != SOURCE_LANGUAGE && !project_codes.contains(&code) && !added.contains(&code) {
                added.push(code);
            }
        }

        if !added.is_empty() {
            tracing::info!("adding project languages: {}", added.join(", "));
            project_codes.extend(added.iter().cloned());
            self.set_project_languages(&project_codes).await?;
        }
        Ok(added)
    }

    /// Keep only the mods whose project directory already exists, and only
    /// the repositories left with at least one such mod.
    async fn filter_known_directories(
        &self,
        repositories: Vec<TrackedRepository>,
    ) -> Result<Vec<TrackedRepository>, SyncError> {
        let directories: HashSet<String> = self.list_directories().await?.into_iter().collect();
        Ok(repositories
            .into_iter()
            .filter_map(|mut tracked| {
                let name = &tracked.repository.name;
                tracked
                    .layout
                    .mods
                    .retain(|location| directories.contains(location.project_directory(name).as_str()));
                (!tracked.layout.mods.is_empty()).then_some(tracked)
            })
            .collect())
    }
}

#[async_trait::async_trait]
impl<T: TranslationProject + ?Sized> TranslationProject for std::sync::Arc<T> {
    async fn supported_language_codes(&self) -> Result<Vec<String>, SyncError> {
        (**self).supported_language_codes().await
    }

    async fn project_language_codes(&self) -> Result<Vec<String>, SyncError> {
        (**self).project_language_codes().await
    }

    async fn set_project_languages(&self, codes: &[String]) -> Result<(), SyncError> {
        (**self).set_project_languages(codes).await
    }

    async fn list_directories(&self) -> Result<Vec<String>, SyncError> {
        (**self).list_directories().await
    }

    async fn list_project_files(&self, directory: &str) -> Result<Vec<String>, SyncError> {
        (**self).list_project_files(directory).await
    }

    async fn create_directory(&self, name: &str) -> Result<(), SyncError> {
        (**self).create_directory(name).await
    }

    async fn add_source_file(&self, directory: &str, file: &Path) -> Result<(), SyncError> {
        (**self).add_source_file(directory, file).await
    }

    async fn update_source_file(&self, directory: &str, file: &Path) -> Result<(), SyncError> {
        (**self).update_source_file(directory, file).await
    }

    async fn upload_translated_file(
        &self,
        directory: &str,
        language: &str,
        file: &Path,
    ) -> Result<(), SyncError> {
        (**self).upload_translated_file(directory, language, file).await
    }

    async fn export_and_download_all(&self) -> Result<TranslationsArchive, SyncError> {
        (**self).export_and_download_all().await
    }

    async fn delete_directory(&self, name: &str) -> Result<(), SyncError> {
        (**self).delete_directory(name).await
    }
}

#[cfg(test)]
mod tests {
    use crate::layout::RepositoryLayout;
    use crate::repository::RepositoryName;
    use crate::test_support::FakeProject;
    use crate::vcs::RepositoryRef;

    use super::*;

    fn codes(list: &[&str]) -> Vec<String> {
        list.iter().map(|c| (*c).to_owned()).collect()
    }

    #[tokio::test]
    async fn adds_missing_languages_to_project() {
        let project = FakeProject::new().with_project_languages(&["fr"]);
        let added = project
            .reconcile_project_languages(&codes(&["fr", "de", "pt-br"]))
            .await
            .unwrap();

        assert_eq!(added, codes(&["de", "pt-BR"]));
        assert_eq!(project.project_languages(), codes(&["fr", "de", "pt-BR"]));
    }

    #[tokio::test]
    async fn no_update_when_all_languages_present() {
        let project = FakeProject::new().with_project_languages(&["fr", "de"]);
        let added = project.reconcile_project_languages(&codes(&["de"])).await.unwrap();

        assert!(added.is_empty());
        assert!(project.calls().iter().all(|c| !c.starts_with("set-languages")));
    }

    #[tokio::test]
    async fn source_language_is_never_added() {
        let project = FakeProject::new();
        let added = project.reconcile_project_languages(&codes(&["en", "fr"])).await.unwrap();
        assert_eq!(added, codes(&["fr"]));
    }

    #[tokio::test]
    async fn unsupported_language_is_fatal() {
        let project = FakeProject::new();
        let result = project
            .reconcile_project_languages(&codes(&["fr", "xx-yy-zz", "klingon"]))
            .await;

        match result {
            Err(SyncError::UnsupportedLanguages(list)) => {
                assert_eq!(list, codes(&["xx-yy-zz", "klingon"]));
            }
            other => panic!("expected UnsupportedLanguages, got {other:?}"),
        }
        assert!(project.project_languages().is_empty());
    }

    #[test]
    fn deletion_requires_allowed_owner() {
        let allowed = codes(&["factorio-mods-helper"]);
        assert!(ensure_deletion_allowed("Some Mod (factorio-mods-helper)", &allowed).is_ok());
        assert!(matches!(
            ensure_deletion_allowed("Some Mod (someone-else)", &allowed),
            Err(SyncError::ForbiddenDeletion(_))
        ));
        assert!(ensure_deletion_allowed("No Owner Suffix", &allowed).is_err());
    }

    #[tokio::test]
    async fn filters_repositories_without_directory() {
        let project = FakeProject::new();
        project.create_directory("Known Mod (owner)").await.unwrap();

        let repos = ["known-mod", "unknown-mod"]
            .into_iter()
            .enumerate()
            .map(|(id, name)| TrackedRepository {
                repository: RepositoryRef::new(id as u64, RepositoryName::new("owner", name)),
                layout: RepositoryLayout::default(),
            })
            .collect();
        let known = project.filter_known_directories(repos).await.unwrap();

        assert_eq!(known.len(), 1);
        assert_eq!(known[0].repository.name.to_string(), "owner/known-mod");
    }

    #[tokio::test]
    async fn filters_mods_without_directory() {
        let project = FakeProject::new();
        project.create_directory("Pack - Second (owner)").await.unwrap();

        let tracked = TrackedRepository {
            repository: RepositoryRef::new(1, RepositoryName::new("owner", "pack")),
            layout: RepositoryLayout::parse(r#"["first", "second"]"#).unwrap(),
        };
        let known = project.filter_known_directories(vec![tracked]).await.unwrap();

        assert_eq!(known.len(), 1);
        let subpaths: Vec<_> = known[0].layout.mods.iter().map(|m| m.subpath.as_deref()).collect();
        assert_eq!(subpaths, vec![Some("second")]);
    }
}

//! Inventory of a repository's `locale/<language>/*.cfg` tree.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::SyncError;
use crate::language::{SOURCE_LANGUAGE, is_language_directory, normalize_language_code};
use crate::naming::is_translatable_file;
use crate::repository::Repository;

/// Translatable files of one repository, grouped by language.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocaleInventory {
    pub source_files: Vec<PathBuf>,
    /// Normalized language code -> files, source language excluded.
    pub localizations: BTreeMap<String, Vec<PathBuf>>,
}

impl LocaleInventory {
    pub fn read(repo: &Repository) -> Result<Self, SyncError> {
        Ok(Self {
            source_files: list_source_files(repo)?,
            localizations: list_localizations(repo)?,
        })
    }

    /// Total number of translated files across all languages.
    pub fn translated_file_count(&self) -> usize {
        self.localizations.values().map(Vec::len).sum()
    }
}

/// Translatable files of the source language, sorted by path.
pub fn list_source_files(repo: &Repository) -> Result<Vec<PathBuf>, SyncError> {
    let source_path = repo.source_language_path();
    if !source_path.is_dir() {
        return Err(SyncError::Structure(repo.name.clone()));
    }
    translatable_files(repo, &source_path)
}

/// Target language directory names found under the locale root.
/// The source language and the `template` placeholder are excluded.
pub fn list_language_codes(repo: &Repository) -> Result<BTreeSet<String>, SyncError> {
    let locales = repo.locales_path();
    if !locales.is_dir() {
        return Err(SyncError::Structure(repo.name.clone()));
    }

    let mut codes = BTreeSet::new();
    for entry in fs::read_dir(&locales)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if is_language_directory(&name) && name != SOURCE_LANGUAGE {
            codes.insert(name);
        }
    }
    Ok(codes)
}

/// Normalized language code -> translatable files, source language excluded.
///
/// Directories whose names normalize to the same code are merged.
pub fn list_localizations(repo: &Repository) -> Result<BTreeMap<String, Vec<PathBuf>>, SyncError> {
    let mut localizations: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();

    for directory in list_language_codes(repo)? {
        let files = translatable_files(repo, &repo.language_path(&directory))?;
        localizations
            .entry(normalize_language_code(&directory))
            .or_default()
            .extend(files);
    }

    for files in localizations.values_mut() {
        files.sort();
    }
    Ok(localizations)
}

/// Every translated file must have a same-named file in the source language,
/// otherwise the project has nothing to attach the translation to.
pub fn verify_localizations_match_source(repo: &Repository) -> Result<(), SyncError> {
    let source_path = repo.source_language_path();

    for (language, files) in list_localizations(repo)? {
        for file in files {
            let Some(file_name) = file.file_name() else {
                continue;
            };
            if !source_path.join(file_name).is_file() {
                return Err(SyncError::OrphanFile {
                    language,
                    file: file_name.to_string_lossy().into_owned(),
                });
            }
        }
    }
    Ok(())
}

/// Existing locale directory whose normalized name equals `code`, if any.
pub fn find_language_directory(repo: &Repository, code: &str) -> Result<Option<String>, SyncError> {
    if !repo.locales_path().is_dir() {
        return Ok(None);
    }
    let codes = list_language_codes(repo)?;
    if codes.contains(code) {
        return Ok(Some(code.to_owned()));
    }
    Ok(codes
        .into_iter()
        .find(|directory| normalize_language_code(directory) == code))
}

fn translatable_files(repo: &Repository, directory: &Path) -> Result<Vec<PathBuf>, SyncError> {
    let mut files = Vec::new();

    for entry in fs::read_dir(directory)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if is_translatable_file(&name) {
            files.push(entry.path());
        } else {
            tracing::warn!(
                repository = %repo.name,
                "skipping locale file with unknown extension: {}",
                entry.path().display()
            );
        }
    }

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use crate::repository::RepositoryName;

    use super::*;

    fn repo_with(files: &[(&str, &str)]) -> (tempfile::TempDir, Repository) {
        let dir = tempfile::tempdir().unwrap();
        for (path, content) in files {
            let full = dir.path().join(path);
            fs::create_dir_all(full.parent().unwrap()).unwrap();
            fs::write(full, content).unwrap();
        }
        let repo = Repository::new(RepositoryName::new("owner", "mod"), dir.path());
        (dir, repo)
    }

    fn names(paths: &[PathBuf]) -> Vec<String> {
        paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn lists_source_files_sorted() {
        let (_dir, repo) = repo_with(&[
            ("locale/en/b.cfg", "b=B"),
            ("locale/en/a.cfg", "a=A"),
        ]);
        let files = list_source_files(&repo).unwrap();
        assert_eq!(names(&files), vec!["a.cfg", "b.cfg"]);
        assert!(files[0].is_absolute());
    }

    #[test]
    fn missing_source_directory_is_structure_error() {
        let (_dir, repo) = repo_with(&[("locale/fr/a.cfg", "a=A")]);
        assert!(matches!(list_source_files(&repo), Err(SyncError::Structure(_))));
    }

    #[test]
    fn skips_non_translatable_files() {
        let (_dir, repo) = repo_with(&[
            ("locale/en/a.cfg", "a=A"),
            ("locale/en/notes.txt", "hello"),
            ("locale/en/nested/x.cfg", "x=X"),
        ]);
        let files = list_source_files(&repo).unwrap();
        assert_eq!(names(&files), vec!["a.cfg"]);
    }

    #[test]
    fn language_codes_exclude_source_and_template() {
        let (_dir, repo) = repo_with(&[
            ("locale/en/a.cfg", ""),
            ("locale/fr/a.cfg", ""),
            ("locale/pt-br/a.cfg", ""),
            ("locale/template/a.cfg", ""),
            ("locale/stray.cfg", ""),
        ]);
        let codes = list_language_codes(&repo).unwrap();
        assert_eq!(codes.into_iter().collect::<Vec<_>>(), vec!["fr", "pt-br"]);
    }

    #[test]
    fn localizations_are_keyed_by_normalized_code() {
        let (_dir, repo) = repo_with(&[
            ("locale/en/a.cfg", ""),
            ("locale/pt-br/a.cfg", ""),
            ("locale/de/a.cfg", ""),
            ("locale/de/b.cfg", ""),
        ]);
        let localizations = list_localizations(&repo).unwrap();
        assert_eq!(localizations.keys().collect::<Vec<_>>(), vec!["de", "pt-BR"]);
        assert_eq!(names(&localizations["de"]), vec!["a.cfg", "b.cfg"]);
        assert!(!localizations.contains_key("en"));
    }

    #[test]
    fn verify_accepts_matching_files() {
        let (_dir, repo) = repo_with(&[("locale/en/a.cfg", ""), ("locale/fr/a.cfg", "")]);
        assert!(verify_localizations_match_source(&repo).is_ok());
    }

    #[test]
    fn verify_reports_orphan_file() {
        let (_dir, repo) = repo_with(&[("locale/en/a.cfg", ""), ("locale/fr/b.cfg", "")]);
        match verify_localizations_match_source(&repo) {
            Err(SyncError::OrphanFile { language, file }) => {
                assert_eq!(language, "fr");
                assert_eq!(file, "b.cfg");
            }
            other => panic!("expected OrphanFile, got {other:?}"),
        }
    }

    #[test]
    fn inventory_counts_translated_files() {
        let (_dir, repo) = repo_with(&[
            ("locale/en/a.cfg", ""),
            ("locale/en/b.cfg", ""),
            ("locale/fr/a.cfg", ""),
            ("locale/de/a.cfg", ""),
            ("locale/de/b.cfg", ""),
        ]);
        let inventory = LocaleInventory::read(&repo).unwrap();
        assert_eq!(inventory.source_files.len(), 2);
        assert_eq!(inventory.translated_file_count(), 3);
    }

    #[test]
    fn finds_existing_directory_with_different_casing() {
        let (_dir, repo) = repo_with(&[("locale/en/a.cfg", ""), ("locale/pt-br/a.cfg", "")]);
        assert_eq!(
            find_language_directory(&repo, "pt-BR").unwrap().as_deref(),
            Some("pt-br")
        );
        assert_eq!(find_language_directory(&repo, "fr").unwrap(), None);
    }
}

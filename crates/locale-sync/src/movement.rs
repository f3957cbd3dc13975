use std::fs;
use std::path::Path;

use crate::error::SyncError;
use crate::index::find_language_directory;
use crate::ini::is_empty_translation;
use crate::naming::{PROJECT_EXTENSION, to_repository_file_name};
use crate::project::TranslationsArchive;
use crate::repository::Repository;

/// What [`copy_translations_into`] placed into a working copy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CopiedTranslations {
    /// Repository language directories that received files.
    pub languages: Vec<String>,
    pub files: usize,
}

/// Delete every archive file that holds no translated strings.
///
/// Expects the `<language>/<directory>/<file>` layout. Content that is not
/// valid UTF-8 is read lossily. Returns the number of files removed.
pub fn prune_empty_translations(root: &Path) -> Result<usize, SyncError> {
    let mut removed = 0;

    for language in subdirectories(root)? {
        for directory in subdirectories(&language)? {
            for entry in fs::read_dir(&directory)? {
                let path = entry?.path();
                if !path.is_file() {
                    continue;
                }
                let bytes = fs::read(&path)?;
                if is_empty_translation(&String::from_utf8_lossy(&bytes)) {
                    fs::remove_file(&path)?;
                    removed += 1;
                }
            }
        }
    }

    Ok(removed)
}

/// Copy this repository's translated files out of the archive into its
/// locale tree, renaming `.ini` to `.cfg`.
///
/// The archive is left untouched so it can be shared by every repository of
/// a pull run. Languages without files for this repository are skipped; an
/// existing locale directory that differs only in casing (`pt-br` vs
/// `pt-BR`) is reused.
pub fn copy_translations_into(
    archive: &TranslationsArchive,
    repo: &Repository,
) -> Result<CopiedTranslations, SyncError> {
    let directory = repo.project_directory();
    let mut copied = CopiedTranslations::default();

    for language in archive.languages()? {
        let files = archive.files(&language, &directory)?;
        if files.is_empty() {
            continue;
        }

        let target_name = find_language_directory(repo, &language)?.unwrap_or_else(|| language.clone());
        let target = repo.language_path(&target_name);
        fs::create_dir_all(&target)?;

        for file in files {
            let Some(file_name) = file.file_name().map(|n| n.to_string_lossy().into_owned()) else {
                continue;
            };
            if !file_name.ends_with(&format!(".{PROJECT_EXTENSION}")) {
                tracing::warn!(
                    repository = %repo.name,
                    "skipping downloaded file with unknown extension: {language}/{file_name}"
                );
                continue;
            }
            fs::copy(&file, target.join(to_repository_file_name(&file_name)))?;
            copied.files += 1;
        }
        copied.languages.push(target_name);
    }

    Ok(copied)
}

fn subdirectories(path: &Path) -> Result<Vec<std::path::PathBuf>, SyncError> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(path)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            dirs.push(entry.path());
        }
    }
    Ok(dirs)
}

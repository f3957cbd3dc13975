use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::language::SOURCE_LANGUAGE;
use crate::layout::ModLocation;
use crate::naming;

/// Directory holding one subdirectory per language, relative to the
/// repository root for single-mod repositories.
pub const LOCALE_DIRECTORY: &str = "locale";

/// Stable `owner/name` identifier of a source-control repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RepositoryName {
    owner: String,
    name: String,
}

impl RepositoryName {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The translation-project directory paired with this repository, or
    /// with one of its mods when `subpath` is given.
    pub fn mod_directory(&self, subpath: Option<&str>) -> ProjectDirectory {
        ProjectDirectory::new(naming::project_directory_name(&self.owner, &self.name, subpath))
    }
}

impl fmt::Display for RepositoryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Error returned when a string is not of the form `owner/name`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid repository name \"{0}\", expected \"owner/name\"")]
pub struct InvalidRepositoryName(pub String);

impl FromStr for RepositoryName {
    type Err = InvalidRepositoryName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
                Ok(Self::new(owner, name))
            }
            _ => Err(InvalidRepositoryName(s.to_owned())),
        }
    }
}

/// A repository as seen by the synchronization engine: an identifier plus
/// the root of a working copy on disk. For a repository holding several
/// mods, one value per mod.
#[derive(Debug, Clone)]
pub struct Repository {
    pub name: RepositoryName,
    pub root: PathBuf,
    /// Locale tree relative to `root`.
    pub locale_path: String,
    pub subpath: Option<String>,
}

impl Repository {
    pub fn new(name: RepositoryName, root: impl Into<PathBuf>) -> Self {
        Self::for_mod(name, root, &ModLocation::root())
    }

    pub fn for_mod(name: RepositoryName, root: impl Into<PathBuf>, location: &ModLocation) -> Self {
        Self {
            name,
            root: root.into(),
            locale_path: location.locale_path.clone(),
            subpath: location.subpath.clone(),
        }
    }

    pub fn locales_path(&self) -> PathBuf {
        self.root.join(&self.locale_path)
    }

    pub fn source_language_path(&self) -> PathBuf {
        self.locales_path().join(SOURCE_LANGUAGE)
    }

    pub fn language_path(&self, language_directory: &str) -> PathBuf {
        self.locales_path().join(language_directory)
    }

    pub fn project_directory(&self) -> ProjectDirectory {
        self.name.mod_directory(self.subpath.as_deref())
    }
}

/// Name of the container for one repository inside the translation project.
///
/// Always derived from a [`RepositoryName`]; it is the join key between the
/// two systems.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProjectDirectory(String);

impl ProjectDirectory {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `<directory>/<file>` path used to address a file inside the project.
    pub fn file_path(&self, project_file_name: &str) -> String {
        format!("{}/{}", self.0, project_file_name)
    }

    /// Location of this directory's files for one language in an
    /// extracted translations archive.
    pub fn in_archive(&self, archive_root: &Path, language: &str) -> PathBuf {
        archive_root.join(language).join(&self.0)
    }
}

impl fmt::Display for ProjectDirectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

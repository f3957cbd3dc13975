//! Per-repository settings from `factorio-mods-localization.json`.
//!
//! Without the file a repository holds a single mod with its locale tree at
//! `locale/`. With it, a repository can hold several mods, opt out of
//! scheduled pulls, or track a branch other than the default one:
//!
//! ```json
//! {
//!   "mods": ["Mod1", {"localePath": "custom/path", "crowdinName": "Foo"}],
//!   "weekly_update_from_crowdin": false,
//!   "branch": "dev"
//! }
//! ```
//!
//! A bare list (`["Mod1", "Mod2"]`) is accepted as the older form of `mods`.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::SyncError;
use crate::repository::{LOCALE_DIRECTORY, ProjectDirectory, Repository, RepositoryName};

/// Name of the settings file in the repository root.
pub const LAYOUT_FILE: &str = "factorio-mods-localization.json";

/// Where one mod of a repository keeps its locale tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModLocation {
    /// Locale root relative to the repository root.
    pub locale_path: String,
    /// Name that tells this mod's project directory apart from the other
    /// mods of the same repository. `None` for a single-mod repository.
    pub subpath: Option<String>,
}

impl ModLocation {
    /// The only mod of a repository without a settings file.
    pub fn root() -> Self {
        Self {
            locale_path: LOCALE_DIRECTORY.to_owned(),
            subpath: None,
        }
    }

    /// The mod rooted in a checkout of `name` at `root`.
    pub fn in_checkout(&self, name: &RepositoryName, root: &Path) -> Repository {
        Repository::for_mod(name.clone(), root, self)
    }

    pub fn project_directory(&self, name: &RepositoryName) -> ProjectDirectory {
        name.mod_directory(self.subpath.as_deref())
    }
}

/// Settings of one repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryLayout {
    /// Never empty.
    pub mods: Vec<ModLocation>,
    /// Whether scheduled pulls include this repository.
    pub weekly_update: bool,
    /// Branch whose source files are tracked and which receives
    /// translations. The default branch when `None`.
    pub branch: Option<String>,
}

impl Default for RepositoryLayout {
    fn default() -> Self {
        Self {
            mods: vec![ModLocation::root()],
            weekly_update: true,
            branch: None,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LayoutFile {
    List(Vec<String>),
    Settings(Settings),
}

#[derive(Deserialize)]
struct Settings {
    mods: Option<Vec<ModEntry>>,
    weekly_update_from_crowdin: Option<bool>,
    branch: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ModEntry {
    Name(String),
    #[serde(rename_all = "camelCase")]
    Custom { locale_path: String, crowdin_name: String },
}

impl RepositoryLayout {
    pub fn parse(json: &str) -> Result<Self, SyncError> {
        let file: LayoutFile = serde_json::from_str(json).map_err(|e| SyncError::InvalidLayout(e.to_string()))?;
        let settings = match file {
            LayoutFile::List(names) => Settings {
                mods: Some(names.into_iter().map(ModEntry::Name).collect()),
                weekly_update_from_crowdin: None,
                branch: None,
            },
            LayoutFile::Settings(settings) => settings,
        };

        let mods = match settings.mods {
            None => vec![ModLocation::root()],
            Some(entries) => entries
                .into_iter()
                .map(|entry| match entry {
                    ModEntry::Name(name) => custom_mod(None, name),
                    ModEntry::Custom {
                        locale_path,
                        crowdin_name,
                    } => custom_mod(Some(locale_path), crowdin_name),
                })
                .collect::<Result<Vec<_>, _>>()?,
        };
        if mods.is_empty() {
            return Err(SyncError::InvalidLayout("\"mods\" is empty".into()));
        }
        let mut seen = HashSet::new();
        if let Some(duplicate) = mods.iter().find(|m| !seen.insert(&m.subpath)) {
            return Err(SyncError::InvalidLayout(format!(
                "mod \"{}\" is listed twice",
                duplicate.subpath.as_deref().unwrap_or_default()
            )));
        }

        Ok(Self {
            mods,
            weekly_update: settings.weekly_update_from_crowdin.unwrap_or(true),
            branch: settings.branch,
        })
    }

    /// Read the settings file of a checkout at `root`, or the defaults if
    /// it has none.
    pub fn read(root: &Path) -> Result<Self, SyncError> {
        let path = root.join(LAYOUT_FILE);
        if !path.is_file() {
            return Ok(Self::default());
        }
        Self::parse(&fs::read_to_string(path)?)
    }

    /// Every mod of `checkout` as its own [`Repository`].
    pub fn mods_in(&self, checkout: &Repository) -> Vec<Repository> {
        self.mods
            .iter()
            .map(|location| location.in_checkout(&checkout.name, &checkout.root))
            .collect()
    }
}

fn custom_mod(locale_path: Option<String>, name: String) -> Result<ModLocation, SyncError> {
    let locale_path = locale_path.unwrap_or_else(|| format!("{name}/{LOCALE_DIRECTORY}"));
    if !is_valid_locale_path(&locale_path) {
        return Err(SyncError::InvalidLayout(format!("invalid locale path \"{locale_path}\"")));
    }
    if !is_valid_mod_name(&name) {
        return Err(SyncError::InvalidLayout(format!("invalid mod name \"{name}\"")));
    }
    Ok(ModLocation {
        locale_path,
        subpath: Some(name),
    })
}

/// Relative, slash-separated, with no empty segments and none of the
/// characters that could escape the checkout or break on Windows.
fn is_valid_locale_path(path: &str) -> bool {
    !path.is_empty()
        && !path.contains(['.', ' ', '<', '>', ':', '"', '\\', '|', '?', '*'])
        && !path.split('/').any(str::is_empty)
}

fn is_valid_mod_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}

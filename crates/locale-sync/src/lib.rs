pub mod add;
pub mod batch;
pub mod error;
pub mod index;
pub mod ini;
pub mod language;
pub mod layout;
pub mod movement;
pub mod naming;
pub mod project;
pub mod pull;
pub mod push;
pub mod repository;
pub mod update;
pub mod vcs;

pub use add::{AddOptions, OnboardReport, onboard_all, onboard_repository};
pub use batch::{BatchReport, ErrorReporter, LogReporter, RepositoryOutcome, run_batch};
pub use error::SyncError;
pub use index::LocaleInventory;
pub use language::{SOURCE_LANGUAGE, normalize_language_code};
pub use layout::{LAYOUT_FILE, ModLocation, RepositoryLayout};
pub use project::{TranslationProject, TranslationsArchive, ensure_deletion_allowed};
pub use pull::{PullOutcome, pull_all, pull_all_if_due, pull_one, pull_repository};
pub use push::{
    PushCommit, PushReport, changed_files_from_commits, on_push, push_source_changes, source_changes,
    source_changes_in,
};
pub use repository::{InvalidRepositoryName, ProjectDirectory, Repository, RepositoryName};
pub use update::{DEFAULT_UPDATE_PERIOD, UpdateLog, is_update_due};
pub use vcs::{CommitIdentity, RepositoryRef, TrackedRepository, VersionControl, WorkingCopy};

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

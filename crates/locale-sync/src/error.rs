use crate::repository::RepositoryName;

/// Errors that can occur while synchronizing a repository with the
/// translation project.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("[{0}] \"locale/en\" subdirectory not found in repository")]
    Structure(RepositoryName),

    #[error("matched source file not found for \"{language}/{file}\"")]
    OrphanFile { language: String, file: String },

    #[error("languages not supported by the translation project: {}", .0.join(", "))]
    UnsupportedLanguages(Vec<String>),

    #[error("error during uploading file \"{file}\", status: {status}")]
    UploadStatus { file: String, status: String },

    #[error("directory \"{0}\" already exists in the translation project")]
    DirectoryConflict(String),

    #[error("translation \"{language}/{file}\" has no matching source file in the project")]
    UnmatchedTranslation { language: String, file: String },

    #[error("directory \"{0}\" not found in the translation project")]
    DirectoryNotFound(String),

    #[error("repository \"{0}\" is not managed by the translation project")]
    RepositoryNotFound(RepositoryName),

    #[error("refusing to delete directory \"{0}\": owner is not in the allow-list")]
    ForbiddenDeletion(String),

    #[error("invalid factorio-mods-localization.json: {0}")]
    InvalidLayout(String),

    #[error("backend error: {0}")]
    Transport(String),

    #[error("archive error: {0}")]
    Archive(String),

    #[error("version control error: {0}")]
    VersionControl(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

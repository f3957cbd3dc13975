use std::fs;
use std::path::Path;

use locale_sync::ini::prepare_upload;
use locale_sync::movement::prune_empty_translations;
use locale_sync::naming::to_project_file_name;
use locale_sync::{ProjectDirectory, SyncError, TranslationProject, TranslationsArchive, ensure_deletion_allowed};
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;

use crate::archive::extract_zip;
use crate::wire::{ErrorBody, ExportResponse, ProjectInfo, SupportedLanguage, UploadResponse};

/// Crowdin error code for `add-directory` when the directory exists.
const DIRECTORY_EXISTS: i64 = 50;
/// Crowdin error code for `upload-translation` when no source file matches.
const NO_MATCHING_SOURCE: i64 = 8;

/// Connection settings for one Crowdin project.
#[derive(Debug, Clone)]
pub struct CrowdinConfig {
    pub project_id: String,
    pub api_key: String,
    /// Host override, used by tests. Defaults to `https://api.crowdin.com`.
    pub api_base_url: Option<String>,
    /// Owners whose project directories may be deleted.
    pub allowed_owners: Vec<String>,
}

#[derive(Debug)]
enum RequestError {
    Api { code: i64, message: String },
    Transport(String),
}

impl RequestError {
    fn code(&self) -> Option<i64> {
        match self {
            Self::Api { code, .. } => Some(*code),
            Self::Transport(_) => None,
        }
    }

    fn into_sync_error(self, endpoint: &str) -> SyncError {
        match self {
            Self::Api { code, message } => SyncError::Transport(format!("crowdin/{endpoint}: [{code}] {message}")),
            Self::Transport(message) => SyncError::Transport(format!("crowdin/{endpoint}: {message}")),
        }
    }
}

/// Client for the Crowdin v1 project API.
pub struct CrowdinClient {
    config: CrowdinConfig,
    client: reqwest::Client,
}

impl CrowdinClient {
    pub fn new(config: CrowdinConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn api_base(&self) -> &str {
        self.config
            .api_base_url
            .as_deref()
            .unwrap_or("https://api.crowdin.com")
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/api/project/{}/{}", self.api_base(), self.config.project_id, endpoint)
    }

    fn request(&self, method: reqwest::Method, endpoint: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, self.url(endpoint))
            .header("User-Agent", "locale-sync")
            .query(&[("key", self.config.api_key.as_str()), ("json", "true")])
    }

    async fn execute<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T, RequestError> {
        let response = request
            .send()
            .await
            .map_err(|e| RequestError::Transport(e.to_string()))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| RequestError::Transport(format!("failed to read body: {e}")))?;

        if let Ok(failure) = serde_json::from_slice::<ErrorBody>(&body) {
            return Err(RequestError::Api {
                code: failure.error.code,
                message: failure.error.message,
            });
        }
        if !status.is_success() {
            return Err(RequestError::Transport(format!("HTTP {status}")));
        }
        serde_json::from_slice(&body).map_err(|e| RequestError::Transport(format!("invalid response: {e}")))
    }

    async fn call<T: DeserializeOwned>(&self, method: reqwest::Method, endpoint: &str) -> Result<T, SyncError> {
        self.execute(self.request(method, endpoint))
            .await
            .map_err(|e| e.into_sync_error(endpoint))
    }

    async fn project_info(&self) -> Result<ProjectInfo, SyncError> {
        self.call(reqwest::Method::POST, "info").await
    }

    /// Multipart body holding one locale file under `files[<directory>/<name>.ini]`.
    fn file_form(directory: &str, file: &Path) -> Result<(Form, String), SyncError> {
        let file_name = file
            .file_name()
            .map(|n| to_project_file_name(&n.to_string_lossy()))
            .ok_or_else(|| SyncError::Io(std::io::Error::other(format!("not a file: {}", file.display()))))?;
        let content = prepare_upload(&fs::read_to_string(file)?);
        let project_path = ProjectDirectory::new(directory).file_path(&file_name);

        let part = Part::text(content).file_name(file_name);
        let form = Form::new()
            .percent_encode_noop()
            .part(format!("files[{project_path}]"), part);
        Ok((form, project_path))
    }

    async fn upload_source(
        &self,
        endpoint: &str,
        directory: &str,
        file: &Path,
        query: &[(&str, &str)],
    ) -> Result<(), SyncError> {
        let (form, project_path) = Self::file_form(directory, file)?;
        tracing::info!("crowdin/{endpoint}: en/{project_path}");

        let request = self
            .request(reqwest::Method::POST, endpoint)
            .query(query)
            .multipart(form);
        self.execute::<serde_json::Value>(request)
            .await
            .map(|_| ())
            .map_err(|e| e.into_sync_error(endpoint))
    }

    async fn download_all(&self) -> Result<Vec<u8>, SyncError> {
        let response = self
            .request(reqwest::Method::GET, "download/all.zip")
            .send()
            .await
            .map_err(|e| SyncError::Transport(format!("crowdin/download: {e}")))?;

        if !response.status().is_success() {
            return Err(SyncError::Transport(format!(
                "crowdin/download returned HTTP {}",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SyncError::Transport(format!("crowdin/download: failed to read body: {e}")))?;
        Ok(bytes.to_vec())
    }
}

#[async_trait::async_trait]
impl TranslationProject for CrowdinClient {
    async fn supported_language_codes(&self) -> Result<Vec<String>, SyncError> {
        let languages: Vec<SupportedLanguage> = self.call(reqwest::Method::GET, "supported-languages").await?;
        Ok(languages.into_iter().map(|l| l.crowdin_code).collect())
    }

    async fn project_language_codes(&self) -> Result<Vec<String>, SyncError> {
        let info = self.project_info().await?;
        Ok(info.languages.into_iter().map(|l| l.code).collect())
    }

    async fn set_project_languages(&self, codes: &[String]) -> Result<(), SyncError> {
        let query: Vec<(&str, &str)> = codes.iter().map(|c| ("languages[]", c.as_str())).collect();
        let request = self.request(reqwest::Method::POST, "edit-project").query(&query);
        self.execute::<serde_json::Value>(request)
            .await
            .map(|_| ())
            .map_err(|e| e.into_sync_error("edit-project"))
    }

    async fn list_directories(&self) -> Result<Vec<String>, SyncError> {
        let info = self.project_info().await?;
        Ok(info
            .files
            .into_iter()
            .filter(|node| node.is_directory())
            .map(|node| node.name)
            .collect())
    }

    async fn list_project_files(&self, directory: &str) -> Result<Vec<String>, SyncError> {
        let info = self.project_info().await?;
        let node = info
            .files
            .into_iter()
            .find(|node| node.is_directory() && node.name == directory)
            .ok_or_else(|| SyncError::DirectoryNotFound(directory.to_owned()))?;
        Ok(node
            .files
            .into_iter()
            .filter(|child| child.is_file())
            .map(|child| child.name)
            .collect())
    }

    async fn create_directory(&self, name: &str) -> Result<(), SyncError> {
        let request = self
            .request(reqwest::Method::POST, "add-directory")
            .query(&[("name", name), ("recursive", "1")]);

        match self.execute::<serde_json::Value>(request).await {
            Ok(_) => Ok(()),
            Err(e) if e.code() == Some(DIRECTORY_EXISTS) => Err(SyncError::DirectoryConflict(name.to_owned())),
            Err(e) => Err(e.into_sync_error("add-directory")),
        }
    }

    async fn add_source_file(&self, directory: &str, file: &Path) -> Result<(), SyncError> {
        self.upload_source("add-file", directory, file, &[]).await
    }

    async fn update_source_file(&self, directory: &str, file: &Path) -> Result<(), SyncError> {
        self.upload_source(
            "update-file",
            directory,
            file,
            &[("update_option", "update_as_unapproved")],
        )
        .await
    }

    async fn upload_translated_file(
        &self,
        directory: &str,
        language: &str,
        file: &Path,
    ) -> Result<(), SyncError> {
        let (form, project_path) = Self::file_form(directory, file)?;
        tracing::info!("crowdin/upload-translation: {language}/{project_path}");

        let request = self
            .request(reqwest::Method::POST, "upload-translation")
            .query(&[
                ("language", language),
                ("import_eq_suggestions", "0"),
                ("auto_approve_imported", "0"),
            ])
            .multipart(form);

        let response: UploadResponse = match self.execute(request).await {
            Ok(response) => response,
            Err(e) if e.code() == Some(NO_MATCHING_SOURCE) => {
                return Err(SyncError::UnmatchedTranslation {
                    language: language.to_owned(),
                    file: project_path,
                });
            }
            Err(e) => return Err(e.into_sync_error("upload-translation")),
        };

        for (file, status) in &response.files {
            if status != "uploaded" {
                return Err(SyncError::UploadStatus {
                    file: file.clone(),
                    status: status.clone(),
                });
            }
        }
        if !response.files.contains_key(&project_path) {
            return Err(SyncError::UploadStatus {
                file: project_path,
                status: "missing".into(),
            });
        }
        Ok(())
    }

    async fn export_and_download_all(&self) -> Result<TranslationsArchive, SyncError> {
        let export: ExportResponse = self.call(reqwest::Method::GET, "export").await?;
        if export.success.as_ref().is_none_or(|s| s.status != "built") {
            tracing::warn!("crowdin/export had no effect (no changes since last export)");
        }

        let bytes = self.download_all().await?;
        let dir = tempfile::tempdir()?;
        let extracted = extract_zip(&bytes, dir.path())?;
        let pruned = prune_empty_translations(dir.path())?;
        tracing::info!(extracted, pruned, "downloaded translations");

        Ok(TranslationsArchive::new(dir))
    }

    async fn delete_directory(&self, name: &str) -> Result<(), SyncError> {
        ensure_deletion_allowed(name, &self.config.allowed_owners)?;
        tracing::info!("crowdin/delete-directory: {name}");

        let request = self
            .request(reqwest::Method::POST, "delete-directory")
            .query(&[("name", name)]);
        self.execute::<serde_json::Value>(request)
            .await
            .map(|_| ())
            .map_err(|e| e.into_sync_error("delete-directory"))
    }
}

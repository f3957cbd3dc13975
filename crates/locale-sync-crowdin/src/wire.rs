use std::collections::BTreeMap;

use serde::Deserialize;

/// Error body returned by every endpoint on failure.
/// `{"success": false, "error": {"code": 50, "message": "..."}}`
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ErrorDetail {
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

/// One entry of `GET /supported-languages`.
#[derive(Debug, Deserialize)]
pub struct SupportedLanguage {
    pub crowdin_code: String,
}

/// Response from `POST /info`.
#[derive(Debug, Deserialize)]
pub struct ProjectInfo {
    #[serde(default)]
    pub languages: Vec<ProjectLanguage>,
    #[serde(default)]
    pub files: Vec<FileNode>,
}

#[derive(Debug, Deserialize)]
pub struct ProjectLanguage {
    pub code: String,
}

/// A node of the project file tree. Directories carry their children.
#[derive(Debug, Deserialize)]
pub struct FileNode {
    pub node_type: String,
    pub name: String,
    #[serde(default)]
    pub files: Vec<FileNode>,
}

impl FileNode {
    pub fn is_directory(&self) -> bool {
        self.node_type == "directory"
    }

    pub fn is_file(&self) -> bool {
        self.node_type == "file"
    }
}

/// Response from `POST /upload-translation`: project path -> status.
#[derive(Debug, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub files: BTreeMap<String, String>,
}

/// Response from `GET /export`.
#[derive(Debug, Deserialize)]
pub struct ExportResponse {
    pub success: Option<ExportStatus>,
}

#[derive(Debug, Deserialize)]
pub struct ExportStatus {
    pub status: String,
}

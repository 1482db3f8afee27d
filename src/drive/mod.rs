//! Drive HTML → Google Doc conversion.
//!
//! [`convert_to_doc`] drives the get-metadata → download → upload sequence against any
//! [`DriveApi`]; [`DriveClient`] is the HTTP implementation.

pub mod client;
pub mod token;

pub use client::DriveClient;
pub use token::{resolve_access_token, CachedToken, ACCESS_TOKEN_ENV};

use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use tracing::{debug, info, warn};

pub const GOOGLE_DOC_MIME: &str = "application/vnd.google-apps.document";
pub const HTML_MIME: &str = "text/html";

/// A file as returned by a folder listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriveFile {
    pub id: String,
    pub name: String,
}

/// The subset of file metadata the conversion needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetadata {
    pub name: String,
    #[serde(default)]
    pub parents: Option<Vec<String>>,
}

/// Metadata part of the create request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDocument {
    pub name: String,
    pub mime_type: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parents: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedDocument {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub web_view_link: Option<String>,
}

/// Error types for Drive operations.
#[derive(Debug, thiserror::Error)]
pub enum DriveError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Authentication error: {0}")]
    Auth(String),
    #[error("Server returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("Deserialization error: {0}")]
    Deserialization(String),
    #[error("Invalid URL: {0}")]
    Url(String),
    #[error("Temporary file error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<DriveError> for AppError {
    fn from(err: DriveError) -> Self {
        let (category, code, suggestion) = match &err {
            DriveError::Auth(_) => (
                ErrorCategory::AuthenticationError,
                "DRIVE_AUTH",
                format!("refresh the cached token file or set {}", ACCESS_TOKEN_ENV),
            ),
            DriveError::Network(_) | DriveError::Server { .. } => (
                ErrorCategory::NetworkError,
                "DRIVE_NETWORK",
                "check connectivity and drive.api_base / drive.upload_base".to_string(),
            ),
            DriveError::Deserialization(_) => (
                ErrorCategory::SerializationError,
                "DRIVE_RESPONSE",
                "the Drive API answered with an unexpected body".to_string(),
            ),
            DriveError::Url(_) => (
                ErrorCategory::ValidationError,
                "DRIVE_URL",
                "fix drive.api_base / drive.upload_base in chores.toml".to_string(),
            ),
            DriveError::Io(_) => (
                ErrorCategory::IoError,
                "DRIVE_IO",
                "check that the temp directory is writable".to_string(),
            ),
        };
        let message = err.to_string();
        AppError::with_source(category, message, Box::new(err))
            .with_code(code)
            .with_suggestion(suggestion)
    }
}

#[async_trait]
pub trait DriveApi: Send + Sync {
    async fn file_metadata(&self, file_id: &str) -> Result<FileMetadata, DriveError>;

    async fn download(&self, file_id: &str) -> Result<Vec<u8>, DriveError>;

    /// Upload `media` (HTML) as a new file described by `document`, letting Drive convert it.
    async fn create_document(
        &self,
        document: &NewDocument,
        media: &Path,
    ) -> Result<CreatedDocument, DriveError>;

    /// Most recently created HTML file in `folder_id`.
    async fn latest_html(&self, folder_id: &str) -> Result<Option<DriveFile>, DriveError>;
}

/// Name of the converted document: the source name with `.html` stripped.
pub fn document_name(source_name: &str) -> String {
    source_name.replace(".html", "")
}

/// Convert the HTML file `file_id` into a Google Doc next to it.
///
/// Parents of the source file are reused; `fallback_folder` only applies when the
/// source reports none. The downloaded HTML is staged in a temporary file that is
/// removed before this returns, whether or not the upload succeeded. Failing to remove
/// it is logged and does not discard a document that was already created.
pub async fn convert_to_doc(
    api: &dyn DriveApi,
    file_id: &str,
    fallback_folder: Option<&str>,
) -> Result<CreatedDocument, DriveError> {
    let metadata = api.file_metadata(file_id).await?;
    let name = document_name(&metadata.name);
    let parents = metadata
        .parents
        .unwrap_or_else(|| fallback_folder.map(|f| vec![f.to_string()]).unwrap_or_default());

    info!("Converting: {} -> {}", metadata.name, name);

    let content = api.download(file_id).await?;
    debug!(bytes = content.len(), "downloaded html");

    let mut staged = tempfile::Builder::new()
        .prefix("chores-")
        .suffix(".html")
        .tempfile()?;
    staged.write_all(&content)?;
    staged.flush()?;

    let document = NewDocument {
        name,
        mime_type: GOOGLE_DOC_MIME.to_string(),
        parents,
    };
    let created = api.create_document(&document, staged.path()).await;
    let staged_path = staged.path().to_path_buf();
    if let Err(err) = staged.close() {
        warn!(path = %staged_path.display(), "failed to remove staged html: {}", err);
    }

    created
}

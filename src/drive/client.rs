use super::{
    CreatedDocument, DriveApi, DriveError, DriveFile, FileMetadata, NewDocument, HTML_MIME,
};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::Path;
use url::Url;

/// HTTP client for the Drive v3 REST API.
#[derive(Clone)]
pub struct DriveClient {
    http: reqwest::Client,
    api_base: Url,
    upload_base: Url,
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

impl DriveClient {
    pub fn new(api_base: &str, upload_base: &str, access_token: String) -> Result<Self, DriveError> {
        Ok(DriveClient {
            http: reqwest::Client::new(),
            api_base: parse_base(api_base)?,
            upload_base: parse_base(upload_base)?,
            access_token,
        })
    }

    fn files_url(&self, base: &Url, prefix: &[&str], file_id: Option<&str>) -> Result<Url, DriveError> {
        let mut url = base.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| DriveError::Url(format!("{} cannot be a base URL", base)))?;
            segments.pop_if_empty();
            segments.extend(prefix);
            segments.extend(["drive", "v3", "files"]);
            if let Some(id) = file_id {
                segments.push(id);
            }
        }
        Ok(url)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Response, DriveError> {
        let response = request
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| DriveError::Network(e.to_string()))?;
        check_status(response).await
    }

    async fn json<T: DeserializeOwned>(response: Response) -> Result<T, DriveError> {
        response
            .json()
            .await
            .map_err(|e| DriveError::Deserialization(e.to_string()))
    }
}

#[async_trait]
impl DriveApi for DriveClient {
    async fn file_metadata(&self, file_id: &str) -> Result<FileMetadata, DriveError> {
        let url = self.files_url(&self.api_base, &[], Some(file_id))?;
        let response = self
            .send(self.http.get(url).query(&[("fields", "name,parents")]))
            .await?;
        Self::json(response).await
    }

    async fn download(&self, file_id: &str) -> Result<Vec<u8>, DriveError> {
        let url = self.files_url(&self.api_base, &[], Some(file_id))?;
        let response = self
            .send(self.http.get(url).query(&[("alt", "media")]))
            .await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| DriveError::Network(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    async fn create_document(
        &self,
        document: &NewDocument,
        media: &Path,
    ) -> Result<CreatedDocument, DriveError> {
        let url = self.files_url(&self.upload_base, &["upload"], None)?;
        let content = tokio::fs::read(media).await?;
        let metadata = serde_json::to_vec(document)
            .map_err(|e| DriveError::Deserialization(e.to_string()))?;
        let boundary = format!("chores-{}", uuid::Uuid::new_v4().simple());
        let body = multipart_related(&boundary, &metadata, HTML_MIME, &content);

        let request = self
            .http
            .post(url)
            .query(&[
                ("uploadType", "multipart"),
                ("fields", "id,name,webViewLink"),
            ])
            .header(
                CONTENT_TYPE,
                format!("multipart/related; boundary={}", boundary),
            )
            .body(body);
        let response = self.send(request).await?;
        Self::json(response).await
    }

    async fn latest_html(&self, folder_id: &str) -> Result<Option<DriveFile>, DriveError> {
        let url = self.files_url(&self.api_base, &[], None)?;
        let query = format!("'{}' in parents and mimeType='{}'", folder_id, HTML_MIME);
        let response = self
            .send(self.http.get(url).query(&[
                ("q", query.as_str()),
                ("orderBy", "createdTime desc"),
                ("pageSize", "1"),
                ("fields", "files(id,name)"),
            ]))
            .await?;
        let list: FileList = Self::json(response).await?;
        Ok(list.files.into_iter().next())
    }
}

fn parse_base(raw: &str) -> Result<Url, DriveError> {
    Url::parse(raw).map_err(|e| DriveError::Url(format!("{}: {}", raw, e)))
}

async fn check_status(response: Response) -> Result<Response, DriveError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(DriveError::Auth(format!(
            "Drive rejected the access token ({}): {}",
            status, body
        ))),
        _ => Err(DriveError::Server {
            status: status.as_u16(),
            body,
        }),
    }
}

/// Build a `multipart/related` body: JSON metadata part followed by the media part.
fn multipart_related(boundary: &str, metadata: &[u8], media_type: &str, media: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(metadata.len() + media.len() + 256);
    body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(b"Content-Type: application/json; charset=UTF-8\r\n\r\n");
    body.extend_from_slice(metadata);
    body.extend_from_slice(format!("\r\n--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", media_type).as_bytes());
    body.extend_from_slice(media);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());
    body
}

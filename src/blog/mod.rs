//! Blog listing: fetch posts from the content API and keep only their id and slug.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::Write as _;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// The two fields kept from each blog record, copied through whatever their JSON type.
/// Missing fields are `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogSummary {
    pub id: Value,
    pub slug: Value,
}

#[derive(Debug, Deserialize)]
struct BlogRecord {
    #[serde(rename = "_id", default)]
    id: Value,
    #[serde(default)]
    slug: Value,
}

#[derive(Debug, Deserialize)]
struct BlogListResponse {
    #[serde(default)]
    data: Option<Vec<BlogRecord>>,
}

/// Error types for blog API calls.
#[derive(Debug, thiserror::Error)]
pub enum BlogError {
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("Server error: {0}")]
    ServerError(String),
    #[error("Error parsing JSON response: {0}")]
    DeserializationError(String),
}

pub struct BlogClient {
    client: reqwest::Client,
    endpoint: Url,
    timeout: Duration,
}

impl BlogClient {
    pub fn new(endpoint: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Fetch blogs, surfacing transport and parse failures to the caller.
    pub async fn try_fetch(&self, published: bool) -> Result<Vec<BlogSummary>, BlogError> {
        let published = if published { "true" } else { "false" };
        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[("published", published)])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| BlogError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(BlogError::ServerError(format!(
                "Server returned status: {}",
                response.status()
            )));
        }

        let body: BlogListResponse = response
            .json()
            .await
            .map_err(|e| BlogError::DeserializationError(e.to_string()))?;

        let blogs: Vec<BlogSummary> = body
            .data
            .unwrap_or_default()
            .into_iter()
            .map(|record| BlogSummary {
                id: record.id,
                slug: record.slug,
            })
            .collect();
        debug!(count = blogs.len(), "fetched blogs");
        Ok(blogs)
    }

    /// Fetch blogs; any failure is reported and yields an empty list.
    pub async fn fetch(&self, published: bool) -> Vec<BlogSummary> {
        match self.try_fetch(published).await {
            Ok(blogs) => blogs,
            Err(err) => {
                warn!(endpoint = %self.endpoint, "blog fetch failed: {}", err);
                println!("Error fetching blogs: {}", err);
                Vec::new()
            }
        }
    }
}

/// Numbered, human-readable listing of the fetched blogs.
pub fn render_listing(blogs: &[BlogSummary]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Found {} blogs:", blogs.len());
    let _ = writeln!(out);
    for (i, blog) in blogs.iter().enumerate() {
        let _ = writeln!(out, "{}. ID: {}", i + 1, display_field(&blog.id));
        let _ = writeln!(out, "   Slug: {}", display_field(&blog.slug));
        let _ = writeln!(out);
    }
    out
}

/// Strings print bare, `null` as `(none)`, anything else as compact JSON.
fn display_field(value: &Value) -> String {
    match value {
        Value::Null => "(none)".to_string(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

pub fn save_blogs(path: &Path, blogs: &[BlogSummary]) -> anyhow::Result<()> {
    let content = serde_json::to_string_pretty(blogs)?;
    std::fs::write(path, content)
        .map_err(|e| anyhow::anyhow!("failed to write {}: {}", path.display(), e))
}

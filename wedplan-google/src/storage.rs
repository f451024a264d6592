//! Firebase Storage uploads.

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;
use url::Url;

use wedplan_core::{WeddingError, WeddingResult};

const STORAGE_API: &str = "https://firebasestorage.googleapis.com/v0";

/// Object path for a new couple photo.
pub fn couple_image_path(epoch_ms: i64) -> String {
    format!("profile/couple_{epoch_ms}")
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadedObject {
    name: String,
    #[serde(default)]
    download_tokens: Option<String>,
}

pub struct FirebaseStorage {
    http: reqwest::Client,
    bucket: String,
}

impl FirebaseStorage {
    pub fn new(bucket: &str) -> Self {
        FirebaseStorage {
            http: reqwest::Client::new(),
            bucket: bucket.to_string(),
        }
    }

    /// Upload `bytes` to `path` and return a public download URL.
    pub async fn upload(
        &self,
        bytes: Vec<u8>,
        path: &str,
        content_type: &str,
    ) -> WeddingResult<String> {
        self.try_upload(bytes, path, content_type)
            .await
            .map_err(|e| WeddingError::Remote(format!("{e:#}")))
    }

    async fn try_upload(&self, bytes: Vec<u8>, path: &str, content_type: &str) -> Result<String> {
        let mut url = self.objects_url()?;
        url.query_pairs_mut().append_pair("name", path);

        let response = self
            .http
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .context("Failed to reach Firebase Storage")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Firebase Storage returned {status}: {error_text}");
        }

        let object: UploadedObject = response
            .json()
            .await
            .context("Failed to parse upload response")?;

        let url = download_url(&self.bucket, &object.name, object.download_tokens.as_deref())?;
        info!(path = %object.name, "uploaded file to Firebase Storage");
        Ok(url.into())
    }

    fn objects_url(&self) -> Result<Url> {
        let mut url = Url::parse(STORAGE_API).context("Invalid Storage base URL")?;
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("Storage base URL cannot have path segments"))?
            .extend(["b", &self.bucket, "o"]);
        Ok(url)
    }
}

/// Public URL for an uploaded object. The object name is a single
/// (escaped) path segment.
fn download_url(bucket: &str, name: &str, token: Option<&str>) -> Result<Url> {
    let mut url = Url::parse(STORAGE_API).context("Invalid Storage base URL")?;
    url.path_segments_mut()
        .map_err(|_| anyhow::anyhow!("Storage base URL cannot have path segments"))?
        .extend(["b", bucket, "o", name]);
    {
        let mut query = url.query_pairs_mut();
        query.append_pair("alt", "media");
        // Several tokens may be comma-separated; any of them works.
        if let Some(token) = token.and_then(|t| t.split(',').next()) {
            query.append_pair("token", token);
        }
    }
    Ok(url)
}

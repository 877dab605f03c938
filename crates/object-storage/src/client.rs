//! Object storage API client.
//!
//! One multipart POST per call, no retries.

use apkdrop_protocol::{
    Blob, ClientError, ProgressCallback, ProgressReporter, StoredObject, progress_part,
};
use reqwest::multipart::Form;
use tracing::debug;

use crate::types::{DEFAULT_BASE_URL, DEFAULT_FOLDER, StorageConfig, UploadResponse};

/// Resource classification for non-image payloads.
const RESOURCE_TYPE: &str = "raw";

/// Object storage client.
pub struct Client {
    http: reqwest::Client,
    config: StorageConfig,
}

/// Where and how one upload is sent.
struct Target<'a> {
    url: reqwest::Url,
    preset: &'a str,
}

impl Client {
    /// Creates a client. Missing credentials are reported by [`store`](Self::store).
    pub fn new(config: StorageConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ClientError::Configuration(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { http, config })
    }

    /// Creates a client on top of an existing HTTP client.
    pub fn with_http(http: reqwest::Client, config: StorageConfig) -> Self {
        Self { http, config }
    }

    /// Checks that every setting needed for an upload is present and
    /// that the resulting endpoint is a usable URL.
    pub fn ensure_configured(&self) -> Result<(), ClientError> {
        self.target().map(|_| ())
    }

    fn target(&self) -> Result<Target<'_>, ClientError> {
        let cloud_name = non_blank(&self.config.cloud_name)
            .ok_or_else(|| ClientError::missing_setting("storage cloud name"))?;
        // Becomes a path segment of the endpoint.
        if !cloud_name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ClientError::Configuration(format!(
                "storage cloud name {cloud_name:?} may only contain letters, digits, '-' and '_'"
            )));
        }
        let preset = non_blank(&self.config.upload_preset)
            .ok_or_else(|| ClientError::missing_setting("storage upload preset"))?;
        let url =
            ClientError::parse_endpoint("storage base URL", &self.upload_url(cloud_name))?;
        Ok(Target { url, preset })
    }

    fn upload_url(&self, cloud_name: &str) -> String {
        let base = self
            .config
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/');
        format!("{base}/{cloud_name}/{RESOURCE_TYPE}/upload")
    }

    /// Uploads `blob` and returns its public URL.
    ///
    /// `on_progress` receives non-decreasing percentages while the body
    /// is being sent.
    pub async fn store(
        &self,
        blob: &Blob,
        on_progress: ProgressCallback,
    ) -> Result<StoredObject, ClientError> {
        let Target { url, preset } = self.target()?;
        let folder = non_blank(&self.config.folder).unwrap_or(DEFAULT_FOLDER);

        let part = progress_part(blob, ProgressReporter::new(on_progress))?;
        let form = Form::new()
            .part("file", part)
            .text("upload_preset", preset.to_string())
            .text("resource_type", RESOURCE_TYPE)
            .text("folder", folder.to_string());

        debug!(file = %blob.name(), bytes = blob.size(), %url, "staging blob in object storage");

        let resp = self.http.post(url).multipart(form).send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            return Err(ClientError::from_response(
                status.as_u16(),
                status.canonical_reason(),
                &body,
            ));
        }

        let parsed: UploadResponse = serde_json::from_str(&body)
            .map_err(|e| ClientError::InvalidResponse(format!("object storage: {e}")))?;
        let url = parsed
            .secure_url
            .or(parsed.url)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| {
                ClientError::InvalidResponse("object storage response has no URL".into())
            })?;

        debug!(public_id = %parsed.public_id, bytes = parsed.bytes, "blob staged");

        Ok(StoredObject {
            url,
            public_id: parsed.public_id,
            size_bytes: parsed.bytes,
            format: parsed.format,
        })
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

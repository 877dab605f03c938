//! Device testing provider API client.
//!
//! HTTP client using `reqwest` with basic authentication
//! (username / access key). One request per call, no retries.

use apkdrop_protocol::{
    Blob, ClientError, ProgressCallback, ProgressReporter, ProviderApp, progress_part,
};
use reqwest::multipart::Form;
use tracing::debug;

use crate::types::{DEFAULT_BASE_URL, ProviderConfig, UploadResponse};

/// Device testing provider client.
pub struct Client {
    http: reqwest::Client,
    config: ProviderConfig,
}

/// Where and as whom one submission is sent.
struct Target<'a> {
    url: reqwest::Url,
    username: &'a str,
    access_key: &'a str,
}

impl Client {
    /// Creates a client. Missing credentials are reported on submit.
    pub fn new(config: ProviderConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ClientError::Configuration(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { http, config })
    }

    /// Creates a client on top of an existing HTTP client.
    pub fn with_http(http: reqwest::Client, config: ProviderConfig) -> Self {
        Self { http, config }
    }

    /// Checks that the username and access key are present and that the
    /// endpoint is a usable URL.
    pub fn ensure_configured(&self) -> Result<(), ClientError> {
        self.target().map(|_| ())
    }

    fn target(&self) -> Result<Target<'_>, ClientError> {
        let username = non_blank(&self.config.username)
            .ok_or_else(|| ClientError::missing_setting("provider username"))?;
        let access_key = non_blank(&self.config.access_key)
            .ok_or_else(|| ClientError::missing_setting("provider access key"))?;
        let url = ClientError::parse_endpoint("provider base URL", &self.upload_url())?;
        Ok(Target {
            url,
            username,
            access_key,
        })
    }

    fn upload_url(&self) -> String {
        let base = self
            .config
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/');
        format!("{base}/upload")
    }

    /// Uploads the package bytes directly.
    pub async fn submit_blob(
        &self,
        blob: &Blob,
        on_progress: ProgressCallback,
    ) -> Result<ProviderApp, ClientError> {
        let target = self.target()?;
        let part = progress_part(blob, ProgressReporter::new(on_progress))?;
        let form = Form::new().part("file", part);

        debug!(file = %blob.name(), bytes = blob.size(), "submitting package to provider");
        self.post(target, form).await
    }

    /// Asks the provider to fetch the package from `url`.
    ///
    /// The request body is tiny, so progress jumps from 0 to 100 once
    /// the provider has accepted the package.
    pub async fn submit_from_url(
        &self,
        url: &str,
        on_progress: ProgressCallback,
    ) -> Result<ProviderApp, ClientError> {
        let target = self.target()?;
        let reporter = ProgressReporter::new(on_progress);
        reporter.report(0);

        let form = Form::new().text("url", url.to_string());

        debug!(source = %url, "submitting package URL to provider");
        let app = self.post(target, form).await?;
        reporter.report(100);
        Ok(app)
    }

    async fn post(&self, target: Target<'_>, form: Form) -> Result<ProviderApp, ClientError> {
        let resp = self
            .http
            .post(target.url)
            .basic_auth(target.username, Some(target.access_key))
            .multipart(form)
            .send()
            .await?;
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
            .map_err(|e| ClientError::InvalidResponse(format!("device testing provider: {e}")))?;
        let provider_id = parsed.provider_id();
        let app_url = parsed.app_url.filter(|u| !u.is_empty()).ok_or_else(|| {
            ClientError::InvalidResponse("device testing provider response has no app_url".into())
        })?;

        debug!(%app_url, "package accepted by provider");
        Ok(ProviderApp {
            app_url,
            provider_id,
        })
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

//! Configuration and wire types for the device testing provider API.

use serde::Deserialize;

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://api-cloud.browserstack.com/app-automate";

/// Credentials and endpoint of the device testing provider.
#[derive(Clone, Default)]
pub struct ProviderConfig {
    pub username: Option<String>,
    pub access_key: Option<String>,
    /// Overrides [`DEFAULT_BASE_URL`].
    pub base_url: Option<String>,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("username", &self.username)
            .field("access_key", &self.access_key.as_ref().map(|_| "***"))
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Successful upload response.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct UploadResponse {
    #[serde(default)]
    pub app_url: Option<String>,
    #[serde(default)]
    pub app_id: Option<String>,
    #[serde(default)]
    pub hashed_id: Option<String>,
}

impl UploadResponse {
    /// Provider identifier, preferring `app_id` over `hashed_id`.
    pub fn provider_id(&self) -> Option<String> {
        self.app_id
            .iter()
            .chain(self.hashed_id.iter())
            .find(|id| !id.is_empty())
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_id_prefers_app_id() {
        let resp: UploadResponse =
            serde_json::from_str(r#"{"app_url":"bs://a","app_id":"A1","hashed_id":"H1"}"#)
                .unwrap();
        assert_eq!(resp.provider_id().as_deref(), Some("A1"));
    }

    #[test]
    fn provider_id_falls_back_to_hashed_id() {
        let resp: UploadResponse =
            serde_json::from_str(r#"{"app_url":"bs://a","app_id":"","hashed_id":"H1"}"#).unwrap();
        assert_eq!(resp.provider_id().as_deref(), Some("H1"));

        let resp: UploadResponse = serde_json::from_str(r#"{"app_url":"bs://a"}"#).unwrap();
        assert!(resp.provider_id().is_none());
    }

    #[test]
    fn debug_masks_access_key() {
        let config = ProviderConfig {
            username: Some("alice".into()),
            access_key: Some("s3cr3t".into()),
            base_url: None,
        };
        let dbg = format!("{config:?}");
        assert!(dbg.contains("alice"));
        assert!(!dbg.contains("s3cr3t"));
    }
}

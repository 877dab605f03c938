//! Configuration and wire types for the object storage API.

use serde::Deserialize;

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://api.cloudinary.com/v1_1";

/// Folder staged packages are grouped under.
pub const DEFAULT_FOLDER: &str = "apk-uploads";

/// Settings needed to reach the storage service.
///
/// Credentials are optional here so a client can be built from partial
/// settings; a missing value surfaces as a configuration error when an
/// upload is attempted.
#[derive(Debug, Clone, Default)]
pub struct StorageConfig {
    /// Cloud (account) name, part of the upload URL.
    pub cloud_name: Option<String>,
    /// Unsigned upload preset.
    pub upload_preset: Option<String>,
    /// Destination folder. Defaults to [`DEFAULT_FOLDER`].
    pub folder: Option<String>,
    /// Overrides [`DEFAULT_BASE_URL`].
    pub base_url: Option<String>,
}

/// Successful upload response.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct UploadResponse {
    #[serde(default)]
    pub secure_url: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub public_id: String,
    #[serde(default)]
    pub bytes: u64,
    #[serde(default)]
    pub format: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_tolerates_missing_fields() {
        let resp: UploadResponse =
            serde_json::from_str(r#"{"secure_url":"https://cdn/x.apk"}"#).unwrap();
        assert_eq!(resp.secure_url.as_deref(), Some("https://cdn/x.apk"));
        assert_eq!(resp.bytes, 0);
        assert!(resp.format.is_empty());
    }
}

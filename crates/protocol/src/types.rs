//! Results of the two upload legs, plus display helpers.

use serde::{Deserialize, Serialize};

/// Result of staging a blob in object storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredObject {
    /// Publicly fetchable URL of the stored blob.
    pub url: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub public_id: String,
    /// Byte count reported by the storage service.
    pub size_bytes: u64,
    /// Format detected by the storage service (may be empty for raw files).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub format: String,
}

/// Result of submitting an application to the device testing provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderApp {
    /// Provider-hosted URL used to run the app in automated tests.
    pub app_url: String,
    /// Opaque handle of the provider's own upload record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<String>,
}

/// Formats a byte count for display (`"12.5 MB"`).
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let formatted = format!("{value:.2}");
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_size_units() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(1023), "1023 B");
        assert_eq!(format_size(1024), "1 KB");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(50 * 1024 * 1024), "50 MB");
        assert_eq!(format_size(3 * 1024 * 1024 * 1024), "3 GB");
    }

    #[test]
    fn provider_app_omits_missing_id() {
        let app = ProviderApp {
            app_url: "bs://abc".into(),
            provider_id: None,
        };
        let json = serde_json::to_string(&app).unwrap();
        assert_eq!(json, r#"{"appUrl":"bs://abc"}"#);
    }
}

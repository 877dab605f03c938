use std::path::{Path, PathBuf};

use apkdrop_device_testing::ProviderConfig;
use apkdrop_object_storage::StorageConfig;
use apkdrop_object_storage::types::DEFAULT_FOLDER;
use apkdrop_upload::policy::{DEFAULT_SPLIT_POINT, DEFAULT_STAGING_THRESHOLD};
use apkdrop_upload::validation::DEFAULT_MAX_FILE_SIZE;
use apkdrop_upload::{FilePolicy, ProgressSplit, StagingPolicy, UploadPolicy};
use serde::{Deserialize, Serialize};

use crate::env;
use crate::error::SettingsError;

const MASK: &str = "********";

/// All apkdrop settings.
///
/// Empty strings mean "not set"; every section may be omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub storage: StorageSettings,
    pub provider: ProviderSettings,
    pub upload: UploadSettings,
}

/// `[storage]`: object storage used for staging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub cloud_name: String,
    /// Unsigned upload preset.
    pub upload_preset: String,
    pub folder: String,
    /// API root override, mostly for testing against a local server.
    pub base_url: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            cloud_name: String::new(),
            upload_preset: String::new(),
            folder: DEFAULT_FOLDER.into(),
            base_url: String::new(),
        }
    }
}

/// `[provider]`: device testing provider credentials.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    pub username: String,
    pub access_key: String,
    pub base_url: String,
}

/// When packages are staged before submission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StagingMode {
    Always,
    #[default]
    AboveThreshold,
    Never,
}

/// `[upload]`: orchestration policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadSettings {
    pub staging: StagingMode,
    /// Only used with `staging = "above-threshold"`.
    pub staging_threshold_bytes: u64,
    /// Share of the overall progress given to the staging leg.
    pub split_point: u8,
    pub max_file_size_bytes: u64,
    pub allowed_extensions: Vec<String>,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            staging: StagingMode::default(),
            staging_threshold_bytes: DEFAULT_STAGING_THRESHOLD,
            split_point: DEFAULT_SPLIT_POINT,
            max_file_size_bytes: DEFAULT_MAX_FILE_SIZE,
            allowed_extensions: vec!["apk".into()],
        }
    }
}

impl Settings {
    /// Loads settings from `path`, or from [`config_path`] when `None`.
    ///
    /// A missing file yields the defaults; nothing is written to disk.
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        let path = path.map(Path::to_path_buf).unwrap_or_else(config_path);

        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path).map_err(|source| SettingsError::Read {
            path: path.clone(),
            source,
        })?;
        let settings: Settings =
            toml::from_str(&content).map_err(|source| SettingsError::Parse {
                path: path.clone(),
                source,
            })?;

        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(settings)
    }

    /// Overrides credentials from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|name| std::env::var(name).ok());
    }

    /// Overrides credentials using `get` to look up variables.
    ///
    /// Recognizes `CLOUDINARY_CLOUD_NAME`, `CLOUDINARY_UPLOAD_PRESET`,
    /// `BROWSERSTACK_USERNAME` and `BROWSERSTACK_ACCESS_KEY`, each also
    /// with a `VITE_` prefix. Blank values are ignored.
    pub fn apply_env_with(&mut self, get: impl Fn(&str) -> Option<String>) {
        let targets: [(&str, &mut String); 4] = [
            (env::CLOUD_NAME, &mut self.storage.cloud_name),
            (env::UPLOAD_PRESET, &mut self.storage.upload_preset),
            (env::PROVIDER_USERNAME, &mut self.provider.username),
            (env::PROVIDER_ACCESS_KEY, &mut self.provider.access_key),
        ];
        for (name, field) in targets {
            if let Some(value) = env::lookup(&get, name) {
                tracing::debug!(variable = name, "setting taken from environment");
                *field = value;
            }
        }
    }

    /// Checks the values that have a constrained range.
    ///
    /// Missing credentials are not an error here; they are reported when
    /// a leg that needs them is about to run.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let upload = &self.upload;
        if ProgressSplit::new(upload.split_point).is_none() {
            return Err(SettingsError::InvalidSplitPoint(upload.split_point));
        }
        if upload.max_file_size_bytes == 0 {
            return Err(SettingsError::InvalidMaxFileSize);
        }
        if !upload
            .allowed_extensions
            .iter()
            .any(|ext| !ext.trim().is_empty())
        {
            return Err(SettingsError::NoAllowedExtensions);
        }
        Ok(())
    }

    /// A copy with secrets masked, for display.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        mask(&mut copy.storage.upload_preset);
        mask(&mut copy.provider.access_key);
        copy
    }

    pub fn to_toml(&self) -> Result<String, SettingsError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn storage_config(&self) -> StorageConfig {
        let s = &self.storage;
        StorageConfig {
            cloud_name: non_empty(&s.cloud_name),
            upload_preset: non_empty(&s.upload_preset),
            folder: non_empty(&s.folder),
            base_url: non_empty(&s.base_url),
        }
    }

    pub fn provider_config(&self) -> ProviderConfig {
        let p = &self.provider;
        ProviderConfig {
            username: non_empty(&p.username),
            access_key: non_empty(&p.access_key),
            base_url: non_empty(&p.base_url),
        }
    }

    /// Builds the orchestrator policy, validating the settings first.
    pub fn upload_policy(&self) -> Result<UploadPolicy, SettingsError> {
        self.validate()?;
        let upload = &self.upload;

        let staging = match upload.staging {
            StagingMode::Always => StagingPolicy::Always,
            StagingMode::AboveThreshold => {
                StagingPolicy::AboveThreshold(upload.staging_threshold_bytes)
            }
            StagingMode::Never => StagingPolicy::Never,
        };
        let split = ProgressSplit::new(upload.split_point)
            .ok_or(SettingsError::InvalidSplitPoint(upload.split_point))?;
        let files = FilePolicy {
            max_size: upload.max_file_size_bytes,
            allowed_extensions: upload
                .allowed_extensions
                .iter()
                .map(|ext| ext.trim().trim_start_matches('.').to_ascii_lowercase())
                .filter(|ext| !ext.is_empty())
                .collect(),
        };

        Ok(UploadPolicy {
            staging,
            split,
            files,
        })
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn mask(value: &mut String) {
    if !value.is_empty() {
        *value = MASK.into();
    }
}

/// Returns the platform-specific configuration file path.
pub fn config_path() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        PathBuf::from(home)
            .join(".config")
            .join("apkdrop")
            .join("config.toml")
    }

    #[cfg(target_os = "windows")]
    {
        let appdata =
            std::env::var("APPDATA").unwrap_or_else(|_| "C:\\Users\\Default\\AppData".into());
        PathBuf::from(appdata).join("apkdrop").join("config.toml")
    }

    #[cfg(not(any(target_os = "linux", target_os = "windows")))]
    {
        PathBuf::from("/tmp/apkdrop/config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let settings = Settings::default();
        assert_eq!(settings.storage.folder, "apk-uploads");
        assert_eq!(settings.upload.staging, StagingMode::AboveThreshold);
        assert_eq!(settings.upload.staging_threshold_bytes, 50 * 1024 * 1024);
        assert_eq!(settings.upload.split_point, 50);
        assert_eq!(settings.upload.max_file_size_bytes, 100 * 1024 * 1024);
        assert_eq!(settings.upload.allowed_extensions, vec!["apk".to_string()]);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn partial_toml() {
        let settings: Settings = toml::from_str(
            r#"
            [provider]
            username = "alice"

            [upload]
            staging = "always"
            split_point = 70
            "#,
        )
        .unwrap();

        assert_eq!(settings.provider.username, "alice");
        assert!(settings.provider.access_key.is_empty());
        assert_eq!(settings.storage.folder, "apk-uploads");
        assert_eq!(settings.upload.staging, StagingMode::Always);
        assert_eq!(settings.upload.split_point, 70);
        assert_eq!(settings.upload.max_file_size_bytes, 100 * 1024 * 1024);
    }

    #[test]
    fn toml_roundtrip() {
        let mut settings = Settings::default();
        settings.storage.cloud_name = "demo".into();
        settings.upload.staging = StagingMode::Never;

        let text = settings.to_toml().unwrap();
        assert!(text.contains(r#"staging = "never""#), "{text}");
        let parsed: Settings = toml::from_str(&text).unwrap();
        assert_eq!(parsed, settings);
    }

    #[test]
    fn load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings, Settings::default());
        assert!(!path.exists());
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[storage]\ncloud_name = \"demo\"\nupload_preset = \"unsigned\"\n",
        )
        .unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.storage.cloud_name, "demo");
        assert_eq!(settings.storage.upload_preset, "unsigned");
    }

    #[test]
    fn load_reports_parse_errors_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[upload]\nsplit_point = \"half\"\n").unwrap();

        let err = Settings::load(Some(&path)).unwrap_err();
        assert!(matches!(err, SettingsError::Parse { .. }));
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn env_overrides_file_values() {
        let mut settings = Settings::default();
        settings.provider.username = "from-file".into();
        settings.provider.access_key = "file-key".into();

        settings.apply_env_with(|name| match name {
            "BROWSERSTACK_USERNAME" => Some("from-env".into()),
            "VITE_CLOUDINARY_CLOUD_NAME" => Some("vite-cloud".into()),
            "BROWSERSTACK_ACCESS_KEY" => Some("  ".into()),
            _ => None,
        });

        assert_eq!(settings.provider.username, "from-env");
        assert_eq!(settings.provider.access_key, "file-key");
        assert_eq!(settings.storage.cloud_name, "vite-cloud");
        assert!(settings.storage.upload_preset.is_empty());
    }

    #[test]
    fn validate_rejects_bad_split_point() {
        for point in [0u8, 100, 200] {
            let mut settings = Settings::default();
            settings.upload.split_point = point;
            assert!(matches!(
                settings.validate(),
                Err(SettingsError::InvalidSplitPoint(p)) if p == point
            ));
            assert!(settings.upload_policy().is_err());
        }
    }

    #[test]
    fn validate_rejects_zero_max_size_and_no_extensions() {
        let mut settings = Settings::default();
        settings.upload.max_file_size_bytes = 0;
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::InvalidMaxFileSize)
        ));

        let mut settings = Settings::default();
        settings.upload.allowed_extensions = vec!["  ".into()];
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::NoAllowedExtensions)
        ));
    }

    #[test]
    fn missing_credentials_are_not_a_settings_error() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert!(settings.provider_config().username.is_none());
        assert!(settings.storage_config().upload_preset.is_none());
    }

    #[test]
    fn redacted_masks_secrets_only() {
        let mut settings = Settings::default();
        settings.storage.cloud_name = "demo".into();
        settings.storage.upload_preset = "preset".into();
        settings.provider.username = "alice".into();
        settings.provider.access_key = "s3cr3t".into();

        let shown = settings.redacted();
        assert_eq!(shown.storage.cloud_name, "demo");
        assert_eq!(shown.provider.username, "alice");
        assert_eq!(shown.storage.upload_preset, MASK);
        assert_eq!(shown.provider.access_key, MASK);
        assert!(!shown.to_toml().unwrap().contains("s3cr3t"));

        // Unset secrets stay visibly unset.
        assert!(Settings::default().redacted().provider.access_key.is_empty());
    }

    #[test]
    fn client_configs_trim_and_drop_blanks() {
        let mut settings = Settings::default();
        settings.storage.cloud_name = " demo ".into();
        settings.storage.folder = String::new();
        settings.provider.base_url = "http://127.0.0.1:9000".into();

        let storage = settings.storage_config();
        assert_eq!(storage.cloud_name.as_deref(), Some("demo"));
        assert!(storage.folder.is_none());
        assert!(storage.base_url.is_none());

        let provider = settings.provider_config();
        assert_eq!(provider.base_url.as_deref(), Some("http://127.0.0.1:9000"));
    }

    #[test]
    fn upload_policy_from_settings() {
        let mut settings = Settings::default();
        settings.upload.staging_threshold_bytes = 1234;
        settings.upload.split_point = 30;
        settings.upload.allowed_extensions = vec![".APK".into(), "aab".into()];

        let policy = settings.upload_policy().unwrap();
        assert_eq!(policy.staging, StagingPolicy::AboveThreshold(1234));
        assert_eq!(policy.split.point(), 30);
        assert_eq!(policy.files.allowed_extensions, vec!["apk", "aab"]);

        settings.upload.staging = StagingMode::Always;
        assert_eq!(settings.upload_policy().unwrap().staging, StagingPolicy::Always);
    }

    #[test]
    fn config_path_ends_with_config_toml() {
        let path = config_path();
        assert!(path.ends_with("apkdrop/config.toml"));
    }
}

use std::path::PathBuf;

/// Errors from loading or checking settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("upload.split_point must be between 1 and 99, got {0}")]
    InvalidSplitPoint(u8),

    #[error("upload.max_file_size_bytes must be greater than zero")]
    InvalidMaxFileSize,

    #[error("upload.allowed_extensions must not be empty")]
    NoAllowedExtensions,
}

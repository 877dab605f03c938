//! apkdrop settings.
//!
//! Configuration is stored as TOML:
//! - Linux: `~/.config/apkdrop/config.toml`
//! - Windows: `%APPDATA%/apkdrop/config.toml`
//!
//! Credentials can also come from the environment, which takes precedence
//! over the file. See [`Settings::apply_env`].

mod env;
mod error;
mod settings;

pub use error::SettingsError;
pub use settings::{
    ProviderSettings, Settings, StagingMode, StorageSettings, UploadSettings, config_path,
};

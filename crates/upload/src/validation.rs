//! Accepted file type and size policy.

use std::path::Path;

use apkdrop_protocol::APK_MIME_TYPE;

use crate::error::ValidationError;

/// Default maximum package size: 100 MiB.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// Which files may be uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePolicy {
    /// Largest accepted size in bytes (inclusive).
    pub max_size: u64,
    /// Accepted extensions, without the dot. Matched case-insensitively.
    pub allowed_extensions: Vec<String>,
}

impl Default for FilePolicy {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_FILE_SIZE,
            allowed_extensions: vec!["apk".into()],
        }
    }
}

impl FilePolicy {
    /// Checks a file's name, declared size and optional MIME type.
    ///
    /// An APK MIME type is accepted regardless of the extension as long
    /// as `apk` is an allowed extension.
    pub fn validate(
        &self,
        name: &str,
        size: u64,
        content_type: Option<&str>,
    ) -> Result<(), ValidationError> {
        if !self.accepts_type(name, content_type) {
            return Err(ValidationError::UnsupportedType {
                name: name.to_string(),
                accepted: self.accepted_list(),
            });
        }
        if size == 0 {
            return Err(ValidationError::Empty);
        }
        if size > self.max_size {
            return Err(ValidationError::TooLarge {
                size,
                max: self.max_size,
            });
        }
        Ok(())
    }

    fn accepts_type(&self, name: &str, content_type: Option<&str>) -> bool {
        let allows = |ext: &str| {
            self.allowed_extensions
                .iter()
                .any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(ext))
        };

        let by_extension = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(allows);
        let by_mime = content_type.is_some_and(|ct| ct.eq_ignore_ascii_case(APK_MIME_TYPE))
            && allows("apk");

        by_extension || by_mime
    }

    fn accepted_list(&self) -> String {
        self.allowed_extensions
            .iter()
            .map(|e| format!(".{}", e.trim_start_matches('.')))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

//! In-memory application package handed to the upload clients.

use std::path::Path;
use std::sync::Arc;

/// MIME type of an Android application package.
pub const APK_MIME_TYPE: &str = "application/vnd.android.package-archive";

/// Fallback MIME type for payloads of unknown type.
const OCTET_STREAM: &str = "application/octet-stream";

/// A named binary payload.
///
/// The bytes are shared behind an `Arc` so a blob can be cloned into
/// request bodies without copying the whole file.
#[derive(Debug, Clone)]
pub struct Blob {
    name: String,
    content_type: String,
    data: Arc<[u8]>,
}

impl Blob {
    /// Creates a blob from raw bytes. The content type is guessed from the name.
    pub fn new(name: impl Into<String>, data: impl Into<Arc<[u8]>>) -> Self {
        let name = name.into();
        let content_type = guess_content_type(&name).to_string();
        Self {
            name,
            content_type,
            data: data.into(),
        }
    }

    /// Overrides the guessed content type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// Reads a file into a blob named after the file.
    pub async fn read_from(path: &Path) -> std::io::Result<Self> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.bin".into());
        let data = tokio::fs::read(path).await?;
        Ok(Self::new(name, data))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Size of the payload in bytes.
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Shared handle to the payload bytes.
    pub fn shared_data(&self) -> Arc<[u8]> {
        Arc::clone(&self.data)
    }
}

fn guess_content_type(name: &str) -> &'static str {
    let ext = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("apk") => APK_MIME_TYPE,
        Some("zip") => "application/zip",
        _ => OCTET_STREAM,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apk_gets_package_mime() {
        let blob = Blob::new("app-release.APK", vec![1, 2, 3]);
        assert_eq!(blob.content_type(), APK_MIME_TYPE);
        assert_eq!(blob.size(), 3);
    }

    #[test]
    fn unknown_extension_is_octet_stream() {
        let blob = Blob::new("notes", Vec::new());
        assert_eq!(blob.content_type(), OCTET_STREAM);
        assert_eq!(blob.size(), 0);
    }

    #[test]
    fn clone_shares_bytes() {
        let blob = Blob::new("a.apk", vec![0u8; 16]);
        let copy = blob.clone();
        assert!(Arc::ptr_eq(&blob.shared_data(), &copy.shared_data()));
    }

    #[tokio::test]
    async fn read_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("demo.apk");
        std::fs::write(&path, b"PK\x03\x04").unwrap();

        let blob = Blob::read_from(&path).await.unwrap();
        assert_eq!(blob.name(), "demo.apk");
        assert_eq!(blob.data(), b"PK\x03\x04");
        assert_eq!(blob.content_type(), APK_MIME_TYPE);
    }

    #[tokio::test]
    async fn read_from_missing_file_fails() {
        let result = Blob::read_from(Path::new("/nonexistent/app.apk")).await;
        assert!(result.is_err());
    }
}

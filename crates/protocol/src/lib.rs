//! Shared types for apkdrop uploads.
//!
//! Every crate in the workspace speaks in these types: the leaf HTTP
//! clients take a [`Blob`] and report through a [`ProgressCallback`],
//! fail with a [`ClientError`], and the orchestrator records the outcome
//! in an [`UploadRecord`].

pub mod blob;
pub mod body;
pub mod error;
pub mod progress;
pub mod record;
#[cfg(any(test, feature = "test-util"))]
pub mod testing;
pub mod types;

// Re-export primary types for convenience.
pub use blob::{APK_MIME_TYPE, Blob};
pub use body::{UPLOAD_CHUNK_SIZE, progress_part};
pub use error::{ClientError, ErrorKind};
pub use progress::{ProgressCallback, ProgressReporter, percent_of};
pub use record::{MAX_RUNNING_PROGRESS, RecordPatch, UploadRecord, UploadStatus};
pub use types::{ProviderApp, StoredObject, format_size};

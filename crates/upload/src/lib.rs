//! Upload orchestration for application packages.
//!
//! Sequences the two upload legs into one "submit application"
//! operation and tracks it in an [`UploadRecord`]:
//!
//! 1. **Validate**: file type and size against the [`FilePolicy`]
//! 2. **Stage** (optional): upload to object storage for a public URL
//! 3. **Submit**: hand the package (or the staged URL) to the device
//!    testing provider
//!
//! Leg progress is rescaled onto one 0-100 scale and every record
//! change is reported through an [`UploadObserver`].

pub mod error;
pub mod legs;
pub mod observer;
pub mod orchestrator;
pub mod policy;
pub mod store;
pub mod validation;

// Re-export primary types for convenience.
pub use apkdrop_protocol::{RecordPatch, UploadRecord, UploadStatus};
pub use error::{Stage, UploadError, ValidationError};
pub use legs::{DeviceTestingProvider, LegFuture, ObjectStorage};
pub use observer::UploadObserver;
pub use orchestrator::{UploadOrchestrator, UploadOutcome};
pub use policy::{ProgressBand, ProgressSplit, StagingPolicy, UploadPolicy};
pub use store::UploadStore;
pub use validation::FilePolicy;

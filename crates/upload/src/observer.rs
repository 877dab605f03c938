//! Presentation callback interface.

use apkdrop_protocol::{RecordPatch, UploadRecord};

/// Receives record lifecycle notifications.
///
/// Creation and deletion are driven by the caller; during a run the
/// orchestrator only ever calls [`on_update`](Self::on_update), always
/// with a patch it has already applied to its own record.
pub trait UploadObserver: Send + Sync {
    fn on_create(&self, _record: &UploadRecord) {}

    fn on_update(&self, id: &str, patch: &RecordPatch);

    fn on_delete(&self, _id: &str) {}
}

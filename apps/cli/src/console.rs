//! Observer that keeps records in a store and logs their progress.

use std::sync::atomic::{AtomicU8, Ordering};

use apkdrop_upload::{RecordPatch, UploadObserver, UploadRecord, UploadStore};
use tracing::{debug, info};

/// Progress is logged at `info` once per this many percent.
const PROGRESS_STEP: u8 = 10;

#[derive(Default)]
pub struct ConsoleObserver {
    store: UploadStore,
    last_logged: AtomicU8,
}

impl ConsoleObserver {
    pub fn store(&self) -> &UploadStore {
        &self.store
    }

    fn log_progress(&self, id: &str, percent: u8) {
        let step = percent / PROGRESS_STEP * PROGRESS_STEP;
        let previous = self.last_logged.fetch_max(step, Ordering::Relaxed);
        if step > previous {
            info!(upload_id = id, progress = percent, "upload progress");
        } else {
            debug!(upload_id = id, progress = percent, "upload progress");
        }
    }
}

impl UploadObserver for ConsoleObserver {
    fn on_create(&self, record: &UploadRecord) {
        info!(
            upload_id = %record.id,
            file = %record.file_name,
            size = %apkdrop_protocol::format_size(record.file_size),
            "upload queued"
        );
        self.store.on_create(record);
    }

    fn on_update(&self, id: &str, patch: &RecordPatch) {
        if patch.reset {
            self.last_logged.store(0, Ordering::Relaxed);
        }
        if let Some(message) = &patch.status_message {
            info!(upload_id = id, "{message}");
        }
        if let Some(percent) = patch.progress {
            self.log_progress(id, percent);
        }
        self.store.on_update(id, patch);
    }

    fn on_delete(&self, id: &str) {
        self.store.on_delete(id);
    }
}

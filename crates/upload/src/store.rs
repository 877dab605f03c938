//! In-memory collection of upload records.

use std::sync::RwLock;

use apkdrop_protocol::{RecordPatch, UploadRecord};

use crate::observer::UploadObserver;

/// Newest-first list of upload records.
///
/// Feeds on the [`UploadObserver`] callbacks, so it can be handed to
/// the orchestrator directly. Durable storage is left to the caller
/// (the records are serde-serializable).
#[derive(Debug, Default)]
pub struct UploadStore {
    records: RwLock<Vec<UploadRecord>>,
}

impl UploadStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store from previously saved records (newest first).
    pub fn from_records(records: Vec<UploadRecord>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }

    /// Snapshot of all records, newest first.
    pub fn list(&self) -> Vec<UploadRecord> {
        self.read().clone()
    }

    pub fn get(&self, id: &str) -> Option<UploadRecord> {
        self.read().iter().find(|r| r.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Vec<UploadRecord>> {
        self.records.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Vec<UploadRecord>> {
        self.records.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl UploadObserver for UploadStore {
    fn on_create(&self, record: &UploadRecord) {
        let mut records = self.write();
        records.retain(|r| r.id != record.id);
        records.insert(0, record.clone());
    }

    fn on_update(&self, id: &str, patch: &RecordPatch) {
        if let Some(record) = self.write().iter_mut().find(|r| r.id == id) {
            record.apply(patch);
        }
    }

    fn on_delete(&self, id: &str) {
        self.write().retain(|r| r.id != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apkdrop_protocol::UploadStatus;

    #[test]
    fn newest_first() {
        let store = UploadStore::new();
        let first = UploadRecord::new("one.apk", 1);
        let second = UploadRecord::new("two.apk", 2);
        store.on_create(&first);
        store.on_create(&second);

        let names: Vec<_> = store.list().into_iter().map(|r| r.file_name).collect();
        assert_eq!(names, vec!["two.apk", "one.apk"]);
    }

    #[test]
    fn recreate_replaces_existing_entry() {
        let store = UploadStore::new();
        let record = UploadRecord::new("one.apk", 1);
        store.on_create(&record);
        store.on_create(&record);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn update_applies_patch() {
        let store = UploadStore::new();
        let record = UploadRecord::new("one.apk", 1);
        store.on_create(&record);

        store.on_update(
            &record.id,
            &RecordPatch::default()
                .status(UploadStatus::UploadingProvider)
                .progress(42),
        );

        let stored = store.get(&record.id).unwrap();
        assert_eq!(stored.status, UploadStatus::UploadingProvider);
        assert_eq!(stored.progress, 42);
    }

    #[test]
    fn update_rejects_inconsistent_patch() {
        let store = UploadStore::new();
        let record = UploadRecord::new("one.apk", 1);
        store.on_create(&record);

        store.on_update(
            &record.id,
            &RecordPatch::default()
                .app_url("bs://x")
                .error("boom")
                .progress(100),
        );

        assert_eq!(store.get(&record.id).unwrap(), record);
    }

    #[test]
    fn update_unknown_id_is_ignored() {
        let store = UploadStore::new();
        store.on_update("missing", &RecordPatch::default().progress(10));
        assert!(store.is_empty());
    }

    #[test]
    fn delete_removes_record() {
        let store = UploadStore::new();
        let a = UploadRecord::new("a.apk", 1);
        let b = UploadRecord::new("b.apk", 1);
        store.on_create(&a);
        store.on_create(&b);

        store.on_delete(&a.id);
        assert_eq!(store.len(), 1);
        assert!(store.get(&a.id).is_none());
        assert!(store.get(&b.id).is_some());
    }

    #[test]
    fn restores_saved_records() {
        let saved = vec![UploadRecord::new("a.apk", 1)];
        let json = serde_json::to_string(&saved).unwrap();
        let loaded: Vec<UploadRecord> = serde_json::from_str(&json).unwrap();

        let store = UploadStore::from_records(loaded);
        assert_eq!(store.list(), saved);
    }
}

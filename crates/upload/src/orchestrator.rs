//! Two-leg upload orchestrator.
//!
//! Runs one upload attempt as a strict sequence: validate, optionally
//! stage in object storage, then submit to the device testing provider.
//! The second leg never starts before the first has resolved, since it
//! consumes the staged URL.

use std::sync::Arc;

use apkdrop_protocol::{
    Blob, ClientError, MAX_RUNNING_PROGRESS, ProgressCallback, ProviderApp, RecordPatch,
    StoredObject, UploadRecord, UploadStatus,
};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::error::{Stage, UploadError};
use crate::legs::{DeviceTestingProvider, LegFuture, ObjectStorage};
use crate::observer::UploadObserver;
use crate::policy::{ProgressBand, UploadPolicy};

const MSG_STAGING: &str = "Uploading to object storage...";
const MSG_PROVIDER: &str = "Uploading to device testing provider...";
const MSG_COMPLETE: &str = "Upload complete";

/// Result of a successful upload attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOutcome {
    pub app: ProviderApp,
    /// The staged object, when the staging leg ran.
    pub staged: Option<StoredObject>,
}

/// Sequences the staging and provider legs for one package.
pub struct UploadOrchestrator {
    provider: Arc<dyn DeviceTestingProvider>,
    storage: Option<Arc<dyn ObjectStorage>>,
    policy: UploadPolicy,
}

impl UploadOrchestrator {
    /// Creates an orchestrator without a staging client.
    ///
    /// Packages the policy wants staged will fail with a configuration
    /// error until [`with_storage`](Self::with_storage) is called.
    pub fn new(provider: Arc<dyn DeviceTestingProvider>, policy: UploadPolicy) -> Self {
        Self {
            provider,
            storage: None,
            policy,
        }
    }

    /// Attaches the object storage client used for staging.
    pub fn with_storage(mut self, storage: Arc<dyn ObjectStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    /// Runs one upload attempt for `blob`, tracked in `record`.
    ///
    /// The record is reset to a fresh queued attempt first, then driven
    /// to `Completed` or `Failed`. Every change is applied to `record`
    /// and forwarded to `observer`. Errors are recorded and returned;
    /// nothing is retried.
    ///
    /// A completed record is final: submitting it again fails with
    /// [`UploadError::AlreadyCompleted`] and leaves it untouched.
    pub async fn submit(
        &self,
        record: &mut UploadRecord,
        blob: &Blob,
        observer: &dyn UploadObserver,
    ) -> Result<UploadOutcome, UploadError> {
        if record.status == UploadStatus::Completed {
            return Err(UploadError::AlreadyCompleted {
                id: record.id.clone(),
            });
        }

        let mut attempt = Attempt { record, observer };
        attempt.update(RecordPatch::reset());

        info!(
            upload_id = %attempt.record.id,
            file = %blob.name(),
            bytes = blob.size(),
            "upload started"
        );

        match self.run(&mut attempt, blob).await {
            Ok(outcome) => {
                attempt.update(
                    RecordPatch::default()
                        .status(UploadStatus::Completed)
                        .progress(100)
                        .message(MSG_COMPLETE)
                        .app_url(outcome.app.app_url.clone())
                        .provider_id(outcome.app.provider_id.clone()),
                );
                info!(
                    upload_id = %attempt.record.id,
                    app_url = %outcome.app.app_url,
                    "upload completed"
                );
                Ok(outcome)
            }
            Err(e) => {
                let message = e.to_string();
                attempt.update(
                    RecordPatch::default()
                        .status(UploadStatus::Failed)
                        .error(message.clone()),
                );
                error!(
                    upload_id = %attempt.record.id,
                    stage = ?e.stage(),
                    error = %message,
                    "upload failed"
                );
                Err(e)
            }
        }
    }

    async fn run(
        &self,
        attempt: &mut Attempt<'_>,
        blob: &Blob,
    ) -> Result<UploadOutcome, UploadError> {
        self.policy
            .files
            .validate(blob.name(), blob.size(), Some(blob.content_type()))?;

        // Fail fast: every leg this run needs must be configured before
        // the first request goes out.
        let storage = self.staging_client(blob.size())?;
        self.provider
            .ensure_configured()
            .map_err(|e| UploadError::leg(Stage::DeviceTesting, e))?;

        let staged = match storage {
            Some(storage) => {
                attempt.update(
                    RecordPatch::default()
                        .status(UploadStatus::UploadingIntermediate)
                        .message(MSG_STAGING),
                );
                debug!(upload_id = %attempt.record.id, "staging leg started");

                let band = self.policy.split.staging();
                let stored = drive_leg(attempt, band, |cb| storage.store(blob, cb))
                    .await
                    .map_err(|e| UploadError::leg(Stage::ObjectStorage, e))?;

                attempt.update(RecordPatch::default().intermediate_url(stored.url.clone()));
                debug!(upload_id = %attempt.record.id, url = %stored.url, "staging leg finished");
                Some(stored)
            }
            None => None,
        };

        attempt.update(
            RecordPatch::default()
                .status(UploadStatus::UploadingProvider)
                .message(MSG_PROVIDER),
        );
        debug!(
            upload_id = %attempt.record.id,
            staged = staged.is_some(),
            "provider leg started"
        );

        let provider = self.provider.as_ref();
        let app = match &staged {
            Some(stored) => {
                let band = self.policy.split.provider();
                drive_leg(attempt, band, |cb| provider.submit_from_url(&stored.url, cb)).await
            }
            None => drive_leg(attempt, ProgressBand::FULL, |cb| provider.submit_blob(blob, cb)).await,
        }
        .map_err(|e| UploadError::leg(Stage::DeviceTesting, e))?;

        Ok(UploadOutcome { app, staged })
    }

    /// Returns the staging client if this package needs one.
    fn staging_client(&self, size: u64) -> Result<Option<&dyn ObjectStorage>, UploadError> {
        if !self.policy.staging.requires_staging(size) {
            return Ok(None);
        }
        let storage = self.storage.as_deref().ok_or_else(|| {
            UploadError::leg(
                Stage::ObjectStorage,
                ClientError::Configuration("no object storage client configured".into()),
            )
        })?;
        storage
            .ensure_configured()
            .map_err(|e| UploadError::leg(Stage::ObjectStorage, e))?;
        Ok(Some(storage))
    }
}

/// The record of the attempt in flight plus where to report changes.
struct Attempt<'a> {
    record: &'a mut UploadRecord,
    observer: &'a dyn UploadObserver,
}

impl Attempt<'_> {
    fn update(&mut self, patch: RecordPatch) {
        if self.record.apply(&patch) {
            self.observer.on_update(&self.record.id, &patch);
        }
    }

    /// Records overall progress if it advances, capped below 100.
    fn progress(&mut self, overall: u8) {
        let overall = overall.min(MAX_RUNNING_PROGRESS);
        if overall > self.record.progress {
            self.update(RecordPatch::default().progress(overall));
        }
    }
}

/// Runs one leg to completion, folding its progress reports into the record.
///
/// The leg's callback only pushes into a channel; the reports are applied
/// here, so the record is never touched from inside the transport.
async fn drive_leg<'f, T>(
    attempt: &mut Attempt<'_>,
    band: ProgressBand,
    leg: impl FnOnce(ProgressCallback) -> LegFuture<'f, T>,
) -> Result<T, ClientError> {
    let (tx, mut rx) = mpsc::unbounded_channel::<u8>();
    let callback: ProgressCallback = Arc::new(move |percent| {
        let _ = tx.send(percent);
    });

    let mut fut = leg(callback);
    let result = loop {
        tokio::select! {
            biased;
            Some(percent) = rx.recv() => attempt.progress(band.map(percent)),
            result = &mut fut => break result,
        }
    };

    while let Ok(percent) = rx.try_recv() {
        attempt.progress(band.map(percent));
    }
    result
}

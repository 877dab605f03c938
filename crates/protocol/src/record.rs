//! Upload lifecycle record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of an upload.
///
/// `Queued → UploadingIntermediate (optional) → UploadingProvider → Completed`,
/// or `Failed` from any non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UploadStatus {
    Queued,
    UploadingIntermediate,
    UploadingProvider,
    Completed,
    Failed,
}

impl UploadStatus {
    /// Whether no further transitions can happen within this attempt.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::UploadingIntermediate => "uploading-intermediate",
            Self::UploadingProvider => "uploading-provider",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for UploadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Highest progress a record can show before it is completed.
pub const MAX_RUNNING_PROGRESS: u8 = 99;

/// One user-initiated upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRecord {
    pub id: String,
    pub file_name: String,
    pub file_size: u64,
    pub created_at: DateTime<Utc>,
    pub status: UploadStatus,
    pub progress: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intermediate_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UploadRecord {
    /// Creates a queued record with a fresh identifier.
    pub fn new(file_name: impl Into<String>, file_size: u64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            file_name: file_name.into(),
            file_size,
            created_at: Utc::now(),
            status: UploadStatus::Queued,
            progress: 0,
            status_message: None,
            intermediate_url: None,
            app_url: None,
            provider_id: None,
            error: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Applies a partial update, enforcing the record invariants.
    ///
    /// - a completed record accepts nothing; a failed one only a reset
    /// - `app_url` and `provider_id` are only accepted together with the
    ///   move to `Completed`, `error` only with the move to `Failed`
    /// - progress never decreases within an attempt, stays at or below
    ///   [`MAX_RUNNING_PROGRESS`] until completion, and is 100 once completed
    /// - `intermediate_url` is written at most once per attempt
    ///
    /// A rejected patch leaves the record untouched and returns `false`.
    pub fn apply(&mut self, patch: &RecordPatch) -> bool {
        // Success is permanent; a failed attempt can only be reset.
        if self.status == UploadStatus::Completed || (!patch.reset && self.is_terminal()) {
            return false;
        }
        let base = if patch.reset {
            UploadStatus::Queued
        } else {
            self.status
        };
        let status = patch.status.unwrap_or(base);
        if (patch.app_url.is_some() || patch.provider_id.is_some())
            && status != UploadStatus::Completed
        {
            return false;
        }
        if patch.error.is_some() && status != UploadStatus::Failed {
            return false;
        }

        if patch.reset {
            self.progress = 0;
            self.status_message = None;
            self.intermediate_url = None;
            self.app_url = None;
            self.provider_id = None;
            self.error = None;
        }
        self.status = status;

        if status == UploadStatus::Completed {
            self.progress = 100;
        } else if let Some(progress) = patch.progress {
            self.progress = self.progress.max(progress.min(MAX_RUNNING_PROGRESS));
        }
        if let Some(message) = &patch.status_message {
            self.status_message = Some(message.clone());
        }
        if let Some(url) = &patch.intermediate_url
            && self.intermediate_url.is_none()
        {
            self.intermediate_url = Some(url.clone());
        }
        if let Some(url) = &patch.app_url {
            self.app_url = Some(url.clone());
        }
        if let Some(id) = &patch.provider_id {
            self.provider_id = Some(id.clone());
        }
        if let Some(error) = &patch.error {
            self.error = Some(error.clone());
        }
        true
    }
}

/// A partial update to an [`UploadRecord`].
///
/// `None` fields are left untouched. `reset` clears the record back to
/// a fresh queued attempt before the other fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordPatch {
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub reset: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<UploadStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intermediate_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RecordPatch {
    /// A patch that starts a fresh attempt.
    ///
    /// Carries the resulting status and progress too, so observers that
    /// only look at the fields see the record go back to queued at 0.
    pub fn reset() -> Self {
        Self {
            reset: true,
            status: Some(UploadStatus::Queued),
            progress: Some(0),
            ..Self::default()
        }
    }

    pub fn status(mut self, status: UploadStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn progress(mut self, progress: u8) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.status_message = Some(message.into());
        self
    }

    pub fn intermediate_url(mut self, url: impl Into<String>) -> Self {
        self.intermediate_url = Some(url.into());
        self
    }

    pub fn app_url(mut self, url: impl Into<String>) -> Self {
        self.app_url = Some(url.into());
        self
    }

    pub fn provider_id(mut self, id: Option<String>) -> Self {
        self.provider_id = id;
        self
    }

    pub fn error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}

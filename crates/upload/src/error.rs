//! Upload error types.

use apkdrop_protocol::{ClientError, ErrorKind, format_size};

/// The leg of an upload that raised an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ObjectStorage,
    DeviceTesting,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ObjectStorage => f.write_str("object storage upload"),
            Self::DeviceTesting => f.write_str("device testing upload"),
        }
    }
}

/// File rejected by the [`FilePolicy`](crate::FilePolicy).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("file is empty")]
    Empty,

    #[error("unsupported file type: {name} (accepted: {accepted})")]
    UnsupportedType { name: String, accepted: String },

    #[error("file size {} exceeds the maximum of {}", format_size(*size), format_size(*max))]
    TooLarge { size: u64, max: u64 },
}

/// Errors produced by an upload attempt.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("upload {id} is already completed; start a new upload instead")]
    AlreadyCompleted { id: String },

    #[error("{stage} failed: {source}")]
    Leg {
        stage: Stage,
        #[source]
        source: ClientError,
    },
}

impl UploadError {
    /// Wraps a leaf client error with the stage that raised it.
    pub fn leg(stage: Stage, source: ClientError) -> Self {
        Self::Leg { stage, source }
    }

    /// The untranslated error kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) | Self::AlreadyCompleted { .. } => ErrorKind::Validation,
            Self::Leg { source, .. } => source.kind(),
        }
    }

    /// The failing leg, if a leg was involved.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::Validation(_) | Self::AlreadyCompleted { .. } => None,
            Self::Leg { stage, .. } => Some(*stage),
        }
    }
}

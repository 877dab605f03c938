//! Staging policy and progress rescaling.

use crate::validation::FilePolicy;

/// Default size above which packages are staged in object storage: 50 MiB.
pub const DEFAULT_STAGING_THRESHOLD: u64 = 50 * 1024 * 1024;

/// Default split point between the staging and provider legs.
pub const DEFAULT_SPLIT_POINT: u8 = 50;

/// When a package goes through object storage before the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StagingPolicy {
    /// Every package is staged first.
    Always,
    /// Only packages strictly larger than the threshold (bytes) are staged.
    AboveThreshold(u64),
    /// Packages always go straight to the provider.
    Never,
}

impl Default for StagingPolicy {
    fn default() -> Self {
        Self::AboveThreshold(DEFAULT_STAGING_THRESHOLD)
    }
}

impl StagingPolicy {
    /// Whether a package of `size` bytes needs the staging leg.
    pub fn requires_staging(self, size: u64) -> bool {
        match self {
            Self::Always => true,
            Self::AboveThreshold(threshold) => size > threshold,
            Self::Never => false,
        }
    }
}

/// A sub-range of the overall 0-100 scale owned by one leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressBand {
    base: u8,
    width: u8,
}

impl ProgressBand {
    /// The whole scale, used when there is a single leg.
    pub const FULL: Self = Self {
        base: 0,
        width: 100,
    };

    pub fn base(self) -> u8 {
        self.base
    }

    pub fn end(self) -> u8 {
        self.base + self.width
    }

    /// Maps a leg-local percentage onto the overall scale.
    ///
    /// `round(base + p * width / 100)`, computed in integers with
    /// halves rounding up. Non-decreasing in `p`, and `map(100)` is
    /// exactly `end()`.
    pub fn map(self, percent: u8) -> u8 {
        let p = u32::from(percent.min(100));
        let scaled = u32::from(self.base) * 100 + p * u32::from(self.width);
        ((scaled + 50) / 100) as u8
    }
}

/// The split point `X` between the two legs (`0 < X < 100`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSplit(u8);

impl Default for ProgressSplit {
    fn default() -> Self {
        Self(DEFAULT_SPLIT_POINT)
    }
}

impl ProgressSplit {
    /// Returns `None` unless `1 <= point <= 99`.
    pub fn new(point: u8) -> Option<Self> {
        (1..=99).contains(&point).then_some(Self(point))
    }

    pub fn point(self) -> u8 {
        self.0
    }

    /// Band of the staging leg: `0..X`.
    pub fn staging(self) -> ProgressBand {
        ProgressBand {
            base: 0,
            width: self.0,
        }
    }

    /// Band of the provider leg after staging: `X..100`.
    pub fn provider(self) -> ProgressBand {
        ProgressBand {
            base: self.0,
            width: 100 - self.0,
        }
    }
}

/// Everything the orchestrator needs to decide how to run an upload.
#[derive(Debug, Clone, Default)]
pub struct UploadPolicy {
    pub staging: StagingPolicy,
    pub split: ProgressSplit,
    pub files: FilePolicy,
}

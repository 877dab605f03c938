//! Fractional progress reporting for a single upload request.

use std::sync::Arc;
use std::sync::atomic::{AtomicU16, Ordering};

/// Callback invoked with an integer percentage in `0..=100`.
pub type ProgressCallback = Arc<dyn Fn(u8) + Send + Sync>;

/// Marker for "nothing reported yet".
const UNREPORTED: u16 = u16::MAX;

/// Returns `sent` as a whole percentage of `total`, rounded down.
///
/// An empty payload counts as fully sent.
pub fn percent_of(sent: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    let sent = sent.min(total) as u128;
    (sent * 100 / total as u128) as u8
}

/// Wraps a [`ProgressCallback`] so it only ever sees increasing values.
///
/// Repeated or smaller percentages are swallowed and values above 100
/// are clamped, so transport code can report freely without breaking
/// the monotonic contract. Clones share the same high-water mark.
#[derive(Clone)]
pub struct ProgressReporter {
    callback: ProgressCallback,
    last: Arc<AtomicU16>,
}

impl ProgressReporter {
    pub fn new(callback: ProgressCallback) -> Self {
        Self {
            callback,
            last: Arc::new(AtomicU16::new(UNREPORTED)),
        }
    }

    /// A reporter that discards every report.
    pub fn silent() -> Self {
        Self::new(Arc::new(|_| {}))
    }

    /// Reports a percentage; ignored unless it advances the last value.
    pub fn report(&self, percent: u8) {
        let percent = u16::from(percent.min(100));
        let advanced = self
            .last
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |prev| {
                (prev == UNREPORTED || percent > prev).then_some(percent)
            })
            .is_ok();
        if advanced {
            (self.callback)(percent as u8);
        }
    }

    /// Reports `sent` out of `total` bytes.
    pub fn report_bytes(&self, sent: u64, total: u64) {
        self.report(percent_of(sent, total));
    }

    /// The last percentage passed to the callback.
    pub fn last(&self) -> Option<u8> {
        match self.last.load(Ordering::Acquire) {
            UNREPORTED => None,
            v => Some(v as u8),
        }
    }
}

impl std::fmt::Debug for ProgressReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressReporter")
            .field("last", &self.last())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn recording() -> (ProgressReporter, Arc<Mutex<Vec<u8>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let reporter = ProgressReporter::new(Arc::new(move |p| sink.lock().unwrap().push(p)));
        (reporter, seen)
    }

    #[test]
    fn percent_of_rounds_down() {
        assert_eq!(percent_of(0, 200), 0);
        assert_eq!(percent_of(1, 3), 33);
        assert_eq!(percent_of(199, 200), 99);
        assert_eq!(percent_of(200, 200), 100);
    }

    #[test]
    fn percent_of_clamps_and_handles_empty() {
        assert_eq!(percent_of(500, 200), 100);
        assert_eq!(percent_of(0, 0), 100);
        assert_eq!(percent_of(u64::MAX - 1, u64::MAX), 99);
    }

    #[test]
    fn reporter_drops_regressions_and_duplicates() {
        let (reporter, seen) = recording();
        for p in [0, 10, 10, 5, 40, 39, 100, 100] {
            reporter.report(p);
        }
        assert_eq!(*seen.lock().unwrap(), vec![0, 10, 40, 100]);
        assert_eq!(reporter.last(), Some(100));
    }

    #[test]
    fn reporter_clamps_over_100() {
        let (reporter, seen) = recording();
        reporter.report(250);
        assert_eq!(*seen.lock().unwrap(), vec![100]);
    }

    #[test]
    fn clones_share_high_water_mark() {
        let (reporter, seen) = recording();
        let other = reporter.clone();
        reporter.report(60);
        other.report(30);
        other.report(70);
        assert_eq!(*seen.lock().unwrap(), vec![60, 70]);
    }

    #[test]
    fn report_bytes() {
        let (reporter, seen) = recording();
        reporter.report_bytes(0, 4);
        reporter.report_bytes(2, 4);
        reporter.report_bytes(4, 4);
        assert_eq!(*seen.lock().unwrap(), vec![0, 50, 100]);
    }

    #[test]
    fn silent_reporter_tracks_last() {
        let reporter = ProgressReporter::silent();
        assert_eq!(reporter.last(), None);
        reporter.report(12);
        assert_eq!(reporter.last(), Some(12));
    }
}

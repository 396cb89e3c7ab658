//! Per-upload transfer progress.
//!
//! A [`TransferTracker`] is created for each upload and handed to the backend as its
//! [`ProgressSink`]. It turns raw byte counts into percent, throughput and ETA and
//! logs them; it never influences the transfer itself.

use mediarelay_backend::ProgressSink;
use mediarelay_core::constants::BYTES_PER_MB;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

const MIN_ELAPSED: Duration = Duration::from_millis(1);

/// Derived figures for one progress report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressSnapshot {
    pub bytes_sent: u64,
    pub total_bytes: u64,
    /// Always within `[0, 100]`.
    pub percent: f64,
    pub speed_mb_per_sec: f64,
    /// Seconds remaining at the current average rate; zero until bytes move.
    pub eta_secs: f64,
    pub elapsed: Duration,
}

impl ProgressSnapshot {
    /// Compute a snapshot for `bytes_sent` of `total_bytes` after `elapsed`.
    pub fn compute(bytes_sent: u64, total_bytes: u64, elapsed: Duration) -> Self {
        let elapsed = elapsed.max(MIN_ELAPSED);
        let elapsed_secs = elapsed.as_secs_f64();

        let percent = if total_bytes == 0 {
            100.0
        } else {
            (bytes_sent as f64 / total_bytes as f64 * 100.0).clamp(0.0, 100.0)
        };

        let bytes_per_sec = bytes_sent as f64 / elapsed_secs;
        let eta_secs = if bytes_sent == 0 {
            0.0
        } else {
            total_bytes.saturating_sub(bytes_sent) as f64 / bytes_per_sec
        };

        Self {
            bytes_sent,
            total_bytes,
            percent,
            speed_mb_per_sec: bytes_per_sec / BYTES_PER_MB,
            eta_secs,
            elapsed,
        }
    }
}

/// Format seconds as `mm:ss`; minutes keep counting past an hour.
pub fn format_mm_ss(secs: f64) -> String {
    let total = if secs.is_finite() && secs > 0.0 {
        secs.round() as u64
    } else {
        0
    };
    format!("{:02}:{:02}", total / 60, total % 60)
}

#[derive(Debug, Default)]
struct TrackerState {
    started_at: Option<Instant>,
    bytes_sent: u64,
    last_logged_percent: Option<u64>,
    last: Option<ProgressSnapshot>,
}

/// Progress sink for a single transfer.
#[derive(Debug)]
pub struct TransferTracker {
    file_name: String,
    state: Mutex<TrackerState>,
}

impl TransferTracker {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            state: Mutex::new(TrackerState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, TrackerState> {
        // Progress is observational; a poisoned lock still holds usable counters.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Restart the clock and forget previous progress. Called right before the transfer.
    pub fn reset(&self) {
        let mut state = self.lock();
        *state = TrackerState {
            started_at: Some(Instant::now()),
            ..TrackerState::default()
        };
    }

    /// Most recent snapshot, if any progress was reported.
    pub fn snapshot(&self) -> Option<ProgressSnapshot> {
        self.lock().last
    }

    /// Fold a report into the tracker and return the resulting snapshot, plus whether
    /// it crossed into a new whole percent.
    fn record(&self, bytes_sent: u64, total_bytes: u64) -> (ProgressSnapshot, bool) {
        let mut state = self.lock();
        let started_at = *state.started_at.get_or_insert_with(Instant::now);

        // Reports can arrive out of order; never move backwards.
        state.bytes_sent = state.bytes_sent.max(bytes_sent);

        let snapshot = ProgressSnapshot::compute(state.bytes_sent, total_bytes, started_at.elapsed());
        state.last = Some(snapshot);

        let whole_percent = snapshot.percent.floor() as u64;
        let crossed = state.last_logged_percent != Some(whole_percent);
        if crossed {
            state.last_logged_percent = Some(whole_percent);
        }

        (snapshot, crossed)
    }
}

impl ProgressSink for TransferTracker {
    fn on_progress(&self, bytes_sent: u64, total_bytes: u64) {
        let (snapshot, crossed) = self.record(bytes_sent, total_bytes);
        if !crossed {
            return;
        }

        tracing::info!(
            file_name = %self.file_name,
            percent = format!("{:.1}", snapshot.percent),
            transferred_mb = format!("{:.2}", snapshot.bytes_sent as f64 / BYTES_PER_MB),
            total_mb = format!("{:.2}", snapshot.total_bytes as f64 / BYTES_PER_MB),
            speed_mb_per_sec = format!("{:.2}", snapshot.speed_mb_per_sec),
            eta = %format_mm_ss(snapshot.eta_secs),
            "Upload progress"
        );
    }
}

//! Time sources
//!
//! System clock, a settable clock for tests, and a peer-median adjusted
//! clock.

use crate::ports::TimeSource;
use parking_lot::Mutex;
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Most offset samples retained by [`MedianTimeSource`].
pub const MAX_MEDIAN_TIME_ENTRIES: usize = 200;

/// Largest peer offset (70 minutes) that is still applied to local time.
pub const MAX_ALLOWED_OFFSET_SECS: i64 = 70 * 60;

/// Samples required before any offset is applied.
const MIN_MEDIAN_SAMPLES: usize = 5;

/// System time source using the local clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn adjusted_time(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

/// Settable clock, for tests and deterministic replays
#[derive(Debug, Default)]
pub struct FixedTimeSource {
    now: AtomicU64,
}

impl FixedTimeSource {
    pub fn new(now: u64) -> Self {
        Self {
            now: AtomicU64::new(now),
        }
    }

    pub fn set(&self, now: u64) {
        self.now.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, secs: u64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }
}

impl TimeSource for FixedTimeSource {
    fn adjusted_time(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
struct MedianState {
    sources: HashSet<String>,
    /// Oldest first, paired with the source that reported it
    offsets: VecDeque<(String, i64)>,
    offset_secs: i64,
}

/// Local clock corrected by the median offset reported by peers.
///
/// Each source contributes once while its sample is retained; the oldest
/// sample and its source are forgotten past [`MAX_MEDIAN_TIME_ENTRIES`]. The offset is recomputed on every odd
/// sample count from five upwards and ignored when its magnitude exceeds
/// [`MAX_ALLOWED_OFFSET_SECS`].
pub struct MedianTimeSource {
    local: Arc<dyn TimeSource>,
    state: Mutex<MedianState>,
}

impl MedianTimeSource {
    pub fn new(local: Arc<dyn TimeSource>) -> Self {
        Self {
            local,
            state: Mutex::new(MedianState::default()),
        }
    }

    /// Record the time reported by `source_id`.
    pub fn add_time_sample(&self, source_id: &str, reported_time: u64) {
        let mut state = self.state.lock();
        if !state.sources.insert(source_id.to_string()) {
            return;
        }

        let local = self.local.adjusted_time();
        let offset = i64::try_from(reported_time)
            .unwrap_or(i64::MAX)
            .saturating_sub(i64::try_from(local).unwrap_or(i64::MAX));

        if state.offsets.len() == MAX_MEDIAN_TIME_ENTRIES {
            if let Some((oldest, _)) = state.offsets.pop_front() {
                state.sources.remove(&oldest);
            }
        }
        state.offsets.push_back((source_id.to_string(), offset));

        let count = state.offsets.len();
        debug!(source = source_id, offset, samples = count, "Added time sample");
        if count < MIN_MEDIAN_SAMPLES || count % 2 == 0 {
            return;
        }

        let mut sorted: Vec<i64> = state.offsets.iter().map(|(_, o)| *o).collect();
        sorted.sort_unstable();
        let median = sorted[count / 2];

        if median.abs() <= MAX_ALLOWED_OFFSET_SECS {
            state.offset_secs = median;
        } else {
            state.offset_secs = 0;
            warn!(
                median,
                "Peer clocks disagree with local time beyond the allowed offset; check the system clock"
            );
        }
    }

    /// Current correction applied to local time, in seconds.
    pub fn offset(&self) -> i64 {
        self.state.lock().offset_secs
    }

    /// Number of retained samples
    pub fn sample_count(&self) -> usize {
        self.state.lock().offsets.len()
    }

    /// Number of sources currently remembered
    pub fn source_count(&self) -> usize {
        self.state.lock().sources.len()
    }
}

impl Default for MedianTimeSource {
    fn default() -> Self {
        Self::new(Arc::new(SystemTimeSource))
    }
}

impl TimeSource for MedianTimeSource {
    fn adjusted_time(&self) -> u64 {
        let local = self.local.adjusted_time();
        let offset = self.offset();
        if offset >= 0 {
            local.saturating_add(offset.unsigned_abs())
        } else {
            local.saturating_sub(offset.unsigned_abs())
        }
    }
}

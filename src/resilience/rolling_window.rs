use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Aggregate counters over the retained buckets of a [`RollingWindow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindowCounts {
    pub attempts: u64,
    pub failures: u64,
}

impl WindowCounts {
    /// Failure percentage over the window, 0 when no attempts were made.
    pub fn error_percent(&self) -> u64 {
        if self.attempts == 0 {
            0
        } else {
            self.failures * 100 / self.attempts
        }
    }
}

#[derive(Debug)]
struct Bucket {
    index: u64,
    attempts: u64,
    failures: u64,
}

/// Fixed-duration bucketed counter of attempts and failures.
///
/// The window is a sequence of `bucket_count` buckets of `bucket_width` each
/// (ten 1-second buckets by default). Buckets older than the window are
/// evicted lazily on access, never retained; an idle command holds at most
/// `bucket_count` buckets of state.
#[derive(Debug)]
pub struct RollingWindow {
    bucket_width: Duration,
    bucket_count: u64,
    origin: Instant,
    buckets: VecDeque<Bucket>,
}

impl RollingWindow {
    pub const DEFAULT_BUCKET_WIDTH: Duration = Duration::from_secs(1);
    pub const DEFAULT_BUCKET_COUNT: u64 = 10;

    pub fn new(bucket_width: Duration, bucket_count: u64, origin: Instant) -> Self {
        Self {
            bucket_width: bucket_width.max(Duration::from_millis(1)),
            bucket_count: bucket_count.max(1),
            origin,
            buckets: VecDeque::with_capacity(bucket_count.max(1) as usize),
        }
    }

    /// Ten 1-second buckets, anchored at `origin`.
    pub fn with_defaults(origin: Instant) -> Self {
        Self::new(Self::DEFAULT_BUCKET_WIDTH, Self::DEFAULT_BUCKET_COUNT, origin)
    }

    fn bucket_index(&self, at: Instant) -> u64 {
        let elapsed = at.saturating_duration_since(self.origin);
        (elapsed.as_nanos() / self.bucket_width.as_nanos().max(1)) as u64
    }

    fn evict(&mut self, current: u64) {
        // Retain the current bucket and the (bucket_count - 1) before it.
        let oldest_kept = current.saturating_sub(self.bucket_count - 1);
        while let Some(front) = self.buckets.front() {
            if front.index < oldest_kept {
                self.buckets.pop_front();
            } else {
                break;
            }
        }
    }

    /// Record one completed attempt in the bucket covering `at`.
    pub fn record(&mut self, success: bool, at: Instant) {
        let mut index = self.bucket_index(at);
        self.evict(index);

        // Completions arrive roughly in time order, so the covering bucket is
        // almost always the newest one. A straggler older than the newest
        // bucket is folded into it to keep the deque ordered.
        if let Some(back) = self.buckets.back() {
            index = index.max(back.index);
        }
        let needs_new = self.buckets.back().map(|b| b.index != index).unwrap_or(true);
        if needs_new {
            self.buckets.push_back(Bucket {
                index,
                attempts: 0,
                failures: 0,
            });
        }
        if let Some(bucket) = self.buckets.back_mut() {
            bucket.attempts += 1;
            if !success {
                bucket.failures += 1;
            }
        }
    }

    /// Sum attempts and failures across all buckets still inside the window
    /// as of `at`.
    pub fn snapshot(&mut self, at: Instant) -> WindowCounts {
        let index = self.bucket_index(at);
        self.evict(index);

        let mut counts = WindowCounts::default();
        for bucket in &self.buckets {
            counts.attempts += bucket.attempts;
            counts.failures += bucket.failures;
        }
        counts
    }

    /// Drop all history. Called when a half-open probe succeeds so that
    /// post-recovery failures are counted from zero.
    pub fn reset(&mut self) {
        self.buckets.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[test]
    fn test_record_and_snapshot_within_window() {
        let t0 = Instant::now();
        let mut w = RollingWindow::with_defaults(t0);

        w.record(true, t0);
        w.record(false, t0 + secs(1));
        w.record(false, t0 + secs(2));

        let counts = w.snapshot(t0 + secs(3));
        assert_eq!(counts.attempts, 3);
        assert_eq!(counts.failures, 2);
        assert_eq!(counts.error_percent(), 66);
    }

    #[test]
    fn test_old_buckets_evicted() {
        let t0 = Instant::now();
        let mut w = RollingWindow::with_defaults(t0);

        w.record(false, t0);
        w.record(false, t0 + secs(1));

        // 11 seconds later both buckets have aged out of the 10s window.
        let counts = w.snapshot(t0 + secs(11));
        assert_eq!(counts, WindowCounts::default());
    }

    #[test]
    fn test_partial_eviction_keeps_recent_buckets() {
        let t0 = Instant::now();
        let mut w = RollingWindow::with_defaults(t0);

        w.record(false, t0); // bucket 0, evicted at t0+10s
        w.record(true, t0 + secs(5)); // bucket 5, still covered

        let counts = w.snapshot(t0 + secs(10));
        assert_eq!(counts.attempts, 1);
        assert_eq!(counts.failures, 0);
    }

    #[test]
    fn test_same_bucket_accumulates() {
        let t0 = Instant::now();
        let mut w = RollingWindow::with_defaults(t0);

        w.record(true, t0 + Duration::from_millis(100));
        w.record(false, t0 + Duration::from_millis(900));

        let counts = w.snapshot(t0 + Duration::from_millis(950));
        assert_eq!(counts.attempts, 2);
        assert_eq!(counts.failures, 1);
    }

    #[test]
    fn test_reset_clears_history() {
        let t0 = Instant::now();
        let mut w = RollingWindow::with_defaults(t0);

        w.record(false, t0);
        w.reset();

        assert_eq!(w.snapshot(t0), WindowCounts::default());
    }

    #[test]
    fn test_error_percent_zero_attempts() {
        assert_eq!(WindowCounts::default().error_percent(), 0);
    }

    #[test]
    fn test_record_before_origin_lands_in_first_bucket() {
        let t0 = Instant::now();
        let mut w = RollingWindow::with_defaults(t0);

        // An instant from before the window existed clamps to bucket zero
        // rather than panicking.
        let early = t0.checked_sub(secs(5)).unwrap_or(t0);
        w.record(false, early);
        let counts = w.snapshot(t0);
        assert_eq!(counts.attempts, 1);
    }
}

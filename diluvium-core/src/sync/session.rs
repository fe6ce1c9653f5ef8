//! Session transfer accounting.

use std::time::{Duration, Instant};

use super::state::GlobalStats;

/// Running transfer totals since this client session started.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SessionTotals {
    pub downloaded: f64,
    pub uploaded: f64,
}

/// Integrates poll-time rates into monotonic session totals.
///
/// Each tick credits `rate * elapsed`, with elapsed clamped to a maximum
/// so a suspended or backgrounded client cannot produce a large spurious
/// jump when polling resumes. The first tick only establishes the
/// baseline and contributes zero. Never persisted; reset only by
/// constructing a fresh accumulator.
#[derive(Debug)]
pub struct SessionAccumulator {
    elapsed_cap: Duration,
    last_tick: Option<Instant>,
    totals: SessionTotals,
}

impl SessionAccumulator {
    /// Creates an accumulator with the given per-tick elapsed clamp.
    pub fn new(elapsed_cap: Duration) -> Self {
        Self {
            elapsed_cap,
            last_tick: None,
            totals: SessionTotals::default(),
        }
    }

    /// Advances the totals with the latest global stats.
    ///
    /// `now` is passed explicitly so callers own the clock; production
    /// callers pass `Instant::now()`.
    pub fn advance(&mut self, stats: &GlobalStats, now: Instant) -> SessionTotals {
        if let Some(previous) = self.last_tick {
            let elapsed = now
                .saturating_duration_since(previous)
                .min(self.elapsed_cap)
                .as_secs_f64();
            self.totals.downloaded += stats.download_rate * elapsed;
            self.totals.uploaded += stats.upload_rate * elapsed;
        }
        self.last_tick = Some(now);
        self.totals
    }

    /// Returns the current running totals.
    pub fn totals(&self) -> SessionTotals {
        self.totals
    }
}

#[cfg(test)]
mod session_tests {
    use super::*;

    fn stats(download_rate: f64, upload_rate: f64) -> GlobalStats {
        GlobalStats {
            download_rate,
            upload_rate,
            ..GlobalStats::default()
        }
    }

    #[test]
    fn test_first_tick_contributes_zero() {
        let mut accumulator = SessionAccumulator::new(Duration::from_secs(10));
        let totals = accumulator.advance(&stats(1_000_000.0, 50_000.0), Instant::now());
        assert_eq!(totals.downloaded, 0.0);
        assert_eq!(totals.uploaded, 0.0);
    }

    #[test]
    fn test_totals_integrate_rate_times_elapsed() {
        let mut accumulator = SessionAccumulator::new(Duration::from_secs(10));
        let start = Instant::now();

        accumulator.advance(&stats(100.0, 10.0), start);
        let totals = accumulator.advance(&stats(100.0, 10.0), start + Duration::from_secs(3));
        assert_eq!(totals.downloaded, 300.0);
        assert_eq!(totals.uploaded, 30.0);

        let totals = accumulator.advance(&stats(200.0, 20.0), start + Duration::from_secs(5));
        assert_eq!(totals.downloaded, 300.0 + 400.0);
        assert_eq!(totals.uploaded, 30.0 + 40.0);
    }

    #[test]
    fn test_elapsed_clamped_after_long_gap() {
        let mut accumulator = SessionAccumulator::new(Duration::from_secs(10));
        let start = Instant::now();

        accumulator.advance(&stats(100.0, 0.0), start);
        // A 10 minute gap (suspended tab) still only credits 10 seconds.
        let totals = accumulator.advance(&stats(100.0, 0.0), start + Duration::from_secs(600));
        assert_eq!(totals.downloaded, 1000.0);
    }
}

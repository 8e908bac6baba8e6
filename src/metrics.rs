//! Request metrics
//!
//! Lock-free counters shared by every handler:
//! - total / successful / failed requests
//! - per-test success and failure counts
//! - cumulative compute time
//!
//! Exposed in Prometheus text format at `GET /metrics`.

use std::{
    fmt::Write as _,
    sync::{
        atomic::{AtomicU64, AtomicUsize, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};

use serde::Serialize;

use crate::dispatch::TestKind;

const KINDS: usize = TestKind::ALL.len();

fn slot(kind: TestKind) -> usize {
    kind as usize
}

fn counters() -> Arc<[AtomicUsize; KINDS]> {
    Arc::new(std::array::from_fn(|_| AtomicUsize::new(0)))
}

/// Central metrics collector
///
/// Cloning is cheap; clones share the same counters.
#[derive(Debug, Clone)]
pub struct MetricsCollector {
    total_requests: Arc<AtomicUsize>,
    successful_requests: Arc<AtomicUsize>,
    failed_requests: Arc<AtomicUsize>,
    per_test_success: Arc<[AtomicUsize; KINDS]>,
    per_test_failure: Arc<[AtomicUsize; KINDS]>,
    /// Cumulative compute time of successful requests, microseconds
    total_compute_time_us: Arc<AtomicU64>,
    start_time: Instant,
}

impl MetricsCollector {
    /// Create a new metrics collector
    #[must_use]
    pub fn new() -> Self {
        Self {
            total_requests: Arc::new(AtomicUsize::new(0)),
            successful_requests: Arc::new(AtomicUsize::new(0)),
            failed_requests: Arc::new(AtomicUsize::new(0)),
            per_test_success: counters(),
            per_test_failure: counters(),
            total_compute_time_us: Arc::new(AtomicU64::new(0)),
            start_time: Instant::now(),
        }
    }

    /// Record a test that produced a result
    #[allow(clippy::cast_possible_truncation)]
    pub fn record_success(&self, kind: TestKind, duration: Duration) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.successful_requests.fetch_add(1, Ordering::Relaxed);
        self.per_test_success[slot(kind)].fetch_add(1, Ordering::Relaxed);
        self.total_compute_time_us
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
    }

    /// Record a test that returned an error
    pub fn record_failure(&self, kind: TestKind) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.failed_requests.fetch_add(1, Ordering::Relaxed);
        self.per_test_failure[slot(kind)].fetch_add(1, Ordering::Relaxed);
    }

    /// Current values
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn snapshot(&self) -> MetricsSnapshot {
        let total_requests = self.total_requests.load(Ordering::Relaxed);
        let successful = self.successful_requests.load(Ordering::Relaxed);
        let failed = self.failed_requests.load(Ordering::Relaxed);
        let total_time_us = self.total_compute_time_us.load(Ordering::Relaxed);

        let per_test = TestKind::ALL
            .iter()
            .map(|&kind| TestCounts {
                test: kind,
                successful: self.per_test_success[slot(kind)].load(Ordering::Relaxed),
                failed: self.per_test_failure[slot(kind)].load(Ordering::Relaxed),
            })
            .collect();

        MetricsSnapshot {
            total_requests,
            successful_requests: successful,
            failed_requests: failed,
            per_test,
            total_compute_time_us: total_time_us,
            uptime_secs: self.start_time.elapsed().as_secs(),
            avg_compute_ms: if successful > 0 {
                (total_time_us as f64 / 1000.0) / successful as f64
            } else {
                0.0
            },
            error_rate: if total_requests > 0 {
                failed as f64 / total_requests as f64
            } else {
                0.0
            },
        }
    }

    /// Export in Prometheus text format
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn to_prometheus(&self) -> String {
        let snapshot = self.snapshot();
        let mut out = format!(
            "# HELP statserve_requests_total Total number of test requests\n\
             # TYPE statserve_requests_total counter\n\
             statserve_requests_total {}\n\
             # HELP statserve_requests_successful Requests that produced a result\n\
             # TYPE statserve_requests_successful counter\n\
             statserve_requests_successful {}\n\
             # HELP statserve_requests_failed Requests rejected with an error\n\
             # TYPE statserve_requests_failed counter\n\
             statserve_requests_failed {}\n\
             # HELP statserve_compute_time_seconds Total compute time\n\
             # TYPE statserve_compute_time_seconds counter\n\
             statserve_compute_time_seconds {:.6}\n\
             # HELP statserve_avg_compute_ms Average compute time in milliseconds\n\
             # TYPE statserve_avg_compute_ms gauge\n\
             statserve_avg_compute_ms {:.3}\n\
             # HELP statserve_error_rate Error rate (0.0-1.0)\n\
             # TYPE statserve_error_rate gauge\n\
             statserve_error_rate {:.4}\n\
             # HELP statserve_uptime_seconds Uptime in seconds\n\
             # TYPE statserve_uptime_seconds counter\n\
             statserve_uptime_seconds {}\n\
             # HELP statserve_test_requests_total Requests per test and outcome\n\
             # TYPE statserve_test_requests_total counter\n",
            snapshot.total_requests,
            snapshot.successful_requests,
            snapshot.failed_requests,
            snapshot.total_compute_time_us as f64 / 1_000_000.0,
            snapshot.avg_compute_ms,
            snapshot.error_rate,
            snapshot.uptime_secs,
        );

        for counts in &snapshot.per_test {
            let _ = writeln!(
                out,
                "statserve_test_requests_total{{test=\"{}\",outcome=\"success\"}} {}",
                counts.test, counts.successful
            );
            let _ = writeln!(
                out,
                "statserve_test_requests_total{{test=\"{}\",outcome=\"error\"}} {}",
                counts.test, counts.failed
            );
        }
        out
    }

    /// Reset all counters (useful for testing)
    pub fn reset(&self) {
        self.total_requests.store(0, Ordering::Relaxed);
        self.successful_requests.store(0, Ordering::Relaxed);
        self.failed_requests.store(0, Ordering::Relaxed);
        self.total_compute_time_us.store(0, Ordering::Relaxed);
        for counter in self.per_test_success.iter().chain(self.per_test_failure.iter()) {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome counts for one test
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestCounts {
    /// Test identifier
    pub test: TestKind,
    /// Requests that produced a result
    pub successful: usize,
    /// Requests rejected with an error
    pub failed: usize,
}

/// Snapshot of current metrics
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    /// Total number of requests processed
    pub total_requests: usize,
    /// Number of successful requests
    pub successful_requests: usize,
    /// Number of failed requests
    pub failed_requests: usize,
    /// Per-test counts, in [`TestKind::ALL`] order
    pub per_test: Vec<TestCounts>,
    /// Total compute time in microseconds
    pub total_compute_time_us: u64,
    /// Uptime in seconds
    pub uptime_secs: u64,
    /// Average compute time of successful requests in milliseconds
    pub avg_compute_ms: f64,
    /// Error rate as a fraction (0.0 to 1.0)
    pub error_rate: f64,
}

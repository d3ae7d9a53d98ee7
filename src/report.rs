use std::fmt;
use std::time::Duration;

use hdrhistogram::Histogram;

/// Sum of `0..n`, modulo 2^64 like the consumer's running checksum.
pub fn expected_checksum(n: u64) -> u64 {
    (u128::from(n) * u128::from(n.saturating_sub(1)) / 2) as u64
}

/// Outcome of one producer/consumer throughput run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThroughputReport {
    /// Items pushed, and popped.
    pub operations: u64,
    pub duration: Duration,
    pub checksum: u64,
    pub expected: u64,
}

impl ThroughputReport {
    pub fn new(operations: u64, duration: Duration, checksum: u64) -> Self {
        Self {
            operations,
            duration,
            checksum,
            expected: expected_checksum(operations),
        }
    }

    /// Every item is one push and one pop.
    pub fn total_ops(&self) -> u64 {
        self.operations * 2
    }

    pub fn ops_per_sec(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs == 0.0 {
            return 0.0;
        }
        self.total_ops() as f64 / secs
    }

    pub fn avg_latency_ns(&self) -> f64 {
        if self.operations == 0 {
            return 0.0;
        }
        self.duration.as_nanos() as f64 / self.total_ops() as f64
    }

    pub fn is_valid(&self) -> bool {
        self.checksum == self.expected
    }
}

impl fmt::Display for ThroughputReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Time: {} ms", self.duration.as_millis())?;
        writeln!(f, "Throughput: {} ops/sec", self.ops_per_sec() as u64)?;
        writeln!(f, "Avg latency: {:.2} ns/op", self.avg_latency_ns())?;
        write!(
            f,
            "Validation: {} (checksum: {}, expected: {})",
            if self.is_valid() { "PASS" } else { "FAIL" },
            self.checksum,
            self.expected
        )
    }
}

/// Push-to-pop latency percentiles, in nanoseconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatencyReport {
    pub samples: u64,
    pub mean: f64,
    pub p50: u64,
    pub p99: u64,
    pub p999: u64,
    pub max: u64,
}

impl LatencyReport {
    pub fn from_histogram(hist: &Histogram<u64>) -> Self {
        Self {
            samples: hist.len(),
            mean: hist.mean(),
            p50: hist.value_at_quantile(0.50),
            p99: hist.value_at_quantile(0.99),
            p999: hist.value_at_quantile(0.999),
            max: hist.max(),
        }
    }
}

impl fmt::Display for LatencyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Samples: {}", self.samples)?;
        writeln!(f, "Mean: {:.2} ns", self.mean)?;
        writeln!(f, "p50: {} ns", self.p50)?;
        writeln!(f, "p99: {} ns", self.p99)?;
        writeln!(f, "p99.9: {} ns", self.p999)?;
        write!(f, "max: {} ns", self.max)
    }
}

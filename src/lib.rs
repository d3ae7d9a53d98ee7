//! Benchmark harness for the naive ring buffer: one producer thread, one
//! consumer thread, a sequential integer workload validated by checksum.

pub mod report;
pub mod workload;

pub use report::{expected_checksum, LatencyReport, ThroughputReport};
pub use workload::{run_latency, run_throughput, Workload};

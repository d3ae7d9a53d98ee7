use std::io;
use std::thread::{self, Scope, ScopedJoinHandle};
use std::time::Instant;

use anyhow::{anyhow, Context};
use config::Config;
use core_affinity::CoreId;
use hdrhistogram::Histogram;
use ring_buffer::BoundedBlockingQueue;
use tracing::{debug, info, warn};

use crate::report::{LatencyReport, ThroughputReport};

/// Highest latency the histogram tracks, 10 s in nanoseconds.
const MAX_TRACKED_LATENCY_NS: u64 = 10_000_000_000;

/// One producer pushes `0..operations`, one consumer pops as many.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Workload {
    pub capacity: usize,
    pub operations: u64,
    pub pin_threads: bool,
}

impl From<&Config> for Workload {
    fn from(config: &Config) -> Self {
        Self {
            capacity: config.capacity,
            operations: config.operations,
            pin_threads: config.pin_threads,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Placement {
    producer: Option<CoreId>,
    consumer: Option<CoreId>,
}

impl Placement {
    fn for_workload(workload: &Workload) -> Self {
        if !workload.pin_threads {
            return Self::default();
        }

        match core_affinity::get_core_ids().as_deref() {
            Some([producer, consumer, ..]) => Self {
                producer: Some(*producer),
                consumer: Some(*consumer),
            },
            _ => {
                warn!("fewer than two cores available, running unpinned");
                Self::default()
            }
        }
    }
}

fn pin_current(core: Option<CoreId>) {
    if let Some(core) = core {
        if !core_affinity::set_for_current(core) {
            warn!(core = core.id, "failed to pin thread");
        }
    }
}

/// Starts the named producer and consumer threads of a run.
trait Spawner {
    fn spawn<'scope, 'env, F, T>(
        &self,
        scope: &'scope Scope<'scope, 'env>,
        name: &str,
        f: F,
    ) -> io::Result<ScopedJoinHandle<'scope, T>>
    where
        F: FnOnce() -> T + Send + 'scope,
        T: Send + 'scope;
}

struct NamedThreads;

impl Spawner for NamedThreads {
    fn spawn<'scope, 'env, F, T>(
        &self,
        scope: &'scope Scope<'scope, 'env>,
        name: &str,
        f: F,
    ) -> io::Result<ScopedJoinHandle<'scope, T>>
    where
        F: FnOnce() -> T + Send + 'scope,
        T: Send + 'scope,
    {
        thread::Builder::new().name(name.to_owned()).spawn_scoped(scope, f)
    }
}

/// Closes the queue when dropped, so the consumer is released even if the
/// producer unwinds.
struct CloseOnDrop<'a, T>(&'a BoundedBlockingQueue<T>);

impl<T> Drop for CloseOnDrop<'_, T> {
    fn drop(&mut self) {
        self.0.close();
    }
}

/// Runs the checksum workload with the blocking `push`/`pop` pair and times it.
pub fn run_throughput(workload: &Workload) -> anyhow::Result<ThroughputReport> {
    run_throughput_with(workload, &NamedThreads)
}

fn run_throughput_with<S: Spawner>(
    workload: &Workload,
    spawner: &S,
) -> anyhow::Result<ThroughputReport> {
    let queue = BoundedBlockingQueue::<u64>::new(workload.capacity)
        .context("cannot create the ring buffer")?;
    let placement = Placement::for_workload(workload);
    let operations = workload.operations;

    info!(capacity = workload.capacity, operations, "starting throughput run");

    let start = Instant::now();

    let checksum = thread::scope(|s| -> anyhow::Result<u64> {
        let queue = &queue;

        // `send` is `push` that stops once the queue is closed
        let producer = spawner
            .spawn(s, "producer", move || {
                pin_current(placement.producer);
                for i in 0..operations {
                    if queue.send(i).is_err() {
                        break;
                    }
                }
            })
            .context("cannot spawn the producer thread")?;

        let consumer = spawner.spawn(s, "consumer", move || {
            pin_current(placement.consumer);
            let mut checksum = 0u64;
            for _ in 0..operations {
                checksum = checksum.wrapping_add(queue.pop());
            }
            checksum
        });

        let consumer = match consumer {
            Ok(consumer) => consumer,
            Err(err) => {
                // release the producer, it may be waiting on a full queue
                queue.close();
                return Err(err).context("cannot spawn the consumer thread");
            }
        };

        producer.join().map_err(|_| anyhow!("producer thread panicked"))?;
        consumer.join().map_err(|_| anyhow!("consumer thread panicked"))
    })?;

    let report = ThroughputReport::new(operations, start.elapsed(), checksum);
    debug!(?report, "throughput run finished");
    Ok(report)
}

/// Measures how long each item waits between `send` and `recv`.
///
/// The producer closes the queue once done; the consumer drains until
/// `recv` reports the queue closed and empty.
pub fn run_latency(workload: &Workload) -> anyhow::Result<LatencyReport> {
    run_latency_with(workload, &NamedThreads)
}

fn run_latency_with<S: Spawner>(
    workload: &Workload,
    spawner: &S,
) -> anyhow::Result<LatencyReport> {
    let queue = BoundedBlockingQueue::<Instant>::new(workload.capacity)
        .context("cannot create the ring buffer")?;
    let placement = Placement::for_workload(workload);
    let operations = workload.operations;
    let mut histogram = Histogram::<u64>::new_with_bounds(1, MAX_TRACKED_LATENCY_NS, 3)
        .context("cannot create the latency histogram")?;

    info!(capacity = workload.capacity, operations, "starting latency run");

    let histogram = thread::scope(|s| -> anyhow::Result<Histogram<u64>> {
        let queue = &queue;

        let producer = spawner
            .spawn(s, "producer", move || {
                let _close = CloseOnDrop(queue);
                pin_current(placement.producer);
                for _ in 0..operations {
                    if queue.send(Instant::now()).is_err() {
                        break;
                    }
                }
            })
            .context("cannot spawn the producer thread")?;

        let consumer = spawner.spawn(s, "consumer", move || {
            pin_current(placement.consumer);
            while let Ok(sent_at) = queue.recv() {
                let waited = u64::try_from(sent_at.elapsed().as_nanos()).unwrap_or(u64::MAX);
                histogram.saturating_record(waited.max(1));
            }
            histogram
        });

        let consumer = match consumer {
            Ok(consumer) => consumer,
            Err(err) => {
                // release the producer, it may be waiting on a full queue
                queue.close();
                return Err(err).context("cannot spawn the consumer thread");
            }
        };

        producer.join().map_err(|_| anyhow!("producer thread panicked"))?;
        consumer.join().map_err(|_| anyhow!("consumer thread panicked"))
    })?;

    let report = LatencyReport::from_histogram(&histogram);
    debug!(?report, "latency run finished");
    Ok(report)
}

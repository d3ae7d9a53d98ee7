use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use std::hint::black_box;
use std::sync::mpsc::sync_channel;
use std::thread;
use std::time::Instant;
use hdrhistogram::Histogram;

use ring_buffer::BoundedBlockingQueue;
use crossbeam::queue::ArrayQueue;

const N: usize = 1024;
const ITERATIONS: usize = 1_000_000;
const MESSAGES: u64 = 100_000;

fn pinned_cores() -> Option<(core_affinity::CoreId, core_affinity::CoreId)> {
    let cores = core_affinity::get_core_ids()?;
    match cores.as_slice() {
        [producer, consumer, ..] => Some((*producer, *consumer)),
        _ => None,
    }
}

fn pin(core: Option<core_affinity::CoreId>) {
    if let Some(core) = core {
        core_affinity::set_for_current(core);
    }
}

/// Hand-over latency of the blocking queue
fn latency_blocking_queue() -> (u64, u64) {
    let queue = BoundedBlockingQueue::<Instant>::new(N).unwrap();
    let cores = pinned_cores();

    let hist = thread::scope(|s| {
        let mut hist = Histogram::<u64>::new_with_bounds(1, 10_000_000, 3).unwrap();

        s.spawn(|| {
            pin(cores.map(|(p, _)| p));
            for _ in 0..ITERATIONS {
                queue.push(Instant::now());
            }
        });

        let cons_handle = s.spawn(|| {
            pin(cores.map(|(_, c)| c));
            for _ in 0..ITERATIONS {
                let ts = queue.pop();
                hist.saturating_record(ts.elapsed().as_nanos() as u64);
            }
            hist
        });

        cons_handle.join().unwrap()
    });

    (hist.value_at_percentile(50.0), hist.value_at_percentile(99.0))
}

/// Hand-over latency of Crossbeam ArrayQueue, spinning on full/empty
fn latency_crossbeam() -> (u64, u64) {
    let queue = ArrayQueue::<Instant>::new(N);
    let cores = pinned_cores();

    let hist = thread::scope(|s| {
        let mut hist = Histogram::<u64>::new_with_bounds(1, 10_000_000, 3).unwrap();

        s.spawn(|| {
            pin(cores.map(|(p, _)| p));
            for _ in 0..ITERATIONS {
                let ts = Instant::now();
                while queue.push(ts).is_err() {
                    std::hint::spin_loop();
                }
            }
        });

        let cons_handle = s.spawn(|| {
            pin(cores.map(|(_, c)| c));
            for _ in 0..ITERATIONS {
                loop {
                    if let Some(ts) = queue.pop() {
                        hist.saturating_record(ts.elapsed().as_nanos() as u64);
                        break;
                    }
                    std::hint::spin_loop();
                }
            }
            hist
        });

        cons_handle.join().unwrap()
    });

    (hist.value_at_percentile(50.0), hist.value_at_percentile(99.0))
}

fn latency_comparison(_c: &mut Criterion) {
    let (p50_ring, p99_ring) = latency_blocking_queue();
    let (p50_cb, p99_cb) = latency_crossbeam();

    println!("\n╔══════════════════════════════════════════════╗");
    println!("║      Ring Buffer Latency Comparison          ║");
    println!("╠══════════════════════════════════════════════╣");
    println!("║ Metric  │ Blocking   │ Crossbeam │ Ratio    ║");
    println!("╠═════════╪════════════╪═══════════╪══════════╣");
    println!("║ p50 (ns)│ {:>10} │ {:>9} │ {:.2}x     ║",
             p50_ring, p50_cb, p50_ring as f64 / p50_cb.max(1) as f64);
    println!("║ p99 (ns)│ {:>10} │ {:>9} │ {:.2}x     ║",
             p99_ring, p99_cb, p99_ring as f64 / p99_cb.max(1) as f64);
    println!("╚═════════╧════════════╧═══════════╧══════════╝\n");
}

fn throughput_1p_1c(c: &mut Criterion) {
    let mut group = c.benchmark_group("1p_1c");
    group.throughput(Throughput::Elements(MESSAGES));

    group.bench_function("bounded_blocking_queue", |b| {
        b.iter(|| {
            let queue = BoundedBlockingQueue::<u64>::new(N).unwrap();
            thread::scope(|s| {
                s.spawn(|| {
                    for i in 0..MESSAGES {
                        queue.push(black_box(i));
                    }
                });
                s.spawn(|| {
                    for _ in 0..MESSAGES {
                        black_box(queue.pop());
                    }
                });
            });
        });
    });

    group.bench_function("crossbeam_array_queue", |b| {
        b.iter(|| {
            let queue = ArrayQueue::<u64>::new(N);
            thread::scope(|s| {
                s.spawn(|| {
                    for i in 0..MESSAGES {
                        while queue.push(black_box(i)).is_err() {
                            std::hint::spin_loop();
                        }
                    }
                });
                s.spawn(|| {
                    for _ in 0..MESSAGES {
                        while queue.pop().is_none() {
                            std::hint::spin_loop();
                        }
                    }
                });
            });
        });
    });

    group.bench_function("crossbeam_channel", |b| {
        b.iter(|| {
            let (tx, rx) = crossbeam_channel::bounded::<u64>(N);
            thread::scope(|s| {
                s.spawn(move || {
                    for i in 0..MESSAGES {
                        tx.send(black_box(i)).unwrap();
                    }
                });
                s.spawn(move || {
                    for _ in 0..MESSAGES {
                        black_box(rx.recv().unwrap());
                    }
                });
            });
        });
    });

    group.bench_function("std_sync_channel", |b| {
        b.iter(|| {
            let (tx, rx) = sync_channel::<u64>(N);
            thread::scope(|s| {
                s.spawn(move || {
                    for i in 0..MESSAGES {
                        tx.send(black_box(i)).unwrap();
                    }
                });
                s.spawn(move || {
                    for _ in 0..MESSAGES {
                        black_box(rx.recv().unwrap());
                    }
                });
            });
        });
    });

    group.finish();
}

criterion_group!(benches, latency_comparison, throughput_1p_1c);
criterion_main!(benches);

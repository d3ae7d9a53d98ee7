use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use config::{Cli, Config};
use torus::{run_latency, run_throughput, Workload};
use tracing::{error, info};

fn run(cli: &Cli) -> anyhow::Result<bool> {
    let config = Config::build_config(cli).context("invalid benchmark configuration")?;
    info!(?config, "benchmark configuration");

    let workload = Workload::from(&config);

    println!("Torus Ring Buffer Benchmarks");
    println!("============================\n");

    println!("Naive Ring Buffer (mutex-based)");
    println!("Capacity: {}", workload.capacity);
    println!("Operations: {}", workload.operations);

    let report = run_throughput(&workload)?;
    println!("{report}\n");
    info!(
        duration_ms = report.duration.as_millis() as u64,
        ops_per_sec = report.ops_per_sec(),
        valid = report.is_valid(),
        "throughput run complete"
    );

    if config.latency {
        println!("Naive Ring Buffer (mutex-based) hand-over latency");
        let latency = run_latency(&workload)?;
        println!("{latency}\n");
        info!(p50 = latency.p50, p99 = latency.p99, max = latency.max, "latency run complete");
    }

    Ok(report.is_valid())
}

fn main() -> ExitCode {
    logging::init_tracing("torus");

    let cli = Cli::parse();

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => {
            error!("checksum validation failed");
            ExitCode::FAILURE
        }
        Err(err) => {
            error!("{err:#}");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

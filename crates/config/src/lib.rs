use std::error::Error;
use std::fmt;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use clap::Parser;
use serde::Deserialize;

pub const DEFAULT_CAPACITY: usize = 1_000_000;
pub const DEFAULT_OPERATIONS: u64 = 10_000_000;

#[derive(Parser, Debug, Default)]
#[command(name = "torus", version, about = "Benchmark the mutex-based ring buffer", long_about = None)]
pub struct Cli {
    /// Sets a custom config file
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Number of slots in the ring buffer
    #[arg(long, value_name = "SLOTS")]
    pub capacity: Option<usize>,

    /// Number of items handed from the producer to the consumer
    #[arg(short = 'n', long, value_name = "COUNT")]
    pub operations: Option<u64>,

    /// Pin the producer and the consumer to the first two cores
    #[arg(long)]
    pub pin: bool,

    /// Also measure per-item hand-over latency
    #[arg(long)]
    pub latency: bool,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
/// Benchmark configuration
pub struct Config {
    /// Number of slots in the ring buffer
    pub capacity: usize,
    /// Number of items pushed and popped
    pub operations: u64,
    /// Whether producer and consumer are pinned to dedicated cores
    pub pin_threads: bool,
    /// Whether the latency run follows the throughput run
    pub latency: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            operations: DEFAULT_OPERATIONS,
            pin_threads: false,
            latency: false,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    /// The config file could not be opened.
    Io { path: PathBuf, source: io::Error },
    /// The config file is not valid JSON for [`Config`].
    Parse { path: PathBuf, source: serde_json::Error },
    /// A ring buffer needs at least one slot.
    ZeroCapacity,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, .. } => write!(f, "cannot read config file {}", path.display()),
            ConfigError::Parse { path, .. } => write!(f, "cannot parse config file {}", path.display()),
            ConfigError::ZeroCapacity => write!(f, "capacity must be greater than zero"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
            ConfigError::ZeroCapacity => None,
        }
    }
}

/// Reads the configuration from a JSON file
/// # Arguments
/// * `path` - A path to the configuration file
/// # Returns
/// A Result containing the Config instance or an error
pub fn read_config_from_file<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
    let reader = BufReader::new(file);

    serde_json::from_reader(reader).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
}

impl Config {
    /// Build configuration from command line arguments
    /// # Arguments
    /// * `cli` - The parsed command line arguments
    /// # Returns
    /// The file configuration (or the defaults) with command line overrides applied
    pub fn build_config(cli: &Cli) -> Result<Config, ConfigError> {
        let mut config = match &cli.config {
            Some(path) => read_config_from_file(path)?,
            None => Config::default(),
        };

        if let Some(capacity) = cli.capacity {
            config.capacity = capacity;
        }
        if let Some(operations) = cli.operations {
            config.operations = operations;
        }
        config.pin_threads |= cli.pin;
        config.latency |= cli.latency;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        Ok(())
    }
}

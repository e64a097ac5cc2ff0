//! Configuration module for pong-bench.
//!
//! Supports both command-line arguments and TOML configuration file.
//! CLI arguments take precedence over config file values.

use clap::{Parser, ValueEnum};
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

use crate::benchmark::HandlerOptions;
use crate::message::{CommandName, LoadFactor};
use crate::throughput::DEFAULT_BATCH_SIZE;

/// Command-line arguments for the benchmark
#[derive(Parser, Debug)]
#[command(name = "pong-bench")]
#[command(author = "pong-bench authors")]
#[command(version = "0.1.0")]
#[command(about = "Ping/pong command handler benchmark", long_about = None)]
pub struct CliArgs {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Command name the responder registers for
    #[arg(long)]
    pub command_name: Option<String>,

    /// Concurrent commands the responder accepts (load factor)
    #[arg(long)]
    pub load_factor: Option<u32>,

    /// Commands per throughput batch
    #[arg(long)]
    pub batch_size: Option<u32>,

    /// Benchmark to run; repeat to run several in order
    #[arg(short = 'b', long = "benchmark", value_enum)]
    pub benchmarks: Vec<BenchmarkMode>,

    /// Number of pings to send per benchmark
    #[arg(short = 'n', long)]
    pub command_count: Option<u64>,

    /// Maximum pings in flight for the parallel benchmark
    #[arg(short = 'p', long)]
    pub max_parallelism: Option<u32>,

    /// Number of worker threads (defaults to number of CPU cores)
    #[arg(short = 'w', long)]
    pub workers: Option<usize>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,
}

/// Which ping/pong benchmark to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BenchmarkMode {
    /// One ping in flight at a time
    Sequential,
    /// Waves of concurrent pings
    Parallel,
}

/// TOML configuration file structure
#[derive(Debug, Deserialize, Default)]
pub struct TomlConfig {
    #[serde(default)]
    pub handler: HandlerConfig,
    #[serde(default)]
    pub benchmark: BenchmarkConfig,
    #[serde(default)]
    pub runtime: RuntimeConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Responder registration settings
#[derive(Debug, Deserialize)]
pub struct HandlerConfig {
    #[serde(default = "default_command_name")]
    pub command_name: String,
    #[serde(default = "default_load_factor")]
    pub load_factor: u32,
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            command_name: default_command_name(),
            load_factor: default_load_factor(),
            batch_size: default_batch_size(),
        }
    }
}

/// Benchmark workload settings
#[derive(Debug, Deserialize)]
pub struct BenchmarkConfig {
    #[serde(default = "default_benchmarks")]
    pub benchmarks: Vec<BenchmarkMode>,
    #[serde(default = "default_command_count")]
    pub command_count: u64,
    #[serde(default = "default_max_parallelism")]
    pub max_parallelism: u32,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            benchmarks: default_benchmarks(),
            command_count: default_command_count(),
            max_parallelism: default_max_parallelism(),
        }
    }
}

/// Async runtime settings
#[derive(Debug, Deserialize, Default)]
pub struct RuntimeConfig {
    /// Number of worker threads
    pub workers: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_command_name() -> String {
    "ping".to_string()
}

fn default_load_factor() -> u32 {
    100
}

fn default_batch_size() -> u32 {
    DEFAULT_BATCH_SIZE
}

fn default_benchmarks() -> Vec<BenchmarkMode> {
    vec![BenchmarkMode::Sequential]
}

fn default_command_count() -> u64 {
    5000
}

fn default_max_parallelism() -> u32 {
    50
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Final resolved configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub command_name: String,
    pub load_factor: u32,
    pub batch_size: u32,
    pub benchmarks: Vec<BenchmarkMode>,
    pub command_count: u64,
    pub max_parallelism: u32,
    pub workers: Option<usize>,
    pub log_level: String,
}

impl Config {
    /// Load configuration from CLI args and optional TOML file.
    /// CLI arguments take precedence over TOML file values.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_args(CliArgs::parse())
    }

    /// Resolve already-parsed CLI args against the TOML file they name.
    pub fn from_args(cli: CliArgs) -> Result<Self, ConfigError> {
        // Load TOML config if specified
        let toml_config = if let Some(ref config_path) = cli.config {
            let contents =
                std::fs::read_to_string(config_path).map_err(|source| ConfigError::FileRead {
                    path: config_path.clone(),
                    source,
                })?;
            toml::from_str(&contents).map_err(|source| ConfigError::TomlParse {
                path: config_path.clone(),
                source,
            })?
        } else {
            TomlConfig::default()
        };

        Self::merge(cli, toml_config).validate()
    }

    fn merge(cli: CliArgs, toml_config: TomlConfig) -> Self {
        Config {
            command_name: cli
                .command_name
                .unwrap_or(toml_config.handler.command_name),
            load_factor: cli.load_factor.unwrap_or(toml_config.handler.load_factor),
            batch_size: cli.batch_size.unwrap_or(toml_config.handler.batch_size),
            benchmarks: if cli.benchmarks.is_empty() {
                toml_config.benchmark.benchmarks
            } else {
                cli.benchmarks
            },
            command_count: cli
                .command_count
                .unwrap_or(toml_config.benchmark.command_count),
            max_parallelism: cli
                .max_parallelism
                .unwrap_or(toml_config.benchmark.max_parallelism),
            workers: cli.workers.or(toml_config.runtime.workers),
            log_level: cli.log_level.unwrap_or(toml_config.logging.level),
        }
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.command_name.is_empty() {
            return Err(ConfigError::Invalid("command name must not be empty".into()));
        }
        if self.load_factor == 0 {
            return Err(ConfigError::Invalid("load factor must be at least 1".into()));
        }
        if self.batch_size == 0 {
            return Err(ConfigError::Invalid("batch size must be at least 1".into()));
        }
        if self.max_parallelism == 0 {
            return Err(ConfigError::Invalid(
                "max parallelism must be at least 1".into(),
            ));
        }
        if self.workers == Some(0) {
            return Err(ConfigError::Invalid("workers must be at least 1".into()));
        }
        Ok(self)
    }

    /// How the responder is registered in every benchmark.
    pub fn handler_options(&self) -> HandlerOptions {
        HandlerOptions {
            command_name: CommandName::new(self.command_name.clone()),
            load_factor: LoadFactor::new(self.load_factor),
            batch_size: self.batch_size,
        }
    }
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{}': {source}", .path.display())]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{}': {source}", .path.display())]
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

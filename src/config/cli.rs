use crate::config::toml_config::{ProbeKind, TomlConfig};
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "redis-ready")]
#[command(about = "Ensure the Redis container is running and wait until it answers")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    /// Dependency URL, e.g. redis://localhost:6379
    #[arg(long)]
    pub url: Option<String>,

    #[arg(long, value_enum)]
    pub probe: Option<ProbeKind>,

    /// Maximum number of probe attempts
    #[arg(long)]
    pub attempts: Option<u32>,

    /// Fixed delay between attempts, in milliseconds
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// Per-attempt connect timeout, in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    #[arg(long)]
    pub container_name: Option<String>,

    #[arg(long)]
    pub compose_file: Option<String>,

    /// Only wait for readiness; never touch containers
    #[arg(long)]
    pub no_container: bool,

    /// Print the readiness report as JSON on success
    #[arg(long)]
    pub report: bool,
}

impl CliConfig {
    /// Flags win over values loaded from the file.
    pub fn apply_to(&self, config: &mut TomlConfig) {
        if let Some(url) = &self.url {
            config.dependency.url = url.clone();
        }
        if let Some(probe) = self.probe {
            config.dependency.probe = probe;
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.dependency.timeout_ms = timeout_ms;
        }
        if let Some(attempts) = self.attempts {
            config.retry.max_attempts = attempts;
        }
        if let Some(delay_ms) = self.delay_ms {
            config.retry.delay_ms = delay_ms;
        }
        if let Some(name) = &self.container_name {
            config.container.name = name.clone();
        }
        if let Some(compose_file) = &self.compose_file {
            config.container.compose_file = compose_file.clone();
        }
        if self.no_container {
            config.container.enabled = false;
        }
    }
}

use crate::adapters::{DockerCli, RedisProbe, TcpProbe};
use crate::core::setup::ContainerSpec;
use crate::core::{Probe, RetryPolicy};
use crate::domain::model::{DEFAULT_DELAY, DEFAULT_MAX_ATTEMPTS};
use crate::utils::error::{ReadyError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const REDIS_DEFAULT_PORT: u16 = 6379;
const MAX_DELAY_MS: u64 = 60_000;
const MAX_TIMEOUT_MS: u64 = 60_000;
const REDIS_SCHEMES: &[&str] = &["redis", "rediss", "unix", "redis+unix"];
const TCP_SCHEMES: &[&str] = &["tcp", "redis", "rediss"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub dependency: DependencyConfig,
    pub retry: RetryConfig,
    pub container: ContainerConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum ProbeKind {
    #[default]
    Redis,
    Tcp,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DependencyConfig {
    pub name: String,
    pub url: String,
    pub probe: ProbeKind,
    pub timeout_ms: u64,
}

impl Default for DependencyConfig {
    fn default() -> Self {
        Self {
            name: "redis".to_string(),
            url: format!("redis://localhost:{}", REDIS_DEFAULT_PORT),
            probe: ProbeKind::Redis,
            timeout_ms: 1_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay_ms: DEFAULT_DELAY.as_millis() as u64,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    pub enabled: bool,
    pub name: String,
    pub compose_file: String,
    pub docker_program: String,
    pub compose_program: String,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            name: "redis-server".to_string(),
            compose_file: "docker/docker-compose.yml".to_string(),
            docker_program: "docker".to_string(),
            compose_program: "docker-compose".to_string(),
        }
    }
}

impl TomlConfig {
    /// Reads and parses a TOML config file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ReadyError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ReadyError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables are left as-is.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ReadyError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("dependency.name", &self.dependency.name)?;
        validation::validate_url("dependency.url", &self.dependency.url, self.allowed_schemes())?;
        validation::validate_range("dependency.timeout_ms", self.dependency.timeout_ms, 1, MAX_TIMEOUT_MS)?;

        validation::validate_range("retry.max_attempts", self.retry.max_attempts, 1, u32::MAX)?;
        validation::validate_range("retry.delay_ms", self.retry.delay_ms, 0, MAX_DELAY_MS)?;

        if self.container.enabled {
            validation::validate_non_empty_string("container.name", &self.container.name)?;
            validation::validate_path("container.compose_file", &self.container.compose_file)?;
            validation::validate_non_empty_string("container.docker_program", &self.container.docker_program)?;
            validation::validate_non_empty_string("container.compose_program", &self.container.compose_program)?;
        }

        Ok(())
    }

    fn allowed_schemes(&self) -> &'static [&'static str] {
        match self.dependency.probe {
            ProbeKind::Redis => REDIS_SCHEMES,
            ProbeKind::Tcp => TCP_SCHEMES,
        }
    }

    pub fn retry_policy(&self) -> Result<RetryPolicy> {
        RetryPolicy::new(
            self.retry.max_attempts,
            Duration::from_millis(self.retry.delay_ms),
        )
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.dependency.timeout_ms)
    }

    /// `host:port` for the TCP probe; Redis URLs without a port use 6379.
    pub fn tcp_addr(&self) -> Result<String> {
        let url = validation::validate_url("dependency.url", &self.dependency.url, TCP_SCHEMES)?;
        let host = url.host_str().ok_or_else(|| ReadyError::MissingConfigError {
            field: "dependency.url host".to_string(),
        })?;
        let port = url.port().unwrap_or(REDIS_DEFAULT_PORT);
        Ok(format!("{}:{}", host, port))
    }

    pub fn build_probe(&self) -> Result<Box<dyn Probe>> {
        let name = self.dependency.name.clone();
        let probe: Box<dyn Probe> = match self.dependency.probe {
            ProbeKind::Redis => Box::new(RedisProbe::new(
                name,
                self.dependency.url.clone(),
                self.probe_timeout(),
            )),
            ProbeKind::Tcp => Box::new(TcpProbe::new(name, self.tcp_addr()?, self.probe_timeout())),
        };
        Ok(probe)
    }

    pub fn container_spec(&self) -> Option<ContainerSpec> {
        self.container.enabled.then(|| ContainerSpec {
            name: self.container.name.clone(),
            compose_file: PathBuf::from(&self.container.compose_file),
        })
    }

    pub fn container_runtime(&self) -> DockerCli {
        DockerCli::new(
            self.container.docker_program.clone(),
            self.container.compose_program.clone(),
        )
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReadyError {
    #[error("{dependency} is not accepting connections yet: {reason}")]
    TransientUnavailable { dependency: String, reason: String },

    #[error("{dependency} did not become ready after {attempts} attempts")]
    DependencyUnavailable { dependency: String, attempts: u32 },

    #[error("Waiting for {dependency} was cancelled after {attempts} attempts")]
    Cancelled { dependency: String, attempts: u32 },

    #[error("Container orchestration failed: {message}")]
    Orchestrator { message: String },

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Availability,
    Orchestration,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ReadyError {
    pub fn transient(dependency: impl Into<String>, reason: impl ToString) -> Self {
        Self::TransientUnavailable {
            dependency: dependency.into(),
            reason: reason.to_string(),
        }
    }

    /// Only connection-refused-class failures are retried by the waiter.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::TransientUnavailable { .. })
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::TransientUnavailable { .. }
            | Self::DependencyUnavailable { .. }
            | Self::Cancelled { .. } => ErrorCategory::Availability,
            Self::Orchestrator { .. } => ErrorCategory::Orchestration,
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
            Self::Redis(_) | Self::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::TransientUnavailable { .. } => ErrorSeverity::Low,
            Self::DependencyUnavailable { .. } | Self::Cancelled { .. } => ErrorSeverity::Medium,
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. }
            | Self::Redis(_) => ErrorSeverity::High,
            Self::Orchestrator { .. } | Self::IoError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            Self::TransientUnavailable { .. } => "Wait a moment and try again".to_string(),
            Self::DependencyUnavailable { .. } => {
                "Check the container logs, or raise --attempts / --delay-ms".to_string()
            }
            Self::Cancelled { .. } => "Re-run the command to resume waiting".to_string(),
            Self::Orchestrator { .. } => {
                "Make sure Docker is running and the compose file builds".to_string()
            }
            Self::Redis(_) => "Check the Redis URL and server configuration".to_string(),
            Self::IoError(_) => "Check file paths and permissions".to_string(),
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => "Fix the configuration file or flags".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::DependencyUnavailable { dependency, .. } => {
                format!("{} started, but did not respond. ({})", dependency, self)
            }
            _ => self.to_string(),
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low | ErrorSeverity::High => 1,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, ReadyError>;

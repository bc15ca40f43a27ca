pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{DockerCli, FnProbe, RedisProbe, TcpProbe};
pub use config::TomlConfig;
pub use crate::core::{setup::DependencySetup, waiter::ReadinessWaiter};
pub use domain::model::{ContainerAction, ReadinessReport, RetryPolicy, SetupOutcome};
pub use domain::ports::{ContainerRuntime, Probe};
pub use utils::error::{ReadyError, Result};

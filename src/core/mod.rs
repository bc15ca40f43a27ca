pub mod setup;
pub mod waiter;

pub use crate::domain::model::{ContainerAction, ReadinessReport, RetryPolicy, SetupOutcome};
pub use crate::domain::ports::{ContainerRuntime, Probe};
pub use crate::utils::error::Result;

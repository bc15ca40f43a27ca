use crate::domain::model::ContainerStatus;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// A single readiness check against an external dependency.
///
/// `Ok(true)` means ready. `Ok(false)` and `ReadyError::TransientUnavailable`
/// both mean "not ready yet"; any other error is terminal.
#[async_trait]
pub trait Probe: Send + Sync {
    fn name(&self) -> &str;
    async fn check(&self) -> Result<bool>;
}

#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    async fn status(&self, name: &str) -> Result<ContainerStatus>;
    async fn start(&self, name: &str) -> Result<()>;
    async fn compose_up(&self, compose_file: &Path) -> Result<()>;
}

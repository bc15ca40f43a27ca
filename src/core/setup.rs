use crate::core::waiter::ReadinessWaiter;
use crate::core::{ContainerAction, ContainerRuntime, Probe, SetupOutcome};
use crate::domain::model::ContainerStatus;
use crate::utils::error::Result;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct ContainerSpec {
    pub name: String,
    pub compose_file: PathBuf,
}

/// Makes sure the dependency's container exists and runs, then waits for it
/// to answer its probe.
pub struct DependencySetup<R: ContainerRuntime> {
    runtime: R,
    container: Option<ContainerSpec>,
    probe: Box<dyn Probe>,
    waiter: ReadinessWaiter,
}

impl<R: ContainerRuntime> DependencySetup<R> {
    pub fn new(
        runtime: R,
        container: Option<ContainerSpec>,
        probe: Box<dyn Probe>,
        waiter: ReadinessWaiter,
    ) -> Self {
        Self {
            runtime,
            container,
            probe,
            waiter,
        }
    }

    pub async fn run(&self) -> Result<SetupOutcome> {
        let container = match &self.container {
            Some(spec) => self.ensure_running(spec).await?,
            None => {
                tracing::debug!("Container management disabled, probing directly");
                ContainerAction::Skipped
            }
        };

        let readiness = self.waiter.wait(self.probe.as_ref()).await?;

        Ok(SetupOutcome {
            container,
            readiness,
        })
    }

    /// Container failures are not retried.
    pub async fn ensure_running(&self, spec: &ContainerSpec) -> Result<ContainerAction> {
        match self.runtime.status(&spec.name).await? {
            ContainerStatus::Running => {
                tracing::info!("✅ {} container is already running.", spec.name);
                Ok(ContainerAction::AlreadyRunning)
            }
            ContainerStatus::Stopped(state) => {
                tracing::info!(
                    "🚀 {} container exists but is not running ({}). Starting it...",
                    spec.name,
                    state
                );
                self.runtime.start(&spec.name).await?;
                Ok(ContainerAction::Started)
            }
            ContainerStatus::NotFound => {
                tracing::info!(
                    "📦 {} container not found. Building and starting using {}...",
                    spec.name,
                    spec.compose_file.display()
                );
                self.runtime.compose_up(&spec.compose_file).await?;
                Ok(ContainerAction::Built)
            }
        }
    }
}

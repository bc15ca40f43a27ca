use crate::core::ContainerRuntime;
use crate::domain::model::ContainerStatus;
use crate::utils::error::{ReadyError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Output;
use tokio::process::Command;

/// Drives containers through the `docker` and `docker-compose` executables.
#[derive(Debug, Clone)]
pub struct DockerCli {
    docker_program: String,
    compose_program: String,
}

impl DockerCli {
    /// `compose_program` may contain arguments, e.g. `"docker compose"`.
    pub fn new(docker_program: impl Into<String>, compose_program: impl Into<String>) -> Self {
        Self {
            docker_program: docker_program.into(),
            compose_program: compose_program.into(),
        }
    }

    async fn run(&self, mut command: Command, what: &str) -> Result<Output> {
        tracing::debug!("Running {:?}", command.as_std());
        command.output().await.map_err(|e| ReadyError::Orchestrator {
            message: format!("could not run {}: {}", what, e),
        })
    }
}

impl Default for DockerCli {
    fn default() -> Self {
        Self::new("docker", "docker-compose")
    }
}

#[async_trait]
impl ContainerRuntime for DockerCli {
    async fn status(&self, name: &str) -> Result<ContainerStatus> {
        let mut command = Command::new(&self.docker_program);
        command.args(["inspect", "--format", "{{.State.Status}}", name]);
        let output = self.run(command, "docker inspect").await?;

        if output.status.success() {
            return Ok(parse_status(&String::from_utf8_lossy(&output.stdout)));
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        if is_not_found(&stderr) {
            Ok(ContainerStatus::NotFound)
        } else {
            Err(failure(&format!("docker inspect {}", name), &output))
        }
    }

    async fn start(&self, name: &str) -> Result<()> {
        let mut command = Command::new(&self.docker_program);
        command.args(["start", name]);
        let output = self.run(command, "docker start").await?;

        if output.status.success() {
            Ok(())
        } else {
            Err(failure(&format!("docker start {}", name), &output))
        }
    }

    async fn compose_up(&self, compose_file: &Path) -> Result<()> {
        let (program, prefix) = split_command(&self.compose_program)?;
        let compose_file = absolute(compose_file)?;
        let workdir = compose_file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        let mut command = Command::new(program);
        command
            .args(prefix)
            .arg("-f")
            .arg(&compose_file)
            .args(["up", "-d", "--build"])
            .current_dir(&workdir);
        let output = self.run(command, &self.compose_program).await?;

        tracing::debug!("{}", String::from_utf8_lossy(&output.stdout).trim());
        if output.status.success() {
            Ok(())
        } else {
            Err(failure(&format!("{} up", self.compose_program), &output))
        }
    }
}

fn parse_status(stdout: &str) -> ContainerStatus {
    match stdout.trim() {
        "running" => ContainerStatus::Running,
        other => ContainerStatus::Stopped(other.to_string()),
    }
}

fn is_not_found(stderr: &str) -> bool {
    stderr.contains("No such object") || stderr.contains("No such container")
}

fn split_command(command: &str) -> Result<(&str, Vec<&str>)> {
    let mut parts = command.split_whitespace();
    let program = parts.next().ok_or_else(|| ReadyError::ConfigError {
        message: "compose program cannot be empty".to_string(),
    })?;
    Ok((program, parts.collect()))
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

fn failure(what: &str, output: &Output) -> ReadyError {
    ReadyError::Orchestrator {
        message: format!(
            "{} exited with {}: {}",
            what,
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        ),
    }
}

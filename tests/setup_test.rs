use async_trait::async_trait;
use redis_ready::core::setup::ContainerSpec;
use redis_ready::domain::model::ContainerStatus;
use redis_ready::{
    ContainerAction, ContainerRuntime, DependencySetup, FnProbe, Probe, ReadinessWaiter,
    ReadyError, Result, RetryPolicy,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Clone)]
struct FakeRuntime {
    status: ContainerStatus,
    compose_fails: bool,
    calls: Arc<Mutex<Vec<String>>>,
}

impl FakeRuntime {
    fn new(status: ContainerStatus) -> Self {
        Self {
            status,
            compose_fails: false,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContainerRuntime for FakeRuntime {
    async fn status(&self, name: &str) -> Result<ContainerStatus> {
        self.calls.lock().unwrap().push(format!("status {}", name));
        Ok(self.status.clone())
    }

    async fn start(&self, name: &str) -> Result<()> {
        self.calls.lock().unwrap().push(format!("start {}", name));
        Ok(())
    }

    async fn compose_up(&self, compose_file: &Path) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("compose_up {}", compose_file.display()));
        if self.compose_fails {
            return Err(ReadyError::Orchestrator {
                message: "build failed".to_string(),
            });
        }
        Ok(())
    }
}

fn spec() -> Option<ContainerSpec> {
    Some(ContainerSpec {
        name: "redis-server".to_string(),
        compose_file: PathBuf::from("docker/docker-compose.yml"),
    })
}

/// Refuses `failures` times, then answers ready.
fn probe(failures: usize) -> (Box<dyn Probe>, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let probe = FnProbe::new("redis", move || {
        let call = counter.fetch_add(1, Ordering::SeqCst);
        async move {
            if call < failures {
                Err(ReadyError::transient("redis", "connection refused"))
            } else {
                Ok(true)
            }
        }
    });
    (Box::new(probe), calls)
}

fn waiter(max_attempts: u32) -> ReadinessWaiter {
    ReadinessWaiter::new(RetryPolicy::new(max_attempts, Duration::from_millis(10)).unwrap())
}

#[tokio::test(start_paused = true)]
async fn test_running_container_is_left_alone() {
    let runtime = FakeRuntime::new(ContainerStatus::Running);
    let (probe, probe_calls) = probe(0);
    let setup = DependencySetup::new(runtime.clone(), spec(), probe, waiter(10));

    let outcome = setup.run().await.unwrap();

    assert_eq!(outcome.container, ContainerAction::AlreadyRunning);
    assert_eq!(outcome.readiness.attempts, 1);
    assert_eq!(runtime.calls(), vec!["status redis-server"]);
    assert_eq!(probe_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_stopped_container_is_started_then_probed() {
    let runtime = FakeRuntime::new(ContainerStatus::Stopped("exited".to_string()));
    let (probe, _) = probe(2);
    let setup = DependencySetup::new(runtime.clone(), spec(), probe, waiter(10));

    let outcome = setup.run().await.unwrap();

    assert_eq!(outcome.container, ContainerAction::Started);
    assert_eq!(outcome.readiness.attempts, 3);
    assert_eq!(
        runtime.calls(),
        vec!["status redis-server", "start redis-server"]
    );
}

#[tokio::test(start_paused = true)]
async fn test_missing_container_is_built_with_compose() {
    let runtime = FakeRuntime::new(ContainerStatus::NotFound);
    let (probe, _) = probe(0);
    let setup = DependencySetup::new(runtime.clone(), spec(), probe, waiter(10));

    let outcome = setup.run().await.unwrap();

    assert_eq!(outcome.container, ContainerAction::Built);
    assert_eq!(
        runtime.calls(),
        vec![
            "status redis-server".to_string(),
            format!("compose_up {}", Path::new("docker/docker-compose.yml").display()),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_compose_failure_fails_fast_without_probing() {
    let mut runtime = FakeRuntime::new(ContainerStatus::NotFound);
    runtime.compose_fails = true;
    let (probe, probe_calls) = probe(0);
    let setup = DependencySetup::new(runtime.clone(), spec(), probe, waiter(10));

    let err = setup.run().await.unwrap_err();

    assert!(matches!(err, ReadyError::Orchestrator { .. }));
    assert_eq!(probe_calls.load(Ordering::SeqCst), 0);
    assert_eq!(runtime.calls().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_disabled_container_step_only_probes() {
    let runtime = FakeRuntime::new(ContainerStatus::NotFound);
    let (probe, _) = probe(0);
    let setup = DependencySetup::new(runtime.clone(), None, probe, waiter(10));

    let outcome = setup.run().await.unwrap();

    assert_eq!(outcome.container, ContainerAction::Skipped);
    assert!(runtime.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_unresponsive_dependency_after_start() {
    let runtime = FakeRuntime::new(ContainerStatus::Stopped("created".to_string()));
    let (probe, probe_calls) = probe(usize::MAX);
    let setup = DependencySetup::new(runtime, spec(), probe, waiter(3));

    let err = setup.run().await.unwrap_err();

    assert!(matches!(
        err,
        ReadyError::DependencyUnavailable { attempts: 3, .. }
    ));
    assert_eq!(probe_calls.load(Ordering::SeqCst), 3);
    assert!(err.user_friendly_message().contains("did not respond"));
}

use crate::flux::WorkloadId;
use async_trait::async_trait;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use tokio::runtime::Handle;

/// Outcome carried by a deployment that did not go through. The message is
/// the legible rendering of whatever the deploy operation reported and is
/// shown to the user verbatim.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct DeployFailure {
    pub message: String,
}

/// Why a `deploy` call was turned away without starting anything.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum DeployError {
    #[error("a deployment is already in progress")]
    InProgress,
    #[error("the previous deployment has not been acknowledged yet")]
    Unacknowledged,
}

/// Lifecycle of one deploy interaction. `Deployed` holds the terminal
/// outcome until the user acknowledges it; there is no edge from
/// `Deploying` back to `Idle` and no cancellation.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum DeployStatus {
    #[default]
    Idle,
    Deploying,
    Deployed(Result<(), DeployFailure>),
}

impl DeployStatus {
    pub fn is_idle(&self) -> bool {
        matches!(self, DeployStatus::Idle)
    }
}

/// The external operation that promotes an image version for a workload.
/// Injected into the controller so the presentation layer never learns
/// about transports.
#[async_trait]
pub trait DeployOperation: Send + Sync {
    async fn perform_deploy(&self, workload: &WorkloadId, container_id: &str)
        -> anyhow::Result<()>;
}

struct StatusState {
    status: DeployStatus,
    observers: Vec<Sender<DeployStatus>>,
}

impl StatusState {
    fn transition(&mut self, next: DeployStatus) {
        tracing::debug!(from = ?self.status, to = ?next, "deploy status transition");
        self.status = next;
        let status = &self.status;
        self.observers.retain(|tx| tx.send(status.clone()).is_ok());
    }
}

/// Owns the deploy status for one workload and is its only mutation path.
/// The async completion and `acknowledge` serialize on the same lock, and
/// observers are notified while it is held, so every subscriber sees
/// transitions in the order they happened.
pub struct DeployController {
    state: Arc<Mutex<StatusState>>,
    deployer: Arc<dyn DeployOperation>,
    runtime: Handle,
    workload: WorkloadId,
}

impl DeployController {
    pub fn new(deployer: Arc<dyn DeployOperation>, runtime: Handle, workload: WorkloadId) -> Self {
        Self {
            state: Arc::new(Mutex::new(StatusState {
                status: DeployStatus::Idle,
                observers: vec![],
            })),
            deployer,
            runtime,
            workload,
        }
    }

    pub fn status(&self) -> DeployStatus {
        self.lock().status.clone()
    }

    /// Registers an observer. Only transitions are delivered; the current
    /// value is available through `status()`.
    pub fn subscribe(&self) -> Receiver<DeployStatus> {
        let (tx, rx) = channel();
        self.lock().observers.push(tx);
        rx
    }

    /// Starts a deployment of `container_id` for this controller's workload.
    /// Legal only while idle; exactly one external call is made per accepted
    /// request. Rejected calls leave the status untouched.
    pub fn deploy(&self, container_id: &str) -> Result<(), DeployError> {
        let mut state = self.lock();
        match state.status {
            DeployStatus::Idle => {}
            DeployStatus::Deploying => return Err(DeployError::InProgress),
            DeployStatus::Deployed(_) => return Err(DeployError::Unacknowledged),
        }
        state.transition(DeployStatus::Deploying);
        drop(state);

        let deployer = Arc::clone(&self.deployer);
        let state = Arc::clone(&self.state);
        let workload = self.workload.clone();
        let container_id = container_id.to_owned();
        self.runtime.spawn(async move {
            let outcome = deployer
                .perform_deploy(&workload, &container_id)
                .await
                .map_err(|e| DeployFailure {
                    message: format!("{e:#}"),
                });
            if let Err(failure) = &outcome {
                tracing::warn!(%workload, container = %container_id, error = %failure, "deploy failed");
            }
            let mut state = state.lock().expect("deploy status lock poisoned");
            debug_assert_eq!(state.status, DeployStatus::Deploying);
            state.transition(DeployStatus::Deployed(outcome));
        });
        Ok(())
    }

    /// Dismisses a terminal status. A no-op while idle or deploying.
    pub fn acknowledge(&self) {
        let mut state = self.lock();
        if matches!(state.status, DeployStatus::Deployed(_)) {
            state.transition(DeployStatus::Idle);
        }
    }

    fn lock(&self) -> MutexGuard<'_, StatusState> {
        self.state.lock().expect("deploy status lock poisoned")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::time::Duration;
    use tokio::sync::Notify;

    /// Deploy operation that records its calls and blocks until the test
    /// releases it, so `Deploying` can be observed deterministically.
    struct ScriptedDeployer {
        started: Notify,
        release: Notify,
        outcome: Mutex<Option<anyhow::Result<()>>>,
        calls: Mutex<Vec<(String, String)>>,
    }

    impl ScriptedDeployer {
        fn new(outcome: anyhow::Result<()>) -> Arc<Self> {
            Arc::new(Self {
                started: Notify::new(),
                release: Notify::new(),
                outcome: Mutex::new(Some(outcome)),
                calls: Mutex::new(vec![]),
            })
        }

        fn calls(&self) -> Vec<(String, String)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl DeployOperation for ScriptedDeployer {
        async fn perform_deploy(
            &self,
            workload: &WorkloadId,
            container_id: &str,
        ) -> anyhow::Result<()> {
            self.calls
                .lock()
                .unwrap()
                .push((workload.to_string(), container_id.to_owned()));
            self.started.notify_one();
            self.release.notified().await;
            self.outcome.lock().unwrap().take().unwrap_or(Ok(()))
        }
    }

    fn controller(deployer: &Arc<ScriptedDeployer>) -> DeployController {
        let scripted: Arc<dyn DeployOperation> = Arc::clone(deployer);
        DeployController::new(
            scripted,
            Handle::current(),
            WorkloadId::new("default:deployment/podinfo"),
        )
    }

    fn expect_transition(rx: &Receiver<DeployStatus>, expected: DeployStatus) {
        let got = rx
            .recv_timeout(Duration::from_secs(5))
            .expect("no transition observed in time");
        assert_eq!(got, expected);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn acknowledge_while_idle_is_a_noop() {
        let deployer = ScriptedDeployer::new(Ok(()));
        let controller = controller(&deployer);
        let events = controller.subscribe();

        controller.acknowledge();

        assert_eq!(controller.status(), DeployStatus::Idle);
        assert!(events.try_recv().is_err());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn deploy_invokes_the_operation_exactly_once() {
        let deployer = ScriptedDeployer::new(Ok(()));
        let controller = controller(&deployer);

        controller.deploy("app:v2").unwrap();
        assert_eq!(controller.status(), DeployStatus::Deploying);

        deployer.started.notified().await;
        assert_eq!(
            deployer.calls(),
            vec![("default:deployment/podinfo".to_owned(), "app:v2".to_owned())]
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn successful_deploy_runs_the_full_cycle() {
        let deployer = ScriptedDeployer::new(Ok(()));
        let controller = controller(&deployer);
        let events = controller.subscribe();

        controller.deploy("app:v2").unwrap();
        expect_transition(&events, DeployStatus::Deploying);

        deployer.started.notified().await;
        deployer.release.notify_one();
        expect_transition(&events, DeployStatus::Deployed(Ok(())));
        assert_eq!(controller.status(), DeployStatus::Deployed(Ok(())));

        controller.acknowledge();
        expect_transition(&events, DeployStatus::Idle);
        assert_eq!(controller.status(), DeployStatus::Idle);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn failed_deploy_carries_the_legible_message() {
        let deployer = ScriptedDeployer::new(Err(anyhow!("connection refused")));
        let controller = controller(&deployer);
        let events = controller.subscribe();

        controller.deploy("app:v3").unwrap();
        expect_transition(&events, DeployStatus::Deploying);

        deployer.started.notified().await;
        deployer.release.notify_one();
        expect_transition(
            &events,
            DeployStatus::Deployed(Err(DeployFailure {
                message: "connection refused".to_owned(),
            })),
        );

        controller.acknowledge();
        expect_transition(&events, DeployStatus::Idle);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn deploy_while_deploying_is_rejected() {
        let deployer = ScriptedDeployer::new(Ok(()));
        let controller = controller(&deployer);

        controller.deploy("app:v2").unwrap();
        deployer.started.notified().await;

        assert_eq!(controller.deploy("app:v3"), Err(DeployError::InProgress));
        assert_eq!(controller.status(), DeployStatus::Deploying);
        assert_eq!(deployer.calls().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn deploy_before_acknowledge_is_rejected() {
        let deployer = ScriptedDeployer::new(Ok(()));
        let controller = controller(&deployer);
        let events = controller.subscribe();

        controller.deploy("app:v2").unwrap();
        deployer.started.notified().await;
        deployer.release.notify_one();
        expect_transition(&events, DeployStatus::Deploying);
        expect_transition(&events, DeployStatus::Deployed(Ok(())));

        assert_eq!(
            controller.deploy("app:v3"),
            Err(DeployError::Unacknowledged)
        );

        controller.acknowledge();
        expect_transition(&events, DeployStatus::Idle);
        assert!(controller.deploy("app:v3").is_ok());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn acknowledge_while_deploying_keeps_deploying() {
        let deployer = ScriptedDeployer::new(Ok(()));
        let controller = controller(&deployer);
        let events = controller.subscribe();

        controller.deploy("app:v2").unwrap();
        deployer.started.notified().await;
        expect_transition(&events, DeployStatus::Deploying);

        controller.acknowledge();
        assert_eq!(controller.status(), DeployStatus::Deploying);
        assert!(events.try_recv().is_err());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn observers_see_transitions_in_order() {
        let deployer = ScriptedDeployer::new(Ok(()));
        let controller = controller(&deployer);
        let events = controller.subscribe();

        controller.deploy("app:v2").unwrap();
        deployer.started.notified().await;
        deployer.release.notify_one();
        expect_transition(&events, DeployStatus::Deploying);
        expect_transition(&events, DeployStatus::Deployed(Ok(())));
        controller.acknowledge();
        expect_transition(&events, DeployStatus::Idle);
        assert!(events.try_recv().is_err());
    }
}

//! Per-instance status polling with stuck detection.
//!
//! One task per provisioning instance. The task owns the instance's
//! operation guard and releases it when it reaches a terminal state.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::oneshot;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, warn};

use super::lock::OperationGuard;
use super::installer::Shared;
use crate::domain::{DeploymentHandle, Instance, InstanceId, InstanceState};
use crate::error::OrchestratorError;
use crate::port::{Alert, DeploymentStatus, Event, InstanceEvent, Severity};

const STUCK_MESSAGE: &str = "Internal error!";
const FAILED_MESSAGE: &str = "Installation failed!";

/// How a watch ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum WatchOutcome {
    Running,
    Failed,
    Stuck,
    /// The instance disappeared or left `Provisioning` underneath us.
    Abandoned,
}

/// Stuck budget left for an instance that entered `Provisioning` at `since`.
pub(super) fn remaining_budget(since: Option<DateTime<Utc>>, threshold: Duration) -> Duration {
    let Some(since) = since else {
        return threshold;
    };
    let elapsed = (Utc::now() - since).to_std().unwrap_or(Duration::ZERO);
    threshold.saturating_sub(elapsed)
}

/// Spawn the watch task for `instance` and track it.
pub(super) fn spawn_watch(shared: &Arc<Shared>, instance: &Instance, guard: OperationGuard) {
    let Some(handle) = instance.handle().cloned() else {
        error!(
            instance = %instance.id(),
            name = instance.name(),
            "Provisioning instance has no deployment handle"
        );
        return;
    };

    let id = instance.id().clone();
    let budget = remaining_budget(
        instance.provisioning_since(),
        shared.config.stuck_threshold(),
    );

    // The task must not deregister itself before it has been registered.
    let (registered_tx, registered_rx) = oneshot::channel::<()>();
    let task = tokio::spawn({
        let shared = Arc::clone(shared);
        let id = id.clone();
        async move {
            let _ = registered_rx.await;
            let outcome = watch(&shared, &id, &handle, budget).await;
            debug!(instance = %id, outcome = ?outcome, "Stopped polling");
            shared.tasks.remove(&id);
            drop(guard);
        }
    });

    shared.tasks.insert(id, task);
    let _ = registered_tx.send(());
}

async fn watch(
    shared: &Shared,
    id: &InstanceId,
    handle: &DeploymentHandle,
    budget: Duration,
) -> WatchOutcome {
    let poll_interval = shared.config.poll_interval();
    let deadline = Instant::now() + budget;
    let mut ticker = tokio::time::interval_at(Instant::now() + poll_interval, poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        let status = poll_status(shared, handle).await;
        if shared.registry.record_poll(id).is_err() {
            debug!(instance = %id, "Instance removed while polling");
            return WatchOutcome::Abandoned;
        }

        match status {
            Ok(DeploymentStatus::Running) => {
                return finish(shared, id, InstanceState::Running, None, WatchOutcome::Running);
            }
            Ok(DeploymentStatus::Failed(reason)) => {
                let state = InstanceState::Failed;
                return finish(shared, id, state, Some(reason), WatchOutcome::Failed);
            }
            Ok(DeploymentStatus::Provisioning | DeploymentStatus::Unknown) => {
                debug!(instance = %id, "Deployment still provisioning");
            }
            Err(e) => {
                debug!(instance = %id, error = %e, "Status poll failed, retrying");
            }
        }

        if Instant::now() >= deadline {
            let detail = format!(
                "no terminal status after {}s",
                shared.config.stuck_threshold_secs
            );
            let state = InstanceState::Stuck;
            return finish(shared, id, state, Some(detail), WatchOutcome::Stuck);
        }
    }
}

async fn poll_status(
    shared: &Shared,
    handle: &DeploymentHandle,
) -> Result<DeploymentStatus, OrchestratorError> {
    let timeout = shared.timeouts.call;
    match tokio::time::timeout(timeout, shared.orchestrator.status(handle)).await {
        Ok(result) => result,
        Err(_) => Err(OrchestratorError::StatusUnknown(format!(
            "status call timed out after {}ms",
            timeout.as_millis()
        ))),
    }
}

fn finish(
    shared: &Shared,
    id: &InstanceId,
    state: InstanceState,
    detail: Option<String>,
    outcome: WatchOutcome,
) -> WatchOutcome {
    let instance = match shared.registry.transition(id, state, detail.clone()) {
        Ok(instance) => instance,
        Err(e) => {
            error!(
                instance = %id,
                state = %state,
                error = %e,
                "Failed to record poll outcome"
            );
            return WatchOutcome::Abandoned;
        }
    };

    match state {
        InstanceState::Running => {
            shared
                .notifier
                .notify(Event::InstanceRunning(InstanceEvent::from(&instance)));
        }
        InstanceState::Stuck => {
            warn!(
                user = %instance.user(),
                instance = %id,
                name = instance.name(),
                threshold_secs = shared.config.stuck_threshold_secs,
                "Installation stuck"
            );
            let event = alert(&instance, Severity::Warning, STUCK_MESSAGE, detail);
            shared.notifier.notify(event);
        }
        InstanceState::Failed => {
            warn!(
                user = %instance.user(),
                instance = %id,
                name = instance.name(),
                reason = detail.as_deref().unwrap_or_default(),
                "Deployment failed"
            );
            let event = alert(&instance, Severity::Error, FAILED_MESSAGE, detail);
            shared.notifier.notify(event);
        }
        _ => {}
    }

    outcome
}

pub(super) fn alert(
    instance: &Instance,
    severity: Severity,
    message: &str,
    detail: Option<String>,
) -> Event {
    Event::Alert(Alert {
        user_id: instance.user().clone(),
        severity,
        message: message.to_string(),
        instance_name: instance.name().to_string(),
        detail,
    })
}

//! Webhook notifier.
//!
//! Posts every event as JSON to a configured URL. Delivery happens on a
//! background worker, so [`Notifier::notify`] only enqueues.

use std::time::Duration;

use reqwest::Client as HttpClient;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::port::{Alert, Event, InstanceEvent, Notifier};

/// JSON body sent for each event.
#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Payload<'a> {
    Alert(&'a Alert),
    InstanceRunning(&'a InstanceEvent),
    InstanceRemoved(&'a InstanceEvent),
}

impl<'a> From<&'a Event> for Payload<'a> {
    fn from(event: &'a Event) -> Self {
        match event {
            Event::Alert(alert) => Self::Alert(alert),
            Event::InstanceRunning(event) => Self::InstanceRunning(event),
            Event::InstanceRemoved(event) => Self::InstanceRemoved(event),
        }
    }
}

/// Configuration for the webhook notifier.
#[derive(Debug, Clone)]
pub struct WebhookConfig {
    /// Endpoint receiving `POST` requests.
    pub url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Attempts per event, including the first.
    pub max_attempts: u32,
}

impl WebhookConfig {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: Duration::from_secs(5),
            max_attempts: 3,
        }
    }
}

/// Notifier that forwards events to an HTTP webhook.
pub struct WebhookNotifier {
    sender: mpsc::UnboundedSender<Event>,
}

impl WebhookNotifier {
    /// Create the notifier and spawn its delivery worker.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn new(config: WebhookConfig) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        tokio::spawn(webhook_worker(config, receiver));
        Self { sender }
    }
}

impl Notifier for WebhookNotifier {
    fn notify(&self, event: Event) {
        if self.sender.send(event).is_err() {
            warn!("Webhook worker stopped, dropping event");
        }
    }
}

async fn webhook_worker(config: WebhookConfig, mut receiver: mpsc::UnboundedReceiver<Event>) {
    let http = HttpClient::builder()
        .timeout(config.timeout)
        .build()
        .unwrap_or_else(|err| {
            warn!(error = %err, "Failed to build HTTP client, using defaults");
            HttpClient::new()
        });

    while let Some(event) = receiver.recv().await {
        deliver(&http, &config, &event).await;
    }
    debug!("Webhook worker exiting");
}

async fn deliver(http: &HttpClient, config: &WebhookConfig, event: &Event) {
    let payload = Payload::from(event);
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        match http.post(&config.url).json(&payload).send().await {
            Ok(response) => {
                if let Err(err) = response.error_for_status() {
                    warn!(user = %event.user_id(), error = %err, "Webhook rejected event");
                }
                return;
            }
            Err(err) => {
                if attempt >= max_attempts || !should_retry(&err) {
                    warn!(user = %event.user_id(), error = %err, "Webhook delivery failed");
                    return;
                }
                debug!(attempt, max_attempts, error = %err, "Webhook delivery failed, retrying");
                tokio::time::sleep(Duration::from_millis(200 * u64::from(attempt))).await;
            }
        }
    }
}

fn should_retry(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PackageId, UserId};
    use crate::port::Severity;

    #[test]
    fn alert_payload_is_tagged() {
        let event = Event::Alert(Alert {
            user_id: UserId::from("1"),
            severity: Severity::Error,
            message: "Orchestrator connection failed!".into(),
            instance_name: "myapp2".into(),
            detail: None,
        });

        let json = serde_json::to_value(Payload::from(&event)).unwrap();

        assert_eq!(json["kind"], "alert");
        assert_eq!(json["severity"], "error");
        assert_eq!(json["message"], "Orchestrator connection failed!");
        assert_eq!(json["instance_name"], "myapp2");
    }

    #[test]
    fn running_payload_carries_package() {
        let event = Event::InstanceRunning(InstanceEvent {
            user_id: UserId::from("1"),
            name: "myapp".into(),
            package_id: PackageId::from("wordpress"),
        });

        let json = serde_json::to_value(Payload::from(&event)).unwrap();

        assert_eq!(json["kind"], "instance_running");
        assert_eq!(json["package_id"], "wordpress");
    }

    #[tokio::test]
    async fn notify_after_worker_spawn_does_not_block() {
        let notifier = WebhookNotifier::new(WebhookConfig {
            url: "http://127.0.0.1:9/hook".into(),
            timeout: Duration::from_millis(50),
            max_attempts: 1,
        });
        notifier.notify(Event::InstanceRemoved(InstanceEvent {
            user_id: UserId::from("1"),
            name: "myapp".into(),
            package_id: PackageId::from("wordpress"),
        }));
    }
}

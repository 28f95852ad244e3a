//! Notifier port for user-visible alerts.
//!
//! This module defines the trait the engine pushes lifecycle alerts to,
//! such as a failed orchestrator connection or a stuck installation.

use std::fmt;

use serde::Serialize;

use crate::domain::{Instance, PackageId, UserId};

/// Severity of an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        })
    }
}

/// Alert addressed to one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alert {
    /// The user the alert is for.
    pub user_id: UserId,
    /// How bad it is.
    pub severity: Severity,
    /// User-facing message (e.g. "Internal error!").
    pub message: String,
    /// Instance the alert concerns.
    pub instance_name: String,
    /// Technical detail for operators, if any.
    pub detail: Option<String>,
}

/// Lifecycle summary attached to completion events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstanceEvent {
    /// Owner of the instance.
    pub user_id: UserId,
    /// Instance name.
    pub name: String,
    /// Installed package.
    pub package_id: PackageId,
}

impl From<&Instance> for InstanceEvent {
    fn from(instance: &Instance) -> Self {
        Self {
            user_id: instance.user().clone(),
            name: instance.name().to_string(),
            package_id: instance.package().clone(),
        }
    }
}

/// Events that can trigger notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Something went wrong that the user must see.
    Alert(Alert),
    /// An instance finished provisioning.
    InstanceRunning(InstanceEvent),
    /// An instance was uninstalled.
    InstanceRemoved(InstanceEvent),
}

impl Event {
    /// The user an event is addressed to.
    #[must_use]
    pub fn user_id(&self) -> &UserId {
        match self {
            Self::Alert(alert) => &alert.user_id,
            Self::InstanceRunning(event) | Self::InstanceRemoved(event) => &event.user_id,
        }
    }
}

/// Trait for notification handlers.
///
/// # Implementation Notes
///
/// - Implementations must be thread-safe (`Send + Sync`)
/// - The `notify` method should not block or perform slow I/O synchronously
/// - Consider spawning async tasks for slow operations
pub trait Notifier: Send + Sync {
    /// Handle an event.
    fn notify(&self, event: Event);
}

/// Registry of notifiers (composite pattern).
///
/// Broadcasts events to all registered notifiers.
pub struct NotifierRegistry {
    notifiers: Vec<Box<dyn Notifier>>,
}

impl NotifierRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self { notifiers: vec![] }
    }

    /// Register a notifier.
    pub fn register(&mut self, notifier: Box<dyn Notifier>) {
        self.notifiers.push(notifier);
    }

    /// Number of registered notifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.notifiers.len()
    }

    /// Check if registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notifiers.is_empty()
    }
}

impl Default for NotifierRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for NotifierRegistry {
    fn notify(&self, event: Event) {
        for notifier in &self.notifiers {
            notifier.notify(event.clone());
        }
    }
}

/// A no-op notifier for testing or when notifications are disabled.
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _event: Event) {}
}

/// A logging notifier that logs events via tracing.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, event: Event) {
        use tracing::{info, warn};
        match event {
            Event::Alert(alert) => {
                warn!(
                    user = %alert.user_id,
                    name = %alert.instance_name,
                    severity = %alert.severity,
                    detail = alert.detail.as_deref().unwrap_or(""),
                    "{}",
                    alert.message
                );
            }
            Event::InstanceRunning(e) => {
                info!(user = %e.user_id, name = %e.name, package = %e.package_id, "Instance running");
            }
            Event::InstanceRemoved(e) => {
                info!(user = %e.user_id, name = %e.name, package = %e.package_id, "Instance removed");
            }
        }
    }
}

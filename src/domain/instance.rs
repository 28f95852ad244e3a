//! Application instances and their lifecycle state machine.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::TransitionError;
use super::id::{DeploymentHandle, InstanceId, PackageId, UserId};

/// Lifecycle state of an instance.
///
/// ```text
/// Requested -> Validating -> Dispatching -> Provisioning -> Running
///                  |              |              |
///                  v              v              +--> Failed
///               Rejected    DispatchFailed       +--> Stuck
///
/// Running | Failed | Stuck -> Removing -> (deleted) | Failed
/// Stuck -> Provisioning    (retry)
/// Failed -> Dispatching    (retry)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstanceState {
    Requested,
    Validating,
    Dispatching,
    Provisioning,
    Running,
    Rejected,
    DispatchFailed,
    Stuck,
    Failed,
    Removing,
}

impl InstanceState {
    /// All states, in lifecycle order.
    pub const ALL: [InstanceState; 10] = [
        Self::Requested,
        Self::Validating,
        Self::Dispatching,
        Self::Provisioning,
        Self::Running,
        Self::Rejected,
        Self::DispatchFailed,
        Self::Stuck,
        Self::Failed,
        Self::Removing,
    ];

    /// Whether `next` is a legal successor of `self`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        use InstanceState::*;
        matches!(
            (self, next),
            (Requested, Validating)
                | (Validating, Rejected | Dispatching | DispatchFailed)
                | (Dispatching, Provisioning | DispatchFailed)
                | (Provisioning, Running | Failed | Stuck)
                | (Running, Removing)
                | (Failed, Removing | Dispatching)
                | (Stuck, Removing | Provisioning)
                | (Removing, Failed)
        )
    }

    /// True while an operation on the instance is in flight.
    #[must_use]
    pub const fn is_in_flight(self) -> bool {
        matches!(
            self,
            Self::Requested
                | Self::Validating
                | Self::Dispatching
                | Self::Provisioning
                | Self::Removing
        )
    }

    /// True for states that end an operation, successfully or not.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !self.is_in_flight()
    }

    /// States from which an explicit uninstall may start.
    #[must_use]
    pub const fn is_removable(self) -> bool {
        matches!(self, Self::Running | Self::Failed | Self::Stuck)
    }

    /// Stable lowercase name used in logs and persistence.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Requested => "requested",
            Self::Validating => "validating",
            Self::Dispatching => "dispatching",
            Self::Provisioning => "provisioning",
            Self::Running => "running",
            Self::Rejected => "rejected",
            Self::DispatchFailed => "dispatch_failed",
            Self::Stuck => "stuck",
            Self::Failed => "failed",
            Self::Removing => "removing",
        }
    }

    /// Parse the representation produced by [`as_str`](Self::as_str).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|state| state.as_str() == value)
    }
}

impl fmt::Display for InstanceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user's request for, and the running life of, one installed package.
///
/// Only the installation engine mutates instances; everything else sees
/// clones taken from the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    pub(crate) id: InstanceId,
    pub(crate) user: UserId,
    pub(crate) name: String,
    pub(crate) package: PackageId,
    pub(crate) state: InstanceState,
    pub(crate) handle: Option<DeploymentHandle>,
    pub(crate) last_error: Option<String>,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
    pub(crate) last_status_check: Option<DateTime<Utc>>,
    pub(crate) provisioning_since: Option<DateTime<Utc>>,
}

impl Instance {
    /// Start a new instance in [`InstanceState::Requested`].
    pub fn new(user: UserId, name: impl Into<String>, package: PackageId) -> Self {
        let now = Utc::now();
        Self {
            id: InstanceId::new(),
            user,
            name: name.into(),
            package,
            state: InstanceState::Requested,
            handle: None,
            last_error: None,
            created_at: now,
            updated_at: now,
            last_status_check: None,
            provisioning_since: None,
        }
    }

    pub fn id(&self) -> &InstanceId {
        &self.id
    }

    pub fn user(&self) -> &UserId {
        &self.user
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn package(&self) -> &PackageId {
        &self.package
    }

    pub fn state(&self) -> InstanceState {
        self.state
    }

    pub fn handle(&self) -> Option<&DeploymentHandle> {
        self.handle.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn last_status_check(&self) -> Option<DateTime<Utc>> {
        self.last_status_check
    }

    /// Start of the current stuck budget, set on every entry into
    /// [`InstanceState::Provisioning`].
    pub fn provisioning_since(&self) -> Option<DateTime<Utc>> {
        self.provisioning_since
    }

    /// Move to `next`, recording `error` as the last error when given.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError`] if `next` is not a legal successor of the
    /// current state; the instance is left untouched.
    pub(crate) fn advance(
        &mut self,
        next: InstanceState,
        error: Option<String>,
    ) -> Result<(), TransitionError> {
        if !self.state.can_transition_to(next) {
            return Err(TransitionError {
                from: self.state,
                to: next,
            });
        }

        let now = Utc::now();
        self.state = next;
        self.updated_at = now;

        match next {
            InstanceState::Provisioning => self.provisioning_since = Some(now),
            InstanceState::Running => self.last_error = None,
            _ => {}
        }
        if let Some(error) = error {
            self.last_error = Some(error);
        }

        Ok(())
    }

    pub(crate) fn attach_handle(&mut self, handle: DeploymentHandle) {
        self.handle = Some(handle);
        self.updated_at = Utc::now();
    }

    pub(crate) fn record_poll(&mut self) {
        self.last_status_check = Some(Utc::now());
    }
}

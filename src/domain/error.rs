//! Domain validation errors.
//!
//! These errors are returned when a domain invariant would be violated:
//! a proposed instance name breaks the naming rules, or a lifecycle
//! transition is attempted out of order.

use std::fmt;

use thiserror::Error;

use super::instance::InstanceState;

/// Why a proposed instance name failed the syntax rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidNameReason {
    /// Empty or whitespace only.
    Empty,
    /// Longer than the configured maximum.
    TooLong { max: usize },
    /// Contains a character outside the allowed set (dots included).
    IllegalCharacter { ch: char },
    /// Leading, trailing or doubled hyphen.
    MisplacedHyphen,
}

impl fmt::Display for InvalidNameReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "name is empty"),
            Self::TooLong { max } => write!(f, "name is longer than {max} characters"),
            Self::IllegalCharacter { ch } => write!(f, "character {ch:?} is not allowed"),
            Self::MisplacedHyphen => {
                write!(f, "hyphens may not lead, trail or repeat")
            }
        }
    }
}

/// Errors produced by the name validator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NameError {
    /// The name breaks the syntax rules.
    #[error("invalid name '{name}': {reason}")]
    Invalid {
        /// The rejected name.
        name: String,
        /// Which rule it broke.
        reason: InvalidNameReason,
    },

    /// The user already has an active instance with this name.
    #[error("name '{name}' is already taken")]
    Duplicate {
        /// The rejected name.
        name: String,
    },
}

/// A lifecycle transition that the state machine does not allow.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("invalid transition from {from} to {to}")]
pub struct TransitionError {
    /// State the instance was in.
    pub from: InstanceState,
    /// State that was requested.
    pub to: InstanceState,
}

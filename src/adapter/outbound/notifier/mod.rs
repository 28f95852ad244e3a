//! Notification adapters.
//!
//! Implements the `port::Notifier` trait for notification backends beyond
//! the log and null notifiers that ship with the port.

pub mod webhook;

pub use webhook::{WebhookConfig, WebhookNotifier};

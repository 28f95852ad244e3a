//! CLI module graph.

pub mod catalog;
pub mod check;
pub mod command;
pub mod config;
pub mod diagnostic;
pub mod dispatch;
pub mod install;
pub mod list;
pub mod output;
pub mod paths;
pub mod run;

pub use dispatch::execute;

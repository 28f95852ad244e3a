//! CLI output formatting.
//!
//! Every helper has two renderings: colored, indented text for people and
//! one JSON object per line (`{"type": ..., "payload": ...}`) for scripts.
//! `--quiet` drops informational text but never warnings or errors.

use std::fmt::Display;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use parking_lot::RwLock;
use serde_json::{json, Value};

use crate::domain::InstanceState;

/// Output settings from the global CLI flags.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputConfig {
    /// Emit JSON lines instead of text.
    pub json: bool,
    /// Suppress informational text.
    pub quiet: bool,
    /// Count of `-v` flags.
    pub verbose: u8,
}

impl OutputConfig {
    #[must_use]
    pub const fn new(json: bool, quiet: bool, verbose: u8) -> Self {
        Self {
            json,
            quiet,
            verbose,
        }
    }
}

static OUTPUT: RwLock<OutputConfig> = parking_lot::const_rwlock(OutputConfig::new(false, false, 0));

const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// How a message is classified for `--quiet`.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Level {
    Info,
    Always,
}

fn current() -> OutputConfig {
    *OUTPUT.read()
}

/// Route one message to JSON or to `text`, honoring quiet mode.
fn emit(level: Level, kind: &str, payload: Value, text: impl FnOnce()) {
    let config = current();
    if config.json {
        println!("{}", json!({ "type": kind, "payload": payload }));
    } else if level == Level::Always || !config.quiet {
        text();
    }
}

/// Apply the global flags. Call once, before any other helper.
pub fn configure(config: OutputConfig) {
    *OUTPUT.write() = config;
}

#[must_use]
pub fn is_json() -> bool {
    current().json
}

#[must_use]
pub fn verbosity() -> u8 {
    current().verbose
}

/// Application name and version.
pub fn header(version: &str) {
    emit(
        Level::Info,
        "header",
        json!({ "app": "berth", "version": version }),
        || println!("{} {}\n", "berth".bold(), version.dimmed()),
    );
}

/// A labeled value.
pub fn field(label: &str, value: impl Display) {
    let value = value.to_string();
    emit(
        Level::Info,
        "field",
        json!({ "label": label, "value": value }),
        || println!("  {:<14} {}", label.dimmed(), value),
    );
}

pub fn success(message: &str) {
    emit(Level::Info, "success", json!({ "message": message }), || {
        println!("  {} {}", "✓".green(), message);
    });
}

pub fn warning(message: &str) {
    emit(Level::Always, "warning", json!({ "message": message }), || {
        println!("  {} {}", "⚠".yellow(), message);
    });
}

/// An error line. Goes to stderr in both modes.
pub fn error(message: &str) {
    if is_json() {
        eprintln!("{}", json!({ "type": "error", "payload": { "message": message } }));
    } else {
        eprintln!("  {} {}", "×".red(), message);
    }
}

pub fn section(title: &str) {
    emit(Level::Info, "section", json!({ "title": title }), || {
        println!("\n{}", title.bold());
    });
}

pub fn hint(message: &str) {
    emit(Level::Info, "hint", json!({ "message": message }), || {
        println!("  {}: {}", "hint".cyan().dimmed(), message.dimmed());
    });
}

/// A rendered table, indented. Skipped in JSON mode, where handlers print
/// their own document.
pub fn table(rendered: impl Display) {
    let config = current();
    if config.json || config.quiet {
        return;
    }
    println!();
    for line in rendered.to_string().lines() {
        println!("  {line}");
    }
    println!();
}

/// Print a complete JSON document as one line.
pub fn json_output(value: Value) {
    println!("{value}");
}

/// Start a spinner. Hidden in JSON or quiet mode.
pub fn spinner(message: &str) -> ProgressBar {
    let config = current();
    let pb = if config.json || config.quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner()
            .tick_strings(SPINNER_FRAMES)
            .template("  {spinner:.cyan} {msg}")
        {
            pb.set_style(style);
        }
        pb.enable_steady_tick(Duration::from_millis(80));
        pb
    };
    pb.set_message(message.to_string());
    pb
}

pub fn spinner_success(pb: &ProgressBar, message: &str) {
    finish(pb, Level::Info, "spinner_success", format!("{} {message}", "✓".green()), message);
}

pub fn spinner_fail(pb: &ProgressBar, message: &str) {
    finish(pb, Level::Always, "spinner_fail", format!("{} {message}", "×".red()), message);
}

fn finish(pb: &ProgressBar, level: Level, kind: &str, line: String, message: &str) {
    let config = current();
    if config.json {
        println!("{}", json!({ "type": kind, "payload": { "message": message } }));
        pb.finish_and_clear();
    } else if level == Level::Always || !config.quiet {
        pb.finish_with_message(line);
    } else {
        pb.finish_and_clear();
    }
}

/// Instance state colored by outcome.
#[must_use]
pub fn state(state: InstanceState) -> String {
    let label = state.as_str();
    if is_json() {
        return label.to_string();
    }
    match state {
        InstanceState::Running => label.green().to_string(),
        InstanceState::Stuck => label.yellow().to_string(),
        InstanceState::Failed | InstanceState::DispatchFailed | InstanceState::Rejected => {
            label.red().to_string()
        }
        _ => label.cyan().to_string(),
    }
}

#[must_use]
pub fn muted(value: impl Display) -> String {
    let value = value.to_string();
    if is_json() {
        return value;
    }
    value.dimmed().to_string()
}

//! Spinner shown while a build is with the worker

use crate::io::configuration::SPINNER_TICK_MS;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::LazyLock;
use std::time::Duration;

static SPINNER_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_spinner()
        .template("{spinner:.cyan} [{elapsed_precise}] {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
});

/// Busy indicator tied to the orchestrator's building flag
pub struct BuildProgress {
    bar: ProgressBar,
}

impl BuildProgress {
    /// Create a spinner, hidden when `quiet` is set
    pub fn new(quiet: bool) -> Self {
        let bar = if quiet {
            ProgressBar::hidden()
        } else {
            ProgressBar::new_spinner()
        };
        bar.set_style(SPINNER_STYLE.clone());
        Self { bar }
    }

    /// Start ticking with a message describing the build
    pub fn start(&self, message: impl Into<String>) {
        self.bar.set_message(message.into());
        self.bar
            .enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
    }

    /// Stop with a success message
    pub fn finish_success(&self, message: impl Into<String>) {
        self.bar.finish_with_message(format!("✓ {}", message.into()));
    }

    /// Stop with a failure message
    pub fn finish_failure(&self, message: impl Into<String>) {
        self.bar.abandon_with_message(format!("✗ {}", message.into()));
    }

    /// Whether output is suppressed
    pub fn is_hidden(&self) -> bool {
        self.bar.is_hidden()
    }
}

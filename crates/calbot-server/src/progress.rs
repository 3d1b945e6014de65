//! Progress reporting for long-running operations.
//!
//! Subscribe can take a while on large feeds. The orchestrator appends a line
//! to a [`Transcript`] at each step and hands the whole transcript to a
//! [`ProgressReporter`], which typically edits one chat message in place.
//! Reporting is best-effort: failures are logged and never abort an operation.

use calbot_providers::{BoxFuture, ProviderResult};
use tracing::warn;

/// Receives progress updates.
pub trait ProgressReporter: Send + Sync {
    /// Shows the full transcript so far.
    fn update<'a>(&'a self, transcript: &'a str) -> BoxFuture<'a, ProviderResult<()>>;
}

/// Accumulated progress lines for one operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    lines: Vec<String>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn render(&self) -> String {
        self.lines.join("\n")
    }

    /// Appends `line` and sends the transcript to `reporter`.
    pub(crate) async fn report(&mut self, reporter: &dyn ProgressReporter, line: impl Into<String>) {
        self.push(line);
        let text = self.render();
        if let Err(e) = reporter.update(&text).await {
            warn!(error = %e, "failed to report progress");
        }
    }
}

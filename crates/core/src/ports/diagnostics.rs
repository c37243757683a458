//! Diagnostics sink injected into the pagination engine.

use tracing::{error, warn};

/// Request-scoped context used to attribute diagnostic lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadContext {
    /// Key of the user on whose behalf the load runs.
    pub user: String,
    /// Name of the invoking loader, e.g. `loadDmarcConnectionsByDomainId`.
    pub caller: String,
    /// Identifier of the parent entity, if the candidate set is scoped.
    pub parent: Option<String>,
}

impl LoadContext {
    pub fn new(user: impl Into<String>, caller: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            caller: caller.into(),
            parent: None,
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Parent identifier for log lines.
    pub fn parent_label(&self) -> &str {
        self.parent.as_deref().unwrap_or("all")
    }
}

/// Receiver of the engine's audit and failure lines.
pub trait DiagnosticSink: Send + Sync {
    /// Rejected caller input.
    fn warn(&self, message: &str);

    /// Record source failure, with full internal detail.
    fn error(&self, message: &str);
}

/// Forwards diagnostics to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn warn(&self, message: &str) {
        warn!(target: "tracker::pagination", "{}", message);
    }

    fn error(&self, message: &str) {
        error!(target: "tracker::pagination", "{}", message);
    }
}

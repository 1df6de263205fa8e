//! Workflow outcome type.

use serde::Serialize;

/// The result of a multi-step workflow.
///
/// `Partial` means the primary resource was committed but a dependent step
/// failed afterwards. It maps to HTTP 207 so the caller receives both the
/// created resource and the failure detail, and can retry just the missing
/// step.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum WorkflowOutcome<T> {
    /// Every step succeeded.
    Complete(T),
    /// The document was committed; a dependent step failed.
    Partial {
        /// The committed resource.
        value: T,
        /// What failed downstream.
        warning: String,
    },
}

impl<T> WorkflowOutcome<T> {
    /// The HTTP status this outcome maps to.
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::Complete(_) => 200,
            Self::Partial { .. } => 207,
        }
    }

    /// Whether a dependent step failed.
    #[must_use]
    pub const fn is_partial(&self) -> bool {
        matches!(self, Self::Partial { .. })
    }

    /// Borrows the committed resource.
    #[must_use]
    pub const fn value(&self) -> &T {
        match self {
            Self::Complete(value) | Self::Partial { value, .. } => value,
        }
    }

    /// Consumes the outcome, returning the committed resource.
    #[must_use]
    pub fn into_value(self) -> T {
        match self {
            Self::Complete(value) | Self::Partial { value, .. } => value,
        }
    }
}

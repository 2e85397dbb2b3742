//! Typed result of a best-effort remote step.

use serde::Serialize;

/// Outcome of mirroring local state onto the platform.
///
/// A mirror step never fails the operation that triggered it; the outcome is
/// logged and, for registration, returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MirrorOutcome<T> {
    Success(T),
    Skipped { reason: String },
    Failed { error: String },
}

impl<T> MirrorOutcome<T> {
    pub fn skipped(reason: impl Into<String>) -> Self {
        Self::Skipped {
            reason: reason.into(),
        }
    }

    pub fn failed(error: impl ToString) -> Self {
        Self::Failed {
            error: error.to_string(),
        }
    }

    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SyncError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    Normal,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
}

impl StatusMessage {
    #[must_use]
    pub fn normal(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Normal,
            text: text.into(),
        }
    }

    #[must_use]
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Success,
            text: text.into(),
        }
    }

    #[must_use]
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Error,
            text: text.into(),
        }
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.kind == StatusKind::Error
    }
}

impl From<&SyncError> for StatusMessage {
    fn from(err: &SyncError) -> Self {
        Self::error(err.to_string())
    }
}

impl fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Counts reported by the registry for one accepted import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub added: u64,
    pub updated: u64,
}

impl ImportSummary {
    #[must_use]
    pub fn status(&self) -> StatusMessage {
        StatusMessage::success(format!(
            "Success! Added: {}, Updated: {}",
            self.added, self.updated
        ))
    }
}

pub type SyncOutcome = Result<ImportSummary, SyncError>;

#[must_use]
pub fn outcome_status(outcome: &SyncOutcome) -> StatusMessage {
    match outcome {
        Ok(summary) => summary.status(),
        Err(err) => StatusMessage::from(err),
    }
}

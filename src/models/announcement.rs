use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::duration::{DurationError, DurationFormData};

/// Maximum announcement message length in Unicode characters, after trim.
pub const MAX_MESSAGE_CHARS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Info,
    Warn,
}

/// A scheduled operator-authored notice shown platform-wide during its
/// window. Server-authoritative: `id` and `created_at` are assigned on
/// creation and no field is ever edited in place — the only mutations are
/// create and delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    pub id: Uuid,
    pub message: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub severity: Severity,
    pub created_at: DateTime<Utc>,
}

impl Announcement {
    /// Half-open window intersection: windows that merely touch do not
    /// overlap.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start_date < end && start < self.end_date
    }
}

/// Create-request body for a new announcement.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnouncementDraft {
    pub message: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub severity: Severity,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("message must not be empty")]
    MessageEmpty,
    #[error("message must be at most {MAX_MESSAGE_CHARS} characters")]
    MessageTooLong,
    #[error("end date must be strictly after start date")]
    EndNotAfterStart,
    #[error(transparent)]
    Duration(#[from] DurationError),
}

impl ValidationError {
    /// Form field the error belongs to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::MessageEmpty | Self::MessageTooLong => "message",
            Self::EndNotAfterStart => "endDate",
            Self::Duration(_) => "duration",
        }
    }

    /// Stable localization key for the inline form message.
    pub fn message_key(&self) -> &'static str {
        match self {
            Self::MessageEmpty => "announcement.validation.messageRequired",
            Self::MessageTooLong => "announcement.validation.messageTooLong",
            Self::EndNotAfterStart => "announcement.validation.endBeforeStart",
            Self::Duration(DurationError::UnitMustBeNonNegative) => {
                "announcement.validation.unitMustBeNonNegative"
            }
            Self::Duration(DurationError::DurationRequired) => {
                "announcement.validation.durationRequired"
            }
            Self::Duration(DurationError::Malformed(_)) => {
                "announcement.validation.durationInvalid"
            }
        }
    }
}

impl AnnouncementDraft {
    /// Build a draft from a duration form: the window starts at `start`
    /// and ends after the given span.
    pub fn with_duration(
        message: impl Into<String>,
        severity: Severity,
        start: DateTime<Utc>,
        duration: &DurationFormData,
    ) -> Result<Self, ValidationError> {
        let (start_date, end_date) = duration.to_window(start)?;
        let draft = Self {
            message: message.into(),
            start_date,
            end_date,
            severity,
        };
        draft.validate()?;
        Ok(draft)
    }

    /// Client-side invariant check, run before submission. The server runs
    /// the same check again and remains the final authority.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let message = self.message.trim();
        if message.is_empty() {
            return Err(ValidationError::MessageEmpty);
        }
        if message.chars().count() > MAX_MESSAGE_CHARS {
            return Err(ValidationError::MessageTooLong);
        }
        if self.end_date <= self.start_date {
            return Err(ValidationError::EndNotAfterStart);
        }
        Ok(())
    }
}

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use uuid::Uuid;

/// Length of a complete cap serial code.
pub const SERIAL_CODE_LENGTH: usize = 12;

/// Upper bound on images held in one scanning batch.
pub const MAX_BATCH_IMAGES: usize = 15;

/// Removes every space and line break from a raw service response.
/// Trimming of leading/trailing whitespace happens when the response is
/// received; this additionally strips interior whitespace before the
/// length check.
pub fn clean_code(raw: &str) -> String {
    raw.chars()
        .filter(|c| !matches!(c, ' ' | '\n' | '\r'))
        .collect()
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScanOutcome {
    Recognized { raw: String },
    Failed { message: String },
}

impl ScanOutcome {
    pub fn recognized(raw: impl Into<String>) -> Self {
        ScanOutcome::Recognized { raw: raw.into() }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        ScanOutcome::Failed {
            message: message.into(),
        }
    }

    /// The serial code with interior whitespace removed, absent for failures.
    pub fn cleaned(&self) -> Option<String> {
        match self {
            ScanOutcome::Recognized { raw } => Some(clean_code(raw)),
            ScanOutcome::Failed { .. } => None,
        }
    }

    /// True iff the cleaned code has exactly [`SERIAL_CODE_LENGTH`] characters.
    /// Failures are never complete; the length check does not apply to them.
    pub fn is_complete(&self) -> bool {
        self.cleaned()
            .map(|code| code.chars().count() == SERIAL_CODE_LENGTH)
            .unwrap_or(false)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ScanResponse {
    pub identity: String,
    pub file_name: String,
    /// True when the result was served from the session cache without a new
    /// recognition call.
    pub cached: bool,
    pub outcome: ScanOutcome,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct BatchScanResponse {
    pub session_id: Uuid,
    pub results: Vec<ScanResponse>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ResetResponse {
    pub session_id: Uuid,
    pub cleared: usize,
}

/// Which input surface is active in the UI.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumString)]
pub enum ScanMode {
    Batch,
    Camera,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_code_strips_spaces_and_newlines() {
        assert_eq!(clean_code(" AB12 CD34\nEF56 "), "AB12CD34EF56");
        assert_eq!(clean_code("AB12\r\nCD34"), "AB12CD34");
        assert_eq!(clean_code(""), "");
    }

    #[test]
    fn completeness_requires_exactly_twelve_characters() {
        for len in 0..30 {
            let outcome = ScanOutcome::recognized("A".repeat(len));
            assert_eq!(outcome.is_complete(), len == SERIAL_CODE_LENGTH);
        }
    }

    #[test]
    fn completeness_ignores_whitespace() {
        let outcome = ScanOutcome::recognized(" AB12 CD34\nEF56 ");
        assert_eq!(outcome.cleaned().unwrap(), "AB12CD34EF56");
        assert!(outcome.is_complete());
    }

    #[test]
    fn failures_have_no_code_and_are_never_complete() {
        let outcome = ScanOutcome::failed("invalid credential");
        assert_eq!(outcome.cleaned(), None);
        assert!(!outcome.is_complete());
    }

    #[test]
    fn outcome_serializes_with_status_tag() {
        let json = serde_json::to_value(ScanOutcome::recognized("AB12CD34EF56")).unwrap();
        assert_eq!(json["status"], "recognized");
        let json = serde_json::to_value(ScanOutcome::failed("boom")).unwrap();
        assert_eq!(json["status"], "failed");
    }
}

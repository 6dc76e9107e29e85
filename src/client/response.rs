//! Response bodies returned by the time-tracking backend.
//!
//! This module maps raw HTTP status and body text onto [`ClockOutcome`]
//! and extracts user-visible error text from failed responses.

use serde::{Deserialize, Serialize};

use crate::models::{ActiveRecord, ClockAction, ClockOutcome, EmployeeRef};

/// Fallback text for a failed clock decision without an `error` field.
pub const REQUEST_FAILED_MESSAGE: &str = "Request failed";

/// Text for a success status whose body is not a known decision.
pub const UNEXPECTED_RESPONSE_MESSAGE: &str = "Unexpected response from server";

/// Successful body of the clock-decision endpoint, tagged by `status`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ClockDecisionResponse {
    /// `{status: "ok", action, employee, time}`
    Ok {
        /// What was recorded.
        action: ClockAction,
        /// Employee display name.
        employee: String,
        /// Recorded time, preformatted.
        time: String,
    },
    /// `{status: "approval_required", employee, active_record}`
    ApprovalRequired {
        /// The employee who entered the PIN.
        employee: EmployeeRef,
        /// The incumbent's open record.
        active_record: ActiveRecord,
    },
}

impl From<ClockDecisionResponse> for ClockOutcome {
    fn from(response: ClockDecisionResponse) -> Self {
        match response {
            ClockDecisionResponse::Ok {
                action,
                employee,
                time,
            } => ClockOutcome::Success {
                employee_name: employee,
                action,
                time,
            },
            ClockDecisionResponse::ApprovalRequired {
                employee,
                active_record,
            } => ClockOutcome::ApprovalRequired {
                requesting_employee: employee,
                active_record,
            },
        }
    }
}

/// Error body shape shared by all endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
}

/// Body of the backend health check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendStatus {
    /// `"ok"` when the backend is healthy.
    pub status: String,
    /// Application name reported by the backend.
    #[serde(default)]
    pub app: Option<String>,
}

/// Returns the body's `error` text, or `fallback` when there is none.
pub fn error_message(body: &str, fallback: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.error)
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

/// Maps a clock-decision HTTP response onto a [`ClockOutcome`].
pub fn clock_outcome_from_response(status: u16, body: &str) -> ClockOutcome {
    if !(200..300).contains(&status) {
        return ClockOutcome::Failure {
            message: error_message(body, REQUEST_FAILED_MESSAGE),
        };
    }
    match serde_json::from_str::<ClockDecisionResponse>(body) {
        Ok(decision) => decision.into(),
        Err(_) => ClockOutcome::Failure {
            message: UNEXPECTED_RESPONSE_MESSAGE.to_string(),
        },
    }
}

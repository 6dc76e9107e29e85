//! Clock decision outcomes and the records they reference.
//!
//! A [`ClockOutcome`] is produced once per PIN submission and never changes
//! afterwards. The session uses it to pick a view, and an approval-required
//! outcome seeds the approval workflow.

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};

const DISPLAY_TIME_FORMAT: &str = "%I:%M %p";

/// Whether the backend recorded the start or the end of a shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClockAction {
    /// A shift was started.
    ClockIn,
    /// A shift was ended.
    ClockOut,
}

impl ClockAction {
    /// Greeting shown on the success view.
    pub fn greeting(&self) -> &'static str {
        match self {
            ClockAction::ClockIn => "Hello",
            ClockAction::ClockOut => "Goodbye",
        }
    }

    /// Caption shown above the recorded time.
    pub fn caption(&self) -> &'static str {
        match self {
            ClockAction::ClockIn => "Clock in recorded",
            ClockAction::ClockOut => "Clock out recorded",
        }
    }
}

/// An employee as referenced by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeRef {
    /// Backend employee id.
    pub id: i64,
    /// Display name.
    pub name: String,
}

/// The open attendance record of the incumbent employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveRecord {
    /// Attendance record id, used by force-clockout.
    pub id: i64,
    /// Id of the employee who owns the record. This is the approver for a dual shift.
    pub employee_id: i64,
    /// Name of the employee who owns the record.
    pub employee_name: String,
    /// Shift start as sent by the backend (ISO-8601 or preformatted).
    pub clock_in: String,
}

impl ActiveRecord {
    /// Returns the shift start as `hh:mm AM/PM`.
    ///
    /// ISO-8601 timestamps (with or without offset) are reformatted; anything
    /// else is returned unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use workclock_kiosk::models::ActiveRecord;
    ///
    /// let record = ActiveRecord {
    ///     id: 9,
    ///     employee_id: 1,
    ///     employee_name: "Alice".to_string(),
    ///     clock_in: "2025-03-04T14:05:00".to_string(),
    /// };
    /// assert_eq!(record.clock_in_display(), "02:05 PM");
    /// ```
    pub fn clock_in_display(&self) -> String {
        if let Ok(timestamp) = DateTime::parse_from_rfc3339(&self.clock_in) {
            return timestamp.format(DISPLAY_TIME_FORMAT).to_string();
        }
        if let Ok(timestamp) = self.clock_in.parse::<NaiveDateTime>() {
            return timestamp.format(DISPLAY_TIME_FORMAT).to_string();
        }
        self.clock_in.clone()
    }
}

/// The result of one PIN submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClockOutcome {
    /// The backend clocked the employee in or out.
    Success {
        /// Name of the employee who clocked.
        employee_name: String,
        /// What was recorded.
        action: ClockAction,
        /// Recorded time, already formatted by the backend.
        time: String,
    },
    /// Another employee is still clocked in and must sign off on the overlap.
    ApprovalRequired {
        /// The employee who entered the PIN.
        requesting_employee: EmployeeRef,
        /// The incumbent's open record.
        active_record: ActiveRecord,
    },
    /// The submission failed; `message` is shown to the user.
    Failure {
        /// Server-supplied or generic error text.
        message: String,
    },
}

impl ClockOutcome {
    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ClockOutcome::Success { .. } => "success",
            ClockOutcome::ApprovalRequired { .. } => "approval_required",
            ClockOutcome::Failure { .. } => "failure",
        }
    }
}

/// Device position captured by the kiosk shell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lng: f64,
}

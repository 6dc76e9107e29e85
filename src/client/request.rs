//! Request bodies sent to the time-tracking backend.

use std::fmt;

use serde::Serialize;

use crate::models::Location;

/// Body of the clock-decision request.
///
/// Without a location the body is exactly `{"pin": "..."}`. Backends that
/// read `gps_lat`/`gps_lng` only from form fields ignore the JSON location.
#[derive(Clone, Serialize)]
pub struct ClockRequest {
    /// The PIN as typed.
    pub pin: String,
    /// Latitude of the kiosk, when the shell captured one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gps_lat: Option<f64>,
    /// Longitude of the kiosk, when the shell captured one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gps_lng: Option<f64>,
}

impl ClockRequest {
    /// Builds the request for a PIN and an optional kiosk position.
    pub fn new(pin: impl Into<String>, location: Option<Location>) -> Self {
        Self {
            pin: pin.into(),
            gps_lat: location.map(|l| l.lat),
            gps_lng: location.map(|l| l.lng),
        }
    }
}

impl fmt::Debug for ClockRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClockRequest")
            .field("pin", &"****")
            .field("gps_lat", &self.gps_lat)
            .field("gps_lng", &self.gps_lng)
            .finish()
    }
}

/// Body of the force-clockout request.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ForceClockoutRequest {
    /// The incumbent's open attendance record.
    pub active_record_id: i64,
}

/// Body of the dual-shift approval request.
///
/// `approver_id` is always the owner of the active record, and
/// `approver_pin` is whatever was typed on the approver keypad. The kiosk
/// does not check that the PIN belongs to the approver; the backend does,
/// and rejects the request otherwise.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct ShiftApproval {
    /// The incumbent employee consenting to the overlap.
    pub approver_id: i64,
    /// The employee who wants to start a shift.
    pub new_employee_id: i64,
    /// PIN typed for the incumbent.
    pub approver_pin: String,
    /// Why the shifts overlap.
    pub reason: String,
}

impl fmt::Debug for ShiftApproval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShiftApproval")
            .field("approver_id", &self.approver_id)
            .field("new_employee_id", &self.new_employee_id)
            .field("approver_pin", &"****")
            .field("reason", &self.reason)
            .finish()
    }
}

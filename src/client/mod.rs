//! Client side of the time-tracking backend.
//!
//! The [`KioskBackend`] trait is the seam between the kiosk workflow and
//! the network: the runtime only ever talks to a backend through it, and
//! [`HttpBackend`] is the production implementation.

mod http;
mod request;
mod response;

use async_trait::async_trait;

use crate::error::KioskResult;
use crate::models::{ClockOutcome, Location};

pub use http::{APPROVAL_FAILED_MESSAGE, FORCE_CLOCKOUT_FAILED_MESSAGE, HttpBackend};
pub use request::{ClockRequest, ForceClockoutRequest, ShiftApproval};
pub use response::{
    BackendStatus, ClockDecisionResponse, REQUEST_FAILED_MESSAGE, UNEXPECTED_RESPONSE_MESSAGE,
    clock_outcome_from_response, error_message,
};

/// Operations the kiosk needs from the time-tracking backend.
#[async_trait]
pub trait KioskBackend: Send + Sync {
    /// Submits a completed PIN to the clock-decision endpoint.
    ///
    /// Never fails: transport errors and rejections become
    /// [`ClockOutcome::Failure`] with the text to show.
    async fn submit_pin(&self, pin: &str, location: Option<Location>) -> ClockOutcome;

    /// Ends the incumbent's shift without their approval.
    async fn force_clockout(&self, active_record_id: i64) -> KioskResult<()>;

    /// Starts a dual shift with the incumbent's PIN as consent.
    async fn approve_shift(&self, approval: ShiftApproval) -> KioskResult<()>;

    /// Checks that the backend is up.
    async fn status(&self) -> KioskResult<BackendStatus>;
}

//! Core data models for the kiosk.
//!
//! This module contains the keypad buffer and the clock decision types
//! shared by the client, the approval workflow and the session.

mod outcome;
mod pin;

pub use outcome::{ActiveRecord, ClockAction, ClockOutcome, EmployeeRef, Location};
pub use pin::{PinBuffer, PinInput};

//! PIN kiosk engine for WorkClock employee time tracking
//!
//! This crate drives a wall-mounted clock-in kiosk: it collects a 4-digit
//! PIN, submits it to the time-tracking backend, and walks a supervisor
//! through the dual-shift approval flow when the backend reports a conflict.

#![warn(missing_docs)]

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod workflow;

//! Application state for the kiosk controller API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use crate::workflow::KioskHandle;

/// Shared application state.
///
/// Holds the handle of the running kiosk; every handler talks to the
/// session through it.
#[derive(Clone)]
pub struct AppState {
    kiosk: KioskHandle,
}

impl AppState {
    /// Creates a new application state around a running kiosk.
    pub fn new(kiosk: KioskHandle) -> Self {
        Self { kiosk }
    }

    /// Returns the kiosk handle.
    pub fn kiosk(&self) -> &KioskHandle {
        &self.kiosk
    }
}

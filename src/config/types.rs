//! Configuration types for the kiosk.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from the YAML configuration file. Every field has a
//! default so a partial file (or no file at all) yields a working kiosk.

use std::net::SocketAddr;
use std::time::Duration;

use serde::Deserialize;

/// Top-level kiosk configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct KioskConfig {
    /// Where and how to reach the time-tracking backend.
    pub backend: BackendConfig,
    /// Keypad and banner behaviour.
    pub kiosk: KioskSettings,
    /// The local controller API.
    pub server: ServerConfig,
}

/// Backend connection settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the backend, without a trailing slash (e.g., "http://localhost:5000").
    pub base_url: String,
    /// Path of the clock-decision endpoint.
    pub clock_path: String,
    /// Path of the force-clockout endpoint.
    pub force_clockout_path: String,
    /// Path of the dual-shift approval endpoint.
    pub approve_shift_path: String,
    /// Path of the health check endpoint.
    pub status_path: String,
    /// Timeout for establishing a connection, in milliseconds.
    pub connect_timeout_ms: u64,
    /// Timeout for a whole request, in milliseconds.
    pub request_timeout_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            clock_path: "/clock".to_string(),
            force_clockout_path: "/force_clockout".to_string(),
            approve_shift_path: "/approve_shift".to_string(),
            status_path: "/api/status".to_string(),
            connect_timeout_ms: 5_000,
            request_timeout_ms: 10_000,
        }
    }
}

impl BackendConfig {
    /// Joins the base URL and an endpoint path.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Connect timeout as a [`Duration`].
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Request timeout as a [`Duration`].
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Keypad and banner behaviour.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct KioskSettings {
    /// Number of digits in an employee PIN.
    pub pin_length: usize,
    /// How long the success view stays up, in milliseconds.
    pub success_display_ms: u64,
    /// How long an error banner stays up, in milliseconds.
    pub error_display_ms: u64,
}

impl Default for KioskSettings {
    fn default() -> Self {
        Self {
            pin_length: 4,
            success_display_ms: 5_000,
            error_display_ms: 3_000,
        }
    }
}

impl KioskSettings {
    /// Success view lifetime.
    pub fn success_display(&self) -> Duration {
        Duration::from_millis(self.success_display_ms)
    }

    /// Error banner lifetime.
    pub fn error_display(&self) -> Duration {
        Duration::from_millis(self.error_display_ms)
    }
}

/// Controller API settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the controller API listens on.
    pub bind: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8080)),
        }
    }
}

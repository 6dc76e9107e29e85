//! Configuration loading and management for the kiosk.
//!
//! This module loads the kiosk configuration from a YAML file: backend
//! location and endpoint paths, keypad length, banner lifetimes and the
//! controller API bind address.
//!
//! # Example
//!
//! ```no_run
//! use workclock_kiosk::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/kiosk.yaml").unwrap();
//! println!("PIN length: {}", config.config().kiosk.pin_length);
//! ```

mod loader;
mod types;

pub use loader::{BACKEND_URL_ENV, BIND_ENV, ConfigLoader};
pub use types::{BackendConfig, KioskConfig, KioskSettings, ServerConfig};

//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading the kiosk
//! configuration from a YAML file and applying environment overrides.

use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;

use tracing::debug;

use crate::error::{KioskError, KioskResult};

use super::types::KioskConfig;

/// Environment variable overriding `backend.base_url`.
pub const BACKEND_URL_ENV: &str = "KIOSK_BACKEND_URL";

/// Environment variable overriding `server.bind`.
pub const BIND_ENV: &str = "KIOSK_BIND";

const MAX_PIN_LENGTH: usize = 12;

/// Loads and provides access to the kiosk configuration.
///
/// # Example
///
/// ```no_run
/// use workclock_kiosk::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/kiosk.yaml")?;
/// println!("Backend: {}", loader.config().backend.base_url);
/// # Ok::<(), workclock_kiosk::error::KioskError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: KioskConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified YAML file and validates it.
    ///
    /// Returns an error if the file is missing, is not valid YAML, or holds
    /// values the kiosk cannot run with.
    pub fn load<P: AsRef<Path>>(path: P) -> KioskResult<Self> {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| KioskError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        let config: KioskConfig =
            serde_yaml::from_str(&content).map_err(|e| KioskError::ConfigParseError {
                path: path_str.clone(),
                message: e.to_string(),
            })?;

        debug!(path = %path_str, "Loaded kiosk configuration");
        Self::from_config(config)
    }

    /// Wraps an in-memory configuration after validating it.
    pub fn from_config(config: KioskConfig) -> KioskResult<Self> {
        validate(&config)?;
        Ok(Self { config })
    }

    /// Applies `KIOSK_BACKEND_URL` and `KIOSK_BIND` from the process environment.
    pub fn with_env_overrides(self) -> KioskResult<Self> {
        self.with_overrides(env::var(BACKEND_URL_ENV).ok(), env::var(BIND_ENV).ok())
    }

    fn with_overrides(
        mut self,
        backend_url: Option<String>,
        bind: Option<String>,
    ) -> KioskResult<Self> {
        if let Some(url) = backend_url {
            self.config.backend.base_url = url;
        }
        if let Some(bind) = bind {
            let addr = bind.parse::<SocketAddr>().map_err(|e| KioskError::InvalidConfig {
                field: "server.bind".to_string(),
                message: format!("'{}': {}", bind, e),
            })?;
            self.config.server.bind = addr;
        }
        validate(&self.config)?;
        Ok(self)
    }

    /// Returns the loaded configuration.
    pub fn config(&self) -> &KioskConfig {
        &self.config
    }

    /// Consumes the loader and returns the configuration.
    pub fn into_config(self) -> KioskConfig {
        self.config
    }
}

fn validate(config: &KioskConfig) -> KioskResult<()> {
    let invalid = |field: &str, message: &str| KioskError::InvalidConfig {
        field: field.to_string(),
        message: message.to_string(),
    };

    if config.backend.base_url.trim().is_empty() {
        return Err(invalid("backend.base_url", "must not be empty"));
    }
    if !(1..=MAX_PIN_LENGTH).contains(&config.kiosk.pin_length) {
        return Err(invalid(
            "kiosk.pin_length",
            &format!("must be between 1 and {}", MAX_PIN_LENGTH),
        ));
    }
    if config.kiosk.success_display_ms == 0 {
        return Err(invalid("kiosk.success_display_ms", "must be greater than zero"));
    }
    if config.kiosk.error_display_ms == 0 {
        return Err(invalid("kiosk.error_display_ms", "must be greater than zero"));
    }
    Ok(())
}

//! Configuration management with serde serialization/deserialization
//!
//! Defaults mirror the constants the tool ships with: 5 concurrent pages per
//! device, a 30 second navigation timeout, and a 3000-4000 port range for the
//! ephemeral server.

use crate::{default_target_devices, CaptureError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration for a capture run.
///
/// # Examples
///
/// ```rust
/// use verishot::CaptureConfig;
///
/// let config = CaptureConfig {
///     concurrency: 2,
///     devices: vec!["Desktop Chrome".to_string()],
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CaptureConfig {
    /// Max concurrent pages open per device (default: 5)
    pub concurrency: usize,

    /// Timeout covering navigation plus the network-idle wait (default: 30s)
    pub navigation_timeout: Duration,

    /// Host the ephemeral server binds to (default: 127.0.0.1)
    pub host: String,

    /// Lower bound of the random port range (default: 3000)
    pub port_min: u16,

    /// Upper bound of the random port range, inclusive (default: 4000)
    pub port_max: u16,

    /// Bind attempts before giving up with a port-exhaustion error
    /// (default: 10)
    pub bind_attempts: u32,

    /// Root for screenshot output, resolved against the run's working
    /// directory when relative (default: "verification")
    pub output_root: PathBuf,

    /// Device names to capture, processed strictly in order
    pub devices: Vec<String>,

    /// Path to Chrome/Chromium executable (default: auto-detect)
    pub chrome_path: Option<String>,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            concurrency: 5,
            navigation_timeout: Duration::from_secs(30),
            host: "127.0.0.1".to_string(),
            port_min: 3000,
            port_max: 4000,
            bind_attempts: 10,
            output_root: PathBuf::from("verification"),
            devices: default_target_devices(),
            chrome_path: None,
        }
    }
}

impl CaptureConfig {
    pub fn validate(&self) -> Result<(), CaptureError> {
        if self.concurrency == 0 {
            return Err(CaptureError::Config(
                "Concurrency must be greater than 0".to_string(),
            ));
        }
        if self.navigation_timeout.is_zero() {
            return Err(CaptureError::Config(
                "Navigation timeout must be greater than 0".to_string(),
            ));
        }
        if self.port_min > self.port_max {
            return Err(CaptureError::Config(format!(
                "Invalid port range: {}-{}",
                self.port_min, self.port_max
            )));
        }
        if self.bind_attempts == 0 {
            return Err(CaptureError::Config(
                "Bind attempts must be greater than 0".to_string(),
            ));
        }
        if self.devices.is_empty() {
            return Err(CaptureError::Config(
                "At least one target device is required".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = CaptureConfig::default();
        assert_eq!(config.concurrency, 5);
        assert_eq!(config.navigation_timeout, Duration::from_secs(30));
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port_min, 3000);
        assert_eq!(config.port_max, 4000);
        assert_eq!(config.bind_attempts, 10);
        assert_eq!(config.output_root, PathBuf::from("verification"));
        assert_eq!(config.devices.len(), 16);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let config = CaptureConfig {
            concurrency: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(CaptureError::Config(_))));

        let config = CaptureConfig {
            port_min: 5000,
            port_max: 4000,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(CaptureError::Config(_))));

        let config = CaptureConfig {
            devices: Vec::new(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(CaptureError::Config(_))));
    }

    #[test]
    fn test_config_json_round_trip() {
        let config = CaptureConfig {
            concurrency: 3,
            devices: vec!["Desktop Chrome".to_string()],
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let parsed: CaptureConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.concurrency, 3);
        assert_eq!(parsed.devices, config.devices);
        assert_eq!(parsed.navigation_timeout, config.navigation_timeout);
    }
}

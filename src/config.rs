//! Configuration for the cafebot gateway

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::Result;

/// Gateway configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Optional TOML menu file; the built-in menu is used when absent
    pub menu_path: Option<PathBuf>,

    /// Multiplier on all simulated delays (payment, movement, camera).
    /// 1.0 is real-time simulation; 0.0 disables delays for tests.
    pub delay_scale: f64,

    /// Simulated payment-processing time in milliseconds, before scaling
    pub payment_delay_ms: u64,

    /// Robot battery level at startup (0-100)
    pub robot_battery: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            menu_path: None,
            delay_scale: 1.0,
            payment_delay_ms: 2000,
            robot_battery: 85,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&raw)?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// A configuration with all simulated delays disabled, for tests
    #[must_use]
    pub fn instant() -> Self {
        Self {
            delay_scale: 0.0,
            payment_delay_ms: 0,
            ..Self::default()
        }
    }

    /// Effective payment delay after scaling
    #[must_use]
    pub fn payment_delay(&self) -> std::time::Duration {
        #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        std::time::Duration::from_millis((self.payment_delay_ms as f64 * self.delay_scale) as u64)
    }
}

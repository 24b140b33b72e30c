//! Process settings
//!
//! Layered configuration: built-in defaults, then an optional
//! `twin-monitor.toml` file, then `TWIN_`-prefixed environment variables.

use crate::rate_limit::RateLimitConfig;
use serde::Deserialize;

/// MQTT broker settings; absent means notifications are dropped
#[derive(Debug, Clone, Deserialize)]
pub struct MqttSettings {
    pub host: String,
    #[serde(default = "default_mqtt_port")]
    pub port: u16,
}

fn default_mqtt_port() -> u16 {
    1883
}

/// Sweep settings
#[derive(Debug, Clone, Deserialize)]
pub struct SweepSettings {
    pub interval_secs: u64,
    pub lookback_secs: i64,
}

/// Top-level process settings
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub listen_addr: String,
    /// Site identifier stamped into notification envelopes
    pub site_id: String,
    /// Trailing telemetry window attached to new faults (seconds)
    pub history_window_secs: i64,
    pub sweep: SweepSettings,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    pub mqtt: Option<MqttSettings>,
}

impl Settings {
    /// Load settings from defaults, file, and environment
    pub fn load() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .set_default("listen_addr", "0.0.0.0:8080")?
            .set_default("site_id", "default")?
            .set_default("history_window_secs", 3600)?
            .set_default("sweep.interval_secs", 300)?
            .set_default("sweep.lookback_secs", 300)?
            .add_source(config::File::with_name("twin-monitor").required(false))
            .add_source(config::Environment::with_prefix("TWIN").separator("__"))
            .build()?
            .try_deserialize()
    }
}

use std::time::Duration;

use config::{Config, ConfigError, Environment};
use serde::Deserialize;
use tracer_core::app::PollPolicy;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub stream: StreamSettings,
    pub store: StoreSettings,
    pub poll: PollSettings,
    pub telemetry: TelemetrySettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StreamSettings {
    /// Stream / entity the envelopes are published to
    #[serde(default = "default_stream_destination")]
    pub destination: String,
    /// How long the relay waits for a message before checking for shutdown
    #[serde(default = "default_stream_receive_timeout_ms")]
    pub receive_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreSettings {
    #[serde(default = "default_store_database")]
    pub database: String,
    #[serde(default = "default_store_collection")]
    pub collection: String,
}

/// Settings for waiting on the stages of a trace.
#[derive(Debug, Clone, Deserialize)]
pub struct PollSettings {
    #[serde(default = "default_poll_base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default = "default_poll_multiplier")]
    pub multiplier: f64,
    #[serde(default = "default_poll_max_delay_ms")]
    pub max_delay_ms: u64,
    #[serde(default = "default_poll_max_attempts")]
    pub max_attempts: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelemetrySettings {
    /// `EnvFilter` directive used when RUST_LOG is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// `text` or `json`
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        // TRACER__STREAM__DESTINATION=tracehub
        Self::load(
            Environment::with_prefix("TRACER")
                .separator("__")
                .try_parsing(true),
        )
    }

    fn load(environment: Environment) -> Result<Self, ConfigError> {
        Config::builder()
            // Built-in defaults to avoid missing-section errors
            .set_default("stream.destination", default_stream_destination())?
            .set_default(
                "stream.receive_timeout_ms",
                default_stream_receive_timeout_ms() as i64,
            )?
            .set_default("store.database", default_store_database())?
            .set_default("store.collection", default_store_collection())?
            .set_default("poll.base_delay_ms", default_poll_base_delay_ms() as i64)?
            .set_default("poll.multiplier", default_poll_multiplier())?
            .set_default("poll.max_delay_ms", default_poll_max_delay_ms() as i64)?
            .set_default("poll.max_attempts", default_poll_max_attempts() as i64)?
            .set_default("telemetry.log_level", default_log_level())?
            .set_default("telemetry.log_format", default_log_format())?
            .add_source(environment)
            .build()?
            .try_deserialize()
    }
}

impl StreamSettings {
    pub fn receive_timeout(&self) -> Duration {
        Duration::from_millis(self.receive_timeout_ms)
    }
}

impl StoreSettings {
    /// `dbs/{database}/colls/{collection}`
    pub fn collection_path(&self) -> String {
        format!("dbs/{}/colls/{}", self.database, self.collection)
    }
}

impl PollSettings {
    /// Fails when `multiplier` would make delays shrink or is not a number.
    pub fn policy(&self) -> Result<PollPolicy, ConfigError> {
        if !self.multiplier.is_finite() || self.multiplier < 1.0 {
            return Err(ConfigError::Message(format!(
                "poll.multiplier must be a finite number >= 1.0, got {}",
                self.multiplier
            )));
        }
        Ok(PollPolicy::new(
            Duration::from_millis(self.base_delay_ms),
            self.multiplier,
            self.max_attempts,
        )
        .with_max_delay(Duration::from_millis(self.max_delay_ms)))
    }
}

fn default_stream_destination() -> String {
    "tracehub".to_string()
}

fn default_stream_receive_timeout_ms() -> u64 {
    200
}

fn default_store_database() -> String {
    "tracedb".to_string()
}

fn default_store_collection() -> String {
    "tracelog".to_string()
}

fn default_poll_base_delay_ms() -> u64 {
    100
}

fn default_poll_multiplier() -> f64 {
    2.0
}

fn default_poll_max_delay_ms() -> u64 {
    2_000
}

fn default_poll_max_attempts() -> u32 {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

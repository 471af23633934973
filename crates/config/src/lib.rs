use std::path::Path;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

mod logging;
pub use logging::{LogFormat, LogLevel, LoggingConfig};

const WEEK: Duration = Duration::from_secs(7 * 24 * 60 * 60);

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("`{0}` must be greater than zero")]
    ZeroPeriod(&'static str),

    #[error("`{0}` must be greater than zero")]
    ZeroLimit(&'static str),
}

/// Metrics configuration options
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Register the module metrics in the global registry
    #[serde(default)]
    pub enabled: bool,
}

/// Provider module parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Timeout of packets sent to consumers, relative to the send time
    #[serde(default = "default_ccv_timeout_period", with = "humantime_serde")]
    pub ccv_timeout_period: Duration,

    /// Maximum time a consumer may take to report maturity of a validator set change
    /// before it is considered faulty and its channel is closed
    #[serde(default = "default_vsc_timeout_period", with = "humantime_serde")]
    pub vsc_timeout_period: Duration,

    /// Maximum number of validator set change packets buffered for a consumer
    /// whose channel is not established yet
    #[serde(default = "default_max_pending_vsc_packets")]
    pub max_pending_vsc_packets_per_chain: usize,

    /// Log configuration options
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Metrics configuration options
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            ccv_timeout_period: default_ccv_timeout_period(),
            vsc_timeout_period: default_vsc_timeout_period(),
            max_pending_vsc_packets_per_chain: default_max_pending_vsc_packets(),
            logging: LoggingConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl ProviderConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ccv_timeout_period.is_zero() {
            return Err(ConfigError::ZeroPeriod("ccv_timeout_period"));
        }

        if self.vsc_timeout_period.is_zero() {
            return Err(ConfigError::ZeroPeriod("vsc_timeout_period"));
        }

        if self.max_pending_vsc_packets_per_chain == 0 {
            return Err(ConfigError::ZeroLimit("max_pending_vsc_packets_per_chain"));
        }

        Ok(())
    }
}

/// Consumer module parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConsumerConfig {
    /// Timeout of packets sent to the provider, relative to the send time
    #[serde(default = "default_ccv_timeout_period", with = "humantime_serde")]
    pub ccv_timeout_period: Duration,

    /// Time after which a validator set change received from the provider matures
    #[serde(default = "default_unbonding_period", with = "humantime_serde")]
    pub unbonding_period: Duration,

    /// Blocks between a validator set change and the height at which it takes effect
    #[serde(default = "default_validator_update_delay")]
    pub validator_update_delay: u64,

    /// Log configuration options
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Metrics configuration options
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            ccv_timeout_period: default_ccv_timeout_period(),
            unbonding_period: default_unbonding_period(),
            validator_update_delay: default_validator_update_delay(),
            logging: LoggingConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl ConsumerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ccv_timeout_period.is_zero() {
            return Err(ConfigError::ZeroPeriod("ccv_timeout_period"));
        }

        if self.unbonding_period.is_zero() {
            return Err(ConfigError::ZeroPeriod("unbonding_period"));
        }

        Ok(())
    }
}

fn default_ccv_timeout_period() -> Duration {
    4 * WEEK
}

fn default_vsc_timeout_period() -> Duration {
    5 * WEEK
}

fn default_unbonding_period() -> Duration {
    3 * WEEK
}

fn default_max_pending_vsc_packets() -> usize {
    1000
}

fn default_validator_update_delay() -> u64 {
    1
}

/// Load a configuration from the TOML file at `path`, then apply overrides
/// from environment variables of the form `{prefix}__{SECTION}__{KEY}`.
pub fn load_config<T>(path: impl AsRef<Path>, prefix: &str) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let config = ::config::Config::builder()
        .add_source(::config::File::from(path.as_ref()))
        .add_source(::config::Environment::with_prefix(prefix).separator("__"))
        .build()?
        .try_deserialize()?;

    Ok(config)
}

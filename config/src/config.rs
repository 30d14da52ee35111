use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::base::BaseConfig;
use crate::cli::CliConfig;
use crate::networks::Network;
use crate::types::{FanOutLimits, StallPolicy};

pub const ENV_PREFIX: &str = "CHUNKS_";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing configuration field: {0}")]
    MissingField(String),
    #[error("invalid configuration field {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
    #[error("cannot parse configuration: {0}")]
    Parse(String),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub rpc_url: String,
    pub availability_url: Option<String>,
    pub shard_count: u64,
    pub stall_threshold: u32,
    pub poll_interval_ms: u64,
    pub rpc_timeout_ms: u64,
    pub probe_timeout_ms: u64,
    pub fanout_deadline_ms: u64,
    pub max_rpc_failures: u32,
    pub database_path: Option<PathBuf>,
}

impl Config {
    /// Layers the network preset, the toml file (keyed by network), `CHUNKS_*` environment
    /// variables and the command line, in increasing order of precedence.
    pub fn from_file(
        config_path: &Path,
        network: &str,
        cli_config: &CliConfig,
    ) -> Result<Self, ConfigError> {
        let base_config = match network.parse::<Network>() {
            Ok(network) => network.to_base_config(),
            Err(_) => BaseConfig::default(),
        };

        let base_provider = Serialized::from(base_config, network);
        let toml_provider = Toml::file(config_path).nested();
        let env_provider = Env::prefixed(ENV_PREFIX).profile(network);
        let cli_provider = cli_config.as_provider(network);

        let config: Config = Figment::new()
            .merge(base_provider)
            .merge(toml_provider)
            .merge(env_provider)
            .merge(cli_provider)
            .select(network)
            .extract()
            .map_err(|err| match &err.kind {
                figment::error::Kind::MissingField(field) => {
                    ConfigError::MissingField(field.to_string())
                }
                _ => ConfigError::Parse(err.to_string()),
            })?;

        config.validate()?;
        debug!(target: "chunks::config", ?config, "loaded configuration");

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        Url::parse(&self.rpc_url).map_err(|err| ConfigError::Invalid {
            field: "rpc_url",
            reason: err.to_string(),
        })?;

        if let Some(url) = &self.availability_url {
            Url::parse(url).map_err(|err| ConfigError::Invalid {
                field: "availability_url",
                reason: err.to_string(),
            })?;
        }

        if self.shard_count == 0 {
            return Err(ConfigError::Invalid {
                field: "shard_count",
                reason: "must be at least 1".to_string(),
            });
        }

        let durations = [
            ("poll_interval_ms", self.poll_interval_ms),
            ("rpc_timeout_ms", self.rpc_timeout_ms),
            ("probe_timeout_ms", self.probe_timeout_ms),
            ("fanout_deadline_ms", self.fanout_deadline_ms),
        ];

        if let Some((field, _)) = durations.into_iter().find(|(_, ms)| *ms == 0) {
            return Err(ConfigError::Invalid {
                field,
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_millis(self.rpc_timeout_ms)
    }

    /// A threshold or failure limit of `0` disables that limit.
    pub fn stall_policy(&self) -> StallPolicy {
        StallPolicy {
            threshold: (self.stall_threshold > 0).then_some(self.stall_threshold),
            interval: self.poll_interval(),
            max_rpc_failures: (self.max_rpc_failures > 0).then_some(self.max_rpc_failures),
        }
    }

    pub fn fanout_limits(&self) -> FanOutLimits {
        FanOutLimits {
            probe_timeout: Duration::from_millis(self.probe_timeout_ms),
            deadline: Duration::from_millis(self.fanout_deadline_ms),
        }
    }
}

impl From<BaseConfig> for Config {
    fn from(base: BaseConfig) -> Self {
        Config {
            rpc_url: base.rpc_url.unwrap_or_default(),
            availability_url: base.availability_url,
            shard_count: base.shard_count,
            stall_threshold: base.stall_threshold,
            poll_interval_ms: base.poll_interval_ms,
            rpc_timeout_ms: base.rpc_timeout_ms,
            probe_timeout_ms: base.probe_timeout_ms,
            fanout_deadline_ms: base.fanout_deadline_ms,
            max_rpc_failures: base.max_rpc_failures,
            database_path: base.database_path,
        }
    }
}

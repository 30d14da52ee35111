use std::default::Default;
use std::path::PathBuf;

use serde::Serialize;

/// The base configuration for a network.
#[derive(Serialize, Debug, Clone)]
pub struct BaseConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rpc_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability_url: Option<String>,
    pub shard_count: u64,
    pub stall_threshold: u32,
    pub poll_interval_ms: u64,
    pub rpc_timeout_ms: u64,
    pub probe_timeout_ms: u64,
    pub fanout_deadline_ms: u64,
    pub max_rpc_failures: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,
}

impl Default for BaseConfig {
    fn default() -> Self {
        BaseConfig {
            rpc_url: None,
            availability_url: None,
            shard_count: 6,
            stall_threshold: 40,
            poll_interval_ms: 100,
            rpc_timeout_ms: 10_000,
            probe_timeout_ms: 2_000,
            fanout_deadline_ms: 5_000,
            max_rpc_failures: 0,
            database_path: None,
        }
    }
}

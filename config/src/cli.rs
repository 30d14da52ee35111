use std::{collections::HashMap, path::PathBuf};

use figment::{providers::Serialized, value::Value};
use serde::{Deserialize, Serialize};

/// Cli Config
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct CliConfig {
    pub rpc_url: Option<String>,
    pub availability_url: Option<String>,
    pub shard_count: Option<u64>,
    pub stall_threshold: Option<u32>,
    pub poll_interval_ms: Option<u64>,
    pub max_rpc_failures: Option<u32>,
    pub database_path: Option<PathBuf>,
}

impl CliConfig {
    pub fn as_provider(&self, network: &str) -> Serialized<HashMap<&str, Value>> {
        let mut user_dict = HashMap::new();

        if let Some(rpc) = &self.rpc_url {
            user_dict.insert("rpc_url", Value::from(rpc.clone()));
        }

        if let Some(url) = &self.availability_url {
            user_dict.insert("availability_url", Value::from(url.clone()));
        }

        if let Some(count) = self.shard_count {
            user_dict.insert("shard_count", Value::from(count));
        }

        if let Some(threshold) = self.stall_threshold {
            user_dict.insert("stall_threshold", Value::from(threshold));
        }

        if let Some(interval) = self.poll_interval_ms {
            user_dict.insert("poll_interval_ms", Value::from(interval));
        }

        if let Some(failures) = self.max_rpc_failures {
            user_dict.insert("max_rpc_failures", Value::from(failures));
        }

        if let Some(path) = &self.database_path {
            user_dict.insert(
                "database_path",
                Value::from(path.to_string_lossy().into_owned()),
            );
        }

        Serialized::from(user_dict, network)
    }
}

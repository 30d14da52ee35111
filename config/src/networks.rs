use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::base::BaseConfig;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Testnet,
    Mainnet,
}

impl Network {
    pub fn to_base_config(&self) -> BaseConfig {
        match self {
            Self::Testnet => testnet(),
            Self::Mainnet => mainnet(),
        }
    }
}

pub fn testnet() -> BaseConfig {
    BaseConfig {
        rpc_url: Some("https://rpc.testnet.near.org".to_string()),
        availability_url: Some("http://rpc-speedup-cache.testnet.aurora.dev/get".to_string()),
        ..Default::default()
    }
}

pub fn mainnet() -> BaseConfig {
    BaseConfig {
        rpc_url: Some("https://rpc.mainnet.near.org".to_string()),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn test_network_names_round_trip() {
        for network in Network::iter() {
            let name = network.to_string();
            assert_eq!(Network::from_str(&name).unwrap(), network);
        }
    }

    #[test]
    fn test_presets_have_rpc() {
        for network in Network::iter() {
            assert!(network.to_base_config().rpc_url.is_some());
        }
        assert!(mainnet().availability_url.is_none());
    }
}

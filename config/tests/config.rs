use std::path::PathBuf;

use config::{CliConfig, Config, ConfigError};
use figment::Jail;

#[test]
fn test_testnet_defaults() {
    Jail::expect_with(|_jail| {
        let config = Config::from_file(
            &PathBuf::from("missing.toml"),
            "testnet",
            &CliConfig::default(),
        )
        .unwrap();

        assert_eq!(config.rpc_url, "https://rpc.testnet.near.org");
        assert_eq!(
            config.availability_url.as_deref(),
            Some("http://rpc-speedup-cache.testnet.aurora.dev/get")
        );
        assert_eq!(config.shard_count, 6);
        assert_eq!(config.stall_threshold, 40);
        assert_eq!(config.poll_interval_ms, 100);
        assert!(config.database_path.is_none());
        Ok(())
    });
}

#[test]
fn test_layer_precedence() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "chunks.toml",
            r#"
                [testnet]
                shard_count = 4
                stall_threshold = 10
                poll_interval_ms = 250
                database_path = "/var/lib/chunks/chunks.db"
            "#,
        )?;
        jail.set_env("CHUNKS_STALL_THRESHOLD", 20);
        jail.set_env("CHUNKS_POLL_INTERVAL_MS", 500);

        let cli = CliConfig {
            poll_interval_ms: Some(50),
            ..Default::default()
        };
        let config = Config::from_file(&PathBuf::from("chunks.toml"), "testnet", &cli).unwrap();

        // toml over preset
        assert_eq!(config.shard_count, 4);
        // env over toml
        assert_eq!(config.stall_threshold, 20);
        // cli over env
        assert_eq!(config.poll_interval_ms, 50);
        assert_eq!(
            config.database_path,
            Some(PathBuf::from("/var/lib/chunks/chunks.db"))
        );
        Ok(())
    });
}

#[test]
fn test_unknown_network_requires_rpc_url() {
    Jail::expect_with(|_jail| {
        let res = Config::from_file(
            &PathBuf::from("missing.toml"),
            "localnet",
            &CliConfig::default(),
        );
        assert!(matches!(res, Err(ConfigError::MissingField(field)) if field == "rpc_url"));

        let cli = CliConfig {
            rpc_url: Some("http://127.0.0.1:3030".to_string()),
            ..Default::default()
        };
        let config = Config::from_file(&PathBuf::from("missing.toml"), "localnet", &cli).unwrap();
        assert_eq!(config.rpc_url, "http://127.0.0.1:3030");
        assert!(config.availability_url.is_none());
        Ok(())
    });
}

#[test]
fn test_invalid_shard_count_rejected() {
    Jail::expect_with(|jail| {
        jail.set_env("CHUNKS_SHARD_COUNT", 0);
        let res = Config::from_file(
            &PathBuf::from("missing.toml"),
            "mainnet",
            &CliConfig::default(),
        );
        assert!(matches!(res, Err(ConfigError::Invalid { field: "shard_count", .. })));
        Ok(())
    });
}

#[test]
fn test_zero_timeout_rejected() {
    Jail::expect_with(|jail| {
        jail.set_env("CHUNKS_RPC_TIMEOUT_MS", 0);
        let res = Config::from_file(
            &PathBuf::from("missing.toml"),
            "testnet",
            &CliConfig::default(),
        );
        assert!(matches!(res, Err(ConfigError::Invalid { field: "rpc_timeout_ms", .. })));
        Ok(())
    });
}

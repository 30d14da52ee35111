use thiserror::Error;

use crate::types::ShardId;

/// Failures talking to the node's JSON-RPC endpoint.
#[derive(Debug, Error)]
pub enum RpcError {
    #[error("rpc transport error on method: {method}, message: {message}")]
    Transport { method: String, message: String },
    #[error("rpc decode error on method: {method}, message: {message}")]
    Decode { method: String, message: String },
}

impl RpcError {
    pub fn transport<E: ToString>(method: &str, err: E) -> Self {
        Self::Transport {
            method: method.to_string(),
            message: err.to_string(),
        }
    }

    pub fn decode<E: ToString>(method: &str, err: E) -> Self {
        Self::Decode {
            method: method.to_string(),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Error)]
#[error("availability probe failed for shard {shard}: {message}")]
pub struct ProbeError {
    shard: ShardId,
    message: String,
}

impl ProbeError {
    pub fn new<E: ToString>(shard: ShardId, err: E) -> Self {
        Self {
            shard,
            message: err.to_string(),
        }
    }

    pub fn shard(&self) -> ShardId {
        self.shard
    }
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("cannot open chunk store: {0}")]
    Open(String),
    #[error("cannot read chunk store: {0}")]
    Read(String),
    #[error("failed to insert chunk data for block {block}, shard {shard}: {message}")]
    Write {
        block: u64,
        shard: ShardId,
        message: String,
    },
}

use std::time::Duration;

use async_trait::async_trait;
use eyre::Result;
use reqwest::{Client, ClientBuilder};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, trace};
use url::Url;

use common::errors::RpcError;
use common::types::{BlockHeader, BlockTag, ShardId};

use super::NodeRpc;

const BLOCK_METHOD: &str = "block";
const CHUNK_METHOD: &str = "chunk";

#[derive(Debug, Clone)]
pub struct HttpRpc {
    client: Client,
    url: Url,
}

impl HttpRpc {
    pub fn new(rpc: &str, timeout: Duration) -> Result<Self> {
        let url = Url::parse(rpc)?;
        let client = ClientBuilder::new().timeout(timeout).build()?;

        Ok(HttpRpc { client, url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Posts a JSON-RPC request and returns the raw response body.
    pub async fn call(&self, method: &str, params: Value) -> Result<Vec<u8>, RpcError> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: "dontcare",
            method,
            params,
        };

        trace!(target: "chunks::rpc", method, params = %request.params, "sending rpc request");

        let response = self
            .client
            .post(self.url.clone())
            .json(&request)
            .send()
            .await
            .map_err(|e| RpcError::transport(method, e))?;

        let body = response
            .bytes()
            .await
            .map_err(|e| RpcError::transport(method, e))?;

        Ok(body.to_vec())
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<Option<T>, RpcError> {
        let body = self.call(method, params).await?;
        let response: RpcResponse<T> =
            serde_json::from_slice(&body).map_err(|e| RpcError::decode(method, e))?;

        if let Some(error) = response.error {
            debug!(target: "chunks::rpc", method, %error, "node answered with an error");
        }

        Ok(response.result)
    }
}

#[async_trait]
impl NodeRpc for HttpRpc {
    async fn get_block(&self, block: BlockTag) -> Result<BlockHeader> {
        let result: Option<BlockResult> = self.request(BLOCK_METHOD, block_params(block)).await?;
        Ok(result.map(|res| res.header).unwrap_or_default())
    }

    async fn get_chunk_author(&self, block: u64, shard: ShardId) -> Result<String> {
        let params = json!({
            "block_id": block,
            "shard_id": shard,
        });

        let result: Option<ChunkResult> = self.request(CHUNK_METHOD, params).await?;
        Ok(result.map(|res| res.author).unwrap_or_default())
    }
}

fn block_params(block: BlockTag) -> Value {
    match block {
        BlockTag::Final => json!({ "finality": "final" }),
        BlockTag::Number(height) => json!({ "block_id": height }),
    }
}

#[derive(Serialize, Debug)]
struct RpcRequest<'a> {
    jsonrpc: &'a str,
    id: &'a str,
    method: &'a str,
    params: Value,
}

#[derive(Deserialize, Debug)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<Value>,
}

#[derive(Deserialize, Debug)]
struct BlockResult {
    header: BlockHeader,
}

#[derive(Deserialize, Debug)]
struct ChunkResult {
    author: String,
}

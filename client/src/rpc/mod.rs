pub mod http_rpc;
pub mod mock_rpc;

use async_trait::async_trait;
use eyre::Result;

use common::types::{BlockHeader, BlockTag, ShardId};

pub use http_rpc::HttpRpc;

// implements the `block` and `chunk` methods of https://docs.near.org/api/rpc/introduction
#[async_trait]
pub trait NodeRpc: Send + Sync + 'static {
    /// Fetches a block header. A block the node does not know yet decodes to a header with
    /// height `0` rather than an error.
    async fn get_block(&self, block: BlockTag) -> Result<BlockHeader>;

    /// Fetches the author of a shard's chunk. Empty if the node has no chunk for that shard.
    async fn get_chunk_author(&self, block: u64, shard: ShardId) -> Result<String>;

    async fn get_finalized_header(&self) -> Result<BlockHeader> {
        self.get_block(BlockTag::Final).await
    }

    async fn get_block_header(&self, height: u64) -> Result<BlockHeader> {
        self.get_block(BlockTag::Number(height)).await
    }
}

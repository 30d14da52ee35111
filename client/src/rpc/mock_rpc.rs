use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use eyre::Result;

use common::errors::RpcError;
use common::types::{BlockHeader, BlockTag, ShardId};

use super::NodeRpc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reply {
    Pending,
    Fail,
}

/// Scripted in-memory node. Every height answers with a produced header unless replies
/// were queued for it, in which case those are played back first.
#[derive(Debug)]
pub struct MockRpc {
    finalized: BlockHeader,
    replies: Mutex<HashMap<u64, VecDeque<Reply>>>,
    block_calls: Mutex<HashMap<u64, usize>>,
    authors: HashMap<(u64, ShardId), Option<String>>,
}

impl MockRpc {
    pub fn new(finalized: u64) -> Self {
        MockRpc {
            finalized: mock_header(finalized),
            replies: Mutex::new(HashMap::new()),
            block_calls: Mutex::new(HashMap::new()),
            authors: HashMap::new(),
        }
    }

    /// Answer `count` lookups of `height` with the not-yet-produced sentinel.
    pub fn with_pending(self, height: u64, count: usize) -> Self {
        self.queue(height, Reply::Pending, count)
    }

    /// Fail `count` lookups of `height` with a transport error.
    pub fn with_failures(self, height: u64, count: usize) -> Self {
        self.queue(height, Reply::Fail, count)
    }

    pub fn with_author(mut self, height: u64, shard: ShardId, author: &str) -> Self {
        self.authors
            .insert((height, shard), Some(author.to_string()));
        self
    }

    pub fn with_author_failure(mut self, height: u64, shard: ShardId) -> Self {
        self.authors.insert((height, shard), None);
        self
    }

    pub fn block_calls(&self, height: u64) -> usize {
        let calls = self.block_calls.lock().unwrap();
        calls.get(&height).copied().unwrap_or_default()
    }

    fn queue(self, height: u64, reply: Reply, count: usize) -> Self {
        self.replies
            .lock()
            .unwrap()
            .entry(height)
            .or_default()
            .extend(std::iter::repeat(reply).take(count));
        self
    }
}

pub fn mock_header(height: u64) -> BlockHeader {
    BlockHeader::new(height, format!("hash-{height}"))
}

pub fn mock_author(shard: ShardId) -> String {
    format!("validator-{shard}.testnet")
}

#[async_trait]
impl NodeRpc for MockRpc {
    async fn get_block(&self, block: BlockTag) -> Result<BlockHeader> {
        let height = match block {
            BlockTag::Final => return Ok(self.finalized.clone()),
            BlockTag::Number(height) => height,
        };

        *self.block_calls.lock().unwrap().entry(height).or_default() += 1;

        let reply = self
            .replies
            .lock()
            .unwrap()
            .get_mut(&height)
            .and_then(|queue| queue.pop_front());

        match reply {
            Some(Reply::Pending) => Ok(BlockHeader::default()),
            Some(Reply::Fail) => Err(RpcError::transport("block", "connection refused").into()),
            None => Ok(mock_header(height)),
        }
    }

    async fn get_chunk_author(&self, block: u64, shard: ShardId) -> Result<String> {
        match self.authors.get(&(block, shard)) {
            Some(Some(author)) => Ok(author.clone()),
            Some(None) => Err(RpcError::decode("chunk", "expected value at line 1 column 1").into()),
            None => Ok(mock_author(shard)),
        }
    }
}

pub mod http_probe;
pub mod mock_probe;

use async_trait::async_trait;

use common::errors::ProbeError;
use common::types::{Availability, ShardId};

pub use http_probe::HttpProbe;

/// Asks a chunk cache whether it holds the chunk built on top of `prev_hash` for `shard`.
#[async_trait]
pub trait AvailabilityProbe: Send + Sync + 'static {
    async fn probe(&self, prev_hash: &str, shard: ShardId) -> Result<Availability, ProbeError>;
}

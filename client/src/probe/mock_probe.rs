use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;

use common::errors::ProbeError;
use common::types::{Availability, ShardId};

use super::AvailabilityProbe;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockAnswer {
    Status(Availability),
    Fail,
    /// Answer with the status after the delay.
    Delayed(Duration, Availability),
}

/// Answers each shard from a fixed table, `NotFound` for shards missing from it.
#[derive(Debug, Default)]
pub struct MockProbe {
    answers: HashMap<ShardId, MockAnswer>,
    calls: Mutex<HashMap<(String, ShardId), usize>>,
}

impl MockProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(shard_count: u64, status: Availability) -> Self {
        (0..shard_count).fold(Self::new(), |probe, shard| probe.with(shard, status))
    }

    pub fn with(self, shard: ShardId, status: Availability) -> Self {
        self.with_answer(shard, MockAnswer::Status(status))
    }

    pub fn with_answer(mut self, shard: ShardId, answer: MockAnswer) -> Self {
        self.answers.insert(shard, answer);
        self
    }

    /// Number of probes received for `shard` on top of `prev_hash`.
    pub fn calls(&self, prev_hash: &str, shard: ShardId) -> usize {
        let calls = self.calls.lock().unwrap();
        calls
            .get(&(prev_hash.to_string(), shard))
            .copied()
            .unwrap_or_default()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }
}

#[async_trait]
impl AvailabilityProbe for MockProbe {
    async fn probe(&self, prev_hash: &str, shard: ShardId) -> Result<Availability, ProbeError> {
        *self
            .calls
            .lock()
            .unwrap()
            .entry((prev_hash.to_string(), shard))
            .or_default() += 1;

        match self.answers.get(&shard).copied() {
            Some(MockAnswer::Status(status)) => Ok(status),
            Some(MockAnswer::Fail) => Err(ProbeError::new(shard, "connection reset by peer")),
            Some(MockAnswer::Delayed(delay, status)) => {
                sleep(delay).await;
                Ok(status)
            }
            None => Ok(Availability::NotFound),
        }
    }
}

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::{timeout, timeout_at, Instant};
use tracing::{debug, warn};

use common::types::{Availability, ShardId, ShardResultSet};
use config::FanOutLimits;

use crate::probe::AvailabilityProbe;

/// Probes every shard of a block concurrently and gathers the answers into one
/// [`ShardResultSet`].
///
/// Each shard gets its own task. Answers travel over a channel to a single collector, so the
/// result set has exactly one writer. A probe that fails or outlives
/// [`FanOutLimits::probe_timeout`] counts as [`Availability::Unknown`], and once
/// [`FanOutLimits::deadline`] passes the remaining tasks are aborted and their shards marked
/// unknown as well. The returned set therefore always holds exactly `shard_count` entries.
#[derive(Debug)]
pub struct FanOut<P> {
    probe: Arc<P>,
    shard_count: u64,
    limits: FanOutLimits,
}

impl<P: AvailabilityProbe> FanOut<P> {
    pub fn new(probe: Arc<P>, shard_count: u64, limits: FanOutLimits) -> Self {
        Self {
            probe,
            shard_count,
            limits,
        }
    }

    pub fn shard_count(&self) -> u64 {
        self.shard_count
    }

    pub async fn probe_all(&self, prev_hash: &str) -> ShardResultSet {
        let deadline = Instant::now() + self.limits.deadline;
        let capacity = usize::try_from(self.shard_count).unwrap_or(usize::MAX).max(1);
        let (sender, mut receiver) = mpsc::channel::<(ShardId, Availability)>(capacity);
        let prev_hash: Arc<str> = Arc::from(prev_hash);

        let mut workers = JoinSet::new();
        for shard in 0..self.shard_count {
            let probe = Arc::clone(&self.probe);
            let sender = sender.clone();
            let prev_hash = Arc::clone(&prev_hash);
            let probe_timeout = self.limits.probe_timeout;

            workers.spawn(async move {
                let status = match timeout(probe_timeout, probe.probe(&prev_hash, shard)).await {
                    Ok(Ok(status)) => status,
                    Ok(Err(err)) => {
                        warn!(target: "chunks::fanout", shard, error = %err, "availability probe failed");
                        Availability::Unknown
                    }
                    Err(_) => {
                        warn!(target: "chunks::fanout", shard, "availability probe timed out");
                        Availability::Unknown
                    }
                };

                // the collector is gone once the deadline passed
                let _ = sender.send((shard, status)).await;
            });
        }
        drop(sender);

        let mut results = ShardResultSet::new();
        loop {
            match timeout_at(deadline, receiver.recv()).await {
                Ok(Some((shard, status))) => {
                    if !results.insert(shard, status) {
                        warn!(target: "chunks::fanout", shard, "ignoring duplicate availability result");
                    }
                }
                Ok(None) => break,
                Err(_) => {
                    warn!(
                        target: "chunks::fanout",
                        received = results.len(),
                        expected = self.shard_count,
                        "availability fan-out deadline expired"
                    );
                    workers.abort_all();
                    break;
                }
            }
        }

        let missing = results.fill_missing(self.shard_count, Availability::Unknown);
        if !missing.is_empty() {
            debug!(target: "chunks::fanout", ?missing, "shards without an answer marked unknown");
        }

        results
    }
}

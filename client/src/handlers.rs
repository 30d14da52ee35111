use std::fmt::Display;
use std::sync::Arc;

use async_trait::async_trait;
use eyre::Result;
use tracing::warn;

use common::types::{BlockHeader, ChunkRecord, Partition, ShardId};

use crate::database::ChunkSink;
use crate::fanout::FanOut;
use crate::poller::BlockHandler;
use crate::probe::AvailabilityProbe;
use crate::rpc::NodeRpc;

/// Looks up the author of every shard's chunk, one shard after another, printing each record
/// and handing it to the sink when there is one.
pub struct AuthorFeed<R> {
    rpc: Arc<R>,
    shard_count: u64,
    sink: Option<Box<dyn ChunkSink>>,
}

impl<R: NodeRpc> AuthorFeed<R> {
    pub fn new(rpc: Arc<R>, shard_count: u64) -> Self {
        Self {
            rpc,
            shard_count,
            sink: None,
        }
    }

    pub fn with_sink(mut self, sink: Box<dyn ChunkSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Chunk authors of every shard at `height`. A failed lookup yields an empty author.
    pub async fn records(&self, height: u64) -> Vec<ChunkRecord> {
        let mut records = Vec::new();
        for shard in 0..self.shard_count {
            records.push(self.record(height, shard).await);
        }
        records
    }

    async fn record(&self, height: u64, shard: ShardId) -> ChunkRecord {
        let author = match self.rpc.get_chunk_author(height, shard).await {
            Ok(author) => author,
            Err(err) => {
                warn!(target: "chunks::authors", block = height, shard, error = %err, "failed to fetch chunk author");
                String::new()
            }
        };

        ChunkRecord {
            block: height,
            shard,
            author,
        }
    }

    fn persist(&self, record: &ChunkRecord) {
        let Some(sink) = &self.sink else {
            return;
        };

        if let Err(err) = sink.persist(record) {
            warn!(target: "chunks::sink", error = %err, "failed to insert chunk data");
        }
    }
}

#[async_trait]
impl<R: NodeRpc> BlockHandler for AuthorFeed<R> {
    async fn handle(&self, header: &BlockHeader) -> Result<()> {
        for shard in 0..self.shard_count {
            let record = self.record(header.height, shard).await;

            println!("{record}");
            self.persist(&record);
        }

        Ok(())
    }
}

/// Probes the chunk cache for every shard of the block in parallel and prints which shards
/// were found.
#[derive(Debug)]
pub struct AvailabilityFeed<P> {
    fanout: FanOut<P>,
}

impl<P: AvailabilityProbe> AvailabilityFeed<P> {
    pub fn new(fanout: FanOut<P>) -> Self {
        Self { fanout }
    }

    /// Probes the chunks built on top of `header`, so the report is labelled with the
    /// following height.
    pub async fn report(&self, header: &BlockHeader) -> AvailabilityReport {
        let results = self.fanout.probe_all(&header.hash).await;

        AvailabilityReport {
            block: header.height + 1,
            partition: results.partition(),
        }
    }
}

#[async_trait]
impl<P: AvailabilityProbe> BlockHandler for AvailabilityFeed<P> {
    async fn handle(&self, header: &BlockHeader) -> Result<()> {
        println!("{}", self.report(header).await);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityReport {
    pub block: u64,
    pub partition: Partition,
}

impl Display for AvailabilityReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Block: {}, Found: {:?}, Not found: {:?}",
            self.block, self.partition.found, self.partition.not_found
        )?;

        if !self.partition.unknown.is_empty() {
            write!(f, ", Unknown: {:?}", self.partition.unknown)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use common::errors::SinkError;
    use common::types::Availability;
    use config::FanOutLimits;

    use super::*;
    use crate::probe::mock_probe::MockProbe;
    use crate::rpc::mock_rpc::{mock_author, mock_header, MockRpc};

    /// Rejects writes for one shard and remembers every attempt.
    struct FlakySink {
        failing_shard: ShardId,
        attempts: Arc<Mutex<Vec<ChunkRecord>>>,
    }

    impl ChunkSink for FlakySink {
        fn persist(&self, record: &ChunkRecord) -> Result<(), SinkError> {
            self.attempts.lock().unwrap().push(record.clone());
            if record.shard == self.failing_shard {
                return Err(SinkError::Write {
                    block: record.block,
                    shard: record.shard,
                    message: "disk I/O error".to_string(),
                });
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_sink_failure_does_not_stop_later_shards() {
        let attempts = Arc::new(Mutex::new(Vec::new()));
        let sink = FlakySink {
            failing_shard: 2,
            attempts: attempts.clone(),
        };
        let feed = AuthorFeed::new(Arc::new(MockRpc::new(100)), 6).with_sink(Box::new(sink));

        feed.handle(&mock_header(100)).await.unwrap();

        let attempts = attempts.lock().unwrap();
        let shards = attempts.iter().map(|r| r.shard).collect::<Vec<_>>();
        assert_eq!(shards, vec![0, 1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_failed_author_lookup_is_empty() {
        let rpc = MockRpc::new(100)
            .with_author(100, 0, "alice.testnet")
            .with_author_failure(100, 1);
        let feed = AuthorFeed::new(Arc::new(rpc), 3);

        let records = feed.records(100).await;

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].author, "alice.testnet");
        assert_eq!(records[1].author, "");
        assert_eq!(records[2].author, mock_author(2));
    }

    #[tokio::test]
    async fn test_availability_report() {
        let probe = MockProbe::new()
            .with(0, Availability::Found)
            .with(2, Availability::Found)
            .with(4, Availability::Found);
        let fanout = FanOut::new(Arc::new(probe), 6, FanOutLimits::default());
        let feed = AvailabilityFeed::new(fanout);

        let report = feed.report(&mock_header(100)).await;

        assert_eq!(report.block, 101);
        assert_eq!(report.partition.found, vec![0, 2, 4]);
        assert_eq!(report.partition.not_found, vec![1, 3, 5]);
        assert_eq!(
            report.to_string(),
            "Block: 101, Found: [0, 2, 4], Not found: [1, 3, 5]"
        );
    }

    #[test]
    fn test_report_lists_unknown_shards() {
        let report = AvailabilityReport {
            block: 7,
            partition: Partition {
                found: vec![0],
                not_found: vec![],
                unknown: vec![1],
            },
        };

        assert_eq!(
            report.to_string(),
            "Block: 7, Found: [0], Not found: [], Unknown: [1]"
        );
    }
}

use std::sync::Arc;

use async_trait::async_trait;
use eyre::{eyre, Result};
use tokio::time::sleep;
use tracing::{debug, info, trace, warn};

use common::types::BlockHeader;
use config::StallPolicy;

use crate::errors::ClientError;
use crate::rpc::NodeRpc;

/// Work done for every block the poller confirms.
#[async_trait]
pub trait BlockHandler: Send + Sync {
    async fn handle(&self, header: &BlockHeader) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    AwaitingHeader,
    HeaderConfirmed,
    ProcessingShards,
    Advancing,
    SkippingStalled,
}

/// What a single [`BlockPoller::step`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// The block is not produced yet; the poller slept and will ask again.
    Waiting { height: u64, stalls: u32 },
    /// The block stayed unavailable past the stall threshold and was given up on.
    Skipped { height: u64 },
    /// The block was handed to the handler.
    Processed { height: u64 },
    /// The node could not be queried; the poller slept and will ask again.
    RpcFailed { height: u64, failures: u32 },
}

/// Walks the chain one height at a time, starting from the finalized head.
///
/// Blocks are processed strictly in order: the handler for height `n + 1` never runs before
/// the handler for `n` has returned.
#[derive(Debug)]
pub struct BlockPoller<R> {
    rpc: Arc<R>,
    policy: StallPolicy,
    cursor: u64,
    stalls: u32,
    failures: u32,
    state: PollState,
}

impl<R: NodeRpc> BlockPoller<R> {
    pub fn new(rpc: Arc<R>, policy: StallPolicy, cursor: u64) -> Self {
        Self {
            rpc,
            policy,
            cursor,
            stalls: 0,
            failures: 0,
            state: PollState::AwaitingHeader,
        }
    }

    /// Creates a poller positioned at the node's finalized head. Also returns that head.
    ///
    /// Fails if the node answers with the not-yet-produced sentinel, since there is no height
    /// to start from.
    pub async fn from_finalized(rpc: Arc<R>, policy: StallPolicy) -> Result<(Self, BlockHeader)> {
        let head = rpc
            .get_finalized_header()
            .await
            .map_err(ClientError::NodeUnavailable)?;

        if !head.is_produced() {
            let err = eyre!("node reported no finalized block");
            return Err(ClientError::NodeUnavailable(err).into());
        }

        info!(target: "chunks::poller", height = head.height, hash = %head.hash, "starting from finalized head");
        Ok((Self::new(rpc, policy, head.height), head))
    }

    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    pub fn stalls(&self) -> u32 {
        self.stalls
    }

    pub fn state(&self) -> PollState {
        self.state
    }

    /// Polls the block under the cursor once.
    ///
    /// Only fails when the rpc failure limit of the [`StallPolicy`] is reached.
    pub async fn step<H: BlockHandler + ?Sized>(&mut self, handler: &H) -> Result<PollOutcome> {
        let height = self.cursor;
        self.transition(PollState::AwaitingHeader);

        let header = match self.rpc.get_block_header(height).await {
            Ok(header) => {
                self.failures = 0;
                header
            }
            Err(err) => {
                self.failures += 1;
                if self.policy.should_abort(self.failures) {
                    return Err(ClientError::RpcFailuresExceeded {
                        height,
                        failures: self.failures,
                        error: err,
                    }
                    .into());
                }

                warn!(target: "chunks::poller", block = height, failures = self.failures, error = %err, "failed to fetch block");
                sleep(self.policy.interval).await;
                return Ok(PollOutcome::RpcFailed {
                    height,
                    failures: self.failures,
                });
            }
        };

        if !header.is_produced() {
            self.stalls += 1;

            if self.policy.should_skip(self.stalls) {
                self.transition(PollState::SkippingStalled);
                warn!(target: "chunks::poller", block = height, stalls = self.stalls, "skipping block {height}");
                self.stalls = 0;
                self.advance();
                return Ok(PollOutcome::Skipped { height });
            }

            trace!(target: "chunks::poller", block = height, stalls = self.stalls, "block not produced yet");
            sleep(self.policy.interval).await;
            return Ok(PollOutcome::Waiting {
                height,
                stalls: self.stalls,
            });
        }

        self.stalls = 0;
        self.transition(PollState::HeaderConfirmed);
        if header.height != height {
            warn!(target: "chunks::poller", expected = height, received = header.height, "node returned a different height");
        }

        self.transition(PollState::ProcessingShards);
        if let Err(err) = handler.handle(&header).await {
            warn!(target: "chunks::poller", block = height, error = %err, "block handler failed");
        }

        self.advance();
        Ok(PollOutcome::Processed { height })
    }

    /// Polls forever. Returns only when the rpc failure limit is reached.
    pub async fn run<H: BlockHandler + ?Sized>(mut self, handler: &H) -> Result<()> {
        loop {
            self.step(handler).await?;
        }
    }

    fn advance(&mut self) {
        self.transition(PollState::Advancing);
        self.cursor += 1;
        debug!(target: "chunks::poller", cursor = self.cursor, "advanced");
        self.transition(PollState::AwaitingHeader);
    }

    fn transition(&mut self, next: PollState) {
        if self.state != next {
            trace!(target: "chunks::poller", from = ?self.state, to = ?next, "poll state");
            self.state = next;
        }
    }
}

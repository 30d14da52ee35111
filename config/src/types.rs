use std::time::Duration;

/// How long the poller waits on a block that has not been produced yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StallPolicy {
    /// Consecutive not-yet-produced responses tolerated before the block is skipped.
    /// `None` waits forever.
    pub threshold: Option<u32>,
    pub interval: Duration,
    /// Consecutive rpc failures tolerated before the poller gives up. `None` never gives up.
    pub max_rpc_failures: Option<u32>,
}

impl StallPolicy {
    pub fn should_skip(&self, stalls: u32) -> bool {
        self.threshold.is_some_and(|threshold| stalls > threshold)
    }

    pub fn should_abort(&self, failures: u32) -> bool {
        self.max_rpc_failures
            .is_some_and(|max_failures| failures >= max_failures)
    }
}

impl Default for StallPolicy {
    fn default() -> Self {
        Self {
            threshold: Some(40),
            interval: Duration::from_millis(100),
            max_rpc_failures: None,
        }
    }
}

/// Bounds on a single block's availability fan-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FanOutLimits {
    pub probe_timeout: Duration,
    pub deadline: Duration,
}

impl Default for FanOutLimits {
    fn default() -> Self {
        Self {
            probe_timeout: Duration::from_secs(2),
            deadline: Duration::from_secs(5),
        }
    }
}

use eyre::Report;
use thiserror::Error;

use common::errors::SinkError;

/// Errors that end a run of the client
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("no availability endpoint configured for this network")]
    MissingAvailabilityEndpoint,

    #[error("no database path configured")]
    MissingDatabasePath,

    #[error("cannot reach the node: {0}")]
    NodeUnavailable(Report),

    #[error("giving up on block {height} after {failures} consecutive rpc failures: {error}")]
    RpcFailuresExceeded {
        height: u64,
        failures: u32,
        error: Report,
    },

    #[error(transparent)]
    Sink(#[from] SinkError),
}

#![warn(missing_debug_implementations, rust_2018_idioms, unreachable_pub)]
#![deny(rustdoc::broken_intra_doc_links)]
#![doc(test(
    no_crate_inject,
    attr(deny(warnings, rust_2018_idioms), allow(dead_code, unused_variables))
))]

//! # NEAR chunk author and availability tracker.
//!
//! > chunks follows a NEAR chain block by block and reports, for every shard, who produced the
//! > chunk and whether a chunk cache already holds it.
//!
//! ## Quickstart: `prelude`
//!
//! The prelude imports all the necessary data types and traits from chunks.
//!
//! ```no_run
//! # #[allow(unused)]
//! use chunks::prelude::*;
//! ```
//!
//! ## Breakdown of exported modules
//!
//! ### `client`
//!
//! `ClientBuilder` resolves a `Config` and builds a `Client`. The `Client` runs one of the
//! modes: a one-shot author listing, an author feed, an author feed stored in SQLite, or an
//! availability feed that probes all shards of a block in parallel.
//!
//! The lower level pieces, `BlockPoller`, `FanOut` and the handlers, are exported as well for
//! callers that want to drive the poll loop themselves.
//!
//! ### `config`
//!
//! Configuration types, network presets and the stall policy.
//!
//! ### `types`
//!
//! Block headers, chunk records and shard availability results.
//!
//! ### `errors`
//!
//! Errors used across chunks.

pub mod config {
    pub use config::{networks, CliConfig, Config, FanOutLimits, StallPolicy};
}

pub mod types {
    pub use common::types::*;
}

pub mod client {
    pub use client::database::{ChunkSink, SqliteSink};
    pub use client::fanout::FanOut;
    pub use client::handlers::{AuthorFeed, AvailabilityFeed, AvailabilityReport};
    pub use client::poller::{BlockHandler, BlockPoller, PollOutcome, PollState};
    pub use client::probe::{AvailabilityProbe, HttpProbe};
    pub use client::rpc::{HttpRpc, NodeRpc};
    pub use client::{Client, ClientBuilder};
}

pub mod prelude {
    pub use crate::client::*;
    pub use crate::config::*;
    pub use crate::errors::*;
    pub use crate::types::*;
}

pub mod errors {
    pub use client::errors::*;
    pub use common::errors::*;
    pub use config::ConfigError;
}

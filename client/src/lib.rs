pub mod client;
pub use crate::client::*;

pub mod database;
pub mod errors;
pub mod fanout;
pub mod handlers;
pub mod poller;
pub mod probe;
pub mod rpc;

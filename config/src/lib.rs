/// Base Config
pub mod base;
pub use base::*;

/// Core Config
pub mod config;
pub use crate::config::*;

/// Cli Config
pub mod cli;
pub use cli::*;

/// Network Configuration
pub mod networks;
pub use networks::*;

/// Polling and fan-out limits
pub mod types;
pub use types::*;

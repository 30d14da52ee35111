use std::path::PathBuf;
use std::process::exit;
use std::sync::atomic::{AtomicUsize, Ordering};

use clap::{Args, Parser, Subcommand};
use dirs::home_dir;
use eyre::Result;
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::FmtSubscriber;
use url::Url;

use client::{Client, ClientBuilder};
use config::{CliConfig, Config, ConfigError};

#[tokio::main]
async fn main() -> Result<()> {
    enable_tracer();
    let mut shutdown = register_shutdown_handler();

    let cli = Cli::parse();
    let (args, mode) = match &cli.command {
        Command::Show(args) => (args, Mode::Show),
        Command::Feed(args) => (args, Mode::Feed),
        Command::Collect(args) => (args, Mode::Collect),
        Command::Availability(args) => (args, Mode::Availability),
    };

    let client = args.make_client();
    let run = async {
        match mode {
            Mode::Show => client.show_authors().await.map(|_| ()),
            Mode::Feed => client.feed_authors().await,
            Mode::Collect => client.collect_authors().await,
            Mode::Availability => client.feed_availability().await,
        }
    };

    let result = tokio::select! {
        result = run => result,
        Ok(()) = shutdown.changed() => {
            info!(target: "chunks::runner", "stopped");
            Ok(())
        }
    };

    if let Err(err) = result {
        error!(target: "chunks::runner", error = %err);
        exit(1);
    }

    Ok(())
}

fn enable_tracer() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("subscriber set failed: {err}");
    }
}

fn register_shutdown_handler() -> watch::Receiver<bool> {
    let (signal, shutdown) = ShutdownSignal::new();

    let registered = ctrlc::set_handler(move || match signal.press() {
        ShutdownAction::Graceful => {
            info!(target: "chunks::runner", "shutting down... press ctrl-c again to force quit");
        }
        ShutdownAction::Forced => {
            info!(target: "chunks::runner", "forced shutdown");
            exit(130);
        }
    });

    if let Err(err) = registered {
        error!(target: "chunks::runner", error = %err, "could not register shutdown handler");
    }

    shutdown
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShutdownAction {
    Graceful,
    Forced,
}

/// Counts ctrl-c presses. The first one asks the running mode to stop, any later one forces
/// the process down.
struct ShutdownSignal {
    presses: AtomicUsize,
    sender: watch::Sender<bool>,
}

impl ShutdownSignal {
    fn new() -> (Self, watch::Receiver<bool>) {
        let (sender, receiver) = watch::channel(false);
        let signal = Self {
            presses: AtomicUsize::new(0),
            sender,
        };

        (signal, receiver)
    }

    fn press(&self) -> ShutdownAction {
        let presses = self.presses.fetch_add(1, Ordering::SeqCst).saturating_add(1);
        if presses == 1 {
            self.sender.send_replace(true);
            ShutdownAction::Graceful
        } else {
            ShutdownAction::Forced
        }
    }
}

#[derive(Clone, Copy)]
enum Mode {
    Show,
    Feed,
    Collect,
    Availability,
}

#[derive(Parser)]
#[clap(version, about)]
/// Follows a NEAR chain block by block and reports who produced each shard's chunk
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the chunk authors of the finalized head and exit
    #[clap(name = "show")]
    Show(ChunkArgs),
    /// Print the chunk authors of every new block
    #[clap(name = "feed")]
    Feed(ChunkArgs),
    /// Print and store the chunk authors of every new block
    #[clap(name = "collect")]
    Collect(ChunkArgs),
    /// Print which shards' chunks the availability cache holds for every new block
    #[clap(name = "availability")]
    Availability(ChunkArgs),
}

#[derive(Args, Debug)]
struct ChunkArgs {
    #[clap(short, long, default_value = "testnet")]
    network: String,
    #[clap(short, long, env, value_parser = parse_url)]
    rpc_url: Option<Url>,
    #[clap(short, long, env, value_parser = parse_url)]
    availability_url: Option<Url>,
    #[clap(short, long, env)]
    shard_count: Option<u64>,
    #[clap(short = 't', long, env)]
    stall_threshold: Option<u32>,
    #[clap(short = 'i', long, env)]
    poll_interval_ms: Option<u64>,
    #[clap(long, env)]
    max_rpc_failures: Option<u32>,
    #[clap(short, long, env)]
    database_path: Option<PathBuf>,
}

impl ChunkArgs {
    fn make_client(&self) -> Client {
        let config_path = home_dir()
            .unwrap_or_default()
            .join(".chunks/chunks.toml");
        let cli_config = self.as_cli_config();

        let config = match Config::from_file(&config_path, &self.network, &cli_config) {
            Ok(config) => config,
            Err(ConfigError::MissingField(field)) => {
                error!(
                    target: "chunks::runner",
                    "missing config field: {field}, set it in {} under [{}], as CHUNKS_{} or on the command line",
                    config_path.display(),
                    self.network,
                    field.to_uppercase()
                );
                exit(1);
            }
            Err(err) => {
                error!(target: "chunks::runner", error = %err);
                exit(1);
            }
        };

        match ClientBuilder::new().config(config).build() {
            Ok(client) => client,
            Err(err) => {
                error!(target: "chunks::runner", error = %err);
                exit(1);
            }
        }
    }

    fn as_cli_config(&self) -> CliConfig {
        CliConfig {
            rpc_url: self.rpc_url.as_ref().map(Url::to_string),
            availability_url: self.availability_url.as_ref().map(Url::to_string),
            shard_count: self.shard_count,
            stall_threshold: self.stall_threshold,
            poll_interval_ms: self.poll_interval_ms,
            max_rpc_failures: self.max_rpc_failures,
            database_path: self.database_path.clone(),
        }
    }
}

fn parse_url(s: &str) -> Result<Url, url::ParseError> {
    Url::parse(s)
}

use std::path::PathBuf;
use std::sync::Arc;

use eyre::{eyre, Result};
use tracing::info;

use common::types::{BlockHeader, ChunkRecord};
use config::networks::Network;
use config::Config;

use crate::database::SqliteSink;
use crate::errors::ClientError;
use crate::fanout::FanOut;
use crate::handlers::{AuthorFeed, AvailabilityFeed};
use crate::poller::{BlockHandler, BlockPoller};
use crate::probe::{AvailabilityProbe, HttpProbe};
use crate::rpc::{HttpRpc, NodeRpc};

pub struct Client<R: NodeRpc = HttpRpc> {
    rpc: Arc<R>,
    config: Arc<Config>,
}

impl Client<HttpRpc> {
    fn new(config: Config) -> Result<Self> {
        let rpc = HttpRpc::new(&config.rpc_url, config.rpc_timeout())?;
        Ok(Self::with_rpc(Arc::new(rpc), config))
    }
}

impl<R: NodeRpc> Client<R> {
    pub fn with_rpc(rpc: Arc<R>, config: Config) -> Self {
        Client {
            rpc,
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Prints the chunk authors of the finalized head once.
    pub async fn show_authors(&self) -> Result<Vec<ChunkRecord>> {
        let head = self
            .rpc
            .get_finalized_header()
            .await
            .map_err(ClientError::NodeUnavailable)?;
        print_head(&head);

        let records = self.author_feed().records(head.height).await;
        for record in &records {
            println!("Shard {} author: {}", record.shard, record.author);
        }

        Ok(records)
    }

    /// Prints the chunk authors of every block from the finalized head on.
    pub async fn feed_authors(&self) -> Result<()> {
        let feed = self.author_feed();
        self.run(&feed).await
    }

    /// Like [`Client::feed_authors`], also storing every record in the configured database.
    pub async fn collect_authors(&self) -> Result<()> {
        let path = self
            .config
            .database_path
            .as_ref()
            .ok_or(ClientError::MissingDatabasePath)?;
        let sink = SqliteSink::open(path).map_err(ClientError::from)?;

        let feed = self.author_feed().with_sink(Box::new(sink));
        self.run(&feed).await
    }

    /// Prints per-shard chunk availability of every block from the finalized head on.
    pub async fn feed_availability(&self) -> Result<()> {
        let endpoint = self
            .config
            .availability_url
            .as_ref()
            .ok_or(ClientError::MissingAvailabilityEndpoint)?;
        let probe = HttpProbe::new(endpoint, self.config.fanout_limits().probe_timeout)?;

        self.feed_availability_with(Arc::new(probe)).await
    }

    pub async fn feed_availability_with<P: AvailabilityProbe>(&self, probe: Arc<P>) -> Result<()> {
        let fanout = FanOut::new(
            probe,
            self.config.shard_count,
            self.config.fanout_limits(),
        );
        let feed = AvailabilityFeed::new(fanout);
        self.run(&feed).await
    }

    fn author_feed(&self) -> AuthorFeed<R> {
        AuthorFeed::new(self.rpc.clone(), self.config.shard_count)
    }

    async fn run<H: BlockHandler>(&self, handler: &H) -> Result<()> {
        let (poller, head) =
            BlockPoller::from_finalized(self.rpc.clone(), self.config.stall_policy()).await?;
        print_head(&head);

        info!(
            target: "chunks::client",
            shard_count = self.config.shard_count,
            stall_threshold = self.config.stall_threshold,
            "polling new blocks"
        );
        poller.run(handler).await
    }
}

fn print_head(head: &BlockHeader) {
    println!(
        "Last block hash: {}, block height: {}",
        head.hash, head.height
    );
}

#[derive(Default)]
pub struct ClientBuilder {
    network: Option<Network>,
    rpc_url: Option<String>,
    availability_url: Option<String>,
    database_path: Option<PathBuf>,
    config: Option<Config>,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn network(mut self, network: Network) -> Self {
        self.network = Some(network);
        self
    }

    pub fn rpc_url(mut self, rpc_url: &str) -> Self {
        self.rpc_url = Some(rpc_url.to_string());
        self
    }

    pub fn availability_url(mut self, availability_url: &str) -> Self {
        self.availability_url = Some(availability_url.to_string());
        self
    }

    pub fn database_path(mut self, database_path: PathBuf) -> Self {
        self.database_path = Some(database_path);
        self
    }

    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Resolves the final [`Config`]: explicit builder values win over `config`, which wins
    /// over the network preset.
    pub fn resolve(self) -> Result<Config> {
        let mut config = match (self.config, self.network) {
            (Some(config), _) => config,
            (None, Some(network)) => Config::from(network.to_base_config()),
            (None, None) => return Err(eyre!("missing network config")),
        };

        if let Some(rpc_url) = self.rpc_url {
            config.rpc_url = rpc_url;
        }

        if self.availability_url.is_some() {
            config.availability_url = self.availability_url;
        }

        if self.database_path.is_some() {
            config.database_path = self.database_path;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn build(self) -> Result<Client> {
        Client::new(self.resolve()?)
    }
}

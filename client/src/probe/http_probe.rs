use std::time::Duration;

use async_trait::async_trait;
use eyre::Result;
use reqwest::{Client, ClientBuilder, StatusCode};
use tracing::trace;
use url::Url;

use common::errors::ProbeError;
use common::types::{Availability, ShardId};

use super::AvailabilityProbe;

#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: Client,
    endpoint: Url,
}

impl HttpProbe {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        let endpoint = Url::parse(endpoint)?;
        let client = ClientBuilder::new().timeout(timeout).build()?;

        Ok(HttpProbe { client, endpoint })
    }
}

#[async_trait]
impl AvailabilityProbe for HttpProbe {
    async fn probe(&self, prev_hash: &str, shard: ShardId) -> Result<Availability, ProbeError> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[("prev_hash", prev_hash.to_string()), ("shard_id", shard.to_string())])
            .send()
            .await
            .map_err(|e| ProbeError::new(shard, e))?;

        let status = response.status();
        trace!(target: "chunks::probe", shard, %status, "availability probe answered");

        if status == StatusCode::OK {
            Ok(Availability::Found)
        } else {
            Ok(Availability::NotFound)
        }
    }
}

use std::collections::BTreeMap;
use std::fmt::Display;

use serde::{Deserialize, Serialize};
use strum::{Display as StrumDisplay, EnumString};

pub type ShardId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockTag {
    Final,
    Number(u64),
}

impl From<u64> for BlockTag {
    fn from(num: u64) -> Self {
        BlockTag::Number(num)
    }
}

impl Display for BlockTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let formatted = match self {
            Self::Final => "final".to_string(),
            Self::Number(num) => num.to_string(),
        };

        write!(f, "{formatted}")
    }
}

/// The subset of a block header the watcher cares about.
///
/// A header with height `0` is the sentinel the node hands back (once decoded) for a block
/// that has not been produced yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    pub height: u64,
    pub hash: String,
}

impl BlockHeader {
    pub fn new(height: u64, hash: impl Into<String>) -> Self {
        Self {
            height,
            hash: hash.into(),
        }
    }

    pub fn is_produced(&self) -> bool {
        self.height != 0
    }
}

/// The author of one shard's chunk at one block. `author` is empty when the lookup failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkRecord {
    pub block: u64,
    pub shard: ShardId,
    pub author: String,
}

impl Display for ChunkRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Block {}, Shard {} author: {}",
            self.block, self.shard, self.author
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, StrumDisplay, EnumString)]
pub enum Availability {
    #[strum(serialize = "Found")]
    Found,
    #[strum(serialize = "Not found")]
    NotFound,
    /// The probe failed or did not answer before its deadline.
    #[strum(serialize = "Unknown")]
    Unknown,
}

/// Per-shard availability for a single block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShardResultSet {
    results: BTreeMap<ShardId, Availability>,
}

impl ShardResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the status of a shard. Returns `false`, leaving the set untouched, if the shard
    /// already has a result.
    pub fn insert(&mut self, shard: ShardId, status: Availability) -> bool {
        if self.results.contains_key(&shard) {
            return false;
        }

        self.results.insert(shard, status);
        true
    }

    pub fn get(&self, shard: ShardId) -> Option<Availability> {
        self.results.get(&shard).copied()
    }

    pub fn contains(&self, shard: ShardId) -> bool {
        self.results.contains_key(&shard)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ShardId, Availability)> + '_ {
        self.results.iter().map(|(shard, status)| (*shard, *status))
    }

    /// Fills every shard in `0..shard_count` that has no result yet with `status`.
    pub fn fill_missing(&mut self, shard_count: u64, status: Availability) -> Vec<ShardId> {
        let missing = (0..shard_count)
            .filter(|shard| !self.results.contains_key(shard))
            .collect::<Vec<_>>();

        for shard in &missing {
            self.results.insert(*shard, status);
        }

        missing
    }

    pub fn partition(&self) -> Partition {
        let mut partition = Partition::default();
        for (shard, status) in self.iter() {
            match status {
                Availability::Found => partition.found.push(shard),
                Availability::NotFound => partition.not_found.push(shard),
                Availability::Unknown => partition.unknown.push(shard),
            }
        }

        partition.sort();
        partition
    }
}

impl FromIterator<(ShardId, Availability)> for ShardResultSet {
    fn from_iter<T: IntoIterator<Item = (ShardId, Availability)>>(iter: T) -> Self {
        let mut set = ShardResultSet::new();
        for (shard, status) in iter {
            set.insert(shard, status);
        }
        set
    }
}

/// Shards of a [`ShardResultSet`] grouped by status, each group in ascending shard order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    pub found: Vec<ShardId>,
    pub not_found: Vec<ShardId>,
    pub unknown: Vec<ShardId>,
}

impl Partition {
    pub fn sort(&mut self) {
        self.found.sort_unstable();
        self.not_found.sort_unstable();
        self.unknown.sort_unstable();
    }
}

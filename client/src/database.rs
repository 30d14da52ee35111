use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection, Row};
use tracing::info;

use common::errors::SinkError;
use common::types::ChunkRecord;

/// Destination for observed chunk authors.
///
/// Writes happen one record at a time from the polling loop. A failed write is reported to the
/// caller, which logs it and moves on, so the store may have gaps.
pub trait ChunkSink: Send + Sync {
    fn persist(&self, record: &ChunkRecord) -> Result<(), SinkError>;
}

pub struct SqliteSink {
    conn: Mutex<Connection>,
}

impl SqliteSink {
    pub fn open(path: &Path) -> Result<Self, SinkError> {
        let conn = Connection::open(path).map_err(|e| SinkError::Open(e.to_string()))?;
        let sink = Self::init(conn)?;

        info!(target: "chunks::sink", path = %path.display(), "chunk store opened");
        Ok(sink)
    }

    pub fn in_memory() -> Result<Self, SinkError> {
        let conn = Connection::open_in_memory().map_err(|e| SinkError::Open(e.to_string()))?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, SinkError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS chunks (
                block INTEGER NOT NULL,
                author TEXT NOT NULL,
                chunk INTEGER NOT NULL
            )",
            [],
        )
        .map_err(|e| SinkError::Open(e.to_string()))?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// All stored records in insertion order.
    pub fn records(&self) -> Result<Vec<ChunkRecord>, SinkError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| SinkError::Read(e.to_string()))?;

        let mut stmt = conn
            .prepare("SELECT block, author, chunk FROM chunks ORDER BY rowid")
            .map_err(|e| SinkError::Read(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| {
                Ok(ChunkRecord {
                    block: column_u64(row, 0)?,
                    author: row.get(1)?,
                    shard: column_u64(row, 2)?,
                })
            })
            .map_err(|e| SinkError::Read(e.to_string()))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| SinkError::Read(e.to_string()))
    }
}

fn column_u64(row: &Row<'_>, idx: usize) -> rusqlite::Result<u64> {
    let value: i64 = row.get(idx)?;
    u64::try_from(value).map_err(|_| rusqlite::Error::IntegralValueOutOfRange(idx, value))
}

impl std::fmt::Debug for SqliteSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteSink").finish_non_exhaustive()
    }
}

impl ChunkSink for SqliteSink {
    fn persist(&self, record: &ChunkRecord) -> Result<(), SinkError> {
        let write_error = |message: String| SinkError::Write {
            block: record.block,
            shard: record.shard,
            message,
        };

        // sqlite integers are signed
        let block = i64::try_from(record.block).map_err(|e| write_error(e.to_string()))?;
        let shard = i64::try_from(record.shard).map_err(|e| write_error(e.to_string()))?;

        let conn = self.conn.lock().map_err(|e| write_error(e.to_string()))?;
        conn.execute(
            "INSERT INTO chunks (block, author, chunk) VALUES (?1, ?2, ?3)",
            params![block, record.author, shard],
        )
        .map_err(|e| write_error(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(block: u64, shard: u64, author: &str) -> ChunkRecord {
        ChunkRecord {
            block,
            shard,
            author: author.to_string(),
        }
    }

    #[test]
    fn test_persist_and_read_back() {
        let sink = SqliteSink::in_memory().unwrap();
        sink.persist(&record(100, 0, "alice.testnet")).unwrap();
        sink.persist(&record(100, 1, "")).unwrap();

        let records = sink.records().unwrap();
        assert_eq!(
            records,
            vec![record(100, 0, "alice.testnet"), record(100, 1, "")]
        );
    }

    #[test]
    fn test_reopen_keeps_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chunks.db");

        SqliteSink::open(&path)
            .unwrap()
            .persist(&record(7, 3, "bob.testnet"))
            .unwrap();

        let sink = SqliteSink::open(&path).unwrap();
        assert_eq!(sink.records().unwrap(), vec![record(7, 3, "bob.testnet")]);
    }

    #[test]
    fn test_out_of_range_height_not_written() {
        let sink = SqliteSink::in_memory().unwrap();

        let res = sink.persist(&record(u64::MAX, 0, "alice.testnet"));

        assert!(matches!(res, Err(SinkError::Write { block: u64::MAX, shard: 0, .. })));
        assert!(sink.records().unwrap().is_empty());
    }

    #[test]
    fn test_negative_stored_height_is_read_error() {
        let sink = SqliteSink::in_memory().unwrap();
        sink.conn
            .lock()
            .unwrap()
            .execute(
                "INSERT INTO chunks (block, author, chunk) VALUES (-1, 'bob.testnet', 0)",
                [],
            )
            .unwrap();

        assert!(matches!(sink.records(), Err(SinkError::Read(_))));
    }

    #[test]
    fn test_open_bad_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("chunks.db");

        assert!(matches!(SqliteSink::open(&path), Err(SinkError::Open(_))));
    }
}

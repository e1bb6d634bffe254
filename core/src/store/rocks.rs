//! RocksDB-backed link store.
//!
//! One column family, JSON values. Expiry is lazy: records past their
//! TTL are treated as absent on read and left for compaction-time
//! cleanup rather than deleted inline, so `get` stays side-effect-free.

use rocksdb::{ColumnFamilyDescriptor, DB, Options};
use std::path::Path;
use std::sync::Arc;

use super::{LinkStore, LinkStoreError, LinkTerms, StoredLink, generate_id, unix_now, validate_id};

const CF_LINKS: &str = "links";

/// Thread-safe RocksDB wrapper holding payment links.
#[derive(Clone)]
pub struct RocksLinkStore {
    db: Arc<DB>,
    ttl_secs: u64,
}

impl RocksLinkStore {
    /// Opens the database at `path`, creating it if missing.
    pub fn open<P: AsRef<Path>>(path: P, ttl_secs: u64) -> Result<Self, LinkStoreError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let families = vec![ColumnFamilyDescriptor::new(CF_LINKS, Options::default())];

        let db = DB::open_cf_descriptors(&opts, path, families)
            .map_err(|e| LinkStoreError::Storage(format!("failed to open RocksDB: {}", e)))?;

        Ok(Self {
            db: Arc::new(db),
            ttl_secs,
        })
    }

    fn cf(&self) -> Result<&rocksdb::ColumnFamily, LinkStoreError> {
        self.db
            .cf_handle(CF_LINKS)
            .ok_or_else(|| LinkStoreError::Storage("links CF missing".into()))
    }
}

impl LinkStore for RocksLinkStore {
    async fn create(&self, terms: LinkTerms) -> Result<String, LinkStoreError> {
        terms.validate()?;

        let id = generate_id()?;
        let record = StoredLink {
            terms,
            created_at: unix_now(),
        };
        let value = serde_json::to_vec(&record)
            .map_err(|e| LinkStoreError::Storage(format!("serialize link: {}", e)))?;

        let cf = self.cf()?;
        self.db
            .put_cf(cf, id.as_bytes(), value)
            .map_err(|e| LinkStoreError::Storage(format!("write link: {}", e)))?;

        Ok(id)
    }

    async fn get(&self, id: &str) -> Result<LinkTerms, LinkStoreError> {
        validate_id(id)?;

        let cf = self.cf()?;
        let raw = self
            .db
            .get_cf(cf, id.as_bytes())
            .map_err(|e| LinkStoreError::Storage(format!("read link: {}", e)))?
            .ok_or(LinkStoreError::NotFound)?;

        let record: StoredLink = serde_json::from_slice(&raw)
            .map_err(|e| LinkStoreError::Storage(format!("deserialize link: {}", e)))?;

        if record.expired(self.ttl_secs, unix_now()) {
            return Err(LinkStoreError::NotFound);
        }

        Ok(record.terms)
    }
}

//! In-memory link store.
//!
//! Same contract as the RocksDB store without the disk; used in tests
//! and by embedders that do not want persistence across restarts.

use dashmap::DashMap;

use super::{LinkStore, LinkStoreError, LinkTerms, StoredLink, generate_id, unix_now, validate_id};

#[derive(Default)]
pub struct MemoryLinkStore {
    links: DashMap<String, StoredLink>,
    ttl_secs: u64,
}

impl MemoryLinkStore {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            links: DashMap::new(),
            ttl_secs,
        }
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

impl LinkStore for MemoryLinkStore {
    async fn create(&self, terms: LinkTerms) -> Result<String, LinkStoreError> {
        terms.validate()?;

        let id = generate_id()?;
        self.links.insert(
            id.clone(),
            StoredLink {
                terms,
                created_at: unix_now(),
            },
        );
        Ok(id)
    }

    async fn get(&self, id: &str) -> Result<LinkTerms, LinkStoreError> {
        validate_id(id)?;

        let record = self.links.get(id).ok_or(LinkStoreError::NotFound)?;
        if record.expired(self.ttl_secs, unix_now()) {
            return Err(LinkStoreError::NotFound);
        }
        Ok(record.terms.clone())
    }
}

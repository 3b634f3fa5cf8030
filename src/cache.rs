use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::loader::{load_dataset, LoadError};
use crate::models::FeedbackDataset;

pub const DEFAULT_CAPACITY: usize = 8;

/// Hex SHA-256 of the uploaded bytes.
pub fn content_key(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Parsed uploads keyed by content hash. Oldest entries are evicted first once
/// `capacity` is reached; failed loads are never stored.
#[derive(Debug)]
pub struct DatasetCache {
    capacity: usize,
    entries: HashMap<String, Arc<FeedbackDataset>>,
    order: VecDeque<String>,
}

impl DatasetCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn load(&mut self, bytes: &[u8]) -> Result<Arc<FeedbackDataset>, LoadError> {
        let key = content_key(bytes);
        if let Some(dataset) = self.entries.get(&key) {
            debug!(key = %key, "dataset cache hit");
            return Ok(Arc::clone(dataset));
        }

        let dataset = Arc::new(load_dataset(bytes)?);
        while self.entries.len() >= self.capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            info!(key = %oldest, "evicting cached dataset");
            self.entries.remove(&oldest);
        }

        debug!(key = %key, records = dataset.len(), "caching dataset");
        self.order.push_back(key.clone());
        self.entries.insert(key, Arc::clone(&dataset));
        Ok(dataset)
    }
}

impl Default for DatasetCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

//! Fixed-shard cache storage backend
//!
//! A byte cache split over a fixed, power-of-two number of shards. The
//! shard of a key is picked by hashing its fully qualified path, so
//! contention spreads across locks and large values stay where they were
//! written. Each shard is an LRU, old entries fall out when a shard
//! reaches capacity. Missing keys report `NotFound`.

use async_trait::async_trait;
use lru::LruCache;
use parking_lot::RwLock;
use std::num::NonZeroUsize;

use confstore_types::path::hash32;
use confstore_types::prelude::*;

const DEFAULT_SHARDS: usize = 16;
const DEFAULT_SHARD_CAPACITY: usize = 1024;

pub struct DataAdapterShardCache {
	shards: Box<[RwLock<LruCache<String, Box<[u8]>>>]>,
}

impl DataAdapterShardCache {
	/// 16 shards of 1024 entries each
	pub fn new() -> Self {
		Self::with_config(DEFAULT_SHARDS, DEFAULT_SHARD_CAPACITY)
	}

	/// `shards` is rounded up to the next power of two; each shard holds
	/// at most `shard_capacity` entries.
	pub fn with_config(shards: usize, shard_capacity: usize) -> Self {
		let shards = shards.max(1).next_power_of_two();
		let capacity = NonZeroUsize::new(shard_capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
		let shards = (0..shards)
			.map(|_| RwLock::new(LruCache::new(capacity)))
			.collect::<Vec<_>>()
			.into_boxed_slice();
		Self { shards }
	}

	fn shard(&self, fq: &str) -> &RwLock<LruCache<String, Box<[u8]>>> {
		let idx = hash32(fq.as_bytes()) as usize & (self.shards.len() - 1);
		&self.shards[idx]
	}

	pub fn len(&self) -> usize {
		self.shards.iter().map(|s| s.read().len()).sum()
	}

	pub fn is_empty(&self) -> bool {
		self.shards.iter().all(|s| s.read().is_empty())
	}

	pub fn clear(&self) {
		for shard in self.shards.iter() {
			shard.write().clear();
		}
	}
}

impl Default for DataAdapterShardCache {
	fn default() -> Self {
		Self::new()
	}
}

impl std::fmt::Debug for DataAdapterShardCache {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		f.debug_struct("DataAdapterShardCache")
			.field("shards", &self.shards.len())
			.field("entries", &self.len())
			.finish()
	}
}

#[async_trait]
impl DataAdapter for DataAdapterShardCache {
	async fn set(&self, path: &Path, value: &[u8]) -> CsResult<()> {
		let fq = path.fq();
		self.shard(&fq).write().put(fq, value.into());
		Ok(())
	}

	async fn value(&self, path: &Path) -> CsResult<Box<[u8]>> {
		let fq = path.fq();
		// get refreshes the LRU position, so the write lock is needed
		self.shard(&fq).write().get(&fq).cloned().ok_or(Error::NotFound)
	}

	async fn all_keys(&self) -> CsResult<Vec<Path>> {
		let mut keys = Vec::new();
		for shard in self.shards.iter() {
			for (fq, _) in shard.read().iter() {
				keys.push(Path::split(fq)?);
			}
		}
		keys.sort();
		Ok(keys)
	}
}

// vim: ts=4

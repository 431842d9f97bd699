//! In-memory storage backend
//!
//! A fully qualified path to bytes map behind a reader/writer lock. Writers
//! take the write lock, readers share the read lock. No eviction.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

use crate::prelude::*;

#[derive(Debug, Default)]
pub struct MemoryStorage {
	map: RwLock<HashMap<String, Box<[u8]>>>,
}

impl MemoryStorage {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn len(&self) -> usize {
		self.map.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.map.read().is_empty()
	}
}

#[async_trait]
impl DataAdapter for MemoryStorage {
	async fn set(&self, path: &Path, value: &[u8]) -> CsResult<()> {
		self.map.write().insert(path.fq(), value.into());
		Ok(())
	}

	async fn value(&self, path: &Path) -> CsResult<Box<[u8]>> {
		self.map.read().get(&path.fq()).cloned().ok_or(Error::NotFound)
	}

	async fn all_keys(&self) -> CsResult<Vec<Path>> {
		let mut keys = self
			.map
			.read()
			.keys()
			.map(|fq| Path::split(fq))
			.collect::<CsResult<Vec<_>>>()?;
		keys.sort();
		Ok(keys)
	}
}


// vim: ts=4

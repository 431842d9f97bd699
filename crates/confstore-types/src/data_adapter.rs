//! Storage adapter contract
//!
//! The service talks to its backend exclusively through this trait, so the
//! in-memory map, the SQL table and the shard cache are interchangeable.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::error::CsResult;
use crate::path::Path;

/// Abstract key to value store for scope qualified configuration paths.
///
/// `value` must fail with [`crate::Error::NotFound`] when the key is absent;
/// only that kind triggers the service's scope fallback, every other error
/// surfaces to the caller.
#[async_trait]
pub trait DataAdapter: Debug + Send + Sync {
	/// Stores a value under its path, overwriting a previous one
	async fn set(&self, path: &Path, value: &[u8]) -> CsResult<()>;

	/// Reads the value stored at exactly this path, without fallback
	async fn value(&self, path: &Path) -> CsResult<Box<[u8]>>;

	/// All keys currently present, ordered by scope, scope id, route
	async fn all_keys(&self) -> CsResult<Vec<Path>>;
}

// vim: ts=4

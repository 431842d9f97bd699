//! Shard cache adapter concurrency tests

use std::sync::Arc;

use confstore_data_adapter_shardcache::DataAdapterShardCache;
use confstore_types::prelude::*;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_writers_distinct_keys() {
	let cache = Arc::new(DataAdapterShardCache::new());

	let mut handles = Vec::new();
	for worker in 0..8 {
		let cache = cache.clone();
		handles.push(tokio::spawn(async move {
			for i in 0..50 {
				let route = format!("load/worker_{:02}/key_{:03}", worker, i);
				let path = Path::make(&route).unwrap();
				cache.set(&path, route.as_bytes()).await.unwrap();
			}
		}));
	}
	for handle in handles {
		handle.await.unwrap();
	}

	assert_eq!(cache.len(), 8 * 50);
	let probe = Path::make("load/worker_03/key_017").unwrap();
	assert_eq!(&*cache.value(&probe).await.unwrap(), b"load/worker_03/key_017");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_readers_and_writers_same_key() {
	let cache = Arc::new(DataAdapterShardCache::new());
	let path = Path::make("system/smtp/host").unwrap();
	cache.set(&path, b"seed").await.unwrap();

	let mut handles = Vec::new();
	for _ in 0..4 {
		let cache = cache.clone();
		let path = path.clone();
		handles.push(tokio::spawn(async move {
			for i in 0..100 {
				cache.set(&path, format!("value-{}", i).as_bytes()).await.unwrap();
			}
		}));
	}
	for _ in 0..4 {
		let cache = cache.clone();
		let path = path.clone();
		handles.push(tokio::spawn(async move {
			for _ in 0..100 {
				// always observes some fully written value
				let v = cache.value(&path).await.unwrap();
				assert!(v.starts_with(b"seed") || v.starts_with(b"value-"));
			}
		}));
	}
	for handle in handles {
		handle.await.unwrap();
	}
}

// vim: ts=4

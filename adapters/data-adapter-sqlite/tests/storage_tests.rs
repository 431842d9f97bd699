//! SQLite adapter storage tests

use std::sync::Arc;
use std::time::Duration;

use confstore_data_adapter_sqlite::DataAdapterSqlite;
use confstore_types::prelude::*;
use tempfile::TempDir;

async fn create_test_adapter() -> (DataAdapterSqlite, TempDir) {
	let temp_dir = TempDir::new().expect("Failed to create temp directory");
	let adapter = DataAdapterSqlite::new(temp_dir.path().join("config.db"))
		.await
		.expect("Failed to create adapter");
	(adapter, temp_dir)
}

#[tokio::test]
async fn test_set_and_value_roundtrip() {
	let (adapter, _temp) = create_test_adapter().await;
	let path = Path::make("system/smtp/host").unwrap();

	adapter.set(&path, b"mail.example.com").await.unwrap();
	assert_eq!(&*adapter.value(&path).await.unwrap(), b"mail.example.com");
}

#[tokio::test]
async fn test_upsert_overwrites() {
	let (adapter, _temp) = create_test_adapter().await;
	let path = Path::make("system/smtp/host").unwrap();

	adapter.set(&path, b"first").await.unwrap();
	adapter.set(&path, b"second").await.unwrap();
	assert_eq!(&*adapter.value(&path).await.unwrap(), b"second");
}

#[tokio::test]
async fn test_missing_key_is_not_found() {
	let (adapter, _temp) = create_test_adapter().await;
	let path = Path::make("system/smtp/host").unwrap();
	assert!(adapter.value(&path).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_scope_rows_do_not_alias() {
	let (adapter, _temp) = create_test_adapter().await;
	let route = "catalog/frontend/list_allow_all";

	let d = Path::make(route).unwrap();
	let w = Path::make(route).unwrap().bind(ScopeKind::Website, 2);
	let s = Path::make(route).unwrap().bind(ScopeKind::Store, 5);

	adapter.set(&d, b"default").await.unwrap();
	adapter.set(&w, b"website").await.unwrap();
	adapter.set(&s, b"store").await.unwrap();

	assert_eq!(&*adapter.value(&d).await.unwrap(), b"default");
	assert_eq!(&*adapter.value(&w).await.unwrap(), b"website");
	assert_eq!(&*adapter.value(&s).await.unwrap(), b"store");
}

#[tokio::test]
async fn test_all_keys_ordering() {
	let (adapter, _temp) = create_test_adapter().await;

	let s = Path::make("system/smtp/host").unwrap().bind(ScopeKind::Store, 3);
	let w = Path::make("system/smtp/host").unwrap().bind(ScopeKind::Website, 1);
	let d = Path::make("general/country/allow").unwrap();

	adapter.set(&s, b"1").await.unwrap();
	adapter.set(&w, b"2").await.unwrap();
	adapter.set(&d, b"3").await.unwrap();

	let keys = adapter.all_keys().await.unwrap();
	assert_eq!(keys, vec![d, w, s]);
}

#[tokio::test]
async fn test_values_survive_reopen() {
	let temp_dir = TempDir::new().unwrap();
	let db_path = temp_dir.path().join("config.db");
	let path = Path::make("system/smtp/host").unwrap().bind(ScopeKind::Website, 7);

	{
		let adapter = DataAdapterSqlite::new(&db_path).await.unwrap();
		adapter.set(&path, b"persisted").await.unwrap();
		adapter.close().await;
	}

	let adapter = DataAdapterSqlite::new(&db_path).await.unwrap();
	assert_eq!(&*adapter.value(&path).await.unwrap(), b"persisted");
}

#[tokio::test]
async fn test_statement_reprepared_after_idle_close() {
	let temp_dir = TempDir::new().unwrap();
	let adapter = DataAdapterSqlite::with_idle_timeout(
		temp_dir.path().join("config.db"),
		Duration::from_millis(100),
	)
	.await
	.unwrap();

	let path = Path::make("system/smtp/host").unwrap();
	adapter.set(&path, b"before idle").await.unwrap();

	// let the reaper close the idle connection, the next query has to
	// prepare its statement again
	tokio::time::sleep(Duration::from_millis(400)).await;
	assert_eq!(&*adapter.value(&path).await.unwrap(), b"before idle");
	adapter.set(&path, b"after idle").await.unwrap();
	assert_eq!(&*adapter.value(&path).await.unwrap(), b"after idle");
}

#[tokio::test]
async fn test_service_over_sqlite_backend() {
	let temp_dir = TempDir::new().unwrap();
	let adapter = Arc::new(
		DataAdapterSqlite::new(temp_dir.path().join("config.db")).await.unwrap(),
	);
	let service = confstore_core::Service::builder().storage(adapter).build().unwrap();

	let route = "catalog/frontend/list_allow_all";
	service.set(&Path::make(route).unwrap(), b"default").await.unwrap();
	service
		.set(&Path::make(route).unwrap().bind(ScopeKind::Website, 2), b"website")
		.await
		.unwrap();

	// the scope fallback works the same over SQL storage
	let store_read = Path::make(route).unwrap().bind(ScopeKind::Store, 2);
	assert_eq!(&*service.value(&store_read).await.unwrap(), b"website");
}

// vim: ts=4

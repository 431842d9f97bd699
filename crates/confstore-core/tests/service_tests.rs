//! Service end to end tests
//!
//! Covers the write pipeline (observers, storage, publication), the scope
//! fallback chain and the change bus wiring through the public API.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use confstore_core::observer::{Event, Observer};
use confstore_core::pubsub::MessageReceiver;
use confstore_core::{MemoryStorage, Scoped, Service};
use confstore_types::prelude::*;

struct Recorder {
	seen: Mutex<Vec<String>>,
}

impl Recorder {
	fn new() -> Arc<Recorder> {
		Arc::new(Recorder { seen: Mutex::new(Vec::new()) })
	}

	fn seen(&self) -> Vec<String> {
		self.seen.lock().unwrap().clone()
	}
}

impl MessageReceiver for Recorder {
	fn message_config(&self, path: &Path) -> CsResult<()> {
		self.seen.lock().unwrap().push(path.fq());
		Ok(())
	}
}

async fn settle() {
	tokio::time::sleep(Duration::from_millis(50)).await;
}

const PORT_GUARD: &str = r#"[{
	"event": "before_set",
	"route": "payment/pp/port",
	"type": "MinMaxInt64",
	"condition": { "conditions": [8080, 8090] }
}]"#;

#[tokio::test]
async fn test_rejected_write_stores_and_publishes_nothing() {
	let _ = tracing_subscriber::fmt().try_init();

	let storage = Arc::new(MemoryStorage::new());
	let service = Service::builder()
		.storage(storage.clone())
		.observers_json(PORT_GUARD)
		.build()
		.unwrap();

	let rec = Recorder::new();
	service.subscribe("payment", rec.clone()).unwrap();

	let path = Path::make("payment/pp/port").unwrap();
	let err = service.set(&path, b"7000").await.unwrap_err();
	assert!(err.is_not_valid());

	settle().await;
	assert!(storage.is_empty());
	assert!(rec.seen().is_empty());
	assert!(service.value(&path).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_accepted_write_publishes_exactly_once() {
	let service = Service::builder().observers_json(PORT_GUARD).build().unwrap();

	let rec = Recorder::new();
	service.subscribe("payment", rec.clone()).unwrap();

	let path = Path::make("payment/pp/port").unwrap();
	service.set(&path, b"8085").await.unwrap();

	settle().await;
	assert_eq!(&*service.value(&path).await.unwrap(), b"8085");
	assert_eq!(rec.seen(), vec!["default/0/payment/pp/port".to_string()]);
}

#[tokio::test]
async fn test_prefix_subscription_sees_only_matching_writes() {
	let service = Service::in_memory();

	let rec = Recorder::new();
	service.subscribe("system", rec.clone()).unwrap();

	service
		.set(&Path::make("system/smtp/host").unwrap(), b"mail.example.com")
		.await
		.unwrap();
	service.set(&Path::make("other/kk/vv").unwrap(), b"x").await.unwrap();

	settle().await;
	assert_eq!(rec.seen(), vec!["default/0/system/smtp/host".to_string()]);
}

#[tokio::test]
async fn test_service_scope_fallback_chain() {
	let service = Service::in_memory();
	let route = "catalog/frontend/list_allow_all";

	service.set(&Path::make(route).unwrap(), b"default").await.unwrap();

	// nothing narrower exists yet, a store read walks up to default
	let store_path = Path::make(route).unwrap().bind(ScopeKind::Store, 5);
	assert_eq!(&*service.value(&store_path).await.unwrap(), b"default");

	// a website value under the same id shadows default
	service
		.set(&Path::make(route).unwrap().bind(ScopeKind::Website, 5), b"website")
		.await
		.unwrap();
	assert_eq!(&*service.value(&store_path).await.unwrap(), b"website");

	// the narrowest value wins
	service.set(&store_path, b"store").await.unwrap();
	assert_eq!(&*service.value(&store_path).await.unwrap(), b"store");

	// an unrelated route still misses everywhere
	let missing = Path::make("catalog/frontend/grid_per_page").unwrap().bind(ScopeKind::Store, 5);
	assert!(service.value(&missing).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_scoped_view_uses_website_mapping() {
	let service = Arc::new(Service::in_memory());
	let route = Route::new("catalog/frontend/list_allow_all").unwrap();

	// store 5 belongs to website 2; the value lives at the website scope
	service
		.set(&Path::new(route.clone()).bind(ScopeKind::Website, 2), b"website-2")
		.await
		.unwrap();

	let scoped = Scoped::new(service, 2, 5);
	let got = scoped.value(&route, ScopeKind::Store).await.unwrap();
	assert_eq!(&*got, b"website-2");
	assert_eq!(
		scoped.invocations(),
		vec![ScopeId::store(5), ScopeId::website(2)]
	);
}

#[tokio::test]
async fn test_after_get_transforms_outgoing_copy_only() {
	let storage = Arc::new(MemoryStorage::new());
	let service = Service::builder().storage(storage.clone()).build().unwrap();

	let upper: Arc<dyn Observer> = Arc::new(|_: &Path, data: &[u8]| -> CsResult<Vec<u8>> {
		Ok(data.to_ascii_uppercase())
	});
	service.observers().register(Event::AfterGet, "system/smtp/host", upper).unwrap();

	let path = Path::make("system/smtp/host").unwrap();
	service.set(&path, b"mail").await.unwrap();

	assert_eq!(&*service.value(&path).await.unwrap(), b"MAIL");
	// the stored bytes stay untouched
	assert_eq!(&*storage.value(&path).await.unwrap(), b"mail");
}

#[tokio::test]
async fn test_after_get_rejection_returns_error_not_bytes() {
	let service = Service::in_memory();
	let reject: Arc<dyn Observer> = Arc::new(|_: &Path, _: &[u8]| -> CsResult<Vec<u8>> {
		Err(Error::NotValid("unreadable".into()))
	});
	service.observers().register(Event::AfterGet, "system/smtp/host", reject).unwrap();

	let path = Path::make("system/smtp/host").unwrap();
	service.set(&path, b"mail").await.unwrap();
	assert!(service.value(&path).await.unwrap_err().is_not_valid());
}

#[tokio::test]
async fn test_after_set_error_does_not_fail_the_write() {
	let _ = tracing_subscriber::fmt().try_init();

	let service = Service::in_memory();
	let fail_count = Arc::new(AtomicUsize::new(0));
	let fc = fail_count.clone();
	let failing: Arc<dyn Observer> = Arc::new(move |_: &Path, _: &[u8]| -> CsResult<Vec<u8>> {
		fc.fetch_add(1, Ordering::SeqCst);
		Err(Error::Fatal("post write hook broke".into()))
	});
	service.observers().register(Event::AfterSet, "system/smtp/host", failing).unwrap();

	let path = Path::make("system/smtp/host").unwrap();
	service.set(&path, b"mail").await.unwrap();

	assert_eq!(fail_count.load(Ordering::SeqCst), 1);
	assert_eq!(&*service.value(&path).await.unwrap(), b"mail");
}

#[tokio::test]
async fn test_before_set_transform_is_persisted() {
	let service = Service::in_memory();
	let trim: Arc<dyn Observer> = Arc::new(|_: &Path, data: &[u8]| -> CsResult<Vec<u8>> {
		Ok(std::str::from_utf8(data)?.trim().as_bytes().to_vec())
	});
	service.observers().register(Event::BeforeSet, "system/smtp/host", trim).unwrap();

	let path = Path::make("system/smtp/host").unwrap();
	service.set(&path, b"  mail.example.com  ").await.unwrap();
	assert_eq!(&*service.value(&path).await.unwrap(), b"mail.example.com");
}

#[tokio::test]
async fn test_close_is_terminal() {
	let service = Service::in_memory();
	service.close().await.unwrap();
	assert!(service.close().await.unwrap_err().is_already_closed());

	// writes still work, only publication stops
	let path = Path::make("system/smtp/host").unwrap();
	service.set(&path, b"mail").await.unwrap();
	assert_eq!(&*service.value(&path).await.unwrap(), b"mail");
}

#[tokio::test]
async fn test_all_keys_passthrough() {
	let service = Service::in_memory();
	service.set(&Path::make("system/smtp/host").unwrap(), b"a").await.unwrap();
	service
		.set(&Path::make("system/smtp/host").unwrap().bind(ScopeKind::Store, 2), b"b")
		.await
		.unwrap();

	let keys = service.all_keys().await.unwrap();
	assert_eq!(keys.len(), 2);
	assert_eq!(keys[0].fq(), "default/0/system/smtp/host");
	assert_eq!(keys[1].fq(), "stores/2/system/smtp/host");
}

// vim: ts=4

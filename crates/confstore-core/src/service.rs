//! Configuration service orchestrator
//!
//! Wires a storage backend, the observer registry and the change bus.
//! Writes run the before/after observer pipeline, persist, and publish
//! exactly one change event; reads resolve through the scope hierarchy.

use async_trait::async_trait;
use std::sync::Arc;

use crate::observer::{Event, FactoryRegistry, Observer, ObserverRegistry};
use crate::prelude::*;
use crate::pubsub::{MessageReceiver, PubSub};
use crate::storage::MemoryStorage;

/// The write seam consumed by the typed models
#[async_trait]
pub trait Setter: Send + Sync {
	async fn set(&self, path: &Path, value: &[u8]) -> CsResult<()>;
}

#[derive(Debug)]
pub struct Service {
	storage: Arc<dyn DataAdapter>,
	observers: ObserverRegistry,
	pubsub: PubSub,
}

impl Service {
	pub fn builder() -> ServiceBuilder {
		ServiceBuilder::default()
	}

	/// A service over in-memory storage without observers
	pub fn in_memory() -> Service {
		Service {
			storage: Arc::new(MemoryStorage::new()),
			observers: ObserverRegistry::new(),
			pubsub: PubSub::new(),
		}
	}

	pub fn observers(&self) -> &ObserverRegistry {
		&self.observers
	}

	/// Writes a value. BeforeSet observers may transform or reject it; a
	/// rejection aborts the write and nothing is stored or published.
	/// AfterSet observer errors are logged and do not fail the write.
	/// Every successful write publishes exactly one change event.
	pub async fn set(&self, path: &Path, value: &[u8]) -> CsResult<()> {
		let data = self.observers.evaluate(Event::BeforeSet, path, value.to_vec())?;
		self.storage.set(path, &data).await?;

		if let Err(err) = self.observers.evaluate(Event::AfterSet, path, data) {
			warn!("after_set observer failed for {}: {}", path, err);
		}

		self.pubsub.publish(path.clone());
		Ok(())
	}

	/// Resolving read. A `NotFound` at the requested scope walks the
	/// hierarchy upwards: Store falls back to Website under the same id,
	/// Website to Default. Callers that know the real website id of a
	/// store use [`crate::Scoped`], which issues its own per-scope reads.
	pub async fn value(&self, path: &Path) -> CsResult<Box<[u8]>> {
		self.observers.evaluate(Event::BeforeGet, path, Vec::new())?;

		let mut current = path.clone();
		let data = loop {
			match self.storage.value(&current).await {
				Ok(data) => break data,
				Err(Error::NotFound) => match current.scope().parent() {
					Some(parent) => current = current.bind_scope(parent),
					None => return Err(Error::NotFound),
				},
				Err(err) => return Err(err),
			}
		};

		let data = self.observers.evaluate(Event::AfterGet, path, data.into_vec())?;
		Ok(data.into())
	}

	/// Reads exactly the requested scope, no fallback. Used by the scoped
	/// view which supplies its own fallback chain.
	pub async fn value_at(&self, path: &Path) -> CsResult<Box<[u8]>> {
		self.observers.evaluate(Event::BeforeGet, path, Vec::new())?;
		let data = self.storage.value(path).await?;
		let data = self.observers.evaluate(Event::AfterGet, path, data.into_vec())?;
		Ok(data.into())
	}

	/// All keys the backend currently stores
	pub async fn all_keys(&self) -> CsResult<Vec<Path>> {
		self.storage.all_keys().await
	}

	pub fn subscribe(&self, topic: &str, receiver: Arc<dyn MessageReceiver>) -> CsResult<usize> {
		self.pubsub.subscribe(topic, receiver)
	}

	pub fn unsubscribe(&self, id: usize) -> CsResult<()> {
		self.pubsub.unsubscribe(id)
	}

	/// Drains and stops the change bus. A second call returns
	/// `AlreadyClosed`.
	pub async fn close(&self) -> CsResult<()> {
		self.pubsub.close().await
	}
}

#[async_trait]
impl Setter for Service {
	async fn set(&self, path: &Path, value: &[u8]) -> CsResult<()> {
		Service::set(self, path, value).await
	}
}

/// Assembles a [`Service`]: storage backend, observer documents and custom
/// observer types.
#[derive(Default)]
pub struct ServiceBuilder {
	storage: Option<Arc<dyn DataAdapter>>,
	observer_docs: Vec<String>,
	factories: FactoryRegistry,
}

impl ServiceBuilder {
	pub fn storage(mut self, storage: Arc<dyn DataAdapter>) -> Self {
		self.storage = Some(storage);
		self
	}

	/// Queues an observer configuration document, applied at build time
	pub fn observers_json(mut self, json: impl Into<String>) -> Self {
		self.observer_docs.push(json.into());
		self
	}

	/// Registers a custom observer type for the configuration documents
	pub fn observer_type<F>(mut self, name: &str, factory: F) -> Self
	where
		F: Fn(&serde_json::Value) -> CsResult<Arc<dyn Observer>> + Send + Sync + 'static,
	{
		self.factories.register(name, factory);
		self
	}

	/// Builds the service. Must be called inside a tokio runtime (the
	/// change bus spawns its delivery task here).
	pub fn build(self) -> CsResult<Service> {
		let observers = ObserverRegistry::new();
		for doc in &self.observer_docs {
			self.factories.load(&observers, doc)?;
		}

		let storage = match self.storage {
			Some(storage) => storage,
			None => Arc::new(MemoryStorage::new()),
		};

		Ok(Service { storage, observers, pubsub: PubSub::new() })
	}
}

// vim: ts=4

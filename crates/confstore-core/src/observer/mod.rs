//! Event observers
//!
//! Observers hook into the service around reads and writes. Each observer
//! is registered for one event and one route (or route prefix) and may
//! inspect, transform or reject the value flowing through.

pub mod loader;
pub mod validate;

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use crate::prelude::*;

pub use loader::FactoryRegistry;
pub use validate::{MinMaxInt64, Strings};

/// The four points in the read/write pipeline an observer can attach to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Event {
	BeforeSet,
	AfterSet,
	BeforeGet,
	AfterGet,
}

impl Event {
	/// Parse the wire name used in observer configuration documents.
	/// Unknown names report `NotFound`.
	pub fn parse(name: &str) -> CsResult<Event> {
		match name {
			"before_set" => Ok(Event::BeforeSet),
			"after_set" => Ok(Event::AfterSet),
			"before_get" => Ok(Event::BeforeGet),
			"after_get" => Ok(Event::AfterGet),
			_ => Err(Error::NotFound),
		}
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			Event::BeforeSet => "before_set",
			Event::AfterSet => "after_set",
			Event::BeforeGet => "before_get",
			Event::AfterGet => "after_get",
		}
	}
}

/// An observer receives the bytes flowing through the service and returns
/// the (possibly transformed) bytes, or rejects with any error. The first
/// rejection short circuits the pipeline.
pub trait Observer: Send + Sync {
	fn observe(&self, path: &Path, data: &[u8]) -> CsResult<Vec<u8>>;
}

impl<F> Observer for F
where
	F: Fn(&Path, &[u8]) -> CsResult<Vec<u8>> + Send + Sync,
{
	fn observe(&self, path: &Path, data: &[u8]) -> CsResult<Vec<u8>> {
		self(path, data)
	}
}

/// event -> route -> observers in registration order
type ObserverMap = HashMap<Event, HashMap<Box<str>, Vec<Arc<dyn Observer>>>>;

/// Maps `(event, route)` to an ordered observer list.
///
/// Routes may be full three segment routes or shorter prefixes; dispatch
/// checks every prefix level of the evaluated path, so an observer
/// registered on `payment` also runs for `payment/pp/port`.
#[derive(Default)]
pub struct ObserverRegistry {
	map: RwLock<ObserverMap>,
}

impl ObserverRegistry {
	pub fn new() -> ObserverRegistry {
		ObserverRegistry::default()
	}

	/// Registers an observer. Registering the same observer instance twice
	/// under the same (event, route) is a no-op.
	pub fn register(&self, event: Event, route: &str, observer: Arc<dyn Observer>) -> CsResult<()> {
		if route.is_empty() {
			return Err(Error::Empty("observer route".into()));
		}
		let mut map = self.map.write();
		let list = map.entry(event).or_default().entry(route.into()).or_default();
		if list.iter().any(|o| Arc::ptr_eq(o, &observer)) {
			return Ok(());
		}
		list.push(observer);
		Ok(())
	}

	/// Removes every observer registered under (event, route)
	pub fn deregister(&self, event: Event, route: &str) -> CsResult<()> {
		let mut map = self.map.write();
		if let Some(routes) = map.get_mut(&event) {
			routes.remove(route);
			if routes.is_empty() {
				map.remove(&event);
			}
		}
		Ok(())
	}

	/// Runs all observers matching the path at any prefix level, in
	/// registration order, threading the data through each. The first
	/// error propagates.
	pub fn evaluate(&self, event: Event, path: &Path, data: Vec<u8>) -> CsResult<Vec<u8>> {
		let map = self.map.read();
		let Some(routes) = map.get(&event) else { return Ok(data) };

		let mut data = data;
		for level in [1, 2, -1] {
			let Some(list) = routes.get(path.level(level)) else { continue };
			for observer in list {
				data = observer.observe(path, &data)?;
			}
		}
		Ok(data)
	}

	pub fn is_empty(&self) -> bool {
		self.map.read().is_empty()
	}
}

impl std::fmt::Debug for ObserverRegistry {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		let map = self.map.read();
		let routes: usize = map.values().map(|r| r.len()).sum();
		f.debug_struct("ObserverRegistry").field("routes", &routes).finish()
	}
}


// vim: ts=4

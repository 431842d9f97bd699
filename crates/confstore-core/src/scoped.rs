//! Scoped view over the service
//!
//! A caller side helper bound to a website and a store id. Reads walk the
//! fallback chain store -> website -> default, calling the service once per
//! scope and stopping at the first hit. Every scope touched is recorded,
//! which tests and observability use to assert the walk.

use parking_lot::Mutex;
use std::sync::Arc;

use crate::prelude::*;
use crate::service::Service;

pub struct Scoped {
	service: Arc<Service>,
	website_id: i64,
	store_id: i64,
	invocations: Mutex<Vec<ScopeId>>,
}

impl Scoped {
	pub fn new(service: Arc<Service>, website_id: i64, store_id: i64) -> Scoped {
		Scoped {
			service,
			website_id,
			store_id,
			invocations: Mutex::new(Vec::new()),
		}
	}

	pub fn website_id(&self) -> i64 {
		self.website_id
	}

	pub fn store_id(&self) -> i64 {
		self.store_id
	}

	pub fn service(&self) -> &Arc<Service> {
		&self.service
	}

	/// The fallback chain for a read capped at `top`: the store binding,
	/// then the website binding, then default.
	fn chain(&self, top: ScopeKind) -> Vec<ScopeId> {
		match top {
			ScopeKind::Store => vec![
				ScopeId::store(self.store_id),
				ScopeId::website(self.website_id),
				ScopeId::DEFAULT,
			],
			ScopeKind::Website => vec![ScopeId::website(self.website_id), ScopeId::DEFAULT],
			ScopeKind::Default | ScopeKind::Group => vec![ScopeId::DEFAULT],
		}
	}

	/// Reads a route, walking the fallback chain from `top` downwards to
	/// default. A narrower value always wins over a broader one. Only a
	/// miss at every level reports `NotFound`.
	pub async fn value(&self, route: &Route, top: ScopeKind) -> CsResult<Box<[u8]>> {
		for scope in self.chain(top) {
			self.invocations.lock().push(scope);
			let path = Path::new(route.clone()).bind_scope(scope);
			match self.service.value_at(&path).await {
				Ok(data) => return Ok(data),
				Err(Error::NotFound) => continue,
				Err(err) => return Err(err),
			}
		}
		Err(Error::NotFound)
	}

	/// Every scope a read has touched, in order
	pub fn invocations(&self) -> Vec<ScopeId> {
		self.invocations.lock().clone()
	}
}

impl std::fmt::Debug for Scoped {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		f.debug_struct("Scoped")
			.field("website_id", &self.website_id)
			.field("store_id", &self.store_id)
			.finish()
	}
}


// vim: ts=4

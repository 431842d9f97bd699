//! Typed models over the byte oriented service
//!
//! A model owns a route and optionally a field descriptor carrying a
//! default value, the permitted scopes and an enumerated source list.
//! Reads go through a [`crate::Scoped`] view at the field's top scope and
//! fall back to the default; writes encode and pass through the
//! [`crate::Setter`] seam, validating against the source list when one is
//! configured.

pub mod primitives;
pub mod time;
pub mod web;

pub use primitives::{Bool, Byte, Csv, Float, Int, IntMap, Str};
pub use time::{Duration, Time};
pub use web::Url;

use crate::prelude::*;
use crate::scoped::Scoped;
use crate::service::Setter;

/// Metadata of a configuration field
#[derive(Debug, Clone, Default)]
pub struct Field {
	/// Raw encoded default, applied when no scope stores a value
	pub default: Option<Box<[u8]>>,
	/// Scopes at which the field may carry a value; reads start at
	/// `scopes.top()`
	pub scopes: Perm,
	/// Enumerated allowed encoded values; writes outside the set fail
	pub source: Option<Vec<String>>,
}

impl Field {
	pub fn new() -> Field {
		Field::default()
	}

	pub fn default_str(mut self, v: &str) -> Field {
		self.default = Some(v.as_bytes().into());
		self
	}

	pub fn default_raw(mut self, v: &[u8]) -> Field {
		self.default = Some(v.into());
		self
	}

	pub fn scopes(mut self, scopes: Perm) -> Field {
		self.scopes = scopes;
		self
	}

	pub fn source(mut self, values: &[&str]) -> Field {
		self.source = Some(values.iter().map(|v| v.to_string()).collect());
		self
	}
}

/// Route plus field descriptor, the common plumbing of every typed model
#[derive(Debug, Clone)]
pub struct BaseValue {
	route: Route,
	field: Option<Field>,
}

impl BaseValue {
	pub fn new(route: &str) -> CsResult<BaseValue> {
		Ok(BaseValue { route: Route::new(route)?, field: None })
	}

	pub fn with_field(mut self, field: Field) -> BaseValue {
		self.field = Some(field);
		self
	}

	pub fn route(&self) -> &Route {
		&self.route
	}

	/// The scope a read starts at. Without a field the default scope is
	/// enforced.
	pub fn top_scope(&self) -> ScopeKind {
		self.field.as_ref().map(|f| f.scopes.top()).unwrap_or(ScopeKind::Default)
	}

	pub fn default_raw(&self) -> Option<&[u8]> {
		self.field.as_ref().and_then(|f| f.default.as_deref())
	}

	pub fn source(&self) -> Option<&[String]> {
		self.field.as_ref().and_then(|f| f.source.as_deref())
	}

	/// The stored bytes, `None` when no scope carries a value
	pub async fn raw(&self, sg: &Scoped) -> CsResult<Option<Box<[u8]>>> {
		match sg.value(&self.route, self.top_scope()).await {
			Ok(data) => Ok(Some(data)),
			Err(Error::NotFound) => Ok(None),
			Err(err) => Err(err),
		}
	}

	fn source_ok(&self, encoded: &str) -> CsResult<()> {
		if let Some(source) = self.field.as_ref().and_then(|f| f.source.as_ref()) {
			if !source.iter().any(|s| s == encoded) {
				return Err(Error::NotValid(format!(
					"{:?} at {} is not in the source list {:?}",
					encoded, self.route, source
				)));
			}
		}
		Ok(())
	}

	/// Writes after checking the encoded value against the source list
	pub async fn write_raw(&self, w: &dyn Setter, data: &[u8], scope: ScopeId) -> CsResult<()> {
		if self.source().is_some() {
			self.source_ok(std::str::from_utf8(data)?)?;
		}
		self.write_unchecked(w, data, scope).await
	}

	/// Writes without source validation. Models with their own token level
	/// validation use this directly.
	pub async fn write_unchecked(
		&self,
		w: &dyn Setter,
		data: &[u8],
		scope: ScopeId,
	) -> CsResult<()> {
		let path = Path::new(self.route.clone()).bind_scope(scope);
		w.set(&path, data).await
	}
}

// vim: ts=4

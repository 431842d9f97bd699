//! URL model

use crate::prelude::*;
use crate::scoped::Scoped;
use crate::service::Setter;

use super::{BaseValue, Field};

fn decode_url(data: &[u8]) -> CsResult<url::Url> {
	let s = std::str::from_utf8(data)?;
	url::Url::parse(s.trim()).map_err(|err| Error::NotValid(format!("url {:?}: {}", s, err)))
}

/// URL field. `value` is `None` when no scope stores one and the field
/// has no default.
#[derive(Debug, Clone)]
pub struct Url {
	base: BaseValue,
}

impl Url {
	pub fn new(route: &str) -> CsResult<Url> {
		Ok(Url { base: BaseValue::new(route)? })
	}

	pub fn with_field(mut self, field: Field) -> Url {
		self.base = self.base.with_field(field);
		self
	}

	pub async fn value(&self, sg: &Scoped) -> CsResult<Option<url::Url>> {
		match self.base.raw(sg).await? {
			Some(raw) => Ok(Some(decode_url(&raw)?)),
			None => match self.base.default_raw() {
				Some(d) => Ok(Some(decode_url(d)?)),
				None => Ok(None),
			},
		}
	}

	pub async fn write(&self, w: &dyn Setter, v: &url::Url, scope: ScopeId) -> CsResult<()> {
		self.base.write_raw(w, v.as_str().as_bytes(), scope).await
	}
}


// vim: ts=4

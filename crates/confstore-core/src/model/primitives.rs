//! Scalar and string models
//!
//! Stable textual encodings: bool as `"1"`/`"0"`, integers and floats as
//! decimal strings, CSV joined by a configurable separator.

use std::sync::Arc;

use crate::prelude::*;
use crate::scoped::Scoped;
use crate::service::Setter;

use super::{BaseValue, Field};

fn decode_bool(data: &[u8]) -> CsResult<bool> {
	match std::str::from_utf8(data)? {
		"1" | "true" => Ok(true),
		"0" | "false" => Ok(false),
		s => Err(Error::NotValid(format!("{:?} is not a bool", s))),
	}
}

fn decode_i64(data: &[u8]) -> CsResult<i64> {
	let s = std::str::from_utf8(data)?;
	s.trim().parse().map_err(|_| Error::NotValid(format!("{:?} is not an int64", s)))
}

fn decode_f64(data: &[u8]) -> CsResult<f64> {
	let s = std::str::from_utf8(data)?;
	s.trim().parse().map_err(|_| Error::NotValid(format!("{:?} is not a float64", s)))
}

fn decode_str(data: &[u8]) -> CsResult<String> {
	String::from_utf8(data.to_vec())
		.map_err(|err| Error::NotValid(format!("invalid utf-8 string: {}", err)))
}

/// Boolean field, stored as `"1"` or `"0"`
#[derive(Debug, Clone)]
pub struct Bool {
	base: BaseValue,
}

impl Bool {
	pub fn new(route: &str) -> CsResult<Bool> {
		Ok(Bool { base: BaseValue::new(route)? })
	}

	pub fn with_field(mut self, field: Field) -> Bool {
		self.base = self.base.with_field(field);
		self
	}

	pub async fn value(&self, sg: &Scoped) -> CsResult<bool> {
		match self.base.raw(sg).await? {
			Some(raw) => decode_bool(&raw),
			None => match self.base.default_raw() {
				Some(d) => decode_bool(d),
				None => Ok(false),
			},
		}
	}

	pub async fn write(&self, w: &dyn Setter, v: bool, scope: ScopeId) -> CsResult<()> {
		self.base.write_raw(w, if v { b"1" } else { b"0" }, scope).await
	}
}

/// Signed integer field
#[derive(Debug, Clone)]
pub struct Int {
	base: BaseValue,
}

impl Int {
	pub fn new(route: &str) -> CsResult<Int> {
		Ok(Int { base: BaseValue::new(route)? })
	}

	pub fn with_field(mut self, field: Field) -> Int {
		self.base = self.base.with_field(field);
		self
	}

	pub async fn value(&self, sg: &Scoped) -> CsResult<i64> {
		match self.base.raw(sg).await? {
			Some(raw) => decode_i64(&raw),
			None => match self.base.default_raw() {
				Some(d) => decode_i64(d),
				None => Ok(0),
			},
		}
	}

	pub async fn write(&self, w: &dyn Setter, v: i64, scope: ScopeId) -> CsResult<()> {
		self.base.write_raw(w, v.to_string().as_bytes(), scope).await
	}
}

/// Floating point field
#[derive(Debug, Clone)]
pub struct Float {
	base: BaseValue,
}

impl Float {
	pub fn new(route: &str) -> CsResult<Float> {
		Ok(Float { base: BaseValue::new(route)? })
	}

	pub fn with_field(mut self, field: Field) -> Float {
		self.base = self.base.with_field(field);
		self
	}

	pub async fn value(&self, sg: &Scoped) -> CsResult<f64> {
		match self.base.raw(sg).await? {
			Some(raw) => decode_f64(&raw),
			None => match self.base.default_raw() {
				Some(d) => decode_f64(d),
				None => Ok(0.0),
			},
		}
	}

	pub async fn write(&self, w: &dyn Setter, v: f64, scope: ScopeId) -> CsResult<()> {
		self.base.write_raw(w, v.to_string().as_bytes(), scope).await
	}
}

/// String field
#[derive(Debug, Clone)]
pub struct Str {
	base: BaseValue,
}

impl Str {
	pub fn new(route: &str) -> CsResult<Str> {
		Ok(Str { base: BaseValue::new(route)? })
	}

	pub fn with_field(mut self, field: Field) -> Str {
		self.base = self.base.with_field(field);
		self
	}

	pub async fn value(&self, sg: &Scoped) -> CsResult<String> {
		match self.base.raw(sg).await? {
			Some(raw) => decode_str(&raw),
			None => match self.base.default_raw() {
				Some(d) => decode_str(d),
				None => Ok(String::new()),
			},
		}
	}

	pub async fn write(&self, w: &dyn Setter, v: &str, scope: ScopeId) -> CsResult<()> {
		self.base.write_raw(w, v.as_bytes(), scope).await
	}
}

/// Raw bytes field, the identity model
#[derive(Debug, Clone)]
pub struct Byte {
	base: BaseValue,
}

impl Byte {
	pub fn new(route: &str) -> CsResult<Byte> {
		Ok(Byte { base: BaseValue::new(route)? })
	}

	pub fn with_field(mut self, field: Field) -> Byte {
		self.base = self.base.with_field(field);
		self
	}

	pub async fn value(&self, sg: &Scoped) -> CsResult<Box<[u8]>> {
		match self.base.raw(sg).await? {
			Some(raw) => Ok(raw),
			None => Ok(self.base.default_raw().map(Into::into).unwrap_or_default()),
		}
	}

	pub async fn write(&self, w: &dyn Setter, v: &[u8], scope: ScopeId) -> CsResult<()> {
		self.base.write_raw(w, v, scope).await
	}
}

/// Separated string list. The separator defaults to a comma. When the
/// field carries a source list, every token is validated against it.
#[derive(Debug, Clone)]
pub struct Csv {
	base: BaseValue,
	sep: char,
}

impl Csv {
	pub fn new(route: &str) -> CsResult<Csv> {
		Ok(Csv { base: BaseValue::new(route)?, sep: ',' })
	}

	pub fn with_field(mut self, field: Field) -> Csv {
		self.base = self.base.with_field(field);
		self
	}

	pub fn with_separator(mut self, sep: char) -> Csv {
		self.sep = sep;
		self
	}

	pub async fn value(&self, sg: &Scoped) -> CsResult<Vec<String>> {
		let raw = match self.base.raw(sg).await? {
			Some(raw) => raw,
			None => match self.base.default_raw() {
				Some(d) => d.into(),
				None => return Ok(Vec::new()),
			},
		};
		let s = decode_str(&raw)?;
		if s.is_empty() {
			return Ok(Vec::new());
		}
		Ok(s.split(self.sep).map(str::to_string).collect())
	}

	/// Writes a token list. With a source list every single token is
	/// validated, not the joined string.
	pub async fn write(&self, w: &dyn Setter, tokens: &[&str], scope: ScopeId) -> CsResult<()> {
		if let Some(source) = self.base.source() {
			for token in tokens {
				if !source.iter().any(|s| s == token) {
					return Err(Error::NotValid(format!(
						"token {:?} at {} is not in the source list",
						token,
						self.base.route()
					)));
				}
			}
		}
		let joined = tokens.join(&self.sep.to_string());
		self.base.write_unchecked(w, joined.as_bytes(), scope).await
	}
}

/// Integer keyed lookup. The stored value is an i64 which a caller
/// provided resolver maps to its display string; unknown keys report
/// `NotFound`.
pub struct IntMap {
	base: BaseValue,
	resolver: Arc<dyn Fn(i64) -> Option<String> + Send + Sync>,
}

impl IntMap {
	pub fn new<F>(route: &str, resolver: F) -> CsResult<IntMap>
	where
		F: Fn(i64) -> Option<String> + Send + Sync + 'static,
	{
		Ok(IntMap { base: BaseValue::new(route)?, resolver: Arc::new(resolver) })
	}

	pub fn with_field(mut self, field: Field) -> IntMap {
		self.base = self.base.with_field(field);
		self
	}

	pub async fn value(&self, sg: &Scoped) -> CsResult<String> {
		let key = match self.base.raw(sg).await? {
			Some(raw) => decode_i64(&raw)?,
			None => match self.base.default_raw() {
				Some(d) => decode_i64(d)?,
				None => return Err(Error::NotFound),
			},
		};
		(self.resolver)(key).ok_or(Error::NotFound)
	}

	/// Writes a key; keys the resolver does not know are rejected
	pub async fn write(&self, w: &dyn Setter, key: i64, scope: ScopeId) -> CsResult<()> {
		if (self.resolver)(key).is_none() {
			return Err(Error::NotValid(format!(
				"key {} at {} has no mapping",
				key,
				self.base.route()
			)));
		}
		self.base.write_raw(w, key.to_string().as_bytes(), scope).await
	}
}

impl std::fmt::Debug for IntMap {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		f.debug_struct("IntMap").field("route", self.base.route()).finish()
	}
}


// vim: ts=4

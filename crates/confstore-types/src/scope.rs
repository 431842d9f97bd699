//! Scope kinds and packed scope identifiers
//!
//! A configuration value lives at one of the tenancy scopes
//! `Default < Website < Store`. `Group` exists for completeness but folds to
//! `Default` whenever it is used as a binding target.

use serde::{Deserialize, Serialize};

use crate::error::{CsResult, Error};

/// The tenancy dimension at which a value is addressed. The discriminant is
/// stable: `1 << kind` indexes a [`crate::Perm`] bit set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ScopeKind {
	#[serde(rename = "default")]
	Default = 0,
	#[serde(rename = "websites")]
	Website = 1,
	#[serde(rename = "groups")]
	Group = 2,
	#[serde(rename = "stores")]
	Store = 3,
}

impl ScopeKind {
	/// The textual prefix of a fully qualified path (plural form)
	pub fn as_str(&self) -> &'static str {
		match self {
			ScopeKind::Default => "default",
			ScopeKind::Website => "websites",
			ScopeKind::Group => "groups",
			ScopeKind::Store => "stores",
		}
	}

	/// Capitalised name as used in the `Perm` JSON array
	pub fn name(&self) -> &'static str {
		match self {
			ScopeKind::Default => "Default",
			ScopeKind::Website => "Website",
			ScopeKind::Group => "Group",
			ScopeKind::Store => "Store",
		}
	}

	/// Parse a scope name. Accepts the plural path prefix, the singular name
	/// and the one letter shorthand.
	pub fn parse(name: &str) -> CsResult<ScopeKind> {
		match name {
			"default" | "d" | "" => Ok(ScopeKind::Default),
			"websites" | "website" | "w" => Ok(ScopeKind::Website),
			"groups" | "group" | "g" => Ok(ScopeKind::Group),
			"stores" | "store" | "s" => Ok(ScopeKind::Store),
			_ => Err(Error::NotSupported(format!(
				"scope identifier {:?}, available: d,w,g,s",
				name
			))),
		}
	}

	/// Parse only the plural form used as a fully qualified path prefix
	pub fn from_prefix(prefix: &str) -> CsResult<ScopeKind> {
		match prefix {
			"default" => Ok(ScopeKind::Default),
			"websites" => Ok(ScopeKind::Website),
			"groups" => Ok(ScopeKind::Group),
			"stores" => Ok(ScopeKind::Store),
			_ => Err(Error::NotSupported(format!("scope prefix {:?}", prefix))),
		}
	}

	fn from_u8(kind: u8) -> ScopeKind {
		match kind {
			1 => ScopeKind::Website,
			2 => ScopeKind::Group,
			3 => ScopeKind::Store,
			_ => ScopeKind::Default,
		}
	}

	/// The next broader scope in the hierarchy, `None` for `Default`.
	/// `Group` folds to `Default`.
	pub fn parent(&self) -> Option<ScopeKind> {
		match self {
			ScopeKind::Store => Some(ScopeKind::Website),
			ScopeKind::Website | ScopeKind::Group => Some(ScopeKind::Default),
			ScopeKind::Default => None,
		}
	}
}

impl std::fmt::Display for ScopeKind {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A scope kind and its numeric id packed into a single `i64` as
/// `id << 8 | kind`. A `(Default, *)` or `(Group, *)` pair canonicalises to
/// `(Default, 0)`, so two equal scope ids always compare equal bit for bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScopeId(i64);

impl ScopeId {
	pub const DEFAULT: ScopeId = ScopeId(ScopeKind::Default as i64);

	pub fn new(kind: ScopeKind, id: i64) -> ScopeId {
		match kind {
			// Group has no binding semantics of its own
			ScopeKind::Default | ScopeKind::Group => ScopeId::DEFAULT,
			_ => ScopeId(id << 8 | kind as i64),
		}
	}

	pub fn website(id: i64) -> ScopeId {
		ScopeId::new(ScopeKind::Website, id)
	}

	pub fn store(id: i64) -> ScopeId {
		ScopeId::new(ScopeKind::Store, id)
	}

	pub fn kind(&self) -> ScopeKind {
		ScopeKind::from_u8((self.0 & 0xff) as u8)
	}

	/// The numeric id. Arithmetic shift keeps negative ids intact.
	pub fn id(&self) -> i64 {
		self.0 >> 8
	}

	pub fn unpack(&self) -> (ScopeKind, i64) {
		(self.kind(), self.id())
	}

	/// The same id one scope level up, `None` when already at `Default`
	pub fn parent(&self) -> Option<ScopeId> {
		self.kind().parent().map(|k| ScopeId::new(k, self.id()))
	}
}

impl Default for ScopeId {
	fn default() -> Self {
		ScopeId::DEFAULT
	}
}

impl std::fmt::Display for ScopeId {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		write!(f, "{}/{}", self.kind().as_str(), self.id())
	}
}


// vim: ts=4

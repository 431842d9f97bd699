//! Scope permission bit sets
//!
//! A `Perm` records at which scopes a configuration field may be written.
//! The backing store does not support the Group scope, hence none of the
//! convenience constants include it.

use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};

use crate::error::CsResult;
use crate::scope::ScopeKind;

/// Bit set over [`ScopeKind`]. u16 is big enough.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Perm(u16);

/// Default scope only
pub const PERM_DEFAULT: Perm = Perm(1 << ScopeKind::Default as u16);

/// Default and website scopes
pub const PERM_WEBSITE: Perm =
	Perm(1 << ScopeKind::Default as u16 | 1 << ScopeKind::Website as u16);

/// Default, website and store scopes
pub const PERM_STORE: Perm = Perm(
	1 << ScopeKind::Default as u16
		| 1 << ScopeKind::Website as u16
		| 1 << ScopeKind::Store as u16,
);

const MAX_KIND: u16 = ScopeKind::Store as u16 + 1;

impl Perm {
	pub const fn empty() -> Perm {
		Perm(0)
	}

	/// All scopes the hierarchy knows: Default, Website and Store
	pub fn all() -> Perm {
		PERM_STORE
	}

	/// Parse a permission name with the same aliases as scope parsing:
	/// `default`/`d`/`` -> PERM_DEFAULT, `websites`/`website`/`w` ->
	/// PERM_WEBSITE, `stores`/`store`/`s` -> PERM_STORE.
	pub fn parse(name: &str) -> CsResult<Perm> {
		match ScopeKind::parse(name)? {
			ScopeKind::Default | ScopeKind::Group => Ok(PERM_DEFAULT),
			ScopeKind::Website => Ok(PERM_WEBSITE),
			ScopeKind::Store => Ok(PERM_STORE),
		}
	}

	/// Add a scope kind, chainable
	pub fn set(self, kind: ScopeKind) -> Perm {
		Perm(self.0 | 1 << kind as u16)
	}

	pub fn has(&self, kind: ScopeKind) -> bool {
		self.0 & (1 << kind as u16) != 0
	}

	pub fn is_zero(&self) -> bool {
		self.0 == 0
	}

	/// The highest scope present. A zero Perm reports Default.
	pub fn top(&self) -> ScopeKind {
		if self.has(ScopeKind::Store) {
			ScopeKind::Store
		} else if self.has(ScopeKind::Website) {
			ScopeKind::Website
		} else {
			ScopeKind::Default
		}
	}

	/// Names of the contained scopes in hierarchy order
	pub fn human(&self) -> Vec<&'static str> {
		let mut ret = Vec::with_capacity(MAX_KIND as usize);
		for kind in [
			ScopeKind::Default,
			ScopeKind::Website,
			ScopeKind::Group,
			ScopeKind::Store,
		] {
			if self.has(kind) {
				ret.push(kind.name());
			}
		}
		ret
	}
}

impl std::fmt::Display for Perm {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		f.write_str(&self.human().join(","))
	}
}

/// A zero Perm serialises as `null`, otherwise as the ordered name array,
/// e.g. `["Default","Website","Store"]`.
impl Serialize for Perm {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		if self.is_zero() {
			return serializer.serialize_unit();
		}
		let names = self.human();
		let mut seq = serializer.serialize_seq(Some(names.len()))?;
		for name in names {
			seq.serialize_element(name)?;
		}
		seq.end()
	}
}


// vim: ts=4

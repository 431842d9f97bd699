//! Configuration routes and scope qualified paths
//!
//! A `Route` is the three segment identifier of a setting, e.g.
//! `system/smtp/host`. A `Path` binds a route to a scope and produces the
//! fully qualified form stored in the backend, e.g.
//! `stores/5/system/smtp/host`.

use serde::{Serialize, Serializer};

use crate::error::{CsResult, Error};
use crate::scope::{ScopeId, ScopeKind};

/// How many segments a route carries. A fully qualified path has
/// `LEVELS + 2` segments (scope prefix and id in front).
pub const LEVELS: usize = 3;

const SEPARATOR: char = '/';

/// 32-bit FNV-1a, the hash under which PubSub indexes topics
pub fn hash32(data: &[u8]) -> u32 {
	let mut hash: u32 = 0x811c_9dc5;
	for b in data {
		hash ^= u32::from(*b);
		hash = hash.wrapping_mul(0x0100_0193);
	}
	hash
}

/// A validated route. Immutable after creation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Route(Box<str>);

impl Route {
	/// Validates and creates a route. The grammar: exactly [`LEVELS`]
	/// segments of `[A-Za-z0-9_]`, each segment at least two characters,
	/// eight characters in total, ASCII only. Case sensitive.
	pub fn new(route: &str) -> CsResult<Route> {
		if route.is_empty() {
			return Err(Error::Empty("route".into()));
		}

		let mut separators = 0usize;
		for b in route.bytes() {
			let ok = b.is_ascii_alphanumeric() || b == b'_' || b == b'/';
			if b == b'/' {
				separators += 1;
			}
			if !ok {
				return Err(Error::NotValid(format!(
					"character {:?} is not allowed in route {:?}",
					char::from(b),
					route
				)));
			}
		}

		if separators != LEVELS - 1 || route.len() < 8 {
			return Err(Error::NotValid(format!(
				"incorrect route {:?}: too short or wrong number of separators",
				route
			)));
		}
		if route.split(SEPARATOR).any(|seg| seg.len() < 2) {
			return Err(Error::NotValid(format!(
				"incorrect route {:?}: each segment needs at least two characters",
				route
			)));
		}

		Ok(Route(route.into()))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	pub fn segments(&self) -> impl Iterator<Item = &str> {
		self.0.split(SEPARATOR)
	}

	/// The first `level` segments. A negative level returns the whole
	/// route, level zero the empty string.
	pub fn level(&self, level: i32) -> &str {
		if level < 0 || level as usize >= LEVELS {
			return &self.0;
		}
		if level == 0 {
			return "";
		}
		let mut seen = 0;
		for (pos, c) in self.0.char_indices() {
			if c == SEPARATOR {
				seen += 1;
				if seen == level {
					return &self.0[..pos];
				}
			}
		}
		&self.0
	}
}

impl std::fmt::Display for Route {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		f.write_str(&self.0)
	}
}

impl AsRef<str> for Route {
	fn as_ref(&self) -> &str {
		&self.0
	}
}

impl TryFrom<&str> for Route {
	type Error = Error;

	fn try_from(route: &str) -> CsResult<Route> {
		Route::new(route)
	}
}

impl Serialize for Route {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(&self.0)
	}
}

/// A route bound to a scope. Value type, rebinding returns a new path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path {
	route: Route,
	scope: ScopeId,
}

impl Path {
	/// A path at the default scope
	pub fn new(route: Route) -> Path {
		Path { route, scope: ScopeId::DEFAULT }
	}

	/// Validates the route string and creates a path at the default scope
	pub fn make(route: &str) -> CsResult<Path> {
		Ok(Path::new(Route::new(route)?))
	}

	/// Rebind to a scope kind and id. Default and Group canonicalise the
	/// id to zero.
	pub fn bind(mut self, kind: ScopeKind, id: i64) -> Path {
		self.scope = ScopeId::new(kind, id);
		self
	}

	pub fn bind_scope(mut self, scope: ScopeId) -> Path {
		self.scope = scope;
		self
	}

	pub fn route(&self) -> &Route {
		&self.route
	}

	pub fn scope(&self) -> ScopeId {
		self.scope
	}

	/// The fully qualified form `<scope>/<id>/<route>`
	pub fn fq(&self) -> String {
		let (kind, id) = self.scope.unpack();
		format!("{}/{}/{}", kind.as_str(), id, self.route)
	}

	/// The first `level` segments of the route, without scope prefix
	pub fn level(&self, level: i32) -> &str {
		self.route.level(level)
	}

	/// Topic hash over the route prefix alone
	pub fn hash(&self, level: i32) -> u32 {
		hash32(self.route.level(level).as_bytes())
	}

	/// Topic hash over the scope qualified prefix,
	/// `<scope>/<id>/<route prefix>`
	pub fn hash_scoped(&self, level: i32) -> u32 {
		let (kind, id) = self.scope.unpack();
		hash32(format!("{}/{}/{}", kind.as_str(), id, self.route.level(level)).as_bytes())
	}

	/// Inverse of [`Path::fq`].
	///
	/// `stores/5/catalog/frontend/list_allow_all` splits into the scope
	/// `stores`, the id `5` and the route `catalog/frontend/list_allow_all`.
	/// `default/5/a/b/c` normalises to `default/0/a/b/c`.
	pub fn split(fq: &str) -> CsResult<Path> {
		if fq.matches(SEPARATOR).count() < LEVELS + 1 {
			return Err(Error::NotValid(format!(
				"incorrect fully qualified path {:?}",
				fq
			)));
		}

		let (prefix, rest) = fq
			.split_once(SEPARATOR)
			.ok_or_else(|| Error::NotValid(format!("incorrect fully qualified path {:?}", fq)))?;
		let kind = ScopeKind::from_prefix(prefix)?;

		let (id, route) = rest
			.split_once(SEPARATOR)
			.ok_or_else(|| Error::NotValid(format!("incorrect fully qualified path {:?}", fq)))?;
		let id: i64 = id
			.parse()
			.map_err(|_| Error::NotValid(format!("scope id {:?} is not an integer", id)))?;

		Ok(Path {
			route: Route::new(route)?,
			scope: ScopeId::new(kind, id),
		})
	}
}

impl std::fmt::Display for Path {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		f.write_str(&self.fq())
	}
}

impl PartialOrd for Path {
	fn partial_cmp(&self, other: &Path) -> Option<std::cmp::Ordering> {
		Some(self.cmp(other))
	}
}

/// Orders like the backend does: scope, scope id, route
impl Ord for Path {
	fn cmp(&self, other: &Path) -> std::cmp::Ordering {
		self.scope
			.unpack()
			.cmp(&other.scope.unpack())
			.then_with(|| self.route.cmp(&other.route))
	}
}

impl Serialize for Path {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(&self.fq())
	}
}


// vim: ts=4

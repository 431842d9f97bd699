//! SQLite storage backend
//!
//! Persists configuration values in a `config_data` table keyed by
//! `(scope, scope_id, path)`. Statements are prepared once per pooled
//! connection and cached by sqlx; the pool reaper closes connections that
//! sit idle past the configured timeout, and the next use transparently
//! re-prepares. A connection executing a statement is checked out of the
//! pool and can never be reaped mid-flight.

use async_trait::async_trait;
use sqlx::{sqlite, sqlite::SqlitePool, Row};
use std::path::Path as FsPath;
use std::time::Duration;

use confstore_types::prelude::*;

mod schema;

/// How long an unused pooled connection (and its prepared statements)
/// survives before the reaper closes it
const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30);

const MAX_CONNECTIONS: u32 = 5;

#[derive(Debug)]
pub struct DataAdapterSqlite {
	db: SqlitePool,
}

impl DataAdapterSqlite {
	/// Opens (or creates) the database file with WAL journaling and the
	/// default idle timeout
	pub async fn new(path: impl AsRef<FsPath>) -> CsResult<Self> {
		Self::with_idle_timeout(path, DEFAULT_IDLE_TIMEOUT).await
	}

	pub async fn with_idle_timeout(
		path: impl AsRef<FsPath>,
		idle_timeout: Duration,
	) -> CsResult<Self> {
		let opts = sqlite::SqliteConnectOptions::new()
			.filename(path.as_ref())
			.create_if_missing(true)
			.journal_mode(sqlite::SqliteJournalMode::Wal);
		let db = sqlite::SqlitePoolOptions::new()
			.max_connections(MAX_CONNECTIONS)
			.idle_timeout(idle_timeout)
			.connect_with(opts)
			.await
			.inspect_err(|err| warn!("DB: {:#?}", err))
			.map_err(|_| Error::Db)?;

		schema::init_db(&db)
			.await
			.inspect_err(|err| warn!("DB: {:#?}", err))
			.map_err(|_| Error::Db)?;

		Ok(Self { db })
	}

	/// Pool handle, for tests and maintenance queries
	pub fn pool(&self) -> &SqlitePool {
		&self.db
	}

	pub async fn close(&self) {
		self.db.close().await;
	}
}

#[async_trait]
impl DataAdapter for DataAdapterSqlite {
	async fn set(&self, path: &Path, value: &[u8]) -> CsResult<()> {
		let (kind, id) = path.scope().unpack();
		sqlx::query(
			"INSERT INTO config_data (scope, scope_id, path, value) VALUES (?, ?, ?, ?)
				ON CONFLICT(scope, scope_id, path) DO UPDATE SET value = excluded.value",
		)
		.bind(kind.as_str())
		.bind(id)
		.bind(path.route().as_str())
		.bind(value)
		.execute(&self.db)
		.await
		.inspect_err(|err| warn!("DB: {:#?}", err))
		.map_err(|_| Error::Db)?;

		Ok(())
	}

	async fn value(&self, path: &Path) -> CsResult<Box<[u8]>> {
		let (kind, id) = path.scope().unpack();
		let row = sqlx::query(
			"SELECT value FROM config_data WHERE scope = ? AND scope_id = ? AND path = ?",
		)
		.bind(kind.as_str())
		.bind(id)
		.bind(path.route().as_str())
		.fetch_optional(&self.db)
		.await
		.inspect_err(|err| warn!("DB: {:#?}", err))
		.map_err(|_| Error::Db)?;

		match row {
			Some(row) => {
				let value: Vec<u8> = row.try_get("value").map_err(|_| Error::Db)?;
				Ok(value.into())
			}
			None => Err(Error::NotFound),
		}
	}

	async fn all_keys(&self) -> CsResult<Vec<Path>> {
		let rows = sqlx::query(
			"SELECT scope, scope_id, path FROM config_data ORDER BY scope, scope_id, path",
		)
		.fetch_all(&self.db)
		.await
		.inspect_err(|err| warn!("DB: {:#?}", err))
		.map_err(|_| Error::Db)?;

		let mut keys = Vec::with_capacity(rows.len());
		for row in rows {
			let scope: String = row.try_get("scope").map_err(|_| Error::Db)?;
			let scope_id: i64 = row.try_get("scope_id").map_err(|_| Error::Db)?;
			let route: String = row.try_get("path").map_err(|_| Error::Db)?;

			let kind = ScopeKind::from_prefix(&scope)?;
			let path = Path::make(&route)?.bind(kind, scope_id);
			keys.push(path);
		}
		keys.sort();
		Ok(keys)
	}
}

// vim: ts=4

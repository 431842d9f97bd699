//! Database schema bootstrap

use sqlx::sqlite::SqlitePool;

pub(crate) async fn init_db(db: &SqlitePool) -> std::result::Result<(), sqlx::Error> {
	let mut tx = db.begin().await?;

	sqlx::query(
		"CREATE TABLE IF NOT EXISTS config_data (
			scope varchar(8) NOT NULL DEFAULT 'default',
			scope_id integer NOT NULL DEFAULT 0,
			path varchar(255) NOT NULL,
			value text,
			PRIMARY KEY(scope, scope_id, path)
		)",
	)
	.execute(&mut *tx)
	.await?;

	tx.commit().await?;
	Ok(())
}

// vim: ts=4

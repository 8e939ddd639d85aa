use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use include_dir::{include_dir, Dir};

use crate::database::{Cause, Error};

mod car;
mod winner;

/// A connection pool that maintains a set of open connections to the database,
/// handing them out for repeated use.
pub(super) type Pool = bb8::Pool<bb8_postgres::PostgresConnectionManager<tokio_postgres::NoTls>>;

pub type PgError = bb8::RunError<tokio_postgres::Error>;

/// Stores cars and leaderboard records in the `async_race` schema.
#[derive(Clone)]
pub struct PgDatabase {
    pub(super) pool: Pool,
}

/// Build a connection pool, and wait for the first connection.
///
/// Returns `None` if the database does not accept a connection within the timeout.
pub async fn pg_connect(conn: &str, timeout: Duration) -> anyhow::Result<Option<PgDatabase>> {
    let config = tokio_postgres::config::Config::from_str(conn)
        .context("failed to parse postgres connection string")?;

    let pg_mgr = bb8_postgres::PostgresConnectionManager::new(config, tokio_postgres::NoTls);

    let pool = bb8::Pool::builder()
        .build(pg_mgr)
        .await
        .context("failed to build database pool")?;

    let connect_or_timeout = tokio::time::timeout(timeout, pool.get());

    let connected = match connect_or_timeout.await {
        Ok(Ok(_)) => true,
        Ok(Err(err)) => {
            log::debug!("failed to connect to database: {:?}", err);
            false
        }
        Err(_) => false,
    };

    if connected {
        Ok(Some(PgDatabase { pool }))
    } else {
        Ok(None)
    }
}

impl PgDatabase {
    #[cfg(feature = "integration_test")]
    pub async fn clear(&self) -> Result<(), PgError> {
        let conn = self.pool.get().await?;
        let _ = conn
            .execute("DROP SCHEMA IF EXISTS async_race CASCADE", &[])
            .await?;
        Ok(())
    }

    /// Check for pending database migrations and execute them.
    pub async fn migrate(&self) -> Result<(), PgError> {
        // Include all migration statements at compile-time:
        static MIGRATION_DIR: Dir = include_dir!("src/res/migrations/");

        let stmts = |nb: usize| {
            MIGRATION_DIR
                .get_file(format!("{}.sql", nb))
                .and_then(|f| f.contents_utf8())
                .unwrap_or_else(|| panic!("failed to find statements for migration {}", nb))
        };

        let mut conn = self.pool.get().await?;
        let transaction = conn.transaction().await?;

        // Creates the metadata table if it doesn't exist.
        transaction.batch_execute(stmts(0)).await?;

        let at_migration: usize = {
            let stmt = "SELECT at_migration FROM async_race.meta";
            let row = transaction.query_one(stmt, &[]).await?;
            row.get::<_, i32>(0) as usize
        };
        log::debug!("database at migration {}", at_migration);

        let most_recent_migration: usize = MIGRATION_DIR.files().len() - 1;
        for i in at_migration + 1..=most_recent_migration {
            log::info!("run database migration {}...", i);
            transaction.batch_execute(stmts(i)).await?;
            let stmt = "UPDATE async_race.meta SET at_migration = $1";
            let _ = transaction.execute(stmt, &[&(i as i32)]).await?;
        }

        transaction.commit().await?;
        Ok(())
    }
}

fn fetch_failed(what: &'static str) -> impl FnOnce(PgError) -> Error {
    move |err| Error::Fetch(what, Cause::from(err))
}

fn write_failed(what: &'static str) -> impl FnOnce(PgError) -> Error {
    move |err| Error::Write(what, Cause::from(err))
}

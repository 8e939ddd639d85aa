use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use thiserror::Error;

pub use api::*;
pub use memory::MemoryDatabase;
pub use postgres::{pg_connect, PgDatabase};
pub use rest::RestDatabase;
pub use structs::*;

use crate::config::Backend;

mod api;
mod memory;
mod postgres;
mod rest;
mod structs;

/// Everything the race controller needs from its collaborators:
/// the car registry ("garage") and the leaderboard ("winners").
pub trait Database: CarQueries + WinnerQueries {}

impl<T> Database for T where T: CarQueries + WinnerQueries {}

pub type Result<T> = std::result::Result<T, Error>;

/// Possible failures when talking to the car registry or leaderboard.
#[derive(Error, Debug)]
pub enum Error {
    /// Reading cars or leaderboard records failed.
    #[error("failed to fetch {0}")]
    Fetch(&'static str, #[source] Cause),

    /// Creating, updating or deleting cars or leaderboard records failed.
    #[error("failed to write {0}")]
    Write(&'static str, #[source] Cause),

    /// The collaborator answered, but not with something we understand.
    #[error("malformed response")]
    MalformedResponse(#[from] serde_json::Error),
}

/// The backend error behind a failed fetch or write.
#[derive(Error, Debug)]
pub enum Cause {
    /// Wrong endpoint, or maybe not available right now.
    #[error("API request failed")]
    Request(#[from] reqwest::Error),

    #[error("database query failed")]
    Postgres(#[from] postgres::PgError),

    /// The backend is offline, or does not offer the requested resource.
    #[error("backend unavailable")]
    Unavailable,
}

/// Connect to the configured backend.
///
/// Returns `None` if the backend is not reachable within the given timeout,
/// so that callers can keep waiting for it.
pub async fn db_connect(
    backend: &Backend,
    timeout: Duration,
) -> anyhow::Result<Option<Arc<dyn Database>>> {
    match backend {
        Backend::Memory => Ok(Some(Arc::new(MemoryDatabase::default()))),

        Backend::Rest { api_url } => {
            let db = RestDatabase::new(api_url);
            match tokio::time::timeout(timeout, db.cars()).await {
                Ok(Ok(_)) => Ok(Some(Arc::new(db))),
                Ok(Err(err)) => {
                    log::debug!("car registry not reachable: {:?}", err);
                    Ok(None)
                }
                Err(_) => Ok(None),
            }
        }

        Backend::Postgres {
            postgres_connection,
        } => {
            let db = match pg_connect(postgres_connection, timeout).await? {
                Some(db) => db,
                None => return Ok(None),
            };
            db.migrate().await.context("failed to migrate database")?;
            Ok(Some(Arc::new(db)))
        }
    }
}

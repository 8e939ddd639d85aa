use async_trait::async_trait;

use crate::database::{Result, Winner};

#[async_trait]
pub trait WinnerQueries: Send + Sync {
    /// Return every leaderboard record.
    async fn winners(&self) -> Result<Vec<Winner>>;

    /// Return the leaderboard record of the specified car, or `None` if
    /// that car has not completed a race yet.
    async fn winner(&self, id: i32) -> Result<Option<Winner>>;

    /// Insert a new leaderboard record.
    async fn insert_winner(&self, winner: &Winner) -> Result<()>;

    /// Overwrite wins and best time of an existing leaderboard record,
    /// keeping its identity. Returns `false` if there is no record to update.
    async fn update_winner(&self, winner: &Winner) -> Result<bool>;

    /// Delete the leaderboard record of the specified car.
    /// Returns `false` if there was no such record.
    async fn delete_winner(&self, id: i32) -> Result<bool>;
}

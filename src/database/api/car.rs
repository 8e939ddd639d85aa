use async_trait::async_trait;

use crate::database::{Car, CarEvidence, Result};

#[async_trait]
pub trait CarQueries: Send + Sync {
    /// Return every car in the registry.
    async fn cars(&self) -> Result<Vec<Car>>;

    /// Insert a car, and return it with its assigned ID.
    async fn insert_car(&self, car: &CarEvidence) -> Result<Car>;

    /// Update a car's name and color.
    /// Returns `None` if no such car exists.
    async fn update_car(&self, car: &Car) -> Result<Option<Car>>;

    /// Delete a car from the registry.
    /// Returns `false` if no such car exists.
    ///
    /// # Note
    /// This does not remove the car's leaderboard record.
    async fn delete_car(&self, id: i32) -> Result<bool>;
}

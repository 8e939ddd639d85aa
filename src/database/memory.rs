use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::database::*;

/// Keeps cars and leaderboard records in memory.
///
/// Used for offline play and for tests, which can take the backend
/// offline to simulate an unreachable collaborator.
#[derive(Default)]
pub struct MemoryDatabase {
    state: RwLock<MemoryState>,
}

#[derive(Default)]
struct MemoryState {
    cars: Vec<Car>,
    winners: Vec<Winner>,
    last_id: i32,
    offline: bool,
}

impl MemoryDatabase {
    /// While offline, every query fails.
    pub async fn set_offline(&self, offline: bool) {
        self.state.write().await.offline = offline;
    }

    /// Insert a car with a fixed ID, bypassing ID assignment.
    pub async fn push_car(&self, id: i32, name: &str, color: &str) {
        let mut state = self.state.write().await;
        state.last_id = state.last_id.max(id);
        state.cars.push(Car {
            id,
            name: name.to_string(),
            color: color.to_string(),
        });
    }

    /// Insert a leaderboard record, bypassing any checks.
    pub async fn push_winner(&self, id: i32, wins: i32, time: f64) {
        self.state.write().await.winners.push(Winner { id, wins, time });
    }
}

fn check_online(state: &MemoryState, what: &'static str, write: bool) -> Result<()> {
    match (state.offline, write) {
        (false, _) => Ok(()),
        (true, false) => Err(Error::Fetch(what, Cause::Unavailable)),
        (true, true) => Err(Error::Write(what, Cause::Unavailable)),
    }
}

#[async_trait]
impl CarQueries for MemoryDatabase {
    async fn cars(&self) -> Result<Vec<Car>> {
        let state = self.state.read().await;
        check_online(&state, "cars", false)?;
        Ok(state.cars.clone())
    }

    async fn insert_car(&self, car: &CarEvidence) -> Result<Car> {
        let mut state = self.state.write().await;
        check_online(&state, "car", true)?;
        state.last_id += 1;
        let car = Car {
            id: state.last_id,
            name: car.name.clone(),
            color: car.color.clone(),
        };
        state.cars.push(car.clone());
        Ok(car)
    }

    async fn update_car(&self, car: &Car) -> Result<Option<Car>> {
        let mut state = self.state.write().await;
        check_online(&state, "car", true)?;
        match state.cars.iter_mut().find(|c| c.id == car.id) {
            Some(existing) => {
                *existing = car.clone();
                Ok(Some(car.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete_car(&self, id: i32) -> Result<bool> {
        let mut state = self.state.write().await;
        check_online(&state, "car", true)?;
        let len_before = state.cars.len();
        state.cars.retain(|car| car.id != id);
        Ok(state.cars.len() != len_before)
    }
}

#[async_trait]
impl WinnerQueries for MemoryDatabase {
    async fn winners(&self) -> Result<Vec<Winner>> {
        let state = self.state.read().await;
        check_online(&state, "winners", false)?;
        Ok(state.winners.clone())
    }

    async fn winner(&self, id: i32) -> Result<Option<Winner>> {
        let state = self.state.read().await;
        check_online(&state, "winner", false)?;
        Ok(state.winners.iter().find(|w| w.id == id).copied())
    }

    async fn insert_winner(&self, winner: &Winner) -> Result<()> {
        let mut state = self.state.write().await;
        check_online(&state, "winner", true)?;
        state.winners.retain(|w| w.id != winner.id);
        state.winners.push(*winner);
        Ok(())
    }

    async fn update_winner(&self, winner: &Winner) -> Result<bool> {
        let mut state = self.state.write().await;
        check_online(&state, "winner", true)?;
        match state.winners.iter_mut().find(|w| w.id == winner.id) {
            Some(existing) => {
                *existing = *winner;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_winner(&self, id: i32) -> Result<bool> {
        let mut state = self.state.write().await;
        check_online(&state, "winner", true)?;
        let len_before = state.winners.len();
        state.winners.retain(|w| w.id != id);
        Ok(state.winners.len() != len_before)
    }
}

use std::collections::HashMap;
use std::sync::Arc;

use crate::controller::Completion;
use crate::database::{Car, CarQueries, Database, Result, Winner, WinnerQueries};

/// A leaderboard record, joined with its car.
#[derive(Clone, Debug, PartialEq)]
pub struct Standing {
    pub car: Car,
    pub wins: i32,
    pub best_time_secs: f64,
}

/// Merges race results into the leaderboard.
#[derive(Clone)]
pub struct LeaderboardController {
    db: Arc<dyn Database>,
}

impl LeaderboardController {
    pub fn init(db: &Arc<dyn Database>) -> Self {
        LeaderboardController { db: db.clone() }
    }

    /// Merge a car's race result into its leaderboard record, creating the
    /// record if this is the car's first result.
    ///
    /// Each call is an independent unit of work: a failure does not
    /// affect the records of other cars.
    pub async fn submit(&self, completion: &Completion) -> Result<Winner> {
        let existing = self.db.winner(completion.car_id).await?;
        let merged = merge(existing.as_ref(), completion);

        match existing {
            None => self.db.insert_winner(&merged).await?,
            Some(_) => {
                let updated = self.db.update_winner(&merged).await?;
                if !updated {
                    log::warn!(
                        "leaderboard record of car {} disappeared before update",
                        completion.car_id
                    );
                }
            }
        }

        log::debug!("merged leaderboard record {:?}", merged);
        Ok(merged)
    }

    /// Delete a car's leaderboard record.
    pub async fn remove(&self, car_id: i32) -> Result<bool> {
        self.db.delete_winner(car_id).await
    }

    /// Leaderboard records of cars that are still in the registry,
    /// sorted by wins, most first.
    pub async fn standings(&self) -> Result<Vec<Standing>> {
        let winners = self.db.winners().await?;
        let cars = self.db.cars().await?;
        Ok(rank(winners, cars))
    }
}

/// Upsert semantics: a first result creates `{wins: 0|1, time}`, later
/// results add a win if the time was the race's fastest, and keep the
/// better of both times.
pub fn merge(existing: Option<&Winner>, completion: &Completion) -> Winner {
    let won = if completion.is_winning_time { 1 } else { 0 };
    match existing {
        None => Winner {
            id: completion.car_id,
            wins: won,
            time: completion.duration_secs,
        },
        Some(prev) => Winner {
            id: prev.id,
            wins: prev.wins + won,
            time: prev.time.min(completion.duration_secs),
        },
    }
}

fn rank(winners: Vec<Winner>, cars: Vec<Car>) -> Vec<Standing> {
    let mut cars_by_id: HashMap<i32, Car> = cars.into_iter().map(|car| (car.id, car)).collect();

    let mut standings: Vec<Standing> = winners
        .into_iter()
        .filter_map(|winner| {
            cars_by_id.remove(&winner.id).map(|car| Standing {
                car,
                wins: winner.wins,
                best_time_secs: winner.time,
            })
        })
        .collect();

    standings.sort_by(|a, b| b.wins.cmp(&a.wins));
    standings
}

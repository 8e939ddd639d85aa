use std::sync::Arc;

use futures::future::join_all;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::constants::{CAR_COMPANIES, CAR_MODELS};
use crate::database::{Car, CarEvidence, CarQueries, Database, Result};

/// Reads and edits the car registry.
#[derive(Clone)]
pub struct GarageController {
    db: Arc<dyn Database>,
}

impl GarageController {
    pub fn init(db: &Arc<dyn Database>) -> Self {
        GarageController { db: db.clone() }
    }

    /// A fresh copy of every car in the registry.
    pub async fn roster(&self) -> Result<Vec<Car>> {
        self.db.cars().await
    }

    pub async fn create(&self, name: &str, color: &str) -> Result<Car> {
        let car = CarEvidence {
            name: name.to_string(),
            color: color.to_string(),
        };
        self.db.insert_car(&car).await
    }

    /// Change a car's name and color. Returns `None` if there is no such car.
    pub async fn update(&self, id: i32, name: &str, color: &str) -> Result<Option<Car>> {
        let car = Car {
            id,
            name: name.to_string(),
            color: color.to_string(),
        };
        self.db.update_car(&car).await
    }

    pub async fn remove(&self, id: i32) -> Result<bool> {
        self.db.delete_car(id).await
    }

    /// Insert a number of random cars at once, and return
    /// the number of cars that were inserted.
    pub async fn generate(&self, amount: usize) -> usize {
        let cars: Vec<CarEvidence> = {
            let mut rng = rand::thread_rng();
            (0..amount).map(|_| random_car(&mut rng)).collect()
        };

        let results = join_all(cars.iter().map(|car| self.db.insert_car(car))).await;

        results
            .into_iter()
            .filter(|res| match res {
                Ok(_) => true,
                Err(err) => {
                    log::error!("failed to add random car: {:?}", err);
                    false
                }
            })
            .count()
    }
}

/// A car with a name like "Mercedes QQ" or "Tesla Model X", and a random color.
pub fn random_car<R>(rng: &mut R) -> CarEvidence
where
    R: Rng,
{
    let company = CAR_COMPANIES.choose(rng).copied().unwrap_or("Ford");
    let model = CAR_MODELS.choose(rng).copied().unwrap_or("A");
    let name = if company == "Tesla" {
        format!("{} Model {}", company, model)
    } else {
        format!("{} {}", company, model)
    };
    let color = format!("#{:06x}", rng.gen_range(0..0x0100_0000));
    CarEvidence { name, color }
}

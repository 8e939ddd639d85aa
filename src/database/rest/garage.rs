use async_trait::async_trait;

use crate::database::rest::{fetch, write, RestDatabase, HTTP_CLIENT};
use crate::database::{Car, CarEvidence, CarQueries, Cause, Error, Result};

const GARAGE: &str = "garage";

#[async_trait]
impl CarQueries for RestDatabase {
    async fn cars(&self) -> Result<Vec<Car>> {
        let request = HTTP_CLIENT.get(&self.url(GARAGE, None));
        Ok(fetch("cars", request).await?.unwrap_or_default())
    }

    async fn insert_car(&self, car: &CarEvidence) -> Result<Car> {
        let request = HTTP_CLIENT.post(&self.url(GARAGE, None)).json(car);
        match write("car", request).await? {
            Some(body) => Ok(serde_json::from_str(&body)?),
            None => Err(Error::Write("car", Cause::Unavailable)),
        }
    }

    async fn update_car(&self, car: &Car) -> Result<Option<Car>> {
        let request = HTTP_CLIENT.put(&self.url(GARAGE, Some(car.id))).json(car);
        match write("car", request).await? {
            Some(body) => Ok(Some(serde_json::from_str(&body)?)),
            None => Ok(None),
        }
    }

    async fn delete_car(&self, id: i32) -> Result<bool> {
        let request = HTTP_CLIENT.delete(&self.url(GARAGE, Some(id)));
        Ok(write("car", request).await?.is_some())
    }
}

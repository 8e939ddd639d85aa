use async_trait::async_trait;
use tokio_postgres::Row;

use crate::database::postgres::{fetch_failed, write_failed, PgDatabase, PgError};
use crate::database::{Car, CarEvidence, CarQueries, Result};

#[async_trait]
impl CarQueries for PgDatabase {
    async fn cars(&self) -> Result<Vec<Car>> {
        self.select_cars().await.map_err(fetch_failed("cars"))
    }

    async fn insert_car(&self, car: &CarEvidence) -> Result<Car> {
        self.insert_car_row(car).await.map_err(write_failed("car"))
    }

    async fn update_car(&self, car: &Car) -> Result<Option<Car>> {
        self.update_car_row(car).await.map_err(write_failed("car"))
    }

    async fn delete_car(&self, id: i32) -> Result<bool> {
        self.delete_car_row(id).await.map_err(write_failed("car"))
    }
}

impl PgDatabase {
    async fn select_cars(&self) -> std::result::Result<Vec<Car>, PgError> {
        let conn = self.pool.get().await?;
        let stmt = "SELECT * FROM async_race.car ORDER BY id";
        let rows = conn.query(stmt, &[]).await?;
        Ok(rows.into_iter().map(Car::from).collect())
    }

    async fn insert_car_row(&self, car: &CarEvidence) -> std::result::Result<Car, PgError> {
        let conn = self.pool.get().await?;
        let stmt = r#"
            INSERT INTO async_race.car
                (name, color)
            VALUES
                ($1, $2)
            RETURNING *
        "#;
        let row = conn.query_one(stmt, &[&car.name, &car.color]).await?;
        Ok(Car::from(row))
    }

    async fn update_car_row(&self, car: &Car) -> std::result::Result<Option<Car>, PgError> {
        let conn = self.pool.get().await?;
        let stmt = r#"
            UPDATE async_race.car
            SET name = $2, color = $3
            WHERE id = $1
            RETURNING *
        "#;
        let row = conn
            .query_opt(stmt, &[&car.id, &car.name, &car.color])
            .await?;
        Ok(row.map(Car::from))
    }

    async fn delete_car_row(&self, id: i32) -> std::result::Result<bool, PgError> {
        let conn = self.pool.get().await?;
        let stmt = "DELETE FROM async_race.car WHERE id = $1";
        let nb_deleted = conn.execute(stmt, &[&id]).await?;
        Ok(nb_deleted > 0)
    }
}

impl From<Row> for Car {
    fn from(row: Row) -> Self {
        Car {
            id: row.get("id"),
            name: row.get("name"),
            color: row.get("color"),
        }
    }
}

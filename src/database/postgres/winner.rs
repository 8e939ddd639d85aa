use async_trait::async_trait;
use tokio_postgres::Row;

use crate::database::postgres::{fetch_failed, write_failed, PgDatabase, PgError};
use crate::database::{Result, Winner, WinnerQueries};

#[async_trait]
impl WinnerQueries for PgDatabase {
    async fn winners(&self) -> Result<Vec<Winner>> {
        self.select_winners().await.map_err(fetch_failed("winners"))
    }

    async fn winner(&self, id: i32) -> Result<Option<Winner>> {
        self.select_winner(id).await.map_err(fetch_failed("winner"))
    }

    async fn insert_winner(&self, winner: &Winner) -> Result<()> {
        self.insert_winner_row(winner)
            .await
            .map_err(write_failed("winner"))
    }

    async fn update_winner(&self, winner: &Winner) -> Result<bool> {
        self.update_winner_row(winner)
            .await
            .map_err(write_failed("winner"))
    }

    async fn delete_winner(&self, id: i32) -> Result<bool> {
        self.delete_winner_row(id)
            .await
            .map_err(write_failed("winner"))
    }
}

impl PgDatabase {
    async fn select_winners(&self) -> std::result::Result<Vec<Winner>, PgError> {
        let conn = self.pool.get().await?;
        let stmt = "SELECT * FROM async_race.winner ORDER BY car_id";
        let rows = conn.query(stmt, &[]).await?;
        Ok(rows.into_iter().map(Winner::from).collect())
    }

    async fn select_winner(&self, id: i32) -> std::result::Result<Option<Winner>, PgError> {
        let conn = self.pool.get().await?;
        let stmt = "SELECT * FROM async_race.winner WHERE car_id = $1";
        let row = conn.query_opt(stmt, &[&id]).await?;
        Ok(row.map(Winner::from))
    }

    async fn insert_winner_row(&self, winner: &Winner) -> std::result::Result<(), PgError> {
        let conn = self.pool.get().await?;
        let stmt = r#"
            INSERT INTO async_race.winner
                (car_id, wins, time)
            VALUES
                ($1, $2, $3)
        "#;
        let _ = conn
            .execute(stmt, &[&winner.id, &winner.wins, &winner.time])
            .await?;
        Ok(())
    }

    async fn update_winner_row(&self, winner: &Winner) -> std::result::Result<bool, PgError> {
        let conn = self.pool.get().await?;
        let stmt = r#"
            UPDATE async_race.winner
            SET wins = $2, time = $3
            WHERE car_id = $1
        "#;
        let nb_updated = conn
            .execute(stmt, &[&winner.id, &winner.wins, &winner.time])
            .await?;
        Ok(nb_updated > 0)
    }

    async fn delete_winner_row(&self, id: i32) -> std::result::Result<bool, PgError> {
        let conn = self.pool.get().await?;
        let stmt = "DELETE FROM async_race.winner WHERE car_id = $1";
        let nb_deleted = conn.execute(stmt, &[&id]).await?;
        Ok(nb_deleted > 0)
    }
}

impl From<Row> for Winner {
    fn from(row: Row) -> Self {
        Winner {
            id: row.get("car_id"),
            wins: row.get("wins"),
            time: row.get("time"),
        }
    }
}

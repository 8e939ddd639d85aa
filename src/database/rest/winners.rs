use async_trait::async_trait;
use serde::Serialize;

use crate::database::rest::{fetch, write, RestDatabase, HTTP_CLIENT};
use crate::database::{Cause, Error, Result, Winner, WinnerQueries};

const WINNERS: &str = "winners";

/// Request body for `PUT /winners/:id`, which must not repeat the ID.
#[derive(Serialize)]
struct WinnerUpdate {
    wins: i32,
    time: f64,
}

#[async_trait]
impl WinnerQueries for RestDatabase {
    async fn winners(&self) -> Result<Vec<Winner>> {
        let request = HTTP_CLIENT.get(&self.url(WINNERS, None));
        Ok(fetch("winners", request).await?.unwrap_or_default())
    }

    async fn winner(&self, id: i32) -> Result<Option<Winner>> {
        let request = HTTP_CLIENT.get(&self.url(WINNERS, Some(id)));
        fetch("winner", request).await
    }

    async fn insert_winner(&self, winner: &Winner) -> Result<()> {
        let request = HTTP_CLIENT.post(&self.url(WINNERS, None)).json(winner);
        match write("winner", request).await? {
            Some(_) => Ok(()),
            None => Err(Error::Write("winner", Cause::Unavailable)),
        }
    }

    async fn update_winner(&self, winner: &Winner) -> Result<bool> {
        let body = WinnerUpdate {
            wins: winner.wins,
            time: winner.time,
        };
        let request = HTTP_CLIENT
            .put(&self.url(WINNERS, Some(winner.id)))
            .json(&body);
        Ok(write("winner", request).await?.is_some())
    }

    async fn delete_winner(&self, id: i32) -> Result<bool> {
        let request = HTTP_CLIENT.delete(&self.url(WINNERS, Some(id)));
        Ok(write("winner", request).await?.is_some())
    }
}

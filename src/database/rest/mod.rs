use lazy_static::*;
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;

use crate::constants::USER_AGENT;
use crate::database::{Cause, Error, Result};

mod garage;
mod winners;

lazy_static! {
    /// The client used for all HTTP requests.
    static ref HTTP_CLIENT: reqwest::Client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .expect("failed to build http client");
}

/// Talks to a json-server style API, which exposes the car registry
/// at `/garage` and the leaderboard at `/winners`.
#[derive(Clone)]
pub struct RestDatabase {
    api_url: String,
}

impl RestDatabase {
    pub fn new(api_url: &str) -> Self {
        RestDatabase {
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, resource: &str, id: Option<i32>) -> String {
        match id {
            Some(id) => format!("{}/{}/{}", self.api_url, resource, id),
            None => format!("{}/{}", self.api_url, resource),
        }
    }
}

/// Send a read request, and parse its JSON response.
/// A `404 Not Found` response is `None`.
async fn fetch<T>(what: &'static str, request: RequestBuilder) -> Result<Option<T>>
where
    T: DeserializeOwned,
{
    let response = request
        .send()
        .await
        .map_err(|err| Error::Fetch(what, Cause::from(err)))?;
    if response.status() == StatusCode::NOT_FOUND {
        return Ok(None);
    }
    let json = response
        .error_for_status()
        .map_err(|err| Error::Fetch(what, Cause::from(err)))?
        .text()
        .await
        .map_err(|err| Error::Fetch(what, Cause::from(err)))?;
    Ok(Some(serde_json::from_str(&json)?))
}

/// Send a write request, and return its response body.
/// A `404 Not Found` response is `None`.
async fn write(what: &'static str, request: RequestBuilder) -> Result<Option<String>> {
    let response = request
        .send()
        .await
        .map_err(|err| Error::Write(what, Cause::from(err)))?;
    if response.status() == StatusCode::NOT_FOUND {
        return Ok(None);
    }
    let body = response
        .error_for_status()
        .map_err(|err| Error::Write(what, Cause::from(err)))?
        .text()
        .await
        .map_err(|err| Error::Write(what, Cause::from(err)))?;
    Ok(Some(body))
}

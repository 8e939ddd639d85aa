use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, ensure, Context};
use serde::Deserialize;

use crate::constants::*;

/// Controller config.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Config {
    /// The service that stores cars and leaderboard records.
    pub backend: Backend,

    /// The time in milliseconds after a race starts, after which the
    /// race is finished and its winner is announced.
    ///
    /// This window is independent of the cars' assigned durations.
    #[serde(default = "default_observation_delay_millis")]
    pub observation_delay_millis: u64,

    /// The time in milliseconds the winner announcement is shown,
    /// before the race concludes and the controller returns to idle.
    #[serde(default = "default_announcement_delay_millis")]
    pub announcement_delay_millis: u64,

    /// Lower bound for the randomized completion time of a car.
    #[serde(default = "default_min_duration_secs")]
    pub min_duration_secs: f64,

    /// Upper bound for the randomized completion time of a car.
    #[serde(default = "default_max_duration_secs")]
    pub max_duration_secs: f64,

    /// The number of cars added by a single `generate` command.
    #[serde(default = "default_nb_generated_cars")]
    pub nb_generated_cars: usize,
}

/// Where cars and leaderboard records live.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Backend {
    /// A json-server style REST API with `/garage` and `/winners` resources.
    Rest {
        #[serde(default = "default_api_url")]
        api_url: String,
    },

    /// Connection configuration parsed from libpq-style connection strings, f.e.
    /// `host=127.0.0.1 port=5432 user=postgres password=123 connect_timeout=10`.
    ///
    /// Reference: https://www.postgresql.org/docs/9.3/libpq-connect.html#LIBPQ-CONNSTRING
    Postgres { postgres_connection: String },

    /// Keep everything in memory; nothing survives a restart.
    Memory,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            backend: Backend::Memory,
            observation_delay_millis: DEFAULT_OBSERVATION_DELAY_MILLIS,
            announcement_delay_millis: DEFAULT_ANNOUNCEMENT_DELAY_MILLIS,
            min_duration_secs: DEFAULT_MIN_DURATION_SECS,
            max_duration_secs: DEFAULT_MAX_DURATION_SECS,
            nb_generated_cars: DEFAULT_NB_GENERATED_CARS,
        }
    }
}

impl Config {
    /// Read the config file listed in the `ASYNC_RACE_CONFIG` environment variable.
    pub fn load() -> anyhow::Result<Config> {
        let file = std::env::var(CONFIG_ENV_VAR)
            .map(PathBuf::from)
            .map_err(|_| anyhow!("cannot locate config: use the '{}' env var", CONFIG_ENV_VAR))?;
        let contents = std::fs::read_to_string(&file)
            .with_context(|| format!("failed to read config file {}", file.display()))?;
        Config::parse(&contents)
    }

    /// Parse and validate a TOML config.
    pub fn parse(contents: &str) -> anyhow::Result<Config> {
        let config: Config = toml::from_str(contents).context("failed to parse config file")?;
        check_config(&config)?;
        Ok(config)
    }

    pub fn observation_delay(&self) -> Duration {
        Duration::from_millis(self.observation_delay_millis)
    }

    pub fn announcement_delay(&self) -> Duration {
        Duration::from_millis(self.announcement_delay_millis)
    }
}

/// Try to catch configuration errors early.
fn check_config(config: &Config) -> anyhow::Result<()> {
    ensure!(
        config.min_duration_secs > 0.0,
        "config: 'min_duration_secs' must be positive!"
    );
    ensure!(
        config.min_duration_secs <= config.max_duration_secs,
        "config: 'min_duration_secs' must not be larger than 'max_duration_secs'!"
    );
    ensure!(
        config.observation_delay_millis > 0 && config.announcement_delay_millis > 0,
        "config: delays must not be zero!"
    );
    ensure!(
        config.nb_generated_cars > 0,
        "config: 'nb_generated_cars' must not be zero!"
    );
    Ok(())
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_observation_delay_millis() -> u64 {
    DEFAULT_OBSERVATION_DELAY_MILLIS
}

fn default_announcement_delay_millis() -> u64 {
    DEFAULT_ANNOUNCEMENT_DELAY_MILLIS
}

fn default_min_duration_secs() -> f64 {
    DEFAULT_MIN_DURATION_SECS
}

fn default_max_duration_secs() -> f64 {
    DEFAULT_MAX_DURATION_SECS
}

fn default_nb_generated_cars() -> usize {
    DEFAULT_NB_GENERATED_CARS
}

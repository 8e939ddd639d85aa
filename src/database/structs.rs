use serde::{Deserialize, Serialize};

/// A car in the registry, which is one competitor in every race.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Car {
    /// Unique identifier, assigned by the registry.
    pub id: i32,

    /// Display name, f.e. "Tesla Model S".
    pub name: String,

    /// Display color as hex string, f.e. "#ff0000".
    pub color: String,
}

/// Car data used when inserting into the registry.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CarEvidence {
    pub name: String,
    pub color: String,
}

/// A car's leaderboard record.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Winner {
    /// The ID of the car this record belongs to.
    pub id: i32,

    /// The number of races this car has won.
    pub wins: i32,

    /// The best completion time of this car in seconds.
    pub time: f64,
}

use crate::database::Winner;

/// Race lifecycle updates, broadcast to the presentation layer.
#[derive(Clone, Debug, PartialEq)]
pub enum RaceEvent {
    /// The roster was replaced with a fresh copy of the car registry.
    RosterRefreshed { nb_cars: usize },

    /// Every car was assigned a completion time, and the race is running.
    RaceStarted {
        generation: u64,
        nb_cars: usize,
        min_duration_secs: f64,
    },

    /// A car's result was merged into its leaderboard record.
    ResultSubmitted { record: Winner },

    /// The observation window closed, and the winner is shown.
    WinnerAnnounced(Announcement),

    /// The announcement window closed. Fired once per race,
    /// right before the controller returns to idle.
    RaceConcluded { generation: u64 },

    /// The race was reset to idle, discarding all assignments.
    RaceReset,

    /// A car was removed from the roster.
    CarRemoved { car_id: i32 },
}

/// The winner of a race, as shown in the announcement popup.
#[derive(Clone, Debug, PartialEq)]
pub struct Announcement {
    pub car_id: i32,
    pub name: String,
    pub color: String,

    /// The winning car's assigned completion time in seconds.
    pub duration_secs: f64,
}

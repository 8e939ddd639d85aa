/// User-Agent header for outgoing requests.
pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// The environment variable that points to the TOML config file.
pub const CONFIG_ENV_VAR: &str = "ASYNC_RACE_CONFIG";

/// The address of the json-server that hosts `/garage` and `/winners`.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:3000";

/// The time after a race start in which cars are watched
/// before the winner is announced.
pub const DEFAULT_OBSERVATION_DELAY_MILLIS: u64 = 5000;

/// The time the winner announcement is shown before the race
/// concludes and resets.
pub const DEFAULT_ANNOUNCEMENT_DELAY_MILLIS: u64 = 6000;

/// Lower bound for randomized completion times.
pub const DEFAULT_MIN_DURATION_SECS: f64 = 2.0;

/// Upper bound for randomized completion times.
pub const DEFAULT_MAX_DURATION_SECS: f64 = 5.0;

/// The number of cars added at once when generating random cars.
pub const DEFAULT_NB_GENERATED_CARS: usize = 100;

/// The number of cars displayed on one garage page.
pub const CARS_PER_PAGE: usize = 7;

/// The number of standings displayed on one winners page.
pub const WINNERS_PER_PAGE: usize = 10;

/// Companies used for random car names.
pub const CAR_COMPANIES: &[&str] = &["Ford", "Tesla", "Mercedes", "BMW", "Audi", "Mazda"];

/// Models used for random car names.
pub const CAR_MODELS: &[&str] = &[
    "A", "B", "C", "D", "E", "F", "G", "H", "I", "J", "K", "L", "M", "N", "O", "P", "Q", "R", "S",
    "T", "U", "V", "W", "X", "Y", "Z", "AA", "BB", "CC", "DD", "EE", "FF", "GG", "HH", "II", "JJ",
    "KK", "LL", "MM", "NN", "OO", "PP", "QQ", "RR", "SS", "TT", "UU", "VV", "WW", "XX", "YY", "ZZ",
    "A1", "B2", "C3", "D4", "E5", "F6", "G7", "H8", "I9", "J0",
];

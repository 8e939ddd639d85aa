use std::sync::Arc;

use tokio::sync::broadcast;

use crate::config::Config;
use crate::controller::*;
use crate::database::{Car, Database, Result};
use crate::event::RaceEvent;

pub use on_command::CommandFlow;

mod on_command;

/// Receivers that fall behind by more events than this will skip events.
const EVENT_CAPACITY: usize = 256;

/// This facade ties the race session to the car registry, the leaderboard,
/// and the timers that move a race from start to announcement to reset.
///
/// All state transitions go through the race session, one at a time.
/// Leaderboard submissions and remote deletes run in detached tasks,
/// whose failures are only logged.
#[derive(Clone)]
pub struct Controller {
    config: Arc<Config>,
    durations: DurationGenerator,
    garage: GarageController,
    leaderboard: LeaderboardController,
    race: RaceController,
    timers: Arc<RaceTimers>,
    events: broadcast::Sender<RaceEvent>,
}

#[derive(Default)]
struct RaceTimers {
    /// Armed when a race starts; closes the observation window.
    observation: Timer,

    /// Armed when the winner is announced; concludes the race.
    announcement: Timer,
}

impl Controller {
    pub async fn init(config: Config, db: Arc<dyn Database>) -> Controller {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        let controller = Controller {
            durations: DurationGenerator::new(config.min_duration_secs, config.max_duration_secs),
            config: Arc::new(config),
            garage: GarageController::init(&db),
            leaderboard: LeaderboardController::init(&db),
            race: RaceController::init(),
            timers: Arc::new(RaceTimers::default()),
            events,
        };

        controller.refresh_roster().await;
        controller
    }

    /// Receive race events from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<RaceEvent> {
        self.events.subscribe()
    }

    /// Read-only access to the race state.
    pub fn live_race(&self) -> Arc<dyn LiveRace> {
        Arc::new(self.race.clone()) as Arc<dyn LiveRace>
    }

    fn emit(&self, event: RaceEvent) {
        log::debug!("{:?}", &event);
        // Nobody listening is fine.
        let _ = self.events.send(event);
    }

    /// Replace the roster with a fresh copy of the registry, if the race is idle.
    /// Returns `false` if the roster was not replaced.
    pub async fn refresh_roster(&self) -> bool {
        if self.race.phase().await != RacePhase::Idle {
            return false;
        }

        let cars = match self.garage.roster().await {
            Ok(cars) => cars,
            Err(err) => {
                log::error!("failed to load cars: {:?}", err);
                return false;
            }
        };

        let nb_cars = cars.len();
        if !self.race.set_roster(cars).await {
            log::debug!("race started while loading cars; keep roster");
            return false;
        }
        self.emit(RaceEvent::RosterRefreshed { nb_cars });
        true
    }

    /// Start a race with a fresh roster.
    ///
    /// Every car's result is submitted to the leaderboard right away,
    /// while the winner is only announced once the observation window closes.
    pub async fn start_race(&self) -> bool {
        if self.race.phase().await != RacePhase::Idle {
            log::warn!("race already in progress");
            return false;
        }

        // Keep the previous roster if the registry cannot be reached.
        self.refresh_roster().await;

        let generation = match self.race.start(&self.durations).await {
            Some(generation) => generation,
            None => return false,
        };

        let (nb_cars, min_duration_secs, completions) = {
            let state = self.race.lock().await;
            (
                state.entrants().len(),
                state.min_duration().unwrap_or_default(),
                state.completions(),
            )
        };

        self.emit(RaceEvent::RaceStarted {
            generation,
            nb_cars,
            min_duration_secs,
        });

        for completion in completions {
            self.submit_detached(completion);
        }

        let controller = self.clone(); // 'self' with 'static lifetime
        self.timers
            .observation
            .arm(generation, self.config.observation_delay(), async move {
                controller.on_observation_elapsed(generation).await;
            })
            .await;

        true
    }

    /// Stop any race, disarm its timers, and return to idle with a fresh roster.
    pub async fn reset_race(&self) {
        self.disarm_timers().await;
        if self.race.reset().await {
            log::info!("race reset");
        }
        self.emit(RaceEvent::RaceReset);
        self.refresh_roster().await;
    }

    /// Remove a car from the roster right away, and request its removal from
    /// the registry and the leaderboard.
    ///
    /// Remote failures are logged, but the car stays removed locally.
    pub async fn remove_car(&self, car_id: i32) {
        if self.race.remove(car_id).await {
            self.emit(RaceEvent::CarRemoved { car_id });
        }

        let garage = self.garage.clone();
        let _ = tokio::spawn(async move {
            if let Err(err) = garage.remove(car_id).await {
                log::error!("failed to remove car {} from garage: {:?}", car_id, err);
            }
        });

        let leaderboard = self.leaderboard.clone();
        let _ = tokio::spawn(async move {
            if let Err(err) = leaderboard.remove(car_id).await {
                log::error!("failed to remove car {} from winners: {:?}", car_id, err);
            }
        });
    }

    pub async fn create_car(&self, name: &str, color: &str) -> Option<Car> {
        match self.garage.create(name, color).await {
            Ok(car) => {
                log::info!("added car {:?}", car);
                self.refresh_roster().await;
                Some(car)
            }
            Err(err) => {
                log::error!("failed to add car: {:?}", err);
                None
            }
        }
    }

    pub async fn update_car(&self, car_id: i32, name: &str, color: &str) -> Option<Car> {
        match self.garage.update(car_id, name, color).await {
            Ok(Some(car)) => {
                self.refresh_roster().await;
                Some(car)
            }
            Ok(None) => {
                log::warn!("cannot update unknown car {}", car_id);
                None
            }
            Err(err) => {
                log::error!("failed to update car {}: {:?}", car_id, err);
                None
            }
        }
    }

    /// Add a batch of random cars, and return how many were added.
    pub async fn generate_cars(&self) -> usize {
        let nb_added = self.garage.generate(self.config.nb_generated_cars).await;
        log::info!("added {} random cars", nb_added);
        self.refresh_roster().await;
        nb_added
    }

    pub async fn standings(&self) -> Result<Vec<Standing>> {
        self.leaderboard.standings().await
    }

    fn submit_detached(&self, completion: Completion) {
        let controller = self.clone(); // 'self' with 'static lifetime
        let _ = tokio::spawn(async move {
            match controller.leaderboard.submit(&completion).await {
                Ok(record) => controller.emit(RaceEvent::ResultSubmitted { record }),
                Err(err) => log::error!(
                    "failed to submit result of car {}: {:?}",
                    completion.car_id,
                    err
                ),
            }
        });
    }

    async fn on_observation_elapsed(&self, generation: u64) {
        match self.race.finish(generation).await {
            FinishOutcome::Stale => {
                log::debug!("ignore observation timer of race {}", generation);
            }
            FinishOutcome::NoWinner => {
                log::info!("race {} finished without cars", generation);
                self.reset_race().await;
            }
            FinishOutcome::Winner(announcement) => {
                log::info!(
                    "race {} won by '{}' in {:.2}s",
                    generation,
                    announcement.name,
                    announcement.duration_secs
                );
                self.emit(RaceEvent::WinnerAnnounced(announcement));

                let controller = self.clone(); // 'self' with 'static lifetime
                self.timers
                    .announcement
                    .arm(generation, self.config.announcement_delay(), async move {
                        controller.on_announcement_elapsed(generation).await;
                    })
                    .await;
            }
        }
    }

    async fn on_announcement_elapsed(&self, generation: u64) {
        if !self.race.conclude(generation).await {
            log::debug!("ignore announcement timer of race {}", generation);
            return;
        }
        // Both timers of this race have fired; a newer race may own them by now.
        self.emit(RaceEvent::RaceConcluded { generation });
        self.refresh_roster().await;
    }

    async fn disarm_timers(&self) {
        self.timers.observation.disarm().await;
        self.timers.announcement.disarm().await;
    }
}

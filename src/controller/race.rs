use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{RwLock, RwLockReadGuard};

use crate::controller::{page, DurationGenerator};
use crate::database::Car;
use crate::event::Announcement;

/// Use to look up the state of the current race.
#[async_trait]
pub trait LiveRace: Send + Sync {
    /// While holding this guard, the state is read-only, and can be referenced.
    async fn lock(&self) -> RwLockReadGuard<'_, RaceState>;

    async fn phase(&self) -> RacePhase {
        self.lock().await.phase()
    }

    /// The fastest assigned time in the current race, or `None`
    /// if the race is not running.
    async fn min_duration(&self) -> Option<f64> {
        self.lock().await.min_duration()
    }

    /// The announced winner, once the race is finished.
    async fn announced(&self) -> Option<Announcement> {
        self.lock().await.announced().cloned()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RacePhase {
    /// The roster can be refreshed, and no times are assigned.
    Idle,

    /// Every car has an assigned time, and the observation window is open.
    Running,

    /// The winner is determined, and the announcement is shown.
    Finished,
}

/// A car in the roster, and its assigned time in the current race.
#[derive(Clone, Debug, PartialEq)]
pub struct Entrant {
    pub car: Car,

    /// The completion time in seconds, or `None` while idle.
    pub duration_secs: Option<f64>,
}

/// A car's result that should be merged into the leaderboard.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Completion {
    pub car_id: i32,
    pub duration_secs: f64,

    /// `True` if this is the fastest time of the race.
    pub is_winning_time: bool,
}

/// The result of closing the observation window.
#[derive(Debug, PartialEq)]
pub enum FinishOutcome {
    /// The race was reset or restarted in the meantime.
    Stale,

    /// The first car in roster order with the fastest time.
    Winner(Announcement),

    /// Every car was removed during the race.
    NoWinner,
}

pub struct RaceState {
    phase: RacePhase,

    /// Incremented whenever a race starts or is reset, so that
    /// timers armed for an earlier race can tell that they are stale.
    generation: u64,

    /// The roster in registry order.
    entrants: Vec<Entrant>,

    /// The fastest assigned time, recomputed whenever assignments change.
    min_duration: Option<f64>,

    announced: Option<Announcement>,
}

impl RaceState {
    fn init() -> Self {
        RaceState {
            phase: RacePhase::Idle,
            generation: 0,
            entrants: vec![],
            min_duration: None,
            announced: None,
        }
    }

    pub fn phase(&self) -> RacePhase {
        self.phase
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn entrants(&self) -> &[Entrant] {
        &self.entrants
    }

    /// The entrants on a roster page, with their roster index.
    pub fn roster_page(&self, page_idx: usize, per_page: usize) -> Vec<(usize, &Entrant)> {
        let start = page_idx.saturating_mul(per_page);
        page(&self.entrants, page_idx, per_page)
            .iter()
            .enumerate()
            .map(|(idx, entrant)| (start.saturating_add(idx), entrant))
            .collect()
    }

    pub fn min_duration(&self) -> Option<f64> {
        self.min_duration
    }

    pub fn announced(&self) -> Option<&Announcement> {
        self.announced.as_ref()
    }

    /// Every entrant whose assigned time equals the fastest time.
    pub fn winning_entrants(&self) -> impl Iterator<Item = &Entrant> {
        let min_duration = self.min_duration;
        self.entrants
            .iter()
            .filter(move |e| e.duration_secs.is_some() && e.duration_secs == min_duration)
    }

    /// The results to report for the current race.
    ///
    /// The reporting threshold is the fastest assigned time.
    pub fn completions(&self) -> Vec<Completion> {
        match self.min_duration {
            Some(threshold) => self.completions_at_or_above(threshold),
            None => vec![],
        }
    }

    /// The results of every entrant whose assigned time is at least
    /// the given threshold. Entrants below it are never reported.
    pub fn completions_at_or_above(&self, threshold: f64) -> Vec<Completion> {
        self.entrants
            .iter()
            .filter_map(|e| e.duration_secs.map(|secs| (e.car.id, secs)))
            .filter(|(_, secs)| *secs >= threshold)
            .map(|(car_id, secs)| Completion {
                car_id,
                duration_secs: secs,
                is_winning_time: Some(secs) == self.min_duration,
            })
            .collect()
    }

    fn assign(&mut self, durations: Vec<f64>) {
        debug_assert_eq!(self.entrants.len(), durations.len());
        for (entrant, secs) in self.entrants.iter_mut().zip(durations) {
            entrant.duration_secs = Some(secs);
        }
        self.recompute_min_duration();
    }

    fn recompute_min_duration(&mut self) {
        self.min_duration = self
            .entrants
            .iter()
            .filter_map(|e| e.duration_secs)
            .fold(None, |min, secs| match min {
                Some(min) if min <= secs => Some(min),
                _ => Some(secs),
            });
    }

    fn clear(&mut self) {
        for entrant in self.entrants.iter_mut() {
            entrant.duration_secs = None;
        }
        self.min_duration = None;
        self.announced = None;
    }
}

/// Owns the race lifecycle: the roster, each car's assigned time,
/// and the winner.
#[derive(Clone)]
pub struct RaceController {
    state: Arc<RwLock<RaceState>>,
}

impl RaceController {
    pub fn init() -> Self {
        RaceController {
            state: Arc::new(RwLock::new(RaceState::init())),
        }
    }

    /// Replace the roster. This function returns `false` and leaves the
    /// roster untouched, unless the race is idle.
    pub async fn set_roster(&self, cars: Vec<Car>) -> bool {
        let mut state = self.state.write().await;
        if state.phase != RacePhase::Idle {
            return false;
        }
        state.entrants = cars
            .into_iter()
            .map(|car| Entrant {
                car,
                duration_secs: None,
            })
            .collect();
        true
    }

    /// Start a race with the current roster, assigning a fresh time to every car.
    ///
    /// Returns the new race generation, or `None` if the race is not idle,
    /// or there are no cars to race.
    pub async fn start(&self, durations: &DurationGenerator) -> Option<u64> {
        let mut state = self.state.write().await;
        if state.phase != RacePhase::Idle {
            log::warn!("cannot start a race that is not idle");
            return None;
        }
        if state.entrants.is_empty() {
            log::warn!("cannot start a race without cars");
            return None;
        }

        let times = durations.generate(state.entrants.len());
        state.assign(times);
        state.generation += 1;
        state.phase = RacePhase::Running;

        log::info!(
            "race {} started with {} cars, fastest time {:?}",
            state.generation,
            state.entrants.len(),
            state.min_duration
        );
        Some(state.generation)
    }

    /// Close the observation window of the specified race, and determine its winner.
    pub async fn finish(&self, generation: u64) -> FinishOutcome {
        let mut state = self.state.write().await;
        if state.generation != generation || state.phase != RacePhase::Running {
            return FinishOutcome::Stale;
        }

        state.phase = RacePhase::Finished;

        let announcement = state.winning_entrants().next().map(|e| Announcement {
            car_id: e.car.id,
            name: e.car.name.clone(),
            color: e.car.color.clone(),
            duration_secs: e.duration_secs.unwrap_or_default(),
        });
        state.announced = announcement.clone();

        match announcement {
            Some(announcement) => FinishOutcome::Winner(announcement),
            None => FinishOutcome::NoWinner,
        }
    }

    /// Return to idle after the announcement of the specified race.
    ///
    /// Returns `false` if that race was reset or restarted in the meantime.
    pub async fn conclude(&self, generation: u64) -> bool {
        let mut state = self.state.write().await;
        if state.generation != generation || state.phase != RacePhase::Finished {
            return false;
        }
        state.clear();
        state.phase = RacePhase::Idle;
        state.generation += 1;
        true
    }

    /// Return to idle, discarding all assigned times. Safe to call in any phase.
    ///
    /// Returns `false` if the race was already idle.
    pub async fn reset(&self) -> bool {
        let mut state = self.state.write().await;
        let was_active = state.phase != RacePhase::Idle;
        state.clear();
        state.phase = RacePhase::Idle;
        state.generation += 1;
        was_active
    }

    /// Remove a car from the roster in any phase. Returns `false` if
    /// there was no such car.
    pub async fn remove(&self, car_id: i32) -> bool {
        let mut state = self.state.write().await;
        let len_before = state.entrants.len();
        state.entrants.retain(|e| e.car.id != car_id);
        if state.entrants.len() == len_before {
            return false;
        }
        state.recompute_min_duration();
        true
    }
}

#[async_trait]
impl LiveRace for RaceController {
    async fn lock(&self) -> RwLockReadGuard<'_, RaceState> {
        self.state.read().await
    }
}

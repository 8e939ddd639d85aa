use std::fmt::Write;

use crate::command::{Command, COMMAND_REFERENCE};
use crate::constants::{CARS_PER_PAGE, WINNERS_PER_PAGE};
use crate::controller::{nb_pages, page, Controller, LiveRace, RacePhase};

/// What the console should do after running a command.
#[derive(Debug, PartialEq)]
pub enum CommandFlow {
    /// Print the reply, and wait for the next command.
    Continue(String),

    /// Exit the program.
    Quit,
}

impl Controller {
    pub async fn on_command(&self, cmd: Command) -> CommandFlow {
        use Command::*;
        use CommandFlow::Continue;

        match cmd {
            Race => {
                if self.start_race().await {
                    Continue("race started".to_string())
                } else {
                    Continue("cannot start a race right now".to_string())
                }
            }
            Reset => {
                self.reset_race().await;
                Continue("race reset".to_string())
            }
            Remove { car_id } => {
                self.remove_car(car_id).await;
                Continue(format!("removed car {}", car_id))
            }
            Create { name, color } => match self.create_car(&name, &color).await {
                Some(car) => Continue(format!("added car {}: {}", car.id, car.name)),
                None => Continue("failed to add car".to_string()),
            },
            Update {
                car_id,
                name,
                color,
            } => match self.update_car(car_id, &name, &color).await {
                Some(car) => Continue(format!("updated car {}: {}", car.id, car.name)),
                None => Continue(format!("failed to update car {}", car_id)),
            },
            Generate => {
                let nb_added = self.generate_cars().await;
                Continue(format!("added {} random cars", nb_added))
            }
            Garage { page_idx } => Continue(self.garage_page(page_idx).await),
            Winners { page_idx } => Continue(self.winners_page(page_idx).await),
            Help => Continue(COMMAND_REFERENCE.trim().to_string()),
            Quit => CommandFlow::Quit,
        }
    }

    async fn garage_page(&self, page_idx: usize) -> String {
        let race = self.live_race();
        let state = race.lock().await;

        let mut out = String::new();
        let _ = writeln!(
            out,
            "Garage ({}) page {}/{}, {:?}",
            state.entrants().len(),
            page_idx.saturating_add(1),
            nb_pages(state.entrants().len(), CARS_PER_PAGE).max(1),
            state.phase(),
        );

        for (position, entrant) in state.roster_page(page_idx, CARS_PER_PAGE) {
            let time = match entrant.duration_secs {
                Some(secs) => format!("{:.2}s", secs),
                None => "-".to_string(),
            };
            let _ = writeln!(
                out,
                "{:>4}. [{}]  {}  {:<24} {:>6}",
                position.saturating_add(1),
                entrant.car.id,
                entrant.car.color,
                entrant.car.name,
                time
            );
        }

        if state.phase() == RacePhase::Finished {
            if let Some(winner) = state.announced() {
                let _ = writeln!(
                    out,
                    "Winner: {} ({:.2}s)",
                    winner.name, winner.duration_secs
                );
            }
        }

        out.trim_end().to_string()
    }

    async fn winners_page(&self, page_idx: usize) -> String {
        let standings = match self.standings().await {
            Ok(standings) => standings,
            Err(err) => {
                log::error!("failed to load winners: {:?}", err);
                return "failed to load winners".to_string();
            }
        };

        let mut out = String::new();
        let _ = writeln!(
            out,
            "Winners ({}) page {}/{}",
            standings.len(),
            page_idx.saturating_add(1),
            nb_pages(standings.len(), WINNERS_PER_PAGE).max(1),
        );

        let first_rank = page_idx.saturating_mul(WINNERS_PER_PAGE).saturating_add(1);
        for (idx, standing) in page(&standings, page_idx, WINNERS_PER_PAGE).iter().enumerate() {
            let _ = writeln!(
                out,
                "{:>4}. {:<24} {}  {:>4} wins  {:>6.2}s",
                first_rank.saturating_add(idx),
                standing.car.name,
                standing.car.color,
                standing.wins,
                standing.best_time_secs
            );
        }

        out.trim_end().to_string()
    }
}

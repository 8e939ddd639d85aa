/// The race console's entry-point.
///
/// If the configured backend is not reachable, this function will periodically
/// try to connect. Commands are read from stdin, one per line.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use std::time::Duration;

    use dotenv::dotenv;
    use tokio::io::{stdin, AsyncBufReadExt, BufReader};
    use tokio::sync::broadcast::RecvError;

    use async_race::command::Command;
    use async_race::config::Config;
    use async_race::controller::{CommandFlow, Controller};
    use async_race::database::db_connect;

    // Read environment variables from an '.env' file in the working directory.
    // We use these env vars:
    //  - RUST_LOG
    //  - ASYNC_RACE_CONFIG
    let using_env_file = dotenv().is_ok();

    env_logger::init(); // Use log::* to write to stderr

    if using_env_file {
        log::info!("using .env file")
    }

    let config = Config::load()?;

    let retry_after = Duration::from_secs(1);

    log::info!("waiting for backend connection...");
    let db = loop {
        match db_connect(&config.backend, retry_after).await? {
            None => {
                tokio::time::delay_for(retry_after).await;
                log::debug!("waiting for backend connection...");
            }
            Some(db) => break db,
        }
    };
    log::info!("got backend connection");

    let controller = Controller::init(config, db).await;

    let mut events = controller.subscribe();
    let _ = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => print_event(&event),
                Err(RecvError::Lagged(nb_skipped)) => {
                    log::warn!("skipped {} race events", nb_skipped)
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    println!("type 'help' for a list of commands");

    let mut lines = BufReader::new(stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let cmd = match Command::from(&line) {
            Some(cmd) => cmd,
            None => {
                println!("unknown command '{}'; type 'help' for a list of commands", line.trim());
                continue;
            }
        };
        match controller.on_command(cmd).await {
            CommandFlow::Continue(reply) => println!("{}", reply),
            CommandFlow::Quit => break,
        }
    }

    // Pending timers and leaderboard submissions are dropped with the runtime.
    log::info!("exiting");
    Ok(())
}

fn print_event(event: &async_race::event::RaceEvent) {
    use async_race::event::RaceEvent::*;

    match event {
        RaceStarted {
            nb_cars,
            min_duration_secs,
            ..
        } => println!(
            "race started with {} cars; fastest time is {:.2}s",
            nb_cars, min_duration_secs
        ),
        WinnerAnnounced(winner) => println!(
            "WINNER: {} ({}) in {:.2}s",
            winner.name, winner.color, winner.duration_secs
        ),
        RaceConcluded { .. } => println!("race concluded"),
        CarRemoved { car_id } => println!("car {} left the race", car_id),
        _ => log::debug!("{:?}", event),
    }
}

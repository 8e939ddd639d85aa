use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use tokio::sync::broadcast::Receiver;
use tokio::time::delay_for;

use async_race::command::Command;
use async_race::config::{Backend, Config};
use async_race::controller::*;
use async_race::database::*;
use async_race::event::RaceEvent;

const OBSERVATION_MILLIS: u64 = 150;
const ANNOUNCEMENT_MILLIS: u64 = 150;

fn config() -> Config {
    Config {
        backend: Backend::Memory,
        observation_delay_millis: OBSERVATION_MILLIS,
        announcement_delay_millis: ANNOUNCEMENT_MILLIS,
        min_duration_secs: 2.0,
        max_duration_secs: 5.0,
        nb_generated_cars: 5,
    }
}

async fn garage_with(nb_cars: i32) -> Arc<MemoryDatabase> {
    let _ = env_logger::builder().is_test(true).try_init();

    let mem = Arc::new(MemoryDatabase::default());
    for id in 1..=nb_cars {
        mem.push_car(id, &format!("car {}", id), "#ff0000").await;
    }
    mem
}

async fn controller_with(mem: &Arc<MemoryDatabase>) -> Controller {
    let db = mem.clone() as Arc<dyn Database>;
    Controller::init(config(), db).await
}

/// Wait for the next event that matches, skipping others.
async fn wait_for<P>(events: &mut Receiver<RaceEvent>, matches: P) -> Result<RaceEvent>
where
    P: Fn(&RaceEvent) -> bool,
{
    let wait = async {
        loop {
            match events.recv().await {
                Ok(event) if matches(&event) => return Ok(event),
                Ok(_) => continue,
                Err(err) => return Err(anyhow!("no more events: {:?}", err)),
            }
        }
    };
    tokio::time::timeout(Duration::from_secs(3), wait)
        .await
        .map_err(|_| anyhow!("timed out waiting for event"))?
}

/// Every event that was broadcast so far.
fn drain(events: &mut Receiver<RaceEvent>) -> Vec<RaceEvent> {
    let mut drained = vec![];
    while let Ok(event) = events.try_recv() {
        drained.push(event);
    }
    drained
}

#[tokio::test]
async fn test_race_lifecycle() -> Result<()> {
    let mem = garage_with(3).await;
    let controller = controller_with(&mem).await;
    let race = controller.live_race();
    let mut events = controller.subscribe();

    assert!(controller.start_race().await);
    assert_eq!(RacePhase::Running, race.phase().await);
    let min_duration = race.min_duration().await.ok_or_else(|| anyhow!("no times"))?;

    let announced = wait_for(&mut events, |e| matches!(e, RaceEvent::WinnerAnnounced(_))).await?;
    assert_eq!(RacePhase::Finished, race.phase().await);
    match announced {
        RaceEvent::WinnerAnnounced(winner) => {
            assert_eq!(min_duration, winner.duration_secs);
            assert_eq!(Some(winner), race.announced().await);
        }
        _ => unreachable!(),
    }

    wait_for(&mut events, |e| matches!(e, RaceEvent::RaceConcluded { .. })).await?;
    assert_eq!(RacePhase::Idle, race.phase().await);
    assert_eq!(None, race.min_duration().await);
    assert_eq!(None, race.announced().await);

    let state = race.lock().await;
    assert_eq!(3, state.entrants().len());
    assert!(state.entrants().iter().all(|e| e.duration_secs.is_none()));
    Ok(())
}

#[tokio::test]
async fn test_concluded_once() -> Result<()> {
    let mem = garage_with(2).await;
    let controller = controller_with(&mem).await;
    let mut events = controller.subscribe();

    assert!(controller.start_race().await);
    wait_for(&mut events, |e| matches!(e, RaceEvent::RaceConcluded { .. })).await?;

    delay_for(Duration::from_millis(OBSERVATION_MILLIS + ANNOUNCEMENT_MILLIS)).await;
    let nb_concluded = drain(&mut events)
        .iter()
        .filter(|e| matches!(e, RaceEvent::RaceConcluded { .. }))
        .count();
    assert_eq!(0, nb_concluded);
    Ok(())
}

#[tokio::test]
async fn test_results_are_merged() -> Result<()> {
    let mem = garage_with(3).await;
    let controller = controller_with(&mem).await;
    let mut events = controller.subscribe();

    assert!(controller.start_race().await);
    let min_duration = controller
        .live_race()
        .min_duration()
        .await
        .ok_or_else(|| anyhow!("no times"))?;

    for _ in 0..3 {
        wait_for(&mut events, |e| matches!(e, RaceEvent::ResultSubmitted { .. })).await?;
    }

    let standings = controller.standings().await?;
    assert_eq!(3, standings.len());
    assert!(standings.iter().map(|s| s.wins).sum::<i32>() >= 1);
    for standing in standings.iter() {
        assert!(standing.best_time_secs >= min_duration);
        if standing.wins == 1 {
            assert_eq!(min_duration, standing.best_time_secs);
        }
    }
    Ok(())
}

#[tokio::test]
async fn test_existing_records_keep_best_time() -> Result<()> {
    let mem = garage_with(1).await;
    mem.push_winner(1, 4, 1.5).await;
    let controller = controller_with(&mem).await;
    let mut events = controller.subscribe();

    assert!(controller.start_race().await);
    wait_for(&mut events, |e| matches!(e, RaceEvent::ResultSubmitted { .. })).await?;

    // A single car always has the fastest time.
    let db = mem.clone() as Arc<dyn Database>;
    let record = db.winner(1).await?.ok_or_else(|| anyhow!("no record"))?;
    assert_eq!(5, record.wins);
    assert_eq!(1.5, record.time);
    Ok(())
}

#[tokio::test]
async fn test_reset_cancels_announcement() -> Result<()> {
    let mem = garage_with(3).await;
    let controller = controller_with(&mem).await;
    let race = controller.live_race();
    let mut events = controller.subscribe();

    assert!(controller.start_race().await);
    controller.reset_race().await;
    assert_eq!(RacePhase::Idle, race.phase().await);
    assert_eq!(None, race.min_duration().await);

    delay_for(Duration::from_millis(2 * OBSERVATION_MILLIS)).await;
    let announced = drain(&mut events)
        .into_iter()
        .any(|e| matches!(e, RaceEvent::WinnerAnnounced(_)));
    assert!(!announced);
    assert_eq!(RacePhase::Idle, race.phase().await);
    Ok(())
}

#[tokio::test]
async fn test_reset_during_announcement() -> Result<()> {
    let mem = garage_with(3).await;
    let controller = controller_with(&mem).await;
    let race = controller.live_race();
    let mut events = controller.subscribe();

    assert!(controller.start_race().await);
    wait_for(&mut events, |e| matches!(e, RaceEvent::WinnerAnnounced(_))).await?;
    assert_eq!(RacePhase::Finished, race.phase().await);

    controller.reset_race().await;
    assert_eq!(RacePhase::Idle, race.phase().await);
    assert_eq!(None, race.announced().await);

    delay_for(Duration::from_millis(2 * ANNOUNCEMENT_MILLIS)).await;
    let concluded = drain(&mut events)
        .into_iter()
        .any(|e| matches!(e, RaceEvent::RaceConcluded { .. }));
    assert!(!concluded);
    assert_eq!(RacePhase::Idle, race.phase().await);
    assert_eq!(None, race.announced().await);
    Ok(())
}

#[tokio::test]
async fn test_restart_right_after_conclusion() -> Result<()> {
    let mem = garage_with(2).await;
    let controller = controller_with(&mem).await;
    let mut events = controller.subscribe();

    assert!(controller.start_race().await);
    wait_for(&mut events, |e| matches!(e, RaceEvent::RaceConcluded { .. })).await?;

    // Race the follow-up work of the concluded race.
    let mut restarted = false;
    for _ in 0..50 {
        if controller.start_race().await {
            restarted = true;
            break;
        }
        tokio::task::yield_now().await;
    }
    assert!(restarted);

    let announced = wait_for(&mut events, |e| matches!(e, RaceEvent::WinnerAnnounced(_))).await?;
    assert!(matches!(announced, RaceEvent::WinnerAnnounced(_)));
    wait_for(&mut events, |e| matches!(e, RaceEvent::RaceConcluded { .. })).await?;
    assert_eq!(RacePhase::Idle, controller.live_race().phase().await);
    Ok(())
}

#[tokio::test]
async fn test_restart_ignores_stale_timer() -> Result<()> {
    let mem = garage_with(2).await;
    let controller = controller_with(&mem).await;
    let race = controller.live_race();

    assert!(controller.start_race().await);
    delay_for(Duration::from_millis(OBSERVATION_MILLIS * 2 / 3)).await;
    controller.reset_race().await;
    assert!(controller.start_race().await);

    // Past the first race's deadline, but not the second's.
    delay_for(Duration::from_millis(OBSERVATION_MILLIS * 2 / 3)).await;
    assert_eq!(RacePhase::Running, race.phase().await);
    Ok(())
}

#[tokio::test]
async fn test_cannot_start_twice() -> Result<()> {
    let mem = garage_with(2).await;
    let controller = controller_with(&mem).await;

    assert!(controller.start_race().await);
    assert!(!controller.start_race().await);
    Ok(())
}

#[tokio::test]
async fn test_cannot_start_without_cars() -> Result<()> {
    let mem = garage_with(0).await;
    let controller = controller_with(&mem).await;

    assert!(!controller.start_race().await);
    assert_eq!(RacePhase::Idle, controller.live_race().phase().await);
    Ok(())
}

#[tokio::test]
async fn test_remove_during_race_while_offline() -> Result<()> {
    let mem = garage_with(3).await;
    let controller = controller_with(&mem).await;
    let race = controller.live_race();
    let mut events = controller.subscribe();

    assert!(controller.start_race().await);
    mem.set_offline(true).await;
    controller.remove_car(2).await;

    wait_for(&mut events, |e| *e == RaceEvent::CarRemoved { car_id: 2 }).await?;
    {
        let state = race.lock().await;
        let ids: Vec<i32> = state.entrants().iter().map(|e| e.car.id).collect();
        assert_eq!(vec![1, 3], ids);

        let remaining_min = state
            .entrants()
            .iter()
            .filter_map(|e| e.duration_secs)
            .fold(f64::INFINITY, f64::min);
        assert_eq!(Some(remaining_min), state.min_duration());
    }

    // The announcement is made from the remaining cars.
    let announced = wait_for(&mut events, |e| matches!(e, RaceEvent::WinnerAnnounced(_))).await?;
    match announced {
        RaceEvent::WinnerAnnounced(winner) => assert_ne!(2, winner.car_id),
        _ => unreachable!(),
    }
    Ok(())
}

#[tokio::test]
async fn test_remove_every_car_during_race() -> Result<()> {
    let mem = garage_with(1).await;
    let controller = controller_with(&mem).await;
    let mut events = controller.subscribe();

    assert!(controller.start_race().await);
    controller.remove_car(1).await;

    wait_for(&mut events, |e| *e == RaceEvent::RaceReset).await?;
    assert_eq!(RacePhase::Idle, controller.live_race().phase().await);
    Ok(())
}

#[tokio::test]
async fn test_garage_edits_refresh_idle_roster() -> Result<()> {
    let mem = garage_with(1).await;
    let controller = controller_with(&mem).await;
    let race = controller.live_race();

    let car = controller
        .create_car("Audi R8", "#00ff00")
        .await
        .ok_or_else(|| anyhow!("car not added"))?;
    assert_eq!(2, race.lock().await.entrants().len());

    controller.update_car(car.id, "Audi A4", "#0000ff").await;
    assert_eq!("Audi A4", race.lock().await.entrants()[1].car.name);

    assert_eq!(5, controller.generate_cars().await);
    assert_eq!(7, race.lock().await.entrants().len());
    Ok(())
}

#[tokio::test]
async fn test_commands() -> Result<()> {
    let mem = garage_with(9).await;
    let controller = controller_with(&mem).await;

    let reply = |flow: CommandFlow| match flow {
        CommandFlow::Continue(reply) => reply,
        CommandFlow::Quit => panic!("unexpected quit"),
    };

    let first_page = reply(controller.on_command(Command::Garage { page_idx: 0 }).await);
    assert!(first_page.contains("car 7"));
    assert!(!first_page.contains("car 8"));

    let second_page = reply(controller.on_command(Command::Garage { page_idx: 1 }).await);
    assert!(second_page.contains("car 9"));
    assert!(second_page.contains("   8. [8]"));
    assert!(second_page.contains("   9. [9]"));

    let winners = reply(controller.on_command(Command::Winners { page_idx: 0 }).await);
    assert!(winners.starts_with("Winners (0)"));

    assert_eq!(
        CommandFlow::Quit,
        controller.on_command(Command::Quit).await
    );
    Ok(())
}

#![cfg(feature = "integration_test")]

use std::future::Future;
use std::time::Duration;

use anyhow::{anyhow, Result};
use testcontainers::*;

use async_race::database::*;

/// Spins up a Postgres database in a Docker container, and runs
/// the given test against its freshly migrated schema.
///
/// The container is stopped when the test returns.
async fn with_clean_db<F, Fut>(test: F) -> Result<()>
where
    F: FnOnce(PgDatabase) -> Fut,
    Fut: Future<Output = Result<()>>,
{
    // Enable logging output
    let _ = env_logger::builder().is_test(true).try_init();

    let db = "postgres-db-test";
    let user = "postgres-user-test";
    let password = "postgres-password-test";

    let generic_postgres = images::generic::GenericImage::new("postgres:latest")
        .with_wait_for(images::generic::WaitFor::message_on_stderr(
            "database system is ready to accept connections",
        ))
        .with_env_var("POSTGRES_DB", db)
        .with_env_var("POSTGRES_USER", user)
        .with_env_var("POSTGRES_PASSWORD", password);

    let docker = clients::Cli::default();

    log::info!("starting container...");
    let container = docker.run(generic_postgres);
    log::info!("container started");

    let port = container
        .get_host_port(5432)
        .ok_or_else(|| anyhow!("failed to determine Postgres host port"))?;
    let pg_conn_str = format!(
        "postgres://{}:{}@localhost:{}/{}",
        user, password, port, db
    );

    log::info!("connecting to container database...");
    let client = pg_connect(&pg_conn_str, Duration::from_secs(5))
        .await?
        .ok_or_else(|| anyhow!("postgres not running"))?;
    log::info!("connected to container database");

    client.clear().await?;
    client.migrate().await?;
    log::info!("completed test setup");

    test(client).await
}

fn evidence(name: &str, color: &str) -> CarEvidence {
    CarEvidence {
        name: name.to_string(),
        color: color.to_string(),
    }
}

#[tokio::test]
async fn test_migrate_twice() -> Result<()> {
    with_clean_db(|db| async move {
        db.migrate().await?;
        assert!(db.cars().await?.is_empty());
        assert!(db.winners().await?.is_empty());
        Ok(())
    })
    .await
}

#[tokio::test]
async fn test_car_insert() -> Result<()> {
    with_clean_db(|db| async move {
        let first = db.insert_car(&evidence("Tesla Model S", "#ff0000")).await?;
        let second = db.insert_car(&evidence("BMW X5", "#00ff00")).await?;
        assert_ne!(first.id, second.id);

        assert_eq!(vec![first, second], db.cars().await?);
        Ok(())
    })
    .await
}

#[tokio::test]
async fn test_car_update() -> Result<()> {
    with_clean_db(|db| async move {
        let car = db.insert_car(&evidence("Audi R8", "#000000")).await?;
        let changed = Car {
            id: car.id,
            name: "Audi A4".to_string(),
            color: "#ffffff".to_string(),
        };

        assert_eq!(Some(changed.clone()), db.update_car(&changed).await?);
        assert_eq!(vec![changed], db.cars().await?);

        let missing = Car {
            id: car.id + 1,
            ..car
        };
        assert_eq!(None, db.update_car(&missing).await?);
        Ok(())
    })
    .await
}

#[tokio::test]
async fn test_car_delete() -> Result<()> {
    with_clean_db(|db| async move {
        let car = db.insert_car(&evidence("Mazda A", "#123456")).await?;

        assert!(db.delete_car(car.id).await?);
        assert!(!db.delete_car(car.id).await?);
        assert!(db.cars().await?.is_empty());
        Ok(())
    })
    .await
}

#[tokio::test]
async fn test_winner_upsert() -> Result<()> {
    with_clean_db(|db| async move {
        let first = Winner {
            id: 3,
            wins: 1,
            time: 2.45,
        };
        db.insert_winner(&first).await?;
        assert_eq!(Some(first), db.winner(3).await?);

        let merged = Winner {
            id: 3,
            wins: 2,
            time: 2.1,
        };
        assert!(db.update_winner(&merged).await?);
        assert_eq!(Some(merged), db.winner(3).await?);
        assert_eq!(vec![merged], db.winners().await?);

        let unknown = Winner { id: 4, ..merged };
        assert!(!db.update_winner(&unknown).await?);
        Ok(())
    })
    .await
}

#[tokio::test]
async fn test_winner_insert_twice() -> Result<()> {
    with_clean_db(|db| async move {
        let record = Winner {
            id: 1,
            wins: 0,
            time: 4.0,
        };
        db.insert_winner(&record).await?;
        assert!(db.insert_winner(&record).await.is_err());
        Ok(())
    })
    .await
}

#[tokio::test]
async fn test_winner_delete() -> Result<()> {
    with_clean_db(|db| async move {
        db.insert_winner(&Winner {
            id: 7,
            wins: 1,
            time: 3.3,
        })
        .await?;

        assert!(db.delete_winner(7).await?);
        assert!(!db.delete_winner(7).await?);
        assert_eq!(None, db.winner(7).await?);
        Ok(())
    })
    .await
}

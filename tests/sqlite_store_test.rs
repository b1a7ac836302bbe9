//! Engine behavior on the SQLite store, including persistence across reopen

mod common;

use chrono::Duration;
use tempfile::TempDir;

use common::{ana, engine_with};
use mlquest::{ProgressStore, SqliteStore, UnitId};

#[tokio::test]
async fn test_progress_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("progress.db");
    let learner = ana();

    {
        let (engine, clock) = engine_with(SqliteStore::open(&path).unwrap());
        engine
            .record_progress(&learner, &UnitId::from("linear"), 100, true)
            .await
            .unwrap();
        clock.advance(Duration::minutes(3));
        engine
            .record_progress(&learner, &UnitId::from("kmeans"), 45, false)
            .await
            .unwrap();
    }

    let (engine, _clock) = engine_with(SqliteStore::open(&path).unwrap());
    let records = engine.store().get_all_records(&learner).await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].unit_id.as_str(), "kmeans");
    assert_eq!(records[0].percentage, 45);
    assert!(records[1].completed);

    let profile = engine.get_profile(&learner).await.unwrap();
    assert_eq!(profile.total_xp, 50);
    assert_eq!(profile.units_started, 2);
}

#[tokio::test]
async fn test_two_connections_converge() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("progress.db");
    let learner = ana();
    let unit = UnitId::from("loss");

    let (web, _) = engine_with(SqliteStore::open(&path).unwrap());
    let (mobile, _) = engine_with(SqliteStore::open(&path).unwrap());

    web.record_progress(&learner, &unit, 80, false).await.unwrap();
    let stale = mobile.record_progress(&learner, &unit, 20, false).await.unwrap();
    assert_eq!(stale.percentage, 80);

    mobile.record_progress(&learner, &unit, 100, true).await.unwrap();
    web.record_progress(&learner, &unit, 100, true).await.unwrap();

    let profile = web.get_profile(&learner).await.unwrap();
    assert_eq!(profile.total_xp, 30);
    assert_eq!(profile.units_completed, 1);
}

#[tokio::test]
async fn test_reset_persists() {
    let (engine, _clock) = engine_with(SqliteStore::open_in_memory().unwrap());
    let learner = ana();
    let unit = UnitId::from("capstone");

    engine.record_progress(&learner, &unit, 100, true).await.unwrap();
    engine.reset_unit(&learner, &unit).await.unwrap();

    let record = engine.get_progress(&learner, &unit).await.unwrap();
    assert_eq!(record.percentage, 0);
    assert!(!record.completed);
    assert_eq!(engine.get_profile(&learner).await.unwrap().level, 1);
}

//! Record, reset and sync command implementations

use std::path::Path;

use anyhow::Result;

use mlquest::sync::{Delivery, Outbox};
use mlquest::{LearnerId, ProgressUpdate, UnitId};

use super::open_engine;

/// Record progress, parking it in the outbox when the store write fails
pub async fn record_command(
    config_path: Option<&Path>,
    learner: &str,
    unit: &str,
    percentage: u32,
    completed: bool,
) -> Result<()> {
    let (config, engine) = open_engine(config_path)?;
    let learner = LearnerId::from(learner);
    let outbox_path = config.outbox_path();
    let mut outbox = Outbox::load(&outbox_path)?;

    let update = ProgressUpdate {
        unit_id: UnitId::from(unit),
        percentage,
        completed,
    };

    match outbox.record_or_queue(&engine, &learner, update).await? {
        Delivery::Stored(record) => {
            let status = if record.completed { "completed" } else { "in progress" };
            println!("{} / {}: {}% ({})", record.learner_id, record.unit_id, record.percentage, status);
        }
        Delivery::Queued => {
            outbox.save(&outbox_path)?;
            println!(
                "Store unreachable; queued for later ({} pending). Run `mlquest sync` to retry.",
                outbox.len()
            );
        }
    }

    Ok(())
}

/// Restart a unit from zero
pub async fn reset_command(config_path: Option<&Path>, learner: &str, unit: &str) -> Result<()> {
    let (_, engine) = open_engine(config_path)?;
    let record = engine
        .reset_unit(&LearnerId::from(learner), &UnitId::from(unit))
        .await?;
    println!("Reset {} for {}", record.unit_id, record.learner_id);
    Ok(())
}

/// Replay the outbox
pub async fn sync_command(config_path: Option<&Path>, learner: Option<&str>) -> Result<()> {
    let (config, engine) = open_engine(config_path)?;
    let outbox_path = config.outbox_path();
    let mut outbox = Outbox::load(&outbox_path)?;

    if outbox.is_empty() {
        println!("Nothing to sync.");
        return Ok(());
    }

    let learner = learner.map(LearnerId::from);
    let report = outbox.flush(&engine, learner.as_ref()).await;
    outbox.save(&outbox_path)?;

    println!(
        "Delivered {}, dropped {}, still pending {}",
        report.delivered, report.dropped, report.remaining
    );
    Ok(())
}

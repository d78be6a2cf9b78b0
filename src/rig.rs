//! Stand-in for the on-site controller so the demo binary has something to
//! mirror. It seeds `/config`, publishes drifting sensor readings, doses
//! toward the configured window, appends log entries, and leaves the water
//! pump alone once the operator has raised the manual-override flag.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use chrono::Utc;
use log::{error, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

use crate::models::{
    paths, FieldMap, PumpId, Snapshot, TargetConfig, TargetPatch, MANUAL_CONTROL_FIELD,
};
use crate::store::StateStore;

pub const DEFAULT_TARGETS: TargetConfig = TargetConfig {
    ph_min: 5.5,
    ph_limit: 6.8,
    ppm_min: 560,
    ppm_limit: 840,
    scan_interval: 5,
};

struct Rig {
    ph: f64,
    ppm: f64,
    temperature: f64,
    water_low: bool,
}

pub async fn run_rig<S: StateStore>(store: Arc<S>, cancel: CancellationToken) {
    if let Err(err) = seed(store.as_ref()).await {
        error!("rig seeding failed: {err:#}");
        return;
    }

    let mut pumps_rx = store.subscribe(paths::PUMPS);
    let mut config_rx = store.subscribe(paths::CONFIG);
    let mut rng = StdRng::from_entropy();
    let mut rig = Rig {
        ph: 6.1,
        ppm: 690.0,
        temperature: 22.5,
        water_low: false,
    };

    loop {
        let scan = scan_secs(&config_rx.borrow_and_update());
        tokio::select! {
            _ = tokio::time::sleep(Duration::from_secs(scan)) => {}
            _ = cancel.cancelled() => break,
        }

        let pumps = pumps_rx.borrow_and_update().clone();
        let targets =
            TargetPatch::decode(&config_rx.borrow_and_update())
                .and_then(|patch| patch.apply(None))
                .unwrap_or(DEFAULT_TARGETS);
        if let Err(err) = tick(store.as_ref(), &mut rig, &mut rng, &pumps, &targets).await {
            error!("rig tick failed: {err:#}");
        }
    }
    info!("rig stopped");
}

async fn seed<S: StateStore>(store: &S) -> Result<()> {
    let fields = match serde_json::to_value(DEFAULT_TARGETS)? {
        Value::Object(fields) => fields,
        other => bail!("unexpected target encoding: {other}"),
    };
    store.update(paths::CONFIG, fields).await?;

    let mut pumps = FieldMap::new();
    for pump in PumpId::ALL {
        pumps.insert(pump.field().to_owned(), Value::Bool(false));
    }
    pumps.insert(MANUAL_CONTROL_FIELD.to_owned(), Value::Bool(false));
    store.update(paths::PUMPS, pumps).await?;

    append_log(store, "Controller online").await
}

async fn tick<S: StateStore>(
    store: &S,
    rig: &mut Rig,
    rng: &mut StdRng,
    pumps: &Snapshot,
    targets: &TargetConfig,
) -> Result<()> {
    let dosing_down = pump_on(pumps, PumpId::SolutionA);
    let dosing_up = pump_on(pumps, PumpId::SolutionB);
    let feeding = pump_on(pumps, PumpId::SolutionC) || pump_on(pumps, PumpId::SolutionD);
    let water_pump = pump_on(pumps, PumpId::WaterPump);

    // Readings drift randomly and get pulled back by whatever is dosing.
    rig.ph += rng.gen_range(-0.06..0.06);
    if dosing_down {
        rig.ph -= 0.10;
    }
    if dosing_up {
        rig.ph += 0.10;
    }
    rig.ph = rig.ph.clamp(4.8, 7.8);

    rig.ppm += rng.gen_range(-15.0..6.0);
    if feeding {
        rig.ppm += 35.0;
    }
    rig.ppm = rig.ppm.clamp(350.0, 1150.0);

    rig.temperature = (rig.temperature + rng.gen_range(-0.3..0.3)).clamp(16.0, 31.0);

    if rig.water_low {
        if water_pump {
            rig.water_low = false;
        }
    } else if rng.gen_bool(0.05) {
        rig.water_low = true;
    }

    let mut sensors = FieldMap::new();
    sensors.insert(
        "temperature".to_owned(),
        json!((rig.temperature * 10.0).round() / 10.0),
    );
    sensors.insert("pH".to_owned(), json!((rig.ph * 100.0).round() / 100.0));
    sensors.insert("PPM".to_owned(), json!(rig.ppm.round() as i64));
    sensors.insert(
        "waterLevel".to_owned(),
        json!(if rig.water_low { "LOW" } else { "HIGH" }),
    );
    store.update(paths::SENSORS, sensors).await?;

    set_pump(
        store,
        pumps,
        PumpId::SolutionA,
        rig.ph > targets.ph_limit,
        "pH above limit, dosing down",
    )
    .await?;
    set_pump(
        store,
        pumps,
        PumpId::SolutionB,
        rig.ph < targets.ph_min,
        "pH below minimum, dosing up",
    )
    .await?;
    set_pump(
        store,
        pumps,
        PumpId::SolutionC,
        rig.ppm < targets.ppm_min as f64,
        "nutrients low, feeding part A",
    )
    .await?;
    set_pump(
        store,
        pumps,
        PumpId::SolutionD,
        rig.ppm < (targets.ppm_min + targets.ppm_limit) as f64 / 2.0 - 60.0,
        "nutrients below window, feeding part B",
    )
    .await?;

    let manual = pumps
        .as_ref()
        .and_then(|doc| doc.get(MANUAL_CONTROL_FIELD))
        .and_then(Value::as_bool)
        .unwrap_or(false);
    if !manual {
        set_pump(
            store,
            pumps,
            PumpId::WaterPump,
            rig.water_low,
            "water level low, refilling",
        )
        .await?;
    }

    Ok(())
}

async fn set_pump<S: StateStore>(
    store: &S,
    pumps: &Snapshot,
    pump: PumpId,
    desired: bool,
    reason: &str,
) -> Result<()> {
    if pump_on(pumps, pump) == desired {
        return Ok(());
    }

    let mut fields = FieldMap::new();
    fields.insert(pump.field().to_owned(), Value::Bool(desired));
    store.update(paths::PUMPS, fields).await?;

    if desired {
        append_log(store, &format!("{}: {reason}", pump.label())).await?;
    } else {
        append_log(store, &format!("{} off", pump.label())).await?;
    }
    Ok(())
}

fn pump_on(pumps: &Snapshot, pump: PumpId) -> bool {
    pumps
        .as_ref()
        .and_then(|doc| doc.get(pump.field()))
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

fn scan_secs(config: &Snapshot) -> u64 {
    TargetPatch::decode(config)
        .and_then(|patch| patch.scan_interval)
        .unwrap_or(DEFAULT_TARGETS.scan_interval)
        .max(1) as u64
}

async fn append_log<S: StateStore>(store: &S, message: &str) -> Result<()> {
    let mut entry = FieldMap::new();
    entry.insert(
        Utc::now().timestamp_millis().to_string(),
        json!({ "message": message }),
    );
    store.update(paths::LOGS, entry).await
}

#[cfg(test)]
mod tests {
    use crate::store::MemoryStore;

    use super::*;

    fn pumps_snapshot(store: &MemoryStore) -> Snapshot {
        store.subscribe(paths::PUMPS).borrow_and_update().clone()
    }

    #[tokio::test]
    async fn water_pump_refills_when_the_level_drops() {
        let store = MemoryStore::new();
        seed(&store).await.unwrap();

        let mut rig = Rig {
            ph: 6.1,
            ppm: 700.0,
            temperature: 22.0,
            water_low: true,
        };
        let mut rng = StdRng::seed_from_u64(7);
        let pumps = pumps_snapshot(&store);
        tick(&store, &mut rig, &mut rng, &pumps, &DEFAULT_TARGETS)
            .await
            .unwrap();

        let pumps = pumps_snapshot(&store);
        assert!(pump_on(&pumps, PumpId::WaterPump));
    }

    #[tokio::test]
    async fn manual_override_stops_water_pump_automation() {
        let store = MemoryStore::new();
        seed(&store).await.unwrap();

        let mut fields = FieldMap::new();
        fields.insert(MANUAL_CONTROL_FIELD.to_owned(), Value::Bool(true));
        store.update(paths::PUMPS, fields).await.unwrap();

        let mut rig = Rig {
            ph: 6.1,
            ppm: 700.0,
            temperature: 22.0,
            water_low: true,
        };
        let mut rng = StdRng::seed_from_u64(7);
        let pumps = pumps_snapshot(&store);
        tick(&store, &mut rig, &mut rng, &pumps, &DEFAULT_TARGETS)
            .await
            .unwrap();

        let pumps = pumps_snapshot(&store);
        assert!(!pump_on(&pumps, PumpId::WaterPump));
    }
}

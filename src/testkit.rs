//! Test doubles shared by the module tests: a surface that records every
//! setter call and a store that records every write.

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::{bail, Result};
use tokio::sync::watch;

use crate::dashboard::{ChartId, DashboardSurface};
use crate::models::{FieldMap, LogEntry, PumpId, Snapshot, TargetField};
use crate::store::StateStore;
use crate::telemetry::ValueClass;

#[derive(Debug, Clone, Default)]
pub struct SurfaceState {
    pub temperature: Option<(String, Option<ValueClass>)>,
    pub ph: Option<(String, Option<ValueClass>)>,
    pub ppm: Option<(String, Option<ValueClass>)>,
    pub water_level: Option<bool>,
    pub last_updated: Option<String>,
    pub highlight: bool,
    pub pumps: HashMap<PumpId, bool>,
    pub target_fields: HashMap<TargetField, String>,
    pub charts: HashMap<ChartId, (Vec<String>, Vec<f64>, Vec<f64>)>,
    pub logs: Vec<LogEntry>,
    pub notices: Vec<String>,
    pub errors: Vec<String>,
}

#[derive(Default)]
pub struct RecordingSurface {
    state: Mutex<SurfaceState>,
}

impl RecordingSurface {
    pub fn state(&self) -> SurfaceState {
        self.state.lock().unwrap().clone()
    }
}

impl DashboardSurface for RecordingSurface {
    fn show_temperature(&self, text: &str, class: Option<ValueClass>) {
        self.state.lock().unwrap().temperature = Some((text.to_owned(), class));
    }

    fn show_ph(&self, text: &str, class: Option<ValueClass>) {
        self.state.lock().unwrap().ph = Some((text.to_owned(), class));
    }

    fn show_ppm(&self, text: &str, class: Option<ValueClass>) {
        self.state.lock().unwrap().ppm = Some((text.to_owned(), class));
    }

    fn show_water_level(&self, ok: bool) {
        self.state.lock().unwrap().water_level = Some(ok);
    }

    fn show_last_updated(&self, text: &str) {
        self.state.lock().unwrap().last_updated = Some(text.to_owned());
    }

    fn set_reading_highlight(&self, on: bool) {
        self.state.lock().unwrap().highlight = on;
    }

    fn show_pump(&self, pump: PumpId, on: bool) {
        self.state.lock().unwrap().pumps.insert(pump, on);
    }

    fn show_target_field(&self, field: TargetField, text: &str) {
        self.state
            .lock()
            .unwrap()
            .target_fields
            .insert(field, text.to_owned());
    }

    fn redraw_chart(&self, chart: ChartId, labels: &[String], readings: &[f64], target: &[f64]) {
        self.state.lock().unwrap().charts.insert(
            chart,
            (labels.to_vec(), readings.to_vec(), target.to_vec()),
        );
    }

    fn show_logs(&self, entries: &[LogEntry]) {
        self.state.lock().unwrap().logs = entries.to_vec();
    }

    fn show_notice(&self, message: &str) {
        self.state.lock().unwrap().notices.push(message.to_owned());
    }

    fn show_error(&self, message: &str) {
        self.state.lock().unwrap().errors.push(message.to_owned());
    }
}

#[derive(Default)]
pub struct RecordingStore {
    updates: Mutex<Vec<(String, FieldMap)>>,
    fail_writes: bool,
}

impl RecordingStore {
    pub fn failing() -> Self {
        Self {
            updates: Mutex::new(Vec::new()),
            fail_writes: true,
        }
    }

    pub fn updates(&self) -> Vec<(String, FieldMap)> {
        self.updates.lock().unwrap().clone()
    }
}

impl StateStore for RecordingStore {
    fn subscribe(&self, _path: &str) -> watch::Receiver<Snapshot> {
        watch::channel(None).1
    }

    fn subscribe_tail(&self, _path: &str, _limit: usize) -> watch::Receiver<Snapshot> {
        watch::channel(None).1
    }

    async fn update(&self, path: &str, fields: FieldMap) -> Result<()> {
        if self.fail_writes {
            bail!("write rejected");
        }
        self.updates.lock().unwrap().push((path.to_owned(), fields));
        Ok(())
    }
}

//! The single entry point reacting to store change notifications, and the
//! only writer of on-screen values and chart buffers.

use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use log::debug;

use crate::dashboard::{ChartId, DashboardSurface};
use crate::models::{
    decode_log_entries, decode_pump_states, SensorReading, Snapshot, TargetConfig, TargetField,
    TargetPatch,
};

use super::classify::{classify, ValueClass};
use super::history::ChartHistory;

// Temperature thresholds are fixed; pH and PPM thresholds come from the
// operator-configured targets.
const TEMP_LOW: f64 = 15.0;
const TEMP_MID: f64 = 25.0;
const TEMP_HIGH: f64 = 30.0;

const HIGHLIGHT_CLEAR_DELAY: Duration = Duration::from_millis(1500);

pub struct TelemetryProjector {
    surface: Arc<dyn DashboardSurface>,
    targets: Option<TargetConfig>,
    ph_history: ChartHistory,
    ppm_history: ChartHistory,
}

impl TelemetryProjector {
    pub fn new(surface: Arc<dyn DashboardSurface>) -> Self {
        Self {
            surface,
            targets: None,
            ph_history: ChartHistory::default(),
            ppm_history: ChartHistory::default(),
        }
    }

    /// Last-known target config, if any `/config` snapshot has completed one.
    pub fn targets(&self) -> Option<TargetConfig> {
        self.targets
    }

    pub fn handle_sensors(&mut self, snapshot: Snapshot) {
        let Some(reading) = SensorReading::decode(&snapshot) else {
            return;
        };

        if let Some(temperature) = reading.temperature {
            self.surface.show_temperature(
                &format!("{temperature:.1}"),
                Some(classify(temperature, TEMP_LOW, TEMP_MID, TEMP_HIGH)),
            );
        }
        if let Some(ph) = reading.ph {
            self.surface.show_ph(&format!("{ph:.2}"), self.ph_class(ph));
        }
        if let Some(ppm) = reading.ppm {
            self.surface.show_ppm(&ppm.to_string(), self.ppm_class(ppm));
        }
        if let Some(ok) = reading.water_level_ok() {
            self.surface.show_water_level(ok);
        }

        self.surface
            .show_last_updated(&Local::now().format("%Y-%m-%d %H:%M:%S").to_string());
        self.flash_readings();

        if let (Some(ph), Some(ppm)) = (reading.ph, reading.ppm) {
            self.record_history(ph, ppm);
        }
    }

    pub fn handle_pumps(&mut self, snapshot: Snapshot) {
        let Some(states) = decode_pump_states(&snapshot) else {
            return;
        };
        for (pump, on) in states {
            self.surface.show_pump(pump, on);
        }
    }

    pub fn handle_config(&mut self, snapshot: Snapshot) {
        let Some(patch) = TargetPatch::decode(&snapshot) else {
            return;
        };

        if let Some(value) = patch.ph_min {
            self.surface
                .show_target_field(TargetField::PhMin, &value.to_string());
        }
        if let Some(value) = patch.ph_limit {
            self.surface
                .show_target_field(TargetField::PhLimit, &value.to_string());
        }
        if let Some(value) = patch.ppm_min {
            self.surface
                .show_target_field(TargetField::PpmMin, &value.to_string());
        }
        if let Some(value) = patch.ppm_limit {
            self.surface
                .show_target_field(TargetField::PpmLimit, &value.to_string());
        }
        if let Some(value) = patch.scan_interval {
            self.surface
                .show_target_field(TargetField::ScanInterval, &value.to_string());
        }

        self.targets = patch.apply(self.targets);
    }

    pub fn handle_logs(&mut self, snapshot: Snapshot) {
        let Some(entries) = decode_log_entries(&snapshot) else {
            return;
        };
        self.surface.show_logs(&entries);
    }

    fn ph_class(&self, ph: f64) -> Option<ValueClass> {
        self.targets
            .map(|t| classify(ph, t.ph_min, (t.ph_min + t.ph_limit) / 2.0, t.ph_limit))
    }

    fn ppm_class(&self, ppm: i64) -> Option<ValueClass> {
        self.targets.map(|t| {
            classify(
                ppm as f64,
                t.ppm_min as f64,
                (t.ppm_min + t.ppm_limit) as f64 / 2.0,
                t.ppm_limit as f64,
            )
        })
    }

    fn flash_readings(&self) {
        self.surface.set_reading_highlight(true);
        let surface = Arc::clone(&self.surface);
        tokio::spawn(async move {
            tokio::time::sleep(HIGHLIGHT_CLEAR_DELAY).await;
            surface.set_reading_highlight(false);
        });
    }

    fn record_history(&mut self, ph: f64, ppm: i64) {
        let Some(targets) = self.targets else {
            debug!("skipping history point, no target config observed yet");
            return;
        };
        if !ph.is_finite() {
            return;
        }

        let label = Local::now().format("%H:%M:%S").to_string();
        self.ph_history.record(label.clone(), ph, targets.ph_limit);
        self.ppm_history
            .record(label, ppm as f64, targets.ppm_limit as f64);

        self.surface.redraw_chart(
            ChartId::Ph,
            &self.ph_history.labels(),
            &self.ph_history.readings(),
            &self.ph_history.target(),
        );
        self.surface.redraw_chart(
            ChartId::Ppm,
            &self.ppm_history.labels(),
            &self.ppm_history.readings(),
            &self.ppm_history.target(),
        );
    }
}

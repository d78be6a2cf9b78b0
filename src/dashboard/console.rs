//! Terminal rendering of the display regions, used by the demo binary.
//! Each setter prints one line; there is no screen state to keep.

use chrono::Local;

use crate::models::{LogEntry, PumpId, TargetField};
use crate::telemetry::ValueClass;

use super::{ChartId, DashboardSurface};

pub struct ConsoleSurface;

impl ConsoleSurface {
    fn reading(&self, name: &str, text: &str, unit: &str, class: Option<ValueClass>) {
        println!("  {name:<12} {text} {unit}{}", class_tag(class));
    }
}

fn class_tag(class: Option<ValueClass>) -> &'static str {
    match class {
        Some(ValueClass::Normal) => "  [normal]",
        Some(ValueClass::Warning) => "  [warning]",
        Some(ValueClass::Danger) => "  [danger]",
        None => "",
    }
}

fn field_name(field: TargetField) -> &'static str {
    match field {
        TargetField::PhMin => "ph_min",
        TargetField::PhLimit => "ph_limit",
        TargetField::PpmMin => "ppm_min",
        TargetField::PpmLimit => "ppm_limit",
        TargetField::ScanInterval => "scan_interval",
    }
}

impl DashboardSurface for ConsoleSurface {
    fn show_temperature(&self, text: &str, class: Option<ValueClass>) {
        self.reading("temperature", text, "°C", class);
    }

    fn show_ph(&self, text: &str, class: Option<ValueClass>) {
        self.reading("pH", text, "", class);
    }

    fn show_ppm(&self, text: &str, class: Option<ValueClass>) {
        self.reading("nutrients", text, "ppm", class);
    }

    fn show_water_level(&self, ok: bool) {
        self.reading(
            "water level",
            if ok { "OK" } else { "LOW" },
            "",
            Some(if ok {
                ValueClass::Normal
            } else {
                ValueClass::Danger
            }),
        );
    }

    fn show_last_updated(&self, text: &str) {
        println!("  updated      {text}");
    }

    fn set_reading_highlight(&self, _on: bool) {
        // Nothing to flash on a line-oriented terminal.
    }

    fn show_pump(&self, pump: PumpId, on: bool) {
        println!(
            "  {:<12} {}",
            pump.label(),
            if on { "ON" } else { "OFF" }
        );
    }

    fn show_target_field(&self, field: TargetField, text: &str) {
        println!("  {:<13} -> {text}", field_name(field));
    }

    fn redraw_chart(&self, chart: ChartId, labels: &[String], readings: &[f64], target: &[f64]) {
        let name = match chart {
            ChartId::Ph => "pH",
            ChartId::Ppm => "PPM",
        };
        let latest = readings.last().copied().unwrap_or_default();
        let line = target.last().copied().unwrap_or_default();
        let at = labels.last().map(String::as_str).unwrap_or("-");
        println!(
            "  {name} chart     {} pts, latest {latest} @ {at} (target {line})",
            readings.len()
        );
    }

    fn show_logs(&self, entries: &[LogEntry]) {
        println!("  log          {} entries", entries.len());
        for entry in entries.iter().take(3) {
            println!(
                "    {}  {}",
                entry.at.with_timezone(&Local).format("%H:%M:%S"),
                entry.message
            );
        }
    }

    fn show_notice(&self, message: &str) {
        println!("** {message}");
    }

    fn show_error(&self, message: &str) {
        println!("!! {message}");
    }
}

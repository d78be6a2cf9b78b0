//! Presentation port: the named display regions the projector writes to.
//!
//! Page composition is someone else's problem; the projector only assumes
//! these regions exist. An implementation with nowhere to render a region
//! drops the call silently, so no setter can fail.

use crate::models::{LogEntry, PumpId, TargetField};
use crate::telemetry::ValueClass;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartId {
    Ph,
    Ppm,
}

pub trait DashboardSurface: Send + Sync {
    /// `class` is `None` when thresholds are not yet known; the previous
    /// styling is left untouched in that case.
    fn show_temperature(&self, text: &str, class: Option<ValueClass>);
    fn show_ph(&self, text: &str, class: Option<ValueClass>);
    fn show_ppm(&self, text: &str, class: Option<ValueClass>);
    fn show_water_level(&self, ok: bool);
    fn show_last_updated(&self, text: &str);

    /// Transient update flash on the reading regions. Asserting an
    /// already-set highlight or clearing an already-cleared one is a no-op.
    fn set_reading_highlight(&self, on: bool);

    fn show_pump(&self, pump: PumpId, on: bool);

    /// Updates both the editable input and the read-only current-value
    /// display for one target field.
    fn show_target_field(&self, field: TargetField, text: &str);

    fn redraw_chart(&self, chart: ChartId, labels: &[String], readings: &[f64], target: &[f64]);

    /// Full logs table, newest-first.
    fn show_logs(&self, entries: &[LogEntry]);

    /// Operator-visible alerts from the command path.
    fn show_notice(&self, message: &str);
    fn show_error(&self, message: &str);
}

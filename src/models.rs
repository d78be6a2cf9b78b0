//! Domain types shared across the store, projector, and dispatcher,
//! plus the tolerant decoding of store snapshots.
//!
//! Snapshot decoding is field-wise on purpose: a path may carry a partial
//! document, and an absent field means "leave that widget alone," never an
//! error.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Full current value at a subscribed path, or `None` while the path holds
/// no data (e.g. on first connect before any writer has initialized it).
pub type Snapshot = Option<Value>;

/// Fields merged into a path by a single atomic update.
pub type FieldMap = serde_json::Map<String, Value>;

/// Store paths the dashboard subscribes to or writes.
pub mod paths {
    pub const SENSORS: &str = "/sensors";
    pub const PUMPS: &str = "/pumps";
    pub const CONFIG: &str = "/config";
    pub const LOGS: &str = "/logs";
}

/// How many log entries the logs view tails, newest kept.
pub const LOG_TAIL_LIMIT: usize = 30;

/// Write-only flag telling the autonomous controller to stop actuating the
/// water pump on its own.
pub const MANUAL_CONTROL_FIELD: &str = "water_pump_manual_control";

/// One decoded `/sensors` snapshot. Every field is optional; the projector
/// only touches widgets whose field is present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SensorReading {
    pub temperature: Option<f64>,
    pub ph: Option<f64>,
    pub ppm: Option<i64>,
    pub water_level: Option<String>,
}

impl SensorReading {
    /// Returns `None` for a null or non-document payload.
    pub fn decode(snapshot: &Snapshot) -> Option<Self> {
        let doc = snapshot.as_ref()?.as_object()?;
        Some(Self {
            temperature: doc.get("temperature").and_then(Value::as_f64),
            ph: doc.get("pH").and_then(Value::as_f64),
            ppm: doc.get("PPM").and_then(Value::as_i64),
            water_level: doc
                .get("waterLevel")
                .and_then(Value::as_str)
                .map(str::to_owned),
        })
    }

    /// Water level is stored as a string; anything other than `"HIGH"`
    /// counts as low.
    pub fn water_level_ok(&self) -> Option<bool> {
        self.water_level.as_deref().map(|level| level == "HIGH")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PumpId {
    WaterPump,
    SolutionA,
    SolutionB,
    SolutionC,
    SolutionD,
}

impl PumpId {
    pub const ALL: [PumpId; 5] = [
        PumpId::WaterPump,
        PumpId::SolutionA,
        PumpId::SolutionB,
        PumpId::SolutionC,
        PumpId::SolutionD,
    ];

    /// Store field carrying this pump's on/off state.
    pub fn field(self) -> &'static str {
        match self {
            PumpId::WaterPump => "water_pump",
            PumpId::SolutionA => "pump_a",
            PumpId::SolutionB => "pump_b",
            PumpId::SolutionC => "pump_c",
            PumpId::SolutionD => "pump_d",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PumpId::WaterPump => "Water pump",
            PumpId::SolutionA => "Solution A",
            PumpId::SolutionB => "Solution B",
            PumpId::SolutionC => "Solution C",
            PumpId::SolutionD => "Solution D",
        }
    }
}

/// Pump states present in a `/pumps` snapshot, in declaration order.
/// Absent pumps are simply not listed; there is no implicit OFF.
pub fn decode_pump_states(snapshot: &Snapshot) -> Option<Vec<(PumpId, bool)>> {
    let doc = snapshot.as_ref()?.as_object()?;
    Some(
        PumpId::ALL
            .into_iter()
            .filter_map(|pump| {
                doc.get(pump.field())
                    .and_then(Value::as_bool)
                    .map(|on| (pump, on))
            })
            .collect(),
    )
}

/// Operator-configured setpoints. Field names double as the store's field
/// names on the `/config` path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetConfig {
    pub ph_min: f64,
    pub ph_limit: f64,
    pub ppm_min: i64,
    pub ppm_limit: i64,
    pub scan_interval: i64,
}

/// The five editable regions of the target form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetField {
    PhMin,
    PhLimit,
    PpmMin,
    PpmLimit,
    ScanInterval,
}

/// Fields present in one `/config` snapshot. Partial payloads are merged
/// onto whatever config was known before.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TargetPatch {
    pub ph_min: Option<f64>,
    pub ph_limit: Option<f64>,
    pub ppm_min: Option<i64>,
    pub ppm_limit: Option<i64>,
    pub scan_interval: Option<i64>,
}

impl TargetPatch {
    pub fn decode(snapshot: &Snapshot) -> Option<Self> {
        let doc = snapshot.as_ref()?.as_object()?;
        Some(Self {
            ph_min: doc.get("ph_min").and_then(Value::as_f64),
            ph_limit: doc.get("ph_limit").and_then(Value::as_f64),
            ppm_min: doc.get("ppm_min").and_then(Value::as_i64),
            ppm_limit: doc.get("ppm_limit").and_then(Value::as_i64),
            scan_interval: doc.get("scan_interval").and_then(Value::as_i64),
        })
    }

    /// Merge this patch onto the last-known config. Until every field has
    /// been seen at least once there is no usable config, so `None` stays
    /// `None` for incomplete patches.
    pub fn apply(&self, base: Option<TargetConfig>) -> Option<TargetConfig> {
        match base {
            Some(config) => Some(TargetConfig {
                ph_min: self.ph_min.unwrap_or(config.ph_min),
                ph_limit: self.ph_limit.unwrap_or(config.ph_limit),
                ppm_min: self.ppm_min.unwrap_or(config.ppm_min),
                ppm_limit: self.ppm_limit.unwrap_or(config.ppm_limit),
                scan_interval: self.scan_interval.unwrap_or(config.scan_interval),
            }),
            None => Some(TargetConfig {
                ph_min: self.ph_min?,
                ph_limit: self.ph_limit?,
                ppm_min: self.ppm_min?,
                ppm_limit: self.ppm_limit?,
                scan_interval: self.scan_interval?,
            }),
        }
    }
}

/// One row of the logs view.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub at: DateTime<Utc>,
    pub message: String,
}

/// Decode a `/logs` snapshot (key = millisecond timestamp string, value =
/// `{message}`) into rows sorted newest-first. Entries with malformed keys
/// or missing messages are skipped. `None` for an absent payload.
pub fn decode_log_entries(snapshot: &Snapshot) -> Option<Vec<LogEntry>> {
    let doc = snapshot.as_ref()?.as_object()?;
    let mut keyed: Vec<(i64, LogEntry)> = doc
        .iter()
        .filter_map(|(key, value)| {
            let millis: i64 = key.parse().ok()?;
            let at = Utc.timestamp_millis_opt(millis).single()?;
            let message = value.get("message")?.as_str()?.to_owned();
            Some((millis, LogEntry { at, message }))
        })
        .collect();
    keyed.sort_by_key(|(millis, _)| std::cmp::Reverse(*millis));
    Some(keyed.into_iter().map(|(_, entry)| entry).collect())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn sensor_decode_keeps_absent_fields_absent() {
        let reading = SensorReading::decode(&Some(json!({"temperature": 22.0}))).unwrap();
        assert_eq!(reading.temperature, Some(22.0));
        assert_eq!(reading.ph, None);
        assert_eq!(reading.ppm, None);
        assert_eq!(reading.water_level, None);
    }

    #[test]
    fn sensor_decode_rejects_null_payload() {
        assert_eq!(SensorReading::decode(&None), None);
        assert_eq!(SensorReading::decode(&Some(Value::Null)), None);
    }

    #[test]
    fn water_level_is_a_string_comparison() {
        let high = SensorReading::decode(&Some(json!({"waterLevel": "HIGH"}))).unwrap();
        assert_eq!(high.water_level_ok(), Some(true));
        let low = SensorReading::decode(&Some(json!({"waterLevel": "LOW"}))).unwrap();
        assert_eq!(low.water_level_ok(), Some(false));
    }

    #[test]
    fn pump_decode_lists_only_present_pumps() {
        let states =
            decode_pump_states(&Some(json!({"pump_a": true, "water_pump": false}))).unwrap();
        assert_eq!(
            states,
            vec![(PumpId::WaterPump, false), (PumpId::SolutionA, true)]
        );
    }

    #[test]
    fn partial_patch_needs_a_base_config() {
        let patch = TargetPatch::decode(&Some(json!({"ph_limit": 7.0}))).unwrap();
        assert_eq!(patch.apply(None), None);

        let base = TargetConfig {
            ph_min: 5.5,
            ph_limit: 6.8,
            ppm_min: 560,
            ppm_limit: 840,
            scan_interval: 5,
        };
        let merged = patch.apply(Some(base)).unwrap();
        assert_eq!(merged.ph_limit, 7.0);
        assert_eq!(merged.ph_min, 5.5);
        assert_eq!(merged.ppm_limit, 840);
    }

    #[test]
    fn log_entries_sort_newest_first() {
        let entries = decode_log_entries(&Some(json!({
            "1700000000000": {"message": "older"},
            "1700000005000": {"message": "newer"},
            "garbage": {"message": "dropped"},
            "1700000001000": {},
        })))
        .unwrap();
        let messages: Vec<&str> = entries.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["newer", "older"]);
    }
}

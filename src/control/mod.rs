//! Operator command path: form submissions become store writes.
//!
//! Writes are fire-and-forget and never retried here; the projector picks
//! up the resulting change notification, so this module never touches the
//! display beyond the alert regions.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use log::error;
use serde_json::Value;

use crate::dashboard::DashboardSurface;
use crate::models::{paths, FieldMap, PumpId, TargetConfig, MANUAL_CONTROL_FIELD};
use crate::store::StateStore;

/// Raw operator input from the target form, as submitted.
#[derive(Debug, Clone, Default)]
pub struct TargetForm {
    pub ph_min: String,
    pub ph_limit: String,
    pub ppm_min: String,
    pub ppm_limit: String,
    pub scan_interval: String,
}

impl TargetForm {
    fn parse(&self) -> Result<TargetConfig> {
        Ok(TargetConfig {
            ph_min: self
                .ph_min
                .trim()
                .parse()
                .context("pH minimum is not a number")?,
            ph_limit: self
                .ph_limit
                .trim()
                .parse()
                .context("pH limit is not a number")?,
            ppm_min: self
                .ppm_min
                .trim()
                .parse()
                .context("PPM minimum is not a whole number")?,
            ppm_limit: self
                .ppm_limit
                .trim()
                .parse()
                .context("PPM limit is not a whole number")?,
            scan_interval: self
                .scan_interval
                .trim()
                .parse()
                .context("scan interval is not a whole number")?,
        })
    }
}

fn validate(targets: TargetConfig) -> Result<TargetConfig> {
    if targets.ph_min >= targets.ph_limit {
        bail!("pH minimum must be below the pH limit");
    }
    if targets.ppm_min >= targets.ppm_limit {
        bail!("PPM minimum must be below the PPM limit");
    }
    if targets.scan_interval <= 0 {
        bail!("scan interval must be positive");
    }
    Ok(targets)
}

pub struct CommandDispatcher<S> {
    store: Arc<S>,
    surface: Arc<dyn DashboardSurface>,
}

impl<S: StateStore> CommandDispatcher<S> {
    pub fn new(store: Arc<S>, surface: Arc<dyn DashboardSurface>) -> Self {
        Self { store, surface }
    }

    /// Parse and validate the five target fields, then write them as one
    /// atomic update to `/config`. On any failure the remote state is left
    /// untouched and the operator sees an error.
    pub async fn submit_targets(&self, form: &TargetForm) -> Result<()> {
        let targets = match form.parse().and_then(validate) {
            Ok(targets) => targets,
            Err(err) => {
                self.surface.show_error(&format!("Invalid target values: {err}"));
                return Err(err);
            }
        };

        let fields = match serde_json::to_value(targets)? {
            Value::Object(fields) => fields,
            other => bail!("unexpected target encoding: {other}"),
        };

        match self.store.update(paths::CONFIG, fields).await {
            Ok(()) => {
                self.surface.show_notice("Target values updated successfully!");
                Ok(())
            }
            Err(err) => {
                error!("target update failed: {err:#}");
                self.surface
                    .show_error("Error updating target values. Please try again.");
                Err(err)
            }
        }
    }

    /// Write one pump's desired state. The water pump also raises the
    /// manual-override flag in the same update so the autonomous controller
    /// defers to the operator. The displayed status changes only when the
    /// store notifies, never here.
    pub async fn toggle_pump(&self, pump: PumpId, on: bool) -> Result<()> {
        let mut fields = FieldMap::new();
        fields.insert(pump.field().to_owned(), Value::Bool(on));
        if pump == PumpId::WaterPump {
            fields.insert(MANUAL_CONTROL_FIELD.to_owned(), Value::Bool(true));
        }

        match self.store.update(paths::PUMPS, fields).await {
            Ok(()) => Ok(()),
            Err(err) => {
                error!("pump command failed for {}: {err:#}", pump.label());
                self.surface
                    .show_error("Error controlling pump. Please try again.");
                Err(err)
            }
        }
    }
}

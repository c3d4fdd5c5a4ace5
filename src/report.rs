//! Plain-text summary of inputs and remote call outcomes.

use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::gateway::Action;
use crate::gateway::types::{BreakdownResponse, ScheduleResponse, SimulateResponse};
use crate::profile::{ProfileKind, ProfileSnapshot};
use crate::task::{AsyncTask, TaskPhase, TaskState};

/// Headline figures of the operator's inputs.
#[derive(Debug, Clone)]
pub struct InputSummary<'a> {
    snapshot: &'a ProfileSnapshot,
}

impl<'a> InputSummary<'a> {
    pub fn new(snapshot: &'a ProfileSnapshot) -> Self {
        Self { snapshot }
    }
}

impl fmt::Display for InputSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = &self.snapshot.battery;
        writeln!(f, "--- Inputs ---")?;
        writeln!(f, "Capacity:     {} kWh", b.capacity_kwh)?;
        writeln!(f, "Max power:    {} kW", b.max_kw)?;
        writeln!(f, "Initial SoC:  {:.0}%", b.soc_initial * 100.0)?;
        for kind in ProfileKind::ALL {
            let s = self.snapshot.series(kind);
            let (min, max) = s
                .values()
                .iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                    (lo.min(v), hi.max(v))
                });
            write!(f, "{:<14}{} samples, {min:.2}..{max:.2}", format!("{kind}:"), s.len())?;
            if !s.is_full_day() {
                write!(f, " (not 24 hours)")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Outcome of one action as shown to the operator.
#[derive(Debug, Clone)]
pub struct ActionReport {
    action: Action,
    phase: TaskPhase,
    state: TaskState<Value>,
}

impl ActionReport {
    pub fn new(action: Action, phase: TaskPhase, state: TaskState<Value>) -> Self {
        Self {
            action,
            phase,
            state,
        }
    }

    /// Captures the current state of `task`.
    pub fn from_task(action: Action, task: &AsyncTask<Value>) -> Self {
        Self::new(action, task.phase(), task.state())
    }

    fn title(&self) -> &'static str {
        match self.action {
            Action::Simulate => "Dispatch",
            Action::OptimizeSchedule => "Optimal Schedule",
            Action::Breakdown => "Component Contribution",
        }
    }

    fn write_result(&self, f: &mut fmt::Formatter<'_>, data: &Value) -> fmt::Result {
        match self.action {
            Action::Simulate => with_shape(f, data, |f, r: SimulateResponse| {
                let peak_soc = r.dispatch.iter().map(|d| d.soc).fold(f64::NAN, f64::max);
                writeln!(f, "Hours:        {}", r.dispatch.len())?;
                if !peak_soc.is_nan() {
                    writeln!(f, "Peak SoC:     {peak_soc:.3}")?;
                }
                writeln!(f, "Cost:         {}", r.energy_balance_cost)?;
                writeln!(f, "Unmet:        {} kWh", r.unmet_load_kwh)?;
                writeln!(f, "Curtail:      {} kWh", r.curtailment_kwh)
            }),
            Action::OptimizeSchedule => with_shape(f, data, |f, r: ScheduleResponse| {
                let charge: f64 = r.plan.iter().map(|p| p.amount.max(0.0)).sum();
                let discharge: f64 = r.plan.iter().map(|p| (-p.amount).max(0.0)).sum();
                writeln!(f, "Hours:        {}", r.plan.len())?;
                writeln!(f, "Charge:       {charge:.2}")?;
                writeln!(f, "Discharge:    {discharge:.2}")
            }),
            Action::Breakdown => with_shape(f, data, |f, r: BreakdownResponse| {
                let c = r.contribution;
                writeln!(f, "Solar:        {} kWh", c.solar_kwh)?;
                writeln!(f, "Wind:         {} kWh", c.wind_kwh)?;
                writeln!(f, "Battery:      {} kWh", c.battery_kwh)?;
                writeln!(f, "Grid:         {} kWh", c.grid_kwh)
            }),
        }
    }
}

/// Decodes `data` as `T` and renders it, or notes the shape mismatch.
fn with_shape<T: DeserializeOwned>(
    f: &mut fmt::Formatter<'_>,
    data: &Value,
    render: impl FnOnce(&mut fmt::Formatter<'_>, T) -> fmt::Result,
) -> fmt::Result {
    match serde_json::from_value::<T>(data.clone()) {
        Ok(r) => render(f, r),
        Err(e) => writeln!(f, "Unexpected result shape: {e}"),
    }
}

impl fmt::Display for ActionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- {} ({}) ---", self.title(), self.phase)?;
        if let Some(err) = &self.state.error {
            writeln!(f, "Error:        {err}")?;
        }
        match &self.state.data {
            Some(data) => self.write_result(f, data),
            None if self.phase == TaskPhase::Idle => writeln!(f, "Not run."),
            None => Ok(()),
        }
    }
}

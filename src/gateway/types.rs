//! Request and response shapes of the remote functions.
//!
//! Field names follow what the remote functions expect on the wire, which
//! mixes snake case with unit suffixes (`capacity_kWh`, `unmet_load_kWh`).

use serde::{Deserialize, Serialize};

use crate::battery::{self, BatteryPayload};
use crate::profile::{ProfileSnapshot, TimeSeries};

/// Body of a `der_microgrid_sim` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulateRequest {
    pub load: TimeSeries,
    pub solar: TimeSeries,
    pub wind: TimeSeries,
    /// Stored battery values, unmodified.
    pub battery: BatteryPayload,
    pub prices: TimeSeries,
}

impl SimulateRequest {
    /// Captures the simulation request from `snapshot`.
    pub fn from_snapshot(snapshot: &ProfileSnapshot) -> Self {
        Self {
            load: snapshot.load.clone(),
            solar: snapshot.solar.clone(),
            wind: snapshot.wind.clone(),
            battery: battery::for_simulation(&snapshot.battery),
            prices: snapshot.prices.clone(),
        }
    }
}

/// Body of a `der_schedule_opt` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleRequest {
    pub load: TimeSeries,
    pub prices: TimeSeries,
    /// Derated battery, see [`battery::for_schedule`].
    pub battery: BatteryPayload,
}

impl ScheduleRequest {
    /// Captures the schedule request from `snapshot`.
    pub fn from_snapshot(snapshot: &ProfileSnapshot) -> Self {
        Self {
            load: snapshot.load.clone(),
            prices: snapshot.prices.clone(),
            battery: battery::for_schedule(&snapshot.battery),
        }
    }
}

/// Body of a `der_component_contrib` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakdownRequest {
    pub load: TimeSeries,
    pub solar: TimeSeries,
    pub wind: TimeSeries,
    /// Derated battery, see [`battery::for_breakdown`].
    pub battery: BatteryPayload,
}

impl BreakdownRequest {
    /// Captures the breakdown request from `snapshot`.
    pub fn from_snapshot(snapshot: &ProfileSnapshot) -> Self {
        Self {
            load: snapshot.load.clone(),
            solar: snapshot.solar.clone(),
            wind: snapshot.wind.clone(),
            battery: battery::for_breakdown(&snapshot.battery),
        }
    }
}

/// One hour of simulated battery dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchPoint {
    pub t: f64,
    pub soc: f64,
    pub charge: f64,
    pub discharge: f64,
}

/// Result of `der_microgrid_sim`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulateResponse {
    pub dispatch: Vec<DispatchPoint>,
    pub energy_balance_cost: f64,
    #[serde(rename = "unmet_load_kWh")]
    pub unmet_load_kwh: f64,
    #[serde(rename = "curtailment_kWh")]
    pub curtailment_kwh: f64,
}

/// One hour of the optimized battery schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanPoint {
    pub t: f64,
    pub amount: f64,
}

/// Result of `der_schedule_opt`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleResponse {
    pub plan: Vec<PlanPoint>,
}

/// Energy supplied per source over the day (kWh).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    #[serde(rename = "solar_kWh")]
    pub solar_kwh: f64,
    #[serde(rename = "wind_kWh")]
    pub wind_kwh: f64,
    #[serde(rename = "battery_kWh")]
    pub battery_kwh: f64,
    #[serde(rename = "grid_kWh")]
    pub grid_kwh: f64,
}

/// Result of `der_component_contrib`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownResponse {
    pub contribution: Contribution,
}

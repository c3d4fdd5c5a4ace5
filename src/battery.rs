use serde::{Deserialize, Serialize};
use tracing::warn;

/// Capacity removed from the stored value for schedule and breakdown calls (kWh).
pub const DERIVED_CAPACITY_OFFSET_KWH: f64 = 50.0;
/// Power removed from the stored value for schedule and breakdown calls (kW).
pub const DERIVED_POWER_OFFSET_KW: f64 = 15.0;
/// Initial state of charge sent with schedule and breakdown calls.
pub const DERIVED_SOC_INITIAL: f64 = 0.4;

/// Operator-editable battery scalars.
///
/// No range is enforced here; values flow to the remote calls unchanged
/// (or through the fixed offsets of the derived payloads).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatteryParams {
    /// Usable energy capacity (kWh).
    pub capacity_kwh: f64,
    /// Initial state of charge, expected in `[0, 1]`.
    pub soc_initial: f64,
    /// Maximum charge/discharge power (kW).
    pub max_kw: f64,
}

impl Default for BatteryParams {
    fn default() -> Self {
        Self {
            capacity_kwh: 200.0,
            soc_initial: 0.5,
            max_kw: 75.0,
        }
    }
}

/// Battery object as the remote functions expect it on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatteryPayload {
    /// Capacity (kWh).
    #[serde(rename = "capacity_kWh")]
    pub capacity_kwh: f64,
    /// Initial state of charge.
    #[serde(rename = "soc0")]
    pub soc_initial: f64,
    /// Maximum power (kW).
    #[serde(rename = "maxKW")]
    pub max_kw: f64,
}

/// Payload for the dispatch simulation: the stored values, unmodified.
pub fn for_simulation(params: &BatteryParams) -> BatteryPayload {
    BatteryPayload {
        capacity_kwh: params.capacity_kwh,
        soc_initial: params.soc_initial,
        max_kw: params.max_kw,
    }
}

/// Payload for schedule optimization.
///
/// Capacity minus 50 kWh, a fixed SoC of 0.4 (the stored SoC is ignored),
/// and max power minus 15 kW. Negative results are passed through.
///
/// # Examples
///
/// ```
/// use der_microgrid::battery::{BatteryParams, for_schedule};
///
/// let p = BatteryParams { capacity_kwh: 200.0, soc_initial: 0.5, max_kw: 75.0 };
/// let b = for_schedule(&p);
/// assert_eq!((b.capacity_kwh, b.soc_initial, b.max_kw), (150.0, 0.4, 60.0));
/// ```
pub fn for_schedule(params: &BatteryParams) -> BatteryPayload {
    derated("schedule", params)
}

/// Payload for the contribution breakdown.
///
/// Same derivation as [`for_schedule`]; kept separate so each action's rule
/// stays visible on its own.
pub fn for_breakdown(params: &BatteryParams) -> BatteryPayload {
    derated("breakdown", params)
}

fn derated(action: &'static str, params: &BatteryParams) -> BatteryPayload {
    let payload = BatteryPayload {
        capacity_kwh: params.capacity_kwh - DERIVED_CAPACITY_OFFSET_KWH,
        soc_initial: DERIVED_SOC_INITIAL,
        max_kw: params.max_kw - DERIVED_POWER_OFFSET_KW,
    };
    if payload.capacity_kwh < 0.0 || payload.max_kw < 0.0 {
        warn!(
            action,
            capacity_kwh = payload.capacity_kwh,
            max_kw = payload.max_kw,
            "derived battery payload is negative; sending unchanged"
        );
    }
    payload
}

//! Immutable profile snapshot and its update function.

use std::f64::consts::PI;
use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::preset::Preset;
use super::series::{TimeSeries, parse_series};
use crate::battery::BatteryParams;

/// Which of the four profiles an edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileKind {
    Load,
    Solar,
    Wind,
    Prices,
}

impl ProfileKind {
    /// All kinds in display order.
    pub const ALL: [ProfileKind; 4] = [Self::Load, Self::Solar, Self::Wind, Self::Prices];

    /// Lowercase name, used by the CLI and config keys.
    pub fn name(self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::Solar => "solar",
            Self::Wind => "wind",
            Self::Prices => "prices",
        }
    }
}

impl fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One operator edit.
///
/// Series edits replace the whole series; there is no per-sample update.
#[derive(Debug, Clone, PartialEq)]
pub enum ProfileEdit {
    /// Replace a series with parsed free-form text.
    SetText { kind: ProfileKind, text: String },
    /// Replace a series with a preset pattern.
    ApplyPreset { kind: ProfileKind, preset: Preset },
    SetCapacity(f64),
    SetSocInitial(f64),
    SetMaxKw(f64),
}

/// Every editable input at one moment: four series plus battery scalars.
///
/// Snapshots are values. [`ProfileSnapshot::apply`] returns a new snapshot,
/// so a request built from one is unaffected by later edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSnapshot {
    pub load: TimeSeries,
    pub solar: TimeSeries,
    pub wind: TimeSeries,
    pub prices: TimeSeries,
    pub battery: BatteryParams,
}

/// `max(0, sin(x / 24 * 2π))`, the half-wave used by the seed curves.
fn half_wave(x: f64) -> f64 {
    (x / 24.0 * PI * 2.0).sin().max(0.0)
}

impl Default for ProfileSnapshot {
    /// Deterministic diurnal seeds: load and price peaking around midnight, midday
    /// solar, and wind strongest from midnight into the morning.
    fn default() -> Self {
        Self {
            load: TimeSeries::from_fn(|i| 60.0 + 15.0 * half_wave(i as f64 - 18.0)),
            solar: TimeSeries::from_fn(|i| 30.0 * half_wave(i as f64 - 6.0)),
            wind: TimeSeries::from_fn(|i| 12.0 + 8.0 * half_wave(i as f64)),
            prices: TimeSeries::from_fn(|i| 0.08 + 0.16 * half_wave(i as f64 - 18.0)),
            battery: BatteryParams::default(),
        }
    }
}

impl ProfileSnapshot {
    /// Series for `kind`.
    pub fn series(&self, kind: ProfileKind) -> &TimeSeries {
        match kind {
            ProfileKind::Load => &self.load,
            ProfileKind::Solar => &self.solar,
            ProfileKind::Wind => &self.wind,
            ProfileKind::Prices => &self.prices,
        }
    }

    /// Returns a copy of this snapshot with `kind` replaced by `series`.
    pub fn with_series(&self, kind: ProfileKind, series: TimeSeries) -> Self {
        let mut next = self.clone();
        match kind {
            ProfileKind::Load => next.load = series,
            ProfileKind::Solar => next.solar = series,
            ProfileKind::Wind => next.wind = series,
            ProfileKind::Prices => next.prices = series,
        }
        next
    }

    /// Applies `edit`, drawing random presets from the thread RNG.
    pub fn apply(&self, edit: ProfileEdit) -> Self {
        self.apply_with(edit, &mut rand::rng())
    }

    /// Applies `edit`, drawing random presets from `rng`.
    pub fn apply_with<R: Rng>(&self, edit: ProfileEdit, rng: &mut R) -> Self {
        match edit {
            ProfileEdit::SetText { kind, text } => self.with_series(kind, parse_series(&text)),
            ProfileEdit::ApplyPreset { kind, preset } => {
                self.with_series(kind, preset.generate_with(rng))
            }
            ProfileEdit::SetCapacity(v) => self.with_battery(|b| b.capacity_kwh = v),
            ProfileEdit::SetSocInitial(v) => self.with_battery(|b| b.soc_initial = v),
            ProfileEdit::SetMaxKw(v) => self.with_battery(|b| b.max_kw = v),
        }
    }

    fn with_battery(&self, f: impl FnOnce(&mut BatteryParams)) -> Self {
        let mut next = self.clone();
        f(&mut next.battery);
        next
    }
}

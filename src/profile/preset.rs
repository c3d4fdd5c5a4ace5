//! Canned 24-sample profile generators.

use rand::Rng;

use super::series::{HOURS, TimeSeries};

/// Sample value of the `flat` preset.
const FLAT_VALUE: f64 = 50.0;
/// Daytime value of the `peak` preset.
const PEAK_HIGH: f64 = 80.0;
/// Off-peak value of the `peak` preset.
const PEAK_LOW: f64 = 30.0;
/// First and last hour (inclusive) of the `peak` preset's high band.
const PEAK_HOURS: std::ops::RangeInclusive<usize> = 8..=18;
/// Upper bound (inclusive) of `random` samples.
const RANDOM_MAX: u32 = 100;

/// A named preset pattern.
///
/// Built from a free-form identifier with [`Preset::from_id`]. Identifiers
/// that name no pattern, including the empty "unselected" id, map to
/// [`Preset::Clear`], which zeroes the series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// Every hour at 50.
    Flat,
    /// 80 during hours 8 through 18, 30 otherwise.
    Peak,
    /// Independent integers in `[0, 100]`.
    Random,
    /// Every hour at 0.
    Clear,
}

impl Preset {
    /// Identifiers with a named pattern.
    pub const IDS: &[&str] = &["flat", "peak", "random"];

    /// Maps an identifier to its preset; anything unknown is [`Preset::Clear`].
    pub fn from_id(id: &str) -> Self {
        match id {
            "flat" => Self::Flat,
            "peak" => Self::Peak,
            "random" => Self::Random,
            _ => Self::Clear,
        }
    }

    /// Identifier of this preset (`""` for [`Preset::Clear`]).
    pub fn id(self) -> &'static str {
        match self {
            Self::Flat => "flat",
            Self::Peak => "peak",
            Self::Random => "random",
            Self::Clear => "",
        }
    }

    /// Generates the series using the thread-local RNG for [`Preset::Random`].
    pub fn generate(self) -> TimeSeries {
        self.generate_with(&mut rand::rng())
    }

    /// Generates the series, drawing random samples from `rng`.
    ///
    /// Always returns exactly 24 samples.
    pub fn generate_with<R: Rng>(self, rng: &mut R) -> TimeSeries {
        match self {
            Self::Flat => TimeSeries::from_fn(|_| FLAT_VALUE),
            Self::Peak => TimeSeries::from_fn(|h| {
                if PEAK_HOURS.contains(&h) {
                    PEAK_HIGH
                } else {
                    PEAK_LOW
                }
            }),
            Self::Random => TimeSeries::from_fn(|_| f64::from(rng.random_range(0..=RANDOM_MAX))),
            Self::Clear => TimeSeries::new(vec![0.0; HOURS]),
        }
    }
}

/// Generates the preset named by `id`; see [`Preset::from_id`].
pub fn preset_series(id: &str) -> TimeSeries {
    Preset::from_id(id).generate()
}

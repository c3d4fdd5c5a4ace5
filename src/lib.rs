//! Client-side state engine for a DER microgrid dashboard.
//!
//! Holds editable 24-hour profiles and battery parameters, derives the
//! per-action battery payloads, and drives the three remote calls
//! (simulation, schedule optimization, contribution breakdown) through
//! independent async task controllers.

/// Per-action battery payload derivation.
pub mod battery;
pub mod cli;
pub mod config;
pub mod dashboard;
/// Remote function gateway and wire types.
pub mod gateway;
pub mod io;
/// Editable time series, presets, and profile snapshots.
pub mod profile;
pub mod report;
pub mod task;
pub mod telemetry;

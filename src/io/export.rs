//! CSV export of remote call results.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use serde_json::Value;
use thiserror::Error;

use crate::gateway::types::{DispatchPoint, PlanPoint, ScheduleResponse, SimulateResponse};

/// Column header for dispatch export.
const DISPATCH_HEADER: &[&str] = &["t", "soc", "charge", "discharge"];
/// Column header for schedule plan export.
const PLAN_HEADER: &[&str] = &["t", "amount"];

/// Failure while exporting a result.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("cannot write \"{path}\": {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("csv write failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("result does not have the expected shape: {0}")]
    Shape(#[from] serde_json::Error),
    #[error("no result to export")]
    Missing,
}

/// Writes dispatch rows as CSV to any writer.
///
/// # Errors
///
/// Returns an `ExportError::Csv` if writing fails.
pub fn write_dispatch_csv(points: &[DispatchPoint], writer: impl Write) -> Result<(), ExportError> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(DISPATCH_HEADER)?;
    for p in points {
        wtr.write_record(&[
            p.t.to_string(),
            format!("{:.4}", p.soc),
            format!("{:.4}", p.charge),
            format!("{:.4}", p.discharge),
        ])?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Writes schedule plan rows as CSV to any writer.
///
/// # Errors
///
/// Returns an `ExportError::Csv` if writing fails.
pub fn write_plan_csv(points: &[PlanPoint], writer: impl Write) -> Result<(), ExportError> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(PLAN_HEADER)?;
    for p in points {
        wtr.write_record(&[p.t.to_string(), format!("{:.4}", p.amount)])?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Decodes a simulation result and exports its dispatch rows to `path`.
///
/// # Errors
///
/// Returns an `ExportError` if there is no result, it lacks a `dispatch`
/// array, or the file cannot be written.
pub fn export_dispatch(result: Option<&Value>, path: &Path) -> Result<(), ExportError> {
    let result = result.ok_or(ExportError::Missing)?;
    let resp: SimulateResponse = serde_json::from_value(result.clone())?;
    write_dispatch_csv(&resp.dispatch, create(path)?)
}

/// Decodes a schedule result and exports its plan rows to `path`.
///
/// # Errors
///
/// Returns an `ExportError` if there is no result, it lacks a `plan`
/// array, or the file cannot be written.
pub fn export_plan(result: Option<&Value>, path: &Path) -> Result<(), ExportError> {
    let result = result.ok_or(ExportError::Missing)?;
    let resp: ScheduleResponse = serde_json::from_value(result.clone())?;
    write_plan_csv(&resp.plan, create(path)?)
}

fn create(path: &Path) -> Result<io::BufWriter<File>, ExportError> {
    File::create(path)
        .map(io::BufWriter::new)
        .map_err(|source| ExportError::Io {
            path: path.display().to_string(),
            source,
        })
}

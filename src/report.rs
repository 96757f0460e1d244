//! CSV report sinks for batch output
//!
//! The engine itself performs no I/O; callers that want the batch summary on
//! disk (rather than handed to a response layer) write it through these
//! sinks. A [`ReportWriter`] appends serializable rows to one CSV file;
//! [`write_summary`] dumps a whole [`BatchSummary`] as three files.

use std::ffi::OsStr;
use std::fs::{create_dir_all, File};
use std::path::Path;

use csv::Writer;
use serde::{Deserialize, Serialize};

use crate::error::EpinetError;
use crate::monte_carlo::BatchSummary;
use crate::network::Node;

/// One bin of the aggregate symptomatic-case curve.
#[derive(Debug, Serialize, Deserialize)]
pub struct CurveRow {
    pub bin_start: f64,
    pub mean: f64,
    pub stdev: f64,
}

/// One node's infection frequency across the batch.
#[derive(Debug, Serialize, Deserialize)]
pub struct NodeRow {
    pub name: String,
    pub infection_fraction: f64,
}

/// One trial's total-infected count.
#[derive(Debug, Serialize, Deserialize)]
pub struct TrialRow {
    pub trial: usize,
    pub total_infected: usize,
}

/// Writes serializable rows to a single CSV report file.
pub struct ReportWriter {
    writer: Writer<File>,
}

impl ReportWriter {
    /// Opens a report file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an `EpinetError` if the path does not end in `.csv` or the
    /// file cannot be created.
    pub fn from_path(path: &Path) -> Result<ReportWriter, EpinetError> {
        let file = generate_validate_filepath(path)?;
        Ok(ReportWriter {
            writer: Writer::from_writer(file),
        })
    }

    /// Write a new row with columns following the items in the row struct.
    ///
    /// # Errors
    ///
    /// Returns an `EpinetError` if serialization or the flush to disk fails.
    pub fn send_row<T: Serialize>(&mut self, row: &T) -> Result<(), EpinetError> {
        self.writer.serialize(row)?;
        self.writer.flush()?;
        Ok(())
    }
}

// Checks that the path is valid. Creates the file and all parent directories
// if they do not exist. Returns the file if successful.
fn generate_validate_filepath(path: &Path) -> Result<File, EpinetError> {
    match path.extension().and_then(OsStr::to_str) {
        Some("csv") => {
            create_dir_all(path.parent().expect("Either root or empty path provided"))?;
            let file = File::create(path)?;
            Ok(file)
        }
        _ => Err(EpinetError::ReportError(
            "Report output files must be CSVs at this time".to_string(),
        )),
    }
}

/// Writes one batch summary under `directory` as `curve.csv`, `nodes.csv`
/// and `trials.csv`.
///
/// `nodes` must be the node set the batch ran over; the summary's
/// per-node fractions are aligned to it.
///
/// # Errors
///
/// Returns an `EpinetError` if any of the three files cannot be written.
pub fn write_summary(
    directory: &Path,
    nodes: &[Node],
    summary: &BatchSummary,
) -> Result<(), EpinetError> {
    let mut curve = ReportWriter::from_path(&directory.join("curve.csv"))?;
    for (bin_idx, &bin_start) in summary.bins.iter().enumerate() {
        curve.send_row(&CurveRow {
            bin_start,
            mean: summary.binwise_mean[bin_idx],
            stdev: summary.binwise_stdev[bin_idx],
        })?;
    }

    let mut node_report = ReportWriter::from_path(&directory.join("nodes.csv"))?;
    for (node, &infection_fraction) in nodes.iter().zip(&summary.node_infection_fraction) {
        node_report.send_row(&NodeRow {
            name: node.name.clone(),
            infection_fraction,
        })?;
    }

    let mut trials = ReportWriter::from_path(&directory.join("trials.csv"))?;
    for (trial, &total_infected) in summary.total_infected.iter().enumerate() {
        trials.send_row(&TrialRow {
            trial,
            total_infected,
        })?;
    }

    Ok(())
}

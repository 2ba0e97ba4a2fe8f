//! Export of simulation results
//!
//! Impulse responses go to CSV (one row per period, variables as columns,
//! 4 decimals) and can be read back; decompositions go to long-format CSV;
//! a JSON summary records the configuration and headline metrics of a run.

use std::fs;
use std::io::{Read, Write};
use std::path::Path;

use serde::Serialize;
use statespace::Trajectory;

use crate::analysis::{ImpulseSummary, PosteriorSummary};
use crate::config::ModelConfig;
use crate::decomposition::{HistoricalDecomposition, VarianceDecomposition};
use crate::simulator::ImpulseResponse;
use crate::{DsgeError, Result, State, Variable, NUM_VARIABLES};

/// Name of the period column, after the 15 variable columns
pub const PERIOD_COLUMN: &str = "period";

fn irf_header() -> Vec<&'static str> {
    Variable::ALL
        .iter()
        .map(|v| v.name())
        .chain(std::iter::once(PERIOD_COLUMN))
        .collect()
}

/// Write an impulse response as CSV
pub fn write_irf_csv<W: Write>(irf: &ImpulseResponse, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    wtr.write_record(irf_header())?;
    for (period, state) in irf.rows() {
        let mut record: Vec<String> = state.iter().map(|v| format!("{v:.4}")).collect();
        record.push(period.to_string());
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn write_irf_csv_path<P: AsRef<Path>>(irf: &ImpulseResponse, path: P) -> Result<()> {
    write_irf_csv(irf, fs::File::create(path)?)
}

/// Read a trajectory written by [`write_irf_csv`]
///
/// The header must list the 15 variables in model order followed by
/// `period`, and periods must run 0, 1, 2, ... without gaps.
pub fn read_irf_csv<R: Read>(reader: R) -> Result<Trajectory<NUM_VARIABLES>> {
    let mut rdr = csv::Reader::from_reader(reader);

    let expected = irf_header();
    let headers = rdr.headers()?;
    if headers.iter().ne(expected.iter().copied()) {
        return Err(DsgeError::MalformedCsv {
            reason: format!("unexpected header: {}", headers.iter().collect::<Vec<_>>().join(",")),
        });
    }

    let mut states = Vec::new();
    for (row, record) in rdr.records().enumerate() {
        let record = record?;
        if record.len() != NUM_VARIABLES + 1 {
            return Err(DsgeError::MalformedCsv {
                reason: format!("row {row} has {} fields", record.len()),
            });
        }

        let mut state: State = [0.0; NUM_VARIABLES];
        for (value, field) in state.iter_mut().zip(record.iter()) {
            *value = field.trim().parse().map_err(|_| DsgeError::MalformedCsv {
                reason: format!("row {row}: '{field}' is not a number"),
            })?;
        }

        let period = &record[NUM_VARIABLES];
        if period.trim().parse::<usize>().ok() != Some(row) {
            return Err(DsgeError::MalformedCsv {
                reason: format!("row {row}: expected period {row}, found '{period}'"),
            });
        }
        states.push(state);
    }

    Ok(Trajectory::from_states(states))
}

pub fn read_irf_csv_path<P: AsRef<Path>>(path: P) -> Result<Trajectory<NUM_VARIABLES>> {
    read_irf_csv(fs::File::open(path)?)
}

/// Write the variance table as `variable,shock,share` rows
pub fn write_variance_csv<W: Write>(table: &VarianceDecomposition, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    wtr.write_record(["variable", "shock", "share"])?;
    for cell in table.long_rows() {
        wtr.write_record(&[
            cell.variable.name().to_string(),
            cell.shock,
            format!("{:.6}", cell.share),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Write the historical decomposition: date, one column per shock, observed output
pub fn write_historical_csv<W: Write>(history: &HistoricalDecomposition, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    let mut header = vec!["date".to_string()];
    header.extend(history.shocks.iter().map(|s| s.key.clone()));
    header.push("observed_output".to_string());
    wtr.write_record(&header)?;

    for (q, date) in history.dates.iter().enumerate() {
        let mut record = vec![date.format("%Y-%m-%d").to_string()];
        record.extend(history.shocks.iter().map(|s| format!("{:.4}", s.values[q])));
        record.push(format!("{:.4}", history.observed_output[q]));
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Summary of one demonstration run, for reproducibility
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub timestamp: String,
    pub config: ModelConfig,
    pub impulse: ImpulseSummary,
    pub variance_horizon: usize,
    pub posterior: Vec<PosteriorSummary>,
}

impl RunSummary {
    pub fn new(
        config: &ModelConfig,
        impulse: ImpulseSummary,
        variance_horizon: usize,
        posterior: Vec<PosteriorSummary>,
    ) -> Self {
        RunSummary {
            timestamp: chrono::Utc::now().to_rfc3339(),
            config: config.clone(),
            impulse,
            variance_horizon,
            posterior,
        }
    }

    pub fn write_summary_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

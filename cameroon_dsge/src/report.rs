//! Plain-text narrative of a shock's transmission
//!
//! Built from the shock definition and its impulse response: what the shock
//! hits on impact, where each charted variable peaks, and how long output
//! stays away from steady state.

use std::fmt;

use serde::Serialize;

use crate::analysis::ImpulseSummary;
use crate::shocks::ShockDefinition;
use crate::simulator::ImpulseResponse;
use crate::Variable;

/// Peak of one variable's response
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeakResponse {
    pub variable: Variable,
    pub period: usize,
    pub value: f64,
}

impl PeakResponse {
    /// Largest absolute deviation; earliest period on ties
    fn of(irf: &ImpulseResponse, variable: Variable) -> Self {
        let (period, value) = irf
            .series(variable)
            .into_iter()
            .enumerate()
            .fold((0, 0.0_f64), |best, (t, v)| {
                if v.abs() > best.1.abs() {
                    (t, v)
                } else {
                    best
                }
            });
        PeakResponse {
            variable,
            period,
            value,
        }
    }

    fn direction(&self) -> &'static str {
        if self.value >= 0.0 {
            "rises"
        } else {
            "falls"
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NarrativeReport {
    pub shock_name: String,
    pub description: String,
    pub amplitude: f64,
    /// Non-zero coordinates of the period-1 state
    pub impact: Vec<(Variable, f64)>,
    /// Peaks of the shock's charted variables
    pub peaks: Vec<PeakResponse>,
    pub summary: ImpulseSummary,
}

impl NarrativeReport {
    pub fn new(shock: &ShockDefinition, irf: &ImpulseResponse) -> Self {
        let impact = irf
            .period(1)
            .map(|state| {
                Variable::ALL
                    .into_iter()
                    .filter(|v| state[v.index()] != 0.0)
                    .map(|v| (v, state[v.index()]))
                    .collect()
            })
            .unwrap_or_default();

        let peaks = shock
            .affected
            .iter()
            .map(|variable| PeakResponse::of(irf, *variable))
            .collect();

        NarrativeReport {
            shock_name: shock.name.clone(),
            description: shock.description.clone(),
            amplitude: irf.amplitude,
            impact,
            peaks,
            summary: ImpulseSummary::from_response(irf),
        }
    }
}

impl fmt::Display for NarrativeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.shock_name)?;
        writeln!(f, "{}", "=".repeat(self.shock_name.len()))?;
        writeln!(f, "{}.", self.description)?;
        writeln!(f)?;

        writeln!(f, "Impact (amplitude {:.2}%):", self.amplitude * 100.0)?;
        for (variable, value) in &self.impact {
            writeln!(f, "  {:<20} {:+.4}", variable.name(), value)?;
        }
        writeln!(f)?;

        writeln!(f, "Transmission:")?;
        for peak in &self.peaks {
            if peak.value == 0.0 {
                writeln!(f, "  {} does not respond.", peak.variable)?;
            } else {
                writeln!(
                    f,
                    "  {} {} to {:+.4} at period {}.",
                    peak.variable,
                    peak.direction(),
                    peak.value,
                    peak.period
                )?;
            }
        }
        writeln!(f)?;

        writeln!(
            f,
            "Output peaks at {:+.4} and stays above 1% of that peak for {} of {} periods.",
            self.summary.output_peak, self.summary.persistence, self.summary.horizon
        )?;
        if let Some(credit) = self.summary.credit_at_period_8 {
            writeln!(f, "Credit stands at {credit:+.4} after two years.")?;
        }
        Ok(())
    }
}

use serde::Serialize;

use crate::posterior::{DistributionFamily, PosteriorDraws};
use crate::simulator::ImpulseResponse;
use crate::Variable;

/// Period at which the credit response is reported
pub const CREDIT_REPORT_PERIOD: usize = 8;

/// Share of the peak below which a response counts as dissipated
pub const PERSISTENCE_THRESHOLD: f64 = 0.01;

/// Compute mean of a series
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Compute (population) standard deviation of a series
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = mean(values);
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Percentile `q` in [0, 100] with linear interpolation between order statistics
///
/// NaN values are ignored. Returns 0 for an empty series.
pub fn percentile(values: &[f64], q: f64) -> f64 {
    let mut sorted: Vec<f64> = values.iter().filter(|x| !x.is_nan()).copied().collect();
    if sorted.is_empty() {
        return 0.0;
    }
    sorted.sort_by(|a, b| a.total_cmp(b));

    let rank = (q.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let weight = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * weight
}

/// Largest move in either direction, keeping its sign
///
/// The maximum wins unless the minimum is strictly larger in magnitude.
pub fn signed_peak(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    if max > min.abs() {
        max
    } else {
        min
    }
}

/// Number of periods where `|value| > threshold * |peak|`
pub fn persistence_count(values: &[f64], threshold: f64) -> usize {
    let cutoff = threshold * signed_peak(values).abs();
    values.iter().filter(|v| v.abs() > cutoff).count()
}

/// Headline metrics of one impulse response
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImpulseSummary {
    pub shock: String,
    pub amplitude: f64,
    pub horizon: usize,
    pub output_peak: f64,
    pub inflation_peak: f64,
    /// `None` when the horizon stops before the reporting period
    pub credit_at_period_8: Option<f64>,
    /// Periods in which output stays above 1% of its peak
    pub persistence: usize,
    /// Largest absolute deviation of any variable in any period
    pub max_deviation: f64,
}

impl ImpulseSummary {
    pub fn from_response(irf: &ImpulseResponse) -> Self {
        let output = irf.series(Variable::Output);

        ImpulseSummary {
            shock: irf.shock.clone(),
            amplitude: irf.amplitude,
            horizon: irf.horizon(),
            output_peak: signed_peak(&output),
            inflation_peak: signed_peak(&irf.series(Variable::Inflation)),
            credit_at_period_8: irf.value(CREDIT_REPORT_PERIOD, Variable::Credit),
            persistence: persistence_count(&output, PERSISTENCE_THRESHOLD),
            max_deviation: irf.trajectory().max_abs(),
        }
    }

    /// Print summary
    pub fn print_summary(&self) {
        println!(
            "Impulse response: {} (amplitude {}, {} periods)",
            self.shock, self.amplitude, self.horizon
        );
        println!("  Output peak: {:.4}", self.output_peak);
        println!("  Inflation peak: {:.4}", self.inflation_peak);
        match self.credit_at_period_8 {
            Some(credit) => println!("  Credit (t={}): {:.4}", CREDIT_REPORT_PERIOD, credit),
            None => println!("  Credit (t={}): n/a", CREDIT_REPORT_PERIOD),
        }
        println!("  Persistence: {} periods", self.persistence);
        println!("  Largest deviation: {:.4}", self.max_deviation);
    }
}

/// Moments and 90% interval of one parameter's draws
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PosteriorSummary {
    pub name: String,
    pub description: String,
    pub family: DistributionFamily,
    pub mean: f64,
    pub std: f64,
    pub p5: f64,
    pub p95: f64,
}

impl PosteriorSummary {
    pub fn from_draws(draws: &PosteriorDraws) -> Self {
        PosteriorSummary {
            name: draws.name.clone(),
            description: draws.description.clone(),
            family: draws.family,
            mean: mean(&draws.samples),
            std: std_dev(&draws.samples),
            p5: percentile(&draws.samples, 5.0),
            p95: percentile(&draws.samples, 95.0),
        }
    }
}

/// Print the posterior table, one row per parameter
pub fn print_posterior_table(summaries: &[PosteriorSummary]) {
    println!(
        "{:<10} {:>8} {:>8} {:>8} {:>8}  {}",
        "Parameter", "Mean", "Std", "5%", "95%", "Description"
    );
    for s in summaries {
        println!(
            "{:<10} {:>8.4} {:>8.4} {:>8.4} {:>8.4}  {}",
            s.name, s.mean, s.std, s.p5, s.p95, s.description
        );
    }
}

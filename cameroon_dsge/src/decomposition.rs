//! Illustrative variance and historical decompositions
//!
//! Neither table is derived from the transition matrix or the impulse
//! responses. The variance shares are calibrated priors perturbed by seeded
//! noise; the historical contributions replay each shock's scripted
//! [`HistoricalPattern`]. Both are deterministic for a given generator state.

use chrono::{Datelike, NaiveDate};
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::Serialize;
use tracing::debug;

use crate::shocks::{HistoricalPattern, ShockCatalog, ShockDefinition};
use crate::{DsgeError, Result, Variable, NUM_VARIABLES};

/// Half-width of the uniform noise added to every variance share
pub const VARIANCE_NOISE: f64 = 0.02;

/// Calibrated variance shares; shocks missing from the catalog are skipped
pub const VARIANCE_PRIORS: [(Variable, &str, f64); 17] = [
    (Variable::Output, "productivity", 0.35),
    (Variable::Output, "monetary", 0.15),
    (Variable::Output, "fiscal", 0.12),
    (Variable::Output, "preference", 0.10),
    (Variable::Output, "investment", 0.08),
    (Variable::Output, "financial", 0.07),
    (Variable::Output, "oil_price", 0.06),
    (Variable::Output, "external", 0.04),
    (Variable::Output, "risk", 0.03),
    (Variable::Inflation, "monetary", 0.25),
    (Variable::Inflation, "markup", 0.20),
    (Variable::Inflation, "oil_price", 0.15),
    (Variable::Inflation, "monetary_policy", 0.12),
    (Variable::Inflation, "external", 0.10),
    (Variable::Inflation, "fiscal", 0.08),
    (Variable::Inflation, "productivity", 0.06),
    (Variable::Inflation, "risk", 0.04),
];

/// Level of the observed output index before the first quarter
pub const OBSERVED_OUTPUT_BASE: f64 = 100.0;
/// Mean and std of the quarterly trend growth in observed output
pub const OUTPUT_TREND_DRIFT: f64 = 0.02;
pub const OUTPUT_TREND_VOLATILITY: f64 = 0.015;
/// Weight of the summed shock contributions in observed output growth
pub const SHOCK_PASS_THROUGH: f64 = 0.3;

/// Key and display name of one decomposition column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShockColumn {
    pub key: String,
    pub name: String,
}

impl From<&ShockDefinition> for ShockColumn {
    fn from(shock: &ShockDefinition) -> Self {
        ShockColumn {
            key: shock.key.clone(),
            name: shock.name.clone(),
        }
    }
}

/// Share of each variable's forecast-error variance attributed to each shock
///
/// Rows follow [`Variable::ALL`], columns follow the catalog order. Every
/// row sums to 1.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VarianceDecomposition {
    pub horizon: usize,
    pub shocks: Vec<ShockColumn>,
    shares: Vec<Vec<f64>>,
}

/// One cell of the variance table in long format
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VarianceShare {
    pub variable: Variable,
    pub shock: String,
    pub share: f64,
}

impl VarianceDecomposition {
    /// Shares of `variable`, one per shock in catalog order
    pub fn row(&self, variable: Variable) -> &[f64] {
        &self.shares[variable.index()]
    }

    pub fn rows(&self) -> impl Iterator<Item = (Variable, &[f64])> {
        Variable::ALL
            .into_iter()
            .zip(self.shares.iter().map(Vec::as_slice))
    }

    pub fn share(&self, variable: Variable, key: &str) -> Option<f64> {
        let column = self.shocks.iter().position(|s| s.key == key)?;
        Some(self.shares[variable.index()][column])
    }

    /// `(variable, shock, share)` triples, variable-major
    pub fn long_rows(&self) -> Vec<VarianceShare> {
        self.rows()
            .flat_map(|(variable, row)| {
                self.shocks
                    .iter()
                    .zip(row)
                    .map(move |(shock, share)| VarianceShare {
                        variable,
                        shock: shock.key.clone(),
                        share: *share,
                    })
            })
            .collect()
    }

    /// Print the variable x shock share table
    pub fn print_table(&self) {
        println!("Variance decomposition (horizon {}):", self.horizon);
        print!("{:<20}", "");
        for shock in &self.shocks {
            print!(" {:>9.9}", shock.key);
        }
        println!();
        for (variable, row) in self.rows() {
            print!("{:<20}", variable.name());
            for share in row {
                print!(" {:>9.3}", share);
            }
            println!();
        }
    }
}

/// Build the variance table for `catalog`
///
/// Noise is drawn row-major over the full 15 x K table from `rng`; negative
/// shares are clipped to zero before each row is normalized. A row that clips
/// to all zeros is split equally. `horizon` labels the table but does not
/// change the shares.
pub fn variance_decomposition<R: Rng + ?Sized>(
    catalog: &ShockCatalog,
    horizon: usize,
    rng: &mut R,
) -> Result<VarianceDecomposition> {
    if horizon < 1 {
        return Err(DsgeError::InvalidHorizon {
            horizon,
            minimum: 1,
        });
    }

    let num_shocks = catalog.len();
    let mut shares = vec![vec![0.0; num_shocks]; NUM_VARIABLES];
    for (variable, key, prior) in VARIANCE_PRIORS {
        if let Some(column) = catalog.position(key) {
            shares[variable.index()][column] = prior;
        }
    }

    for row in shares.iter_mut() {
        for share in row.iter_mut() {
            *share = (*share + rng.random_range(-VARIANCE_NOISE..VARIANCE_NOISE)).clamp(0.0, 1.0);
        }
        let total: f64 = row.iter().sum();
        if total > 0.0 {
            row.iter_mut().for_each(|share| *share /= total);
        } else {
            row.fill(1.0 / num_shocks as f64);
        }
    }

    debug!(horizon, shocks = num_shocks, "Built variance decomposition");

    Ok(VarianceDecomposition {
        horizon,
        shocks: catalog.iter().map(ShockColumn::from).collect(),
        shares,
    })
}

/// Contribution of one shock over the historical sample
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShockSeries {
    pub key: String,
    pub name: String,
    pub values: Vec<f64>,
}

/// Quarterly shock contributions and the observed output they feed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoricalDecomposition {
    pub dates: Vec<NaiveDate>,
    pub shocks: Vec<ShockSeries>,
    pub observed_output: Vec<f64>,
}

impl HistoricalDecomposition {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn series(&self, key: &str) -> Option<&ShockSeries> {
        self.shocks.iter().find(|s| s.key == key)
    }
}

/// Last day of the quarter `quarters_ahead` quarters after the one holding `start`
fn quarter_end(start: NaiveDate, quarters_ahead: usize) -> Option<NaiveDate> {
    let quarter = (start.month0() / 3) as usize + quarters_ahead + 1;
    let year = start.year() + i32::try_from(quarter / 4).ok()?;
    let month = (quarter % 4) as u32 * 3 + 1;
    NaiveDate::from_ymd_opt(year, month, 1)?.pred_opt()
}

/// Quarter-end dates covering `num_quarters` quarters from `start`
pub fn quarter_end_dates(start: NaiveDate, num_quarters: usize) -> Result<Vec<NaiveDate>> {
    (0..num_quarters)
        .map(|i| {
            quarter_end(start, i).ok_or_else(|| {
                DsgeError::invalid_parameter(
                    "historical_start",
                    format!("{num_quarters} quarters from {start} leave the calendar range"),
                )
            })
        })
        .collect()
}

fn pattern_values<R: Rng + ?Sized>(
    pattern: &HistoricalPattern,
    num_quarters: usize,
    rng: &mut R,
) -> Result<Vec<f64>> {
    match pattern {
        HistoricalPattern::Quiet => Ok(vec![0.0; num_quarters]),
        HistoricalPattern::Episodes(episodes) => Ok((0..num_quarters)
            .map(|q| {
                episodes
                    .iter()
                    .find_map(|episode| episode.value_at(q))
                    .unwrap_or(0.0)
            })
            .collect()),
        HistoricalPattern::RandomWalk { drift, volatility } => {
            let increments = Normal::new(*drift, *volatility).map_err(|e| {
                DsgeError::invalid_parameter("random walk volatility", e.to_string())
            })?;
            Ok(increments
                .sample_iter(rng)
                .take(num_quarters)
                .scan(0.0, |level, step| {
                    *level += step;
                    Some(*level)
                })
                .collect())
        }
    }
}

/// Replay each shock's historical pattern over `num_quarters` quarters
///
/// Random-walk shocks draw from `rng` in catalog order, then the output trend
/// draws `num_quarters` increments. Episodes that run past the sample are
/// truncated.
pub fn historical_decomposition<R: Rng + ?Sized>(
    catalog: &ShockCatalog,
    start: NaiveDate,
    num_quarters: usize,
    rng: &mut R,
) -> Result<HistoricalDecomposition> {
    if num_quarters < 1 {
        return Err(DsgeError::InvalidHorizon {
            horizon: num_quarters,
            minimum: 1,
        });
    }

    let dates = quarter_end_dates(start, num_quarters)?;

    let mut shocks = Vec::with_capacity(catalog.len());
    for shock in catalog {
        shocks.push(ShockSeries {
            key: shock.key.clone(),
            name: shock.name.clone(),
            values: pattern_values(&shock.history, num_quarters, &mut *rng)?,
        });
    }

    let trend = Normal::new(OUTPUT_TREND_DRIFT, OUTPUT_TREND_VOLATILITY)
        .map_err(|e| DsgeError::invalid_parameter("output trend", e.to_string()))?;
    let mut level = OBSERVED_OUTPUT_BASE;
    let observed_output = (0..num_quarters)
        .map(|q| {
            let shock_total: f64 = shocks.iter().map(|s| s.values[q]).sum();
            level += trend.sample(&mut *rng) + SHOCK_PASS_THROUGH * shock_total;
            level
        })
        .collect();

    debug!(num_quarters, %start, "Built historical decomposition");

    Ok(HistoricalDecomposition {
        dates,
        shocks,
        observed_output,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn variance_rows_sum_to_one() {
        let catalog = ShockCatalog::complete();
        let table = variance_decomposition(&catalog, 20, &mut StdRng::seed_from_u64(42)).unwrap();

        assert_eq!(table.shocks.len(), 12);
        for (variable, row) in table.rows() {
            assert_eq!(row.len(), 12);
            let total: f64 = row.iter().sum();
            assert!((total - 1.0).abs() < 1e-9, "{variable}: {total}");
            assert!(row.iter().all(|s| (0.0..=1.0).contains(s)));
        }
    }

    #[test]
    fn priors_dominate_output_and_inflation() {
        let catalog = ShockCatalog::complete();
        let table = variance_decomposition(&catalog, 20, &mut StdRng::seed_from_u64(42)).unwrap();

        // Noise is at most 0.02, so productivity (0.35) stays the largest Output share
        let output = table.row(Variable::Output);
        let productivity = table.share(Variable::Output, "productivity").unwrap();
        assert!(output.iter().all(|s| *s <= productivity));

        let monetary = table.share(Variable::Inflation, "monetary").unwrap();
        let markup = table.share(Variable::Inflation, "markup").unwrap();
        assert!(monetary > markup);
        assert_eq!(table.share(Variable::Output, "unknown"), None);
    }

    #[test]
    fn simple_catalog_skips_missing_priors() {
        let catalog = ShockCatalog::simple();
        let table = variance_decomposition(&catalog, 4, &mut StdRng::seed_from_u64(42)).unwrap();

        assert_eq!(table.shocks.len(), 5);
        assert_eq!(table.long_rows().len(), 5 * NUM_VARIABLES);
        for (_, row) in table.rows() {
            assert_relative_eq!(row.iter().sum::<f64>(), 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn zero_horizon_is_rejected() {
        let catalog = ShockCatalog::complete();
        let err = variance_decomposition(&catalog, 0, &mut StdRng::seed_from_u64(42)).unwrap_err();
        assert!(matches!(err, DsgeError::InvalidHorizon { horizon: 0, minimum: 1 }));
    }

    #[test]
    fn clipped_rows_fall_back_to_equal_shares() {
        // A single shock with no prior: half of the noise draws clip to zero
        let demand = ShockDefinition::new("demand", "Demand", "", "#000000");
        let catalog = ShockCatalog::new(vec![demand]).unwrap();
        let table = variance_decomposition(&catalog, 8, &mut StdRng::seed_from_u64(3)).unwrap();
        for (_, row) in table.rows() {
            assert_eq!(row, &[1.0]);
        }
    }

    #[test]
    fn quarter_ends_start_at_first_quarter() {
        let dates = quarter_end_dates(ymd(2015, 1, 1), 6).unwrap();
        assert_eq!(
            dates,
            vec![
                ymd(2015, 3, 31),
                ymd(2015, 6, 30),
                ymd(2015, 9, 30),
                ymd(2015, 12, 31),
                ymd(2016, 3, 31),
                ymd(2016, 6, 30),
            ]
        );
        assert_eq!(quarter_end_dates(ymd(2019, 11, 15), 1).unwrap(), vec![ymd(2019, 12, 31)]);
    }

    #[test]
    fn historical_episodes_are_replayed() {
        let catalog = ShockCatalog::complete();
        let mut rng = StdRng::seed_from_u64(42);
        let history = historical_decomposition(&catalog, ymd(2015, 1, 1), 24, &mut rng).unwrap();

        assert_eq!(history.len(), 24);
        assert_eq!(history.shocks.len(), 12);

        let oil = &history.series("oil_price").unwrap().values;
        assert_eq!(oil[0], -0.3);
        assert_eq!(oil[7], -0.1);
        assert_eq!(oil[8], 0.0);
        assert_eq!(oil[16], 0.2);
        assert_eq!(oil[19], 0.4);
        assert_eq!(oil[20], 0.0);

        let monetary = &history.series("monetary").unwrap().values;
        assert_eq!(monetary[12], -0.4);
        assert_eq!(monetary[15], -0.2);
        assert_eq!(monetary[18], 0.1);
        assert_eq!(monetary[19], 0.3);

        let risk = &history.series("risk").unwrap().values;
        assert_eq!(&risk[11..15], &[0.0, 0.4, 0.6, 0.0]);

        let quiet = &history.series("markup").unwrap().values;
        assert!(quiet.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn fiscal_schedule_ramps_up_then_down() {
        let catalog = ShockCatalog::complete();
        let mut rng = StdRng::seed_from_u64(42);
        let history = historical_decomposition(&catalog, ymd(2015, 1, 1), 24, &mut rng).unwrap();

        let fiscal = &history.series("fiscal").unwrap().values;
        assert!(fiscal[..12].iter().all(|v| *v == 0.0));
        assert_eq!(fiscal[12], 0.3);
        assert_relative_eq!(fiscal[13], 0.3 + 0.2 / 3.0);
        assert_relative_eq!(fiscal[14], 0.3 + 0.4 / 3.0);
        assert_eq!(fiscal[15], 0.5);
        assert_eq!(&fiscal[16..18], &[0.0, 0.0]);
        assert_eq!(fiscal[18], -0.1);
        assert_eq!(fiscal[19], -0.2);
        assert!(fiscal[20..].iter().all(|v| *v == 0.0));
    }

    #[test]
    fn productivity_is_a_drifting_random_walk() {
        let catalog = ShockCatalog::complete();
        let start = ymd(2015, 1, 1);

        // Productivity is the first random walk in catalog order, so its
        // increments are the first draws of the stream
        let history =
            historical_decomposition(&catalog, start, 8, &mut StdRng::seed_from_u64(42)).unwrap();
        let increments: Vec<f64> = Normal::new(0.01, 0.02)
            .unwrap()
            .sample_iter(StdRng::seed_from_u64(42))
            .take(8)
            .collect();
        let walk = &history.series("productivity").unwrap().values;
        assert_eq!(walk[0], increments[0]);
        for q in 1..8 {
            assert_relative_eq!(walk[q] - walk[q - 1], increments[q], epsilon = 1e-12);
        }

        let n = 2000;
        let long =
            historical_decomposition(&catalog, start, n, &mut StdRng::seed_from_u64(7)).unwrap();
        let walk = &long.series("productivity").unwrap().values;
        let steps: Vec<f64> = walk.windows(2).map(|w| w[1] - w[0]).collect();
        let mean = steps.iter().sum::<f64>() / steps.len() as f64;
        let var = steps.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / steps.len() as f64;
        assert!((mean - 0.01).abs() < 0.002, "mean step {mean}");
        assert!((var.sqrt() - 0.02).abs() < 0.002, "step std {}", var.sqrt());
    }

    #[test]
    fn short_sample_truncates_episodes() {
        let catalog = ShockCatalog::complete();
        let mut rng = StdRng::seed_from_u64(42);
        let history = historical_decomposition(&catalog, ymd(2015, 1, 1), 14, &mut rng).unwrap();

        let monetary = &history.series("monetary").unwrap().values;
        assert_eq!(monetary.len(), 14);
        assert_eq!(monetary[12], -0.4);
        assert_relative_eq!(monetary[13], -0.4 + 0.2 / 3.0);
    }

    #[test]
    fn observed_output_tracks_drift_and_shocks() {
        let catalog = ShockCatalog::complete();
        let mut rng = StdRng::seed_from_u64(42);
        let history = historical_decomposition(&catalog, ymd(2015, 1, 1), 24, &mut rng).unwrap();

        // First quarter: 100 + trend draw + 0.3 * (oil -0.3 + productivity level)
        let productivity = history.series("productivity").unwrap().values[0];
        let implied_trend = history.observed_output[0] - 100.0 - 0.3 * (-0.3 + productivity);
        assert!(implied_trend.abs() < 0.1, "trend draw {implied_trend}");
        assert!(history.observed_output.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn historical_is_deterministic_per_seed() {
        let catalog = ShockCatalog::complete();
        let start = ymd(2015, 1, 1);
        let run = |seed| {
            historical_decomposition(&catalog, start, 20, &mut StdRng::seed_from_u64(seed)).unwrap()
        };
        let (a, b) = (run(42), run(42));
        assert_eq!(a, b);
    }

    #[test]
    fn zero_quarters_is_rejected() {
        let catalog = ShockCatalog::simple();
        let mut rng = StdRng::seed_from_u64(42);
        assert!(matches!(
            historical_decomposition(&catalog, ymd(2015, 1, 1), 0, &mut rng),
            Err(DsgeError::InvalidHorizon { minimum: 1, .. })
        ));
    }
}

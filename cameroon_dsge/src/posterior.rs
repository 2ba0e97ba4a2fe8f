//! Structural parameter "posteriors"
//!
//! Draws come straight from fixed hyperparameters. There is no likelihood,
//! no data and no MCMC: each parameter's declared family is parametrized from
//! its mean and standard deviation and sampled i.i.d.
//!
//! - Beta: `a = 20 * mean`, `b = 20 * (1 - mean)`. This is a fixed-concentration
//!   heuristic, not a moment-matched fit; the declared std is ignored.
//! - Gamma: method of moments, shape `(mean/std)^2`, scale `std^2/mean`.
//! - Normal: the declared mean and std. Any family name other than `beta` or
//!   `gamma` falls back to normal.

use rand::Rng;
use rand_distr::{Beta, Distribution, Gamma, Normal};
use serde::{Deserialize, Deserializer, Serialize};

use crate::analysis::PosteriorSummary;
use crate::{DsgeError, Result};

/// Concentration `a + b` of every beta parameter
pub const BETA_CONCENTRATION: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DistributionFamily {
    Beta,
    Gamma,
    Normal,
}

impl DistributionFamily {
    /// Case-insensitive; unrecognized names map to `Normal`
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "beta" => DistributionFamily::Beta,
            "gamma" => DistributionFamily::Gamma,
            _ => DistributionFamily::Normal,
        }
    }
}

impl<'de> Deserialize<'de> for DistributionFamily {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        Ok(DistributionFamily::from_name(&name))
    }
}

/// Declared hyperparameters of one structural parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub name: String,
    pub mean: f64,
    pub std: f64,
    pub family: DistributionFamily,
    pub description: String,
}

impl ParameterSpec {
    pub fn new(
        name: &str,
        mean: f64,
        std: f64,
        family: DistributionFamily,
        description: &str,
    ) -> Self {
        ParameterSpec {
            name: name.to_string(),
            mean,
            std,
            family,
            description: description.to_string(),
        }
    }

    /// Beta shape parameters `(a, b)`
    pub fn beta_shapes(&self) -> (f64, f64) {
        (
            self.mean * BETA_CONCENTRATION,
            (1.0 - self.mean) * BETA_CONCENTRATION,
        )
    }

    /// Gamma `(shape, scale)` by method of moments
    pub fn gamma_shape_scale(&self) -> (f64, f64) {
        ((self.mean / self.std).powi(2), self.std.powi(2) / self.mean)
    }

    /// Build the sampling distribution, validating the hyperparameters
    pub fn sampler(&self) -> Result<ParameterSampler> {
        let invalid = |reason: String| DsgeError::invalid_parameter(&self.name, reason);

        if !self.mean.is_finite() || !self.std.is_finite() {
            return Err(invalid(format!(
                "mean {} and std {} must be finite",
                self.mean, self.std
            )));
        }

        match self.family {
            DistributionFamily::Beta => {
                if self.mean <= 0.0 || self.mean >= 1.0 {
                    return Err(invalid(format!(
                        "beta mean {} must lie strictly inside (0, 1)",
                        self.mean
                    )));
                }
                let (a, b) = self.beta_shapes();
                Beta::new(a, b)
                    .map(ParameterSampler::Beta)
                    .map_err(|e| invalid(e.to_string()))
            }
            DistributionFamily::Gamma => {
                if self.mean <= 0.0 || self.std <= 0.0 {
                    return Err(invalid(format!(
                        "gamma mean {} and std {} must be positive",
                        self.mean, self.std
                    )));
                }
                let (shape, scale) = self.gamma_shape_scale();
                Gamma::new(shape, scale)
                    .map(ParameterSampler::Gamma)
                    .map_err(|e| invalid(e.to_string()))
            }
            DistributionFamily::Normal => {
                if self.std < 0.0 {
                    return Err(invalid(format!(
                        "normal std {} must not be negative",
                        self.std
                    )));
                }
                Normal::new(self.mean, self.std)
                    .map(ParameterSampler::Normal)
                    .map_err(|e| invalid(e.to_string()))
            }
        }
    }
}

/// Validated distribution for one parameter
#[derive(Debug, Clone)]
pub enum ParameterSampler {
    Beta(Beta<f64>),
    Gamma(Gamma<f64>),
    Normal(Normal<f64>),
}

impl Distribution<f64> for ParameterSampler {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match self {
            ParameterSampler::Beta(d) => d.sample(rng),
            ParameterSampler::Gamma(d) => d.sample(rng),
            ParameterSampler::Normal(d) => d.sample(rng),
        }
    }
}

/// Ordered set of structural parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterCatalog {
    parameters: Vec<ParameterSpec>,
}

impl ParameterCatalog {
    pub fn new(parameters: Vec<ParameterSpec>) -> Self {
        ParameterCatalog { parameters }
    }

    /// The 15 calibrated parameters of the Cameroon model
    pub fn cameroon() -> Self {
        let (beta, gamma) = (DistributionFamily::Beta, DistributionFamily::Gamma);

        ParameterCatalog::new(vec![
            ParameterSpec::new("beta", 0.96, 0.01, beta, "Discount factor"),
            ParameterSpec::new("sigma", 2.0, 0.2, gamma, "Risk aversion"),
            ParameterSpec::new("phi", 1.5, 0.15, gamma, "Inverse Frisch elasticity"),
            ParameterSpec::new("theta_c", 0.3, 0.03, beta, "Import share"),
            ParameterSpec::new("eta", 1.5, 0.1, gamma, "Elasticity of substitution"),
            ParameterSpec::new("delta", 0.1, 0.01, beta, "Depreciation rate"),
            ParameterSpec::new("alpha", 0.35, 0.03, beta, "Capital share"),
            ParameterSpec::new("theta", 0.75, 0.05, beta, "Calvo price rigidity"),
            ParameterSpec::new(
                "epsilon",
                6.0,
                0.5,
                gamma,
                "Elasticity of substitution between goods",
            ),
            ParameterSpec::new("mu", 0.02, 0.005, gamma, "Average bank margin"),
            ParameterSpec::new("rr", 0.05, 0.01, beta, "Required reserve ratio"),
            ParameterSpec::new("rho_g", 0.7, 0.05, beta, "Government spending persistence"),
            ParameterSpec::new("phi_pi", 1.5, 0.1, gamma, "Policy response to inflation"),
            ParameterSpec::new("phi_y", 0.5, 0.05, gamma, "Policy response to the output gap"),
            ParameterSpec::new("pi_star", 0.03, 0.005, beta, "Inflation target"),
        ])
    }

    pub fn get(&self, name: &str) -> Option<&ParameterSpec> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ParameterSpec> {
        self.parameters.iter()
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }
}

impl Default for ParameterCatalog {
    fn default() -> Self {
        ParameterCatalog::cameroon()
    }
}

/// Draws for one parameter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PosteriorDraws {
    pub name: String,
    pub description: String,
    pub family: DistributionFamily,
    pub samples: Vec<f64>,
}

/// Draws for every parameter, in catalog order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PosteriorSet {
    draws: Vec<PosteriorDraws>,
}

impl PosteriorSet {
    pub fn get(&self, name: &str) -> Option<&PosteriorDraws> {
        self.draws.iter().find(|d| d.name == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PosteriorDraws> {
        self.draws.iter()
    }

    pub fn len(&self) -> usize {
        self.draws.len()
    }

    pub fn is_empty(&self) -> bool {
        self.draws.is_empty()
    }

    /// Mean, std and 90% interval per parameter
    pub fn summaries(&self) -> Vec<PosteriorSummary> {
        self.draws.iter().map(PosteriorSummary::from_draws).collect()
    }
}

/// Draw `n_draws` samples for every parameter in `catalog`
///
/// All hyperparameters are validated before any sampling, so a bad entry
/// leaves `rng` untouched.
pub fn sample_posteriors<R: Rng + ?Sized>(
    catalog: &ParameterCatalog,
    n_draws: usize,
    rng: &mut R,
) -> Result<PosteriorSet> {
    if n_draws < 1 {
        return Err(DsgeError::InvalidDrawCount { draws: n_draws });
    }

    let samplers = catalog
        .iter()
        .map(|spec| spec.sampler().map(|sampler| (spec, sampler)))
        .collect::<Result<Vec<_>>>()?;

    let draws = samplers
        .into_iter()
        .map(|(spec, sampler)| PosteriorDraws {
            name: spec.name.clone(),
            description: spec.description.clone(),
            family: spec.family,
            samples: sampler.sample_iter(&mut *rng).take(n_draws).collect(),
        })
        .collect();

    Ok(PosteriorSet { draws })
}

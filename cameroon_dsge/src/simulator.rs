use rand::rngs::StdRng;
use rand::SeedableRng;
use statespace::parallel::BatchRunner;
use statespace::{LinearSystem, TransitionMatrix, Trajectory};
use tracing::{debug, warn};

use crate::config::{CatalogVariant, ModelConfig};
use crate::decomposition::{self, HistoricalDecomposition, VarianceDecomposition};
use crate::posterior::{self, ParameterCatalog, PosteriorSet};
use crate::shocks::{ShockCatalog, ShockDefinition};
use crate::transition::transition_matrix;
use crate::{DsgeError, Result, State, Variable, NUM_VARIABLES};

/// Response of every variable to one shock, period 0 being the steady state
#[derive(Debug, Clone, PartialEq)]
pub struct ImpulseResponse {
    pub shock: String,
    pub amplitude: f64,
    trajectory: Trajectory<NUM_VARIABLES>,
}

impl ImpulseResponse {
    pub fn new(shock: &str, amplitude: f64, trajectory: Trajectory<NUM_VARIABLES>) -> Self {
        ImpulseResponse {
            shock: shock.to_string(),
            amplitude,
            trajectory,
        }
    }

    /// Number of periods, including period 0
    pub fn horizon(&self) -> usize {
        self.trajectory.len()
    }

    pub fn period(&self, t: usize) -> Option<&State> {
        self.trajectory.period(t)
    }

    pub fn value(&self, t: usize, variable: Variable) -> Option<f64> {
        self.period(t).map(|state| state[variable.index()])
    }

    pub fn series(&self, variable: Variable) -> Vec<f64> {
        self.trajectory.series(variable.index())
    }

    pub fn trajectory(&self) -> &Trajectory<NUM_VARIABLES> {
        &self.trajectory
    }

    /// `(period, state)` rows in period order
    pub fn rows(&self) -> impl Iterator<Item = (usize, &State)> {
        self.trajectory.states().iter().enumerate()
    }
}

/// The model engine
///
/// Built once and never mutated: every operation is a pure function of its
/// arguments plus the matrix, catalogs and configuration captured here, so a
/// single instance can be shared across threads.
#[derive(Debug, Clone)]
pub struct StateSpaceSimulator {
    system: LinearSystem<NUM_VARIABLES>,
    catalog: ShockCatalog,
    parameters: ParameterCatalog,
    config: ModelConfig,
}

impl StateSpaceSimulator {
    /// Build from a configuration, using the catalog its variant names
    pub fn new(config: ModelConfig) -> Result<Self> {
        let catalog = match config.variant {
            CatalogVariant::Complete => ShockCatalog::complete(),
            CatalogVariant::Simple => ShockCatalog::simple(),
        };
        Self::with_catalog(config, catalog)
    }

    /// Build with an injected shock catalog; `config.variant` is ignored
    pub fn with_catalog(config: ModelConfig, catalog: ShockCatalog) -> Result<Self> {
        config.validate()?;
        Ok(Self::assemble(config, catalog))
    }

    /// 12-shock model with persistence decay
    pub fn complete() -> Self {
        Self::assemble(ModelConfig::complete(), ShockCatalog::complete())
    }

    /// 5-shock model with pure matrix propagation
    pub fn simple() -> Self {
        Self::assemble(ModelConfig::simple(), ShockCatalog::simple())
    }

    fn assemble(config: ModelConfig, catalog: ShockCatalog) -> Self {
        StateSpaceSimulator {
            system: LinearSystem::new(transition_matrix(), config.propagation()),
            catalog,
            parameters: ParameterCatalog::cameroon(),
            config,
        }
    }

    /// Replace the structural parameter catalog used by [`Self::sample_posteriors`]
    pub fn with_parameters(mut self, parameters: ParameterCatalog) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn catalog(&self) -> &ShockCatalog {
        &self.catalog
    }

    pub fn parameters(&self) -> &ParameterCatalog {
        &self.parameters
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn transition_matrix(&self) -> &TransitionMatrix<NUM_VARIABLES> {
        self.system.matrix()
    }

    pub fn shock(&self, key: &str) -> Result<&ShockDefinition> {
        self.catalog.get(key)
    }

    /// Impact vector of `key` at `amplitude`
    pub fn shock_vector(&self, key: &str, amplitude: f64) -> Result<State> {
        Ok(self.catalog.get(key)?.impulse_vector(amplitude))
    }

    /// Impulse response over `horizon` periods (at least 2)
    ///
    /// `amplitude` is not clamped; callers decide what range makes sense.
    pub fn simulate(&self, key: &str, amplitude: f64, horizon: usize) -> Result<ImpulseResponse> {
        let shock = self.catalog.get(key).inspect_err(|_| {
            warn!(shock = key, "Rejected unknown shock type");
        })?;

        let impulse = shock.impulse_vector(amplitude);
        let trajectory = self.system.impulse_response(&impulse, horizon)?;

        debug!(shock = key, amplitude, horizon, "Simulated impulse response");
        Ok(ImpulseResponse::new(key, amplitude, trajectory))
    }

    /// Impulse responses of every catalog shock, in catalog order
    ///
    /// Shocks are simulated in parallel, on `batch_threads` threads when the
    /// configuration sets it; the result does not depend on scheduling.
    pub fn impulse_responses(
        &self,
        amplitude: f64,
        horizon: usize,
    ) -> Result<Vec<ImpulseResponse>> {
        self.run_batch(amplitude, horizon, None::<fn(usize, usize)>)
    }

    /// Like [`impulse_responses`](Self::impulse_responses), calling
    /// `progress(completed, total)` as each shock finishes
    pub fn impulse_responses_with_progress<P>(
        &self,
        amplitude: f64,
        horizon: usize,
        progress: P,
    ) -> Result<Vec<ImpulseResponse>>
    where
        P: Fn(usize, usize) + Send + Sync + 'static,
    {
        self.run_batch(amplitude, horizon, Some(progress))
    }

    fn run_batch<P>(
        &self,
        amplitude: f64,
        horizon: usize,
        progress: Option<P>,
    ) -> Result<Vec<ImpulseResponse>>
    where
        P: Fn(usize, usize) + Send + Sync + 'static,
    {
        let shocks: Vec<&ShockDefinition> = self.catalog.iter().collect();

        let mut runner = BatchRunner::new(shocks.len(), |job| {
            self.simulate(&shocks[job].key, amplitude, horizon)
        });
        if let Some(n) = self.config.batch_threads {
            runner = runner.num_threads(n);
        }
        if let Some(progress) = progress {
            runner = runner.progress(progress);
        }

        runner
            .run()
            .into_iter()
            .zip(&shocks)
            .map(|(result, shock)| {
                result
                    .map_err(|reason| DsgeError::BatchFailure {
                        key: shock.key.clone(),
                        reason,
                    })
                    .and_then(|irf| irf)
            })
            .collect()
    }

    /// Variance shares of every variable across the catalog's shocks
    pub fn variance_decomposition(&self, horizon: usize) -> Result<VarianceDecomposition> {
        let mut rng = StdRng::seed_from_u64(self.config.variance_seed);
        decomposition::variance_decomposition(&self.catalog, horizon, &mut rng)
    }

    /// Scripted shock contributions and observed output over `num_quarters`
    pub fn historical_decomposition(&self, num_quarters: usize) -> Result<HistoricalDecomposition> {
        let mut rng = StdRng::seed_from_u64(self.config.historical_seed);
        decomposition::historical_decomposition(
            &self.catalog,
            self.config.historical_start,
            num_quarters,
            &mut rng,
        )
    }

    /// `n_draws` samples per structural parameter
    ///
    /// Seeded from the configuration, so repeated calls return the same draws.
    pub fn sample_posteriors(&self, n_draws: usize) -> Result<PosteriorSet> {
        let mut rng = StdRng::seed_from_u64(self.config.posterior_seed);
        posterior::sample_posteriors(&self.parameters, n_draws, &mut rng)
    }
}

impl Default for StateSpaceSimulator {
    fn default() -> Self {
        StateSpaceSimulator::complete()
    }
}

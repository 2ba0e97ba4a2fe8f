//! Linear state-space propagation
//!
//! Iterates a fixed transition matrix over an `N`-dimensional state vector
//! after a one-off impulse:
//!
//! ```text
//! x[0] = 0
//! x[1] = A * x[0] + e
//! x[t] = (A * x[t-1]) * p(t)      for t >= 2
//! ```
//!
//! where `e` is the impulse and `p(t)` is the persistence factor of the
//! selected [`Propagation`] mode (identically 1 for [`Propagation::PureMatrix`]).

pub mod parallel;

use thiserror::Error;
use tracing::debug;

/// Shortest trajectory that carries an impulse (baseline period plus one)
pub const MIN_HORIZON: usize = 2;

/// Failures raised while propagating a state vector
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PropagationError {
    #[error("Horizon of {horizon} periods is too short (minimum {minimum})")]
    InvalidHorizon { horizon: usize, minimum: usize },

    #[error("Non-finite value at period {period}, state index {index}")]
    NonFinite { period: usize, index: usize },
}

/// Fixed `N x N` transition matrix stored row-major
///
/// `rows[r][c]` is the weight of last period's coordinate `c` in this
/// period's coordinate `r`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionMatrix<const N: usize> {
    rows: [[f64; N]; N],
}

impl<const N: usize> TransitionMatrix<N> {
    pub const fn new(rows: [[f64; N]; N]) -> Self {
        TransitionMatrix { rows }
    }

    pub fn identity() -> Self {
        let mut rows = [[0.0; N]; N];
        for (i, row) in rows.iter_mut().enumerate() {
            row[i] = 1.0;
        }
        TransitionMatrix { rows }
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.rows[row][col]
    }

    pub fn rows(&self) -> &[[f64; N]; N] {
        &self.rows
    }

    /// Matrix-vector product `A * x`
    pub fn apply(&self, x: &[f64; N]) -> [f64; N] {
        let mut out = [0.0; N];
        for (value, row) in out.iter_mut().zip(self.rows.iter()) {
            *value = row.iter().zip(x.iter()).map(|(a, b)| a * b).sum();
        }
        out
    }
}

/// Piecewise-constant damping applied on top of the matrix dynamics
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PersistenceSchedule {
    /// Factor for periods before `switch_period`
    pub early: f64,
    /// Factor from `switch_period` onwards
    pub late: f64,
    pub switch_period: usize,
}

impl PersistenceSchedule {
    pub fn factor(&self, period: usize) -> f64 {
        if period < self.switch_period {
            self.early
        } else {
            self.late
        }
    }
}

impl Default for PersistenceSchedule {
    fn default() -> Self {
        PersistenceSchedule {
            early: 0.8,
            late: 0.9,
            switch_period: 8,
        }
    }
}

/// How the state is carried from one period to the next
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Propagation {
    /// `x[t] = (A * x[t-1]) * p(t)`
    PersistenceDecay(PersistenceSchedule),
    /// `x[t] = A * x[t-1]`
    PureMatrix,
}

impl Propagation {
    pub fn factor(&self, period: usize) -> f64 {
        match self {
            Propagation::PersistenceDecay(schedule) => schedule.factor(period),
            Propagation::PureMatrix => 1.0,
        }
    }
}

impl Default for Propagation {
    fn default() -> Self {
        Propagation::PersistenceDecay(PersistenceSchedule::default())
    }
}

/// State path indexed by period, period 0 being the baseline
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory<const N: usize> {
    states: Vec<[f64; N]>,
}

impl<const N: usize> Trajectory<N> {
    pub fn from_states(states: Vec<[f64; N]>) -> Self {
        Trajectory { states }
    }

    /// Number of periods, including the baseline
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn period(&self, t: usize) -> Option<&[f64; N]> {
        self.states.get(t)
    }

    pub fn states(&self) -> &[[f64; N]] {
        &self.states
    }

    /// Time series of a single state coordinate
    pub fn series(&self, index: usize) -> Vec<f64> {
        self.states.iter().map(|state| state[index]).collect()
    }

    /// Copy of the trajectory with every value multiplied by `k`
    pub fn scaled(&self, k: f64) -> Self {
        let states = self
            .states
            .iter()
            .map(|state| state.map(|v| v * k))
            .collect();
        Trajectory { states }
    }

    /// Largest absolute value anywhere in the path
    pub fn max_abs(&self) -> f64 {
        self.states
            .iter()
            .flat_map(|state| state.iter())
            .fold(0.0, |acc: f64, v| acc.max(v.abs()))
    }
}

/// Transition matrix paired with a propagation mode
#[derive(Debug, Clone, PartialEq)]
pub struct LinearSystem<const N: usize> {
    matrix: TransitionMatrix<N>,
    propagation: Propagation,
}

impl<const N: usize> LinearSystem<N> {
    pub fn new(matrix: TransitionMatrix<N>, propagation: Propagation) -> Self {
        LinearSystem {
            matrix,
            propagation,
        }
    }

    pub fn matrix(&self) -> &TransitionMatrix<N> {
        &self.matrix
    }

    pub fn propagation(&self) -> Propagation {
        self.propagation
    }

    /// Response of the system to `impulse` injected at period 1
    pub fn impulse_response(
        &self,
        impulse: &[f64; N],
        horizon: usize,
    ) -> Result<Trajectory<N>, PropagationError> {
        propagate(&self.matrix, self.propagation, impulse, horizon)
    }
}

/// Iterate `matrix` for `horizon` periods after injecting `impulse` at period 1
///
/// Every state is checked for NaN/infinity and the first offending
/// coordinate is reported rather than propagated.
pub fn propagate<const N: usize>(
    matrix: &TransitionMatrix<N>,
    propagation: Propagation,
    impulse: &[f64; N],
    horizon: usize,
) -> Result<Trajectory<N>, PropagationError> {
    if horizon < MIN_HORIZON {
        return Err(PropagationError::InvalidHorizon {
            horizon,
            minimum: MIN_HORIZON,
        });
    }

    let mut states = Vec::with_capacity(horizon);
    let baseline = [0.0; N];
    states.push(baseline);

    // The baseline contributes nothing, so period 1 is the impulse itself
    let mut first = matrix.apply(&baseline);
    for (x, e) in first.iter_mut().zip(impulse.iter()) {
        *x += e;
    }
    check_finite(1, &first)?;
    states.push(first);

    for t in 2..horizon {
        let factor = propagation.factor(t);
        let next = matrix.apply(&states[t - 1]).map(|v| v * factor);
        check_finite(t, &next)?;
        states.push(next);
    }

    debug!(horizon, propagation = ?propagation, "Propagated impulse response");

    Ok(Trajectory { states })
}

fn check_finite<const N: usize>(period: usize, state: &[f64; N]) -> Result<(), PropagationError> {
    match state.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(PropagationError::NonFinite { period, index }),
        None => Ok(()),
    }
}

//! Linearized state-space model of Cameroon's economy (BEAC zone)
//!
//! A stylized DSGE-style simulator: a hand-specified 15x15 transition matrix
//! propagates structural shocks through the macro variables below. Around the
//! impulse responses sit the model's illustrative companions:
//!
//! - Variance decomposition: calibrated priors plus seeded noise, row-normalized
//! - Historical decomposition: scripted shock episodes since 2015
//! - Posterior draws: sampled directly from fixed hyperparameters
//!
//! Nothing here is solved or estimated. The decompositions are not derived
//! from the transition matrix, and the posteriors are not conditioned on data.
//!
//! Key types:
//! - [`StateSpaceSimulator`]: immutable engine owning matrix, catalogs and config
//! - [`ShockCatalog`]: the 12-shock complete model or the 5-shock simple model
//! - [`ModelConfig`]: propagation mode, persistence schedule, seeds

pub mod analysis;
pub mod config;
pub mod decomposition;
pub mod error;
pub mod output;
pub mod posterior;
pub mod report;
pub mod shocks;
pub mod simulator;
pub mod transition;

use serde::{Deserialize, Serialize};

pub use config::{CatalogVariant, ModelConfig, PropagationMode};
pub use error::{DsgeError, Result};
pub use shocks::{ShockCatalog, ShockDefinition};
pub use simulator::{ImpulseResponse, StateSpaceSimulator};

/// Number of variables in the state vector
pub const NUM_VARIABLES: usize = 15;

/// One period's values, indexed by [`Variable::index`]
pub type State = [f64; NUM_VARIABLES];

/// The model's macro variables, in state-vector order
///
/// The discriminant is the row/column of the transition matrix and the
/// coordinate that shock impulses write to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Variable {
    Output,
    Consumption,
    Investment,
    Inflation,
    InterestRate,
    RealWage,
    Labor,
    NetExports,
    GovernmentSpending,
    TaxRevenue,
    PublicDebt,
    Credit,
    BankingSpread,
    RealExchangeRate,
    OutputGap,
}

impl Variable {
    pub const ALL: [Variable; NUM_VARIABLES] = [
        Variable::Output,
        Variable::Consumption,
        Variable::Investment,
        Variable::Inflation,
        Variable::InterestRate,
        Variable::RealWage,
        Variable::Labor,
        Variable::NetExports,
        Variable::GovernmentSpending,
        Variable::TaxRevenue,
        Variable::PublicDebt,
        Variable::Credit,
        Variable::BankingSpread,
        Variable::RealExchangeRate,
        Variable::OutputGap,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Display name, also used as the CSV column header
    pub fn name(self) -> &'static str {
        match self {
            Variable::Output => "Output",
            Variable::Consumption => "Consumption",
            Variable::Investment => "Investment",
            Variable::Inflation => "Inflation",
            Variable::InterestRate => "Interest Rate",
            Variable::RealWage => "Real Wage",
            Variable::Labor => "Labor",
            Variable::NetExports => "Net Exports",
            Variable::GovernmentSpending => "Government Spending",
            Variable::TaxRevenue => "Tax Revenue",
            Variable::PublicDebt => "Public Debt",
            Variable::Credit => "Credit",
            Variable::BankingSpread => "Banking Spread",
            Variable::RealExchangeRate => "Real Exchange Rate",
            Variable::OutputGap => "Output Gap",
        }
    }

    /// Short identifier used by the BEAC model documentation
    pub fn code(self) -> &'static str {
        match self {
            Variable::Output => "PIB",
            Variable::Consumption => "Consommation",
            Variable::Investment => "Investissement",
            Variable::Inflation => "Inflation",
            Variable::InterestRate => "Taux_Interet",
            Variable::RealWage => "Salaire_Reel",
            Variable::Labor => "Travail",
            Variable::NetExports => "Exportations_Nettes",
            Variable::GovernmentSpending => "Depenses_Publiques",
            Variable::TaxRevenue => "Recettes_Fiscales",
            Variable::PublicDebt => "Dette_Publique",
            Variable::Credit => "Credit",
            Variable::BankingSpread => "Spread_Bancaire",
            Variable::RealExchangeRate => "Taux_Change_Reel",
            Variable::OutputGap => "Output_Gap",
        }
    }

    /// Look up a variable by display name or code
    pub fn parse(label: &str) -> Option<Variable> {
        Variable::ALL
            .into_iter()
            .find(|v| v.name() == label || v.code() == label)
    }
}

impl std::fmt::Display for Variable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

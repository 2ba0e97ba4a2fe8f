//! Structural shock catalogs
//!
//! Each shock is plain data: display metadata, the coefficients that turn an
//! amplitude into an impulse on the state vector, and the scripted episode
//! pattern used by the historical decomposition.
//!
//! Two catalogs ship with the model:
//! - [`ShockCatalog::complete`]: all 12 structural shocks
//! - [`ShockCatalog::simple`]: the 5 core shocks (monetary, fiscal,
//!   productivity, risk, oil price)

use serde::Serialize;

use crate::{DsgeError, Result, State, Variable, NUM_VARIABLES};

/// Keys of the shocks kept by the simple model
pub const SIMPLE_SHOCK_KEYS: [&str; 5] =
    ["monetary", "fiscal", "productivity", "risk", "oil_price"];

/// Linear ramp over quarters `[start, end)`, hitting `from` and `to` at the ends
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Episode {
    pub start: usize,
    pub end: usize,
    pub from: f64,
    pub to: f64,
}

impl Episode {
    pub const fn new(start: usize, end: usize, from: f64, to: f64) -> Self {
        Episode {
            start,
            end,
            from,
            to,
        }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Value of the ramp at `quarter`, `None` outside the episode
    pub fn value_at(&self, quarter: usize) -> Option<f64> {
        if quarter < self.start || quarter >= self.end {
            return None;
        }
        let len = self.len();
        let i = quarter - self.start;
        if len == 1 {
            return Some(self.from);
        }
        if i == len - 1 {
            return Some(self.to);
        }
        let step = (self.to - self.from) / (len - 1) as f64;
        Some(self.from + step * i as f64)
    }
}

/// Shape of a shock's contribution in the historical decomposition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum HistoricalPattern {
    /// Contributes nothing over the sample
    Quiet,
    /// Hand-dated episodes; quarters outside every episode are zero
    Episodes(Vec<Episode>),
    /// Cumulative sum of Normal(drift, volatility) increments
    RandomWalk { drift: f64, volatility: f64 },
}

/// A structural shock and its transmission coefficients
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShockDefinition {
    pub key: String,
    pub name: String,
    pub description: String,
    /// Chart color, hex
    pub color: String,
    /// Variables worth charting for this shock (informational)
    pub affected: Vec<Variable>,
    /// Impact coefficients: an amplitude `a` moves `variable` by `a * coefficient`
    pub impulses: Vec<(Variable, f64)>,
    pub history: HistoricalPattern,
}

impl ShockDefinition {
    pub fn new(key: &str, name: &str, description: &str, color: &str) -> Self {
        ShockDefinition {
            key: key.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            color: color.to_string(),
            affected: Vec::new(),
            impulses: Vec::new(),
            history: HistoricalPattern::Quiet,
        }
    }

    pub fn affecting(mut self, variables: &[Variable]) -> Self {
        self.affected = variables.to_vec();
        self
    }

    pub fn impulse(mut self, variable: Variable, coefficient: f64) -> Self {
        self.impulses.push((variable, coefficient));
        self
    }

    pub fn history(mut self, pattern: HistoricalPattern) -> Self {
        self.history = pattern;
        self
    }

    /// Total impact coefficient on `variable` (zero if untouched)
    pub fn coefficient(&self, variable: Variable) -> f64 {
        self.impulses
            .iter()
            .filter(|(v, _)| *v == variable)
            .map(|(_, c)| c)
            .sum()
    }

    /// Sparse shock vector for an amplitude; untouched coordinates stay zero
    pub fn impulse_vector(&self, amplitude: f64) -> State {
        let mut vector = [0.0; NUM_VARIABLES];
        for &(variable, coefficient) in &self.impulses {
            vector[variable.index()] += amplitude * coefficient;
        }
        vector
    }
}

fn complete_shocks() -> Vec<ShockDefinition> {
    use Variable::*;

    vec![
        ShockDefinition::new(
            "monetary",
            "Monetary Policy Shock",
            "Unexpected change in the BEAC tender rate (TIAO)",
            "#FF6B6B",
        )
        .affecting(&[InterestRate, Inflation, Credit, Output])
        .impulse(InterestRate, 1.0)
        .impulse(Credit, -0.8)
        .impulse(Investment, -0.6)
        .history(HistoricalPattern::Episodes(vec![
            // COVID-19 easing, then the 2023 tightening
            Episode::new(12, 16, -0.4, -0.2),
            Episode::new(18, 20, 0.1, 0.3),
        ])),
        ShockDefinition::new(
            "fiscal",
            "Fiscal Shock",
            "Change in government spending",
            "#4ECDC4",
        )
        .affecting(&[GovernmentSpending, PublicDebt, Output, Inflation])
        .impulse(GovernmentSpending, 1.0)
        .impulse(Output, 0.6)
        .impulse(PublicDebt, 0.8)
        .history(HistoricalPattern::Episodes(vec![
            // COVID-19 stimulus, then consolidation
            Episode::new(12, 16, 0.3, 0.5),
            Episode::new(18, 20, -0.1, -0.2),
        ])),
        ShockDefinition::new(
            "productivity",
            "Productivity Shock (TFP)",
            "Technology shock to the production function",
            "#45B7D1",
        )
        .affecting(&[Output, RealWage, Labor, Investment])
        .impulse(Output, 1.0)
        .impulse(RealWage, 0.7)
        .impulse(Inflation, -0.3)
        .history(HistoricalPattern::RandomWalk {
            drift: 0.01,
            volatility: 0.02,
        }),
        ShockDefinition::new(
            "risk",
            "Risk Premium Shock",
            "Change in the credit spread and country risk premium",
            "#96CEB4",
        )
        .affecting(&[BankingSpread, Credit, Investment, RealExchangeRate])
        .impulse(BankingSpread, 1.0)
        .impulse(Credit, -0.9)
        .impulse(RealExchangeRate, 0.5)
        .history(HistoricalPattern::Episodes(vec![
            // COVID-19 risk spike
            Episode::new(12, 14, 0.4, 0.6),
        ])),
        ShockDefinition::new(
            "oil_price",
            "Oil Price Shock",
            "Change in the terms of trade",
            "#FECA57",
        )
        .affecting(&[NetExports, Inflation, RealExchangeRate, Output])
        .impulse(NetExports, 0.8)
        .impulse(Inflation, 0.4)
        .impulse(Output, 0.3)
        .history(HistoricalPattern::Episodes(vec![
            // 2015-2016 oil slump, 2021-2022 recovery
            Episode::new(0, 8, -0.3, -0.1),
            Episode::new(16, 20, 0.2, 0.4),
        ])),
        ShockDefinition::new(
            "preference",
            "Preference Shock",
            "Shock to household consumption preferences",
            "#FF9FF3",
        )
        .affecting(&[Consumption, Output, Labor, RealWage])
        .impulse(Consumption, 1.0)
        .impulse(Labor, -0.5)
        .impulse(RealWage, 0.3),
        ShockDefinition::new(
            "investment",
            "Investment Shock",
            "Shock to investment adjustment costs",
            "#54A0FF",
        )
        .affecting(&[Investment, Output, Credit, InterestRate])
        .impulse(Investment, 1.0)
        .impulse(Output, 0.7)
        .impulse(Credit, 0.6),
        ShockDefinition::new(
            "markup",
            "Markup Shock",
            "Cost-push shock to firms' price markups",
            "#5F27CD",
        )
        .affecting(&[Inflation, Output, RealWage, OutputGap])
        .impulse(Inflation, 1.0)
        .impulse(Output, -0.4)
        .impulse(RealWage, -0.2),
        ShockDefinition::new(
            "monetary_policy",
            "Monetary Rule Shock",
            "Deviation from the Taylor rule",
            "#FF9F43",
        )
        .affecting(&[InterestRate, Inflation, OutputGap, Credit])
        .impulse(InterestRate, 1.2)
        .impulse(OutputGap, -0.5)
        .impulse(Inflation, -0.3),
        ShockDefinition::new(
            "fiscal_rule",
            "Fiscal Rule Shock",
            "Deviation from the fiscal rule",
            "#10AC84",
        )
        .affecting(&[TaxRevenue, PublicDebt, Output, GovernmentSpending])
        .impulse(TaxRevenue, 1.0)
        .impulse(GovernmentSpending, -0.5)
        .impulse(PublicDebt, -0.3),
        ShockDefinition::new(
            "external",
            "External Shock",
            "Shock to international interest rates",
            "#00D2D3",
        )
        .affecting(&[RealExchangeRate, NetExports, InterestRate, Output])
        .impulse(RealExchangeRate, 1.0)
        .impulse(InterestRate, 0.3)
        .impulse(NetExports, -0.4),
        ShockDefinition::new(
            "financial",
            "Financial Shock",
            "Shock to liquidity constraints",
            "#FF3838",
        )
        .affecting(&[Credit, BankingSpread, Investment, Consumption])
        .impulse(Credit, -1.0)
        .impulse(BankingSpread, 1.5)
        .impulse(Investment, -0.8),
    ]
}

/// Ordered, immutable set of shock definitions keyed by `key`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShockCatalog {
    shocks: Vec<ShockDefinition>,
}

impl ShockCatalog {
    /// Build a custom catalog
    ///
    /// Rejects empty catalogs, duplicate keys and non-finite coefficients.
    pub fn new(shocks: Vec<ShockDefinition>) -> Result<Self> {
        if shocks.is_empty() {
            return Err(DsgeError::invalid_parameter(
                "shock catalog",
                "at least one shock is required",
            ));
        }
        for (i, shock) in shocks.iter().enumerate() {
            if shocks[..i].iter().any(|s| s.key == shock.key) {
                return Err(DsgeError::DuplicateShockType {
                    key: shock.key.clone(),
                });
            }
            if shock.impulses.iter().any(|(_, c)| !c.is_finite()) {
                return Err(DsgeError::invalid_parameter(
                    &shock.key,
                    "impulse coefficients must be finite",
                ));
            }
        }
        Ok(ShockCatalog { shocks })
    }

    /// All 12 structural shocks of the complete model
    pub fn complete() -> Self {
        ShockCatalog {
            shocks: complete_shocks(),
        }
    }

    /// The 5 core shocks of the simple model
    pub fn simple() -> Self {
        let shocks = complete_shocks()
            .into_iter()
            .filter(|s| SIMPLE_SHOCK_KEYS.contains(&s.key.as_str()))
            .collect();
        ShockCatalog { shocks }
    }

    pub fn get(&self, key: &str) -> Result<&ShockDefinition> {
        self.shocks
            .iter()
            .find(|s| s.key == key)
            .ok_or_else(|| DsgeError::InvalidShockType {
                key: key.to_string(),
            })
    }

    pub fn contains(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    pub fn position(&self, key: &str) -> Option<usize> {
        self.shocks.iter().position(|s| s.key == key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.shocks.iter().map(|s| s.key.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ShockDefinition> {
        self.shocks.iter()
    }

    pub fn len(&self) -> usize {
        self.shocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shocks.is_empty()
    }
}

impl<'a> IntoIterator for &'a ShockCatalog {
    type Item = &'a ShockDefinition;
    type IntoIter = std::slice::Iter<'a, ShockDefinition>;

    fn into_iter(self) -> Self::IntoIter {
        self.shocks.iter()
    }
}

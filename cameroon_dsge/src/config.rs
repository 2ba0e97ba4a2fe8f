//! Model configuration
//!
//! Presets mirror the two model variants; any field can be overridden from a
//! TOML file:
//!
//! ```toml
//! variant = "complete"
//! propagation = "pure_matrix"
//! variance_seed = 7
//! historical_start = "2015-01-01"
//! batch_threads = 4
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use statespace::{PersistenceSchedule, Propagation};
use std::fs;
use std::path::Path;

use crate::{DsgeError, Result};

/// Seed shared by the decomposition and posterior generators
pub const DEFAULT_SEED: u64 = 42;

/// Which shock catalog the simulator is built with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogVariant {
    /// 12 structural shocks
    Complete,
    /// 5 core shocks
    Simple,
}

/// Period-to-period propagation rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropagationMode {
    /// Matrix step followed by the persistence factor
    PersistenceDecay,
    /// Matrix step only
    PureMatrix,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub variant: CatalogVariant,
    pub propagation: PropagationMode,

    // Persistence schedule (ignored in pure-matrix mode)
    pub persistence_early: f64,
    pub persistence_late: f64,
    pub persistence_switch_period: usize,

    // Generator seeds
    pub variance_seed: u64,
    pub historical_seed: u64,
    pub posterior_seed: u64,

    /// First day of the historical sample; dates are the following quarter ends
    pub historical_start: NaiveDate,

    /// Threads for batch impulse responses; `None` uses rayon's global pool
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_threads: Option<usize>,
}

impl ModelConfig {
    /// Complete model: 12 shocks, persistence decay 0.8 then 0.9 from period 8
    pub fn complete() -> Self {
        let schedule = PersistenceSchedule::default();
        ModelConfig {
            variant: CatalogVariant::Complete,
            propagation: PropagationMode::PersistenceDecay,
            persistence_early: schedule.early,
            persistence_late: schedule.late,
            persistence_switch_period: schedule.switch_period,
            variance_seed: DEFAULT_SEED,
            historical_seed: DEFAULT_SEED,
            posterior_seed: DEFAULT_SEED,
            historical_start: NaiveDate::from_ymd_opt(2015, 1, 1).unwrap_or_default(),
            batch_threads: None,
        }
    }

    /// Simple model: 5 shocks, pure matrix propagation
    pub fn simple() -> Self {
        ModelConfig {
            variant: CatalogVariant::Simple,
            propagation: PropagationMode::PureMatrix,
            ..Self::complete()
        }
    }

    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: ModelConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let source = fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Reject persistence factors that could not produce finite paths, and
    /// an empty thread pool
    pub fn validate(&self) -> Result<()> {
        if self.batch_threads == Some(0) {
            return Err(DsgeError::invalid_parameter(
                "batch_threads",
                "at least one thread is required".to_string(),
            ));
        }
        for (name, value) in [
            ("persistence_early", self.persistence_early),
            ("persistence_late", self.persistence_late),
        ] {
            if !value.is_finite() {
                return Err(DsgeError::invalid_parameter(name, format!("{value} is not finite")));
            }
        }
        Ok(())
    }

    pub fn persistence_schedule(&self) -> PersistenceSchedule {
        PersistenceSchedule {
            early: self.persistence_early,
            late: self.persistence_late,
            switch_period: self.persistence_switch_period,
        }
    }

    /// Engine propagation rule for this configuration
    pub fn propagation(&self) -> Propagation {
        match self.propagation {
            PropagationMode::PersistenceDecay => {
                Propagation::PersistenceDecay(self.persistence_schedule())
            }
            PropagationMode::PureMatrix => Propagation::PureMatrix,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        ModelConfig::complete()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complete_preset_uses_persistence_decay() {
        let config = ModelConfig::complete();
        assert_eq!(config.variant, CatalogVariant::Complete);
        assert_eq!(
            config.propagation(),
            Propagation::PersistenceDecay(PersistenceSchedule {
                early: 0.8,
                late: 0.9,
                switch_period: 8
            })
        );
        assert_eq!(config.variance_seed, 42);
        assert_eq!(
            config.historical_start,
            NaiveDate::from_ymd_opt(2015, 1, 1).unwrap()
        );
    }

    #[test]
    fn simple_preset_uses_pure_matrix() {
        let config = ModelConfig::simple();
        assert_eq!(config.variant, CatalogVariant::Simple);
        assert_eq!(config.propagation(), Propagation::PureMatrix);
    }

    #[test]
    fn toml_overrides_defaults() {
        let config = ModelConfig::from_toml_str(
            r#"
            variant = "simple"
            propagation = "persistence_decay"
            persistence_late = 0.95
            variance_seed = 7
            historical_start = "2018-04-01"
            "#,
        )
        .unwrap();

        assert_eq!(config.variant, CatalogVariant::Simple);
        assert_eq!(config.propagation, PropagationMode::PersistenceDecay);
        assert_eq!(config.persistence_early, 0.8);
        assert_eq!(config.persistence_late, 0.95);
        assert_eq!(config.variance_seed, 7);
        assert_eq!(config.posterior_seed, 42);
        assert_eq!(
            config.historical_start,
            NaiveDate::from_ymd_opt(2018, 4, 1).unwrap()
        );
    }

    #[test]
    fn empty_toml_is_complete_preset() {
        assert_eq!(
            ModelConfig::from_toml_str("").unwrap(),
            ModelConfig::complete()
        );
    }

    #[test]
    fn unknown_variant_is_a_config_error() {
        let err = ModelConfig::from_toml_str(r#"variant = "huge""#).unwrap_err();
        assert!(matches!(err, DsgeError::Config(_)));
    }

    #[test]
    fn non_finite_persistence_is_rejected() {
        let config = ModelConfig {
            persistence_early: f64::INFINITY,
            ..ModelConfig::complete()
        };
        assert!(matches!(
            config.validate(),
            Err(DsgeError::InvalidParameterConfiguration { .. })
        ));
    }

    #[test]
    fn batch_threads_defaults_to_global_pool() {
        assert_eq!(ModelConfig::complete().batch_threads, None);

        let config = ModelConfig::from_toml_str("batch_threads = 3").unwrap();
        assert_eq!(config.batch_threads, Some(3));

        assert!(matches!(
            ModelConfig::from_toml_str("batch_threads = 0"),
            Err(DsgeError::InvalidParameterConfiguration { .. })
        ));
    }

    #[test]
    fn round_trips_through_toml() {
        let config = ModelConfig::simple();
        let text = toml::to_string(&config).unwrap();
        assert_eq!(ModelConfig::from_toml_str(&text).unwrap(), config);
    }
}

//! Calculator configuration read from environment variables
//!
//!   FINCALC_TAX_TABLE         CSV bracket table (filing_status,min,max,rate)
//!   FINCALC_TAX_YEAR          year label for FINCALC_TAX_TABLE
//!   FINCALC_STATE_TAX_RATE    default flat state rate in percent
//!   FINCALC_SCHEDULE_PREVIEW  payoff periods printed by the CLI

use log::{info, warn};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::Result;
use crate::tax::{load_tax_schedule, TaxSchedule, DEFAULT_TAX_YEAR};

pub const DEFAULT_STATE_TAX_RATE_PCT: f64 = 5.0;
pub const DEFAULT_SCHEDULE_PREVIEW: usize = 36;

#[derive(Debug, Clone, PartialEq)]
pub struct CalculatorConfig {
    pub tax_table_path: Option<PathBuf>,
    pub tax_year: u32,
    pub state_tax_rate_pct: f64,
    pub schedule_preview: usize,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            tax_table_path: None,
            tax_year: DEFAULT_TAX_YEAR,
            state_tax_rate_pct: DEFAULT_STATE_TAX_RATE_PCT,
            schedule_preview: DEFAULT_SCHEDULE_PREVIEW,
        }
    }
}

/// Parse `value`, warning and returning `None` when it does not parse
fn parse_setting<T: FromStr>(name: &str, value: Option<String>) -> Option<T> {
    let raw = value?;
    match raw.trim().parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            warn!("ignoring {}={:?}: not a valid value", name, raw);
            None
        }
    }
}

impl CalculatorConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from any variable lookup (the process environment, a test map)
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let state_tax_rate_pct = parse_setting::<f64>(
            "FINCALC_STATE_TAX_RATE",
            lookup("FINCALC_STATE_TAX_RATE"),
        )
        .filter(|rate| {
            let valid = rate.is_finite() && *rate >= 0.0;
            if !valid {
                warn!("ignoring negative or non-finite FINCALC_STATE_TAX_RATE {}", rate);
            }
            valid
        })
        .unwrap_or(defaults.state_tax_rate_pct);

        Self {
            tax_table_path: lookup("FINCALC_TAX_TABLE")
                .filter(|path| !path.trim().is_empty())
                .map(PathBuf::from),
            tax_year: parse_setting("FINCALC_TAX_YEAR", lookup("FINCALC_TAX_YEAR"))
                .unwrap_or(defaults.tax_year),
            state_tax_rate_pct,
            schedule_preview: parse_setting(
                "FINCALC_SCHEDULE_PREVIEW",
                lookup("FINCALC_SCHEDULE_PREVIEW"),
            )
            .unwrap_or(defaults.schedule_preview),
        }
    }

    /// Bracket tables from `tax_table_path`, or the built-in federal tables
    pub fn tax_schedule(&self) -> Result<TaxSchedule> {
        match &self.tax_table_path {
            Some(path) => {
                info!("loading {} tax brackets from {}", self.tax_year, path.display());
                load_tax_schedule(path, self.tax_year)
            }
            None => Ok(TaxSchedule::federal_2023()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> CalculatorConfig {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        CalculatorConfig::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn test_defaults_without_env() {
        let config = config_from(&[]);
        assert_eq!(config, CalculatorConfig::default());
        assert_eq!(config.state_tax_rate_pct, 5.0);
        assert_eq!(config.schedule_preview, 36);
        assert_eq!(config.tax_year, 2023);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("FINCALC_STATE_TAX_RATE", "4.25"),
            ("FINCALC_SCHEDULE_PREVIEW", "12"),
            ("FINCALC_TAX_TABLE", "/tmp/brackets.csv"),
            ("FINCALC_TAX_YEAR", "2024"),
        ]);
        assert_eq!(config.state_tax_rate_pct, 4.25);
        assert_eq!(config.schedule_preview, 12);
        assert_eq!(config.tax_table_path, Some(PathBuf::from("/tmp/brackets.csv")));
        assert_eq!(config.tax_year, 2024);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = config_from(&[
            ("FINCALC_STATE_TAX_RATE", "-3"),
            ("FINCALC_SCHEDULE_PREVIEW", "lots"),
            ("FINCALC_TAX_TABLE", "  "),
        ]);
        assert_eq!(config, CalculatorConfig::default());
    }

    #[test]
    fn test_builtin_schedule_without_table() {
        let schedule = config_from(&[]).tax_schedule().unwrap();
        assert_eq!(schedule.year, 2023);
    }

    #[test]
    fn test_missing_table_file_is_error() {
        let config = config_from(&[("FINCALC_TAX_TABLE", "/nonexistent/brackets.csv")]);
        assert!(config.tax_schedule().is_err());
    }
}

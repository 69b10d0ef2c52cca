//! Marginal tax bracket tables

use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CalcError, Result};

/// Tax year of the built-in federal tables
pub const DEFAULT_TAX_YEAR: u32 = 2023;

/// One marginal bracket: income in [min, max) is taxed at `rate`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxBracket {
    pub min: f64,
    /// Upper bound; `None` for the unbounded top bracket
    pub max: Option<f64>,
    /// Marginal rate as a fraction (0.22 = 22%)
    pub rate: f64,
}

impl TaxBracket {
    pub const fn new(min: f64, max: Option<f64>, rate: f64) -> Self {
        Self { min, max, rate }
    }

    /// Income that fits in this bracket
    pub fn width(&self) -> f64 {
        self.max.map_or(f64::INFINITY, |max| max - self.min)
    }

    pub fn contains(&self, income: f64) -> bool {
        income > self.min && self.max.map_or(true, |max| income <= max)
    }
}

/// Ascending, gapless brackets starting at zero and ending unbounded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<TaxBracket>", into = "Vec<TaxBracket>")]
pub struct BracketTable {
    brackets: Vec<TaxBracket>,
}

impl BracketTable {
    pub fn new(brackets: Vec<TaxBracket>) -> Result<Self> {
        let first = brackets
            .first()
            .ok_or_else(|| CalcError::InvalidBracketTable("no brackets".to_string()))?;
        if first.min != 0.0 {
            return Err(CalcError::InvalidBracketTable(format!(
                "first bracket starts at {} instead of 0",
                first.min
            )));
        }

        for (i, bracket) in brackets.iter().enumerate() {
            if !(0.0..=1.0).contains(&bracket.rate) {
                return Err(CalcError::InvalidBracketTable(format!(
                    "bracket {} rate {} is outside [0, 1]",
                    i + 1,
                    bracket.rate
                )));
            }
            match (bracket.max, brackets.get(i + 1)) {
                (Some(max), Some(next)) => {
                    if max <= bracket.min {
                        return Err(CalcError::InvalidBracketTable(format!(
                            "bracket {} is empty or inverted",
                            i + 1
                        )));
                    }
                    if next.min != max {
                        return Err(CalcError::InvalidBracketTable(format!(
                            "bracket {} ends at {} but bracket {} starts at {}",
                            i + 1,
                            max,
                            i + 2,
                            next.min
                        )));
                    }
                }
                (None, Some(_)) => {
                    return Err(CalcError::InvalidBracketTable(format!(
                        "unbounded bracket {} is not the last",
                        i + 1
                    )));
                }
                (Some(_), None) => {
                    return Err(CalcError::InvalidBracketTable(
                        "top bracket must be unbounded".to_string(),
                    ));
                }
                (None, None) => {}
            }
        }

        Ok(Self { brackets })
    }

    pub fn brackets(&self) -> &[TaxBracket] {
        &self.brackets
    }

    /// Marginal tax owed on `income`; zero for non-positive income
    pub fn tax_on(&self, income: f64) -> f64 {
        let mut remaining = income;
        let mut tax = 0.0;

        for bracket in &self.brackets {
            if !(remaining > 0.0) {
                break;
            }
            let taxable = remaining.min(bracket.width());
            tax += taxable * bracket.rate;
            remaining -= taxable;
        }

        tax
    }

    /// Bracket whose range contains `income`
    pub fn marginal_bracket(&self, income: f64) -> Option<&TaxBracket> {
        self.brackets.iter().find(|b| b.contains(income))
    }
}

impl TryFrom<Vec<TaxBracket>> for BracketTable {
    type Error = CalcError;

    fn try_from(brackets: Vec<TaxBracket>) -> Result<Self> {
        BracketTable::new(brackets)
    }
}

impl From<BracketTable> for Vec<TaxBracket> {
    fn from(table: BracketTable) -> Self {
        table.brackets
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilingStatus {
    #[default]
    Single,
    Married,
}

impl FilingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            FilingStatus::Single => "single",
            FilingStatus::Married => "married",
        }
    }
}

impl fmt::Display for FilingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilingStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" => Ok(FilingStatus::Single),
            "married" | "married_joint" | "married-joint" => Ok(FilingStatus::Married),
            other => Err(format!("unknown filing status: {}", other)),
        }
    }
}

/// Bracket table chosen for a filing status string
#[derive(Debug, Clone, Copy)]
pub struct ResolvedTable<'a> {
    pub status: FilingStatus,
    /// True when the requested status was unknown and `single` was used
    pub fell_back: bool,
    pub table: &'a BracketTable,
}

/// Bracket tables for every filing status in one tax year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxSchedule {
    pub year: u32,
    pub single: BracketTable,
    pub married: BracketTable,
}

impl TaxSchedule {
    pub fn new(year: u32, single: BracketTable, married: BracketTable) -> Self {
        Self {
            year,
            single,
            married,
        }
    }

    /// 2023 federal brackets
    pub fn federal_2023() -> Self {
        let single = vec![
            TaxBracket::new(0.0, Some(10_275.0), 0.10),
            TaxBracket::new(10_275.0, Some(41_775.0), 0.12),
            TaxBracket::new(41_775.0, Some(89_075.0), 0.22),
            TaxBracket::new(89_075.0, Some(170_050.0), 0.24),
            TaxBracket::new(170_050.0, Some(215_950.0), 0.32),
            TaxBracket::new(215_950.0, Some(539_900.0), 0.35),
            TaxBracket::new(539_900.0, None, 0.37),
        ];
        let married = vec![
            TaxBracket::new(0.0, Some(20_550.0), 0.10),
            TaxBracket::new(20_550.0, Some(83_550.0), 0.12),
            TaxBracket::new(83_550.0, Some(178_150.0), 0.22),
            TaxBracket::new(178_150.0, Some(340_100.0), 0.24),
            TaxBracket::new(340_100.0, Some(431_900.0), 0.32),
            TaxBracket::new(431_900.0, Some(647_850.0), 0.35),
            TaxBracket::new(647_850.0, None, 0.37),
        ];

        // Literal tables above are ordered and gapless
        Self::new(
            DEFAULT_TAX_YEAR,
            BracketTable { brackets: single },
            BracketTable { brackets: married },
        )
    }

    pub fn table(&self, status: FilingStatus) -> &BracketTable {
        match status {
            FilingStatus::Single => &self.single,
            FilingStatus::Married => &self.married,
        }
    }

    /// Pick the table for `filing_status`, falling back to `single` (with a
    /// warning) when the status is not recognized.
    pub fn resolve(&self, filing_status: &str) -> ResolvedTable<'_> {
        match filing_status.parse::<FilingStatus>() {
            Ok(status) => ResolvedTable {
                status,
                fell_back: false,
                table: self.table(status),
            },
            Err(reason) => {
                warn!("{}; using single filer brackets", reason);
                ResolvedTable {
                    status: FilingStatus::Single,
                    fell_back: true,
                    table: &self.single,
                }
            }
        }
    }
}

impl Default for TaxSchedule {
    fn default() -> Self {
        Self::federal_2023()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_tables_validate() {
        let schedule = TaxSchedule::federal_2023();
        assert!(BracketTable::new(schedule.single.brackets().to_vec()).is_ok());
        assert!(BracketTable::new(schedule.married.brackets().to_vec()).is_ok());
    }

    #[test]
    fn test_single_2023_at_50k() {
        let schedule = TaxSchedule::federal_2023();
        let tax = schedule.single.tax_on(50_000.0);
        let expected = 10_275.0 * 0.10 + (41_775.0 - 10_275.0) * 0.12 + (50_000.0 - 41_775.0) * 0.22;
        assert!((tax - expected).abs() < 1e-6);
        assert!((tax - 6617.0).abs() < 1e-6);
    }

    #[test]
    fn test_unbounded_top_bracket() {
        let schedule = TaxSchedule::federal_2023();
        let at_top = schedule.single.tax_on(539_900.0);
        let above = schedule.single.tax_on(1_539_900.0);
        assert!((above - at_top - 370_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_non_positive_income_owes_nothing() {
        let schedule = TaxSchedule::federal_2023();
        assert_eq!(schedule.single.tax_on(0.0), 0.0);
        assert_eq!(schedule.single.tax_on(-500.0), 0.0);
        assert_eq!(schedule.single.tax_on(f64::NAN), 0.0);
    }

    #[test]
    fn test_unknown_status_falls_back_to_single() {
        let schedule = TaxSchedule::federal_2023();
        let resolved = schedule.resolve("head_of_household");
        assert!(resolved.fell_back);
        assert_eq!(resolved.status, FilingStatus::Single);

        let resolved = schedule.resolve("Married");
        assert!(!resolved.fell_back);
        assert_eq!(resolved.status, FilingStatus::Married);
        assert_eq!(resolved.table.brackets()[0].max, Some(20_550.0));
    }

    #[test]
    fn test_gap_rejected() {
        let result = BracketTable::new(vec![
            TaxBracket::new(0.0, Some(100.0), 0.1),
            TaxBracket::new(150.0, None, 0.2),
        ]);
        assert!(matches!(result, Err(CalcError::InvalidBracketTable(_))));
    }

    #[test]
    fn test_bounded_top_rejected() {
        let result = BracketTable::new(vec![TaxBracket::new(0.0, Some(100.0), 0.1)]);
        assert!(result.is_err());
    }

    #[test]
    fn test_marginal_bracket() {
        let schedule = TaxSchedule::federal_2023();
        assert_eq!(schedule.single.marginal_bracket(50_000.0).unwrap().rate, 0.22);
        assert_eq!(schedule.single.marginal_bracket(10_275.0).unwrap().rate, 0.10);
        assert_eq!(schedule.single.marginal_bracket(900_000.0).unwrap().rate, 0.37);
        assert!(schedule.single.marginal_bracket(0.0).is_none());
    }

    #[test]
    fn test_table_deserializes_with_validation() {
        let json = r#"[{"min":0,"max":100,"rate":0.1},{"min":100,"max":null,"rate":0.2}]"#;
        let table: BracketTable = serde_json::from_str(json).unwrap();
        assert_eq!(table.brackets().len(), 2);

        let bad = r#"[{"min":5,"max":null,"rate":0.1}]"#;
        assert!(serde_json::from_str::<BracketTable>(bad).is_err());
    }
}

//! Single-period balance step shared by every engine

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CalcError;

/// Outcome of advancing a balance by one period
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeriodStep {
    /// Balance after interest and cash flow
    pub balance: f64,
    /// Interest accrued on the opening balance
    pub interest: f64,
}

/// Advance `balance` by one period.
///
/// Interest accrues on the opening balance, then `cash_flow` is applied:
/// positive for contributions, negative for payments and withdrawals.
pub fn step(balance: f64, periodic_rate: f64, cash_flow: f64) -> PeriodStep {
    let interest = balance * periodic_rate;
    PeriodStep {
        balance: balance + interest + cash_flow,
        interest,
    }
}

/// Nominal return adjusted for inflation: (1 + r) / (1 + i) - 1
pub fn real_rate(annual_return: f64, inflation: f64) -> f64 {
    (1.0 + annual_return) / (1.0 + inflation) - 1.0
}

/// Compounding periods per year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompoundingFrequency {
    #[default]
    Monthly,
    Quarterly,
    Annually,
}

impl CompoundingFrequency {
    pub fn periods_per_year(self) -> u32 {
        match self {
            CompoundingFrequency::Monthly => 12,
            CompoundingFrequency::Quarterly => 4,
            CompoundingFrequency::Annually => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CompoundingFrequency::Monthly => "monthly",
            CompoundingFrequency::Quarterly => "quarterly",
            CompoundingFrequency::Annually => "annually",
        }
    }
}

impl fmt::Display for CompoundingFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompoundingFrequency {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monthly" | "12" => Ok(CompoundingFrequency::Monthly),
            "quarterly" | "4" => Ok(CompoundingFrequency::Quarterly),
            "annually" | "annual" | "yearly" | "1" => Ok(CompoundingFrequency::Annually),
            other => Err(CalcError::UnknownFrequency(other.to_string())),
        }
    }
}

//! Debt records and payoff plan output structures

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{non_negative, CalcError, Result};

/// Hard cap on simulated payoff periods (50 years of monthly payments)
pub const MAX_PAYOFF_PERIODS: u32 = 600;

/// A single debt being paid down
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Debt {
    pub name: String,

    /// Balance when the plan starts
    pub original_balance: f64,

    /// Outstanding balance
    pub balance: f64,

    /// Interest rate per period (monthly for payoff plans)
    pub periodic_rate: f64,

    /// Minimum payment due every period
    pub min_payment: f64,

    /// Interest accrued so far
    #[serde(default)]
    pub interest_paid: f64,

    /// Period in which the balance reached zero
    #[serde(default)]
    pub paid_off_period: Option<u32>,
}

impl Debt {
    pub fn new(name: impl Into<String>, balance: f64, periodic_rate: f64, min_payment: f64) -> Self {
        Self {
            name: name.into(),
            original_balance: balance,
            balance,
            periodic_rate,
            min_payment,
            interest_paid: 0.0,
            paid_off_period: None,
        }
    }

    /// Build a debt from an annual percentage rate (e.g. 15.99 for 15.99% APR)
    pub fn from_annual_pct(
        name: impl Into<String>,
        balance: f64,
        annual_rate_pct: f64,
        min_payment: f64,
    ) -> Self {
        Self::new(name, balance, annual_rate_pct / 100.0 / 12.0, min_payment)
    }

    /// Build a debt from a form or CSV entry.
    ///
    /// Entries with a zero balance carry nothing to pay off and yield `None`;
    /// a blank name becomes "Unnamed Debt". Negative or non-finite amounts
    /// are validation errors.
    pub fn from_form_row(
        name: &str,
        balance: f64,
        annual_rate_pct: f64,
        min_payment: f64,
    ) -> Result<Option<Self>> {
        let balance = non_negative("debt balance", balance)?;
        if balance == 0.0 {
            return Ok(None);
        }
        let rate = non_negative("debt annual rate", annual_rate_pct)?;
        let min_payment = non_negative("debt minimum payment", min_payment)?;

        let name = match name.trim() {
            "" => "Unnamed Debt",
            trimmed => trimmed,
        };
        Ok(Some(Self::from_annual_pct(name, balance, rate, min_payment)))
    }

    pub fn is_paid_off(&self) -> bool {
        self.balance <= 0.0
    }

    pub(crate) fn validate(&self) -> Result<()> {
        non_negative("debt balance", self.balance)?;
        non_negative("debt original balance", self.original_balance)?;
        non_negative("debt periodic rate", self.periodic_rate)?;
        non_negative("debt minimum payment", self.min_payment)?;
        Ok(())
    }
}

/// Order in which surplus budget is applied to debts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayoffStrategy {
    /// Highest interest rate first
    #[default]
    Avalanche,
    /// Smallest balance first
    Snowball,
}

impl PayoffStrategy {
    /// Copy `debts` into priority order. Both orderings are stable, so ties
    /// keep their input order.
    pub fn prioritize(self, debts: &[Debt]) -> Vec<Debt> {
        let mut ordered = debts.to_vec();
        match self {
            PayoffStrategy::Avalanche => {
                ordered.sort_by(|a, b| b.periodic_rate.total_cmp(&a.periodic_rate))
            }
            PayoffStrategy::Snowball => ordered.sort_by(|a, b| a.balance.total_cmp(&b.balance)),
        }
        ordered
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PayoffStrategy::Avalanche => "avalanche",
            PayoffStrategy::Snowball => "snowball",
        }
    }
}

impl fmt::Display for PayoffStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PayoffStrategy {
    type Err = CalcError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "avalanche" => Ok(PayoffStrategy::Avalanche),
            "snowball" => Ok(PayoffStrategy::Snowball),
            other => Err(CalcError::UnknownStrategy(other.to_string())),
        }
    }
}

/// Payment applied to one debt in one period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtPayment {
    pub name: String,
    pub payment: f64,
    pub interest: f64,
    pub balance_after: f64,
}

/// One simulated period of a payoff plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodResult {
    /// Period number (1-indexed)
    pub index: u32,
    pub payment: f64,
    pub interest: f64,
    /// Debts that carried a balance into this period, in priority order
    pub per_debt: Vec<DebtPayment>,
}

impl PeriodResult {
    pub fn new(index: u32) -> Self {
        Self {
            index,
            payment: 0.0,
            interest: 0.0,
            per_debt: Vec::new(),
        }
    }

    /// Portion of the payment that reduced principal
    pub fn principal(&self) -> f64 {
        self.payment - self.interest
    }
}

/// How a payoff simulation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PayoffStatus {
    /// Every balance reached zero
    PaidOff,
    /// MAX_PAYOFF_PERIODS elapsed with balances remaining
    CapReached,
}

/// Cumulative principal and interest paid through a period
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CumulativePoint {
    pub period: u32,
    pub principal_paid: f64,
    pub interest_paid: f64,
}

/// Complete payoff plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoffPlan {
    pub strategy: PayoffStrategy,
    pub monthly_budget: f64,
    pub periods: u32,
    pub total_interest: f64,
    pub total_paid: f64,
    pub status: PayoffStatus,
    pub period_breakdown: Vec<PeriodResult>,
    /// Final state of every debt, in priority order
    pub debts: Vec<Debt>,
}

impl PayoffPlan {
    pub fn is_paid_off(&self) -> bool {
        self.status == PayoffStatus::PaidOff
    }

    /// Sum of starting balances
    pub fn total_principal(&self) -> f64 {
        self.debts.iter().map(|d| d.original_balance).sum()
    }

    /// Plan length as (years, months)
    pub fn duration(&self) -> (u32, u32) {
        (self.periods / 12, self.periods % 12)
    }

    /// Date of the final payment when the first payment is made on `start`
    pub fn payoff_date(&self, start: NaiveDate) -> Option<NaiveDate> {
        if self.periods == 0 {
            return Some(start);
        }
        start.checked_add_months(Months::new(self.periods - 1))
    }

    /// Running principal/interest totals, one point per period
    pub fn cumulative_series(&self) -> Vec<CumulativePoint> {
        let mut principal_paid = 0.0;
        let mut interest_paid = 0.0;
        self.period_breakdown
            .iter()
            .map(|period| {
                principal_paid += period.principal();
                interest_paid += period.interest;
                CumulativePoint {
                    period: period.index,
                    principal_paid,
                    interest_paid,
                }
            })
            .collect()
    }
}

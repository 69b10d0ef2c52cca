//! Investment growth with periodic contributions and inflation adjustment

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{finite, non_negative, CalcError, Result};
use crate::projection::{
    real_rate, step, CompoundingFrequency, PeriodClock, YearRollup, MAX_HORIZON_YEARS,
};

/// Inputs for an investment growth projection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InvestmentInputs {
    /// Starting balance
    pub initial: f64,

    /// Contribution per month; scaled to the compounding frequency
    pub monthly_contribution: f64,

    /// Horizon in whole years
    pub years: u32,

    /// Nominal annual return in percent (7.0 = 7%)
    pub annual_return_pct: f64,

    pub frequency: CompoundingFrequency,

    /// Annual inflation in percent
    pub inflation_pct: f64,
}

/// Balance and flows at the end of one year or one period
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentSnapshot {
    /// Year number for yearly rows; fractional year marker for monthly rows
    pub period: f64,
    pub balance: f64,
    pub contribution: f64,
    pub interest: f64,
}

impl From<YearRollup> for InvestmentSnapshot {
    fn from(rollup: YearRollup) -> Self {
        Self {
            period: rollup.year as f64,
            balance: rollup.ending_balance,
            contribution: rollup.principal,
            interest: rollup.interest,
        }
    }
}

/// Result of an investment growth projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentGrowth {
    pub final_balance: f64,
    /// Initial balance plus every periodic contribution
    pub total_contributions: f64,
    pub total_interest: f64,
    /// Final balance deflated by cumulative inflation over the horizon
    pub inflation_adjusted_balance: f64,
    /// Inflation-adjusted annual return used for compounding
    pub real_rate: f64,
    pub yearly: Vec<InvestmentSnapshot>,
    /// Only populated for monthly compounding
    pub monthly: Vec<InvestmentSnapshot>,
}

impl InvestmentInputs {
    fn validate(&self) -> Result<()> {
        non_negative("initial", self.initial)?;
        non_negative("monthly_contribution", self.monthly_contribution)?;
        finite("annual_return_pct", self.annual_return_pct)?;
        finite("inflation_pct", self.inflation_pct)?;
        if self.inflation_pct <= -100.0 {
            return Err(CalcError::validation("inflation_pct", "must be above -100%"));
        }
        if self.years > MAX_HORIZON_YEARS {
            return Err(CalcError::validation(
                "years",
                format!("must not exceed {} years", MAX_HORIZON_YEARS),
            ));
        }
        Ok(())
    }
}

/// Compound `inputs.initial` with periodic contributions over the horizon
pub fn compute_investment_growth(inputs: &InvestmentInputs) -> Result<InvestmentGrowth> {
    inputs.validate()?;

    let inflation = inputs.inflation_pct / 100.0;
    let real = real_rate(inputs.annual_return_pct / 100.0, inflation);
    let periods_per_year = inputs.frequency.periods_per_year();
    let periodic_rate = real / periods_per_year as f64;
    let periodic_contribution = inputs.monthly_contribution * 12.0 / periods_per_year as f64;

    let mut clock = PeriodClock::new(periods_per_year);
    let mut balance = inputs.initial;
    let mut total_contributions = inputs.initial;
    let mut rollup = YearRollup::new(1);
    let mut yearly = Vec::with_capacity(inputs.years as usize);
    let mut monthly = Vec::new();

    for _ in 0..inputs.years * periods_per_year {
        clock.advance();

        let period = step(balance, periodic_rate, periodic_contribution);
        balance = period.balance;
        total_contributions += periodic_contribution;
        rollup.record(periodic_contribution, period.interest, balance);

        if inputs.frequency == CompoundingFrequency::Monthly {
            monthly.push(InvestmentSnapshot {
                period: clock.year as f64
                    + (clock.period_in_year - 1) as f64 / periods_per_year as f64,
                balance,
                contribution: periodic_contribution,
                interest: period.interest,
            });
        }

        if clock.is_year_end() {
            yearly.push(InvestmentSnapshot::from(rollup));
            rollup = YearRollup::new(clock.year + 1);
        }
    }

    debug!(
        "investment growth: {} years {} compounding, final balance {:.2}",
        inputs.years, inputs.frequency, balance
    );

    Ok(InvestmentGrowth {
        final_balance: balance,
        total_contributions,
        total_interest: balance - total_contributions,
        inflation_adjusted_balance: balance / (1.0 + inflation).powi(inputs.years as i32),
        real_rate: real,
        yearly,
        monthly,
    })
}

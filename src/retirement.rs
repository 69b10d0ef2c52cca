//! Retirement savings accumulation and withdrawal sustainability

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::{finite, non_negative, CalcError, Result};
use crate::projection::{real_rate, step, PeriodClock, MAX_HORIZON_YEARS};

/// Slack allowed on the final withdrawal before the plan counts as depleted,
/// relative to the amounts being withdrawn
const FINAL_WITHDRAWAL_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RetirementInputs {
    pub current_age: u32,
    pub retirement_age: u32,
    pub current_savings: f64,
    pub monthly_contribution: f64,
    /// Nominal annual return in percent
    pub annual_return_pct: f64,
    pub inflation_pct: f64,
    /// Desired annual income in today's dollars
    pub annual_income: f64,
    pub duration_years: u32,
}

/// Balance after one monthly withdrawal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetirementWithdrawalPoint {
    /// Fractional age at the withdrawal
    pub age: f64,
    pub balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetirementPlan {
    /// Balance on the retirement date
    pub retirement_savings: f64,
    pub monthly_retirement_income: f64,
    /// Whole retirement years fully funded
    pub years_funds_last: u32,
    /// Unfunded income over the remaining years
    pub shortfall: f64,
    pub can_retire: bool,
    /// Age at which the balance ran out, if it did
    pub depletion_age: Option<f64>,
    pub withdrawal_curve: Vec<RetirementWithdrawalPoint>,
}

impl RetirementInputs {
    fn validate(&self) -> Result<()> {
        non_negative("current_savings", self.current_savings)?;
        non_negative("monthly_contribution", self.monthly_contribution)?;
        non_negative("annual_income", self.annual_income)?;
        finite("annual_return_pct", self.annual_return_pct)?;
        finite("inflation_pct", self.inflation_pct)?;

        if self.inflation_pct <= -100.0 {
            return Err(CalcError::validation("inflation_pct", "must be above -100%"));
        }
        if self.retirement_age < self.current_age {
            return Err(CalcError::validation(
                "retirement_age",
                "must not be before the current age",
            ));
        }
        if self.retirement_age - self.current_age > MAX_HORIZON_YEARS {
            return Err(CalcError::validation(
                "retirement_age",
                format!("must be within {} years of the current age", MAX_HORIZON_YEARS),
            ));
        }
        if self.duration_years == 0 || self.duration_years > MAX_HORIZON_YEARS {
            return Err(CalcError::validation(
                "duration_years",
                format!("must be between 1 and {}", MAX_HORIZON_YEARS),
            ));
        }
        Ok(())
    }
}

/// Grow savings until retirement, then draw inflation-escalated income
/// until the money or the retirement period runs out.
pub fn compute_retirement_plan(inputs: &RetirementInputs) -> Result<RetirementPlan> {
    inputs.validate()?;

    let inflation = inputs.inflation_pct / 100.0;
    let monthly_rate = real_rate(inputs.annual_return_pct / 100.0, inflation) / 12.0;

    let months_to_retirement = (inputs.retirement_age - inputs.current_age) * 12;
    let retirement_savings = (0..months_to_retirement).fold(inputs.current_savings, |balance, _| {
        step(balance, monthly_rate, inputs.monthly_contribution).balance
    });

    let monthly_income = inputs.annual_income / 12.0;
    let total_months = inputs.duration_years * 12;

    let mut clock = PeriodClock::monthly();
    let mut balance = retirement_savings;
    let mut years_funds_last = 0;
    let mut depletion_age = None;
    let mut withdrawal_curve = Vec::with_capacity(total_months as usize);

    while clock.projection_period < total_months {
        if balance <= 0.0 {
            depletion_age = Some(inputs.retirement_age as f64 + clock.projection_period as f64 / 12.0);
            break;
        }
        clock.advance();

        let age = inputs.retirement_age as f64 + clock.year_fraction();
        let withdrawal = monthly_income * (1.0 + inflation).powi(clock.year as i32 - 1);
        balance = step(balance, monthly_rate, -withdrawal).balance;

        let slack = FINAL_WITHDRAWAL_TOLERANCE * withdrawal.max(retirement_savings).max(1.0);
        let final_within_tolerance = clock.projection_period == total_months && balance > -slack;
        if final_within_tolerance {
            balance = balance.max(0.0);
        }
        withdrawal_curve.push(RetirementWithdrawalPoint { age, balance });

        if balance <= 0.0 && !final_within_tolerance {
            depletion_age = Some(age);
            break;
        }

        if clock.is_year_end() {
            years_funds_last += 1;
        }
    }

    let can_retire = years_funds_last >= inputs.duration_years;
    let shortfall = if can_retire {
        0.0
    } else {
        (inputs.duration_years - years_funds_last) as f64 * inputs.annual_income
    };

    if !can_retire {
        warn!(
            "retirement funds last {} of {} years",
            years_funds_last, inputs.duration_years
        );
    }
    debug!(
        "retirement: savings {:.2} at age {}, funds last {} years",
        retirement_savings, inputs.retirement_age, years_funds_last
    );

    Ok(RetirementPlan {
        retirement_savings,
        monthly_retirement_income: monthly_income,
        years_funds_last,
        shortfall,
        can_retire,
        depletion_age,
        withdrawal_curve,
    })
}

//! Fixed-rate mortgage payment and amortization schedule

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{non_negative, CalcError, Result};
use crate::projection::{PeriodClock, YearRollup, MAX_HORIZON_YEARS};

/// Down payments below this share of the loan amount require PMI
pub const PMI_DOWN_PAYMENT_THRESHOLD: f64 = 0.20;

/// Inputs for a mortgage calculation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MortgageInputs {
    /// Purchase price / loan amount before the down payment
    pub loan_amount: f64,
    pub down_payment: f64,
    /// Annual interest rate in percent
    pub annual_rate_pct: f64,
    pub term_years: u32,
    pub annual_tax: f64,
    pub annual_insurance: f64,
    /// Annual PMI rate in percent of the financed principal
    pub annual_pmi_pct: f64,
}

/// One year of the amortization schedule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearRow {
    pub year: u32,
    pub principal_paid: f64,
    pub interest_paid: f64,
    pub ending_balance: f64,
}

impl From<YearRollup> for YearRow {
    fn from(rollup: YearRollup) -> Self {
        Self {
            year: rollup.year,
            principal_paid: rollup.principal,
            interest_paid: rollup.interest,
            ending_balance: rollup.ending_balance,
        }
    }
}

/// Lifetime cost split over the loan term
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostBreakdown {
    pub principal: f64,
    pub interest: f64,
    pub property_tax: f64,
    pub insurance: f64,
    pub pmi: f64,
}

/// Result of a mortgage calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MortgageSummary {
    pub principal: f64,
    /// Principal and interest plus tax, insurance and PMI
    pub monthly_payment: f64,
    pub principal_and_interest: f64,
    /// Monthly tax, insurance and PMI
    pub taxes_and_insurance: f64,
    pub monthly_pmi: f64,
    pub pmi_applies: bool,
    pub total_interest: f64,
    pub total_cost: f64,
    pub cost_breakdown: CostBreakdown,
    pub schedule: Vec<YearRow>,
}

impl MortgageInputs {
    fn validate(&self) -> Result<f64> {
        let loan_amount = non_negative("loan_amount", self.loan_amount)?;
        let down_payment = non_negative("down_payment", self.down_payment)?;
        non_negative("annual_rate_pct", self.annual_rate_pct)?;
        non_negative("annual_tax", self.annual_tax)?;
        non_negative("annual_insurance", self.annual_insurance)?;
        non_negative("annual_pmi_pct", self.annual_pmi_pct)?;

        if down_payment > loan_amount {
            return Err(CalcError::validation(
                "down_payment",
                "must not exceed the loan amount",
            ));
        }
        if self.term_years > MAX_HORIZON_YEARS {
            return Err(CalcError::validation(
                "term_years",
                format!("must not exceed {} years", MAX_HORIZON_YEARS),
            ));
        }
        Ok(loan_amount - down_payment)
    }
}

/// Level payment that amortizes `principal` over `months` at `monthly_rate`.
///
/// A zero (or negligible) rate spreads the principal evenly; a zero term has
/// no payment. Rates too large for a finite payment are rejected.
pub fn amortized_payment(principal: f64, monthly_rate: f64, months: u32) -> Result<f64> {
    if months == 0 {
        return Err(CalcError::DivideByZero {
            context: "amortized payment over a zero-month term",
        });
    }
    let n = months as f64;
    // (1 + r)^n - 1 without losing r when it is far below machine epsilon
    let growth_less_one = (n * monthly_rate.ln_1p()).exp_m1();

    let payment = if growth_less_one == 0.0 {
        principal / n
    } else if growth_less_one.is_infinite() {
        principal * monthly_rate
    } else {
        principal * monthly_rate * (growth_less_one + 1.0) / growth_less_one
    };

    if !payment.is_finite() {
        return Err(CalcError::validation(
            "annual_rate_pct",
            "too large to produce a finite payment",
        ));
    }
    Ok(payment)
}

/// Compute payment, totals and a yearly amortization schedule
pub fn compute_mortgage(inputs: &MortgageInputs) -> Result<MortgageSummary> {
    let principal = inputs.validate()?;

    let monthly_rate = inputs.annual_rate_pct / 100.0 / 12.0;
    let months = inputs.term_years * 12;
    let monthly_tax = inputs.annual_tax / 12.0;
    let monthly_insurance = inputs.annual_insurance / 12.0;

    let pmi_applies = inputs.down_payment < inputs.loan_amount * PMI_DOWN_PAYMENT_THRESHOLD;
    let monthly_pmi = if pmi_applies {
        principal * inputs.annual_pmi_pct / 100.0 / 12.0
    } else {
        0.0
    };

    let payment = amortized_payment(principal, monthly_rate, months)?;
    let taxes_and_insurance = monthly_tax + monthly_insurance + monthly_pmi;
    let monthly_payment = payment + taxes_and_insurance;
    let total_interest = payment * months as f64 - principal;

    let schedule = amortize(principal, monthly_rate, months, payment);

    debug!(
        "mortgage: principal {:.2}, {} months, P&I {:.2}, PMI {}",
        principal, months, payment, pmi_applies
    );

    Ok(MortgageSummary {
        principal,
        monthly_payment,
        principal_and_interest: payment,
        taxes_and_insurance,
        monthly_pmi,
        pmi_applies,
        total_interest,
        total_cost: monthly_payment * months as f64,
        cost_breakdown: CostBreakdown {
            principal,
            interest: total_interest,
            property_tax: monthly_tax * months as f64,
            insurance: monthly_insurance * months as f64,
            pmi: monthly_pmi * months as f64,
        },
        schedule,
    })
}

/// Roll the balance forward month by month, summarizing each year
fn amortize(principal: f64, monthly_rate: f64, months: u32, payment: f64) -> Vec<YearRow> {
    let mut clock = PeriodClock::monthly();
    let mut balance = principal;
    let mut rollup = YearRollup::new(1);
    let mut schedule = Vec::with_capacity((months / 12) as usize);

    for _ in 0..months {
        clock.advance();

        let interest = balance * monthly_rate;
        let principal_portion = payment - interest;
        balance = (balance - principal_portion).max(0.0);
        rollup.record(principal_portion, interest, balance);

        if clock.is_year_end() {
            schedule.push(YearRow::from(rollup));
            rollup = YearRollup::new(clock.year + 1);
        }
    }

    schedule
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn reference_inputs() -> MortgageInputs {
        MortgageInputs {
            loan_amount: 300_000.0,
            down_payment: 60_000.0,
            annual_rate_pct: 6.0,
            term_years: 30,
            ..Default::default()
        }
    }

    #[test]
    fn test_reference_payment() {
        let summary = compute_mortgage(&reference_inputs()).unwrap();

        assert_eq!(summary.principal, 240_000.0);
        assert_abs_diff_eq!(summary.principal_and_interest, 1438.92, epsilon = 0.01);
        assert_abs_diff_eq!(summary.monthly_payment, summary.principal_and_interest);
        assert!(!summary.pmi_applies);
        assert_abs_diff_eq!(
            summary.total_interest,
            summary.principal_and_interest * 360.0 - 240_000.0,
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_schedule_pays_down_to_zero() {
        let summary = compute_mortgage(&reference_inputs()).unwrap();

        assert_eq!(summary.schedule.len(), 30);
        assert_eq!(summary.schedule[0].year, 1);
        assert!(summary.schedule[0].interest_paid > summary.schedule[0].principal_paid);
        assert!(summary.schedule[29].principal_paid > summary.schedule[29].interest_paid);
        assert_abs_diff_eq!(summary.schedule[29].ending_balance, 0.0, epsilon = 1e-4);

        let principal: f64 = summary.schedule.iter().map(|y| y.principal_paid).sum();
        assert_abs_diff_eq!(principal, 240_000.0, epsilon = 1e-4);
    }

    #[test]
    fn test_pmi_below_twenty_percent_down() {
        let summary = compute_mortgage(&MortgageInputs {
            loan_amount: 200_000.0,
            down_payment: 20_000.0,
            annual_rate_pct: 5.0,
            term_years: 15,
            annual_tax: 2400.0,
            annual_insurance: 1200.0,
            annual_pmi_pct: 0.6,
        })
        .unwrap();

        assert!(summary.pmi_applies);
        assert_abs_diff_eq!(summary.monthly_pmi, 180_000.0 * 0.006 / 12.0, epsilon = 1e-9);
        assert_abs_diff_eq!(
            summary.taxes_and_insurance,
            200.0 + 100.0 + summary.monthly_pmi,
            epsilon = 1e-9
        );
        assert_abs_diff_eq!(
            summary.total_cost,
            summary.monthly_payment * 180.0,
            epsilon = 1e-6
        );
        assert_abs_diff_eq!(summary.cost_breakdown.property_tax, 36_000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_exactly_twenty_percent_has_no_pmi() {
        let summary = compute_mortgage(&MortgageInputs {
            annual_pmi_pct: 0.5,
            ..reference_inputs()
        })
        .unwrap();
        assert!(!summary.pmi_applies);
        assert_eq!(summary.monthly_pmi, 0.0);
    }

    #[test]
    fn test_zero_rate_spreads_principal() {
        let summary = compute_mortgage(&MortgageInputs {
            loan_amount: 120_000.0,
            down_payment: 24_000.0,
            term_years: 8,
            ..Default::default()
        })
        .unwrap();

        assert_abs_diff_eq!(summary.principal_and_interest, 1000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(summary.total_interest, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(summary.schedule[7].ending_balance, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_negligible_rate_behaves_like_zero_rate() {
        let summary = compute_mortgage(&MortgageInputs {
            annual_rate_pct: 1e-15,
            ..reference_inputs()
        })
        .unwrap();

        assert!(summary.principal_and_interest.is_finite());
        assert_abs_diff_eq!(summary.principal_and_interest, 240_000.0 / 360.0, epsilon = 1e-6);
        assert!(summary.total_interest.is_finite());
        assert_abs_diff_eq!(summary.total_interest, 0.0, epsilon = 1e-3);
        assert!(summary.schedule.iter().all(|y| y.ending_balance.is_finite()));
        assert_abs_diff_eq!(summary.schedule[29].ending_balance, 0.0, epsilon = 1e-3);
    }

    #[test]
    fn test_huge_rate_approaches_interest_only() {
        let payment = amortized_payment(100_000.0, 100.0, 360).unwrap();
        assert!(payment.is_finite());
        assert_abs_diff_eq!(payment, 100_000.0 * 100.0, epsilon = 1e-3);
    }

    #[test]
    fn test_overflowing_rate_rejected() {
        let err = compute_mortgage(&MortgageInputs {
            annual_rate_pct: f64::MAX,
            ..reference_inputs()
        })
        .unwrap_err();
        assert!(matches!(err, CalcError::Validation { field: "annual_rate_pct", .. }));
    }

    #[test]
    fn test_zero_term_is_divide_by_zero() {
        let err = compute_mortgage(&MortgageInputs {
            term_years: 0,
            ..reference_inputs()
        })
        .unwrap_err();
        assert!(matches!(err, CalcError::DivideByZero { .. }));
    }

    #[test]
    fn test_down_payment_above_loan_rejected() {
        let err = compute_mortgage(&MortgageInputs {
            down_payment: 400_000.0,
            ..reference_inputs()
        })
        .unwrap_err();
        assert!(matches!(err, CalcError::Validation { field: "down_payment", .. }));
    }
}

//! Federal and state income tax estimate

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{non_negative, Result};

use super::brackets::{BracketTable, FilingStatus, TaxSchedule};

/// Marginal federal tax on `taxable_income` for a filing status string.
///
/// Unknown statuses are taxed with the single filer table.
pub fn compute_federal_tax(taxable_income: f64, filing_status: &str, schedule: &TaxSchedule) -> f64 {
    schedule.resolve(filing_status).table.tax_on(taxable_income)
}

/// How state income tax is estimated
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum StatePolicy {
    /// No state income tax
    None,
    /// Flat rate in percent of taxable income
    Custom {
        #[serde(rename = "ratePct")]
        rate_pct: f64,
    },
    /// Flat rate from configuration
    #[default]
    DefaultFlat,
}

impl StatePolicy {
    /// Effective flat rate in percent
    pub fn rate_pct(&self, default_rate_pct: f64) -> f64 {
        match *self {
            StatePolicy::None => 0.0,
            StatePolicy::Custom { rate_pct } => rate_pct,
            StatePolicy::DefaultFlat => default_rate_pct,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TaxInputs {
    pub gross_income: f64,
    pub deductions: f64,
    pub credits: f64,
    pub filing_status: String,
    pub state: StatePolicy,
}

/// Tax owed within one bracket for a given income
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BracketRow {
    pub min: f64,
    pub max: Option<f64>,
    pub rate: f64,
    pub taxable_in_bracket: f64,
    pub tax_in_bracket: f64,
    pub cumulative_tax: f64,
    /// Income falls inside this bracket
    pub is_current: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxEstimate {
    pub tax_year: u32,
    pub filing_status: FilingStatus,
    /// Requested status was unknown and single brackets were used
    pub filing_status_fallback: bool,
    pub gross_income: f64,
    pub taxable_income: f64,
    pub federal_tax: f64,
    pub state_tax: f64,
    pub credits: f64,
    pub total_tax: f64,
    /// Percent of gross income
    pub federal_rate_pct: f64,
    pub state_rate_pct: f64,
    pub effective_rate_pct: f64,
    pub marginal_rate_pct: f64,
    pub take_home_pay: f64,
    pub brackets: Vec<BracketRow>,
}

/// Per-bracket breakdown of the tax on `income`
pub fn bracket_breakdown(table: &BracketTable, income: f64) -> Vec<BracketRow> {
    let mut cumulative_tax = 0.0;

    table
        .brackets()
        .iter()
        .map(|bracket| {
            let taxable_in_bracket = if income > bracket.min {
                income.min(bracket.max.unwrap_or(f64::INFINITY)) - bracket.min
            } else {
                0.0
            };
            let tax_in_bracket = taxable_in_bracket * bracket.rate;
            cumulative_tax += tax_in_bracket;

            BracketRow {
                min: bracket.min,
                max: bracket.max,
                rate: bracket.rate,
                taxable_in_bracket,
                tax_in_bracket,
                cumulative_tax,
                is_current: bracket.contains(income),
            }
        })
        .collect()
}

fn pct_of(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}

/// Estimate federal and state tax, rates and take-home pay.
///
/// `default_state_rate_pct` applies when the state policy is `DefaultFlat`.
pub fn estimate_tax(
    inputs: &TaxInputs,
    schedule: &TaxSchedule,
    default_state_rate_pct: f64,
) -> Result<TaxEstimate> {
    let gross_income = non_negative("gross_income", inputs.gross_income)?;
    let deductions = non_negative("deductions", inputs.deductions)?;
    let credits = non_negative("credits", inputs.credits)?;
    let state_rate = non_negative("state_rate_pct", inputs.state.rate_pct(default_state_rate_pct))?;

    let taxable_income = (gross_income - deductions).max(0.0);
    let resolved = schedule.resolve(&inputs.filing_status);

    let federal_tax = resolved.table.tax_on(taxable_income);
    let state_tax = taxable_income * state_rate / 100.0;
    let total_tax = federal_tax + state_tax - credits;
    let marginal_rate_pct = resolved
        .table
        .marginal_bracket(taxable_income)
        .map_or(0.0, |b| b.rate * 100.0);

    debug!(
        "tax estimate {} ({}): taxable {:.2}, federal {:.2}, state {:.2}",
        schedule.year, resolved.status, taxable_income, federal_tax, state_tax
    );

    Ok(TaxEstimate {
        tax_year: schedule.year,
        filing_status: resolved.status,
        filing_status_fallback: resolved.fell_back,
        gross_income,
        taxable_income,
        federal_tax,
        state_tax,
        credits,
        total_tax,
        federal_rate_pct: pct_of(federal_tax, gross_income),
        state_rate_pct: pct_of(state_tax, gross_income),
        effective_rate_pct: pct_of(total_tax, gross_income),
        marginal_rate_pct,
        take_home_pay: gross_income - total_tax,
        brackets: bracket_breakdown(resolved.table, taxable_income),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CalcError;
    use approx::assert_abs_diff_eq;

    fn single(gross_income: f64, state: StatePolicy) -> TaxInputs {
        TaxInputs {
            gross_income,
            filing_status: "single".to_string(),
            state,
            ..Default::default()
        }
    }

    #[test]
    fn test_federal_tax_single_50k() {
        let schedule = TaxSchedule::federal_2023();
        assert_abs_diff_eq!(
            compute_federal_tax(50_000.0, "single", &schedule),
            6617.0,
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_federal_tax_married_uses_wider_brackets() {
        let schedule = TaxSchedule::federal_2023();
        let married = compute_federal_tax(50_000.0, "married", &schedule);
        // 20550 @ 10% + 29450 @ 12%
        assert_abs_diff_eq!(married, 2055.0 + 3534.0, epsilon = 1e-6);
        assert!(married < compute_federal_tax(50_000.0, "single", &schedule));
    }

    #[test]
    fn test_unknown_status_taxed_as_single() {
        let schedule = TaxSchedule::federal_2023();
        assert_eq!(
            compute_federal_tax(75_000.0, "widowed", &schedule),
            compute_federal_tax(75_000.0, "single", &schedule)
        );
    }

    #[test]
    fn test_estimate_with_no_state_tax() {
        let schedule = TaxSchedule::federal_2023();
        let estimate = estimate_tax(&single(50_000.0, StatePolicy::None), &schedule, 5.0).unwrap();

        assert_eq!(estimate.state_tax, 0.0);
        assert_abs_diff_eq!(estimate.total_tax, 6617.0, epsilon = 1e-6);
        assert_abs_diff_eq!(estimate.take_home_pay, 43_383.0, epsilon = 1e-6);
        assert_abs_diff_eq!(estimate.effective_rate_pct, 13.234, epsilon = 1e-9);
        assert_eq!(estimate.marginal_rate_pct, 22.0);
    }

    #[test]
    fn test_estimate_default_and_custom_state() {
        let schedule = TaxSchedule::federal_2023();
        let inputs = TaxInputs {
            deductions: 10_000.0,
            ..single(60_000.0, StatePolicy::DefaultFlat)
        };
        let estimate = estimate_tax(&inputs, &schedule, 5.0).unwrap();
        assert_eq!(estimate.taxable_income, 50_000.0);
        assert_abs_diff_eq!(estimate.state_tax, 2500.0, epsilon = 1e-9);

        let custom = TaxInputs {
            state: StatePolicy::Custom { rate_pct: 3.0 },
            ..inputs
        };
        let estimate = estimate_tax(&custom, &schedule, 5.0).unwrap();
        assert_abs_diff_eq!(estimate.state_tax, 1500.0, epsilon = 1e-9);
        assert_abs_diff_eq!(estimate.state_rate_pct, 2.5, epsilon = 1e-9);
    }

    #[test]
    fn test_credits_reduce_total() {
        let schedule = TaxSchedule::federal_2023();
        let inputs = TaxInputs {
            credits: 1000.0,
            ..single(50_000.0, StatePolicy::None)
        };
        let estimate = estimate_tax(&inputs, &schedule, 5.0).unwrap();
        assert_abs_diff_eq!(estimate.total_tax, 5617.0, epsilon = 1e-6);
        assert_abs_diff_eq!(
            estimate.total_tax,
            estimate.federal_tax + estimate.state_tax - estimate.credits,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_deductions_above_gross_clamp_to_zero() {
        let schedule = TaxSchedule::federal_2023();
        let inputs = TaxInputs {
            deductions: 20_000.0,
            ..single(15_000.0, StatePolicy::DefaultFlat)
        };
        let estimate = estimate_tax(&inputs, &schedule, 5.0).unwrap();
        assert_eq!(estimate.taxable_income, 0.0);
        assert_eq!(estimate.total_tax, 0.0);
        assert_eq!(estimate.take_home_pay, 15_000.0);
    }

    #[test]
    fn test_zero_gross_has_zero_rates() {
        let schedule = TaxSchedule::federal_2023();
        let estimate = estimate_tax(&single(0.0, StatePolicy::DefaultFlat), &schedule, 5.0).unwrap();
        assert_eq!(estimate.effective_rate_pct, 0.0);
        assert_eq!(estimate.federal_rate_pct, 0.0);
    }

    #[test]
    fn test_fallback_is_reported() {
        let schedule = TaxSchedule::federal_2023();
        let inputs = TaxInputs {
            filing_status: "head_of_household".to_string(),
            ..single(50_000.0, StatePolicy::None)
        };
        let estimate = estimate_tax(&inputs, &schedule, 5.0).unwrap();
        assert!(estimate.filing_status_fallback);
        assert_eq!(estimate.filing_status, FilingStatus::Single);
    }

    #[test]
    fn test_negative_income_rejected() {
        let schedule = TaxSchedule::federal_2023();
        let err = estimate_tax(&single(-1.0, StatePolicy::None), &schedule, 5.0).unwrap_err();
        assert!(matches!(err, CalcError::Validation { field: "gross_income", .. }));
    }

    #[test]
    fn test_bracket_breakdown_rows() {
        let schedule = TaxSchedule::federal_2023();
        let rows = bracket_breakdown(&schedule.single, 50_000.0);

        assert_eq!(rows.len(), 7);
        assert_abs_diff_eq!(rows[0].taxable_in_bracket, 10_275.0);
        assert_abs_diff_eq!(rows[2].taxable_in_bracket, 8225.0, epsilon = 1e-9);
        assert_eq!(rows[3].taxable_in_bracket, 0.0);
        assert_abs_diff_eq!(rows[6].cumulative_tax, 6617.0, epsilon = 1e-6);

        let current: Vec<_> = rows.iter().filter(|r| r.is_current).collect();
        assert_eq!(current.len(), 1);
        assert_eq!(current[0].rate, 0.22);
    }

    #[test]
    fn test_state_policy_deserializes_tagged() {
        let policy: StatePolicy = serde_json::from_str(r#"{"kind":"custom","ratePct":4.5}"#).unwrap();
        assert_eq!(policy, StatePolicy::Custom { rate_pct: 4.5 });
        let policy: StatePolicy = serde_json::from_str(r#"{"kind":"none"}"#).unwrap();
        assert_eq!(policy, StatePolicy::None);
    }
}

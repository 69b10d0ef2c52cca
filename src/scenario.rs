//! Scenario runner for comparisons and parallel sweeps
//!
//! Holds the bracket tables and configuration once, then runs many
//! independent engine calls without reloading anything.

use rayon::prelude::*;
use serde::Serialize;

use crate::config::CalculatorConfig;
use crate::debt::{compute_debt_payoff_plan, Debt, PayoffPlan, PayoffStrategy};
use crate::error::Result;
use crate::retirement::{compute_retirement_plan, RetirementInputs, RetirementPlan};
use crate::tax::{estimate_tax, TaxEstimate, TaxInputs, TaxSchedule};

/// Avalanche and snowball plans for the same debts and budget
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyComparison {
    pub avalanche: PayoffPlan,
    pub snowball: PayoffPlan,
    /// Snowball interest minus avalanche interest
    pub interest_saved: f64,
    /// Snowball periods minus avalanche periods
    pub periods_saved: i64,
}

/// # Example
/// ```ignore
/// let runner = ScenarioRunner::from_config(CalculatorConfig::from_env())?;
///
/// let budgets = [500.0, 750.0, 1000.0];
/// for plan in runner.sweep_payoff_budgets(&debts, PayoffStrategy::Avalanche, &budgets) {
///     println!("{:?}", plan?.periods);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    schedule: TaxSchedule,
    config: CalculatorConfig,
}

impl ScenarioRunner {
    /// Runner with built-in tax tables and default configuration
    pub fn new() -> Self {
        Self::with_schedule(TaxSchedule::federal_2023(), CalculatorConfig::default())
    }

    /// Runner using the tax table named by `config`, if any
    pub fn from_config(config: CalculatorConfig) -> Result<Self> {
        Ok(Self {
            schedule: config.tax_schedule()?,
            config,
        })
    }

    pub fn with_schedule(schedule: TaxSchedule, config: CalculatorConfig) -> Self {
        Self { schedule, config }
    }

    pub fn compare_payoff_strategies(
        &self,
        debts: &[Debt],
        monthly_budget: f64,
    ) -> Result<StrategyComparison> {
        let (avalanche, snowball) = rayon::join(
            || compute_debt_payoff_plan(debts, monthly_budget, PayoffStrategy::Avalanche),
            || compute_debt_payoff_plan(debts, monthly_budget, PayoffStrategy::Snowball),
        );
        let (avalanche, snowball) = (avalanche?, snowball?);

        Ok(StrategyComparison {
            interest_saved: snowball.total_interest - avalanche.total_interest,
            periods_saved: snowball.periods as i64 - avalanche.periods as i64,
            avalanche,
            snowball,
        })
    }

    /// One payoff plan per budget, in the order given
    pub fn sweep_payoff_budgets(
        &self,
        debts: &[Debt],
        strategy: PayoffStrategy,
        budgets: &[f64],
    ) -> Vec<Result<PayoffPlan>> {
        budgets
            .par_iter()
            .map(|&budget| compute_debt_payoff_plan(debts, budget, strategy))
            .collect()
    }

    /// One retirement plan per retirement age, in the order given
    pub fn sweep_retirement_ages(
        &self,
        inputs: &RetirementInputs,
        retirement_ages: &[u32],
    ) -> Vec<Result<RetirementPlan>> {
        retirement_ages
            .par_iter()
            .map(|&retirement_age| {
                compute_retirement_plan(&RetirementInputs {
                    retirement_age,
                    ..inputs.clone()
                })
            })
            .collect()
    }

    pub fn estimate_tax(&self, inputs: &TaxInputs) -> Result<TaxEstimate> {
        estimate_tax(inputs, &self.schedule, self.config.state_tax_rate_pct)
    }

    pub fn schedule(&self) -> &TaxSchedule {
        &self.schedule
    }

    pub fn config(&self) -> &CalculatorConfig {
        &self.config
    }
}

impl Default for ScenarioRunner {
    fn default() -> Self {
        Self::new()
    }
}

//! Sweep monthly budgets for a set of debts
//!
//! Loads debts from CSV, runs both payoff strategies for every budget in a
//! range in parallel and writes one summary row per budget and strategy.
//!
//! Usage: payoff_sweep --debts data/sample_debts.csv --from 800 --to 3000 --step 100

use anyhow::{bail, Context, Result};
use clap::Parser;
use fincalc::debt::{load_debts, PayoffPlan, PayoffStatus, PayoffStrategy};
use fincalc::ScenarioRunner;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "payoff_sweep", about = "Compare payoff plans across monthly budgets")]
struct Cli {
    /// CSV with name,balance,annual_rate_pct,min_payment
    #[arg(long)]
    debts: PathBuf,
    #[arg(long)]
    from: f64,
    #[arg(long)]
    to: f64,
    #[arg(long, default_value_t = 100.0)]
    step: f64,
    #[arg(long, default_value = "payoff_sweep.csv")]
    output: PathBuf,
}

#[derive(Debug, Serialize)]
struct SweepRow {
    budget: f64,
    strategy: PayoffStrategy,
    months: u32,
    paid_off: bool,
    total_interest: f64,
    total_paid: f64,
}

impl From<&PayoffPlan> for SweepRow {
    fn from(plan: &PayoffPlan) -> Self {
        Self {
            budget: plan.monthly_budget,
            strategy: plan.strategy,
            months: plan.periods,
            paid_off: plan.status == PayoffStatus::PaidOff,
            total_interest: plan.total_interest,
            total_paid: plan.total_paid,
        }
    }
}

/// Most budgets a single sweep will run
const MAX_SWEEP_BUDGETS: usize = 10_000;

/// Slack so an end point lost to rounding (0.1..0.7 by 0.2) stays in the range
const RANGE_EPSILON: f64 = 1e-9;

fn budgets(from: f64, to: f64, step: f64) -> Result<Vec<f64>> {
    if !(step > 0.0) || !(from > 0.0) || !(to >= from) || !to.is_finite() {
        bail!("budget range must satisfy 0 < from <= to with a positive step");
    }
    let steps = ((to - from) / step + RANGE_EPSILON).floor();
    if steps >= MAX_SWEEP_BUDGETS as f64 {
        bail!(
            "budget range {}..{} by {} exceeds {} budgets",
            from,
            to,
            step,
            MAX_SWEEP_BUDGETS
        );
    }
    let count = steps as usize + 1;
    Ok((0..count).map(|i| from + i as f64 * step).collect())
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let start = Instant::now();

    let debts = load_debts(&cli.debts)
        .with_context(|| format!("loading debts from {}", cli.debts.display()))?;
    println!("Loaded {} debts in {:?}", debts.len(), start.elapsed());

    let budgets = budgets(cli.from, cli.to, cli.step)?;
    let runner = ScenarioRunner::new();

    let mut rows = Vec::with_capacity(budgets.len() * 2);
    for strategy in [PayoffStrategy::Avalanche, PayoffStrategy::Snowball] {
        for plan in runner.sweep_payoff_budgets(&debts, strategy, &budgets) {
            rows.push(SweepRow::from(&plan?));
        }
    }
    rows.sort_by(|a, b| a.budget.total_cmp(&b.budget));
    println!("Ran {} plans in {:?}", rows.len(), start.elapsed());

    println!("\n{:>10} {:>10} {:>7} {:>14}", "Budget", "Strategy", "Months", "Interest");
    println!("{}", "-".repeat(44));
    for row in &rows {
        println!(
            "{:>10.2} {:>10} {:>7} {:>14.2}{}",
            row.budget,
            row.strategy.as_str(),
            row.months,
            row.total_interest,
            if row.paid_off { "" } else { "  (cap reached)" }
        );
    }

    let mut writer = csv::Writer::from_path(&cli.output)
        .with_context(|| format!("creating {}", cli.output.display()))?;
    for row in &rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    println!("\nResults written to: {}", cli.output.display());

    Ok(())
}

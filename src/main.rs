//! fincalc CLI
//!
//! Runs one calculator from the command line, prints a summary and
//! optionally writes the schedule to CSV with `--csv PATH`.

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};

use fincalc::debt::{load_debts, PayoffStrategy};
use fincalc::tax::StatePolicy;
use fincalc::{
    compute_debt_payoff_plan, compute_investment_growth, compute_mortgage,
    compute_retirement_plan, CalculatorConfig, CompoundingFrequency, InvestmentInputs,
    MortgageInputs, RetirementInputs, ScenarioRunner, TaxInputs,
};

#[derive(Parser, Debug)]
#[command(name = "fincalc", about = "Debt, investment, mortgage, tax and retirement calculators")]
struct Cli {
    /// Write the schedule to this CSV file
    #[arg(long, global = true)]
    csv: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Plan paying off debts from a CSV file
    Debt(DebtArgs),
    /// Project investment growth
    Invest(InvestArgs),
    /// Mortgage payment and amortization
    Mortgage(MortgageArgs),
    /// Income tax estimate
    Tax(TaxArgs),
    /// Retirement savings sustainability
    Retire(RetireArgs),
}

#[derive(Args, Debug)]
struct DebtArgs {
    /// CSV with name,balance,annual_rate_pct,min_payment
    #[arg(long)]
    debts: PathBuf,
    #[arg(long)]
    budget: f64,
    #[arg(long, default_value = "avalanche")]
    strategy: String,
    /// First payment date (defaults to today)
    #[arg(long)]
    start: Option<NaiveDate>,
    /// Also run the other strategy and report the difference
    #[arg(long)]
    compare: bool,
}

#[derive(Args, Debug)]
struct InvestArgs {
    #[arg(long, default_value_t = 0.0)]
    initial: f64,
    #[arg(long, default_value_t = 0.0)]
    monthly: f64,
    #[arg(long)]
    years: u32,
    #[arg(long, default_value_t = 7.0)]
    return_pct: f64,
    #[arg(long, default_value = "monthly")]
    frequency: String,
    #[arg(long, default_value_t = 0.0)]
    inflation_pct: f64,
}

#[derive(Args, Debug)]
struct MortgageArgs {
    #[arg(long)]
    loan: f64,
    #[arg(long, default_value_t = 0.0)]
    down: f64,
    #[arg(long)]
    rate_pct: f64,
    #[arg(long, default_value_t = 30)]
    years: u32,
    #[arg(long, default_value_t = 0.0)]
    tax: f64,
    #[arg(long, default_value_t = 0.0)]
    insurance: f64,
    #[arg(long, default_value_t = 0.0)]
    pmi_pct: f64,
}

#[derive(Args, Debug)]
struct TaxArgs {
    #[arg(long)]
    gross: f64,
    #[arg(long, default_value_t = 0.0)]
    deductions: f64,
    #[arg(long, default_value_t = 0.0)]
    credits: f64,
    #[arg(long, default_value = "single")]
    filing_status: String,
    /// State rate in percent (defaults to FINCALC_STATE_TAX_RATE)
    #[arg(long, conflicts_with = "no_state")]
    state_rate: Option<f64>,
    #[arg(long)]
    no_state: bool,
}

#[derive(Args, Debug)]
struct RetireArgs {
    #[arg(long)]
    current_age: u32,
    #[arg(long)]
    retirement_age: u32,
    #[arg(long, default_value_t = 0.0)]
    savings: f64,
    #[arg(long, default_value_t = 0.0)]
    monthly: f64,
    #[arg(long, default_value_t = 7.0)]
    return_pct: f64,
    #[arg(long, default_value_t = 2.5)]
    inflation_pct: f64,
    /// Desired annual income in today's dollars
    #[arg(long)]
    income: f64,
    #[arg(long, default_value_t = 25)]
    duration: u32,
}

#[derive(Serialize)]
struct PeriodCsvRow {
    period: u32,
    payment: f64,
    principal: f64,
    interest: f64,
    cumulative_principal: f64,
    cumulative_interest: f64,
}

fn write_csv<T, I>(path: &Path, rows: I) -> Result<()>
where
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    println!("\nSchedule written to: {}", path.display());
    Ok(())
}

fn run_debt(args: DebtArgs, csv: Option<&Path>, config: &CalculatorConfig) -> Result<()> {
    let debts = load_debts(&args.debts)
        .with_context(|| format!("loading debts from {}", args.debts.display()))?;
    let strategy: PayoffStrategy = args.strategy.parse()?;
    let plan = compute_debt_payoff_plan(&debts, args.budget, strategy)?;

    println!("Debt payoff ({}, budget ${:.2}/month)", strategy, args.budget);
    println!("{}", "-".repeat(60));
    println!("{:>6} {:>12} {:>12} {:>12}", "Month", "Payment", "Principal", "Interest");
    for period in plan.period_breakdown.iter().take(config.schedule_preview) {
        println!(
            "{:>6} {:>12.2} {:>12.2} {:>12.2}",
            period.index,
            period.payment,
            period.principal(),
            period.interest
        );
    }
    if plan.period_breakdown.len() > config.schedule_preview {
        println!("... ({} more months)", plan.period_breakdown.len() - config.schedule_preview);
    }

    let (years, months) = plan.duration();
    let start = args.start.unwrap_or_else(|| Local::now().date_naive());
    println!("\nSummary:");
    println!("  Status: {:?}", plan.status);
    println!("  Payoff time: {} years {} months", years, months);
    if let Some(date) = plan.payoff_date(start) {
        println!("  Debt-free date: {}", date.format("%B %Y"));
    }
    println!("  Total interest: ${:.2}", plan.total_interest);
    println!("  Total paid: ${:.2}", plan.total_paid);
    for debt in &plan.debts {
        println!(
            "  {:<20} interest ${:>10.2}  paid off month {}",
            debt.name,
            debt.interest_paid,
            debt.paid_off_period.map_or("-".to_string(), |p| p.to_string())
        );
    }

    if args.compare {
        let runner = ScenarioRunner::new();
        let comparison = runner.compare_payoff_strategies(&debts, args.budget)?;
        println!("\nAvalanche vs snowball:");
        println!("  Interest saved by avalanche: ${:.2}", comparison.interest_saved);
        println!("  Months saved by avalanche: {}", comparison.periods_saved);
    }

    if let Some(path) = csv {
        let rows = plan
            .period_breakdown
            .iter()
            .zip(plan.cumulative_series())
            .map(|(period, cumulative)| PeriodCsvRow {
                period: period.index,
                payment: period.payment,
                principal: period.principal(),
                interest: period.interest,
                cumulative_principal: cumulative.principal_paid,
                cumulative_interest: cumulative.interest_paid,
            });
        write_csv(path, rows)?;
    }
    Ok(())
}

fn run_invest(args: InvestArgs, csv: Option<&Path>) -> Result<()> {
    let frequency: CompoundingFrequency = args.frequency.parse()?;
    let growth = compute_investment_growth(&InvestmentInputs {
        initial: args.initial,
        monthly_contribution: args.monthly,
        years: args.years,
        annual_return_pct: args.return_pct,
        frequency,
        inflation_pct: args.inflation_pct,
    })?;

    println!("Investment growth ({} years, {} compounding)", args.years, frequency);
    println!("{}", "-".repeat(60));
    println!("{:>5} {:>14} {:>14} {:>14}", "Year", "Balance", "Contributed", "Interest");
    for year in &growth.yearly {
        println!(
            "{:>5} {:>14.2} {:>14.2} {:>14.2}",
            year.period, year.balance, year.contribution, year.interest
        );
    }
    println!("\nSummary:");
    println!("  Final balance: ${:.2}", growth.final_balance);
    println!("  Total contributions: ${:.2}", growth.total_contributions);
    println!("  Total interest: ${:.2}", growth.total_interest);
    println!("  In today's dollars: ${:.2}", growth.inflation_adjusted_balance);

    if let Some(path) = csv {
        let rows = if growth.monthly.is_empty() {
            &growth.yearly
        } else {
            &growth.monthly
        };
        write_csv(path, rows)?;
    }
    Ok(())
}

fn run_mortgage(args: MortgageArgs, csv: Option<&Path>) -> Result<()> {
    let summary = compute_mortgage(&MortgageInputs {
        loan_amount: args.loan,
        down_payment: args.down,
        annual_rate_pct: args.rate_pct,
        term_years: args.years,
        annual_tax: args.tax,
        annual_insurance: args.insurance,
        annual_pmi_pct: args.pmi_pct,
    })?;

    println!("Mortgage (${:.2} over {} years at {}%)", summary.principal, args.years, args.rate_pct);
    println!("{}", "-".repeat(60));
    println!("  Principal & interest: ${:.2}", summary.principal_and_interest);
    println!("  Taxes, insurance & PMI: ${:.2}", summary.taxes_and_insurance);
    if summary.pmi_applies {
        println!("  (includes PMI ${:.2})", summary.monthly_pmi);
    }
    println!("  Monthly payment: ${:.2}", summary.monthly_payment);
    println!("  Total interest: ${:.2}", summary.total_interest);
    println!("  Total cost: ${:.2}", summary.total_cost);

    println!("\n{:>5} {:>14} {:>14} {:>14}", "Year", "Principal", "Interest", "Balance");
    for row in &summary.schedule {
        println!(
            "{:>5} {:>14.2} {:>14.2} {:>14.2}",
            row.year, row.principal_paid, row.interest_paid, row.ending_balance
        );
    }

    if let Some(path) = csv {
        write_csv(path, &summary.schedule)?;
    }
    Ok(())
}

fn run_tax(args: TaxArgs, csv: Option<&Path>, config: CalculatorConfig) -> Result<()> {
    let runner = ScenarioRunner::from_config(config).context("loading tax brackets")?;
    let state = match (args.no_state, args.state_rate) {
        (true, _) => StatePolicy::None,
        (false, Some(rate_pct)) => StatePolicy::Custom { rate_pct },
        (false, None) => StatePolicy::DefaultFlat,
    };
    let estimate = runner.estimate_tax(&TaxInputs {
        gross_income: args.gross,
        deductions: args.deductions,
        credits: args.credits,
        filing_status: args.filing_status,
        state,
    })?;

    println!("Tax estimate ({}, {})", estimate.tax_year, estimate.filing_status);
    println!("{}", "-".repeat(60));
    println!("  Taxable income: ${:.2}", estimate.taxable_income);
    println!("  Federal tax: ${:.2} ({:.2}%)", estimate.federal_tax, estimate.federal_rate_pct);
    println!("  State tax: ${:.2} ({:.2}%)", estimate.state_tax, estimate.state_rate_pct);
    println!("  Total tax: ${:.2} ({:.2}% effective)", estimate.total_tax, estimate.effective_rate_pct);
    println!("  Marginal rate: {:.0}%", estimate.marginal_rate_pct);
    println!("  Take-home pay: ${:.2}", estimate.take_home_pay);

    println!("\n{:>12} {:>12} {:>6} {:>12} {:>12}", "From", "To", "Rate", "Taxed", "Tax");
    for row in &estimate.brackets {
        let to = row.max.map_or("and up".to_string(), |max| format!("{:.0}", max));
        println!(
            "{:>12.0} {:>12} {:>5.0}% {:>12.2} {:>12.2}{}",
            row.min,
            to,
            row.rate * 100.0,
            row.taxable_in_bracket,
            row.tax_in_bracket,
            if row.is_current { "  <" } else { "" }
        );
    }

    if let Some(path) = csv {
        write_csv(path, &estimate.brackets)?;
    }
    Ok(())
}

fn run_retire(args: RetireArgs, csv: Option<&Path>) -> Result<()> {
    let plan = compute_retirement_plan(&RetirementInputs {
        current_age: args.current_age,
        retirement_age: args.retirement_age,
        current_savings: args.savings,
        monthly_contribution: args.monthly,
        annual_return_pct: args.return_pct,
        inflation_pct: args.inflation_pct,
        annual_income: args.income,
        duration_years: args.duration,
    })?;

    println!("Retirement plan (retire at {})", args.retirement_age);
    println!("{}", "-".repeat(60));
    println!("  Savings at retirement: ${:.2}", plan.retirement_savings);
    println!("  Monthly income: ${:.2}", plan.monthly_retirement_income);
    println!("  Funds last: {} of {} years", plan.years_funds_last, args.duration);
    if let Some(age) = plan.depletion_age {
        println!("  Funds run out at age {:.1}", age);
    }
    println!("  Shortfall: ${:.2}", plan.shortfall);
    println!("  Can retire: {}", if plan.can_retire { "yes" } else { "no" });

    if let Some(path) = csv {
        write_csv(path, &plan.withdrawal_curve)?;
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = CalculatorConfig::from_env();
    let csv = cli.csv.as_deref();

    match cli.command {
        Command::Debt(args) => run_debt(args, csv, &config),
        Command::Invest(args) => run_invest(args, csv),
        Command::Mortgage(args) => run_mortgage(args, csv),
        Command::Tax(args) => run_tax(args, csv, config),
        Command::Retire(args) => run_retire(args, csv),
    }
}

//! fincalc - deterministic projection engines for personal finance calculators
//!
//! This library provides:
//! - Multi-debt payoff planning (avalanche and snowball)
//! - Investment growth with contributions, compounding frequency and inflation
//! - Fixed-rate mortgage payments and amortization schedules
//! - Progressive federal income tax with state tax and take-home estimates
//! - Retirement accumulation and withdrawal sustainability
//! - Scenario comparisons and parallel sweeps

pub mod config;
pub mod debt;
pub mod error;
pub mod investment;
pub mod mortgage;
pub mod projection;
pub mod retirement;
pub mod scenario;
pub mod tax;

// Re-export commonly used types
pub use config::CalculatorConfig;
pub use debt::{compute_debt_payoff_plan, Debt, PayoffPlan, PayoffStrategy};
pub use error::{CalcError, Result};
pub use investment::{compute_investment_growth, InvestmentGrowth, InvestmentInputs};
pub use mortgage::{compute_mortgage, MortgageInputs, MortgageSummary};
pub use projection::CompoundingFrequency;
pub use retirement::{compute_retirement_plan, RetirementInputs, RetirementPlan};
pub use scenario::ScenarioRunner;
pub use tax::{compute_federal_tax, estimate_tax, TaxEstimate, TaxInputs, TaxSchedule};

//! Debt payoff planning with avalanche and snowball prioritization

mod engine;
mod loader;
mod types;

pub use engine::{advance_period, compute_debt_payoff_plan};
pub use loader::{load_debts, load_debts_from_reader};
pub use types::{
    CumulativePoint, Debt, DebtPayment, PayoffPlan, PayoffStatus, PayoffStrategy, PeriodResult,
    MAX_PAYOFF_PERIODS,
};

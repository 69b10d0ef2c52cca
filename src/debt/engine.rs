//! Multi-debt payoff simulation

use log::{debug, warn};

use super::types::{
    Debt, DebtPayment, PayoffPlan, PayoffStatus, PayoffStrategy, PeriodResult, MAX_PAYOFF_PERIODS,
};
use crate::error::{CalcError, Result};
use crate::projection::step;

/// Simulate paying down `debts` with a fixed `monthly_budget`.
///
/// Debts are copied into priority order; the caller's slice is never
/// modified. The plan ends when every balance is zero or after
/// [`MAX_PAYOFF_PERIODS`], in which case the plan status is
/// [`PayoffStatus::CapReached`].
pub fn compute_debt_payoff_plan(
    debts: &[Debt],
    monthly_budget: f64,
    strategy: PayoffStrategy,
) -> Result<PayoffPlan> {
    if debts.is_empty() {
        return Err(CalcError::validation("debts", "empty debt list"));
    }
    if !monthly_budget.is_finite() || monthly_budget <= 0.0 {
        return Err(CalcError::validation("monthly_budget", "invalid budget"));
    }
    for debt in debts {
        debt.validate()?;
    }

    let minimums: f64 = debts
        .iter()
        .filter(|d| !d.is_paid_off())
        .map(|d| d.min_payment)
        .sum();
    if monthly_budget < minimums {
        warn!(
            "monthly budget {:.2} is below the sum of minimum payments {:.2}; minimums are still paid",
            monthly_budget, minimums
        );
    }

    let mut state = strategy.prioritize(debts);
    let mut period_breakdown = Vec::new();
    let mut total_interest = 0.0;
    let mut total_paid = 0.0;
    let mut periods = 0;

    while periods < MAX_PAYOFF_PERIODS && state.iter().any(|d| !d.is_paid_off()) {
        let (next, period) = advance_period(&state, monthly_budget, periods + 1);
        total_interest += period.interest;
        total_paid += period.payment;
        period_breakdown.push(period);
        state = next;
        periods += 1;
    }

    let status = if state.iter().all(Debt::is_paid_off) {
        PayoffStatus::PaidOff
    } else {
        warn!(
            "{} plan did not pay off within {} periods",
            strategy, MAX_PAYOFF_PERIODS
        );
        PayoffStatus::CapReached
    };

    debug!(
        "{} plan: {} periods, interest {:.2}, paid {:.2}",
        strategy, periods, total_interest, total_paid
    );

    Ok(PayoffPlan {
        strategy,
        monthly_budget,
        periods,
        total_interest,
        total_paid,
        status,
        period_breakdown,
        debts: state,
    })
}

/// Advance prioritized debts by one period and return the new snapshot.
///
/// Every open debt accrues interest and receives its minimum payment. Budget
/// left after minimums is swept down the priority order, so a debt paid off
/// mid-sweep passes the remainder on to the next open debt.
pub fn advance_period(debts: &[Debt], budget: f64, index: u32) -> (Vec<Debt>, PeriodResult) {
    let mut next = debts.to_vec();
    let mut result = PeriodResult::new(index);
    let mut remaining = budget;
    let mut slots: Vec<Option<usize>> = vec![None; next.len()];

    for (slot, debt) in slots.iter_mut().zip(next.iter_mut()) {
        if debt.is_paid_off() {
            continue;
        }

        let accrued = step(debt.balance, debt.periodic_rate, 0.0);
        debt.balance = accrued.balance;
        debt.interest_paid += accrued.interest;

        let payment = debt.balance.min(debt.min_payment);
        debt.balance -= payment;
        remaining -= payment;

        result.interest += accrued.interest;
        result.payment += payment;
        *slot = Some(result.per_debt.len());
        result.per_debt.push(DebtPayment {
            name: debt.name.clone(),
            payment,
            interest: accrued.interest,
            balance_after: debt.balance,
        });
    }

    for (slot, debt) in slots.iter().zip(next.iter_mut()) {
        if remaining <= 0.0 {
            break;
        }
        if debt.is_paid_off() {
            continue;
        }

        let payment = debt.balance.min(remaining);
        debt.balance -= payment;
        remaining -= payment;
        result.payment += payment;

        if let Some(entry) = slot.and_then(|i| result.per_debt.get_mut(i)) {
            entry.payment += payment;
            entry.balance_after = debt.balance;
        }
    }

    for (slot, debt) in slots.iter().zip(next.iter_mut()) {
        if slot.is_some() && debt.is_paid_off() && debt.paid_off_period.is_none() {
            debt.paid_off_period = Some(index);
        }
    }

    (next, result)
}

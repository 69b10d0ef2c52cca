//! Year-level accumulation of per-period flows

use serde::{Deserialize, Serialize};

/// Per-year totals collected while periods are simulated
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearRollup {
    pub year: u32,
    /// Money added (contributions) or principal repaid in the year
    pub principal: f64,
    pub interest: f64,
    /// Balance after the last period of the year
    pub ending_balance: f64,
}

impl YearRollup {
    pub fn new(year: u32) -> Self {
        Self {
            year,
            ..Default::default()
        }
    }

    pub fn record(&mut self, principal: f64, interest: f64, balance: f64) {
        self.principal += principal;
        self.interest += interest;
        self.ending_balance = balance;
    }
}

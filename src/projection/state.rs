//! Period clock for year/period bookkeeping during a projection

/// Position of a projection on its timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodClock {
    /// Periods per projection year (12 for monthly)
    pub periods_per_year: u32,

    /// Current projection period (1-indexed, 0 before the first advance)
    pub projection_period: u32,

    /// Projection year (1-indexed)
    pub year: u32,

    /// Period within the year (1..=periods_per_year)
    pub period_in_year: u32,
}

impl PeriodClock {
    /// Clock positioned before the first period
    pub fn new(periods_per_year: u32) -> Self {
        Self {
            periods_per_year: periods_per_year.max(1),
            projection_period: 0,
            year: 1,
            period_in_year: 0,
        }
    }

    pub fn monthly() -> Self {
        Self::new(12)
    }

    /// Advance to the next period
    pub fn advance(&mut self) {
        self.projection_period += 1;
        self.year = (self.projection_period - 1) / self.periods_per_year + 1;
        self.period_in_year = (self.projection_period - 1) % self.periods_per_year + 1;
    }

    /// True on the last period of a projection year
    pub fn is_year_end(&self) -> bool {
        self.period_in_year == self.periods_per_year
    }

    /// Fractional years elapsed at the start of the current period
    pub fn year_fraction(&self) -> f64 {
        (self.year - 1) as f64
            + (self.period_in_year.saturating_sub(1)) as f64 / self.periods_per_year as f64
    }
}

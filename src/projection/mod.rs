//! Period simulator shared by all calculators

mod rollup;
mod state;
mod step;

pub use rollup::YearRollup;
pub use state::PeriodClock;
pub use step::{real_rate, step, CompoundingFrequency, PeriodStep};

/// Longest horizon, in years, any projection loop will run
pub const MAX_HORIZON_YEARS: u32 = 200;

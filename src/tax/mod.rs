//! Progressive income tax estimation

mod brackets;
mod estimate;
mod loader;

pub use brackets::{
    BracketTable, FilingStatus, ResolvedTable, TaxBracket, TaxSchedule, DEFAULT_TAX_YEAR,
};
pub use estimate::{
    bracket_breakdown, compute_federal_tax, estimate_tax, BracketRow, StatePolicy, TaxEstimate,
    TaxInputs,
};
pub use loader::{load_tax_schedule, load_tax_schedule_from_reader};

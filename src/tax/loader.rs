//! Load bracket tables from CSV (filing_status, min, max, rate)
//!
//! An empty `max` marks the unbounded top bracket. Rates are fractions.

use csv::Reader;
use std::path::Path;

use super::brackets::{BracketTable, FilingStatus, TaxBracket, TaxSchedule};
use crate::error::{CalcError, Result};

#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    filing_status: String,
    min: f64,
    max: Option<f64>,
    rate: f64,
}

/// Load a tax schedule for `year` from a CSV file
pub fn load_tax_schedule<P: AsRef<Path>>(path: P, year: u32) -> Result<TaxSchedule> {
    let reader = Reader::from_path(path)?;
    collect_schedule(reader, year)
}

pub fn load_tax_schedule_from_reader<R: std::io::Read>(reader: R, year: u32) -> Result<TaxSchedule> {
    collect_schedule(Reader::from_reader(reader), year)
}

fn collect_schedule<R: std::io::Read>(mut reader: Reader<R>, year: u32) -> Result<TaxSchedule> {
    let mut single = Vec::new();
    let mut married = Vec::new();

    for result in reader.deserialize() {
        let row: CsvRow = result?;
        let status: FilingStatus = row
            .filing_status
            .parse()
            .map_err(CalcError::InvalidBracketTable)?;
        let bracket = TaxBracket::new(row.min, row.max, row.rate);
        match status {
            FilingStatus::Single => single.push(bracket),
            FilingStatus::Married => married.push(bracket),
        }
    }

    for brackets in [&mut single, &mut married] {
        brackets.sort_by(|a, b| a.min.total_cmp(&b.min));
    }

    Ok(TaxSchedule::new(
        year,
        BracketTable::new(single)?,
        BracketTable::new(married)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "\
filing_status,min,max,rate
single,10000,,0.2
single,0,10000,0.1
married,0,20000,0.1
married,20000,,0.2
";

    #[test]
    fn test_load_schedule_from_reader() {
        let schedule = load_tax_schedule_from_reader(TABLE.as_bytes(), 2024).unwrap();

        assert_eq!(schedule.year, 2024);
        assert_eq!(schedule.single.brackets().len(), 2);
        assert_eq!(schedule.single.brackets()[0].min, 0.0);
        assert_eq!(schedule.single.brackets()[1].max, None);
        assert!((schedule.single.tax_on(15_000.0) - 2000.0).abs() < 1e-9);
        assert!((schedule.married.tax_on(15_000.0) - 1500.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_status_rejected() {
        let data = "filing_status,min,max,rate\nsingle,0,,0.1\n";
        let result = load_tax_schedule_from_reader(data.as_bytes(), 2023);
        assert!(matches!(result, Err(CalcError::InvalidBracketTable(_))));
    }

    #[test]
    fn test_unknown_status_rejected() {
        let data = "filing_status,min,max,rate\nsingle,0,,0.1\nmarried,0,,0.1\nwidow,0,,0.1\n";
        assert!(load_tax_schedule_from_reader(data.as_bytes(), 2023).is_err());
    }

    #[test]
    fn test_bundled_2023_table_matches_builtin() {
        let schedule = load_tax_schedule(
            concat!(env!("CARGO_MANIFEST_DIR"), "/data/tax_brackets_2023.csv"),
            2023,
        )
        .unwrap();
        assert_eq!(schedule, TaxSchedule::federal_2023());
    }
}

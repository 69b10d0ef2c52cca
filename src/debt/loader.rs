//! Load debts from CSV rows (name, balance, annual rate %, minimum payment)

use csv::Reader;
use std::path::Path;

use super::Debt;
use crate::error::Result;

/// Raw CSV row matching the debt entry form
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(default)]
    name: String,
    #[serde(default)]
    balance: f64,
    #[serde(default)]
    annual_rate_pct: f64,
    #[serde(default)]
    min_payment: f64,
}

impl CsvRow {
    fn to_debt(self) -> Result<Option<Debt>> {
        Debt::from_form_row(&self.name, self.balance, self.annual_rate_pct, self.min_payment)
    }
}

/// Load all debts from a CSV file
pub fn load_debts<P: AsRef<Path>>(path: P) -> Result<Vec<Debt>> {
    let reader = Reader::from_path(path)?;
    collect_debts(reader)
}

/// Load debts from any reader (e.g. string buffer, request body)
pub fn load_debts_from_reader<R: std::io::Read>(reader: R) -> Result<Vec<Debt>> {
    collect_debts(Reader::from_reader(reader))
}

fn collect_debts<R: std::io::Read>(mut reader: Reader<R>) -> Result<Vec<Debt>> {
    let mut debts = Vec::new();

    for result in reader.deserialize() {
        let row: CsvRow = result?;
        if let Some(debt) = row.to_debt()? {
            debts.push(debt);
        }
    }

    Ok(debts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_debts_from_reader() {
        let data = "\
name,balance,annual_rate_pct,min_payment
Credit Card,1000,15.99,25
,2500,6,50
Closed,0,20,10
";
        let debts = load_debts_from_reader(data.as_bytes()).unwrap();

        assert_eq!(debts.len(), 2);
        assert_eq!(debts[0].name, "Credit Card");
        assert!((debts[0].periodic_rate - 0.1599 / 12.0).abs() < 1e-12);
        assert_eq!(debts[1].name, "Unnamed Debt");
        assert_eq!(debts[1].original_balance, 2500.0);
    }

    #[test]
    fn test_negative_balance_is_an_error() {
        let data = "name,balance,annual_rate_pct,min_payment\nBad,-5,10,1\n";
        assert!(load_debts_from_reader(data.as_bytes()).is_err());
    }

    #[test]
    fn test_malformed_number_is_csv_error() {
        let data = "name,balance,annual_rate_pct,min_payment\nBad,abc,10,1\n";
        let err = load_debts_from_reader(data.as_bytes()).unwrap_err();
        assert!(matches!(err, crate::error::CalcError::Csv(_)));
    }
}

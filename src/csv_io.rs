// 📄 CSV Interchange - bulk import of candidates, export of the ledger

use crate::expense::Expense;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::{Read, Write};
use std::path::Path;

/// One CSV row. `id` is written on export and ignored on import.
#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    #[serde(default)]
    id: String,
    date: String,
    description: String,
    amount: f64,
    category: String,
    payment_method: String,
}

impl From<CsvRow> for Expense {
    fn from(row: CsvRow) -> Self {
        Expense {
            id: String::new(),
            amount: row.amount,
            description: row.description,
            date: row.date,
            category: row.category,
            payment_method: row.payment_method.into(),
            metadata: HashMap::new(),
        }
    }
}

impl From<&Expense> for CsvRow {
    fn from(expense: &Expense) -> Self {
        CsvRow {
            id: expense.id.clone(),
            date: expense.date.clone(),
            description: expense.description.clone(),
            amount: expense.amount,
            category: expense.category.clone(),
            payment_method: expense.payment_method.to_string(),
        }
    }
}

/// Read candidate expenses (no ids) from CSV with a header row
pub fn read_expenses<R: Read>(reader: R) -> Result<Vec<Expense>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut expenses = Vec::new();

    for (index, result) in rdr.deserialize::<CsvRow>().enumerate() {
        // +2: header row and 1-based line numbers
        let row = result.with_context(|| format!("Failed to parse CSV line {}", index + 2))?;
        expenses.push(row.into());
    }

    Ok(expenses)
}

pub fn write_expenses<W: Write>(writer: W, expenses: &[Expense]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    for expense in expenses {
        wtr.serialize(CsvRow::from(expense))
            .context("Failed to write CSV row")?;
    }

    wtr.flush().context("Failed to flush CSV output")?;
    Ok(())
}

pub fn load_csv(csv_path: &Path) -> Result<Vec<Expense>> {
    let file = std::fs::File::open(csv_path)
        .with_context(|| format!("Failed to open CSV file: {:?}", csv_path))?;
    read_expenses(file)
}

pub fn save_csv(csv_path: &Path, expenses: &[Expense]) -> Result<()> {
    let file = std::fs::File::create(csv_path)
        .with_context(|| format!("Failed to create CSV file: {:?}", csv_path))?;
    write_expenses(file, expenses)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expense::PaymentMethod;

    #[test]
    fn test_read_without_id_column() {
        let data = "\
date,description,amount,category,payment_method
2024-01-05,Lunch,12.50,Food,Cash
2024-01-06,Taxi,30,Transport,Credit Card
";
        let expenses = read_expenses(data.as_bytes()).unwrap();

        assert_eq!(expenses.len(), 2);
        assert_eq!(expenses[0].description, "Lunch");
        assert_eq!(expenses[0].amount, 12.5);
        assert_eq!(expenses[1].payment_method, PaymentMethod::CreditCard);
        assert!(expenses.iter().all(|e| e.id.is_empty()));
    }

    #[test]
    fn test_read_ignores_ids() {
        let data = "\
id,date,description,amount,category,payment_method
42,2024-01-05,Lunch,12.50,Food,Cash
";
        let expenses = read_expenses(data.as_bytes()).unwrap();
        assert_eq!(expenses[0].id, "");
    }

    #[test]
    fn test_bad_amount_reports_line() {
        let data = "\
date,description,amount,category,payment_method
2024-01-05,Lunch,twelve,Food,Cash
";
        let err = read_expenses(data.as_bytes()).unwrap_err();
        assert!(format!("{:#}", err).contains("line 2"));
    }

    #[test]
    fn test_export_then_import_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.csv");

        let mut lunch = Expense::new(12.5, "Lunch, with team", "2024-01-05", "Food", "Cash");
        lunch.id = "1".to_string();
        let mut voucher = Expense::new(8.0, "Book", "2024-01-07", "Leisure", "Gift voucher");
        voucher.id = "2".to_string();

        save_csv(&path, &[lunch.clone(), voucher.clone()]).unwrap();
        let imported = load_csv(&path).unwrap();

        assert_eq!(imported.len(), 2);
        assert_eq!(imported[0].description, "Lunch, with team");
        assert_eq!(imported[1].payment_method, voucher.payment_method);
        assert_eq!(imported[1].amount, 8.0);
    }
}

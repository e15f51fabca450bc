// ✏️ Expense Draft - raw entry-form text, checked before it becomes a candidate
// The store trusts what it is given, so the CLI and TUI validate here first.

use crate::expense::{parse_calendar_date, Expense, PaymentMethod};
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("'{0}' is not an amount")]
    InvalidAmount(String),

    #[error("amount must be positive")]
    NonPositiveAmount,

    #[error("'{0}' is not a date (expected YYYY-MM-DD)")]
    InvalidDate(String),
}

/// Form fields as typed. Text is kept verbatim; only the amount is converted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpenseDraft {
    pub amount: String,
    pub description: String,
    pub date: String,
    pub category: String,
    pub payment_method: String,
}

impl ExpenseDraft {
    /// Blank draft dated `today`
    pub fn new(today: NaiveDate) -> Self {
        ExpenseDraft {
            date: today.format("%Y-%m-%d").to_string(),
            ..Default::default()
        }
    }

    /// Pre-filled from a stored record, for editing
    pub fn from_expense(expense: &Expense) -> Self {
        ExpenseDraft {
            amount: expense.amount.to_string(),
            description: expense.description.clone(),
            date: expense.date.clone(),
            category: expense.category.clone(),
            payment_method: expense.payment_method.to_string(),
        }
    }

    /// Validate and build a new candidate (no id)
    pub fn to_candidate(&self) -> Result<Expense, DraftError> {
        let amount = self.checked_amount()?;
        require("description", &self.description)?;
        self.check_date()?;
        require("category", &self.category)?;
        require("payment method", &self.payment_method)?;

        Ok(Expense::new(
            amount,
            self.description.as_str(),
            self.date.as_str(),
            self.category.as_str(),
            PaymentMethod::from(self.payment_method.as_str()),
        ))
    }

    /// Validate and overlay the draft on `record`, keeping its id and extra fields
    pub fn apply_to(&self, record: &Expense) -> Result<Expense, DraftError> {
        let candidate = self.to_candidate()?;
        Ok(Expense {
            id: record.id.clone(),
            metadata: record.metadata.clone(),
            ..candidate
        })
    }

    fn checked_amount(&self) -> Result<f64, DraftError> {
        let text = self.amount.trim();
        if text.is_empty() {
            return Err(DraftError::Missing("amount"));
        }

        let amount: f64 = text
            .parse()
            .map_err(|_| DraftError::InvalidAmount(self.amount.clone()))?;
        if !amount.is_finite() {
            return Err(DraftError::InvalidAmount(self.amount.clone()));
        }
        if amount <= 0.0 {
            return Err(DraftError::NonPositiveAmount);
        }
        Ok(amount)
    }

    fn check_date(&self) -> Result<(), DraftError> {
        require("date", &self.date)?;
        match parse_calendar_date(&self.date) {
            Some(_) => Ok(()),
            None => Err(DraftError::InvalidDate(self.date.clone())),
        }
    }
}

fn require(field: &'static str, value: &str) -> Result<(), DraftError> {
    if value.trim().is_empty() {
        Err(DraftError::Missing(field))
    } else {
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> ExpenseDraft {
        ExpenseDraft {
            amount: "12.50".to_string(),
            description: "Lunch".to_string(),
            date: "2024-01-05".to_string(),
            category: "Food".to_string(),
            payment_method: "Cash".to_string(),
        }
    }

    #[test]
    fn test_new_draft_is_dated_today() {
        let draft = ExpenseDraft::new(NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());
        assert_eq!(draft.date, "2024-03-09");
        assert!(draft.amount.is_empty());
    }

    #[test]
    fn test_valid_draft_becomes_candidate() {
        let candidate = filled().to_candidate().unwrap();

        assert!(candidate.id.is_empty());
        assert_eq!(candidate.amount, 12.5);
        assert_eq!(candidate.description, "Lunch");
        assert_eq!(candidate.payment_method, PaymentMethod::Cash);
    }

    #[test]
    fn test_free_text_payment_method_kept_verbatim() {
        let mut draft = filled();
        draft.payment_method = "cash".to_string();

        let candidate = draft.to_candidate().unwrap();
        assert_eq!(candidate.payment_method.as_str(), "cash");
    }

    #[test]
    fn test_rejections_in_form_order() {
        let mut draft = ExpenseDraft::default();
        assert_eq!(draft.to_candidate(), Err(DraftError::Missing("amount")));

        draft.amount = "twelve".to_string();
        assert_eq!(
            draft.to_candidate(),
            Err(DraftError::InvalidAmount("twelve".to_string()))
        );

        draft.amount = "0".to_string();
        assert_eq!(draft.to_candidate(), Err(DraftError::NonPositiveAmount));

        draft.amount = "3".to_string();
        assert_eq!(draft.to_candidate(), Err(DraftError::Missing("description")));

        draft.description = "Tea".to_string();
        draft.date = "tomorrow".to_string();
        assert_eq!(
            draft.to_candidate(),
            Err(DraftError::InvalidDate("tomorrow".to_string()))
        );

        draft.date = "2024-01-01".to_string();
        assert_eq!(draft.to_candidate(), Err(DraftError::Missing("category")));

        draft.category = "Food".to_string();
        assert_eq!(draft.to_candidate(), Err(DraftError::Missing("payment method")));
    }

    #[test]
    fn test_apply_keeps_id_and_extra_fields() {
        let mut stored = filled().to_candidate().unwrap();
        stored.id = "1700000000000".to_string();
        stored
            .metadata
            .insert("note".to_string(), serde_json::json!("team lunch"));

        let mut draft = ExpenseDraft::from_expense(&stored);
        assert_eq!(draft.amount, "12.5");
        draft.amount = "15".to_string();

        let edited = draft.apply_to(&stored).unwrap();
        assert_eq!(edited.id, stored.id);
        assert_eq!(edited.amount, 15.0);
        assert_eq!(edited.metadata["note"], "team lunch");
    }
}

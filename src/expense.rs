// 🧾 Expense Model - the single entity of the tracker
// Core fields mirror the persisted JSON layout, unknown keys ride along in metadata

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// ============================================================================
// PAYMENT METHOD
// ============================================================================

/// Open enumeration of payment methods.
///
/// The four well-known labels get their own variant when spelled exactly as
/// the entry form offers them. Anything else is kept verbatim in `Other`, so
/// text entered elsewhere round-trips unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PaymentMethod {
    Cash,
    CreditCard,
    DebitCard,
    BankTransfer,
    Other(String),
}

impl PaymentMethod {
    /// Choices offered by the entry form, in display order
    pub const KNOWN: [PaymentMethod; 4] = [
        PaymentMethod::Cash,
        PaymentMethod::CreditCard,
        PaymentMethod::DebitCard,
        PaymentMethod::BankTransfer,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            PaymentMethod::Cash => "Cash",
            PaymentMethod::CreditCard => "Credit Card",
            PaymentMethod::DebitCard => "Debit Card",
            PaymentMethod::BankTransfer => "Bank Transfer",
            PaymentMethod::Other(text) => text,
        }
    }

    /// Exact-spelling lookup of a known label
    fn known(text: &str) -> Option<Self> {
        PaymentMethod::KNOWN
            .iter()
            .find(|method| method.as_str() == text)
            .cloned()
    }

    /// Next entry of `KNOWN` after this one (free text starts over at the first)
    pub fn next_known(&self) -> Self {
        let index = PaymentMethod::KNOWN.iter().position(|m| m == self);
        match index {
            Some(i) => PaymentMethod::KNOWN[(i + 1) % PaymentMethod::KNOWN.len()].clone(),
            None => PaymentMethod::Cash,
        }
    }
}

impl From<String> for PaymentMethod {
    fn from(text: String) -> Self {
        PaymentMethod::known(&text).unwrap_or(PaymentMethod::Other(text))
    }
}

impl From<&str> for PaymentMethod {
    fn from(text: &str) -> Self {
        PaymentMethod::from(text.to_string())
    }
}

impl From<PaymentMethod> for String {
    fn from(method: PaymentMethod) -> Self {
        match method {
            PaymentMethod::Other(text) => text,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

// ============================================================================
// EXPENSE
// ============================================================================

/// A single recorded expense.
///
/// `id` is owned by the store: whatever a caller puts there before
/// `ExpenseStore::add_expense` is replaced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    #[serde(default)]
    pub id: String,

    pub amount: f64,

    pub description: String,

    /// ISO calendar date, e.g. "2024-01-05"
    pub date: String,

    pub category: String,

    pub payment_method: PaymentMethod,

    // ========================================================================
    // EXTENSIBLE METADATA
    // Keys this version doesn't know about, written back untouched
    // ========================================================================
    #[serde(flatten)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl Expense {
    /// Build a candidate expense (no id yet)
    pub fn new(
        amount: f64,
        description: impl Into<String>,
        date: impl Into<String>,
        category: impl Into<String>,
        payment_method: impl Into<PaymentMethod>,
    ) -> Self {
        Expense {
            id: String::new(),
            amount,
            description: description.into(),
            date: date.into(),
            category: category.into(),
            payment_method: payment_method.into(),
            metadata: HashMap::new(),
        }
    }

    /// Calendar date of the expense, `None` when the stored text isn't a date
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        parse_calendar_date(&self.date)
    }

    /// Check whether description, category or payment method contain `needle`.
    /// `needle` must already be lowercase.
    pub fn mentions(&self, needle: &str) -> bool {
        self.description.to_lowercase().contains(needle)
            || self.category.to_lowercase().contains(needle)
            || self.payment_method.as_str().to_lowercase().contains(needle)
    }
}

/// Parse the date formats found in persisted data and imports.
///
/// Accepts `YYYY-MM-DD`, an RFC 3339 timestamp (its date part), and `MM/DD/YYYY`.
pub fn parse_calendar_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(date);
    }

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(text) {
        return Some(timestamp.date_naive());
    }

    NaiveDate::parse_from_str(text, "%m/%d/%Y").ok()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_method_known_labels() {
        assert_eq!(PaymentMethod::from("Cash"), PaymentMethod::Cash);
        assert_eq!(PaymentMethod::from("Credit Card"), PaymentMethod::CreditCard);
        assert_eq!(PaymentMethod::from("Debit Card"), PaymentMethod::DebitCard);
        assert_eq!(PaymentMethod::from("Bank Transfer"), PaymentMethod::BankTransfer);
        assert_eq!(
            PaymentMethod::from("PayPal"),
            PaymentMethod::Other("PayPal".to_string())
        );
    }

    #[test]
    fn test_payment_method_keeps_other_spellings_verbatim() {
        for text in ["cash", "CREDIT CARD", " Debit card ", "bank transfer"] {
            let method = PaymentMethod::from(text);
            assert_eq!(method, PaymentMethod::Other(text.to_string()));
            assert_eq!(String::from(method), text);
        }
    }

    #[test]
    fn test_next_known_cycles_through_form_choices() {
        assert_eq!(PaymentMethod::Cash.next_known(), PaymentMethod::CreditCard);
        assert_eq!(PaymentMethod::BankTransfer.next_known(), PaymentMethod::Cash);
        assert_eq!(
            PaymentMethod::Other("cash".to_string()).next_known(),
            PaymentMethod::Cash
        );
    }

    #[test]
    fn test_payment_method_serializes_as_label() {
        let json = serde_json::to_string(&PaymentMethod::CreditCard).unwrap();
        assert_eq!(json, "\"Credit Card\"");

        let other: PaymentMethod = serde_json::from_str("\"Gift voucher\"").unwrap();
        assert_eq!(other.as_str(), "Gift voucher");
    }

    #[test]
    fn test_expense_json_layout() {
        let json = r#"{
            "id": "1704412800000",
            "amount": 12.5,
            "description": "Lunch",
            "date": "2024-01-05",
            "category": "Food",
            "paymentMethod": "Cash"
        }"#;

        let expense: Expense = serde_json::from_str(json).unwrap();
        assert_eq!(expense.id, "1704412800000");
        assert_eq!(expense.amount, 12.5);
        assert_eq!(expense.payment_method, PaymentMethod::Cash);
        assert!(expense.metadata.is_empty());

        let value = serde_json::to_value(&expense).unwrap();
        assert_eq!(value["paymentMethod"], "Cash");
        assert!(value.get("payment_method").is_none());
    }

    #[test]
    fn test_unknown_fields_are_preserved() {
        let json = r#"{
            "id": "1",
            "amount": 3.0,
            "description": "Coffee",
            "date": "2024-03-01",
            "category": "Food",
            "paymentMethod": "Cash",
            "receipt": {"url": "r/1.png"},
            "tags": ["morning"]
        }"#;

        let expense: Expense = serde_json::from_str(json).unwrap();
        assert!(expense.metadata.contains_key("receipt"));
        assert!(expense.metadata.contains_key("tags"));

        let value = serde_json::to_value(&expense).unwrap();
        assert_eq!(value["receipt"]["url"], "r/1.png");
        assert_eq!(value["tags"][0], "morning");
    }

    #[test]
    fn test_parse_calendar_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();

        assert_eq!(parse_calendar_date("2024-01-05"), Some(expected));
        assert_eq!(parse_calendar_date("2024-01-05T10:30:00Z"), Some(expected));
        assert_eq!(parse_calendar_date("01/05/2024"), Some(expected));
        assert_eq!(parse_calendar_date(""), None);
        assert_eq!(parse_calendar_date("not a date"), None);
    }

    #[test]
    fn test_mentions_is_case_insensitive_over_three_fields() {
        let expense = Expense::new(2.0, "Bus fare", "2024-01-01", "Transport", "Cash");

        assert!(expense.mentions("bus"));
        assert!(expense.mentions("transp"));
        assert!(expense.mentions("cash"));
        assert!(!expense.mentions("food"));
    }
}

// 🔍 Filter Engine - narrow an expense list by optional criteria
// Empty criterion = no constraint. Active criteria AND together. Input order kept.

use crate::expense::{parse_calendar_date, Expense};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::warn;

// ============================================================================
// CRITERIA
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterCriteria {
    /// Exact, case-sensitive category
    pub category: String,

    /// Inclusive lower bound, ISO date
    pub start_date: String,

    /// Inclusive upper bound, ISO date
    pub end_date: String,

    /// Case-insensitive exact payment method
    pub payment_method: String,

    /// Case-insensitive substring of description, category or payment method
    pub search_term: String,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_date_range(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.start_date = start.into();
        self.end_date = end.into();
        self
    }

    pub fn with_payment_method(mut self, method: impl Into<String>) -> Self {
        self.payment_method = method.into();
        self
    }

    pub fn with_search_term(mut self, term: impl Into<String>) -> Self {
        self.search_term = term.into();
        self
    }

    /// True when no criterion is active
    pub fn is_empty(&self) -> bool {
        self.category.is_empty()
            && self.start_date.is_empty()
            && self.end_date.is_empty()
            && self.payment_method.is_empty()
            && self.search_term.is_empty()
    }

    /// Resolve string criteria once so the per-expense check stays cheap
    fn compile(&self) -> CompiledCriteria<'_> {
        CompiledCriteria {
            category: non_empty(&self.category),
            start: parse_bound("start", &self.start_date),
            end: parse_bound("end", &self.end_date),
            payment_method: non_empty(&self.payment_method).map(str::to_lowercase),
            search_term: non_empty(&self.search_term).map(str::to_lowercase),
        }
    }
}

struct CompiledCriteria<'a> {
    category: Option<&'a str>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    payment_method: Option<String>,
    search_term: Option<String>,
}

impl CompiledCriteria<'_> {
    fn matches(&self, expense: &Expense) -> bool {
        if let Some(category) = self.category {
            if expense.category != category {
                return false;
            }
        }

        if self.start.is_some() || self.end.is_some() {
            let date = match expense.parsed_date() {
                Some(date) => date,
                None => return false,
            };
            if self.start.map_or(false, |start| date < start) {
                return false;
            }
            if self.end.map_or(false, |end| date > end) {
                return false;
            }
        }

        if let Some(method) = &self.payment_method {
            if expense.payment_method.as_str().to_lowercase() != *method {
                return false;
            }
        }

        if let Some(term) = &self.search_term {
            if !expense.mentions(term) {
                return false;
            }
        }

        true
    }
}

fn non_empty(text: &str) -> Option<&str> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn parse_bound(side: &str, text: &str) -> Option<NaiveDate> {
    if text.is_empty() {
        return None;
    }
    let parsed = parse_calendar_date(text);
    if parsed.is_none() {
        warn!("Ignoring unparseable {} date bound '{}'", side, text);
    }
    parsed
}

// ============================================================================
// FILTER
// ============================================================================

/// Stable filter: returns the matching expenses in input order
pub fn filter_expenses(expenses: &[Expense], criteria: &FilterCriteria) -> Vec<Expense> {
    if criteria.is_empty() {
        return expenses.to_vec();
    }

    let compiled = criteria.compile();
    expenses
        .iter()
        .filter(|e| compiled.matches(e))
        .cloned()
        .collect()
}

/// Categories in first-seen order, for choice lists
pub fn distinct_categories(expenses: &[Expense]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut categories = Vec::new();
    for expense in expenses {
        if seen.insert(expense.category.as_str()) {
            categories.push(expense.category.clone());
        }
    }
    categories
}

/// Payment methods in first-seen order, for choice lists
pub fn distinct_payment_methods(expenses: &[Expense]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut methods = Vec::new();
    for expense in expenses {
        if seen.insert(expense.payment_method.as_str()) {
            methods.push(expense.payment_method.to_string());
        }
    }
    methods
}

// ============================================================================
// TESTS
// ============================================================================

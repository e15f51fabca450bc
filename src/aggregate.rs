// 📊 Aggregation Engine - monthly totals, category breakdown, trend
//
// Every function here is pure: "today" is always a parameter,
// never read from the clock.

use crate::expense::Expense;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

// ============================================================================
// RESULT TYPES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTotal {
    /// Sort key, "YYYY-MM"
    pub month: String,

    /// Human readable, e.g. "Jan 2024"
    pub label: String,

    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: f64,

    /// Share of the grand total, 0-100, two decimals
    pub percentage: f64,
}

/// Everything the statistics panel shows, computed in one pass over the list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub expense_count: usize,
    pub grand_total: f64,
    pub current_month_total: f64,
    pub previous_month_total: f64,

    /// Month-over-month change in percent
    pub trend: f64,

    pub category_ranking: Vec<CategoryTotal>,
}

// ============================================================================
// MONTHLY
// ============================================================================

/// Sum per calendar month, ascending. Expenses without a valid date are skipped.
pub fn monthly_totals(expenses: &[Expense]) -> Vec<MonthlyTotal> {
    let mut totals: BTreeMap<(i32, u32), f64> = BTreeMap::new();

    for expense in expenses {
        if let Some(date) = expense.parsed_date() {
            *totals.entry((date.year(), date.month())).or_insert(0.0) += expense.amount;
        }
    }

    totals
        .into_iter()
        .filter_map(|((year, month), total)| {
            let first = NaiveDate::from_ymd_opt(year, month, 1)?;
            Some(MonthlyTotal {
                month: first.format("%Y-%m").to_string(),
                label: first.format("%b %Y").to_string(),
                total,
            })
        })
        .collect()
}

/// Sum of expenses dated in the same calendar month and year as `today`
pub fn current_month_total(expenses: &[Expense], today: NaiveDate) -> f64 {
    month_total(expenses, today.year(), today.month())
}

/// Sum of expenses dated in the calendar month before `today`'s
pub fn previous_month_total(expenses: &[Expense], today: NaiveDate) -> f64 {
    let (year, month) = previous_month(today.year(), today.month());
    month_total(expenses, year, month)
}

fn month_total(expenses: &[Expense], year: i32, month: u32) -> f64 {
    expenses
        .iter()
        .filter(|e| {
            e.parsed_date()
                .map_or(false, |d| d.year() == year && d.month() == month)
        })
        .map(|e| e.amount)
        .sum()
}

fn previous_month(year: i32, month: u32) -> (i32, u32) {
    if month == 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}

// ============================================================================
// TREND
// ============================================================================

/// Percent change from `previous` to `current`, two decimals.
/// Zero when there is nothing to compare against.
pub fn trend_percentage(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        return 0.0;
    }
    round2((current - previous) / previous * 100.0)
}

/// This month against last month, relative to `today`
pub fn month_over_month_trend(expenses: &[Expense], today: NaiveDate) -> f64 {
    trend_percentage(
        current_month_total(expenses, today),
        previous_month_total(expenses, today),
    )
}

// ============================================================================
// CATEGORIES
// ============================================================================

/// Sum per category in first-seen order, with each category's share
pub fn category_totals(expenses: &[Expense]) -> Vec<CategoryTotal> {
    let mut order: Vec<&str> = Vec::new();
    let mut totals: HashMap<&str, f64> = HashMap::new();
    let mut grand_total = 0.0;

    for expense in expenses {
        let category = expense.category.as_str();
        let slot = totals.entry(category).or_insert_with(|| {
            order.push(category);
            0.0
        });
        *slot += expense.amount;
        grand_total += expense.amount;
    }

    order
        .into_iter()
        .map(|category| {
            let total = totals[category];
            CategoryTotal {
                category: category.to_string(),
                total,
                percentage: share_of(total, grand_total),
            }
        })
        .collect()
}

/// Category totals, largest first. Equal totals keep first-seen order.
pub fn category_ranking(expenses: &[Expense]) -> Vec<CategoryTotal> {
    let mut ranking = category_totals(expenses);
    ranking.sort_by(|a, b| b.total.total_cmp(&a.total));
    ranking
}

fn share_of(part: f64, whole: f64) -> f64 {
    if whole == 0.0 {
        return 0.0;
    }
    round2(part / whole * 100.0)
}

// ============================================================================
// SUMMARY
// ============================================================================

pub fn summarize(expenses: &[Expense], today: NaiveDate) -> Summary {
    let current = current_month_total(expenses, today);
    let previous = previous_month_total(expenses, today);

    Summary {
        expense_count: expenses.len(),
        grand_total: expenses.iter().map(|e| e.amount).sum(),
        current_month_total: current,
        previous_month_total: previous,
        trend: trend_percentage(current, previous),
        category_ranking: category_ranking(expenses),
    }
}

/// Round to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn dated(date: &str, amount: f64) -> Expense {
        Expense::new(amount, "item", date, "Misc", "Cash")
    }

    fn in_category(category: &str, amount: f64) -> Expense {
        Expense::new(amount, "item", "2024-01-01", category, "Cash")
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_monthly_totals_example() {
        let expenses = vec![
            dated("2024-01-05", 10.0),
            dated("2024-01-20", 5.0),
            dated("2024-02-01", 7.0),
        ];

        let totals = monthly_totals(&expenses);
        assert_eq!(
            totals,
            vec![
                MonthlyTotal {
                    month: "2024-01".to_string(),
                    label: "Jan 2024".to_string(),
                    total: 15.0,
                },
                MonthlyTotal {
                    month: "2024-02".to_string(),
                    label: "Feb 2024".to_string(),
                    total: 7.0,
                },
            ]
        );
    }

    #[test]
    fn test_monthly_totals_sorted_across_years_and_skip_bad_dates() {
        let expenses = vec![
            dated("2024-03-01", 1.0),
            dated("2023-12-31", 2.0),
            dated("garbage", 100.0),
            dated("2024-01-15", 3.0),
        ];

        let months: Vec<_> = monthly_totals(&expenses)
            .into_iter()
            .map(|m| (m.month, m.total))
            .collect();
        assert_eq!(
            months,
            vec![
                ("2023-12".to_string(), 2.0),
                ("2024-01".to_string(), 3.0),
                ("2024-03".to_string(), 1.0),
            ]
        );
    }

    #[test]
    fn test_category_percentage_example() {
        let expenses = vec![in_category("Food", 30.0), in_category("Transport", 70.0)];

        let totals = category_totals(&expenses);
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].category, "Food");
        assert_eq!(totals[0].total, 30.0);
        assert_eq!(totals[0].percentage, 30.0);
        assert_eq!(totals[1].category, "Transport");
        assert_eq!(totals[1].total, 70.0);
        assert_eq!(totals[1].percentage, 70.0);
    }

    #[test]
    fn test_category_percentage_rounds_to_two_decimals() {
        let expenses = vec![
            in_category("A", 1.0),
            in_category("B", 1.0),
            in_category("C", 1.0),
        ];

        let totals = category_totals(&expenses);
        assert!(totals.iter().all(|c| c.percentage == 33.33));
    }

    #[test]
    fn test_category_percentage_zero_grand_total() {
        let expenses = vec![in_category("Food", 0.0)];

        let totals = category_totals(&expenses);
        assert_eq!(totals[0].percentage, 0.0);
        assert!(category_totals(&[]).is_empty());
    }

    #[test]
    fn test_current_month_total_uses_given_today() {
        let expenses = vec![
            dated("2024-05-01", 10.0),
            dated("2024-05-31", 15.0),
            dated("2023-05-15", 99.0),
            dated("2024-04-30", 7.0),
        ];

        assert_eq!(current_month_total(&expenses, day(2024, 5, 18)), 25.0);
        assert_eq!(previous_month_total(&expenses, day(2024, 5, 18)), 7.0);
    }

    #[test]
    fn test_previous_month_wraps_year() {
        let expenses = vec![dated("2023-12-10", 40.0), dated("2024-01-03", 50.0)];
        let today = day(2024, 1, 20);

        assert_eq!(previous_month_total(&expenses, today), 40.0);
        assert_eq!(month_over_month_trend(&expenses, today), 25.0);
    }

    #[test]
    fn test_trend_with_zero_previous_month() {
        assert_eq!(trend_percentage(50.0, 0.0), 0.0);

        let expenses = vec![dated("2024-02-10", 50.0)];
        assert_eq!(month_over_month_trend(&expenses, day(2024, 2, 15)), 0.0);
    }

    #[test]
    fn test_trend_rounding_and_decrease() {
        assert_eq!(trend_percentage(20.0, 30.0), -33.33);
        assert_eq!(trend_percentage(45.0, 30.0), 50.0);
    }

    #[test]
    fn test_category_ranking_descending_and_stable() {
        let expenses = vec![
            in_category("Rent", 10.0),
            in_category("Food", 40.0),
            in_category("Fun", 10.0),
            in_category("Food", 5.0),
        ];

        let ranking: Vec<_> = category_ranking(&expenses)
            .into_iter()
            .map(|c| (c.category, c.total))
            .collect();
        assert_eq!(
            ranking,
            vec![
                ("Food".to_string(), 45.0),
                ("Rent".to_string(), 10.0),
                ("Fun".to_string(), 10.0),
            ]
        );
    }

    #[test]
    fn test_summarize() {
        let expenses = vec![
            Expense::new(30.0, "Groceries", "2024-03-02", "Food", "Cash"),
            Expense::new(20.0, "Train", "2024-03-10", "Transport", "Debit Card"),
            Expense::new(40.0, "Groceries", "2024-02-12", "Food", "Cash"),
        ];

        let summary = summarize(&expenses, day(2024, 3, 15));
        assert_eq!(summary.expense_count, 3);
        assert_eq!(summary.grand_total, 90.0);
        assert_eq!(summary.current_month_total, 50.0);
        assert_eq!(summary.previous_month_total, 40.0);
        assert_eq!(summary.trend, 25.0);
        assert_eq!(summary.category_ranking[0].category, "Food");
        assert_eq!(summary.category_ranking[0].percentage, 77.78);
    }
}

// Expense Tracker - Core Library
// Exposes the store, filter and aggregation engines for the CLI, TUI, API server and tests

pub mod expense;
pub mod draft;
pub mod storage;
pub mod store;
pub mod filter;
pub mod aggregate;
pub mod csv_io;
pub mod config;

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use expense::{parse_calendar_date, Expense, PaymentMethod};
pub use draft::{DraftError, ExpenseDraft};
pub use storage::{KeyValueStore, SqliteKeyValueStore, StorageError};
pub use store::{ExpenseStore, EXPENSES_KEY};
pub use filter::{
    distinct_categories, distinct_payment_methods, filter_expenses, FilterCriteria,
};
pub use aggregate::{
    category_ranking, category_totals, current_month_total, month_over_month_trend,
    monthly_totals, previous_month_total, summarize, trend_percentage,
    CategoryTotal, MonthlyTotal, Summary,
};
pub use csv_io::{load_csv, save_csv};
pub use config::{init_logging, Config};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Open the store described by `config`
pub fn open_store(config: &Config) -> anyhow::Result<ExpenseStore<SqliteKeyValueStore>> {
    use anyhow::Context;

    let storage = SqliteKeyValueStore::open(&config.db_path)
        .with_context(|| format!("Failed to open database {:?}", config.db_path))?;
    ExpenseStore::open(storage)
}

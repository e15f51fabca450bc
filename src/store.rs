// 💾 Expense Store - owns the collection, persists it on every mutation
//
// The whole collection lives under one key as a JSON array.
// Loading is soft: a missing or corrupt entry starts an empty ledger.
// Writing is hard: if the medium fails, the caller hears about it.

use crate::expense::Expense;
use crate::storage::KeyValueStore;
use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{debug, info, warn};

/// Well-known key the collection is persisted under
pub const EXPENSES_KEY: &str = "expenses";

pub struct ExpenseStore<S: KeyValueStore> {
    storage: S,
    expenses: Vec<Expense>,
    last_issued_id: i64,
}

impl<S: KeyValueStore> ExpenseStore<S> {
    /// Load the persisted collection from `storage`.
    ///
    /// Absent or unparseable data yields an empty store. Only a failing
    /// storage medium is an error.
    pub fn open(storage: S) -> Result<Self> {
        let raw = storage
            .get(EXPENSES_KEY)
            .context("Failed to read persisted expenses")?;

        let expenses = match raw {
            None => {
                info!("No persisted expenses found, starting empty");
                Vec::new()
            }
            Some(json) => match serde_json::from_str::<Vec<Expense>>(&json) {
                Ok(expenses) => {
                    info!("Loaded {} expenses", expenses.len());
                    expenses
                }
                Err(e) => {
                    warn!("Persisted expenses are unreadable ({}), starting empty", e);
                    Vec::new()
                }
            },
        };

        Ok(ExpenseStore {
            storage,
            expenses,
            last_issued_id: 0,
        })
    }

    /// Current collection, insertion order
    pub fn list_expenses(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn get_expense(&self, id: &str) -> Option<&Expense> {
        self.expenses.iter().find(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.expenses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expenses.is_empty()
    }

    /// Append `candidate` under a fresh id and persist. Returns the stored record.
    pub fn add_expense(&mut self, mut candidate: Expense) -> Result<Expense> {
        candidate.id = self.next_id();

        let mut next = self.expenses.clone();
        next.push(candidate.clone());
        self.commit(next)?;

        info!(
            "Added expense {} ({:.2} {})",
            candidate.id, candidate.amount, candidate.category
        );
        Ok(candidate)
    }

    /// Replace the entry with the same id. Returns `false` (and changes nothing
    /// in memory) when no entry matches.
    pub fn update_expense(&mut self, record: Expense) -> Result<bool> {
        let id = record.id.clone();
        let mut next = self.expenses.clone();
        let position = next.iter().position(|e| e.id == id);
        if let Some(index) = position {
            next[index] = record;
        }

        self.commit(next)?;

        if position.is_some() {
            info!("Updated expense {}", id);
        } else {
            debug!("Update ignored: no expense with id {}", id);
        }
        Ok(position.is_some())
    }

    /// Remove the entry with `id`. Returns whether anything was removed.
    pub fn delete_expense(&mut self, id: &str) -> Result<bool> {
        let mut next = self.expenses.clone();
        next.retain(|e| e.id != id);
        let removed = next.len() < self.expenses.len();

        self.commit(next)?;

        if removed {
            info!("Deleted expense {}", id);
        } else {
            debug!("Delete ignored: no expense with id {}", id);
        }
        Ok(removed)
    }

    /// Give the storage back, e.g. to reopen it in a test
    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Millisecond timestamp, bumped until it is past the last one we issued
    /// and not already taken by a loaded record.
    fn next_id(&mut self) -> String {
        let mut candidate = Utc::now().timestamp_millis().max(self.last_issued_id + 1);

        while self.id_taken(candidate) {
            candidate += 1;
        }

        self.last_issued_id = candidate;
        candidate.to_string()
    }

    fn id_taken(&self, candidate: i64) -> bool {
        let text = candidate.to_string();
        self.expenses.iter().any(|e| e.id == text)
    }

    /// Full rewrite of the persisted collection. Memory only takes `next`
    /// once storage has accepted it.
    fn commit(&mut self, next: Vec<Expense>) -> Result<()> {
        let json = serde_json::to_string(&next).context("Failed to encode expenses")?;

        self.storage
            .set(EXPENSES_KEY, &json)
            .context("Failed to persist expenses")?;

        self.expenses = next;
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================

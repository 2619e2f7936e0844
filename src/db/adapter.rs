use rust_decimal::Decimal;
use std::str::FromStr;

use super::{KeyValueStore, PersistenceError};
use crate::models::ExpenseRecord;
use crate::store::{ExpenseStore, DEFAULT_BUDGET};

pub(crate) const EXPENSES_KEY: &str = "budget-expenses";
pub(crate) const BUDGET_KEY: &str = "budget-limit";

/// Best-effort bridge between the in-memory store and a key-value backend.
///
/// Nothing here ever fails from the caller's point of view: read errors fall
/// back to defaults and write errors are dropped (logged at debug level).
pub(crate) struct PersistenceAdapter {
    backend: Option<Box<dyn KeyValueStore>>,
}

impl PersistenceAdapter {
    pub(crate) fn new(backend: Box<dyn KeyValueStore>) -> Self {
        Self {
            backend: Some(backend),
        }
    }

    /// No backend: all state stays in process memory.
    pub(crate) fn volatile() -> Self {
        Self { backend: None }
    }

    pub(crate) fn is_persistent(&self) -> bool {
        self.backend.is_some()
    }

    pub(crate) fn load(&self) -> ExpenseStore {
        let Some(backend) = self.backend.as_deref() else {
            return ExpenseStore::default();
        };

        let expenses = match read_expenses(backend) {
            Ok(list) => list.unwrap_or_default(),
            Err(e) => {
                tracing::debug!(key = EXPENSES_KEY, "ignoring unreadable expenses: {e}");
                Vec::new()
            }
        };
        let budget = match read_budget(backend) {
            Ok(b) => b.unwrap_or(DEFAULT_BUDGET),
            Err(e) => {
                tracing::debug!(key = BUDGET_KEY, "ignoring unreadable budget: {e}");
                DEFAULT_BUDGET
            }
        };

        ExpenseStore::from_parts(expenses, budget)
    }

    /// Write the current state. Always writes the latest snapshot in full, so
    /// the last save wins.
    pub(crate) fn save(&self, store: &ExpenseStore) {
        let Some(backend) = self.backend.as_deref() else {
            return;
        };
        let snapshot = store.snapshot();

        match serde_json::to_string(&snapshot.expenses) {
            Ok(json) => {
                if let Err(e) = backend.set(EXPENSES_KEY, &json) {
                    tracing::debug!(key = EXPENSES_KEY, "save failed: {e}");
                }
            }
            Err(e) => tracing::debug!(key = EXPENSES_KEY, "serialize failed: {e}"),
        }

        if let Err(e) = backend.set(BUDGET_KEY, &snapshot.budget.to_string()) {
            tracing::debug!(key = BUDGET_KEY, "save failed: {e}");
        }
    }
}

fn read_expenses(
    backend: &dyn KeyValueStore,
) -> Result<Option<Vec<ExpenseRecord>>, PersistenceError> {
    backend
        .get(EXPENSES_KEY)?
        .map(|raw| {
            serde_json::from_str(&raw).map_err(|e| PersistenceError::Malformed(e.to_string()))
        })
        .transpose()
}

fn read_budget(backend: &dyn KeyValueStore) -> Result<Option<Decimal>, PersistenceError> {
    backend
        .get(BUDGET_KEY)?
        .map(|raw| {
            Decimal::from_str(raw.trim()).map_err(|_| PersistenceError::Malformed(raw.clone()))
        })
        .transpose()
}

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::analytics::AnalyticsSnapshot;
use crate::db::PersistenceAdapter;
use crate::models::ExpenseRecord;
use crate::store::{ExpenseStore, StoreSnapshot, ValidationError};

/// Application state shared by the TUI and the CLI.
///
/// Every mutation goes through here so that a save follows it.
pub(crate) struct Session {
    store: ExpenseStore,
    persistence: PersistenceAdapter,
}

impl Session {
    pub(crate) fn open(persistence: PersistenceAdapter) -> Self {
        let store = persistence.load();
        tracing::debug!(
            expenses = store.len(),
            persistent = persistence.is_persistent(),
            "session loaded"
        );
        Self { store, persistence }
    }

    pub(crate) fn add_expense(
        &mut self,
        amount: &str,
        category: &str,
        note: &str,
        date: NaiveDate,
    ) -> Result<ExpenseRecord, ValidationError> {
        let record = self.store.add_expense(amount, category, note, date)?;
        self.persistence.save(&self.store);
        Ok(record)
    }

    pub(crate) fn delete_expense(&mut self, id: i64) -> bool {
        let removed = self.store.delete_expense(id);
        if removed {
            self.persistence.save(&self.store);
        }
        removed
    }

    pub(crate) fn set_budget(&mut self, value: Decimal) {
        self.store.set_budget(value);
        self.persistence.save(&self.store);
    }

    pub(crate) fn budget(&self) -> Decimal {
        self.store.budget()
    }

    pub(crate) fn get(&self, id: i64) -> Option<&ExpenseRecord> {
        self.store.get(id)
    }

    pub(crate) fn is_persistent(&self) -> bool {
        self.persistence.is_persistent()
    }

    pub(crate) fn snapshot(&self) -> StoreSnapshot {
        self.store.snapshot()
    }

    /// Fresh analytics over the current state.
    pub(crate) fn analytics(&self, today: NaiveDate) -> AnalyticsSnapshot {
        AnalyticsSnapshot::compute(&self.store.snapshot(), today)
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;

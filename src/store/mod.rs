use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::models::ExpenseRecord;

/// Largest accepted amount. Keeps every sum the analytics take well inside
/// `Decimal` range.
pub(crate) const MAX_AMOUNT: Decimal = Decimal::from_parts(0xA4C6_8000, 0x38D7E, 0, false, 0);

/// Budget used when nothing has been persisted yet.
pub(crate) const DEFAULT_BUDGET: Decimal = Decimal::from_parts(30000, 0, 0, false, 0);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub(crate) enum ValidationError {
    #[error("Please enter an amount")]
    MissingAmount,
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Amount must be greater than zero (got {0})")]
    NonPositiveAmount(Decimal),
    #[error("Amount is too large (max {MAX_AMOUNT})")]
    AmountTooLarge(Decimal),
}

/// Parse user-entered amount text. Accepts plain decimals ("12", "12.50").
pub(crate) fn parse_amount(input: &str) -> Result<Decimal, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingAmount);
    }
    let amount = Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| ValidationError::InvalidAmount(trimmed.to_string()))?;
    if amount <= Decimal::ZERO {
        return Err(ValidationError::NonPositiveAmount(amount));
    }
    if amount > MAX_AMOUNT {
        return Err(ValidationError::AmountTooLarge(amount));
    }
    Ok(amount)
}

/// Immutable copy of the store contents handed to analytics and persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StoreSnapshot {
    pub(crate) expenses: Vec<ExpenseRecord>,
    pub(crate) budget: Decimal,
}

/// Owns the expense list and the budget limit.
#[derive(Debug, Clone)]
pub(crate) struct ExpenseStore {
    expenses: Vec<ExpenseRecord>,
    budget: Decimal,
    last_id: i64,
}

impl Default for ExpenseStore {
    fn default() -> Self {
        Self::new(DEFAULT_BUDGET)
    }
}

impl ExpenseStore {
    pub(crate) fn new(budget: Decimal) -> Self {
        Self {
            expenses: Vec::new(),
            budget,
            last_id: 0,
        }
    }

    /// Rebuild a store from persisted parts. Records keep their order and ids;
    /// new ids continue after the largest stored one. Records whose amount
    /// would not pass `parse_amount` are dropped.
    pub(crate) fn from_parts(expenses: Vec<ExpenseRecord>, budget: Decimal) -> Self {
        let expenses: Vec<ExpenseRecord> = expenses
            .into_iter()
            .filter(|e| {
                let valid = e.amount > Decimal::ZERO && e.amount <= MAX_AMOUNT;
                if !valid {
                    tracing::debug!(id = e.id, amount = %e.amount, "dropping stored expense with invalid amount");
                }
                valid
            })
            .map(|mut e| {
                if e.note.as_deref().is_some_and(|n| n.trim().is_empty()) {
                    e.note = None;
                }
                e
            })
            .collect();
        let last_id = expenses.iter().map(|e| e.id).max().unwrap_or(0);
        Self {
            expenses,
            budget,
            last_id,
        }
    }

    pub(crate) fn add_expense(
        &mut self,
        amount: &str,
        category: &str,
        note: &str,
        date: NaiveDate,
    ) -> Result<ExpenseRecord, ValidationError> {
        let amount = parse_amount(amount)?;
        let note = note.trim();
        let record = ExpenseRecord {
            id: self.next_id(),
            amount,
            category: category.to_string(),
            note: (!note.is_empty()).then(|| note.to_string()),
            date,
        };
        self.expenses.push(record.clone());
        Ok(record)
    }

    /// Remove the record with `id`. Returns false when no such record exists.
    pub(crate) fn delete_expense(&mut self, id: i64) -> bool {
        match self.expenses.iter().position(|e| e.id == id) {
            Some(idx) => {
                self.expenses.remove(idx);
                true
            }
            None => false,
        }
    }

    /// No validation: zero or negative budgets are allowed and simply turn the
    /// percentage signals off.
    pub(crate) fn set_budget(&mut self, value: Decimal) {
        self.budget = value;
    }

    pub(crate) fn budget(&self) -> Decimal {
        self.budget
    }

    pub(crate) fn len(&self) -> usize {
        self.expenses.len()
    }

    pub(crate) fn get(&self, id: i64) -> Option<&ExpenseRecord> {
        self.expenses.iter().find(|e| e.id == id)
    }

    pub(crate) fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            expenses: self.expenses.clone(),
            budget: self.budget,
        }
    }

    fn next_id(&mut self) -> i64 {
        let now = chrono::Utc::now().timestamp_millis();
        self.last_id = now.max(self.last_id + 1);
        self.last_id
    }
}

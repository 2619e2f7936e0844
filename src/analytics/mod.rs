//! Derived views over a [`StoreSnapshot`].
//!
//! Everything here is a pure function of the snapshot and an explicit `today`,
//! so the dashboard can recompute after every mutation without caching.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use std::collections::HashSet;

use crate::models::{CategoryDefinition, ExpenseRecord};
use crate::store::StoreSnapshot;

pub(crate) const RECENT_LIMIT: usize = 10;
pub(crate) const TREND_MONTHS: usize = 6;
pub(crate) const DANGER_PERCENT: Decimal = Decimal::from_parts(90, 0, 0, false, 0);

const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CategoryTotal {
    pub(crate) category: &'static CategoryDefinition,
    pub(crate) total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MonthBucket {
    pub(crate) year: i32,
    /// 1-based calendar month.
    pub(crate) month: u32,
    pub(crate) label: &'static str,
    pub(crate) total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SpendSignals {
    pub(crate) total_spent: Decimal,
    pub(crate) remaining: Decimal,
    /// 0..=100, already clamped.
    pub(crate) spend_ratio_percent: Decimal,
    pub(crate) danger_zone: bool,
}

/// Everything the dashboard shows, recomputed from one snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AnalyticsSnapshot {
    pub(crate) budget: Decimal,
    pub(crate) signals: SpendSignals,
    pub(crate) category_breakdown: Vec<CategoryTotal>,
    pub(crate) recent_transactions: Vec<ExpenseRecord>,
    pub(crate) monthly_trend: Vec<MonthBucket>,
    pub(crate) transaction_count: usize,
    pub(crate) average_per_active_day: Decimal,
}

impl AnalyticsSnapshot {
    pub(crate) fn compute(snapshot: &StoreSnapshot, today: NaiveDate) -> Self {
        Self {
            budget: snapshot.budget,
            signals: spend_signals(snapshot),
            category_breakdown: category_breakdown(snapshot),
            recent_transactions: recent_transactions(snapshot, RECENT_LIMIT),
            monthly_trend: monthly_trend(snapshot, today, TREND_MONTHS),
            transaction_count: snapshot.expenses.len(),
            average_per_active_day: average_per_active_day(snapshot),
        }
    }

    pub(crate) fn top_category(&self) -> Option<&'static CategoryDefinition> {
        self.category_breakdown.first().map(|c| c.category)
    }

    /// Largest month total, at least 1 so bar heights never divide by zero.
    pub(crate) fn max_month_total(&self) -> Decimal {
        self.monthly_trend
            .iter()
            .map(|m| m.total)
            .max()
            .unwrap_or(Decimal::ZERO)
            .max(Decimal::ONE)
    }
}

pub(crate) fn total_spent(snapshot: &StoreSnapshot) -> Decimal {
    saturating_sum(snapshot.expenses.iter().map(|e| e.amount))
}

/// Sum that clamps at `Decimal::MAX` instead of panicking on overflow.
fn saturating_sum(amounts: impl Iterator<Item = Decimal>) -> Decimal {
    amounts.fold(Decimal::ZERO, Decimal::saturating_add)
}

/// Per-category totals over the fixed table, non-zero only, largest first.
/// Categories outside the table are counted under `Other`.
pub(crate) fn category_breakdown(snapshot: &StoreSnapshot) -> Vec<CategoryTotal> {
    let table = CategoryDefinition::all();
    let mut totals = vec![Decimal::ZERO; table.len()];
    for expense in &snapshot.expenses {
        let cat = CategoryDefinition::display_for(&expense.category);
        if let Some(idx) = table.iter().position(|c| c.name == cat.name) {
            totals[idx] = totals[idx].saturating_add(expense.amount);
        }
    }

    let mut breakdown: Vec<CategoryTotal> = table
        .iter()
        .zip(totals)
        .filter(|(_, total)| *total > Decimal::ZERO)
        .map(|(category, total)| CategoryTotal { category, total })
        .collect();
    // stable: ties keep table order
    breakdown.sort_by(|a, b| b.total.cmp(&a.total));
    breakdown
}

/// Newest first; equal dates keep insertion order.
pub(crate) fn recent_transactions(snapshot: &StoreSnapshot, limit: usize) -> Vec<ExpenseRecord> {
    let mut sorted = snapshot.expenses.clone();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));
    sorted.truncate(limit);
    sorted
}

/// `months` calendar buckets ending with the month containing `today`,
/// oldest first, zero-filled.
pub(crate) fn monthly_trend(
    snapshot: &StoreSnapshot,
    today: NaiveDate,
    months: usize,
) -> Vec<MonthBucket> {
    let current = today.year() * 12 + today.month0() as i32;
    (0..months)
        .rev()
        .map(|back| {
            let index = current - back as i32;
            let year = index.div_euclid(12);
            let month0 = index.rem_euclid(12) as u32;
            let total = saturating_sum(
                snapshot
                    .expenses
                    .iter()
                    .filter(|e| e.date.year() == year && e.date.month0() == month0)
                    .map(|e| e.amount),
            );
            MonthBucket {
                year,
                month: month0 + 1,
                label: MONTH_LABELS[month0 as usize],
                total,
            }
        })
        .collect()
}

pub(crate) fn spend_signals(snapshot: &StoreSnapshot) -> SpendSignals {
    let total = total_spent(snapshot);
    let budget = snapshot.budget;
    let spend_ratio_percent = if budget > Decimal::ZERO {
        // an overflowing quotient is far past the budget
        let ratio = total.checked_div(budget).unwrap_or(Decimal::ONE);
        ratio.min(Decimal::ONE) * Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    };
    SpendSignals {
        total_spent: total,
        remaining: budget.saturating_sub(total),
        spend_ratio_percent,
        danger_zone: spend_ratio_percent >= DANGER_PERCENT,
    }
}

/// Total spent divided by the number of distinct days with at least one
/// expense, with the divisor floored at 1.
pub(crate) fn average_per_active_day(snapshot: &StoreSnapshot) -> Decimal {
    let active_days: HashSet<NaiveDate> = snapshot.expenses.iter().map(|e| e.date).collect();
    let days = Decimal::from(active_days.len().max(1));
    let total = total_spent(snapshot);
    total.checked_div(days).unwrap_or(total)
}

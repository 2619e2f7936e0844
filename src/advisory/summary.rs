use rust_decimal::Decimal;

use crate::analytics::{AnalyticsSnapshot, CategoryTotal, MonthBucket, SpendSignals};

const PERSONA: &str = "You are a friendly personal finance advisor. The user has shared their \
expense data. Give concise, actionable, warm advice. Use ₹ for currency. Keep responses under \
200 words. Use bullet points when listing tips.";

/// Plain-text description of the current finances, fed to the model.
pub(crate) fn compose_summary(
    signals: &SpendSignals,
    budget: Decimal,
    breakdown: &[CategoryTotal],
    trend: &[MonthBucket],
    transaction_count: usize,
) -> String {
    let categories = breakdown
        .iter()
        .map(|c| format!("{}: ₹{}", c.category.name, c.total.normalize()))
        .collect::<Vec<_>>()
        .join(", ");
    let months = trend
        .iter()
        .map(|m| format!("{}: ₹{}", m.label, m.total.normalize()))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "Budget: ₹{}. Spent: ₹{}. Remaining: ₹{}.\n\
         Expenses by category: {categories}.\n\
         Monthly trend: {months}.\n\
         Total transactions: {transaction_count}.",
        budget.normalize(),
        signals.total_spent.normalize(),
        signals.remaining.normalize(),
    )
}

pub(crate) fn summary_for(analytics: &AnalyticsSnapshot) -> String {
    compose_summary(
        &analytics.signals,
        analytics.budget,
        &analytics.category_breakdown,
        &analytics.monthly_trend,
        analytics.transaction_count,
    )
}

/// System prompt for providers that take one separately.
pub(crate) fn system_prompt(summary: &str) -> String {
    format!("{PERSONA} Data: {summary}")
}

/// Single prompt for the relay, which forwards plain text only.
pub(crate) fn build_relay_prompt(summary: &str, question: &str) -> String {
    format!("{}\n\nQuestion: {}", system_prompt(summary), question.trim())
}

#![allow(clippy::unwrap_used)]

use chrono::NaiveDate;
use rust_decimal_macros::dec;

use super::*;
use crate::advisory::AdvisoryState;
use crate::db::PersistenceAdapter;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
}

fn setup() -> (App, Session) {
    let session = Session::open(PersistenceAdapter::volatile());
    let app = App::new(&session, today(), "test".into());
    (app, session)
}

// ── ExpenseForm ───────────────────────────────────────────────

#[test]
fn test_form_defaults() {
    let form = ExpenseForm::new(today());
    assert_eq!(form.category, "Food & Dining");
    assert_eq!(form.date, "2026-10-16");
    assert_eq!(form.field, FormField::Amount);
}

#[test]
fn test_form_cycle_category_wraps() {
    let mut form = ExpenseForm::new(today());
    form.cycle_category(-1);
    assert_eq!(form.category, "Other");
    form.cycle_category(1);
    assert_eq!(form.category, "Food & Dining");
    form.category = "transport".into();
    form.cycle_category(1);
    assert_eq!(form.category, "Shopping");
    form.category = "Pet Care".into();
    form.cycle_category(1);
    assert_eq!(form.category, "Food & Dining");
}

#[test]
fn test_form_field_order_round_trips() {
    for field in FormField::all() {
        assert_eq!(field.next().prev(), *field);
    }
}

#[test]
fn test_form_typing_targets_active_field() {
    let mut form = ExpenseForm::new(today());
    form.push_char('4');
    form.push_char('2');
    form.field = FormField::Note;
    form.push_char('x');
    form.pop_char();
    form.push_char('y');
    assert_eq!(form.amount, "42");
    assert_eq!(form.note, "y");
}

// ── submit_form ───────────────────────────────────────────────

#[test]
fn test_submit_valid_form_adds_and_clears() {
    let (mut app, mut session) = setup();
    app.form.amount = "250".into();
    app.form.category = "health".into();
    app.form.note = "Pharmacy".into();

    assert!(app.submit_form(&mut session));
    assert_eq!(app.history.len(), 1);
    assert_eq!(app.history[0].category, "Health");
    assert_eq!(app.analytics.signals.total_spent, dec!(250));
    assert!(app.form.amount.is_empty());
    assert_eq!(app.form.category, "health");
    assert!(app.status_message.contains("₹250.00"));
}

#[test]
fn test_submit_invalid_amount_keeps_form() {
    let (mut app, mut session) = setup();
    app.form.amount = "-5".into();
    assert!(!app.submit_form(&mut session));
    assert_eq!(app.form.amount, "-5");
    assert!(session.snapshot().expenses.is_empty());
    assert!(!app.status_message.is_empty());
}

#[test]
fn test_submit_invalid_date() {
    let (mut app, mut session) = setup();
    app.form.amount = "5".into();
    app.form.date = "16/10/2026".into();
    assert!(!app.submit_form(&mut session));
    assert!(app.status_message.contains("Invalid date"));
}

// ── Advisor ───────────────────────────────────────────────────

#[test]
fn test_ask_blank_question_does_nothing() {
    let (mut app, _session) = setup();
    assert!(!app.ask("   "));
    assert!(app.outgoing.is_none());
    assert_eq!(*app.advisory.state(), AdvisoryState::Idle);
}

#[test]
fn test_ask_queues_request() {
    let (mut app, _session) = setup();
    assert!(app.ask(app.selected_quick_question()));
    let req = app.outgoing.take().unwrap();
    assert_eq!(req.question, "Am I overspending?");
    assert!(app.advisory.is_waiting());
}

// ── refresh ───────────────────────────────────────────────────

#[test]
fn test_refresh_clamps_selection_after_delete() {
    let (mut app, mut session) = setup();
    for amount in ["1", "2", "3"] {
        session.add_expense(amount, "Other", "", today()).unwrap();
    }
    app.refresh(&session);
    app.history_index = 2;
    let id = app.history[2].id;
    session.delete_expense(id);
    app.refresh(&session);
    assert_eq!(app.history.len(), 2);
    assert_eq!(app.history_index, 1);
}

#[test]
fn test_roll_date_moves_trend_and_form_date() {
    let (mut app, mut session) = setup();
    session.add_expense("100", "Other", "", today()).unwrap();
    app.refresh(&session);
    assert_eq!(app.analytics.monthly_trend[5].label, "Oct");

    let next_month = NaiveDate::from_ymd_opt(2026, 11, 1).unwrap();
    assert!(app.roll_date(next_month, &session));
    assert_eq!(app.today, next_month);
    assert_eq!(app.form.date, "2026-11-01");
    assert_eq!(app.analytics.monthly_trend[5].label, "Nov");
    assert_eq!(app.analytics.monthly_trend[4].total, dec!(100));
    assert!(!app.roll_date(next_month, &session));
}

#[test]
fn test_roll_date_keeps_typed_form_date() {
    let (mut app, session) = setup();
    app.form.date = "2026-09-30".into();
    app.roll_date(NaiveDate::from_ymd_opt(2026, 10, 17).unwrap(), &session);
    assert_eq!(app.form.date, "2026-09-30");
}

#![allow(clippy::unwrap_used)]

use chrono::NaiveDate;
use rust_decimal_macros::dec;

use super::*;
use crate::db::PersistenceAdapter;

fn setup() -> (App, Session) {
    let session = Session::open(PersistenceAdapter::volatile());
    let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
    let app = App::new(&session, today, "test".into());
    (app, session)
}

// ── :add ──────────────────────────────────────────────────────

#[test]
fn test_add_with_args_resolves_category() {
    let (mut app, mut session) = setup();
    handle_command("add 250 food Lunch with team", &mut app, &mut session).unwrap();
    let snap = session.snapshot();
    assert_eq!(snap.expenses.len(), 1);
    assert_eq!(snap.expenses[0].category, "Food & Dining");
    assert_eq!(snap.expenses[0].note.as_deref(), Some("Lunch with team"));
    assert_eq!(snap.expenses[0].date, app.today);
    assert_eq!(app.history.len(), 1);
}

#[test]
fn test_add_keeps_free_form_category() {
    let (mut app, mut session) = setup();
    handle_command("a 99 Gifts", &mut app, &mut session).unwrap();
    assert_eq!(session.snapshot().expenses[0].category, "Gifts");
}

#[test]
fn test_add_rejects_bad_amount() {
    let (mut app, mut session) = setup();
    handle_command("add 0 food", &mut app, &mut session).unwrap();
    assert!(session.snapshot().expenses.is_empty());
    assert!(app.status_message.contains("greater than zero"));
}

#[test]
fn test_add_without_args_opens_form() {
    let (mut app, mut session) = setup();
    handle_command("add", &mut app, &mut session).unwrap();
    assert_eq!(app.screen, Screen::Add);
    assert_eq!(app.input_mode, InputMode::Editing);
}

// ── :budget ───────────────────────────────────────────────────

#[test]
fn test_budget_set_accepts_separators() {
    let (mut app, mut session) = setup();
    handle_command("budget ₹45,000", &mut app, &mut session).unwrap();
    assert_eq!(session.budget(), dec!(45000));
    assert_eq!(app.analytics.budget, dec!(45000));
}

#[test]
fn test_budget_invalid_leaves_value() {
    let (mut app, mut session) = setup();
    handle_command("budget lots", &mut app, &mut session).unwrap();
    assert_eq!(session.budget(), dec!(30000));
    assert!(app.status_message.starts_with("Invalid budget"));
}

// ── :delete ───────────────────────────────────────────────────

#[test]
fn test_delete_by_id_asks_for_confirmation() {
    let (mut app, mut session) = setup();
    let rec = session.add_expense("10", "Other", "Snacks", app.today).unwrap();
    handle_command(&format!("delete {}", rec.id), &mut app, &mut session).unwrap();
    assert_eq!(app.input_mode, InputMode::Confirm);
    assert!(app.confirm_message.contains("Snacks"));
    assert!(matches!(
        app.pending_action,
        Some(PendingAction::DeleteExpense { id, .. }) if id == rec.id
    ));
    // nothing removed until confirmed
    assert_eq!(session.snapshot().expenses.len(), 1);
}

#[test]
fn test_delete_unknown_id() {
    let (mut app, mut session) = setup();
    handle_command("delete 42", &mut app, &mut session).unwrap();
    assert_eq!(app.input_mode, InputMode::Normal);
    assert_eq!(app.status_message, "No such expense");
}

// ── :ask / misc ───────────────────────────────────────────────

#[test]
fn test_ask_switches_screen_and_queues() {
    let (mut app, mut session) = setup();
    handle_command("ask Am I overspending?", &mut app, &mut session).unwrap();
    assert_eq!(app.screen, Screen::Advisor);
    assert_eq!(app.outgoing.as_ref().unwrap().question, "Am I overspending?");
}

#[test]
fn test_unknown_command_suggests() {
    let (mut app, mut session) = setup();
    handle_command("budgte", &mut app, &mut session).unwrap();
    assert!(app.status_message.contains("Did you mean :budget?"));
}

#[test]
fn test_quit() {
    let (mut app, mut session) = setup();
    handle_command("q", &mut app, &mut session).unwrap();
    assert!(!app.running);
}

#[test]
fn test_levenshtein() {
    assert_eq!(levenshtein("kitten", "sitting"), 3);
    assert_eq!(levenshtein("", "abc"), 3);
    assert_eq!(levenshtein("same", "same"), 0);
}

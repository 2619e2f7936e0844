#![allow(clippy::unwrap_used)]

use chrono::NaiveDate;
use rust_decimal_macros::dec;

use super::*;

// ── CategoryDefinition ────────────────────────────────────────

#[test]
fn test_category_table_order_and_size() {
    let names: Vec<&str> = CategoryDefinition::all().iter().map(|c| c.name).collect();
    assert_eq!(
        names,
        vec![
            "Food & Dining",
            "Transport",
            "Shopping",
            "Entertainment",
            "Health",
            "Housing",
            "Education",
            "Other",
        ]
    );
}

#[test]
fn test_category_lookup_exact() {
    let cat = CategoryDefinition::lookup("Transport").unwrap();
    assert_eq!(cat.icon, "🚗");
    assert_eq!(cat.color, "#85C1E9");
    assert!(CategoryDefinition::lookup("transport").is_none());
}

#[test]
fn test_display_for_unknown_falls_back_to_other() {
    let cat = CategoryDefinition::display_for("Crypto");
    assert_eq!(cat.name, OTHER);
    assert_eq!(cat.icon, "📦");
}

#[test]
fn test_display_for_known() {
    assert_eq!(CategoryDefinition::display_for("Health").name, "Health");
}

#[test]
fn test_resolve_case_insensitive() {
    assert_eq!(CategoryDefinition::resolve("food & dining"), "Food & Dining");
    assert_eq!(CategoryDefinition::resolve("  HOUSING "), "Housing");
}

#[test]
fn test_resolve_short_name() {
    assert_eq!(CategoryDefinition::resolve("food"), "Food & Dining");
}

#[test]
fn test_resolve_unknown_kept_verbatim() {
    assert_eq!(CategoryDefinition::resolve(" Pet Care "), "Pet Care");
}

#[test]
fn test_short_name() {
    assert_eq!(CategoryDefinition::display_for("Food & Dining").short_name(), "Food");
    assert_eq!(CategoryDefinition::other().short_name(), "Other");
}

#[test]
fn test_index_of() {
    assert_eq!(CategoryDefinition::index_of("Food & Dining"), Some(0));
    assert_eq!(CategoryDefinition::index_of("Other"), Some(7));
    assert_eq!(CategoryDefinition::index_of("Nope"), None);
}

// ── ExpenseRecord ─────────────────────────────────────────────

fn make_record(note: Option<&str>) -> ExpenseRecord {
    ExpenseRecord {
        id: 1,
        amount: dec!(250.50),
        category: "Shopping".into(),
        note: note.map(String::from),
        date: NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
    }
}

#[test]
fn test_label_prefers_note() {
    assert_eq!(make_record(Some("Shoes")).label(), "Shoes");
    assert_eq!(make_record(None).label(), "Shopping");
}

#[test]
fn test_record_json_shape() {
    let json = serde_json::to_value(make_record(Some("Shoes"))).unwrap();
    assert_eq!(json["id"], 1);
    assert_eq!(json["amount"], "250.50");
    assert_eq!(json["category"], "Shopping");
    assert_eq!(json["note"], "Shoes");
    assert_eq!(json["date"], "2026-03-14");
}

#[test]
fn test_record_without_note_omits_field() {
    let json = serde_json::to_value(make_record(None)).unwrap();
    assert!(json.get("note").is_none());
}

#[test]
fn test_record_accepts_numeric_amount() {
    let rec: ExpenseRecord = serde_json::from_str(
        r#"{"id":7,"amount":500,"category":"Food & Dining","note":"","date":"2026-01-02"}"#,
    )
    .unwrap();
    assert_eq!(rec.amount, dec!(500));
    assert_eq!(rec.note.as_deref(), Some(""));
}

#![allow(clippy::unwrap_used)]

use chrono::NaiveDate;
use rust_decimal_macros::dec;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::adapter::{BUDGET_KEY, EXPENSES_KEY};
use super::*;
use crate::store::ExpenseStore;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn sample_store() -> ExpenseStore {
    let mut store = ExpenseStore::new(dec!(2000));
    store.add_expense("500", "Food & Dining", "Groceries", day(2026, 10, 2)).unwrap();
    store.add_expense("300", "Transport", "", day(2026, 10, 5)).unwrap();
    store.add_expense("200", "Pet Care", "Vet", day(2026, 9, 9)).unwrap();
    store
}

/// Backend that fails every call and counts how often it was hit.
#[derive(Default, Clone)]
struct FailingStore {
    calls: Arc<AtomicUsize>,
}

impl KeyValueStore for FailingStore {
    fn get(&self, _key: &str) -> Result<Option<String>, PersistenceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(PersistenceError::Poisoned)
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), PersistenceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(PersistenceError::Poisoned)
    }
}

// ── SqliteStore ───────────────────────────────────────────────

#[test]
fn test_sqlite_get_missing_key() {
    let db = SqliteStore::open_in_memory().unwrap();
    assert_eq!(db.get("nope").unwrap(), None);
}

#[test]
fn test_sqlite_set_then_overwrite() {
    let db = SqliteStore::open_in_memory().unwrap();
    db.set("k", "one").unwrap();
    db.set("k", "two").unwrap();
    assert_eq!(db.get("k").unwrap().as_deref(), Some("two"));
}

#[test]
fn test_sqlite_schema_version() {
    let db = SqliteStore::open_in_memory().unwrap();
    assert_eq!(db.schema_version().unwrap(), schema::CURRENT_VERSION);
}

#[test]
fn test_sqlite_reopen_keeps_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("spendlens.db");
    {
        let db = SqliteStore::open(&path).unwrap();
        db.set("budget-limit", "1234.5").unwrap();
    }
    let db = SqliteStore::open(&path).unwrap();
    assert_eq!(db.get("budget-limit").unwrap().as_deref(), Some("1234.5"));
    assert_eq!(db.schema_version().unwrap(), schema::CURRENT_VERSION);
}

#[test]
fn test_sqlite_reopen_stamps_version_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("spendlens.db");
    drop(SqliteStore::open(&path).unwrap());
    drop(SqliteStore::open(&path).unwrap());
    let conn = rusqlite::Connection::open(&path).unwrap();
    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 1);
}

#[test]
fn test_sqlite_refuses_newer_schema() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("spendlens.db");
    drop(SqliteStore::open(&path).unwrap());
    {
        let conn = rusqlite::Connection::open(&path).unwrap();
        conn.execute("UPDATE schema_version SET version = 99", []).unwrap();
    }
    assert!(matches!(
        SqliteStore::open(&path),
        Err(PersistenceError::Malformed(_))
    ));
}

// ── MemoryStore ───────────────────────────────────────────────

#[test]
fn test_memory_store_roundtrip() {
    let store = MemoryStore::default();
    assert_eq!(store.get("a").unwrap(), None);
    store.set("a", "1").unwrap();
    assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));
}

// ── PersistenceAdapter ────────────────────────────────────────

#[test]
fn test_adapter_roundtrip_sqlite_preserves_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("spendlens.db");
    let original = sample_store();

    PersistenceAdapter::new(Box::new(SqliteStore::open(&path).unwrap())).save(&original);

    let reloaded = PersistenceAdapter::new(Box::new(SqliteStore::open(&path).unwrap())).load();
    assert_eq!(reloaded.snapshot(), original.snapshot());
}

#[test]
fn test_adapter_persisted_shape() {
    let backend = Arc::new(MemoryStore::default());
    let adapter = PersistenceAdapter::new(Box::new(SharedMemory(backend.clone())));
    adapter.save(&sample_store());

    assert_eq!(backend.get(BUDGET_KEY).unwrap().as_deref(), Some("2000"));
    let raw = backend.get(EXPENSES_KEY).unwrap().unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let list = json.as_array().unwrap();
    assert_eq!(list.len(), 3);
    assert_eq!(list[0]["category"], "Food & Dining");
    assert_eq!(list[2]["category"], "Pet Care");
}

#[test]
fn test_adapter_last_write_wins() {
    let backend = Arc::new(MemoryStore::default());
    let adapter = PersistenceAdapter::new(Box::new(SharedMemory(backend.clone())));
    let mut store = sample_store();
    adapter.save(&store);
    store.set_budget(dec!(999));
    let id = store.snapshot().expenses[0].id;
    store.delete_expense(id);
    adapter.save(&store);

    let reloaded = adapter.load();
    assert_eq!(reloaded.snapshot(), store.snapshot());
}

#[test]
fn test_adapter_volatile_loads_defaults_and_ignores_saves() {
    let adapter = PersistenceAdapter::volatile();
    assert!(!adapter.is_persistent());
    adapter.save(&sample_store());
    let loaded = adapter.load();
    assert_eq!(loaded.len(), 0);
    assert_eq!(loaded.budget(), dec!(30000));
}

#[test]
fn test_adapter_swallows_backend_failures() {
    let failing = FailingStore::default();
    let adapter = PersistenceAdapter::new(Box::new(failing.clone()));
    adapter.save(&sample_store());
    let loaded = adapter.load();
    assert_eq!(loaded.len(), 0);
    assert_eq!(loaded.budget(), dec!(30000));
    assert!(failing.calls.load(Ordering::SeqCst) >= 4);
}

#[test]
fn test_adapter_malformed_values_fall_back_to_defaults() {
    let backend = MemoryStore::default();
    backend.set(EXPENSES_KEY, "{not json").unwrap();
    backend.set(BUDGET_KEY, "lots").unwrap();
    let loaded = PersistenceAdapter::new(Box::new(backend)).load();
    assert_eq!(loaded.len(), 0);
    assert_eq!(loaded.budget(), dec!(30000));
}

#[test]
fn test_adapter_reads_numeric_amounts_from_older_writers() {
    let backend = MemoryStore::default();
    backend
        .set(
            EXPENSES_KEY,
            r#"[{"id":1718000000000,"amount":450,"category":"Health","note":"","date":"2026-06-10"}]"#,
        )
        .unwrap();
    backend.set(BUDGET_KEY, "15000").unwrap();
    let loaded = PersistenceAdapter::new(Box::new(backend)).load();
    let snap = loaded.snapshot();
    assert_eq!(snap.budget, dec!(15000));
    assert_eq!(snap.expenses[0].amount, dec!(450));
    assert!(snap.expenses[0].note.is_none());
}

#[test]
fn test_adapter_skips_non_positive_stored_amounts() {
    let backend = MemoryStore::default();
    backend
        .set(
            EXPENSES_KEY,
            r#"[{"id":1,"amount":-300,"category":"Health","date":"2026-06-10"},
                {"id":2,"amount":"0","category":"Health","date":"2026-06-11"},
                {"id":3,"amount":100,"category":"Health","date":"2026-06-12"}]"#,
        )
        .unwrap();
    let loaded = PersistenceAdapter::new(Box::new(backend)).load();
    let snap = loaded.snapshot();
    assert_eq!(snap.expenses.len(), 1);
    assert_eq!(snap.expenses[0].id, 3);

    let breakdown = crate::analytics::category_breakdown(&snap);
    let breakdown_sum: rust_decimal::Decimal = breakdown.iter().map(|c| c.total).sum();
    assert_eq!(breakdown_sum, crate::analytics::total_spent(&snap));
    assert_eq!(breakdown_sum, dec!(100));
}

/// Lets a test keep a handle on the memory store it hands to the adapter.
struct SharedMemory(Arc<MemoryStore>);

impl KeyValueStore for SharedMemory {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        self.0.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.0.set(key, value)
    }
}

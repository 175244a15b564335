#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use chrono::{Duration, NaiveDate};
use once_cell::sync::Lazy;
use split_core::{
    config::{Config, ConfigManager},
    core::{time::FixedClock, LedgerManager},
    domain::{Currency, Expense, Group, NewExpense, NewGroup, PaidDetails, UserIndex},
};
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

pub fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 1).expect("valid date")
}

/// Isolated manager pinned to `today`, plus a config manager in its own directory.
pub fn setup_test_env(today: NaiveDate) -> (LedgerManager, ConfigManager) {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);

    let manager = LedgerManager::new(Config::default()).with_clock(Arc::new(FixedClock::new(today)));
    let config_manager =
        ConfigManager::with_base_dir(base).expect("create config manager for temp dir");
    (manager, config_manager)
}

pub fn temp_path(file: &str) -> std::path::PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let path = temp.path().join(file);
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    path
}

pub async fn seed_group(manager: &LedgerManager) -> Group {
    manager
        .groups()
        .create(NewGroup::new(
            "Holiday",
            Currency::Usd,
            vec![
                UserIndex::new(1, "Ana"),
                UserIndex::new(2, "Ben"),
                UserIndex::new(3, "Cleo"),
            ],
        ))
        .await
        .expect("create group")
}

pub fn simple_expense(group: &Group, date: NaiveDate, amount: f64) -> NewExpense {
    NewExpense::new(
        group.id,
        "Daily spend",
        date,
        amount,
        PaidDetails::amounts(&[(1, amount)]),
        PaidDetails::portions(&[(1, 1.0), (2, 1.0), (3, 1.0)]),
    )
}

/// One expense of `amount` on each of `start + 1 ..= start + days`.
pub async fn seed_daily(
    manager: &LedgerManager,
    group: &Group,
    start: NaiveDate,
    days: i64,
    amount: f64,
) -> Vec<Expense> {
    let mut created = Vec::new();
    for offset in 1..=days {
        let input = simple_expense(group, start + Duration::days(offset), amount);
        created.push(manager.expenses().create(input).await.expect("create expense"));
    }
    created
}

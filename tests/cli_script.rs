use assert_cmd::Command;
use chrono::{Duration, Utc};
use predicates::str::contains;
use tempfile::TempDir;

fn shell(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("split_core_cli").unwrap();
    cmd.env("SPLIT_CORE_CLI_SCRIPT", "1")
        .env("SPLIT_CORE_HOME", home.path())
        .env("NO_COLOR", "1")
        .env_remove("SPLIT_CORE_UPLOAD_DIR");
    cmd
}

#[test]
fn script_mode_creates_a_group_and_saves_it() {
    let home = TempDir::new().unwrap();
    let snapshot = home.path().join("out.json");
    let input = format!(
        "group-new Trip CHF 1:Ana 2:Ben\nexpense-add Dinner 2025-02-01 45 1=45 portions:1=1,2=1 FOOD\nexpense-list\nsave {}\nexit\n",
        snapshot.display()
    );

    shell(&home)
        .write_stdin(input)
        .assert()
        .success()
        .stdout(contains("Group created"))
        .stdout(contains("Expense added: Dinner"))
        .stdout(contains("Snapshot saved"));

    let json = std::fs::read_to_string(&snapshot).unwrap();
    assert!(json.contains("\"Trip\""));
    assert!(json.contains("\"Dinner\""));
}

#[test]
fn invalid_splits_are_reported_with_their_reason() {
    let home = TempDir::new().unwrap();
    let input = "group-new Flat EUR 1:Ana 2:Ben\nvalidate 30 portions:1=1 1=30\nvalidate 30 1=30 2=10,7=20\nvalidate 30 1=30 portions:1=1,2=2\n";

    shell(&home)
        .write_stdin(input)
        .assert()
        .success()
        .stdout(contains("PORTIONS not allowed for paidBy"))
        .stdout(contains("Users not in group: 7"))
        .stdout(contains("Repartition is valid"));
}

#[test]
fn forecast_runs_against_recent_history() {
    let home = TempDir::new().unwrap();
    let today = Utc::now().date_naive();
    let start = today - Duration::days(10);
    let mut input = String::from("group-new Home USD 1:Ana 2:Ben\n");
    for offset in 1..=10 {
        let date = start + Duration::days(offset);
        input.push_str(&format!("expense-add Groceries {date} 20 1=20 2=20\n"));
    }
    input.push_str(&format!("forecast {start} 2\nforecast {start} 2.5\n"));

    shell(&home)
        .write_stdin(input)
        .assert()
        .success()
        .stdout(contains("Forecast from"))
        .stdout(contains("20.00"))
        .stdout(contains("Prediction length must be at least 1 and an integer"));
}

#[test]
fn commands_need_a_selected_group() {
    let home = TempDir::new().unwrap();
    shell(&home)
        .write_stdin("expense-list\n")
        .assert()
        .success()
        .stdout(contains("No group selected"));
}

#[test]
fn unknown_commands_get_a_suggestion() {
    let home = TempDir::new().unwrap();
    shell(&home)
        .write_stdin("forcast 2025-01-01 2\n")
        .assert()
        .success()
        .stdout(contains("Unknown command `forcast`"))
        .stdout(contains("Suggestion: `forecast`?"));
}

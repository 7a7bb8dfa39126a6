use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;

use extracr_core::{DocumentSelector, DocumentStore, FieldMap, SqliteStore};

const STATEMENT: &str = "\
Statement of Financial Position
Assets 2022 2021
Property, plant and equipment 5 1,342,700 1,298,350
Inventories 15,773 12,400
Total Equny 3.900.07 3,512,118
";

/// A command isolated from the caller's config, `.env` and database.
fn extracr(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("extracr").unwrap();
    cmd.current_dir(dir)
        .env("EXTRACR_DATABASE", dir.join("test.db"))
        .env_remove("EXTRACR_MODEL_DIR")
        .arg("--config")
        .arg(dir.join("config.json"));
    cmd
}

fn write_config(dir: &Path) {
    std::fs::write(
        dir.join("config.json"),
        r#"{"balance_sheet": {"periods": ["2022", "2021"]}}"#,
    )
    .unwrap();
}

#[test]
fn parse_prints_fields_and_balance_sheet() {
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path());
    let input = dir.path().join("statement.txt");
    std::fs::write(&input, format!("Company: Example Holdings Ltd\n{}", STATEMENT)).unwrap();

    let output = extracr(dir.path())
        .args(["parse", "--balance-sheet"])
        .arg(&input)
        .output()
        .unwrap();
    assert!(output.status.success());

    let result: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(result["fields"]["company"], json!("Example Holdings Ltd"));
    assert_eq!(
        result["balance_sheet"]["rows"],
        json!([
            {"label": "property, plant and equipment", "2022": 1342700, "2021": 1298350},
            {"label": "inventories", "2022": 15773, "2021": 12400},
            {"label": "total equity", "2022": 390007, "2021": 3512118}
        ])
    );
}

#[test]
fn parse_csv_output() {
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path());
    let input = dir.path().join("statement.txt");
    std::fs::write(&input, STATEMENT).unwrap();

    extracr(dir.path())
        .args(["parse", "--balance-sheet", "--format", "csv"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("label,2022,2021\n"))
        .stdout(predicate::str::contains("inventories,15773,12400\n"));
}

#[test]
fn parse_csv_requires_balance_sheet() {
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path());
    let input = dir.path().join("statement.txt");
    std::fs::write(&input, STATEMENT).unwrap();

    extracr(dir.path())
        .args(["parse", "--format", "csv"])
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--balance-sheet"));
}

#[test]
fn balance_sheet_with_empty_store() {
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path());

    extracr(dir.path())
        .arg("balance-sheet")
        .assert()
        .success()
        .stdout(predicate::str::contains("No documents found"));
}

#[test]
fn balance_sheet_merges_into_latest_document() {
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path());
    let db = dir.path().join("test.db");

    let id = {
        let mut store = SqliteStore::open(&db).unwrap();
        let mut fields = FieldMap::new();
        fields.insert_text("company", "Example Holdings Ltd");
        store.insert("statement.png", STATEMENT, &fields).unwrap()
    };

    extracr(dir.path())
        .arg("balance-sheet")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"table_years\""));

    let store = SqliteStore::open(&db).unwrap();
    let document = store.fetch(DocumentSelector::Id(id)).unwrap().unwrap();
    assert_eq!(document.fields["company"], json!("Example Holdings Ltd"));
    assert_eq!(
        document.fields["balance_sheet"]["rows"][1],
        json!({"label": "inventories", "2022": 15773, "2021": 12400})
    );
}

#[test]
fn balance_sheet_dry_run_leaves_document_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path());
    let db = dir.path().join("test.db");

    let id = {
        let mut store = SqliteStore::open(&db).unwrap();
        store.insert("statement.png", STATEMENT, &FieldMap::new()).unwrap()
    };

    extracr(dir.path())
        .args(["balance-sheet", "--dry-run", "--id"])
        .arg(id.to_string())
        .assert()
        .success();

    let store = SqliteStore::open(&db).unwrap();
    let document = store.fetch(DocumentSelector::Id(id)).unwrap().unwrap();
    assert!(document.fields.get("balance_sheet").is_none());
}

#[test]
fn balance_sheet_unknown_id_fails() {
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path());

    extracr(dir.path())
        .args(["balance-sheet", "--id", "42"])
        .assert()
        .failure();
}

#[test]
fn config_path_reports_missing_file() {
    let dir = tempfile::tempdir().unwrap();

    extracr(dir.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.json"))
        .stdout(predicate::str::contains("not created"));
}

#[test]
fn config_init_then_get() {
    let dir = tempfile::tempdir().unwrap();

    extracr(dir.path()).args(["config", "init"]).assert().success();
    assert!(dir.path().join("config.json").exists());

    extracr(dir.path())
        .args(["config", "get", "balance_sheet.periods"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"2022\""));
}

#[test]
fn config_set_rejects_colliding_periods() {
    let dir = tempfile::tempdir().unwrap();
    extracr(dir.path()).args(["config", "init"]).assert().success();

    extracr(dir.path())
        .args(["config", "set", "balance_sheet.periods", r#"["2022","2022"]"#])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must differ"));

    extracr(dir.path())
        .args(["config", "set", "balance_sheet.periods", r#"["2024","2023"]"#])
        .assert()
        .success();
}

#[test]
fn parse_rejects_reserved_period_in_config() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("config.json"),
        r#"{"balance_sheet": {"periods": ["label", "2021"]}}"#,
    )
    .unwrap();
    let input = dir.path().join("statement.txt");
    std::fs::write(&input, STATEMENT).unwrap();

    extracr(dir.path())
        .args(["parse", "--balance-sheet"])
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("reserved"));
}

#[test]
fn parse_splits_lines_on_carriage_returns() {
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path());
    let input = dir.path().join("statement.txt");
    std::fs::write(&input, "Inventories 15,773 12,400\rTotal assets 1,000 2,000").unwrap();

    let output = extracr(dir.path())
        .args(["parse", "--balance-sheet"])
        .arg(&input)
        .output()
        .unwrap();
    assert!(output.status.success());

    let result: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        result["balance_sheet"]["rows"],
        json!([
            {"label": "inventories", "2022": 15773, "2021": 12400},
            {"label": "total assets", "2022": 1000, "2021": 2000}
        ])
    );
}

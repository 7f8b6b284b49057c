use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const STATEMENT: &str = "Account Name\tJ DOE\n\
    Account Number\tXXXX1234\n\
    \n\
    Txn Date\tValue Date\tDescription\tRef No./Cheque No.\tDebit\tCredit\tBalance\n\
    01/04/2024\t01/04/2024\tBY TRANSFER-NEFT*ACME CORP SALARY\tN123\t\t50,000.00\t60,000.00\n\
    03/04/2024\t03/04/2024\tUPI/DR/412345678901/SWIGGY\tU456\t450.00\t\t59,550.00\n";

fn spendbook(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("spendbook").unwrap();
    cmd.env("HOME", home).env_remove("RUST_LOG");
    cmd
}

fn setup() -> (TempDir, PathBuf) {
    let home = TempDir::new().unwrap();
    let data_dir = home.path().join("data");
    spendbook(home.path())
        .args(["init", "--data-dir"])
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("spendbook.db"));

    let statement = home.path().join("april.tsv");
    std::fs::write(&statement, STATEMENT).unwrap();
    (home, statement)
}

#[test]
fn commands_require_init() {
    let home = TempDir::new().unwrap();
    spendbook(home.path())
        .args(["report", "summary"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("spendbook init"));
}

#[test]
fn import_then_reimport_is_a_duplicate() {
    let (home, statement) = setup();
    spendbook(home.path())
        .arg("import")
        .arg(&statement)
        .assert()
        .success()
        .stdout(predicate::str::contains("2 imported, 0 skipped"));

    spendbook(home.path())
        .arg("import")
        .arg(&statement)
        .assert()
        .success()
        .stdout(predicate::str::contains("already been imported"));
}

#[test]
fn rule_categorizes_and_report_sums() {
    let (home, statement) = setup();
    spendbook(home.path())
        .arg("import")
        .arg(&statement)
        .assert()
        .success();

    spendbook(home.path())
        .args(["rules", "add", "SWIGGY", "--category", "Food & Dining", "--subcategory", "Food Delivery"])
        .assert()
        .success();
    spendbook(home.path())
        .arg("categorize")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 categorized"));

    spendbook(home.path())
        .args(["report", "summary"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\u{20b9}50,000.00"))
        .stdout(predicate::str::contains("\u{20b9}450.00"));

    spendbook(home.path())
        .args(["export", "--category", "Food & Dining"])
        .assert()
        .success()
        .stdout(predicate::str::contains("id,date,value_date,description"))
        .stdout(predicate::str::contains("SWIGGY"))
        .stdout(predicate::str::contains("SALARY").not());
}

#[test]
fn import_reports_dropped_rows() {
    let (home, _) = setup();
    let partial = home.path().join("partial.tsv");
    let body = format!("{STATEMENT}\t\tClosing balance\t\t\t\t59,550.00\n");
    std::fs::write(&partial, body).unwrap();
    spendbook(home.path())
        .arg("import")
        .arg(&partial)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 rows dropped (no usable date or description)"));
}

#[test]
fn unparseable_file_reports_error() {
    let (home, _) = setup();
    let junk = home.path().join("junk.tsv");
    std::fs::write(&junk, "just one line\n").unwrap();
    spendbook(home.path())
        .arg("import")
        .arg(&junk)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

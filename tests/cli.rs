use std::path::Path;

use assert_cmd::Command;
use chrono::Datelike;
use predicates::prelude::*;
use tempfile::TempDir;

const EXPORT: &str = "Date,Description,Amount (BRL)\n\
15 JAN,UBER TRIP,\"25,50\"\n\
16 JAN,IFOOD *PIZZARIA,\"1.234,56\"\n\
17 JAN,Magazine Luiza - Parcela 3/10,\"199,90\"\n";

fn centavo(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("centavo").unwrap();
    cmd.env("HOME", home)
        .env("NO_COLOR", "1")
        .env_remove("CENTAVO_DATA_DIR")
        .env_remove("CENTAVO_LOG");
    cmd
}

fn setup() -> TempDir {
    let home = TempDir::new().unwrap();
    let data = home.path().join("data");
    centavo(home.path())
        .args(["init", "--data-dir", data.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized centavo"));
    home
}

fn write_csv(home: &Path, name: &str, content: &str) -> String {
    let path = home.join(name);
    std::fs::write(&path, content).unwrap();
    path.to_string_lossy().to_string()
}

fn january() -> String {
    format!("{}-01", chrono::Local::now().year())
}

#[test]
fn test_commands_before_init_fail() {
    let home = TempDir::new().unwrap();
    centavo(home.path())
        .args(["expenses", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("centavo init"));
}

#[test]
fn test_import_and_list() {
    let home = setup();
    let csv = write_csv(home.path(), "nubank.csv", EXPORT);

    centavo(home.path())
        .args(["import", &csv])
        .assert()
        .success()
        .stdout(predicate::str::contains("3 imported, 0 skipped (duplicates), 0 rejected"));

    centavo(home.path())
        .args(["expenses", "list", "--month", &january()])
        .assert()
        .success()
        .stdout(predicate::str::contains("UBER TRIP"))
        .stdout(predicate::str::contains("Transportation"))
        .stdout(predicate::str::contains("R$ 1.234,56"))
        .stdout(predicate::str::contains("3/10"));
}

#[test]
fn test_reimporting_same_file_is_detected() {
    let home = setup();
    let csv = write_csv(home.path(), "nubank.csv", EXPORT);

    centavo(home.path()).args(["import", &csv]).assert().success();
    centavo(home.path())
        .args(["import", &csv])
        .assert()
        .success()
        .stdout(predicate::str::contains("already been imported"));
}

#[test]
fn test_overlapping_export_skips_known_rows() {
    let home = setup();
    let first = write_csv(home.path(), "first.csv", EXPORT);
    let second = write_csv(
        home.path(),
        "second.csv",
        &format!("{EXPORT}18 JAN,NETFLIX.COM,\"55,90\"\n"),
    );

    centavo(home.path()).args(["import", &first]).assert().success();
    centavo(home.path())
        .args(["import", &second])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 imported, 3 skipped (duplicates), 0 rejected"));
}

#[test]
fn test_bad_rows_are_reported_and_skipped() {
    let home = setup();
    let csv = write_csv(
        home.path(),
        "bad.csv",
        "Date,Description,Amount (BRL)\n15 JAN,UBER TRIP,\"25,50\"\n16 JAN,NETFLIX,abc\n",
    );

    centavo(home.path())
        .args(["import", &csv])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 imported, 0 skipped (duplicates), 1 rejected"))
        .stdout(predicate::str::contains("line 3"));
}

#[test]
fn test_abort_on_error_stops_import() {
    let home = setup();
    let csv = write_csv(
        home.path(),
        "bad.csv",
        "Date,Description,Amount (BRL)\n15 JAN,UBER TRIP,\"25,50\"\n16 JAN,NETFLIX,abc\n",
    );

    centavo(home.path())
        .args(["import", &csv, "--abort-on-error"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Row on line 3"));

    centavo(home.path())
        .args(["expenses", "list", "--month", &january()])
        .assert()
        .success()
        .stdout(predicate::str::contains("UBER TRIP").not());
}

#[test]
fn test_header_only_export_is_empty_import() {
    let home = setup();
    let csv = write_csv(home.path(), "empty.csv", "Date,Description,Amount (BRL)\n");

    centavo(home.path())
        .args(["import", &csv])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No data found in the CSV file"));
}

#[test]
fn test_unterminated_quote_is_parse_error() {
    let home = setup();
    let csv = write_csv(
        home.path(),
        "broken.csv",
        "Date,Description,Amount (BRL)\n15 JAN,UBER TRIP,\"25,50\n",
    );

    centavo(home.path())
        .args(["import", &csv])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Parse error on line 2"));
}

#[test]
fn test_non_csv_is_rejected() {
    let home = setup();
    let path = write_csv(home.path(), "export.txt", EXPORT);

    centavo(home.path())
        .args(["import", &path])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not a CSV file"));
}

#[test]
fn test_month_report_with_budget() {
    let home = setup();
    let csv = write_csv(home.path(), "nubank.csv", EXPORT);
    let month = january();

    centavo(home.path()).args(["import", &csv]).assert().success();
    centavo(home.path())
        .args(["budget", "set", "5000", "--month", &month])
        .assert()
        .success();

    // 5000 - (25,50 + 1234,56 + 199,90)
    centavo(home.path())
        .args(["report", "month", "--month", &month])
        .assert()
        .success()
        .stdout(predicate::str::contains("Food"))
        .stdout(predicate::str::contains("R$ 1.459,96"))
        .stdout(predicate::str::contains("Remaining budget: R$ 3.540,04"))
        .stdout(predicate::str::contains("Installments"));
}

#[test]
fn test_set_category_requires_known_category() {
    let home = setup();
    let csv = write_csv(home.path(), "nubank.csv", EXPORT);
    centavo(home.path()).args(["import", &csv]).assert().success();

    centavo(home.path())
        .args(["expenses", "set-category", "1", "Nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown category: Nope"));

    centavo(home.path())
        .args(["expenses", "set-category", "1", "Bills"])
        .assert()
        .success();
}

#[test]
fn test_status_after_import() {
    let home = setup();
    let csv = write_csv(home.path(), "nubank.csv", EXPORT);
    centavo(home.path()).args(["import", &csv]).assert().success();

    centavo(home.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Expenses:    3"))
        .stdout(predicate::str::contains("Imports:     1"));
}

#[test]
fn test_data_dir_env_overrides_settings() {
    let home = setup();
    let other = home.path().join("elsewhere");

    centavo(home.path())
        .env("CENTAVO_DATA_DIR", &other)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("elsewhere"))
        .stdout(predicate::str::contains("Database not found"));
}

#[test]
fn test_import_from_stdin() {
    let home = setup();

    centavo(home.path())
        .args(["import", "-"])
        .write_stdin(EXPORT)
        .assert()
        .success()
        .stdout(predicate::str::contains("3 imported"));
}

#[test]
fn test_add_and_show_expense() {
    let home = setup();

    centavo(home.path())
        .args(["expenses", "add", "2025-03-10", "Aluguel marco", "2.500,00", "--fixed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added expense 1 (Housing, R$ 2.500,00)"));

    centavo(home.path())
        .args(["expenses", "show", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Aluguel marco"))
        .stdout(predicate::str::contains("10/03/2025"));

    centavo(home.path())
        .args(["expenses", "list", "--fixed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Aluguel marco"));

    centavo(home.path())
        .args(["expenses", "show", "99"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown expense: 99"));
}

#[test]
fn test_stdin_invalid_utf8_is_parse_error() {
    let home = setup();
    let mut bytes = b"Date,Description,Amount (BRL)\n15 JAN,".to_vec();
    bytes.extend_from_slice(b"\xff\xfe,\"1,00\"\n");

    centavo(home.path())
        .args(["import", "-"])
        .write_stdin(bytes)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Parse error on line 2"));
}

#[test]
fn test_trend_months_must_be_in_range() {
    let home = setup();

    for months in ["0", "121", "4294967295"] {
        centavo(home.path())
            .args(["report", "trend", "--months", months])
            .assert()
            .failure()
            .stderr(predicate::str::contains("--months"));
    }

    centavo(home.path())
        .args(["report", "trend", "--months", "120"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Monthly Trend"));
}

#[test]
fn test_similar_and_recategorize() {
    let home = setup();
    let csv = write_csv(
        home.path(),
        "nubank.csv",
        "Date,Description,Amount (BRL)\n\
         15 JAN,Padaria Sol,\"8,00\"\n\
         16 JAN,PADARIA SOL,\"9,00\"\n\
         17 JAN,Padaria Sol Filial,\"7,00\"\n\
         18 JAN,NETFLIX.COM,\"55,90\"\n",
    );
    centavo(home.path()).args(["import", &csv]).assert().success();

    centavo(home.path())
        .args(["expenses", "similar", "padaria"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 groups"))
        .stdout(predicate::str::contains("Padaria Sol"))
        .stdout(predicate::str::contains("1 2"));

    centavo(home.path())
        .args(["expenses", "recategorize", "padaria sol", "Food", "--exact"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated 2 expenses to Food"));

    centavo(home.path())
        .args(["expenses", "recategorize", "padaria", "Bills"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated 3 expenses to Bills"));

    centavo(home.path())
        .args(["expenses", "recategorize", "netflix", "Nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown category: Nope"));
}

#[test]
fn test_edit_expense() {
    let home = setup();
    centavo(home.path())
        .args(["expenses", "add", "2025-03-10", "UBER", "25,50"])
        .assert()
        .success();

    centavo(home.path())
        .args([
            "expenses",
            "edit",
            "1",
            "--date",
            "2025-03-12",
            "--description",
            "UBER EATS",
            "--amount",
            "-30,00",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("12/03/2025"))
        .stdout(predicate::str::contains("UBER EATS"))
        .stdout(predicate::str::contains("-R$ 30,00"));

    centavo(home.path())
        .args(["expenses", "edit", "1", "--amount", "abc"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot decode amount"));

    centavo(home.path())
        .args(["expenses", "edit", "7", "--description", "X"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown expense: 7"));
}

#[test]
fn test_status_shows_policy_as_configured() {
    let home = setup();
    centavo(home.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Row policy: skip"));
}

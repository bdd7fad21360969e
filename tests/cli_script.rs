use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;
use regex::Regex;
use tempfile::tempdir;

fn rentbook(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("rentbook").unwrap();
    cmd.env("RENTBOOK_HOME", home)
        .env("RENTBOOK_CLI_SCRIPT", "1")
        .env("RENTBOOK_TODAY", "2024-07-15")
        .env_remove("RUST_LOG");
    cmd
}

const SETUP: &str = r#"book new "Sunrise Flats"
room add 1 single 15000
room add 2 double 8000
tenant add "Eric Onyango" 0700111222 2024-01-01 --room 1
tenant add "Amina Wanjiru" 0700333444 2024-03-01 --room 2 --id-number 12345678
"#;

#[test]
fn overpayment_rolls_into_credit() {
    let home = tempdir().unwrap();
    let script = format!(
        "{SETUP}pay \"Eric Onyango\" 10000 2024-07-02 M-Pesa\npay \"Eric Onyango\" 9000 2024-07-05\ntenant show \"Eric Onyango\"\nexit\n"
    );

    rentbook(home.path())
        .write_stdin(script)
        .assert()
        .success()
        .stdout(contains("Book `Sunrise Flats` created."))
        .stdout(contains("Eric Onyango still owes KES 5,000.00 for 2024-07."))
        .stdout(contains("KES 4,000.00 credit carried forward"))
        .stdout(contains("Status       : credit"));

    let saved = std::fs::read_to_string(home.path().join("books").join("sunrise_flats.json")).unwrap();
    assert!(saved.contains("\"Eric Onyango\""));
    assert!(saved.contains("\"credit_month\": \"2024-07\""));
}

#[test]
fn reminders_list_only_tenants_who_owe() {
    let home = tempdir().unwrap();
    let script = format!(
        "{SETUP}pay \"Eric Onyango\" 15000 2024-07-01\npay \"Amina Wanjiru\" 3000 2024-07-08\nreminders\n"
    );

    rentbook(home.path())
        .write_stdin(script)
        .assert()
        .success()
        .stdout(contains("Eric Onyango is paid up for 2024-07."))
        .stdout(
            predicates::str::is_match(r"(?m)^warning\s+Amina Wanjiru\s+2\s+KES 5,000\.00\s+7$")
                .unwrap(),
        )
        .stdout(contains("pending  Eric").not())
        .stdout(contains("warning  Eric").not());
}

#[test]
fn last_book_reopens_and_payment_removal_restores_balance() {
    let home = tempdir().unwrap();
    let first = rentbook(home.path())
        .write_stdin(format!(
            "{SETUP}pay \"Amina Wanjiru\" 8000 2024-07-01 rent\npayment list\n"
        ))
        .assert()
        .success();
    let stdout = String::from_utf8(first.get_output().stdout.clone()).unwrap();
    let id = Regex::new(r"(?m)^([0-9a-f]{8})\s+2024-07-01\s+Amina Wanjiru")
        .unwrap()
        .captures(&stdout)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .expect("payment id in listing");

    rentbook(home.path())
        .write_stdin(format!("payment remove {id}\ntenant list\nreminders\n"))
        .assert()
        .success()
        .stdout(contains("Deleted payment of KES 8,000.00 from Amina Wanjiru on 2024-07-01."))
        .stdout(contains("KES -8,000.00"))
        .stdout(contains("critical"));
}

#[test]
fn rejects_non_positive_payments_unless_adjustments_enabled() {
    let home = tempdir().unwrap();
    rentbook(home.path())
        .write_stdin(format!(
            "{SETUP}pay \"Eric Onyango\" 0\nconfig set allow_adjustments true\npay \"Eric Onyango\" -500 2024-07-03 correction\n"
        ))
        .assert()
        .success()
        .stdout(contains("payment amount must be positive"))
        .stdout(contains("allow_adjustments = true"))
        .stdout(contains("Recorded KES -500.00 from Eric Onyango on 2024-07-03."));
}

#[test]
fn conflicting_room_assignment_is_reported() {
    let home = tempdir().unwrap();
    rentbook(home.path())
        .write_stdin(format!(
            "{SETUP}tenant add \"Late Comer\" 0700999000 2024-06-01 --room 1\nroom remove 1\ntenant list\n"
        ))
        .assert()
        .success()
        .stdout(contains("Conflict: room `1` is occupied"))
        .stdout(contains("Conflict: room `1` still has tenants"))
        .stdout(contains("Late Comer").not());
}

#[test]
fn commands_need_an_open_book() {
    let home = tempdir().unwrap();
    rentbook(home.path())
        .write_stdin("room list\ndashboard\n")
        .assert()
        .success()
        .stdout(contains("No book open").count(2))
        .stdout(contains("book new"));
}

#[test]
fn unknown_commands_get_a_suggestion() {
    let home = tempdir().unwrap();
    rentbook(home.path())
        .write_stdin("pya\nhelp pay\nversion\n")
        .assert()
        .success()
        .stdout(contains("Unknown command `pya`"))
        .stdout(contains("Suggestion: `pay`?"))
        .stdout(contains("pay <tenant> <amount> [date] [note]"))
        .stdout(contains(format!("Rentbook {}", env!("CARGO_PKG_VERSION"))));
}

#[test]
fn dashboard_json_reports_arrears() {
    let home = tempdir().unwrap();
    let output = rentbook(home.path())
        .write_stdin(format!(
            "{SETUP}pay \"Eric Onyango\" 10000 2024-07-02\ndashboard --json\n"
        ))
        .assert()
        .success();
    let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();
    let start = stdout.find("{\n").expect("json object in output");
    let json: serde_json::Value = serde_json::from_str(&stdout[start..]).unwrap();

    assert_eq!(json["month"], "2024-07");
    assert_eq!(json["stats"]["occupied_rooms"], 2);
    assert_eq!(json["total_arrears"], 1_300_000);
    assert_eq!(json["reminders"].as_array().map(Vec::len), Some(2));
}

#[test]
fn unparsable_today_override_fails_fast() {
    let home = tempdir().unwrap();
    rentbook(home.path())
        .env("RENTBOOK_TODAY", "15/07/2024")
        .write_stdin("exit\n")
        .assert()
        .failure()
        .stderr(contains("RENTBOOK_TODAY"));
}

//! End-to-end runs of the `ledgr` binary against a temporary data directory.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

const PASS: &str = "hunter2";

fn ledgr(data_dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ledgr"))
        .arg("--data-dir")
        .arg(data_dir)
        .args(args)
        .env("LEDGR_PASSPHRASE", PASS)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run ledgr")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn init_post_verify_show() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("books");

    let out = ledgr(&data, &["init", "--identity", "owner"]);
    assert!(out.status.success(), "{:?}", out);
    assert!(stdout(&out).contains("Initialized ledger"));

    let batch = dir.path().join("rent.json");
    fs::write(
        &batch,
        r#"{ "records": [
            { "sender": "owner", "class": "Expenses", "subclass": "Rent Expense",
              "debit": "1200", "credit": "0", "detail": "March rent" },
            { "sender": "owner", "class": "Assets", "subclass": "Cash",
              "debit": "0", "credit": "1200" }
        ] }"#,
    )
    .unwrap();
    let out = ledgr(&data, &["post", "--creator", "owner", "--batch", batch.to_str().unwrap()]);
    assert!(out.status.success(), "{:?}", out);
    assert!(stdout(&out).contains("Appended block 2"));

    let out = ledgr(&data, &["verify"]);
    assert!(out.status.success(), "{:?}", out);
    assert!(stdout(&out).contains("Signatures: ok"));

    let out = ledgr(&data, &["show"]);
    assert!(out.status.success(), "{:?}", out);
    let text = stdout(&out);
    assert!(text.contains("March rent"));
    assert!(text.contains("2 of 2 blocks"));
}

#[test]
fn failures_exit_nonzero() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("books");

    let out = ledgr(&data, &["verify"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).starts_with("Error:"));

    assert!(ledgr(&data, &["init", "--identity", "owner"]).status.success());

    let batch = dir.path().join("lopsided.json");
    fs::write(
        &batch,
        r#"{ "records": [
            { "sender": "owner", "class": "Assets", "subclass": "Cash",
              "debit": "100", "credit": "0" }
        ] }"#,
    )
    .unwrap();
    let out = ledgr(&data, &["post", "--creator", "owner", "--batch", batch.to_str().unwrap()]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("do not balance"));
}

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;

const BUDGET: &str = "Orcamento Painel 01;;;;\n\
                      COMPONENTE;FABRICANTE;MODELO;PREÇO UNID;QTD\n\
                      Contator 9A;WEG;CWM9;R$ 1.234,56;2\n\
                      Borne 2,5mm;Phoenix;UT 2.5;3,50;10\n";

/// Latin-1 encoded fixture, the way spreadsheets saved as CSV usually arrive.
fn write_budget(dir: &Path) -> PathBuf {
    let path = dir.join("dados.csv");
    let bytes: Vec<u8> = BUDGET.chars().map(|c| c as u32 as u8).collect();
    std::fs::write(&path, bytes).unwrap();
    path
}

fn painel(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("painel").unwrap();
    cmd.env("HOME", home).env_remove("RUST_LOG").current_dir(home);
    cmd
}

#[test]
fn missing_file_explains_what_to_do() {
    let dir = tempfile::tempdir().unwrap();
    painel(dir.path())
        .arg("summary")
        .assert()
        .failure()
        .stderr(predicate::str::contains("File not found"))
        .stderr(predicate::str::contains("Rename your component spreadsheet to 'dados.xlsx'"));
}

#[test]
fn summary_reports_kpis() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_budget(dir.path());
    painel(dir.path())
        .args(["summary", "--file"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("R$ 2,504.12"))
        .stdout(predicate::str::contains("12"))
        .stdout(predicate::str::contains("WEG"));
}

#[test]
fn table_is_sorted_by_line_total() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_budget(dir.path());
    let output = painel(dir.path())
        .args(["table", "--file"])
        .arg(&file)
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.find("Contator 9A").unwrap() < stdout.find("Borne 2,5mm").unwrap());
}

#[test]
fn bare_invocation_without_terminal_prints_overview() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_budget(dir.path());
    painel(dir.path())
        .arg("--file")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Budget Summary"))
        .stdout(predicate::str::contains("Components (2 rows"));
}

#[test]
fn gallery_filters_by_manufacturer() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_budget(dir.path());
    painel(dir.path())
        .args(["gallery", "-m", "Phoenix", "--file"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Qtd: 10 un."))
        .stdout(predicate::str::contains("Contator").not());
}

#[test]
fn detail_of_unknown_component_fails() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_budget(dir.path());
    painel(dir.path())
        .args(["detail", "Inversor", "--file"])
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown component: Inversor"));
}

#[test]
fn export_csv_writes_file() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_budget(dir.path());
    let out = dir.path().join("out").join("orcamento.csv");
    painel(dir.path())
        .args(["export", "--file"])
        .arg(&file)
        .arg("--output")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote"));
    let bytes = std::fs::read(&out).unwrap();
    let text: String = bytes.iter().map(|&b| b as char).collect();
    assert!(text.contains("TOTAL_LINHA"));
    assert!(text.contains("Contator 9A"));
}

#[test]
fn config_changes_currency() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_budget(dir.path());
    painel(dir.path())
        .args(["config", "--currency", "US$"])
        .assert()
        .success()
        .stdout(predicate::str::contains("US$"));
    assert!(dir.path().join(".config/painel/settings.json").exists());

    painel(dir.path())
        .args(["summary", "--file"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("US$ 2,504.12"));
}

#[test]
fn completions_are_generated() {
    let dir = tempfile::tempdir().unwrap();
    painel(dir.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("painel"));
}

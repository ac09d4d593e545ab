use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const PROFILES: &str = "\
pv,demand_el,machine_load
0,8,0
12,6,0
30,6,10
4,9,0
";

const HOURLY: &str = "\
[horizon]
timesteps = 4
timestep_hours = 1.0
start = \"2016-06-01T10:00:00\"
";

fn write_inputs(dir: &Path) -> (String, String) {
    let profiles = dir.join("profiles.csv");
    let config = dir.join("gridcon.toml");
    fs::write(&profiles, PROFILES).unwrap();
    fs::write(&config, HOURLY).unwrap();
    (
        profiles.to_str().unwrap().to_string(),
        config.to_str().unwrap().to_string(),
    )
}

#[test]
fn help_lists_commands() {
    let mut cmd = Command::cargo_bin("gridcon").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("size"))
        .stdout(predicate::str::contains("epc"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn epc_prints_grid_connection_cost() {
    let mut cmd = Command::cargo_bin("gridcon").unwrap();
    cmd.args([
        "epc",
        "--capex",
        "500",
        "--years",
        "50",
        "--lifetime",
        "50",
        "--wacc",
        "0.05",
        "--operating-cost",
        "10",
    ])
    .assert()
    .success()
    .stdout(predicate::str::starts_with("37.388368"));
}

#[test]
fn epc_rejects_zero_wacc() {
    let mut cmd = Command::cargo_bin("gridcon").unwrap();
    cmd.args([
        "epc",
        "--capex",
        "500",
        "--years",
        "50",
        "--lifetime",
        "50",
        "--wacc",
        "0",
    ])
    .assert()
    .failure()
    .stderr(predicate::str::contains("Invalid parameter"));
}

#[test]
fn config_default_is_toml() {
    let mut cmd = Command::cargo_bin("gridcon").unwrap();
    cmd.args(["config", "default"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[horizon]"))
        .stdout(predicate::str::contains("timesteps = 35136"))
        .stdout(predicate::str::contains("demand_el"));
}

#[test]
fn config_check_reports_coefficients() {
    let dir = tempdir().unwrap();
    let (_, config) = write_inputs(dir.path());
    let mut cmd = Command::cargo_bin("gridcon").unwrap();
    cmd.args(["config", "check", &config])
        .assert()
        .success()
        .stdout(predicate::str::contains("ok (4 timesteps"))
        .stdout(predicate::str::contains("kN 37.3884"));
}

#[test]
fn config_check_rejects_bad_values() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, "[storage]\nmin_soc = 0.95\n").unwrap();
    let mut cmd = Command::cargo_bin("gridcon").unwrap();
    cmd.args(["config", "check", path.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("SoC limits"));
}

#[test]
fn size_writes_report_json_and_balance() {
    let dir = tempdir().unwrap();
    let (profiles, config) = write_inputs(dir.path());
    let out = dir.path().join("result.json");
    let balance = dir.path().join("balance").join("lv.csv");

    let mut cmd = Command::cargo_bin("gridcon").unwrap();
    cmd.args([
        "--log-level",
        "warn",
        "size",
        "--profiles",
        &profiles,
        "--config",
        &config,
        "--out",
        out.to_str().unwrap(),
        "--bus-balance",
        balance.to_str().unwrap(),
        "--flows",
        "--strict",
    ])
    .assert()
    .success()
    .stdout(predicate::str::contains("CAPACITY OF GRID CONNECTION"))
    .stdout(predicate::str::contains("Accordance:"))
    .stdout(predicate::str::contains("Sizing Solution Summary"))
    .stdout(predicate::str::contains("storage_in"));

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(json["timesteps"], 4);
    assert_eq!(json["solver"], "clarabel");
    assert!(json["breakdown"]["accordance"]["gap_rel"].as_f64().unwrap() < 1e-3);
    assert!(json["diagnostics"].is_object());
    assert!(json["diagnostics"]["issues"].is_null());

    let table = fs::read_to_string(&balance).unwrap();
    let mut lines = table.lines();
    let header = lines.next().unwrap();
    assert!(header.starts_with("timestamp,"));
    assert!(header.contains("pv->b_el_lv"));
    assert!(lines.next().unwrap().starts_with("2016-06-01T10:00:00"));
    assert_eq!(table.lines().count(), 5);
}

#[test]
fn size_rejects_profiles_longer_than_horizon() {
    let dir = tempdir().unwrap();
    let (profiles, config) = write_inputs(dir.path());

    let mut cmd = Command::cargo_bin("gridcon").unwrap();
    cmd.args([
        "size",
        "--profiles",
        &profiles,
        "--config",
        &config,
        "--timesteps",
        "2",
    ])
    .assert()
    .failure()
    .stderr(predicate::str::contains("has 4 rows, horizon has 2 timesteps"));
}

#[test]
fn size_truncate_profiles_uses_leading_rows() {
    let dir = tempdir().unwrap();
    let (profiles, config) = write_inputs(dir.path());
    let out = dir.path().join("result.json");

    let mut cmd = Command::cargo_bin("gridcon").unwrap();
    cmd.args([
        "size",
        "--profiles",
        &profiles,
        "--config",
        &config,
        "--timesteps",
        "2",
        "--truncate-profiles",
        "--out",
        out.to_str().unwrap(),
    ])
    .assert()
    .success();

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(json["timesteps"], 2);
}

#[test]
fn size_missing_column_fails() {
    let dir = tempdir().unwrap();
    let profiles = dir.path().join("profiles.csv");
    fs::write(&profiles, "pv,demand_el\n1,2\n").unwrap();

    let mut cmd = Command::cargo_bin("gridcon").unwrap();
    cmd.args([
        "size",
        "--profiles",
        profiles.to_str().unwrap(),
        "--timesteps",
        "1",
    ])
    .assert()
    .failure()
    .stderr(predicate::str::contains("machine_load"));
}

#[test]
fn size_unknown_solver_fails() {
    let dir = tempdir().unwrap();
    let (profiles, config) = write_inputs(dir.path());
    let mut cmd = Command::cargo_bin("gridcon").unwrap();
    cmd.args([
        "size",
        "--profiles",
        &profiles,
        "--config",
        &config,
        "--solver",
        "cplex",
    ])
    .assert()
    .failure()
    .stderr(predicate::str::contains("cplex"));
}

//! The `simulate` subcommand, run as a real process.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn eventhorizon(args: &[&str], home: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_eventhorizon"))
        .args(args)
        .env("HOME", home)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

#[test]
fn simulate_prints_summary_and_writes_json() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("runs").join("binary.json");
    let config = dir.path().join("missing.toml");
    let output = eventhorizon(
        &[
            "simulate",
            "--config",
            config.to_str().unwrap(),
            "--seed",
            "7",
            "--scenario",
            "binary",
            "--time",
            "2",
            "--samples",
            "10",
            "--integrator",
            "rk4",
            "--out",
            out.to_str().unwrap(),
        ],
        dir.path(),
    );
    assert!(output.status.success(), "{output:?}");

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Binary + planet (3 bodies, seed 7)"), "{stdout}");
    assert!(stdout.contains("Runge-Kutta 4"), "{stdout}");
    assert!(stdout.contains("Frames:      10"), "{stdout}");

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(json["seed"], 7);
    assert_eq!(json["integrator"], "rk4");
    assert_eq!(json["frames"].as_array().unwrap().len(), 10);
}

#[test]
fn simulate_rejects_out_of_range_bodies() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("missing.toml");
    let output = eventhorizon(
        &[
            "simulate",
            "--config",
            config.to_str().unwrap(),
            "--bodies",
            "500",
        ],
        dir.path(),
    );
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("simulation failed"), "{stderr}");
}

#[test]
fn unknown_scenario_is_a_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    let output = eventhorizon(&["simulate", "--scenario", "spiral"], dir.path());
    assert_eq!(output.status.code(), Some(2));
}

//! Integration tests for the TripAgent CLI

use std::process::Command;

fn tripagent_mock_mode() -> Command {
    let mut command = Command::new("cargo");
    command
        .args(["run", "--quiet", "--"])
        .env_remove("GEMINI_API_KEY")
        .env("TRIPAGENT_PLANNER__MODE", "mock");
    command
}

/// Test that the CLI shows help with the explicit help flag
#[test]
fn test_cli_help() {
    let output = Command::new("cargo")
        .args(["run", "--quiet", "--", "--help"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--destination"));
    assert!(stdout.contains("--interests"));
    assert!(stdout.contains("--budget"));
}

/// End-to-end mock-mode planning run with all flags supplied
#[test]
fn test_mock_mode_end_to_end() {
    let output = tripagent_mock_mode()
        .args([
            "--destination",
            "San Francisco",
            "--start-date",
            "2024-06-01",
            "--end-date",
            "2024-06-02",
            "--interests",
            "food,sightseeing",
            "--budget",
            "moderate",
        ])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(stdout.contains("Itinerary for San Francisco"));
    assert!(stdout.contains("Mock Forecast"));
    assert!(stdout.contains("Day 1: 2024-06-01"));
    assert!(stdout.contains("Day 2: 2024-06-02"));
    assert!(stdout.contains("Morning:"));
    assert!(stdout.contains("Evening:"));
}

/// Empty required fields are rejected before any planning happens
#[test]
fn test_empty_destination_error() {
    let output = tripagent_mock_mode()
        .args([
            "--destination",
            "",
            "--start-date",
            "2024-06-01",
            "--end-date",
            "2024-06-02",
            "--interests",
            "food",
            "--budget",
            "moderate",
        ])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("destination cannot be empty"));
}

/// Interests are split on commas and trimmed
#[test]
fn test_interest_splitting() {
    let output = tripagent_mock_mode()
        .args([
            "--destination",
            "Lisbon",
            "--start-date",
            "2024-09-10",
            "--end-date",
            "2024-09-11",
            "--interests",
            " surfing ,  seafood ",
            "--budget",
            "budget",
        ])
        .output()
        .expect("Failed to execute command");

    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("surfing"));
    assert!(stdout.contains("seafood"));
}

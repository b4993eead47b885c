/// Smoke tests to verify the binary runs without panicking
use std::process::Command;

fn run(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_nightside"))
        .args(args)
        .output()
        .expect("Failed to execute nightside")
}

#[test]
fn binary_shows_help() {
    let output = run(&["--help"]);

    assert!(
        output.status.success(),
        "Binary failed to run --help: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("nightside"),
        "Help output should mention nightside"
    );
}

#[test]
fn binary_shows_version() {
    let output = run(&["--version"]);

    assert!(
        output.status.success(),
        "Binary failed to run --version: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn invalid_subcommand_fails_gracefully() {
    let output = run(&["nonexistent-command"]);

    // Should fail with error, not panic
    assert!(
        !output.status.success(),
        "Invalid subcommand should return error status"
    );

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        !stderr.contains("panicked at"),
        "Invalid subcommand should not cause panic"
    );
}

#[test]
fn geojson_prints_a_feature_collection() {
    let output = run(&["geojson", "--at", "2024-06-20T20:51:00Z"]);

    assert!(
        output.status.success(),
        "geojson failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("geojson output is not JSON");
    assert_eq!(json["type"], "FeatureCollection");
    let ring = &json["features"][0]["geometry"]["coordinates"][0];
    assert_eq!(ring.as_array().map(Vec::len), Some(76));
    assert_eq!(ring[0], ring[75]);
}

#[test]
fn sample_prints_one_line_per_meridian() {
    let output = run(&["sample", "--at", "1718916660"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("# 2024-06-20T20:51:00Z dark hemisphere: south"));
    assert!(stdout.contains("# 73 meridians, 5° apart, 10 halvings each"));
    let rows: Vec<&str> = stdout.lines().filter(|l| !l.starts_with('#')).collect();
    assert_eq!(rows.len(), 73);
    assert!(rows[0].trim_start().starts_with("-180.0000 "));
}

#[test]
fn point_reports_day_or_night() {
    let output = run(&["point", "--lat", "-80", "--lon", "0", "--at", "2024-06-20T20:51:00Z"]);

    assert!(
        output.status.success(),
        "point failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Sun:         night"));
    assert!(stdout.contains("In overlay:  yes"));
}

#[test]
fn out_of_range_point_is_an_error() {
    let output = run(&["point", "--lat", "91", "--lon", "0"]);

    assert!(!output.status.success());
    assert!(!String::from_utf8_lossy(&output.stderr).contains("panicked at"));
}

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

const METRICS: &str = "iter,vertices,num_edges,iter_time,mem\n\
                       0,1000,4500,12.5,20480\n\
                       1,820,3900,10.25,21000\n\
                       2,610,2800,8.0,21900\n";

fn iterplot(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_iterplot"))
        .current_dir(dir)
        .env("RUST_LOG", "warn")
        .args(args)
        .output()
        .expect("failed to run iterplot")
}

#[test]
fn multi_axis_chart_is_written() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("out.csv"), METRICS).unwrap();

    let output = iterplot(dir.path(), &[]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let svg = fs::read_to_string(dir.path().join("plot.svg")).unwrap();
    assert!(svg.contains("<svg"));
    assert!(svg.contains("num_edges"));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Wrote chart to plot.svg"));
}

#[test]
fn grid_chart_with_selected_columns() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("parts.csv"), METRICS).unwrap();

    let output = iterplot(
        dir.path(),
        &[
            "parts.csv",
            "--layout",
            "grid",
            "-y",
            "iter_time,mem",
            "--label",
            "iter_time=Iteration Time (ms)",
            "--annotate",
            "-o",
            "charts/parts.svg",
        ],
    );
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let svg = fs::read_to_string(dir.path().join("charts/parts.svg")).unwrap();
    assert!(svg.contains("Iteration Time (ms)"));
    assert!(!svg.contains("vertices"));
}

#[test]
fn summary_json_goes_to_stdout() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("out.csv"), METRICS).unwrap();

    let output = iterplot(dir.path(), &["--summary-json"]);
    assert!(output.status.success());

    let summaries: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let columns = summaries.as_array().unwrap();
    assert_eq!(columns.len(), 5);
    assert_eq!(columns[1]["name"], "vertices");
    assert_eq!(columns[1]["max"], 1000.0);
}

#[test]
fn missing_input_fails() {
    let dir = tempfile::tempdir().unwrap();

    let output = iterplot(dir.path(), &["missing.csv"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("missing.csv"));
    assert_eq!(stderr.matches("Error:").count(), 1, "stderr: {stderr}");
    assert!(!dir.path().join("plot.svg").exists());
}

#[test]
fn out_of_range_settings_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("out.csv"), METRICS).unwrap();
    fs::write(dir.path().join("plot.json"), r#"{ "max-grid-columns": 0 }"#).unwrap();

    let config = iterplot(dir.path(), &["-c", "plot.json", "--layout", "grid"]);
    assert!(!config.status.success());
    assert!(String::from_utf8_lossy(&config.stderr).contains("max-grid-columns must be at least 1"));

    let flag = iterplot(dir.path(), &["--axis-offset", "3000000000"]);
    assert!(!flag.status.success());
    assert!(!dir.path().join("plot.svg").exists());
}

#[test]
fn short_row_fails() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("out.csv"), "iter,vertices,mem\n0,10,5\n1,12\n").unwrap();

    let output = iterplot(dir.path(), &[]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("expected 3 fields, found 2"));
}

#[test]
fn strict_mode_rejects_mixed_column() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("out.csv"), "iter,mem\n0,5\n1,oom\n").unwrap();

    let permissive = iterplot(dir.path(), &[]);
    assert!(permissive.status.success());

    let strict = iterplot(dir.path(), &["--strict"]);
    assert!(!strict.status.success());
    assert!(String::from_utf8_lossy(&strict.stderr).contains("mixes numbers and text"));
}

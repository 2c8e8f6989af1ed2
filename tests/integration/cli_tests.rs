//! Command-line tests against the built binary.
//!
//! Tests verify:
//! - `--json` output on stdout is a single parseable document
//! - Log lines go to stderr

use std::process::{Command, Output};

use super::test_utils::write_test_image;

fn dzi_tiler(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_dzi-tiler"))
        .args(args)
        .env("RUST_LOG", "dzi_tiler=info")
        .output()
        .unwrap()
}

#[test]
fn test_generate_json_stdout_is_parseable() {
    let input_dir = tempfile::tempdir().unwrap();
    let output_dir = tempfile::tempdir().unwrap();
    let source = write_test_image(input_dir.path(), "in.png", 40, 30);

    let output = dzi_tiler(&[
        "generate",
        "--input",
        source.to_str().unwrap(),
        "--output",
        output_dir.path().to_str().unwrap(),
        "--json",
    ]);
    assert!(output.status.success(), "{:?}", output);

    let stdout = String::from_utf8(output.stdout).unwrap();
    let summary: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(summary["width"], 40);
    assert_eq!(summary["height"], 30);
    assert_eq!(summary["max_level"], 6);
    assert_eq!(summary["tiles_written"], 7);

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Level 6"), "{}", stderr);
}

#[test]
fn test_verify_json_stdout_is_parseable() {
    let input_dir = tempfile::tempdir().unwrap();
    let output_dir = tempfile::tempdir().unwrap();
    let source = write_test_image(input_dir.path(), "in.png", 40, 30);

    let generate = dzi_tiler(&[
        "generate",
        "--input",
        source.to_str().unwrap(),
        "--output",
        output_dir.path().to_str().unwrap(),
    ]);
    assert!(generate.status.success(), "{:?}", generate);
    assert!(generate.stdout.is_empty());

    let dzi_path = output_dir.path().join("in.dzi");
    let output = dzi_tiler(&["verify", "--dzi", dzi_path.to_str().unwrap(), "--json"]);
    assert!(output.status.success(), "{:?}", output);

    let report: serde_json::Value =
        serde_json::from_str(&String::from_utf8(output.stdout).unwrap()).unwrap();
    assert_eq!(report["expected"], 7);
    assert_eq!(report["found"], 7);
    assert_eq!(report["missing"], serde_json::json!([]));
}

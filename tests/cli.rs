//! Tests that drive the `sumc` binary.

use std::io::Write;
use std::process::{Command, Output};

use tempfile::{NamedTempFile, TempDir};

const SHAPES: &str = r#"{
    "package": "geo",
    "types": [{
        "name": "Shape",
        "variants": [
            { "name": "Circle", "payload": [{ "primitive": "Int32" }] },
            { "name": "Rect", "payload": [{ "primitive": "Int32" }, { "primitive": "Int32" }] },
            { "name": "Empty" }
        ]
    }]
}"#;

fn decls(json: &str) -> NamedTempFile {
    let mut file = NamedTempFile::with_suffix(".json").expect("Failed to create temp file");
    file.write_all(json.as_bytes()).expect("Failed to write declarations");
    file
}

fn sumc(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_sumc"))
        .args(args)
        .output()
        .expect("Failed to execute sumc")
}

#[test]
fn test_lower_writes_output_file() {
    let input = decls(SHAPES);
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("shapes.c");

    let output = sumc(&[
        "lower",
        input.path().to_str().unwrap(),
        "-o",
        out.to_str().unwrap(),
        "--std",
        "c11",
        "--guard-prefix",
        "GEO",
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let c = std::fs::read_to_string(&out).unwrap();
    assert!(c.starts_with("#ifndef GEO_BOOLEANS_DEFINED\n"));
    assert!(c.contains("#define GEO_SHAPE_EMPTY 2\n"));
    assert!(c.contains("    core_basic_types_UInt8 kind;\n"));
    assert!(c.contains("geo_Shape New_geo_Shape_Empty(void) {\n"));
}

#[test]
fn test_lower_to_stdout_with_c89_target() {
    let input = decls(SHAPES);
    let output = sumc(&[
        "lower",
        input.path().to_str().unwrap(),
        "--std",
        "c89",
        "--target",
        "x86_64-pc-windows-msvc",
    ]);
    assert!(output.status.success());

    let c = String::from_utf8(output.stdout).unwrap();
    assert!(c.contains("typedef unsigned long long int core_basic_types_UInt64;\n"));
    assert!(c.contains("geo_Shape result = {0};\n"));
}

#[test]
fn test_tags_prints_json() {
    let input = decls(SHAPES);
    let output = sumc(&["tags", input.path().to_str().unwrap()]);
    assert!(output.status.success());

    let table: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let rows = table.as_array().unwrap();
    assert_eq!(rows.len(), 5);
    assert_eq!(rows[2]["ty"], "geo_Shape");
    assert_eq!(rows[2]["variant"], "Circle");
    assert_eq!(rows[2]["tag"], 0);
    assert_eq!(rows[3]["fields"], serde_json::json!(["Rect_0", "Rect_1"]));
}

#[test]
fn test_errors_are_reported_on_stderr() {
    let input = decls(
        r#"{
            "package": "p",
            "types": [{
                "name": "Shape",
                "variants": [
                    { "name": "Circle", "payload": [{ "primitive": "Float" }] },
                    { "name": "Circle" }
                ]
            }]
        }"#,
    );
    let output = sumc(&["lower", input.path().to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());

    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("[ERROR] Unknown primitive type: Float"));
    assert!(stderr.contains("[ERROR] Shape: Duplicate variant `Circle` in type `Shape`"));
}

#[test]
fn test_unknown_dialect_is_rejected() {
    let input = decls(SHAPES);
    let output = sumc(&["lower", input.path().to_str().unwrap(), "--std", "c++20"]);
    assert!(!output.status.success());
}

//! Integration tests: run the interface test vectors.
//!
//! Each fixture in tests/fixtures/ has:
//! - case.json: the interface declaration, the object, and an optional
//!   prototype the object delegates to
//! - expect.json: the expected check outcome
//!
//! These tests build the interface and object, run the check, and compare
//! the outcome to the expected result, including the reported property and
//! tags on mismatch.

use protomix_kernel::{ErrorKind, Interface, KernelError, Value};
use serde_json::{Value as Json, json};
use std::path::{Path, PathBuf};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn read_json(path: &Path) -> Json {
    let text = std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("failed to read {}: {e}", path.display()));
    serde_json::from_str(&text)
        .unwrap_or_else(|e| panic!("failed to parse {}: {e}", path.display()))
}

fn outcome(result: Result<(), KernelError>) -> Json {
    match result {
        Ok(()) => json!({"matches": true}),
        Err(KernelError::Validation {
            property,
            gotten,
            expected,
            ..
        }) => json!({
            "matches": false,
            "error": {
                "kind": ErrorKind::Validation,
                "property": property,
                "gotten": gotten,
                "expected": expected,
            }
        }),
        Err(err) => json!({
            "matches": false,
            "error": {"kind": err.kind(), "message": err.to_string()}
        }),
    }
}

fn run_fixture(name: &str) {
    let dir = fixtures_dir().join(name);
    let case = read_json(&dir.join("case.json"));
    let expected = read_json(&dir.join("expect.json"));

    let interface = Interface::from_values(
        &Value::from_json(&case["interface"]["name"]),
        &Value::from_json(&case["interface"]["properties"]),
    )
    .unwrap_or_else(|e| panic!("fixture {name}: invalid interface: {e}"));

    let object = Value::from_json(&case["object"]);
    if let Some(prototype) = case.get("prototype") {
        let prototype = Value::from_json(prototype);
        object
            .as_object()
            .expect("object field must be a JSON object")
            .set_delegate(prototype.as_object())
            .expect("prototype must not form a cycle");
    }

    let got = outcome(interface.matches(&object));
    assert_eq!(
        got,
        expected,
        "\n\nFixture: {name}\n\nGot:\n{}\n\nExpected:\n{}\n",
        serde_json::to_string_pretty(&got).unwrap(),
        serde_json::to_string_pretty(&expected).unwrap(),
    );
}

#[test]
fn golden_widget_handle() {
    run_fixture("golden_widget_handle");
}

#[test]
fn golden_inherited_members() {
    run_fixture("golden_inherited_members");
}

#[test]
fn golden_mixed_case_declaration() {
    run_fixture("golden_mixed_case_declaration");
}

#[test]
fn adversarial_first_mismatch_wins() {
    run_fixture("adversarial_first_mismatch_wins");
}

#[test]
fn adversarial_missing_undefined() {
    run_fixture("adversarial_missing_undefined");
}

#[test]
fn adversarial_null_is_not_object() {
    run_fixture("adversarial_null_is_not_object");
}

#[test]
fn adversarial_handle_is_not_object() {
    run_fixture("adversarial_handle_is_not_object");
}

#[test]
fn adversarial_declaration_order_not_alphabetical() {
    run_fixture("adversarial_declaration_order_not_alphabetical");
}

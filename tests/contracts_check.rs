mod common;

use common::*;
use jsonschema::JSONSchema;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;

fn load_schema(name: &str) -> Value {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let raw = fs::read_to_string(root.join("docs/contracts").join(name)).unwrap();
    serde_json::from_str(&raw).unwrap()
}

fn validate(schema_name: &str, data: &Value) {
    let schema = load_schema(schema_name);
    let validator = JSONSchema::compile(&schema).expect("compile schema");
    let msgs: Vec<String> = match validator.validate(data) {
        Ok(()) => return,
        Err(errors) => errors.map(|e| e.to_string()).collect(),
    };
    panic!("schema validation failed: {}", msgs.join(" | "));
}

#[test]
fn contracts_check() {
    let env = TestEnv::new();

    let report = env.run_json(&["validate", "--strict"]);
    assert_eq!(report["ok"], true);
    validate("validation-report.schema.json", &report["data"]);

    let resolved = env.run_json(&["resolve", MODEL]);
    assert_eq!(resolved["ok"], true);
    validate("resolve.schema.json", &resolved["data"]);

    let listing = env.run_json(&["list"]);
    assert_eq!(listing["ok"], true);
    validate("listing.schema.json", &listing["data"]);

    let (artifact, metadata, schema) = env.publish_inputs(3);
    let published = env.run_json(&[
        "publish",
        MODEL,
        "--artifact",
        artifact.to_str().unwrap(),
        "--metadata",
        metadata.to_str().unwrap(),
        "--schema",
        schema.to_str().unwrap(),
    ]);
    assert_eq!(published["ok"], true);
    validate("publish.schema.json", &published["data"]);
}

#[test]
fn failure_contracts_check() {
    let env = TestEnv::new();
    write_index(&env.root, MODEL, &[1, 2, 3], 2);
    fs::write(version_dir(&env.root, MODEL, 2).join("model.pkl"), b"junk").unwrap();

    let report = env.run_json_failure(&["validate", "--strict"]);
    assert_eq!(report["ok"], false);
    validate("validation-report.schema.json", &report["data"]);

    let err = env.run_json_failure(&["resolve", "missing_model"]);
    validate("error.schema.json", &err);
}

#![allow(dead_code)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const MODEL: &str = "uc_power_model";

/// Minimal pickle stream (protocol 4, `None`).
pub const PICKLE_BYTES: &[u8] = &[0x80, 0x04, 0x4e, 0x2e];

pub fn sha256_hex(bytes: &[u8]) -> String {
    modelzoo::sha256_bytes(bytes)
}

pub fn metadata_doc(model: &str, version: u32) -> Value {
    json!({
        "model_name": model,
        "version": version,
        "mlflow": {
            "registered_model_name": model,
            "model_version": version,
            "run_id": format!("run-{}", version),
        },
        "git": {"created_at": "2024-05-01T12:00:00Z"},
        "status": if version == 1 { "archived" } else { "production" },
        "metrics": {"rmse": 0.42, "mae": 0.31},
        "features": ["temp_c", "hour", "load_kw"],
    })
}

pub fn feature_schema_doc() -> Value {
    json!({
        "features": [
            {"name": "temp_c", "type": "float"},
            {"name": "hour", "type": "int"},
            {"name": "load_kw", "type": "float"},
        ],
        "target": {"name": "power_kw", "type": "float"},
    })
}

pub fn index_doc(model: &str, versions: &[u32], latest: u32) -> Value {
    let entries: Vec<Value> = versions
        .iter()
        .map(|v| {
            json!({
                "version": v,
                "status": if *v == latest { "production" } else { "archived" },
                "run_id": format!("run-{}", v),
                "sha256": sha256_hex(PICKLE_BYTES),
            })
        })
        .collect();
    json!({
        "model_name": model,
        "versions": entries,
        "latest": {"version": latest},
    })
}

pub fn write_yaml(path: &Path, doc: &Value) {
    fs::write(path, serde_yaml::to_string(doc).expect("render yaml")).expect("write yaml");
}

pub fn write_json(path: &Path, doc: &Value) {
    fs::write(
        path,
        serde_json::to_string_pretty(doc).expect("render json"),
    )
    .expect("write json");
}

pub fn version_dir(root: &Path, model: &str, version: u32) -> PathBuf {
    root.join("models").join(model).join(format!("v{}", version))
}

/// Writes a complete, valid `v<N>` directory.
pub fn write_version(root: &Path, model: &str, version: u32) -> PathBuf {
    let dir = version_dir(root, model, version);
    fs::create_dir_all(&dir).expect("create version dir");
    fs::write(dir.join("model.pkl"), PICKLE_BYTES).expect("write artifact");
    write_yaml(&dir.join("metadata.yaml"), &metadata_doc(model, version));
    write_json(&dir.join("feature_schema.json"), &feature_schema_doc());
    dir
}

pub fn write_index(root: &Path, model: &str, versions: &[u32], latest: u32) {
    let dir = root.join("models").join(model);
    fs::create_dir_all(&dir).expect("create model dir");
    write_yaml(&dir.join("index.yaml"), &index_doc(model, versions, latest));
}

/// `uc_power_model` with v1 and v2 on disk and latest = 2.
pub fn make_fixture_catalog(base: &Path) -> PathBuf {
    let root = base.join("zoo");
    write_version(&root, MODEL, 1);
    write_version(&root, MODEL, 2);
    write_index(&root, MODEL, &[1, 2], 2);
    root
}

pub fn edit_yaml(path: &Path, edit: impl FnOnce(&mut Value)) {
    let raw = fs::read_to_string(path).expect("read yaml");
    let mut doc: Value = serde_yaml::from_str(&raw).expect("parse yaml");
    edit(&mut doc);
    write_yaml(path, &doc);
}

pub fn edit_json(path: &Path, edit: impl FnOnce(&mut Value)) {
    let raw = fs::read_to_string(path).expect("read json");
    let mut doc: Value = serde_json::from_str(&raw).expect("parse json");
    edit(&mut doc);
    write_json(path, &doc);
}

pub struct TestEnv {
    _tmp: TempDir,
    pub root: PathBuf,
    pub inputs: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let root = make_fixture_catalog(tmp.path());
        let inputs = tmp.path().join("inputs");
        fs::create_dir_all(&inputs).expect("create inputs dir");
        Self {
            _tmp: tmp,
            root,
            inputs,
        }
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("modelzoo");
        cmd.env_remove("MODELZOO_ROOT")
            .env_remove("MODELZOO_GIT_PUSH")
            .env_remove("MODELZOO_PRIMARY_REMOTE")
            .env_remove("MODELZOO_SECONDARY_REMOTE")
            .env_remove("RUST_LOG")
            .arg("--root")
            .arg(&self.root);
        cmd
    }

    pub fn run_json(&self, args: &[&str]) -> Value {
        let out = self
            .cmd()
            .arg("--json")
            .args(args)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&out).expect("valid json output")
    }

    pub fn run_json_failure(&self, args: &[&str]) -> Value {
        let out = self
            .cmd()
            .arg("--json")
            .args(args)
            .assert()
            .failure()
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&out).expect("valid json output")
    }

    /// Writes publish inputs (artifact, metadata, schema) for `version`.
    pub fn publish_inputs(&self, version: u32) -> (PathBuf, PathBuf, PathBuf) {
        let artifact = self.inputs.join("trained.pkl");
        fs::write(&artifact, PICKLE_BYTES).expect("write input artifact");
        let metadata = self.inputs.join("metadata.yaml");
        write_yaml(&metadata, &metadata_doc(MODEL, version));
        let schema = self.inputs.join("feature_schema.json");
        write_json(&schema, &feature_schema_doc());
        (artifact, metadata, schema)
    }
}

//! Typed catalog documents and their shape checks.
//!
//! Documents are first read into a `serde_json::Value` (YAML and JSON alike),
//! checked key by key so every problem can be reported at once, and only then
//! converted into the typed records below.

use crate::domain::constants::{
    FEATURE_SCHEMA_REQUIRED, GIT_REQUIRED, INDEX_REQUIRED, METADATA_REQUIRED, MLFLOW_REQUIRED,
    STATUS_VALID,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum ModelStatus {
    Staging,
    Production,
    Archived,
    None,
}

impl TryFrom<String> for ModelStatus {
    type Error = String;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        match raw.to_ascii_lowercase().as_str() {
            "staging" => Ok(ModelStatus::Staging),
            "production" => Ok(ModelStatus::Production),
            "archived" => Ok(ModelStatus::Archived),
            "none" => Ok(ModelStatus::None),
            _ => Err(format!(
                "status must be one of {:?}, got '{}'",
                STATUS_VALID, raw
            )),
        }
    }
}

impl fmt::Display for ModelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ModelStatus::Staging => "staging",
            ModelStatus::Production => "production",
            ModelStatus::Archived => "archived",
            ModelStatus::None => "none",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MlflowInfo {
    pub registered_model_name: String,
    pub model_version: u32,
    pub run_id: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GitInfo {
    pub created_at: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Training provenance for one version. Unknown keys survive a round trip
/// through `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub model_name: String,
    pub version: u32,
    pub mlflow: MlflowInfo,
    pub git: GitInfo,
    pub status: ModelStatus,
    pub metrics: BTreeMap<String, f64>,
    pub features: Vec<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureDescriptor {
    pub name: String,
    #[serde(rename = "type", alias = "dtype")]
    pub dtype: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TargetSpec {
    Name(String),
    Descriptor(FeatureDescriptor),
}

impl TargetSpec {
    pub fn name(&self) -> &str {
        match self {
            TargetSpec::Name(n) => n,
            TargetSpec::Descriptor(d) => &d.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSchema {
    pub features: Vec<FeatureDescriptor>,
    pub target: TargetSpec,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl FeatureSchema {
    /// Names that occur more than once, each reported once, sorted.
    pub fn duplicate_names(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut dupes = BTreeSet::new();
        for f in &self.features {
            if !seen.insert(f.name.as_str()) {
                dupes.insert(f.name.clone());
            }
        }
        dupes.into_iter().collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ModelStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatestPointer {
    pub version: u32,
}

/// Per-model summary of every published version and the production pointer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Index {
    pub model_name: String,
    pub versions: Vec<IndexEntry>,
    pub latest: LatestPointer,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Index {
    pub fn new(model_name: &str) -> Self {
        Self {
            model_name: model_name.to_string(),
            versions: Vec::new(),
            latest: LatestPointer { version: 0 },
            extra: BTreeMap::new(),
        }
    }

    pub fn version_numbers(&self) -> BTreeSet<u32> {
        self.versions.iter().map(|e| e.version).collect()
    }

    pub fn entry(&self, version: u32) -> Option<&IndexEntry> {
        self.versions.iter().find(|e| e.version == version)
    }

    pub fn duplicate_versions(&self) -> Vec<u32> {
        let mut seen = HashSet::new();
        let mut dupes = BTreeSet::new();
        for e in &self.versions {
            if !seen.insert(e.version) {
                dupes.insert(e.version);
            }
        }
        dupes.into_iter().collect()
    }

    pub fn max_version(&self) -> Option<u32> {
        self.versions.iter().map(|e| e.version).max()
    }

    /// Inserts or replaces the summary for `entry.version`, keeping the list
    /// in numeric order.
    pub fn upsert(&mut self, entry: IndexEntry) {
        if let Some(existing) = self.versions.iter_mut().find(|e| e.version == entry.version) {
            *existing = entry;
        } else {
            self.versions.push(entry);
        }
        self.versions.sort_by_key(|e| e.version);
    }
}

pub fn parse_metadata(doc: &Value) -> Result<Metadata, Vec<String>> {
    let issues = metadata_issues(doc);
    if !issues.is_empty() {
        return Err(issues);
    }
    let mut doc = doc.clone();
    normalize_version(&mut doc, &["version"]);
    normalize_version(&mut doc, &["mlflow", "model_version"]);
    typed(&doc)
}

pub fn parse_feature_schema(doc: &Value) -> Result<FeatureSchema, Vec<String>> {
    let issues = feature_schema_issues(doc);
    if !issues.is_empty() {
        return Err(issues);
    }
    typed(doc)
}

pub fn parse_index(doc: &Value) -> Result<Index, Vec<String>> {
    let issues = index_issues(doc);
    if !issues.is_empty() {
        return Err(issues);
    }
    let mut doc = doc.clone();
    normalize_version(&mut doc, &["latest", "version"]);
    if let Some(entries) = doc.get_mut("versions").and_then(Value::as_array_mut) {
        for entry in entries {
            normalize_version(entry, &["version"]);
        }
    }
    typed(&doc)
}

/// Rewrites an integral float such as YAML `3.0` at `path` as the integer it
/// denotes. Shape checks have already accepted it via `positive_int`.
fn normalize_version(doc: &mut Value, path: &[&str]) {
    let mut slot = Some(doc);
    for key in path {
        slot = slot.and_then(|v| v.get_mut(*key));
    }
    if let Some(v) = slot {
        if let Some(n) = positive_int(v) {
            *v = Value::from(n);
        }
    }
}

fn typed<T: DeserializeOwned>(doc: &Value) -> Result<T, Vec<String>> {
    serde_json::from_value(doc.clone()).map_err(|e| vec![e.to_string()])
}

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "mapping",
    }
}

fn positive_int(v: &Value) -> Option<u32> {
    let n = match v.as_u64() {
        Some(n) => n,
        None => {
            let f = v.as_f64().filter(|f| f.fract() == 0.0 && *f >= 1.0)?;
            if f > f64::from(u32::MAX) {
                return None;
            }
            f as u64
        }
    };
    u32::try_from(n).ok().filter(|n| *n > 0)
}

fn missing_keys(obj: &Map<String, Value>, required: &[&str]) -> Vec<String> {
    let mut missing: Vec<String> = required
        .iter()
        .filter(|k| !obj.contains_key(**k))
        .map(|k| k.to_string())
        .collect();
    missing.sort();
    missing
}

fn check_missing(
    obj: &Map<String, Value>,
    required: &[&str],
    label: &str,
    issues: &mut Vec<String>,
) {
    let missing = missing_keys(obj, required);
    if !missing.is_empty() {
        issues.push(format!("{}missing required keys: {:?}", label, missing));
    }
}

fn metadata_issues(doc: &Value) -> Vec<String> {
    let Some(meta) = doc.as_object() else {
        return vec!["root must be a mapping".to_string()];
    };
    let mut issues = Vec::new();
    check_missing(meta, &METADATA_REQUIRED, "", &mut issues);

    if let Some(name) = meta.get("model_name") {
        if !name.is_string() {
            issues.push(format!("model_name must be a string, got {}", type_name(name)));
        }
    }

    if let Some(v) = meta.get("version") {
        if positive_int(v).is_none() {
            issues.push(format!(
                "version must be a positive integer, got {}",
                type_name(v)
            ));
        }
    }

    if let Some(mlf) = meta.get("mlflow") {
        match mlf.as_object() {
            None => issues.push("mlflow must be a mapping".to_string()),
            Some(m) => {
                check_missing(m, &MLFLOW_REQUIRED, "mlflow ", &mut issues);
                if let Some(mv) = m.get("model_version") {
                    if positive_int(mv).is_none() {
                        issues.push(format!(
                            "mlflow.model_version must be a positive integer, got {}",
                            type_name(mv)
                        ));
                    }
                }
                for key in ["registered_model_name", "run_id"] {
                    if let Some(x) = m.get(key) {
                        if !x.is_string() {
                            issues.push(format!(
                                "mlflow.{} must be a string, got {}",
                                key,
                                type_name(x)
                            ));
                        }
                    }
                }
            }
        }
    }

    if let Some(g) = meta.get("git") {
        match g.as_object() {
            None => issues.push("git must be a mapping".to_string()),
            Some(m) => {
                check_missing(m, &GIT_REQUIRED, "git ", &mut issues);
                if let Some(ts) = m.get("created_at") {
                    if !ts.is_string() {
                        issues.push(format!(
                            "git.created_at must be a string, got {}",
                            type_name(ts)
                        ));
                    }
                }
            }
        }
    }

    if let Some(s) = meta.get("status") {
        match s.as_str() {
            Some(raw) => {
                if let Err(e) = ModelStatus::try_from(raw.to_string()) {
                    issues.push(e);
                }
            }
            None => issues.push(format!("status must be a string, got {}", type_name(s))),
        }
    }

    if let Some(m) = meta.get("metrics") {
        match m.as_object() {
            None => issues.push("metrics must be a mapping".to_string()),
            Some(metrics) => {
                let bad: Vec<&String> = metrics
                    .iter()
                    .filter(|(_, v)| !v.is_number())
                    .map(|(k, _)| k)
                    .collect();
                if !bad.is_empty() {
                    issues.push(format!("metrics must be numeric: {:?}", bad));
                }
            }
        }
    }

    if let Some(f) = meta.get("features") {
        match f.as_array() {
            None => issues.push("features must be a list".to_string()),
            Some(list) if !list.iter().all(|x| x.is_string()) => {
                issues.push("features must be a list of strings".to_string())
            }
            Some(_) => {}
        }
    }

    issues
}

fn descriptor_issues(v: &Value, label: &str, issues: &mut Vec<String>) {
    let Some(d) = v.as_object() else {
        issues.push(format!("{} must be a mapping", label));
        return;
    };
    match d.get("name") {
        Some(Value::String(n)) if !n.is_empty() => {}
        Some(_) => issues.push(format!("{}.name must be a non-empty string", label)),
        None => issues.push(format!("{} missing 'name'", label)),
    }
    match d.get("type").or_else(|| d.get("dtype")) {
        Some(Value::String(_)) => {}
        Some(_) => issues.push(format!("{}.type must be a string", label)),
        None => issues.push(format!("{} missing 'type'", label)),
    }
}

fn feature_schema_issues(doc: &Value) -> Vec<String> {
    let Some(schema) = doc.as_object() else {
        return vec!["root must be an object".to_string()];
    };
    let mut issues = Vec::new();
    check_missing(schema, &FEATURE_SCHEMA_REQUIRED, "", &mut issues);

    if let Some(f) = schema.get("features") {
        match f.as_array() {
            None => issues.push("features must be a list".to_string()),
            Some(list) => {
                for (i, item) in list.iter().enumerate() {
                    descriptor_issues(item, &format!("features[{}]", i), &mut issues);
                }
            }
        }
    }

    if let Some(t) = schema.get("target") {
        if !t.is_string() {
            descriptor_issues(t, "target", &mut issues);
        }
    }

    issues
}

fn index_issues(doc: &Value) -> Vec<String> {
    let Some(index) = doc.as_object() else {
        return vec!["root must be a mapping".to_string()];
    };
    let mut issues = Vec::new();
    check_missing(index, &INDEX_REQUIRED, "", &mut issues);

    if let Some(v) = index.get("versions") {
        match v.as_array() {
            None => issues.push("versions must be a list".to_string()),
            Some(list) => {
                for (i, entry) in list.iter().enumerate() {
                    match entry.as_object() {
                        None => issues.push(format!("versions[{}] must be a mapping", i)),
                        Some(e) => match e.get("version") {
                            None => issues.push(format!("versions[{}] missing 'version'", i)),
                            Some(n) if positive_int(n).is_none() => issues.push(format!(
                                "versions[{}].version must be a positive integer",
                                i
                            )),
                            Some(_) => {}
                        },
                    }
                }
            }
        }
    }

    if let Some(latest) = index.get("latest") {
        match latest.as_object() {
            None => issues.push("latest must be a mapping".to_string()),
            Some(l) => match l.get("version") {
                None => issues.push("latest missing 'version'".to_string()),
                Some(n) if positive_int(n).is_none() => {
                    issues.push("latest.version must be a positive integer".to_string())
                }
                Some(_) => {}
            },
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn metadata_doc(version: u32) -> Value {
        json!({
            "model_name": "uc_power_model",
            "version": version,
            "mlflow": {"registered_model_name": "uc_power", "model_version": version, "run_id": "abc"},
            "git": {"created_at": "2025-01-01T00:00:00Z"},
            "status": "Production",
            "metrics": {"rmse": 0.5},
            "features": ["load", "temp"],
            "owner": "forecasting"
        })
    }

    #[test]
    fn metadata_parses_and_keeps_unknown_keys() {
        let m = parse_metadata(&metadata_doc(2)).expect("valid metadata");
        assert_eq!(m.version, 2);
        assert_eq!(m.status, ModelStatus::Production);
        assert_eq!(m.extra.get("owner"), Some(&json!("forecasting")));
    }

    #[test]
    fn metadata_reports_all_missing_keys_in_one_issue() {
        let issues = parse_metadata(&json!({"version": 1})).unwrap_err();
        assert_eq!(issues.len(), 1);
        assert!(issues[0].contains("missing required keys"));
        assert!(issues[0].contains("mlflow"));
        assert!(issues[0].contains("model_name"));
    }

    #[test]
    fn metadata_rejects_mistyped_fields() {
        let mut doc = metadata_doc(1);
        doc["version"] = json!("one");
        doc["status"] = json!("retired");
        let issues = parse_metadata(&doc).unwrap_err();
        assert_eq!(issues.len(), 2);
        assert!(issues.iter().any(|i| i.starts_with("version must be")));
        assert!(issues.iter().any(|i| i.contains("retired")));
    }

    #[test]
    fn feature_schema_accepts_dtype_alias_and_string_target() {
        let s = parse_feature_schema(&json!({
            "features": [{"name": "load", "dtype": "float"}, {"name": "temp", "type": "float"}],
            "target": "power"
        }))
        .expect("valid schema");
        assert_eq!(s.features[0].dtype, "float");
        assert_eq!(s.target.name(), "power");
        assert!(s.duplicate_names().is_empty());
    }

    #[test]
    fn feature_schema_duplicates_are_reported_once_per_name() {
        let s = parse_feature_schema(&json!({
            "features": [
                {"name": "a", "type": "int"},
                {"name": "a", "type": "int"},
                {"name": "a", "type": "int"},
                {"name": "b", "type": "int"}
            ],
            "target": {"name": "y", "type": "float"}
        }))
        .expect("shape is valid");
        assert_eq!(s.duplicate_names(), vec!["a".to_string()]);
    }

    #[test]
    fn feature_schema_requires_descriptors() {
        let issues =
            parse_feature_schema(&json!({"features": ["load"], "target": "y"})).unwrap_err();
        assert_eq!(issues, vec!["features[0] must be a mapping".to_string()]);
    }

    #[test]
    fn index_upsert_keeps_numeric_order() {
        let mut idx = Index::new("m");
        for v in [10, 2, 1] {
            idx.upsert(IndexEntry {
                version: v,
                status: None,
                created_at: None,
                run_id: None,
                sha256: None,
            });
        }
        let order: Vec<u32> = idx.versions.iter().map(|e| e.version).collect();
        assert_eq!(order, vec![1, 2, 10]);
        assert_eq!(idx.max_version(), Some(10));
    }

    #[test]
    fn integral_float_versions_are_accepted() {
        let mut doc = metadata_doc(3);
        doc["version"] = json!(3.0);
        doc["mlflow"]["model_version"] = json!(3.0);
        let m = parse_metadata(&doc).expect("3.0 is version 3");
        assert_eq!(m.version, 3);
        assert_eq!(m.mlflow.model_version, 3);

        doc["version"] = json!(2.5);
        let issues = parse_metadata(&doc).unwrap_err();
        assert!(issues[0].starts_with("version must be"));

        let idx = parse_index(&json!({
            "model_name": "m",
            "versions": [{"version": 1.0}, {"version": 2}],
            "latest": {"version": 2.0}
        }))
        .expect("integral floats in index");
        assert_eq!(idx.latest.version, 2);
        assert_eq!(idx.version_numbers().into_iter().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn index_shape_errors_are_collected() {
        let issues = parse_index(&json!({
            "model_name": "m",
            "versions": [{"version": 1}, {"status": "staging"}],
            "latest": 1
        }))
        .unwrap_err();
        assert_eq!(issues.len(), 2);
    }
}

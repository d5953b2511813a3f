//! Catalog-wide audit.
//!
//! The walk never stops at the first problem: every violation across every
//! model and version is collected into one [`ValidationReport`].

use crate::domain::documents::{parse_feature_schema, parse_index, parse_metadata, Index};
use crate::domain::models::{ValidationReport, Violation, ViolationKind};
use crate::services::loader::{ArtifactLoader, FormatLoader};
use crate::services::storage::{parse_document, sha256_bytes};
use crate::services::store::{CatalogStore, DocumentKind, FsStore};
use serde_json::Value;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, Default)]
pub struct ValidateOptions {
    /// Also load every artifact and compare it against the index checksum.
    pub strict: bool,
}

struct Audit<'a, S: CatalogStore> {
    store: &'a S,
    loader: &'a dyn ArtifactLoader,
    options: ValidateOptions,
    report: ValidationReport,
}

impl<'a, S: CatalogStore> Audit<'a, S> {
    fn push(
        &mut self,
        kind: ViolationKind,
        model: &str,
        version: Option<u32>,
        path: PathBuf,
        message: impl Into<String>,
    ) {
        self.report.violations.push(Violation {
            kind,
            model: Some(model.to_string()),
            version,
            path,
            message: message.into(),
        });
    }

    /// Reads and parses a document, recording a violation of `kind` when it
    /// is missing or unreadable.
    fn document(
        &mut self,
        kind: ViolationKind,
        model: &str,
        version: Option<u32>,
        doc: DocumentKind,
    ) -> Option<(PathBuf, Value)> {
        let expected = self.store.expected_document_location(model, version, doc);
        match self.store.read_document(model, version, doc) {
            Ok(Some(file)) => match parse_document(&file.raw, file.format) {
                Ok(value) => Some((file.path, value)),
                Err(e) => {
                    self.push(kind, model, version, file.path, format!("could not parse: {}", e));
                    None
                }
            },
            Ok(None) => {
                self.push(
                    kind,
                    model,
                    version,
                    expected,
                    format!("missing {} document", doc.stem()),
                );
                None
            }
            Err(e) => {
                self.push(kind, model, version, expected, format!("could not read: {}", e));
                None
            }
        }
    }

    fn check_model(&mut self, model: &str) {
        let model_dir = self.store.model_location(model);
        let present: Vec<u32> = match self.store.list_versions(model) {
            Ok(v) => v,
            Err(e) => {
                self.push(
                    ViolationKind::Layout,
                    model,
                    None,
                    model_dir,
                    format!("could not list versions: {}", e),
                );
                return;
            }
        };

        let index = self.check_index(model, &present);
        for version in &present {
            self.check_version(model, *version, index.as_ref());
        }
        self.report.models_checked += 1;
    }

    fn check_index(&mut self, model: &str, present: &[u32]) -> Option<Index> {
        let (path, value) = self.document(
            ViolationKind::IndexInconsistency,
            model,
            None,
            DocumentKind::Index,
        )?;
        let index = match parse_index(&value) {
            Ok(i) => i,
            Err(issues) => {
                for issue in issues {
                    self.push(
                        ViolationKind::IndexInconsistency,
                        model,
                        None,
                        path.clone(),
                        issue,
                    );
                }
                return None;
            }
        };

        if index.model_name != model {
            self.push(
                ViolationKind::IndexInconsistency,
                model,
                None,
                path.clone(),
                format!("model_name '{}' does not match directory", index.model_name),
            );
        }

        for dup in index.duplicate_versions() {
            self.push(
                ViolationKind::IndexInconsistency,
                model,
                Some(dup),
                path.clone(),
                format!("version {} listed more than once", dup),
            );
        }

        let listed = index.version_numbers();
        let on_disk: BTreeSet<u32> = present.iter().copied().collect();
        for missing in listed.difference(&on_disk) {
            self.push(
                ViolationKind::IndexInconsistency,
                model,
                Some(*missing),
                self.store.version_location(model, *missing),
                format!("index lists version {} but its directory is missing", missing),
            );
        }
        for unlisted in on_disk.difference(&listed) {
            self.push(
                ViolationKind::IndexInconsistency,
                model,
                Some(*unlisted),
                self.store.version_location(model, *unlisted),
                format!("version {} directory is not listed in the index", unlisted),
            );
        }

        let latest = index.latest.version;
        if !on_disk.contains(&latest) {
            self.push(
                ViolationKind::IndexInconsistency,
                model,
                Some(latest),
                path,
                format!("latest.version={} but its directory is missing", latest),
            );
        }

        Some(index)
    }

    fn check_version(&mut self, model: &str, version: u32, index: Option<&Index>) {
        debug!(model, version, "checking version");
        self.report.versions_checked += 1;
        self.check_metadata(model, version);
        self.check_feature_schema(model, version);
        self.check_artifact(model, version, index);
    }

    fn check_metadata(&mut self, model: &str, version: u32) {
        let Some((path, value)) = self.document(
            ViolationKind::Schema,
            model,
            Some(version),
            DocumentKind::Metadata,
        ) else {
            return;
        };
        let meta = match parse_metadata(&value) {
            Ok(m) => m,
            Err(issues) => {
                for issue in issues {
                    self.push(ViolationKind::Schema, model, Some(version), path.clone(), issue);
                }
                return;
            }
        };
        if meta.version != version {
            self.push(
                ViolationKind::VersionMismatch,
                model,
                Some(version),
                path.clone(),
                format!("version ({}) != directory v{}", meta.version, version),
            );
        }
        if meta.mlflow.model_version != version {
            self.push(
                ViolationKind::Schema,
                model,
                Some(version),
                path.clone(),
                format!(
                    "mlflow.model_version ({}) != directory v{}",
                    meta.mlflow.model_version, version
                ),
            );
        }
        if meta.model_name != model {
            self.push(
                ViolationKind::Schema,
                model,
                Some(version),
                path,
                format!("model_name '{}' does not match directory", meta.model_name),
            );
        }
    }

    fn check_feature_schema(&mut self, model: &str, version: u32) {
        let Some((path, value)) = self.document(
            ViolationKind::Schema,
            model,
            Some(version),
            DocumentKind::FeatureSchema,
        ) else {
            return;
        };
        match parse_feature_schema(&value) {
            Ok(schema) => {
                for name in schema.duplicate_names() {
                    self.push(
                        ViolationKind::Schema,
                        model,
                        Some(version),
                        path.clone(),
                        format!("duplicate feature name '{}'", name),
                    );
                }
            }
            Err(issues) => {
                for issue in issues {
                    self.push(ViolationKind::Schema, model, Some(version), path.clone(), issue);
                }
            }
        }
    }

    fn check_artifact(&mut self, model: &str, version: u32, index: Option<&Index>) {
        let dir = self.store.version_location(model, version);
        let artifact = match self.store.find_artifact(model, version) {
            Ok(Some(p)) => p,
            Ok(None) => {
                self.push(
                    ViolationKind::Layout,
                    model,
                    Some(version),
                    dir,
                    "missing model artifact",
                );
                return;
            }
            Err(e) => {
                self.push(
                    ViolationKind::Layout,
                    model,
                    Some(version),
                    dir,
                    format!("could not list version directory: {}", e),
                );
                return;
            }
        };
        if !self.options.strict {
            return;
        }

        let bytes = match self.store.read_artifact(&artifact) {
            Ok(b) => b,
            Err(e) => {
                self.push(
                    ViolationKind::Load,
                    model,
                    Some(version),
                    artifact,
                    format!("failed to read model: {}", e),
                );
                return;
            }
        };
        if let Err(reason) = self.loader.load(&artifact, &bytes) {
            self.push(
                ViolationKind::Load,
                model,
                Some(version),
                artifact,
                format!("failed to load model: {}", reason),
            );
            return;
        }
        let expected = index
            .and_then(|i| i.entry(version))
            .and_then(|e| e.sha256.as_deref());
        if let Some(expected) = expected {
            let actual = sha256_bytes(&bytes);
            if !actual.eq_ignore_ascii_case(expected) {
                self.push(
                    ViolationKind::Load,
                    model,
                    Some(version),
                    artifact,
                    format!("checksum mismatch: index {} != artifact {}", expected, actual),
                );
            }
        }
    }
}

pub fn validate<S: CatalogStore>(
    store: &S,
    options: ValidateOptions,
    loader: &dyn ArtifactLoader,
) -> ValidationReport {
    let mut audit = Audit {
        store,
        loader,
        options,
        report: ValidationReport {
            strict: options.strict,
            ..ValidationReport::default()
        },
    };

    let models_dir = store.models_location();
    if !store.has_catalog() {
        audit.report.violations.push(Violation {
            kind: ViolationKind::Layout,
            model: None,
            version: None,
            path: models_dir,
            message: "models/ directory not found".to_string(),
        });
        return audit.report;
    }

    match store.list_models() {
        Ok(models) => {
            for model in models {
                audit.check_model(&model);
            }
        }
        Err(e) => audit.report.violations.push(Violation {
            kind: ViolationKind::Layout,
            model: None,
            version: None,
            path: models_dir,
            message: format!("could not list models: {}", e),
        }),
    }

    info!(
        models = audit.report.models_checked,
        versions = audit.report.versions_checked,
        violations = audit.report.violations.len(),
        strict = options.strict,
        "catalog validated"
    );
    audit.report
}

/// Validates the catalog at `root` with the default store and loader.
pub fn validate_catalog(root: &Path, strict: bool) -> ValidationReport {
    validate(
        &FsStore::new(root),
        ValidateOptions { strict },
        &FormatLoader,
    )
}

//! Single-writer publishing of new versions.
//!
//! A version is written into a hidden staging directory and becomes visible
//! with one `rename` to `v<N>`; the index is rewritten afterwards through a
//! temp file and another rename. Readers therefore never see a version
//! directory with missing files, and the latest pointer only ever names a
//! complete version.

use crate::domain::constants::{ARTIFACT_STEM, FEATURE_SCHEMA_STEM, INDEX_STEM, METADATA_STEM};
use crate::domain::documents::{FeatureSchema, Index, IndexEntry, Metadata};
use crate::domain::layout::{is_document_extension, is_valid_model_name, staging_dir_name};
use crate::error::{CatalogError, Result};
use crate::services::reader::CatalogReader;
use crate::services::storage::{atomic_write, render_document, sha256_bytes, write_synced, DocFormat};
use crate::services::store::{CatalogStore, DocumentKind, FsStore};
use chrono::{SecondsFormat, Utc};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct PublishRequest {
    /// Trained model file; its extension becomes `model.<ext>`.
    pub artifact: PathBuf,
    pub metadata: Metadata,
    pub schema: FeatureSchema,
    /// Explicit version number; defaults to one past the highest known version.
    pub version: Option<u32>,
    /// Move the latest pointer to the new version.
    pub promote: bool,
}

#[derive(Debug, Clone)]
pub struct Published {
    pub model: String,
    pub version: u32,
    pub path: PathBuf,
    pub latest: u32,
    pub sha256: String,
}

pub struct Publisher {
    root: PathBuf,
    reader: CatalogReader<FsStore>,
}

fn publish_err(e: impl std::fmt::Display) -> CatalogError {
    CatalogError::Publish(e.to_string())
}

impl Publisher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            reader: CatalogReader::open(root.clone()),
            root,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn store(&self) -> &FsStore {
        self.reader.store()
    }

    /// Existing index, or an empty one for a model's first publish.
    fn current_index(&self, model: &str) -> Result<Index> {
        if !self.store().has_model(model) {
            return Ok(Index::new(model));
        }
        match self.reader.load_index(model) {
            Ok(i) => Ok(i),
            Err(CatalogError::NoLatest { .. }) => Ok(Index::new(model)),
            Err(e) => Err(e),
        }
    }

    /// Rewrites the index in place, keeping the file name and format of an
    /// existing index; a new model gets `index.yaml`.
    fn write_index(&self, model: &str, index: &Index) -> Result<()> {
        let (path, format) = match self.store().read_document(model, None, DocumentKind::Index)? {
            Some(existing) => (existing.path, existing.format),
            None => (
                self.store()
                    .model_location(model)
                    .join(format!("{}.yaml", INDEX_STEM)),
                DocFormat::Yaml,
            ),
        };
        let body = render_document(index, format).map_err(publish_err)?;
        atomic_write(&path, body.as_bytes())?;
        Ok(())
    }

    pub fn publish(&self, model: &str, mut request: PublishRequest) -> Result<Published> {
        if !is_valid_model_name(model) {
            return Err(CatalogError::InvalidArgument(format!(
                "invalid model name '{}'",
                model
            )));
        }
        let dupes = request.schema.duplicate_names();
        if !dupes.is_empty() {
            return Err(publish_err(format!("duplicate feature names: {:?}", dupes)));
        }
        if !request.artifact.is_file() {
            return Err(publish_err(format!(
                "artifact not found: {}",
                request.artifact.display()
            )));
        }
        let ext = request
            .artifact
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("bin")
            .to_string();
        // `model.yaml` / `model.yml` would be read as a document, not an artifact.
        if is_document_extension(&ext) && !ext.eq_ignore_ascii_case("json") {
            return Err(publish_err(format!(
                "artifact extension .{} is reserved for catalog documents",
                ext
            )));
        }

        let mut index = self.current_index(model)?;
        let on_disk = if self.store().has_model(model) {
            self.store().list_versions(model)?
        } else {
            Vec::new()
        };
        let highest = on_disk
            .iter()
            .copied()
            .chain(index.max_version())
            .max()
            .unwrap_or(0);
        let version = match request.version {
            Some(0) => return Err(CatalogError::InvalidArgument("version must be positive".into())),
            Some(v) if on_disk.contains(&v) || index.entry(v).is_some() => {
                return Err(publish_err(format!(
                    "{}/v{} already exists; published versions are immutable",
                    model, v
                )))
            }
            Some(v) => v,
            None => highest + 1,
        };

        request.metadata.version = version;
        request.metadata.model_name = model.to_string();
        if request.metadata.git.created_at.trim().is_empty() {
            request.metadata.git.created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        }
        if request.metadata.mlflow.model_version != version {
            return Err(publish_err(format!(
                "mlflow.model_version ({}) != version {}; pass the MLflow version explicitly",
                request.metadata.mlflow.model_version, version
            )));
        }

        let artifact_bytes = std::fs::read(&request.artifact)?;
        let sha256 = sha256_bytes(&artifact_bytes);

        let model_dir = self.store().model_location(model);
        std::fs::create_dir_all(&model_dir)?;
        let staging = model_dir.join(staging_dir_name(version, std::process::id()));
        let final_dir = self.store().version_location(model, version);

        let staged = (|| -> Result<()> {
            if staging.exists() {
                std::fs::remove_dir_all(&staging)?;
            }
            std::fs::create_dir_all(&staging)?;
            write_synced(
                &staging.join(format!("{}.{}", ARTIFACT_STEM, ext)),
                &artifact_bytes,
            )?;
            let meta = render_document(&request.metadata, DocFormat::Yaml).map_err(publish_err)?;
            write_synced(
                &staging.join(format!("{}.yaml", METADATA_STEM)),
                meta.as_bytes(),
            )?;
            let schema = render_document(&request.schema, DocFormat::Json).map_err(publish_err)?;
            write_synced(
                &staging.join(format!("{}.json", FEATURE_SCHEMA_STEM)),
                schema.as_bytes(),
            )?;
            if final_dir.exists() {
                return Err(publish_err(format!(
                    "{} appeared during publish",
                    final_dir.display()
                )));
            }
            std::fs::rename(&staging, &final_dir)?;
            Ok(())
        })();
        if let Err(e) = staged {
            if !staging.exists() {
                return Err(e);
            }
            if let Err(cleanup) = std::fs::remove_dir_all(&staging) {
                warn!(path = %staging.display(), error = %cleanup, "staging cleanup failed");
            }
            return Err(e);
        }

        index.model_name = model.to_string();
        index.upsert(IndexEntry {
            version,
            status: Some(request.metadata.status),
            created_at: Some(request.metadata.git.created_at.clone()),
            run_id: Some(request.metadata.mlflow.run_id.clone()),
            sha256: Some(sha256.clone()),
        });
        if request.promote || index.latest.version == 0 {
            index.latest.version = version;
        }
        self.write_index(model, &index)?;

        info!(model, version, latest = index.latest.version, "published version");
        Ok(Published {
            model: model.to_string(),
            version,
            path: final_dir,
            latest: index.latest.version,
            sha256,
        })
    }

    /// Points `latest` at an existing, indexed version.
    pub fn promote(&self, model: &str, version: u32) -> Result<Index> {
        if !self.store().has_version(model, version) {
            return Err(CatalogError::VersionNotFound {
                model: model.to_string(),
                version,
            });
        }
        let mut index = self.reader.load_index(model)?;
        if index.entry(version).is_none() {
            return Err(CatalogError::VersionNotFound {
                model: model.to_string(),
                version,
            });
        }
        index.latest.version = version;
        self.write_index(model, &index)?;
        info!(model, version, "promoted version to latest");
        Ok(index)
    }
}

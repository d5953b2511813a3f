use crate::domain::documents::{parse_index, parse_metadata, Index, Metadata};
use crate::domain::models::{ModelListing, VersionDescriptor, VersionSelector};
use crate::error::{CatalogError, Result};
use crate::services::storage::parse_document;
use crate::services::store::{CatalogStore, DocumentKind, FsStore};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Fail-fast lookups against a catalog.
///
/// The reader keeps no state besides its store: every call re-reads the
/// catalog, so repeated calls against an unchanged tree agree.
pub struct CatalogReader<S: CatalogStore = FsStore> {
    store: S,
}

impl CatalogReader<FsStore> {
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self::new(FsStore::new(root))
    }
}

impl<S: CatalogStore> CatalogReader<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn require_model(&self, model: &str) -> Result<()> {
        if self.store.has_model(model) {
            Ok(())
        } else {
            Err(CatalogError::ModelNotFound(model.to_string()))
        }
    }

    /// Loads and parses the model's index document.
    pub fn load_index(&self, model: &str) -> Result<Index> {
        self.require_model(model)?;
        let doc = self
            .store
            .read_document(model, None, DocumentKind::Index)?
            .ok_or_else(|| CatalogError::NoLatest {
                model: model.to_string(),
                reason: "no index document".to_string(),
            })?;
        let value = parse_document(&doc.raw, doc.format).map_err(|reason| {
            CatalogError::CorruptIndex {
                path: doc.path.clone(),
                reason,
            }
        })?;
        parse_index(&value).map_err(|issues| CatalogError::CorruptIndex {
            path: doc.path,
            reason: issues.join("; "),
        })
    }

    pub fn resolve_version(
        &self,
        model: &str,
        selector: impl Into<VersionSelector>,
    ) -> Result<VersionDescriptor> {
        self.require_model(model)?;
        let version = match selector.into() {
            VersionSelector::Number(0) => {
                return Err(CatalogError::InvalidArgument(
                    "version must be a positive integer".to_string(),
                ))
            }
            VersionSelector::Number(n) => {
                if !self.store.has_version(model, n) {
                    return Err(CatalogError::VersionNotFound {
                        model: model.to_string(),
                        version: n,
                    });
                }
                n
            }
            VersionSelector::Latest => {
                let index = self.load_index(model)?;
                if index.versions.is_empty() {
                    return Err(CatalogError::NoLatest {
                        model: model.to_string(),
                        reason: "index lists no versions".to_string(),
                    });
                }
                let latest = index.latest.version;
                if !self.store.has_version(model, latest) {
                    return Err(CatalogError::StaleLatest {
                        model: model.to_string(),
                        version: latest,
                    });
                }
                latest
            }
        };
        debug!(model, version, "resolved version");
        Ok(VersionDescriptor {
            model: model.to_string(),
            version,
            path: self.store.version_location(model, version),
        })
    }

    pub fn get_model_path(
        &self,
        model: &str,
        selector: impl Into<VersionSelector>,
    ) -> Result<PathBuf> {
        Ok(self.resolve_version(model, selector)?.path)
    }

    /// Path of the `model.<ext>` file inside the resolved version.
    pub fn artifact_path(
        &self,
        model: &str,
        selector: impl Into<VersionSelector>,
    ) -> Result<PathBuf> {
        let desc = self.resolve_version(model, selector)?;
        self.store
            .find_artifact(model, desc.version)?
            .ok_or(CatalogError::VersionNotFound {
                model: model.to_string(),
                version: desc.version,
            })
    }

    pub fn load_model_metadata(
        &self,
        model: &str,
        selector: impl Into<VersionSelector>,
    ) -> Result<Metadata> {
        let desc = self.resolve_version(model, selector)?;
        let doc = self
            .store
            .read_document(model, Some(desc.version), DocumentKind::Metadata)?
            .ok_or_else(|| CatalogError::CorruptMetadata {
                path: self.store.expected_document_location(
                    model,
                    Some(desc.version),
                    DocumentKind::Metadata,
                ),
                reason: "metadata document missing".to_string(),
            })?;
        let value = parse_document(&doc.raw, doc.format).map_err(|reason| {
            CatalogError::CorruptMetadata {
                path: doc.path.clone(),
                reason,
            }
        })?;
        let meta = parse_metadata(&value).map_err(|issues| CatalogError::CorruptMetadata {
            path: doc.path.clone(),
            reason: issues.join("; "),
        })?;
        if meta.version != desc.version {
            return Err(CatalogError::VersionMismatch {
                path: doc.path,
                expected: desc.version,
                found: meta.version,
            });
        }
        Ok(meta)
    }

    pub fn list_models(&self) -> Result<Vec<String>> {
        if !self.store.has_catalog() {
            return Ok(Vec::new());
        }
        Ok(self.store.list_models()?)
    }

    pub fn list_versions(&self, model: &str) -> Result<Vec<u32>> {
        self.require_model(model)?;
        Ok(self.store.list_versions(model)?)
    }

    /// Versions on disk plus the index's latest pointer, if it resolves.
    pub fn listing(&self, model: &str) -> Result<ModelListing> {
        let versions = self.list_versions(model)?;
        let latest = match self.resolve_version(model, VersionSelector::Latest) {
            Ok(d) => Some(d.version),
            Err(e) if e.is_not_found() => None,
            Err(CatalogError::CorruptIndex { .. }) => None,
            Err(e) => return Err(e),
        };
        Ok(ModelListing {
            name: model.to_string(),
            versions,
            latest,
        })
    }
}

/// Resolved version directory for `model` in the catalog at `root`.
pub fn get_model_path(
    root: &Path,
    model: &str,
    selector: impl Into<VersionSelector>,
) -> Result<PathBuf> {
    CatalogReader::open(root).get_model_path(model, selector)
}

pub fn load_model_metadata(
    root: &Path,
    model: &str,
    selector: impl Into<VersionSelector>,
) -> Result<Metadata> {
    CatalogReader::open(root).load_model_metadata(model, selector)
}

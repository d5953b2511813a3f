use crate::domain::constants::{
    ARTIFACT_STEM, DOCUMENT_EXTENSIONS, FEATURE_SCHEMA_STEM, INDEX_STEM, METADATA_STEM, MODELS_DIR,
};
use crate::domain::layout::{
    is_document_extension, is_valid_model_name, parse_version_dir, version_dir_name,
};
use crate::services::storage::DocFormat;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Metadata,
    FeatureSchema,
    Index,
}

impl DocumentKind {
    pub fn stem(self) -> &'static str {
        match self {
            DocumentKind::Metadata => METADATA_STEM,
            DocumentKind::FeatureSchema => FEATURE_SCHEMA_STEM,
            DocumentKind::Index => INDEX_STEM,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DocumentFile {
    pub path: PathBuf,
    pub format: DocFormat,
    pub raw: String,
}

/// Read access to a catalog, independent of where it is stored.
///
/// Reader and validator only talk to this trait. `version` is `None` for
/// model-level documents (the index) and `Some(n)` for `v<n>/` documents.
pub trait CatalogStore {
    fn models_location(&self) -> PathBuf;
    fn model_location(&self, model: &str) -> PathBuf;
    fn version_location(&self, model: &str, version: u32) -> PathBuf;

    fn has_catalog(&self) -> bool;
    fn has_model(&self, model: &str) -> bool;
    fn has_version(&self, model: &str, version: u32) -> bool;

    fn list_models(&self) -> io::Result<Vec<String>>;
    /// Version numbers present, in numeric order.
    fn list_versions(&self, model: &str) -> io::Result<Vec<u32>>;

    fn read_document(
        &self,
        model: &str,
        version: Option<u32>,
        kind: DocumentKind,
    ) -> io::Result<Option<DocumentFile>>;

    fn find_artifact(&self, model: &str, version: u32) -> io::Result<Option<PathBuf>>;
    fn read_artifact(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Where a document is expected when it is absent, for error reporting.
    fn expected_document_location(
        &self,
        model: &str,
        version: Option<u32>,
        kind: DocumentKind,
    ) -> PathBuf {
        let dir = match version {
            Some(v) => self.version_location(model, v),
            None => self.model_location(model),
        };
        dir.join(format!("{}.{}", kind.stem(), DOCUMENT_EXTENSIONS[0]))
    }
}

/// Catalog stored as a local directory tree (usually a git checkout).
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

fn sorted_dir_names(dir: &Path) -> io::Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            names.push(entry.file_name().to_string_lossy().to_string());
        }
    }
    names.sort();
    Ok(names)
}

impl CatalogStore for FsStore {
    fn models_location(&self) -> PathBuf {
        self.root.join(MODELS_DIR)
    }

    fn model_location(&self, model: &str) -> PathBuf {
        self.models_location().join(model)
    }

    fn version_location(&self, model: &str, version: u32) -> PathBuf {
        self.model_location(model).join(version_dir_name(version))
    }

    fn has_catalog(&self) -> bool {
        self.models_location().is_dir()
    }

    fn has_model(&self, model: &str) -> bool {
        is_valid_model_name(model) && self.model_location(model).is_dir()
    }

    fn has_version(&self, model: &str, version: u32) -> bool {
        version > 0 && self.has_model(model) && self.version_location(model, version).is_dir()
    }

    fn list_models(&self) -> io::Result<Vec<String>> {
        Ok(sorted_dir_names(&self.models_location())?
            .into_iter()
            .filter(|n| !n.starts_with('.'))
            .collect())
    }

    fn list_versions(&self, model: &str) -> io::Result<Vec<u32>> {
        let mut versions = Vec::new();
        for name in sorted_dir_names(&self.model_location(model))? {
            match parse_version_dir(&name) {
                Some(v) => versions.push(v),
                None => debug!(model, dir = %name, "skipping non-version directory"),
            }
        }
        versions.sort_unstable();
        Ok(versions)
    }

    fn read_document(
        &self,
        model: &str,
        version: Option<u32>,
        kind: DocumentKind,
    ) -> io::Result<Option<DocumentFile>> {
        let dir = match version {
            Some(v) => self.version_location(model, v),
            None => self.model_location(model),
        };
        for ext in DOCUMENT_EXTENSIONS {
            let path = dir.join(format!("{}.{}", kind.stem(), ext));
            if !path.is_file() {
                continue;
            }
            let Some(format) = DocFormat::from_path(&path) else {
                continue;
            };
            let raw = std::fs::read_to_string(&path)?;
            return Ok(Some(DocumentFile { path, format, raw }));
        }
        Ok(None)
    }

    fn find_artifact(&self, model: &str, version: u32) -> io::Result<Option<PathBuf>> {
        let dir = self.version_location(model, version);
        let mut candidates = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let path = entry.path();
            let stem_matches = path.file_stem().and_then(|s| s.to_str()) == Some(ARTIFACT_STEM);
            let is_doc = path
                .extension()
                .and_then(|e| e.to_str())
                .map(is_document_extension)
                .unwrap_or(false);
            // `model.yaml` would be indistinguishable from a document, so
            // structured artifacts must use `.json`.
            let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
            if stem_matches && (!is_doc || ext.eq_ignore_ascii_case("json")) {
                candidates.push(path);
            }
        }
        candidates.sort();
        Ok(candidates.into_iter().next())
    }

    fn read_artifact(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }
}
